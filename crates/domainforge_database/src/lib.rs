//! Persistence for Domainforge.
//!
//! This crate provides the diesel schema, row models and two implementations
//! of the repository traits from `domainforge_interface`:
//!
//! - [`PgStore`]: PostgreSQL through an r2d2 pool, with embedded migrations
//! - [`InMemoryStore`]: process memory, for tests and database-less runs
//!
//! # Example
//!
//! ```rust,ignore
//! use domainforge_database::PgStore;
//!
//! let store = PgStore::from_env()?;
//! store.migrate()?;
//! ```

mod connection;
mod memory;
mod models;
mod pg_store;
mod validation;

pub mod schema;

pub use connection::{DEFAULT_POOL_SIZE, PgPool, establish_pool, run_migrations};
pub use memory::InMemoryStore;
pub use models::{
    NewSessionRow, NewSubscriptionRow, NewSuggestionRow, NewUserRow, SessionRow,
    SubscriptionChangeset, SubscriptionOverwrite, SubscriptionRow, SuggestionRow, UserRow,
};
pub use pg_store::PgStore;
pub use validation::{MAX_DOMAIN_NAME_LEN, MAX_PAGE_SIZE, filter_suggestions, validate_page};

use domainforge_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
