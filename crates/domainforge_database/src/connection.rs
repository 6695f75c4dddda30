//! Connection pooling and migrations.

use crate::DatabaseResult;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use domainforge_error::{DatabaseError, DatabaseErrorKind};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Default number of pooled connections.
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Pooled PostgreSQL connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Build a connection pool for `database_url`.
///
/// # Errors
///
/// Returns a connection error when the pool cannot open its first connection.
pub fn establish_pool(database_url: &str, max_size: u32) -> DatabaseResult<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Connection(format!(
                "Failed to create connection pool: {}",
                e
            )))
        })
}

/// Apply any pending embedded migrations.
///
/// # Errors
///
/// Returns a migration error if a migration fails to apply.
pub fn run_migrations(pool: &PgPool) -> DatabaseResult<()> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?;
    info!(count = applied.len(), "Applied database migrations");
    Ok(())
}
