//! Persistence failures for users, generation history and subscriptions.

/// What went wrong in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum DatabaseErrorKind {
    /// Pool or connection could not be obtained
    #[display("Database connection error: {}", _0)]
    Connection(String),
    /// Statement failed
    #[display("Database query error: {}", _0)]
    Query(String),
    /// Embedded migrations failed to apply
    #[display("Migration error: {}", _0)]
    Migration(String),
    /// Input rejected before reaching the store
    #[display("Invalid input: {}", _0)]
    InvalidInput(String),
    /// A unique column already holds the value, e.g. a user's email
    #[display("Already exists: {}", _0)]
    Duplicate(String),
    /// A stored row holds a value the domain types cannot represent
    #[display("Unreadable {} row: {}", table, detail)]
    CorruptRow {
        /// Table the row came from
        table: &'static str,
        /// Column and value that failed to map
        detail: String,
    },
    /// Record not found
    #[display("Record not found")]
    NotFound,
}

/// Store error with the location it was raised at.
///
/// # Examples
///
/// ```
/// use domainforge_error::{DatabaseError, DatabaseErrorKind};
///
/// let err = DatabaseError::new(DatabaseErrorKind::CorruptRow {
///     table: "subscriptions",
///     detail: "tier 'gold'".to_string(),
/// });
/// assert!(err.to_string().contains("Unreadable subscriptions row: tier 'gold'"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Database Error: {} at line {} in {}", kind, line, file)]
pub struct DatabaseError {
    /// The kind of error that occurred
    pub kind: DatabaseErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DatabaseError {
    /// Create a new DatabaseError at the caller's location.
    #[track_caller]
    pub fn new(kind: DatabaseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

#[cfg(feature = "database")]
impl From<diesel::result::Error> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind as PgKind, Error};

        match err {
            Error::NotFound => DatabaseError::new(DatabaseErrorKind::NotFound),
            Error::DatabaseError(PgKind::UniqueViolation, info) => {
                let what = info
                    .constraint_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| info.message().to_string());
                DatabaseError::new(DatabaseErrorKind::Duplicate(what))
            }
            other => DatabaseError::new(DatabaseErrorKind::Query(other.to_string())),
        }
    }
}

#[cfg(feature = "database")]
impl From<diesel::ConnectionError> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        DatabaseError::new(DatabaseErrorKind::Connection(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<diesel::r2d2::PoolError> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::r2d2::PoolError) -> Self {
        DatabaseError::new(DatabaseErrorKind::Connection(err.to_string()))
    }
}
