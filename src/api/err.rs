/// Errors raised by the persistence layer
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// sqlx query or row decoding failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// schema migration failure
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    /// database file or directory could not be prepared
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// output could not be serialized
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// a filter named a column the table does not have
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    /// bad configuration value
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
