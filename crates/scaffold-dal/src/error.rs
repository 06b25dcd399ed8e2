pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Record not found: {entity} with id {id}")]
    RecordNotFound { entity: &'static str, id: i64 },

    #[error("{field} column was not found in the {entity} entity.")]
    InvalidOrderByField { field: String, entity: &'static str },
}

impl Error {
    /// Short human readable name of the error kind
    pub fn name(&self) -> &'static str {
        match self {
            Error::DatabaseError(_) => "Database Error",
            Error::MigrationError(_) => "Migration Error",
            Error::RecordNotFound { .. } => "Record Not Found",
            Error::InvalidOrderByField { .. } => "Invalid Order Field",
        }
    }
}
