//! Database error types
//!
//! SQLx errors are classified by PostgreSQL SQLSTATE so that the adapters can
//! tell a unique violation (a race on a CPF or CNPJ) from a genuine failure.

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be converted to a domain value
    #[error("Decode error: {0}")]
    Decode(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Producer", 42);
    /// assert!(error.to_string().contains("Producer"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }

    /// Classifies a PostgreSQL SQLSTATE code
    ///
    /// See <https://www.postgresql.org/docs/current/errcodes-appendix.html>.
    pub fn from_sqlstate(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "23505" => DatabaseError::DuplicateEntry(message),
            "23503" => DatabaseError::ForeignKeyViolation(message),
            "23514" | "23502" => DatabaseError::ConstraintViolation(message),
            code if code.starts_with("08") => DatabaseError::ConnectionFailed(message),
            _ => DatabaseError::QueryFailed(message),
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            sqlx::Error::Database(db_err) => {
                let message = match db_err.constraint() {
                    Some(constraint) => format!("{} ({})", db_err.message(), constraint),
                    None => db_err.message().to_string(),
                };
                match db_err.code() {
                    Some(code) => DatabaseError::from_sqlstate(code.as_ref(), message),
                    None => DatabaseError::QueryFailed(message),
                }
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DatabaseError::Decode(error.to_string())
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(message) => PortError::NotFound {
                entity_type: "Record".to_string(),
                id: message,
            },
            DatabaseError::DuplicateEntry(message) => PortError::conflict(message),
            DatabaseError::ForeignKeyViolation(message)
            | DatabaseError::ConstraintViolation(message) => PortError::validation(message),
            DatabaseError::ConnectionFailed(message) => PortError::connection(message),
            DatabaseError::PoolExhausted => PortError::connection("connection pool exhausted"),
            other => PortError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlstate_classification() {
        assert!(matches!(
            DatabaseError::from_sqlstate("23505", "dup"),
            DatabaseError::DuplicateEntry(_)
        ));
        assert!(matches!(
            DatabaseError::from_sqlstate("23503", "fk"),
            DatabaseError::ForeignKeyViolation(_)
        ));
        assert!(matches!(
            DatabaseError::from_sqlstate("23514", "check"),
            DatabaseError::ConstraintViolation(_)
        ));
        assert!(DatabaseError::from_sqlstate("08006", "gone").is_connection_error());
        assert!(matches!(
            DatabaseError::from_sqlstate("42P01", "no table"),
            DatabaseError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_row_not_found() {
        assert!(DatabaseError::from(sqlx::Error::RowNotFound).is_not_found());
        assert!(matches!(
            DatabaseError::from(sqlx::Error::PoolTimedOut),
            DatabaseError::PoolExhausted
        ));
    }

    #[test]
    fn test_port_error_mapping() {
        let conflict: PortError = DatabaseError::DuplicateEntry("cpf".into()).into();
        assert!(conflict.is_conflict());

        let missing: PortError = DatabaseError::not_found("Producer", 1).into();
        assert!(missing.is_not_found());

        let transient: PortError = DatabaseError::PoolExhausted.into();
        assert!(transient.is_transient());

        let check: PortError = DatabaseError::ConstraintViolation("area".into()).into();
        assert!(matches!(check, PortError::Validation { .. }));
    }
}
