//! Error types for carnet.

use thiserror::Error;

/// Result type alias using carnet's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for carnet operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found
    #[error("Note with id {0} not found")]
    NoteNotFound(uuid::Uuid),

    /// Category not found
    #[error("Category with id {0} not found")]
    CategoryNotFound(uuid::Uuid),

    /// Category name already taken (unique constraint)
    #[error("Category with name '{0}' already exists")]
    DuplicateCategoryName(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_note_not_found() {
        let id = Uuid::nil();
        let err = Error::NoteNotFound(id);
        assert_eq!(err.to_string(), format!("Note with id {} not found", id));
    }

    #[test]
    fn test_error_display_category_not_found() {
        let id = Uuid::new_v4();
        let err = Error::CategoryNotFound(id);
        assert_eq!(
            err.to_string(),
            format!("Category with id {} not found", id)
        );
    }

    #[test]
    fn test_error_display_duplicate_category_name() {
        let err = Error::DuplicateCategoryName("Work".to_string());
        assert_eq!(err.to_string(), "Category with name 'Work' already exists");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty title".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty title");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing DATABASE_URL".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing DATABASE_URL");
    }

    #[test]
    fn test_error_display_internal() {
        let err = Error::Internal("unexpected state".to_string());
        assert_eq!(err.to_string(), "Internal error: unexpected state");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
