use crate::validation::FieldErrors;
use thiserror::Error;

/// Failure of a domain service call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed record does not exist ("Task", "Test execution", ...).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The write would break a relationship between records.
    #[error("{0}")]
    Conflict(String),

    /// The submission violates one or more field rules.
    #[error("validation failed: {0}")]
    Invalid(FieldErrors),

    /// DynamoDB or S3 rejected the call.
    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    /// Wraps an AWS SDK failure, e.g. `backend("DynamoDB put_item", e)`.
    pub fn backend(operation: &str, error: impl std::fmt::Display) -> Self {
        StoreError::Backend(format!("{} error: {}", operation, error))
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field, message);
        StoreError::Invalid(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_read_naturally() {
        assert_eq!(StoreError::NotFound("Task").to_string(), "Task not found");
        assert_eq!(
            StoreError::backend("DynamoDB query", "timeout").to_string(),
            "DynamoDB query error: timeout"
        );
        assert_eq!(
            StoreError::invalid("test_cases", "Expected 2 test case results, got 3").to_string(),
            "validation failed: test_cases: Expected 2 test case results, got 3"
        );
    }
}
