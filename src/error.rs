//! Bot error taxonomy
//!
//! Every variant is converted into a user-visible reply by the command router.
//! None of them terminate the process.

use mongodb::error::ErrorKind;
use thiserror::Error;

/// Reply sent when `/store` arrives without any text
pub const MISSING_ARGUMENT_REPLY: &str = "Please provide data to store after the /store command.";

/// Reply sent when a user has no stored record
pub const NOT_FOUND_REPLY: &str = "No data found for you.";

/// Reply sent for any store fault
pub const OPERATION_FAILED_REPLY: &str =
    "Sorry, the operation failed. Please try again later.";

/// Errors raised while handling a bot command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BotError {
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("No record found for user {0}")]
    RecordNotFound(i64),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store error: {0}")]
    StoreError(String),
}

impl BotError {
    /// Text shown to the caller for this error
    pub fn user_reply(&self) -> &'static str {
        match self {
            Self::MissingArgument(_) => MISSING_ARGUMENT_REPLY,
            Self::RecordNotFound(_) => NOT_FOUND_REPLY,
            Self::StoreUnavailable(_) | Self::StoreError(_) => OPERATION_FAILED_REPLY,
        }
    }

    /// Whether the error comes from the backing store
    pub fn is_store_fault(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::StoreError(_))
    }
}

impl From<mongodb::error::Error> for BotError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ConnectionPoolCleared { .. } => Self::StoreUnavailable(err.to_string()),
            _ => Self::StoreError(err.to_string()),
        }
    }
}

/// Result alias for command handling
pub type BotResult<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_argument_reply() {
        let err = BotError::MissingArgument("text");
        assert_eq!(err.user_reply(), MISSING_ARGUMENT_REPLY);
        assert!(!err.is_store_fault());
    }

    #[test]
    fn test_not_found_reply() {
        let err = BotError::RecordNotFound(42);
        assert_eq!(err.user_reply(), "No data found for you.");
        assert_eq!(err.to_string(), "No record found for user 42");
    }

    #[test]
    fn test_store_faults_share_generic_reply() {
        let unavailable = BotError::StoreUnavailable("no servers".to_string());
        let backend = BotError::StoreError("bad document".to_string());

        assert!(unavailable.is_store_fault());
        assert!(backend.is_store_fault());
        assert_eq!(unavailable.user_reply(), backend.user_reply());
        assert_eq!(backend.user_reply(), OPERATION_FAILED_REPLY);
    }

    #[test]
    fn test_io_error_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: BotError = mongodb::error::Error::from(io).into();
        assert!(matches!(err, BotError::StoreUnavailable(_)));
    }
}
