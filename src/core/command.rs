use async_trait::async_trait;
use tracing::{error, warn};
use crate::core::library::LibraryError;

#[derive(Debug)]
pub enum CommandError {
    Access {
        message: String,
        reason_code: Option<String>,
    },
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    NotFound {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Serialization {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Invariant {
        message: String,
    },
    Other {
        message: String,
        reason_code: Option<String>,
    },
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl CommandError {
    pub fn not_found(message: &str) -> CommandError {
        CommandError::NotFound { message: message.to_string() }
    }
}

impl From<LibraryError> for CommandError {
    fn from(other: LibraryError) -> Self {
        match other {
            LibraryError::Database { message, reason_code, retryable } => {
                CommandError::Database { message, reason_code, retryable }
            }
            LibraryError::AccessDenied { message, reason_code } => {
                CommandError::Access { message, reason_code }
            }
            LibraryError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                CommandError::Runtime { message, reason_code, retryable }
            }
            LibraryError::Validation { message, reason_code } => {
                warn!("rejected ({}): {}", reason_code.as_deref().unwrap_or("-"), message);
                CommandError::Validation { message, reason_code }
            }
            LibraryError::InvariantViolation { message } => {
                error!("invariant violated: {}", message);
                CommandError::Invariant { message }
            }
            LibraryError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            LibraryError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code, retryable: false }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::CommandError;
    use crate::core::library::{LibraryError, Rule};

    #[tokio::test]
    async fn test_should_build_command_error() {
        let _ = CommandError::Access { message: "test".to_string(), reason_code: None };
        let _ = CommandError::Database { message: "test".to_string(), reason_code: None, retryable: false };
        let _ = CommandError::Runtime { message: "test".to_string(), reason_code: None, retryable: false };
        let _ = CommandError::Serialization { message: "test".to_string() };
        let _ = CommandError::Validation { message: "test".to_string(), reason_code: None };
        let _ = CommandError::Invariant { message: "test".to_string() };
        let _ = CommandError::Other { message: "test".to_string(), reason_code: None };
    }

    #[tokio::test]
    async fn test_should_map_library_errors() {
        let err = CommandError::from(LibraryError::rejected(Rule::NoCopyAvailable, "none left"));
        assert!(matches!(err, CommandError::Validation { reason_code: Some(ref code), .. } if code == "no_copy_available"));
        let err = CommandError::from(LibraryError::invariant("negative copies"));
        assert!(matches!(err, CommandError::Invariant { .. }));
        let err = CommandError::from(LibraryError::unavailable("conflict", None, true));
        assert!(matches!(err, CommandError::Runtime { retryable: true, .. }));
    }
}
