//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("ProjectId cannot be empty")]
    ProjectIdEmpty,

    #[error("ProjectId cannot exceed {max} characters (got {actual})")]
    ProjectIdTooLong { max: usize, actual: usize },

    #[error("UserId cannot be empty")]
    UserIdEmpty,

    #[error("UserId cannot exceed {max} characters (got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    #[error("Username cannot be empty")]
    UsernameEmpty,

    #[error("Username cannot exceed {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },
}

/// Errors related to Room domain logic
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// No live room exists for the project
    #[error("Room not found for project '{0}'")]
    NotFound(String),
}
