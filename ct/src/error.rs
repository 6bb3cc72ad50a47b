//! Crate error type.

use thiserror::Error;

/// CtError covers every domain-level failure surfaced to callers.
///
/// Lookups by id return `IssueNotFound`/`PostNotFound` instead of silently
/// doing nothing, so callers always learn when a mutation had no target.
#[derive(Debug, Error)]
pub enum CtError {
    #[error("issue not found: {0}")]
    IssueNotFound(String),

    #[error("post not found: {0}")]
    PostNotFound(String),

    #[error("invalid issue: {0}")]
    InvalidIssue(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid urgency: {0}")]
    InvalidUrgency(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("invalid theme: {0}")]
    InvalidTheme(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("a post needs content or an image")]
    EmptyPost,

    #[error("comment text is required")]
    EmptyComment,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("admin role required")]
    AdminRequired,

    #[error("only the author can modify this post")]
    NotPostAuthor,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for CtError {
    fn from(err: anyhow::Error) -> Self {
        CtError::Storage(err.to_string())
    }
}
