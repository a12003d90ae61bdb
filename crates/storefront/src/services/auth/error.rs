//! Authentication error types.

use thiserror::Error;

use orchard_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or wrong password - deliberately indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Registration against an existing email.
    #[error("an account with this email already exists")]
    UserAlreadyExists,

    /// Password fails the policy; the message says what to fix.
    #[error("{0}")]
    WeakPassword(String),

    /// Email fails structural validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Hashing infrastructure failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
