//! Error taxonomy shared by every component of the scheme.
//!
//! All fallible public operations return [`NomosError`]. There is no
//! panicking path through the public API outside of test code.

use thiserror::Error;

/// What kind of registration lookup failed in the multi-client extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    /// No such data owner has been registered.
    Owner,
    /// No such search user has been registered.
    User,
    /// The entity is already registered (duplicate registration).
    AlreadyRegistered,
}

impl core::fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            NotFoundKind::Owner => "owner",
            NotFoundKind::User => "user",
            NotFoundKind::AlreadyRegistered => "already-registered",
        };
        f.write_str(s)
    }
}

/// The closed error enum for this crate.
#[derive(Debug, Error)]
pub enum NomosError {
    /// The curve/PRNG backend could not be initialized, or a setup
    /// parameter was structurally invalid (e.g. a zero bucket count).
    #[error("init error: {reason}")]
    InitError {
        /// Human-readable reason.
        reason: String,
    },

    /// A multi-client search was requested by a `(owner_id, user_id)` pair
    /// that is unregistered, unauthorized, or whose authorization expired.
    #[error("unauthorized: owner={owner_id} user={user_id}")]
    UnauthorizedError {
        /// The data owner the caller tried to search under.
        owner_id: String,
        /// The search user that attempted the query.
        user_id: String,
    },

    /// A token's internal shape is inconsistent with the claimed `n`/`m`.
    #[error("malformed token: {reason}")]
    MalformedTokenError {
        /// Human-readable reason.
        reason: String,
    },

    /// An owner/user registration lookup failed.
    #[error("not found: {kind} '{id}'")]
    NotFoundError {
        /// What kind of entity was not found.
        kind: NotFoundKind,
        /// The identifier that was looked up.
        id: String,
    },

    /// A point failed to decode, a scalar was zero where non-zero was
    /// required, or an input was empty where non-empty was required.
    #[error("crypto error: {reason}")]
    CryptoError {
        /// Human-readable reason.
        reason: String,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, NomosError>;
