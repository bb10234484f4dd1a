//! Lifecycle error types
//!
//! The decision itself cannot fail; these errors are raised while building
//! the inputs (`PolicyConfig`, `CredentialSet`).

use thiserror::Error;

/// Errors raised when constructing engine inputs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Policy validation failed
    #[error("Invalid rotation policy: {reason}")]
    InvalidPolicy {
        /// What is wrong with the policy
        reason: String,
    },

    /// More keys than an identity may hold
    #[error("Identity {owner} has {count} credentials, at most 2 are allowed")]
    TooManyCredentials {
        /// Identity owning the keys
        owner: String,
        /// Number of keys supplied
        count: usize,
    },

    /// The same key appears twice
    #[error("Credential {key_id} appears more than once for identity {owner}")]
    DuplicateCredential {
        /// Identity owning the keys
        owner: String,
        /// Repeated key identifier
        key_id: String,
    },

    /// Keys from different identities were mixed into one set
    #[error("Credential set mixes identities {expected} and {found}")]
    MixedOwners {
        /// Owner of the first key
        expected: String,
        /// Conflicting owner
        found: String,
    },
}

/// Result type for lifecycle input construction
pub type LifecycleResult<T> = Result<T, LifecycleError>;
