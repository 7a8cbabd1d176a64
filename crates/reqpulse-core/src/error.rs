//! Error types for reqpulse-core

use thiserror::Error;

/// Errors raised while validating a [`crate::MonitorConfig`].
///
/// Invalid configuration is rejected when the monitor is built, never at
/// request time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A sensitive parameter name was empty.
    #[error("sensitive parameter name must not be empty")]
    EmptySensitiveName,

    /// The mask token was empty.
    #[error("mask token must not be empty")]
    EmptyMaskToken,

    /// The mask token equals a configured sensitive parameter name.
    ///
    /// Allowing this would break masking idempotence: a masked value could
    /// be mistaken for a sensitive key on a second pass.
    #[error("mask token {0:?} collides with a sensitive parameter name")]
    MaskTokenCollision(String),
}
