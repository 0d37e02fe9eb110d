//! Error types for the cross-chain call orchestrator
//!
//! One invocation composes and submits at most one transaction, so every
//! error aborts the run: there is no partial-success state and no automatic
//! retry anywhere. Retrying a state-mutating operation risks double
//! submission; the caller must re-invoke explicitly.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Error taxonomy covering the full invocation lifecycle
///
/// - `Configuration`: bad local config or parameters, raised before any
///   network call
/// - `DerivationExhausted`: no bump nonce in 255..=0 produced an off-curve
///   address (fatal, practically unreachable)
/// - `RegistryUnavailable`: backing on-chain registry account is missing or
///   undecodable; signals misconfiguration, not a transient failure
/// - `UnsupportedOperation`: unknown (contract, method) pair, rejected
///   before any derivation or fetch
/// - `Submission`: network or on-chain rejection, surfaced verbatim
#[derive(Error, Debug)]
pub enum OrbitError {
    /// Bad local configuration or caller parameters
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No valid bump nonce found for the given seeds and program
    #[error("address derivation exhausted for program {program}")]
    DerivationExhausted {
        /// The owning program the derivation ran against
        program: Pubkey,
    },

    /// On-chain registry state missing or undecodable (non-retryable)
    #[error("registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// Unknown (contract, method) pair
    #[error("method '{method}' is not supported for contract '{contract}'. Valid methods: {}", valid.join(", "))]
    UnsupportedOperation {
        /// Contract name as given by the caller
        contract: String,
        /// Method name as given by the caller
        method: String,
        /// Methods the contract actually supports
        valid: Vec<&'static str>,
    },

    /// Transaction simulation/submission failure, with program error context
    #[error("submission failed: {0}")]
    Submission(String),
}

impl OrbitError {
    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration(reason.into())
    }

    /// Create a registry error
    pub fn registry(reason: impl Into<String>) -> Self {
        Self::RegistryUnavailable(reason.into())
    }

    /// Create a submission error
    pub fn submission(reason: impl Into<String>) -> Self {
        Self::Submission(reason.into())
    }

    /// Error category for log fields
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config",
            Self::DerivationExhausted { .. } => "derivation",
            Self::RegistryUnavailable(_) => "registry",
            Self::UnsupportedOperation { .. } => "dispatch",
            Self::Submission(_) => "submission",
        }
    }

    /// Whether the failure was caught before any network access
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::UnsupportedOperation { .. }
        )
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, OrbitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrbitError::configuration("missing contract address");
        assert_eq!(
            err.to_string(),
            "configuration error: missing contract address"
        );

        let err = OrbitError::UnsupportedOperation {
            contract: "xcall".to_string(),
            method: "frobnicate".to_string(),
            valid: vec!["initialize", "set_admin"],
        };
        assert_eq!(
            err.to_string(),
            "method 'frobnicate' is not supported for contract 'xcall'. Valid methods: initialize, set_admin"
        );
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(OrbitError::configuration("x").category(), "config");
        assert_eq!(OrbitError::registry("x").category(), "registry");
        assert_eq!(OrbitError::submission("x").category(), "submission");
    }

    #[test]
    fn test_local_errors() {
        assert!(OrbitError::configuration("x").is_local());
        assert!(!OrbitError::registry("x").is_local());
        assert!(!OrbitError::submission("x").is_local());
    }
}
