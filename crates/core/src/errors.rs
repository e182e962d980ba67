//! Error types

use alloy_primitives::Address;
use thiserror::Error;

/// Core error types
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("Merge invariant violated: no incoming entry for market {0}")]
    MergeInvariant(Address),
}

/// Failure of a single contract call
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Contract call {method} failed: {reason}")]
    Call { method: &'static str, reason: String },

    #[error("Value returned by {method} does not fit: {value}")]
    Overflow { method: &'static str, value: String },
}

impl ContractError {
    pub fn call(method: &'static str, reason: impl ToString) -> Self {
        ContractError::Call {
            method,
            reason: reason.to_string(),
        }
    }
}

/// Price lookup errors
#[derive(Debug, Error)]
pub enum PriceFeedError {
    #[error("Price request failed: {0}")]
    Request(String),

    #[error("No price quoted for {0}")]
    NotFound(String),

    #[error("Invalid price response: {0}")]
    InvalidMessage(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Timeout waiting for price")]
    Timeout,
}

/// Snapshot fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Money market is not ready: {0}")]
    NotReady(&'static str),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Merge(#[from] CoreError),
}

/// Transaction errors
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("No account connected")]
    NoAccount,

    #[error("Session is not active")]
    NotReady,

    #[error("Transaction rejected: {0}")]
    Rejected(String),
}

/// Result type alias
pub type CoreResult<T> = Result<T, CoreError>;
pub type ContractResult<T> = Result<T, ContractError>;
pub type PriceFeedResult<T> = Result<T, PriceFeedError>;
pub type FetchResult<T> = Result<T, FetchError>;
pub type ExecutionResult<T> = Result<T, ExecutionError>;
