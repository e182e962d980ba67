//! Core types and utilities for the MetaMoney client
//!
//! This crate provides shared types used across all components:
//! - Market entries and the snapshot merge
//! - Token amounts and fallible fields
//! - Interest rate conversion
//! - Known-symbol fallback table
//! - Configuration and errors

pub mod types;
pub mod tokens;
pub mod rates;
pub mod markets;
pub mod config;
pub mod errors;

pub use types::*;
pub use tokens::*;
pub use rates::*;
pub use markets::*;
pub use config::*;
pub use errors::*;
