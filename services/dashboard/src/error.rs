//! services/dashboard/src/error.rs
//!
//! Defines the primary error type for the entire dashboard service.

use crate::config::ConfigError;
use crate::stores::StoreError;
use grading_assistant_core::ports::PortError;

/// The primary error type for the `dashboard` service.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Represents an error that occurred during configuration loading or
    /// credential persistence.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the DocRouter port.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a failure surfaced by one of the domain stores.
    #[error("Store Error: {0}")]
    Store(#[from] StoreError),

    /// Represents a standard Input/Output error (e.g., reading an upload from disk).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
