//! Error types for the layout engine.

use thiserror::Error;

/// Errors raised while configuring a simulation or session.
///
/// Stepping itself never fails on its own; only a force callback can.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    /// Integration order outside 1..=4.
    #[error("simulation stability must be between 1 and 4, inclusive (got {0})")]
    InvalidStability(u8),

    /// Host-supplied configuration could not be read.
    #[error("invalid layout config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
