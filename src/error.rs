//! Error taxonomy for slot-grid inference.
//!
//! Only failures that end the analysis of a photograph are represented here.
//! Strips rejected during consolidation are dropped silently (logged at debug
//! level) and numeric edge cases inside the signal analysis return sentinels.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("cannot run-length encode an empty sequence")]
    EmptyInput,

    #[error("found {found} candidate region(s); at least 2 are required")]
    InsufficientRegions { found: usize },

    #[error("none of the {strips} button strip(s) has a stable periodic signal")]
    NoReliableSignal { strips: usize },

    #[error("no separator span falls within the plausible slot width range")]
    NoGoodSlots,

    #[error("I/O failure: {0}")]
    Io(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GridError {
    /// Negative process return code for each failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            GridError::InsufficientRegions { .. } | GridError::EmptyInput => -1,
            GridError::NoReliableSignal { .. } => -2,
            GridError::NoGoodSlots => -3,
            GridError::Io(_) | GridError::Config(_) => -4,
        }
    }
}
