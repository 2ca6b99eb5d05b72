//! Error types for the simulation core.

use thiserror::Error;

/// Errors raised by the grid, the decoders and the trainer.
///
/// None of these are transient. They signal a programming or data-integrity
/// problem and are surfaced to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Grid index outside `[0, width) × [0, height)`.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },

    /// Genome data holds a symbol outside {0, 1, 2}.
    #[error("invalid genome symbol {symbol:?} at index {index}")]
    InvalidGenomeSymbol { index: usize, symbol: char },

    /// An action code outside the three known kinds.
    #[error("invalid action code {0}")]
    InvalidAction(u8),

    /// Genome data of the wrong length.
    #[error("genome length mismatch: expected {expected}, got {got}")]
    GenomeLength { expected: usize, got: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
