//! Error types for the tile pipeline.
//!
//! The variants mirror how each failure is handled: grid-contract errors
//! are isolated to one (file, variable) and logged; write and
//! configuration errors are infrastructure failures and stop the service.
//! Decoder-boundary errors (unreadable source, variable not found) have
//! their own type at that boundary, since only the caller there knows
//! which of them are benign.

use thiserror::Error;

/// Result type alias using TileError.
pub type TileResult<T> = Result<T, TileError>;

#[derive(Debug, Error)]
pub enum TileError {
    /// A field violated the coordinate contract (duplicate or non-finite
    /// axis values after normalization, mismatched constituent grids,
    /// value matrix not matching the axes). Logged, that variable is
    /// skipped, the rest of the file continues.
    #[error("degenerate grid: {0}")]
    DegenerateGrid(String),

    /// Artifact could not be persisted. Fatal; losing tiles silently is
    /// worse than stopping.
    #[error("write failed: {0}")]
    Write(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TileError {
    /// Whether this error must stop the service rather than skip one tile.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TileError::Write(_) | TileError::Config(_) | TileError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality_split() {
        assert!(!TileError::DegenerateGrid("dup".into()).is_fatal());
        assert!(TileError::Write("disk full".into()).is_fatal());
        assert!(TileError::Config("no regions".into()).is_fatal());
    }
}
