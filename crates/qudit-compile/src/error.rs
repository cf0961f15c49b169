//! Error types for the compilation engine.

use qudit_ir::IrError;
use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Malformed level graph (out-of-range edge, bad anchor, disconnected).
    #[error("Malformed level graph: {0}")]
    Structural(String),

    /// No route exists between two levels.
    #[error("No route between levels {lev_a} and {lev_b}")]
    RoutingFailed {
        /// First level of the requested rotation.
        lev_a: usize,
        /// Second level of the requested rotation.
        lev_b: usize,
    },

    /// Elimination finished but the residual is not diagonal.
    #[error("Decomposition residual is not diagonal (off-diagonal norm {off_diagonal_norm:.3e})")]
    NonDiagonalResidual {
        /// Largest off-diagonal magnitude of the residual.
        off_diagonal_norm: f64,
    },

    /// Gate dimension does not match the targeted line's dimension.
    #[error("Gate dimension {gate_dim} does not match line dimension {line_dim}")]
    DimensionMismatch {
        /// Dimension of the gate's matrix.
        gate_dim: usize,
        /// Dimension of the targeted line's level graph.
        line_dim: usize,
    },

    /// A pass name was not found in the registry.
    #[error("Unknown pass '{0}'")]
    UnknownPass(String),

    /// An error from the IR layer.
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
