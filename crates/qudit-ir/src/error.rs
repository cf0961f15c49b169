//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A two-level operation named an invalid level pair.
    #[error("Invalid level pair ({lev_a}, {lev_b}): levels must be distinct and ordered")]
    InvalidLevelPair {
        /// Lower level of the pair.
        lev_a: usize,
        /// Upper level of the pair.
        lev_b: usize,
    },

    /// A level index does not exist in the given dimension.
    #[error("Level {level} out of range for a {dim}-level qudit")]
    LevelOutOfRange {
        /// The offending level index.
        level: usize,
        /// The qudit dimension.
        dim: usize,
    },

    /// An operation's dimension does not match the circuit line it targets.
    #[error("Dimension mismatch on {line}: operation has d={op_dim}, line has d={line_dim}")]
    DimensionMismatch {
        /// The targeted line, formatted as `q{n}`.
        line: String,
        /// Dimension carried by the operation.
        op_dim: usize,
        /// Dimension of the circuit line.
        line_dim: usize,
    },

    /// A unitary gate's matrix length does not match its dimension.
    #[error("Matrix length {len} does not match d*d = {expected} for a {dim}-level gate")]
    MatrixShape {
        /// Number of elements provided.
        len: usize,
        /// Expected number of elements (`dim * dim`).
        expected: usize,
        /// The gate dimension.
        dim: usize,
    },

    /// An instruction targets a line the circuit does not have.
    #[error("Qudit line {line} not found in circuit with {num_lines} lines")]
    LineNotFound {
        /// The targeted line, formatted as `q{n}`.
        line: String,
        /// Number of lines in the circuit.
        num_lines: usize,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
