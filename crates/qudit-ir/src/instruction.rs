//! Circuit instructions: elementary operations and opaque unitaries.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::ops::{ElementaryOp, Rotation, VirtualZ};
use crate::qudit::QuditId;

/// An opaque d×d unitary gate awaiting decomposition.
///
/// The matrix is stored row-major as a flat vector, which keeps the type
/// serializable; [`UnitaryGate::matrix`] reassembles the `Array2` view the
/// decomposition engine works on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitaryGate {
    /// Human-readable gate name.
    pub name: String,
    /// The qudit line this gate acts on.
    pub qudit: QuditId,
    /// Dimension of the gate (and line).
    pub dim: usize,
    /// Row-major d×d matrix elements.
    pub elements: Vec<Complex64>,
}

impl UnitaryGate {
    /// Create a new unitary gate from row-major elements.
    pub fn new(
        name: impl Into<String>,
        qudit: QuditId,
        dim: usize,
        elements: Vec<Complex64>,
    ) -> IrResult<Self> {
        if elements.len() != dim * dim {
            return Err(IrError::MatrixShape {
                len: elements.len(),
                expected: dim * dim,
                dim,
            });
        }
        Ok(Self { name: name.into(), qudit, dim, elements })
    }

    /// Create a gate directly from a d×d array.
    pub fn from_matrix(
        name: impl Into<String>,
        qudit: QuditId,
        matrix: &Array2<Complex64>,
    ) -> IrResult<Self> {
        let dim = matrix.nrows();
        if matrix.ncols() != dim {
            return Err(IrError::MatrixShape {
                len: matrix.len(),
                expected: dim * dim,
                dim,
            });
        }
        Ok(Self {
            name: name.into(),
            qudit,
            dim,
            elements: matrix.iter().copied().collect(),
        })
    }

    /// The d×d matrix of this gate.
    pub fn matrix(&self) -> Array2<Complex64> {
        Array2::from_shape_vec((self.dim, self.dim), self.elements.clone())
            .expect("element count validated at construction")
    }
}

/// One step of a circuit's instruction stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// An elementary operation the hardware can drive directly.
    Elementary(ElementaryOp),
    /// An opaque unitary to be lowered by a decomposition pass.
    Unitary(UnitaryGate),
}

impl Instruction {
    /// The qudit line this instruction acts on.
    pub fn qudit(&self) -> QuditId {
        match self {
            Instruction::Elementary(op) => op.qudit(),
            Instruction::Unitary(g) => g.qudit,
        }
    }

    /// Dimension of the targeted line.
    pub fn dim(&self) -> usize {
        match self {
            Instruction::Elementary(op) => op.dim(),
            Instruction::Unitary(g) => g.dim,
        }
    }

    /// Whether this is a virtual phase.
    pub fn is_z(&self) -> bool {
        matches!(self, Instruction::Elementary(ElementaryOp::VirtualZ(_)))
    }

    /// Get the elementary operation if this is one.
    pub fn as_elementary(&self) -> Option<&ElementaryOp> {
        match self {
            Instruction::Elementary(op) => Some(op),
            Instruction::Unitary(_) => None,
        }
    }
}

impl From<ElementaryOp> for Instruction {
    fn from(op: ElementaryOp) -> Self {
        Instruction::Elementary(op)
    }
}

impl From<Rotation> for Instruction {
    fn from(r: Rotation) -> Self {
        Instruction::Elementary(ElementaryOp::Rotation(r))
    }
}

impl From<VirtualZ> for Instruction {
    fn from(z: VirtualZ) -> Self {
        Instruction::Elementary(ElementaryOp::VirtualZ(z))
    }
}

impl From<UnitaryGate> for Instruction {
    fn from(g: UnitaryGate) -> Self {
        Instruction::Unitary(g)
    }
}
