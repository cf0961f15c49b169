//! Single-qudit circuit representation.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, UnitaryGate};
use crate::ops::{Rotation, VirtualZ};
use crate::qudit::QuditId;

/// An ordered stream of instructions over a register of qudit lines.
///
/// Each line carries its own dimension; instructions are validated against
/// the dimension of the line they target when pushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Circuit name.
    pub name: String,
    /// Dimension of each qudit line, indexed by [`QuditId`].
    dims: Vec<usize>,
    /// The instruction stream, in execution order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create an empty circuit over lines with the given dimensions.
    pub fn new(name: impl Into<String>, dims: Vec<usize>) -> Self {
        Self { name: name.into(), dims, instructions: Vec::new() }
    }

    /// Number of qudit lines.
    pub fn num_lines(&self) -> usize {
        self.dims.len()
    }

    /// Dimension of a line.
    pub fn dim(&self, line: QuditId) -> IrResult<usize> {
        self.dims.get(line.index()).copied().ok_or_else(|| IrError::LineNotFound {
            line: line.to_string(),
            num_lines: self.dims.len(),
        })
    }

    /// All line dimensions.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the circuit holds no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The instruction stream.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Append an instruction, validating it against its line's dimension.
    pub fn push(&mut self, instruction: impl Into<Instruction>) -> IrResult<()> {
        let instruction = instruction.into();
        let line_dim = self.dim(instruction.qudit())?;
        if instruction.dim() != line_dim {
            return Err(IrError::DimensionMismatch {
                line: instruction.qudit().to_string(),
                op_dim: instruction.dim(),
                line_dim,
            });
        }
        self.instructions.push(instruction);
        Ok(())
    }

    /// Append a rotation on `line`.
    pub fn rotation(
        &mut self,
        line: QuditId,
        lev_a: usize,
        lev_b: usize,
        theta: f64,
        phi: f64,
    ) -> IrResult<()> {
        let dim = self.dim(line)?;
        self.push(Rotation::new(line, dim, lev_a, lev_b, theta, phi)?)
    }

    /// Append a virtual phase on `line`.
    pub fn virtual_z(&mut self, line: QuditId, level: usize, phi: f64) -> IrResult<()> {
        let dim = self.dim(line)?;
        self.push(VirtualZ::new(line, dim, level, phi)?)
    }

    /// Append an opaque unitary on `line`.
    pub fn unitary(
        &mut self,
        name: impl Into<String>,
        line: QuditId,
        matrix: &Array2<Complex64>,
    ) -> IrResult<()> {
        self.push(UnitaryGate::from_matrix(name, line, matrix)?)
    }

    /// Replace the instruction stream wholesale, keeping name and dims.
    pub fn with_instructions(&self, instructions: Vec<Instruction>) -> Self {
        Self { name: self.name.clone(), dims: self.dims.clone(), instructions }
    }
}

impl IntoIterator for Circuit {
    type Item = Instruction;
    type IntoIter = std::vec::IntoIter<Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.into_iter()
    }
}

impl<'a> IntoIterator for &'a Circuit {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}
