//! Elementary operations: native two-level pulses and virtual phases.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{IrError, IrResult};
use crate::matrix;
use crate::qudit::QuditId;

/// A native two-level X/Y-type pulse between two levels of one qudit.
///
/// The embedded 2x2 block is
///
/// ```text
/// [[ cos(θ/2),            -i e^{-iφ} sin(θ/2) ],
///  [ -i e^{iφ} sin(θ/2),   cos(θ/2)           ]]
/// ```
///
/// at rows/columns `(lev_a, lev_b)` of the d×d identity. The levels are
/// kept ordered, `lev_a < lev_b`; the identity `R(-θ, φ) == R(θ, φ+π)`
/// lets any orientation be expressed in that form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// The qudit line this pulse acts on.
    pub qudit: QuditId,
    /// Dimension of the qudit line.
    pub dim: usize,
    /// Lower level of the driven pair.
    pub lev_a: usize,
    /// Upper level of the driven pair.
    pub lev_b: usize,
    /// Rotation angle.
    pub theta: f64,
    /// Rotation axis phase.
    pub phi: f64,
}

impl Rotation {
    /// Create a new rotation. Levels must satisfy `lev_a < lev_b < dim`.
    pub fn new(
        qudit: QuditId,
        dim: usize,
        lev_a: usize,
        lev_b: usize,
        theta: f64,
        phi: f64,
    ) -> IrResult<Self> {
        if lev_a >= lev_b {
            return Err(IrError::InvalidLevelPair { lev_a, lev_b });
        }
        if lev_b >= dim {
            return Err(IrError::LevelOutOfRange { level: lev_b, dim });
        }
        Ok(Self { qudit, dim, lev_a, lev_b, theta, phi })
    }

    /// The inverse pulse (negated angle).
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self { theta: -self.theta, ..self.clone() }
    }

    /// Same pulse with a replaced angle pair.
    #[must_use]
    pub fn with_angles(&self, theta: f64, phi: f64) -> Self {
        Self { theta, phi, ..self.clone() }
    }

    /// Whether the angle is within `tol` of ±π (a population-swapping pulse).
    pub fn is_near_pi(&self, tol: f64) -> bool {
        (self.theta.abs() - PI).abs() < tol
    }

    /// The d×d unitary of this pulse.
    pub fn matrix(&self) -> Array2<Complex64> {
        let mut m = matrix::identity(self.dim);
        let c = Complex64::new((self.theta / 2.0).cos(), 0.0);
        let s = (self.theta / 2.0).sin();
        m[[self.lev_a, self.lev_a]] = c;
        m[[self.lev_b, self.lev_b]] = c;
        m[[self.lev_a, self.lev_b]] = Complex64::new(0.0, -1.0) * Complex64::from_polar(s, -self.phi);
        m[[self.lev_b, self.lev_a]] = Complex64::new(0.0, -1.0) * Complex64::from_polar(s, self.phi);
        m
    }
}

/// A diagonal phase correction on one level, tracked algebraically.
///
/// Its matrix is the identity with `e^{iφ}` at `level`. Virtual phases are
/// commuted and consolidated by the phase-tracker passes rather than being
/// driven as physical pulses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualZ {
    /// The qudit line this phase acts on.
    pub qudit: QuditId,
    /// Dimension of the qudit line.
    pub dim: usize,
    /// The level receiving the phase.
    pub level: usize,
    /// The phase angle.
    pub phi: f64,
}

impl VirtualZ {
    /// Create a new virtual phase. `level` must be below `dim`.
    pub fn new(qudit: QuditId, dim: usize, level: usize, phi: f64) -> IrResult<Self> {
        if level >= dim {
            return Err(IrError::LevelOutOfRange { level, dim });
        }
        Ok(Self { qudit, dim, level, phi })
    }

    /// The d×d unitary of this phase.
    pub fn matrix(&self) -> Array2<Complex64> {
        let mut m = matrix::identity(self.dim);
        m[[self.level, self.level]] = Complex64::from_polar(1.0, self.phi);
        m
    }
}

/// An elementary operation emitted by the decomposition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementaryOp {
    /// A native two-level pulse.
    Rotation(Rotation),
    /// A virtual phase correction.
    VirtualZ(VirtualZ),
}

impl ElementaryOp {
    /// The qudit line this operation acts on.
    pub fn qudit(&self) -> QuditId {
        match self {
            ElementaryOp::Rotation(r) => r.qudit,
            ElementaryOp::VirtualZ(z) => z.qudit,
        }
    }

    /// Dimension of the targeted line.
    pub fn dim(&self) -> usize {
        match self {
            ElementaryOp::Rotation(r) => r.dim,
            ElementaryOp::VirtualZ(z) => z.dim,
        }
    }

    /// Whether this is a pure phase (Z-type) operation.
    pub fn is_z(&self) -> bool {
        matches!(self, ElementaryOp::VirtualZ(_))
    }

    /// The d×d unitary of this operation.
    pub fn matrix(&self) -> Array2<Complex64> {
        match self {
            ElementaryOp::Rotation(r) => r.matrix(),
            ElementaryOp::VirtualZ(z) => z.matrix(),
        }
    }

    /// Get the rotation if this is one.
    pub fn as_rotation(&self) -> Option<&Rotation> {
        match self {
            ElementaryOp::Rotation(r) => Some(r),
            ElementaryOp::VirtualZ(_) => None,
        }
    }
}

impl From<Rotation> for ElementaryOp {
    fn from(r: Rotation) -> Self {
        ElementaryOp::Rotation(r)
    }
}

impl From<VirtualZ> for ElementaryOp {
    fn from(z: VirtualZ) -> Self {
        ElementaryOp::VirtualZ(z)
    }
}
