//! Qudit Circuit Intermediate Representation
//!
//! This crate provides the core data structures for representing circuits
//! over d-level systems (qudits). A circuit is an ordered stream of
//! instructions; compilation lowers every multi-level unitary into the
//! elementary operations the hardware can drive natively.
//!
//! # Core Components
//!
//! - **Qudits**: [`QuditId`] addresses one physical qudit line
//! - **Elementary operations**: [`Rotation`] (a native two-level X/Y-type
//!   pulse) and [`VirtualZ`] (a diagonal phase correction tracked
//!   algebraically), unified under [`ElementaryOp`]
//! - **Instructions**: [`Instruction`] is an elementary operation or an
//!   opaque [`UnitaryGate`] awaiting decomposition
//! - **Circuit**: [`Circuit`] holds the instruction stream plus per-line
//!   dimensions
//! - **Matrix helpers**: [`matrix`] provides small dense complex-matrix
//!   utilities shared by the decomposition engine and the tests
//!
//! # Example
//!
//! ```rust
//! use qudit_ir::{Circuit, QuditId};
//! use std::f64::consts::PI;
//!
//! // A single 3-level line with one native pulse and one virtual phase.
//! let mut circuit = Circuit::new("demo", vec![3]);
//! circuit.rotation(QuditId(0), 0, 1, PI / 2.0, 0.0).unwrap();
//! circuit.virtual_z(QuditId(0), 2, -PI / 4.0).unwrap();
//! assert_eq!(circuit.len(), 2);
//! ```

pub mod circuit;
pub mod error;
pub mod instruction;
pub mod matrix;
pub mod ops;
pub mod qudit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use instruction::{Instruction, UnitaryGate};
pub use ops::{ElementaryOp, Rotation, VirtualZ};
pub use qudit::QuditId;
