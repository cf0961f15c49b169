//! Qudit Local-Unitary Compilation Engine
//!
//! This crate lowers opaque d×d unitaries on single qudit lines into the
//! elementary operations the hardware can drive: two-level rotations and
//! virtual Z phases. Hardware connectivity is modeled per line by a
//! [`LevelGraph`]; rotations between non-adjacent levels are routed as
//! π-pulse detours, with virtual-Z frame bookkeeping keeping the physical
//! pulses faithful to the logical intent.
//!
//! # Overview
//!
//! Compilation is organized as passes over a circuit's instruction stream:
//! 1. **Decomposition**: [`passes::QrPass`] (column-by-column elimination)
//!    or [`passes::AdaptivePass`] (branch & bound, seeded by the QR cost)
//! 2. **Phase tracking**: [`passes::ZPropagation`] consolidates virtual Zs
//!    at one end of each run, [`passes::ZRemoval`] deletes the ones that
//!    cannot affect measurement statistics
//!
//! # Example
//!
//! ```rust
//! use num_complex::Complex64;
//! use qudit_ir::{Circuit, QuditId};
//! use qudit_compile::{Backend, LevelGraph, PassManager, PassRegistry};
//!
//! // One 3-level line, transitions 0-2 and 1-2, level 0 initializable.
//! let graph = LevelGraph::new(3, &[(0, 2), (1, 2)], &[0]).unwrap();
//! let mut backend = Backend::new("vee", vec![graph]);
//!
//! // An X gate between levels 0 and 1, given as an opaque unitary.
//! let mut x01 = qudit_ir::matrix::identity(3);
//! x01[[0, 0]] = Complex64::new(0.0, 0.0);
//! x01[[1, 1]] = Complex64::new(0.0, 0.0);
//! x01[[0, 1]] = Complex64::new(1.0, 0.0);
//! x01[[1, 0]] = Complex64::new(1.0, 0.0);
//! let mut circuit = Circuit::new("demo", vec![3]);
//! circuit.unitary("x01", QuditId(0), &x01).unwrap();
//!
//! let registry = PassRegistry::with_builtin_passes();
//! let pm = PassManager::from_names(
//!     &registry,
//!     &["qr-decomposition", "z-propagation", "z-removal"],
//! )
//! .unwrap();
//! let compiled = pm.run(&circuit, &mut backend).unwrap();
//! assert!(!compiled.is_empty());
//! ```

pub mod adaptive;
pub mod backend;
pub mod cost;
pub mod error;
pub mod level_graph;
pub mod pass;
pub mod qr;
pub mod router;
pub mod tolerances;

// Built-in passes
pub mod passes;

pub use adaptive::{AdaptiveDecomposer, SearchOutcome};
pub use backend::{Backend, BackendDescription, EdgeDescription, LineDescription};
pub use cost::{Cost, rotation_cost, theta_cost};
pub use error::{CompileError, CompileResult};
pub use level_graph::{Edge, LevelGraph, NodeRole};
pub use pass::{CompilerPass, PassManager, PassRegistry};
pub use qr::{PhaseRestoreMode, QrDecomposer, QrOutput};
pub use router::{RoutePlan, estimate, gate_chain_condition, route_commit};
