//! Built-in compilation passes.

pub mod decompose;
pub mod phase_tracker;

pub use decompose::{AdaptivePass, QrPass};
pub use phase_tracker::{Direction, ZPropagation, ZRemoval};
