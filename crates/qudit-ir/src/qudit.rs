//! Qudit line addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qudit line within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuditId(pub u32);

impl QuditId {
    /// The line index as a usize, for indexing per-line state.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QuditId {
    fn from(id: u32) -> Self {
        QuditId(id)
    }
}

impl From<usize> for QuditId {
    fn from(id: usize) -> Self {
        QuditId(u32::try_from(id).expect("QuditId overflow: exceeds u32::MAX"))
    }
}
