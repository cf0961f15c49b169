//! Backend description: one level graph per qudit line.

use serde::{Deserialize, Serialize};

use qudit_ir::{IrError, QuditId};

use crate::error::CompileResult;
use crate::level_graph::LevelGraph;

fn default_sensitivity() -> f64 {
    1.0
}

/// One native transition in a serialized backend description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeDescription {
    /// Lower endpoint level.
    pub a: usize,
    /// Upper endpoint level.
    pub b: usize,
    /// Hardware sensitivity weight.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
}

/// Serialized description of one qudit line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDescription {
    /// Number of energy levels.
    pub dim: usize,
    /// Native transitions between levels.
    pub edges: Vec<EdgeDescription>,
    /// Directly initializable (anchor) levels.
    pub anchors: Vec<usize>,
}

/// Serialized description of a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendDescription {
    /// Backend name.
    pub name: String,
    /// One description per qudit line.
    pub lines: Vec<LineDescription>,
}

/// A compilation target: a named set of per-line energy-level graphs.
///
/// The graphs are mutated in place as passes commit level swaps and frame
/// phases, so a backend tracks the mapping state across a compilation.
#[derive(Debug, Clone)]
pub struct Backend {
    /// Backend name.
    pub name: String,
    energy_level_graphs: Vec<LevelGraph>,
}

impl Backend {
    /// Build a backend from per-line graphs.
    pub fn new(name: impl Into<String>, energy_level_graphs: Vec<LevelGraph>) -> Self {
        Self { name: name.into(), energy_level_graphs }
    }

    /// Build a backend from a serialized description.
    pub fn from_description(description: &BackendDescription) -> CompileResult<Self> {
        let mut graphs = Vec::with_capacity(description.lines.len());
        for line in &description.lines {
            let edges: Vec<(usize, usize, f64)> =
                line.edges.iter().map(|e| (e.a, e.b, e.sensitivity)).collect();
            graphs.push(LevelGraph::weighted(line.dim, &edges, &line.anchors)?);
        }
        Ok(Self::new(description.name.clone(), graphs))
    }

    /// Number of qudit lines.
    pub fn num_lines(&self) -> usize {
        self.energy_level_graphs.len()
    }

    /// Dimension of each line.
    pub fn dims(&self) -> Vec<usize> {
        self.energy_level_graphs.iter().map(LevelGraph::num_levels).collect()
    }

    /// The level graph of a line.
    pub fn graph(&self, line: QuditId) -> CompileResult<&LevelGraph> {
        self.energy_level_graphs.get(line.index()).ok_or_else(|| {
            IrError::LineNotFound {
                line: line.to_string(),
                num_lines: self.energy_level_graphs.len(),
            }
            .into()
        })
    }

    /// Mutable access to the level graph of a line.
    pub fn graph_mut(&mut self, line: QuditId) -> CompileResult<&mut LevelGraph> {
        let num_lines = self.energy_level_graphs.len();
        self.energy_level_graphs.get_mut(line.index()).ok_or_else(|| {
            IrError::LineNotFound { line: line.to_string(), num_lines }.into()
        })
    }
}
