//! Branch-and-bound search for cheaper decompositions.
//!
//! The QR elimination always clears the leftmost uncleared column with the
//! pivot directly above the target entry. The adaptive search widens that
//! choice: every column, every nonzero sub-diagonal entry in it, and every
//! pivot row between the diagonal and that entry is a candidate, and each
//! candidate whose routed cost stays within the bound is explored. The
//! cost bound prunes the tree and a node budget caps the traversal, so the
//! result is the cheapest diagonal reached within the budget. Candidates
//! are pushed so the stack pops leftmost-column, bottom-entry, topmost-pivot
//! moves first; that front runs straight down an elimination path, so a
//! complete decomposition is in hand within the first few visits whenever
//! the bound admits one.
//!
//! Candidate costs are always estimated against the level mapping the
//! search entered with. Estimates assume the mapping is restored after each
//! detour, so they compose over any elimination order, and the QR path in
//! particular prices out to exactly the seed bound.

use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::FRAC_PI_2;
use tracing::debug;

use qudit_ir::{ElementaryOp, QuditId, Rotation, VirtualZ};

use crate::error::{CompileError, CompileResult};
use crate::cost::{Cost, theta_cost};
use crate::level_graph::LevelGraph;
use crate::router::{estimate, route_commit};
use crate::tolerances::{TOL_COST_BOUND, TOL_DIAGONAL, TOL_ZERO_ENTRY};

/// Outcome of an adaptive search.
#[derive(Debug)]
pub enum SearchOutcome {
    /// A decomposition within the cost limit.
    Found {
        /// The routed, frame-conjugated pulse stream.
        ops: Vec<ElementaryOp>,
        /// Costs of the winning decomposition.
        cost: Cost,
        /// Graph with the winning route's swaps and phases committed.
        graph: LevelGraph,
    },
    /// No decomposition within the cost limit (or node budget).
    Infeasible,
}

/// One partial decomposition on the work stack.
struct SearchNode {
    residual: Array2<Complex64>,
    physical_cost: f64,
    algorithmic_cost: f64,
    rotations: Vec<Rotation>,
}

fn is_diagonal(u: &Array2<Complex64>) -> bool {
    qudit_ir::matrix::is_diagonal(u, TOL_DIAGONAL)
}

/// Depth-first branch-and-bound decomposer.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveDecomposer {
    /// Admission bound on the cumulative routed cost.
    pub cost_limit: f64,
    /// Soft cap on the number of expanded search nodes.
    pub max_nodes: usize,
}

impl AdaptiveDecomposer {
    /// Default node budget.
    pub const DEFAULT_MAX_NODES: usize = 20_000;

    /// Decomposer bounded by `cost_limit` with the default node budget.
    pub fn new(cost_limit: f64) -> Self {
        Self { cost_limit, max_nodes: Self::DEFAULT_MAX_NODES }
    }

    /// Search for the cheapest decomposition of `u` within the bound.
    ///
    /// The search itself never mutates `graph`; the winning route is
    /// replayed onto a phase-storing copy which is returned in the
    /// outcome for the caller to commit.
    pub fn search(
        &self,
        qudit: QuditId,
        u: &Array2<Complex64>,
        graph: &LevelGraph,
    ) -> CompileResult<SearchOutcome> {
        let dim = u.nrows();
        if u.ncols() != dim || dim != graph.num_levels() {
            return Err(CompileError::DimensionMismatch {
                gate_dim: dim.max(u.ncols()),
                line_dim: graph.num_levels(),
            });
        }

        let mut stack = vec![SearchNode {
            residual: u.clone(),
            physical_cost: 0.0,
            algorithmic_cost: 0.0,
            rotations: Vec::new(),
        }];
        let mut best: Option<SearchNode> = None;
        let mut visited = 0usize;

        while let Some(node) = stack.pop() {
            if visited >= self.max_nodes {
                break;
            }
            visited += 1;

            if is_diagonal(&node.residual) {
                let better = best.as_ref().is_none_or(|b| {
                    (node.physical_cost, node.algorithmic_cost)
                        < (b.physical_cost, b.algorithmic_cost)
                });
                if better {
                    best = Some(node);
                }
                continue;
            }

            // Push columns right to left, entries top to bottom, pivots
            // bottom to top, so the stack pops the leftmost column's lowest
            // entry with its topmost pivot first.
            for column in (0..dim - 1).rev() {
                for r in column + 1..dim {
                    if node.residual[[r, column]].norm() <= TOL_ZERO_ENTRY {
                        continue;
                    }
                    for r2 in (column..r).rev() {
                        let theta = 2.0
                            * node.residual[[r, column]]
                                .norm()
                                .atan2(node.residual[[r2, column]].norm());
                        let phi = -(FRAC_PI_2 + node.residual[[r2, column]].arg()
                            - node.residual[[r, column]].arg());
                        let rotation = Rotation::new(qudit, dim, r2, r, theta, phi)?;
                        let plan = estimate(&rotation, graph)?;
                        if node.physical_cost + plan.total_cost
                            > self.cost_limit + TOL_COST_BOUND
                        {
                            continue;
                        }
                        let mut rotations = node.rotations.clone();
                        rotations.push(rotation.clone());
                        stack.push(SearchNode {
                            residual: rotation.matrix().dot(&node.residual),
                            physical_cost: node.physical_cost + plan.total_cost,
                            algorithmic_cost: node.algorithmic_cost + theta_cost(theta),
                            rotations,
                        });
                    }
                }
            }
        }

        debug!(visited, found = best.is_some(), "adaptive search finished");
        let Some(best) = best else {
            return Ok(SearchOutcome::Infeasible);
        };

        // Replay the winning rotations physically; swaps persist and the
        // frame bookkeeping conjugates each landing pulse.
        let mut committed = graph.clone();
        if !committed.phase_storage_enabled() {
            committed.setup_phase_storage();
        }
        let mut ops: Vec<ElementaryOp> = Vec::new();
        for rotation in &best.rotations {
            ops.extend(
                route_commit(rotation, &mut committed)?
                    .into_iter()
                    .map(ElementaryOp::from),
            );
        }
        for level in 0..dim {
            let angle = best.residual[[level, level]].arg();
            if angle.abs() > TOL_DIAGONAL {
                let node = committed.position(level);
                ops.push(VirtualZ::new(qudit, dim, node, -angle)?.into());
            }
        }

        Ok(SearchOutcome::Found {
            ops,
            cost: Cost {
                physical: best.physical_cost,
                algorithmic: best.algorithmic_cost,
            },
            graph: committed,
        })
    }
}
