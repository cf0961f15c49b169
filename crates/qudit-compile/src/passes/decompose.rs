//! Decomposition passes: lower opaque unitaries to elementary pulses.

use tracing::debug;

use qudit_ir::Instruction;

use crate::adaptive::{AdaptiveDecomposer, SearchOutcome};
use crate::backend::Backend;
use crate::error::CompileResult;
use crate::pass::CompilerPass;
use crate::qr::{PhaseRestoreMode, QrDecomposer};

/// Expands every unitary instruction by QR elimination.
pub struct QrPass {
    decomposer: QrDecomposer,
}

impl QrPass {
    /// Hardware-output pass: routed detours on every rotation.
    pub fn new() -> Self {
        Self { decomposer: QrDecomposer::physical() }
    }

    /// Logical-output pass: bare rotations, no routing pulses.
    pub fn logical() -> Self {
        Self { decomposer: QrDecomposer::logical() }
    }
}

impl Default for QrPass {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerPass for QrPass {
    fn name(&self) -> &str {
        "qr-decomposition"
    }

    fn transpile_gate(
        &self,
        instruction: &Instruction,
        backend: &mut Backend,
    ) -> CompileResult<Vec<Instruction>> {
        let Instruction::Unitary(gate) = instruction else {
            return Ok(vec![instruction.clone()]);
        };
        let graph = backend.graph_mut(gate.qudit)?;
        let output = self.decomposer.decompose(gate.qudit, &gate.matrix(), graph)?;
        debug!(
            gate = %gate.name,
            ops = output.ops.len(),
            cost = output.total_cost,
            "qr expansion"
        );
        Ok(output.ops.into_iter().map(Instruction::Elementary).collect())
    }
}

/// Expands every unitary instruction by branch-and-bound search, seeded
/// with the QR cost as the feasible upper bound.
///
/// The winning route's level swaps and frame phases are committed to the
/// line's graph. When the search exhausts its node budget without a
/// solution the pass falls back to the plain QR expansion.
pub struct AdaptivePass {
    max_nodes: usize,
}

impl AdaptivePass {
    /// Pass with the default node budget.
    pub fn new() -> Self {
        Self { max_nodes: AdaptiveDecomposer::DEFAULT_MAX_NODES }
    }

    /// Pass with a custom node budget.
    pub fn with_max_nodes(max_nodes: usize) -> Self {
        Self { max_nodes }
    }
}

impl Default for AdaptivePass {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerPass for AdaptivePass {
    fn name(&self) -> &str {
        "adaptive-decomposition"
    }

    fn transpile_gate(
        &self,
        instruction: &Instruction,
        backend: &mut Backend,
    ) -> CompileResult<Vec<Instruction>> {
        let Instruction::Unitary(gate) = instruction else {
            return Ok(vec![instruction.clone()]);
        };
        let matrix = gate.matrix();
        let graph = backend.graph_mut(gate.qudit)?;

        // Seed the bound with the QR cost without disturbing the frame.
        let seed = QrDecomposer::logical()
            .with_phase_mode(PhaseRestoreMode::Restore)
            .decompose(gate.qudit, &matrix, graph)?;

        let search = AdaptiveDecomposer {
            cost_limit: seed.total_cost,
            max_nodes: self.max_nodes,
        }
        .search(gate.qudit, &matrix, graph)?;

        match search {
            SearchOutcome::Found { ops, cost, graph: committed } => {
                debug!(
                    gate = %gate.name,
                    physical = cost.physical,
                    seed = seed.total_cost,
                    "adaptive expansion"
                );
                *graph = committed;
                Ok(ops.into_iter().map(Instruction::Elementary).collect())
            }
            SearchOutcome::Infeasible => {
                debug!(gate = %gate.name, "adaptive search infeasible, using qr");
                let output =
                    QrDecomposer::physical().decompose(gate.qudit, &matrix, graph)?;
                Ok(output.ops.into_iter().map(Instruction::Elementary).collect())
            }
        }
    }
}
