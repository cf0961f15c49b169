//! Phase-tracker passes: commute and consolidate virtual Z phases.
//!
//! A virtual Z commutes through a two-level rotation by shifting the
//! rotation's φ with the signed difference of the Z angles on its two
//! levels. Propagation walks each maximal same-line run of elementary
//! operations, absorbs every virtual Z into a running angle per level, and
//! re-emits one consolidated Z per level at the chosen end of the run. The
//! realized unitary is preserved exactly and the rotation count never
//! increases.

use qudit_ir::{Circuit, ElementaryOp, Instruction, QuditId, VirtualZ};

use crate::backend::Backend;
use crate::error::CompileResult;
use crate::pass::CompilerPass;
use crate::tolerances::TOL_DIAGONAL;

/// Which end of a run receives the consolidated virtual Zs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Consolidated Zs lead the run (back-to-front walk).
    Front,
    /// Consolidated Zs trail the run (front-to-back walk).
    Back,
}

/// Commutes virtual Zs to one end of every same-line run.
pub struct ZPropagation {
    direction: Direction,
}

impl ZPropagation {
    /// Propagation toward the front of each run.
    pub fn front() -> Self {
        Self { direction: Direction::Front }
    }

    /// Propagation toward the back of each run.
    pub fn back() -> Self {
        Self { direction: Direction::Back }
    }

    fn flush_run(
        &self,
        qudit: QuditId,
        dim: usize,
        run: &[ElementaryOp],
        out: &mut Vec<Instruction>,
    ) -> CompileResult<()> {
        let mut z = vec![0.0f64; dim];
        let mut rotations = Vec::with_capacity(run.len());
        match self.direction {
            Direction::Back => {
                for op in run {
                    match op {
                        ElementaryOp::Rotation(r) => {
                            let phi = r.phi + z[r.lev_a] - z[r.lev_b];
                            rotations.push(r.with_angles(r.theta, phi));
                        }
                        ElementaryOp::VirtualZ(v) => z[v.level] += v.phi,
                    }
                }
                out.extend(rotations.into_iter().map(Instruction::from));
                for (level, &angle) in z.iter().enumerate() {
                    if angle.abs() > TOL_DIAGONAL {
                        out.push(VirtualZ::new(qudit, dim, level, angle)?.into());
                    }
                }
            }
            Direction::Front => {
                for op in run.iter().rev() {
                    match op {
                        ElementaryOp::Rotation(r) => {
                            let phi = r.phi + z[r.lev_b] - z[r.lev_a];
                            rotations.push(r.with_angles(r.theta, phi));
                        }
                        ElementaryOp::VirtualZ(v) => z[v.level] += v.phi,
                    }
                }
                for (level, &angle) in z.iter().enumerate() {
                    if angle.abs() > TOL_DIAGONAL {
                        out.push(VirtualZ::new(qudit, dim, level, angle)?.into());
                    }
                }
                out.extend(rotations.into_iter().rev().map(Instruction::from));
            }
        }
        Ok(())
    }
}

impl CompilerPass for ZPropagation {
    fn name(&self) -> &str {
        "z-propagation"
    }

    fn transpile(&self, circuit: &Circuit, _backend: &mut Backend) -> CompileResult<Circuit> {
        let mut out = Vec::with_capacity(circuit.len());
        let mut run: Vec<ElementaryOp> = Vec::new();
        let mut run_line: Option<(QuditId, usize)> = None;

        for instruction in circuit {
            match instruction {
                Instruction::Elementary(op) => {
                    if let Some((qudit, dim)) = run_line {
                        if qudit != op.qudit() {
                            self.flush_run(qudit, dim, &run, &mut out)?;
                            run.clear();
                        }
                    }
                    run_line = Some((op.qudit(), op.dim()));
                    run.push(op.clone());
                }
                Instruction::Unitary(_) => {
                    // An undecomposed unitary blocks commutation.
                    if let Some((qudit, dim)) = run_line.take() {
                        self.flush_run(qudit, dim, &run, &mut out)?;
                        run.clear();
                    }
                    out.push(instruction.clone());
                }
            }
        }
        if let Some((qudit, dim)) = run_line {
            self.flush_run(qudit, dim, &run, &mut out)?;
        }
        Ok(circuit.with_instructions(out))
    }
}

/// Deletes virtual Zs that cannot affect measurement statistics: leading
/// Zs on lines not yet touched by any non-Z operation and trailing Zs with
/// no later non-Z operation on their line.
pub struct ZRemoval;

fn strip_leading_z(instructions: Vec<Instruction>, num_lines: usize) -> Vec<Instruction> {
    let mut touched = vec![false; num_lines];
    let mut untouched = num_lines;
    let mut out = Vec::with_capacity(instructions.len());
    let mut iter = instructions.into_iter();
    for instruction in iter.by_ref() {
        let line = instruction.qudit().index();
        if instruction.is_z() && line < num_lines && !touched[line] {
            continue;
        }
        if line < num_lines && !touched[line] {
            touched[line] = true;
            untouched -= 1;
        }
        out.push(instruction);
        if untouched == 0 {
            break;
        }
    }
    out.extend(iter);
    out
}

impl CompilerPass for ZRemoval {
    fn name(&self) -> &str {
        "z-removal"
    }

    fn transpile(&self, circuit: &Circuit, _backend: &mut Backend) -> CompileResult<Circuit> {
        let num_lines = circuit.num_lines();
        let forward = strip_leading_z(circuit.instructions().to_vec(), num_lines);
        let mut reversed: Vec<Instruction> = forward.into_iter().rev().collect();
        reversed = strip_leading_z(reversed, num_lines);
        reversed.reverse();
        Ok(circuit.with_instructions(reversed))
    }
}
