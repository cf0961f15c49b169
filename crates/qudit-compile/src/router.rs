//! Routing of logical rotations onto the level graph.
//!
//! A rotation between two levels that are not graph-adjacent is realized as
//! a detour: a chain of π pulses walks one level along the shortest path
//! until the pair is adjacent, the rotation is driven there, and (when the
//! mapping must be preserved) the inverse chain walks it back. Each π pulse
//! commits a level swap, so later pulses route against the updated mapping.
//!
//! Frame bookkeeping: committed near-π pulses change the rotating frame of
//! the two nodes they touch. `graph_rule_update` folds that change into the
//! graph's phase accumulators; `graph_rule_ongate` corrects a logical
//! rotation's φ by the accumulated phases before it is emitted, so the
//! physical pulse realizes the logical intent.

use std::f64::consts::{FRAC_PI_2, PI};

use qudit_ir::Rotation;

use crate::error::{CompileError, CompileResult};
use crate::cost::rotation_cost;
use crate::level_graph::LevelGraph;
use crate::tolerances::TOL_NEAR_PI;

/// A routed rotation: the detour pulses, the landing pulse, and the costs.
#[derive(Debug, Clone)]
pub struct RoutePlan {
    /// Detour plus inverse-detour plus landing cost.
    pub total_cost: f64,
    /// Cost of the one-way π-pulse chain.
    pub pi_pulse_cost: f64,
    /// Cost of the landing pulse on the post-detour mapping.
    pub base_cost: f64,
    /// The π-pulse chain, in commit order, chain-conditioned.
    pub pi_pulses: Vec<Rotation>,
    /// The rotation on the adjacent node pair it lands on, with θ and φ
    /// already corrected for the chain walk and the node orientation, so
    /// `pi_pulses · placed · pi_pulses⁻¹` realizes the rotation exactly.
    pub placed: Rotation,
    /// Graph with the detour swaps committed.
    pub updated_graph: LevelGraph,
}

/// Flip the sign of `cur`'s angle when it shares exactly one level with the
/// immediately preceding pulse. Keeps a canonical chain direction so a
/// detour conjugates to the intended rotation exactly.
pub fn gate_chain_condition(prev: Option<&Rotation>, cur: Rotation) -> Rotation {
    let Some(prev) = prev else {
        return cur;
    };
    let shared = [cur.lev_a, cur.lev_b]
        .iter()
        .filter(|&&l| l == prev.lev_a || l == prev.lev_b)
        .count();
    if shared == 1 {
        let theta = -cur.theta;
        let phi = cur.phi;
        cur.with_angles(theta, phi)
    } else {
        cur
    }
}

fn pi_pulse(template: &Rotation, a: usize, b: usize) -> CompileResult<Rotation> {
    let (a, b) = (a.min(b), a.max(b));
    Ok(Rotation::new(template.qudit, template.dim, a, b, PI, -FRAC_PI_2)?)
}

/// Plan the routing of a logical rotation without touching `graph`.
///
/// The path runs between the nodes currently holding the rotation's two
/// levels. Each interior hop becomes one π pulse, costed against and then
/// committed (as a swap) to a private copy of the graph; the rotation
/// itself lands on the final adjacent pair. The total assumes the mapping
/// is restored afterwards: `2 · pi_pulse_cost + base_cost`.
pub fn estimate(rotation: &Rotation, graph: &LevelGraph) -> CompileResult<RoutePlan> {
    let na = graph.position(rotation.lev_a);
    let nb = graph.position(rotation.lev_b);
    let path = graph
        .shortest_path(na, nb)
        .ok_or(CompileError::RoutingFailed {
            lev_a: rotation.lev_a,
            lev_b: rotation.lev_b,
        })?;
    let mut g = graph.clone();
    let mut pi_pulses = Vec::new();
    let mut pi_pulse_cost = 0.0;
    let mut prev: Option<Rotation> = None;
    // Each committed π pulse swaps the walked level's place in the chain
    // and contributes a sign to the landing angle; `walker` tracks which
    // node the level currently occupies.
    let mut sign = 1.0;
    let mut walker = path[0];
    for hop in 0..path.len().saturating_sub(2) {
        let pulse = pi_pulse(rotation, path[hop], path[hop + 1])?;
        let pulse = gate_chain_condition(prev.as_ref(), pulse);
        if walker == pulse.lev_a {
            if pulse.theta > 0.0 {
                sign = -sign;
            }
            walker = pulse.lev_b;
        } else {
            if pulse.theta < 0.0 {
                sign = -sign;
            }
            walker = pulse.lev_a;
        }
        pi_pulse_cost += rotation_cost(&pulse, &g);
        g.swap(path[hop], path[hop + 1]);
        prev = Some(pulse.clone());
        pi_pulses.push(pulse);
    }
    let end_a = path[path.len() - 2];
    let end_b = path[path.len() - 1];
    let phi = if end_a < end_b {
        rotation.phi
    } else {
        -rotation.phi
    };
    let placed = Rotation::new(
        rotation.qudit,
        rotation.dim,
        end_a.min(end_b),
        end_a.max(end_b),
        sign * rotation.theta,
        phi,
    )?;
    let base_cost = rotation_cost(&placed, &g);
    Ok(RoutePlan {
        total_cost: 2.0 * pi_pulse_cost + base_cost,
        pi_pulse_cost,
        base_cost,
        pi_pulses,
        placed,
        updated_graph: g,
    })
}

/// Fold a committed near-π pulse's frame change into the graph's phase
/// accumulators. Call after the committing swap; pulses away from ±π leave
/// the frame untouched.
pub fn graph_rule_update(pulse: &Rotation, graph: &mut LevelGraph) {
    if !graph.phase_storage_enabled() || !pulse.is_near_pi(TOL_NEAR_PI) {
        return;
    }
    let sign = if pulse.theta > 0.0 { 1.0 } else { -1.0 };
    graph.add_phase(pulse.lev_b, pulse.phi - sign * FRAC_PI_2);
    graph.add_phase(pulse.lev_a, -pulse.phi - sign * FRAC_PI_2);
}

/// Physical image of a logical rotation under the current frame.
///
/// The pulse is driven on the nodes holding the rotation's levels, with φ
/// corrected by the difference of their accumulated phases; when the node
/// order inverts the level order, the orientation flip negates φ.
pub fn graph_rule_ongate(rotation: &Rotation, graph: &LevelGraph) -> CompileResult<Rotation> {
    let na = graph.position(rotation.lev_a);
    let nb = graph.position(rotation.lev_b);
    let phi = rotation.phi - graph.phase(na) + graph.phase(nb);
    let placed = if na < nb {
        Rotation::new(rotation.qudit, rotation.dim, na, nb, rotation.theta, phi)?
    } else {
        Rotation::new(rotation.qudit, rotation.dim, nb, na, rotation.theta, -phi)?
    };
    Ok(placed)
}

/// Route a logical rotation and commit the detour to `graph`.
///
/// Unlike [`estimate`], the swaps persist (no inverse chain) and the
/// landing pulse is frame-conjugated through `graph_rule_ongate`. Returns
/// the emitted pulses in order.
pub fn route_commit(rotation: &Rotation, graph: &mut LevelGraph) -> CompileResult<Vec<Rotation>> {
    let na = graph.position(rotation.lev_a);
    let nb = graph.position(rotation.lev_b);
    let path = graph
        .shortest_path(na, nb)
        .ok_or(CompileError::RoutingFailed {
            lev_a: rotation.lev_a,
            lev_b: rotation.lev_b,
        })?;
    let mut out = Vec::new();
    let mut prev: Option<Rotation> = None;
    for hop in 0..path.len().saturating_sub(2) {
        let pulse = pi_pulse(rotation, path[hop], path[hop + 1])?;
        let pulse = gate_chain_condition(prev.as_ref(), pulse);
        graph.swap(path[hop], path[hop + 1]);
        graph_rule_update(&pulse, graph);
        prev = Some(pulse.clone());
        out.push(pulse);
    }
    out.push(graph_rule_ongate(rotation, graph)?);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use num_complex::Complex64;
    use qudit_ir::QuditId;
    use qudit_ir::matrix::identity;

    fn rot(dim: usize, a: usize, b: usize, theta: f64, phi: f64) -> Rotation {
        Rotation::new(QuditId(0), dim, a, b, theta, phi).unwrap()
    }

    fn apply(ops: &[Rotation], dim: usize) -> Array2<Complex64> {
        let mut m = identity(dim);
        for op in ops {
            m = op.matrix().dot(&m);
        }
        m
    }

    #[test]
    fn test_chain_condition_shared_endpoint() {
        let prev = rot(4, 1, 2, PI, -FRAC_PI_2);
        let cur = rot(4, 2, 3, PI, -FRAC_PI_2);
        let flipped = gate_chain_condition(Some(&prev), cur.clone());
        assert_eq!(flipped.theta, -PI);

        // Disjoint pairs and identical pairs are untouched.
        let disjoint = rot(4, 0, 1, PI, -FRAC_PI_2);
        let kept = gate_chain_condition(Some(&rot(4, 2, 3, PI, 0.0)), disjoint.clone());
        assert_eq!(kept.theta, PI);
        let same = gate_chain_condition(Some(&cur), rot(4, 2, 3, 1.0, 0.0));
        assert_eq!(same.theta, 1.0);
        assert_eq!(gate_chain_condition(None, cur.clone()).theta, PI);
    }

    #[test]
    fn test_adjacent_rotation_needs_no_pulses() {
        let g = LevelGraph::new(3, &[(0, 2), (1, 2)], &[0]).unwrap();
        let plan = estimate(&rot(3, 1, 2, 1.0, 0.5), &g).unwrap();
        assert!(plan.pi_pulses.is_empty());
        assert_eq!(plan.pi_pulse_cost, 0.0);
        assert!((plan.total_cost - plan.base_cost).abs() < 1e-15);
    }

    fn level_permutation(g: &LevelGraph, dim: usize) -> Array2<Complex64> {
        let mut p = Array2::zeros((dim, dim));
        for (node, &level) in g.lpmap().iter().enumerate() {
            p[(node, level)] = Complex64::new(1.0, 0.0);
        }
        p
    }

    #[test]
    fn test_detour_conjugation_is_exact() {
        // Detour + landing pulse + inverse detour must equal the bare
        // rotation, for several path lengths on a line graph.
        let g = LevelGraph::new(
            6,
            &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)],
            &[0],
        )
        .unwrap();
        for &(a, b, theta, phi) in &[
            (0usize, 3usize, 1.1, 0.7),
            (1, 5, 2.2, -0.4),
            (0, 5, 0.9, 2.0),
            (2, 4, 1.3, 1.0),
        ] {
            let target = rot(6, a, b, theta, phi);
            let plan = estimate(&target, &g).unwrap();
            let mut seq = plan.pi_pulses.clone();
            seq.push(plan.placed.clone());
            seq.extend(plan.pi_pulses.iter().rev().map(Rotation::inverse));
            let diff = &apply(&seq, 6) - &target.matrix();
            let err = diff.iter().map(|c| c.norm()).fold(0.0, f64::max);
            assert!(err < 1e-12, "detour ({a},{b}) error {err}");
        }
    }

    #[test]
    fn test_detour_conjugation_on_moved_levels() {
        // With levels shuffled across the nodes, the detour sequence must
        // equal the rotation lifted through the mapping: P · R · P†.
        let mut g = LevelGraph::new(5, &[(0, 1), (1, 2), (2, 3), (3, 4)], &[0]).unwrap();
        g.swap(0, 2);
        g.swap(3, 4);
        g.swap(1, 3);
        let p = level_permutation(&g, 5);
        let pdag = p.t().map(|c| c.conj());
        for &(a, b, theta, phi) in &[
            (2usize, 3usize, 1.2, 0.3),
            (3, 4, 2.6, -1.1),
            (0, 2, 0.7, 1.9),
        ] {
            let target = rot(5, a, b, theta, phi);
            let plan = estimate(&target, &g).unwrap();
            let mut seq = plan.pi_pulses.clone();
            seq.push(plan.placed.clone());
            seq.extend(plan.pi_pulses.iter().rev().map(Rotation::inverse));
            let lifted = p.dot(&target.matrix()).dot(&pdag);
            let diff = &apply(&seq, 5) - &lifted;
            let err = diff.iter().map(|c| c.norm()).fold(0.0, f64::max);
            assert!(err < 1e-12, "moved detour ({a},{b}) error {err}");
        }
    }

    #[test]
    fn test_graph_rule_update_ignores_small_angles() {
        let mut g = LevelGraph::new(3, &[(0, 1), (1, 2)], &[0]).unwrap();
        g.setup_phase_storage();
        graph_rule_update(&rot(3, 0, 1, FRAC_PI_2, 0.3), &mut g);
        assert_eq!(g.phase(0), 0.0);
        assert_eq!(g.phase(1), 0.0);

        graph_rule_update(&rot(3, 0, 1, PI, 0.3), &mut g);
        assert!((g.phase(1) - (0.3 - FRAC_PI_2)).abs() < 1e-12);
        assert!((g.phase(0) - (-0.3 - FRAC_PI_2)).abs() < 1e-12);
    }

    #[test]
    fn test_ongate_orientation_flip() {
        let mut g = LevelGraph::new(3, &[(0, 1), (1, 2)], &[0]).unwrap();
        // Move level 2 to node 1 and level 1 to node 2.
        g.swap(1, 2);
        let placed = graph_rule_ongate(&rot(3, 1, 2, 0.8, 0.25), &g).unwrap();
        assert_eq!((placed.lev_a, placed.lev_b), (1, 2));
        assert!((placed.phi + 0.25).abs() < 1e-12);
        assert!((placed.theta - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_route_commit_persists_swaps() {
        let mut g = LevelGraph::new(4, &[(0, 1), (1, 2), (2, 3)], &[0]).unwrap();
        g.setup_phase_storage();
        let ops = route_commit(&rot(4, 0, 3, 1.0, 0.0), &mut g).unwrap();
        // Two interior hops, then the landing pulse.
        assert_eq!(ops.len(), 3);
        assert_ne!(g.lpmap(), &[0, 1, 2, 3]);
    }
}
