//! Cost model for physically placed rotations.
//!
//! Angle cost is linear in |θ|, normalized so a full π pulse costs 1e-3.
//! Placement multiplies the angle cost by the anchor-distance penalty of
//! the node pair the pulse is driven on.

use std::f64::consts::PI;

use qudit_ir::Rotation;

use crate::level_graph::LevelGraph;

/// Cost of a π pulse at an anchor.
pub const PI_PULSE_COST: f64 = 1e-3;

/// Angle cost of a rotation, `|θ| / π · 1e-3`.
pub fn theta_cost(theta: f64) -> f64 {
    theta.abs() / PI * PI_PULSE_COST
}

/// Physical cost of a rotation driven on the node pair `(lev_a, lev_b)` of
/// `graph`: the angle cost scaled by `min(anchor dist) + 1`, so pulses at
/// an anchor cost their bare angle cost.
pub fn rotation_cost(rotation: &Rotation, graph: &LevelGraph) -> f64 {
    let scale = graph
        .anchor_distance(rotation.lev_a)
        .min(graph.anchor_distance(rotation.lev_b))
        + 1;
    theta_cost(rotation.theta) * scale as f64
}

/// Cost pair carried by a finished decomposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cost {
    /// Routed cost including π-pulse detours and placement penalties.
    pub physical: f64,
    /// Bare angle cost of the logical rotations alone.
    pub algorithmic: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use qudit_ir::QuditId;

    #[test]
    fn test_theta_cost() {
        assert!((theta_cost(PI) - 1e-3).abs() < 1e-15);
        assert!((theta_cost(-PI / 2.0) - 0.5e-3).abs() < 1e-15);
        assert_eq!(theta_cost(0.0), 0.0);
    }

    #[test]
    fn test_rotation_cost_scales_with_anchor_distance() {
        let g = LevelGraph::new(4, &[(0, 1), (1, 2), (2, 3)], &[0]).unwrap();
        let near = Rotation::new(QuditId(0), 4, 0, 1, PI, 0.0).unwrap();
        let far = Rotation::new(QuditId(0), 4, 2, 3, PI, 0.0).unwrap();
        assert!((rotation_cost(&near, &g) - 1e-3).abs() < 1e-15);
        assert!((rotation_cost(&far, &g) - 3e-3).abs() < 1e-15);
    }
}
