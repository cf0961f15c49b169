//! Numeric thresholds shared by the decomposition engine.

/// Matrix entries below this magnitude are treated as zero when picking
/// rotation-synthesis pivots.
pub const TOL_ZERO_ENTRY: f64 = 1e-8;

/// Threshold for classifying a residual as diagonal and for dropping
/// negligible phase angles.
pub const TOL_DIAGONAL: f64 = 1e-4;

/// Detection window for population-swapping pulses in the frame bookkeeping:
/// an angle within this distance of ±π counts as a π-pulse.
pub const TOL_NEAR_PI: f64 = 1e-2;

/// Slack added to the branch-and-bound cost limit so floating-point noise
/// never rejects the seeding solution.
pub const TOL_COST_BOUND: f64 = 1e-12;
