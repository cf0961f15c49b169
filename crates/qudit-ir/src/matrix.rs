//! Small dense complex-matrix helpers.
//!
//! The decomposition engine works on d×d unitaries with d rarely above
//! ten, so everything here is plain `ndarray` with no factorization
//! libraries behind it.

use ndarray::Array2;
use num_complex::Complex64;

/// d×d complex identity.
pub fn identity(d: usize) -> Array2<Complex64> {
    Array2::from_shape_fn((d, d), |(i, j)| {
        if i == j {
            Complex64::new(1.0, 0.0)
        } else {
            Complex64::new(0.0, 0.0)
        }
    })
}

/// Conjugate transpose.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|c| c.conj())
}

/// Diagonal check with a non-degenerate diagonal: every off-diagonal
/// magnitude below `tol` and every diagonal magnitude above `tol`.
pub fn is_diagonal(m: &Array2<Complex64>, tol: f64) -> bool {
    let d = m.nrows();
    for i in 0..d {
        for j in 0..d {
            if i == j {
                if m[[i, j]].norm() <= tol {
                    return false;
                }
            } else if m[[i, j]].norm() >= tol {
                return false;
            }
        }
    }
    true
}

/// Whether `m` equals the identity up to a global phase, within `tol`.
pub fn is_identity_up_to_phase(m: &Array2<Complex64>, tol: f64) -> bool {
    distance_to_identity_up_to_phase(m) < tol
}

/// Max-entry distance between `m` and the nearest `e^{iγ}·I`.
///
/// The reference phase is read off the first diagonal entry with
/// non-negligible magnitude.
pub fn distance_to_identity_up_to_phase(m: &Array2<Complex64>) -> f64 {
    let d = m.nrows();
    let mut phase = Complex64::new(1.0, 0.0);
    for i in 0..d {
        let c = m[[i, i]];
        if c.norm() > 0.5 {
            phase = c / c.norm();
            break;
        }
    }
    let mut worst = 0.0f64;
    for i in 0..d {
        for j in 0..d {
            let expect = if i == j { phase } else { Complex64::new(0.0, 0.0) };
            worst = worst.max((m[[i, j]] - expect).norm());
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_checks() {
        let i3 = identity(3);
        assert!(is_diagonal(&i3, 1e-4));
        assert!(is_identity_up_to_phase(&i3, 1e-12));

        let phased = i3.mapv(|c| c * Complex64::from_polar(1.0, 0.9));
        assert!(is_identity_up_to_phase(&phased, 1e-12));
    }

    #[test]
    fn test_degenerate_diagonal_rejected() {
        let mut m = identity(3);
        m[[1, 1]] = Complex64::new(0.0, 0.0);
        assert!(!is_diagonal(&m, 1e-4));
    }

    #[test]
    fn test_off_diagonal_rejected() {
        let mut m = identity(3);
        m[[0, 2]] = Complex64::new(0.01, 0.0);
        assert!(!is_diagonal(&m, 1e-4));
        assert!(!is_identity_up_to_phase(&m, 1e-4));
    }

    #[test]
    fn test_dagger() {
        let mut m = identity(2);
        m[[0, 1]] = Complex64::new(0.0, 2.0);
        let dg = dagger(&m);
        assert!((dg[[1, 0]] - Complex64::new(0.0, -2.0)).norm() < 1e-15);
    }
}
