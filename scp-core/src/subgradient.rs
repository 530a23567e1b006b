//! Subgradients of the Lagrangian.
//!
//! Column `j` belongs to the Lagrangian solution when its reduced cost is
//! below [`REDUCED_COST_TOL`]. The subgradient entry of row `i` is then
//! `1 - (number of such columns covering i)`: positive for uncovered rows,
//! negative for over-covered ones, and zero everywhere exactly when the
//! current multipliers are optimal.

use crate::instance::ScpInstance;
use crate::settings::REDUCED_COST_TOL;

/// Outcome of the sign-aware subgradient used by the Beasley driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubgradientNorm {
    /// The raw subgradient is the zero vector.
    Optimal,

    /// Squared Euclidean norm of the clamped subgradient (at least 1).
    Squared(u64),
}

/// Fill `subg` with the raw subgradient.
///
/// Returns `true` if it is the zero vector (the multipliers are optimal).
pub fn strict(instance: &ScpInstance, reduced_costs: &[f64], subg: &mut [i32]) -> bool {
    fill(instance, reduced_costs, subg);
    subg.iter().all(|&g| g == 0)
}

/// Fill `subg` with the subgradient, zeroing the negative entries of rows
/// whose multiplier already sits at zero.
///
/// Such rows cannot move further down, so stepping along them is wasted.
/// The optimality test looks at the vector before clamping; a non-optimal
/// vector whose clamped norm vanishes reports a norm of 1 so that the step
/// size stays finite.
pub fn sign_aware(
    instance: &ScpInstance,
    reduced_costs: &[f64],
    dual: &[f64],
    subg: &mut [i32],
) -> SubgradientNorm {
    assert_eq!(dual.len(), instance.num_rows());
    fill(instance, reduced_costs, subg);

    let mut optimal = true;
    let mut norm: u64 = 0;
    for (g, &u) in subg.iter_mut().zip(dual) {
        if *g == 0 {
            continue;
        }
        optimal = false;
        if *g < 0 && u < REDUCED_COST_TOL {
            *g = 0;
        } else {
            let v = i64::from(*g).unsigned_abs();
            norm += v * v;
        }
    }

    if optimal {
        SubgradientNorm::Optimal
    } else {
        SubgradientNorm::Squared(norm.max(1))
    }
}

fn fill(instance: &ScpInstance, reduced_costs: &[f64], subg: &mut [i32]) {
    assert_eq!(reduced_costs.len(), instance.num_cols());
    assert_eq!(subg.len(), instance.num_rows());

    subg.fill(1);
    for (col, &rc) in reduced_costs.iter().enumerate() {
        if rc < REDUCED_COST_TOL {
            for &row in instance.rows_of_col(col) {
                subg[row] -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ScpInstance {
        // col 0 covers {0, 1}, col 1 covers {1, 2}, col 2 covers {2}
        ScpInstance::new(3, 3, vec![1, 1, 5], &[vec![0], vec![0, 1], vec![1, 2]]).unwrap()
    }

    #[test]
    fn test_strict_counts_attractive_columns() {
        let inst = chain();
        let mut subg = vec![0; 3];

        // cols 0 and 1 attractive: row 1 is covered twice
        assert!(!strict(&inst, &[0.0, 0.0, 4.5], &mut subg));
        assert_eq!(subg, vec![0, -1, 0]);

        // nothing attractive: every row uncovered
        assert!(!strict(&inst, &[0.1, 0.1, 4.5], &mut subg));
        assert_eq!(subg, vec![1, 1, 1]);

        // exact cover by cols 0 and 2
        assert!(strict(&inst, &[-0.2, 0.3, -1.0], &mut subg));
        assert_eq!(subg, vec![0, 0, 0]);
    }

    #[test]
    fn test_tolerance_boundary() {
        let inst = chain();
        let mut subg = vec![0; 3];
        strict(&inst, &[1e-15, 1e-13, 4.5], &mut subg);
        // col 0 counts (below 1e-14), col 1 does not
        assert_eq!(subg, vec![0, 0, 1]);
    }

    #[test]
    fn test_sign_aware_clamps_rows_at_zero() {
        let inst = chain();
        let mut subg = vec![0; 3];

        let norm = sign_aware(&inst, &[0.0, 0.0, 4.5], &[1.0, 0.0, 1.0], &mut subg);
        // row 1 is over-covered but its multiplier is already zero
        assert_eq!(subg, vec![0, 0, 0]);
        assert_eq!(norm, SubgradientNorm::Squared(1));

        let norm = sign_aware(&inst, &[0.0, 0.0, 4.5], &[1.0, 0.5, 1.0], &mut subg);
        assert_eq!(subg, vec![0, -1, 0]);
        assert_eq!(norm, SubgradientNorm::Squared(1));

        let norm = sign_aware(&inst, &[0.1, 0.1, 4.5], &[0.0, 0.0, 0.0], &mut subg);
        assert_eq!(subg, vec![1, 1, 1]);
        assert_eq!(norm, SubgradientNorm::Squared(3));
    }

    #[test]
    fn test_sign_aware_optimal() {
        let inst = chain();
        let mut subg = vec![0; 3];
        let norm = sign_aware(&inst, &[-0.2, 0.3, -1.0], &[1.0, 0.0, 1.0], &mut subg);
        assert_eq!(norm, SubgradientNorm::Optimal);
    }
}
