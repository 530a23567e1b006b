//! Dual evaluation: starting multipliers, reduced costs, and the
//! Lagrangian objective.
//!
//! For multipliers `u >= 0` the Lagrangian of the set-covering LP is
//!
//! ```text
//! L(u) = Σ_i u_i + Σ_j min(0, c_j - Σ_{i ∈ rows(j)} u_i)
//! ```
//!
//! and every value of `L` is a lower bound on the optimal cover cost.

use crate::error::{try_filled, ScpResult};
use crate::instance::ScpInstance;

/// Multipliers together with the reduced costs they induce.
///
/// The two vectors are kept consistent by routing every multiplier change
/// through [`DualState::shift_row`].
#[derive(Debug, Clone)]
pub struct DualState {
    /// One multiplier per row, never negative.
    pub(crate) dual: Vec<f64>,

    /// One reduced cost per column.
    pub(crate) reduced_costs: Vec<f64>,
}

impl DualState {
    /// Starting point of every run.
    ///
    /// Row `i` gets `min_{j ∈ cols(i)} c_j / |rows(j)|`, its cheapest share
    /// of a covering column's cost.
    pub fn initialize(instance: &ScpInstance) -> ScpResult<Self> {
        let mut dual = try_filled(instance.num_rows(), 0.0, "dual vector")?;
        for (row, u) in dual.iter_mut().enumerate() {
            *u = instance
                .cols_of_row(row)
                .iter()
                .map(|&col| f64::from(instance.cost(col)) / instance.col_size(col) as f64)
                .fold(f64::INFINITY, f64::min);
        }

        let mut reduced_costs = try_filled(instance.num_cols(), 0.0, "reduced costs")?;
        compute_reduced_costs(instance, &dual, &mut reduced_costs);

        Ok(Self { dual, reduced_costs })
    }

    /// Current multipliers.
    pub fn dual(&self) -> &[f64] {
        &self.dual
    }

    /// Reduced costs of the current multipliers.
    pub fn reduced_costs(&self) -> &[f64] {
        &self.reduced_costs
    }

    /// Lagrangian objective at the current multipliers.
    pub fn objective(&self) -> f64 {
        lagrangian_objective(&self.dual, &self.reduced_costs)
    }

    /// Add `delta` to the multiplier of `row` and push the change into the
    /// reduced costs of every column covering it.
    pub(crate) fn shift_row(&mut self, instance: &ScpInstance, row: usize, delta: f64) {
        self.dual[row] += delta;
        self.shift_reduced_costs(instance, row, delta);
    }

    /// Propagate a multiplier change of `row` that was already written to
    /// `dual`.
    pub(crate) fn shift_reduced_costs(&mut self, instance: &ScpInstance, row: usize, delta: f64) {
        for &col in instance.cols_of_row(row) {
            self.reduced_costs[col] -= delta;
        }
    }
}

/// Reduced costs `c_j - Σ_{i ∈ rows(j)} u_i`, recomputed from scratch.
pub fn compute_reduced_costs(instance: &ScpInstance, dual: &[f64], out: &mut [f64]) {
    assert_eq!(dual.len(), instance.num_rows());
    assert_eq!(out.len(), instance.num_cols());

    for (col, rc) in out.iter_mut().enumerate() {
        let covered: f64 = instance.rows_of_col(col).iter().map(|&row| dual[row]).sum();
        *rc = f64::from(instance.cost(col)) - covered;
    }
}

/// Lagrangian objective: the multiplier sum plus every negative reduced cost.
pub fn lagrangian_objective(dual: &[f64], reduced_costs: &[f64]) -> f64 {
    let multipliers: f64 = dual.iter().sum();
    let negative: f64 = reduced_costs.iter().filter(|&&rc| rc < 0.0).sum();
    multipliers + negative
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ScpInstance {
        // col 0 covers {0, 1}, col 1 covers {1, 2}, col 2 covers {2}
        ScpInstance::new(3, 3, vec![1, 1, 5], &[vec![0], vec![0, 1], vec![1, 2]]).unwrap()
    }

    #[test]
    fn test_initial_dual_is_cheapest_share() {
        let inst = chain();
        let state = DualState::initialize(&inst).unwrap();

        // shares: col 0 → 1/2, col 1 → 1/2, col 2 → 5
        assert_eq!(state.dual(), &[0.5, 0.5, 0.5]);
        assert_eq!(state.reduced_costs(), &[0.0, 0.0, 4.5]);
        assert!((state.objective() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_initial_dual_prefers_wide_columns() {
        // A single wide column is cheaper per row than the singletons.
        let inst = ScpInstance::new(
            2,
            3,
            vec![2, 3, 3],
            &[vec![0, 1], vec![0, 2]],
        )
        .unwrap();
        let state = DualState::initialize(&inst).unwrap();
        assert_eq!(state.dual(), &[1.0, 1.0]);
        assert!((state.objective() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_objective_counts_only_negative_reduced_costs() {
        let obj = lagrangian_objective(&[1.0, 2.0], &[-0.5, 3.0, -0.25]);
        assert!((obj - 2.25).abs() < 1e-12);
    }

    #[test]
    fn test_incremental_shift_matches_recompute() {
        let inst = chain();
        let mut state = DualState::initialize(&inst).unwrap();

        state.shift_row(&inst, 1, 0.3);
        state.shift_row(&inst, 0, -0.2);
        state.shift_row(&inst, 2, 1.25);

        let mut fresh = vec![0.0; inst.num_cols()];
        compute_reduced_costs(&inst, state.dual(), &mut fresh);
        for (a, b) in state.reduced_costs().iter().zip(&fresh) {
            assert!((a - b).abs() < 1e-12, "incremental {} vs recomputed {}", a, b);
        }
    }
}
