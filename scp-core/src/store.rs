//! Storage for the multipliers of the last completed run.

use crate::dual::compute_reduced_costs;
use crate::error::{try_filled, ScpResult};
use crate::instance::ScpInstance;
use crate::solution::SubgradientResult;

/// Best multipliers of a run and their bound.
///
/// Reduced costs are not cached; every call recomputes them from the stored
/// multipliers.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dual: Vec<f64>,
    objective: f64,
}

impl ResultStore {
    /// Keep the multipliers of a finished run.
    pub fn from_result(result: &SubgradientResult) -> Self {
        Self {
            dual: result.dual.clone(),
            objective: result.objective,
        }
    }

    /// Lagrangian bound of the stored multipliers.
    pub fn best_objective(&self) -> f64 {
        self.objective
    }

    /// Stored multipliers, one per row.
    pub fn dual_vector(&self) -> &[f64] {
        &self.dual
    }

    /// Reduced costs of the stored multipliers, one per column.
    pub fn reduced_costs(&self, instance: &ScpInstance) -> ScpResult<Vec<f64>> {
        let mut out = try_filled(instance.num_cols(), 0.0, "reduced costs")?;
        compute_reduced_costs(instance, &self.dual, &mut out);
        Ok(out)
    }

    /// Number of rows the multipliers belong to.
    pub fn num_rows(&self) -> usize {
        self.dual.len()
    }
}
