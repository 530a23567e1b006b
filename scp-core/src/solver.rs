//! Owned handle tying an instance to the results of its runs.

use crate::beasley::BeasleySubgradient;
use crate::error::{ScpError, ScpResult};
use crate::instance::ScpInstance;
use crate::settings::SubgradientSettings;
use crate::solution::SubgradientResult;
use crate::spectral::SpectralProjectedSubgradient;
use crate::store::ResultStore;

/// A loaded instance plus the best multipliers of its most recent run.
///
/// Each handle owns its instance and buffers; independent handles can run
/// on separate threads.
#[derive(Debug, Clone)]
pub struct DualBoundSolver {
    instance: ScpInstance,
    settings: SubgradientSettings,
    store: Option<ResultStore>,
}

impl DualBoundSolver {
    /// Wrap an instance with default settings.
    pub fn new(instance: ScpInstance) -> Self {
        Self::with_settings(instance, SubgradientSettings::default())
    }

    /// Wrap an instance with explicit settings.
    ///
    /// `max_iter` is taken from each run call rather than from `settings`.
    pub fn with_settings(instance: ScpInstance, settings: SubgradientSettings) -> Self {
        Self {
            instance,
            settings,
            store: None,
        }
    }

    /// Build the instance and wrap it.
    pub fn load(
        num_rows: usize,
        num_cols: usize,
        costs: Vec<u32>,
        rows: &[Vec<usize>],
    ) -> ScpResult<Self> {
        Ok(Self::new(ScpInstance::new(num_rows, num_cols, costs, rows)?))
    }

    /// The instance.
    pub fn instance(&self) -> &ScpInstance {
        &self.instance
    }

    /// Settings used for runs.
    pub fn settings(&self) -> &SubgradientSettings {
        &self.settings
    }

    /// Run the spectral projected subgradient method and keep its result.
    pub fn run_spectral_projected_subgradient(
        &mut self,
        max_iter: usize,
    ) -> ScpResult<SubgradientResult> {
        let settings = self.settings.clone().with_max_iter(max_iter);
        let result = SpectralProjectedSubgradient::new(&self.instance, &settings)?.run();
        self.store = Some(ResultStore::from_result(&result));
        Ok(result)
    }

    /// Run Beasley's subgradient method against `upper_bound` and keep its
    /// result.
    pub fn run_basic_subgradient(
        &mut self,
        max_iter: usize,
        upper_bound: f64,
    ) -> ScpResult<SubgradientResult> {
        let settings = self.settings.clone().with_max_iter(max_iter);
        let result = BeasleySubgradient::new(&self.instance, &settings, upper_bound)?.run();
        self.store = Some(ResultStore::from_result(&result));
        Ok(result)
    }

    /// Bound of the most recent run.
    pub fn best_objective(&self) -> ScpResult<f64> {
        Ok(self.result_store()?.best_objective())
    }

    /// Multipliers of the most recent run, one per row.
    pub fn dual_vector(&self) -> ScpResult<&[f64]> {
        Ok(self.result_store()?.dual_vector())
    }

    /// Reduced costs of the most recent run's multipliers, recomputed on
    /// every call.
    pub fn reduced_costs(&self) -> ScpResult<Vec<f64>> {
        self.result_store()?.reduced_costs(&self.instance)
    }

    /// Number of rows of the instance.
    pub fn num_rows(&self) -> usize {
        self.instance.num_rows()
    }

    /// Number of columns of the instance.
    pub fn num_cols(&self) -> usize {
        self.instance.num_cols()
    }

    fn result_store(&self) -> ScpResult<&ResultStore> {
        self.store.as_ref().ok_or(ScpError::NoResult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_solver() -> DualBoundSolver {
        DualBoundSolver::load(3, 3, vec![1, 1, 5], &[vec![0], vec![0, 1], vec![1, 2]]).unwrap()
    }

    #[test]
    fn test_no_result_before_run() {
        let solver = chain_solver();
        assert_eq!(solver.best_objective(), Err(ScpError::NoResult));
        assert!(solver.dual_vector().is_err());
        assert!(solver.reduced_costs().is_err());
        assert_eq!(solver.num_rows(), 3);
        assert_eq!(solver.num_cols(), 3);
    }

    #[test]
    fn test_results_are_idempotent() {
        let mut solver = chain_solver();
        let res = solver.run_spectral_projected_subgradient(300).unwrap();

        assert_eq!(solver.best_objective().unwrap(), res.objective);
        let d1 = solver.dual_vector().unwrap().to_vec();
        let d2 = solver.dual_vector().unwrap().to_vec();
        assert_eq!(d1, d2);
        assert_eq!(d1, res.dual);

        let rc1 = solver.reduced_costs().unwrap();
        let rc2 = solver.reduced_costs().unwrap();
        assert_eq!(rc1, rc2);
        assert_eq!(rc1.len(), 3);
    }

    #[test]
    fn test_later_run_replaces_result() {
        let mut solver = chain_solver();
        solver.run_spectral_projected_subgradient(0).unwrap();
        assert!((solver.best_objective().unwrap() - 1.5).abs() < 1e-12);

        solver.run_basic_subgradient(300, 2.0).unwrap();
        assert!((solver.best_objective().unwrap() - 2.0).abs() < 1e-6);
    }
}
