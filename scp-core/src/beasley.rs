//! Basic subgradient method with step-size halving.
//!
//! Follows Beasley (1990), "A Lagrangian heuristic for set-covering
//! problems", Naval Research Logistics 37(1). The step size is driven by a
//! known upper bound `UB`:
//!
//! ```text
//! step = lambda · (1.05·UB − L(u)) / |g|²
//! u    ← max(0, u + step·g)
//! ```
//!
//! `lambda` starts at 2 and halves whenever the best bound has not improved
//! for more than `stall_limit` consecutive iterations.

use crate::dual::DualState;
use crate::error::{try_filled, ScpError, ScpResult};
use crate::instance::ScpInstance;
use crate::settings::{BeasleyParams, SubgradientSettings, ZERO_TOL};
use crate::solution::{BestDual, IterationRecord, SubgradientResult, TerminationStatus};
use crate::subgradient::{self, SubgradientNorm};

/// Beasley subgradient driver.
#[derive(Debug)]
pub struct BeasleySubgradient<'a> {
    instance: &'a ScpInstance,
    params: BeasleyParams,
    max_iter: usize,
    verbose: bool,
    log_freq: usize,

    /// Cost of a known cover.
    upper_bound: f64,

    state: DualState,
    objective: f64,

    /// Sign-aware subgradient at the current iterate.
    subgradient: Vec<i32>,

    /// Its squared norm (at least 1).
    norm: u64,

    lambda: f64,

    /// Consecutive iterations without a better bound.
    stall: u32,

    best: BestDual,
    iteration: usize,
    optimal: bool,
}

impl<'a> BeasleySubgradient<'a> {
    /// Initialize multipliers, reduced costs and the first subgradient.
    ///
    /// `upper_bound` is the cost of some feasible cover (for benchmarking,
    /// the optimal one).
    pub fn new(
        instance: &'a ScpInstance,
        settings: &SubgradientSettings,
        upper_bound: f64,
    ) -> ScpResult<Self> {
        settings.validate()?;
        if !upper_bound.is_finite() {
            return Err(ScpError::InvalidSettings(format!(
                "upper bound must be finite, got {}",
                upper_bound
            )));
        }
        let params = settings.beasley;

        let state = DualState::initialize(instance)?;
        let objective = state.objective();

        let mut subgradient = try_filled(instance.num_rows(), 0_i32, "subgradient")?;
        let initial = subgradient::sign_aware(
            instance,
            state.reduced_costs(),
            state.dual(),
            &mut subgradient,
        );
        let (optimal, norm) = match initial {
            SubgradientNorm::Optimal => (true, 1),
            SubgradientNorm::Squared(norm) => (false, norm),
        };

        let best = BestDual::new(state.dual(), objective)?;

        let target = params.target_factor * upper_bound;
        if target < objective {
            log::warn!(
                "Step target {:.6} is below the initial bound {:.6}; is the upper bound a valid cover cost?",
                target,
                objective
            );
        }
        if settings.verbose {
            log::info!(
                "Beasley subgradient: {} rows, {} cols, {} nonzeros, UB {}, initial bound {:.6}",
                instance.num_rows(),
                instance.num_cols(),
                instance.num_nonzeros(),
                upper_bound,
                objective
            );
        }

        Ok(Self {
            instance,
            params,
            max_iter: settings.max_iter,
            verbose: settings.verbose,
            log_freq: settings.log_freq,
            upper_bound,
            state,
            objective,
            subgradient,
            norm,
            lambda: params.initial_lambda,
            stall: 0,
            best,
            iteration: 0,
            optimal,
        })
    }

    /// Current multipliers.
    pub fn dual(&self) -> &[f64] {
        self.state.dual()
    }

    /// Reduced costs of the current multipliers, maintained incrementally.
    pub fn reduced_costs(&self) -> &[f64] {
        self.state.reduced_costs()
    }

    /// Objective of the current iterate.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Best objective seen so far.
    pub fn best_objective(&self) -> f64 {
        self.best.objective
    }

    /// Current step multiplier.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Iterations performed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Whether the subgradient at the current iterate vanished.
    pub fn is_optimal(&self) -> bool {
        self.optimal
    }

    /// Perform one iteration.
    ///
    /// Returns `None` once the current iterate is optimal.
    pub fn step(&mut self) -> Option<IterationRecord> {
        if self.optimal {
            return None;
        }

        let k = self.iteration;
        let instance = self.instance;
        let step = self.lambda * (self.params.target_factor * self.upper_bound - self.objective)
            / self.norm as f64;

        for row in 0..instance.num_rows() {
            let mut delta = step * f64::from(self.subgradient[row]);
            let mut next = self.state.dual[row] + delta;
            if next < 0.0 {
                delta -= next;
                next = 0.0;
            }
            self.state.dual[row] = next;

            if delta.abs() > ZERO_TOL {
                self.state.shift_reduced_costs(instance, row, delta);
            }
        }
        let objective = self.state.objective();
        self.objective = objective;

        if self.best.offer(self.state.dual(), objective) {
            self.stall = 0;
        } else {
            self.stall += 1;
        }
        if self.stall > self.params.stall_limit {
            self.lambda *= 0.5;
            self.stall = 0;
        }

        match subgradient::sign_aware(
            instance,
            self.state.reduced_costs(),
            self.state.dual(),
            &mut self.subgradient,
        ) {
            SubgradientNorm::Optimal => self.optimal = true,
            SubgradientNorm::Squared(norm) => self.norm = norm,
        }
        self.iteration += 1;

        if self.verbose && (k % self.log_freq == 0 || self.optimal) {
            log::debug!(
                "beasley iter {:4}: obj={:.6} best={:.6} step={:.3e} lambda={}",
                k,
                objective,
                self.best.objective,
                step,
                self.lambda
            );
        }

        Some(IterationRecord {
            iteration: k,
            objective,
            best_objective: self.best.objective,
            step,
            tau: 1.0,
            acceptance_threshold: f64::NEG_INFINITY,
            optimal: self.optimal,
        })
    }

    /// Iterate until the subgradient vanishes or `max_iter` iterations have
    /// run, and return the bound.
    pub fn run(mut self) -> SubgradientResult {
        while self.iteration < self.max_iter && self.step().is_some() {}
        self.finish()
    }

    /// Final result without further iterations.
    ///
    /// An optimal iterate supersedes the tracked best.
    pub fn finish(self) -> SubgradientResult {
        let status = if self.optimal {
            TerminationStatus::Optimal
        } else {
            TerminationStatus::MaxIterations
        };

        let (objective, dual) = if self.optimal {
            (self.objective, self.state.dual)
        } else {
            (self.best.objective, self.best.dual)
        };

        if self.verbose {
            log::info!(
                "Beasley subgradient finished: {} after {} iterations, bound {:.6}",
                status,
                self.iteration,
                objective
            );
        }

        SubgradientResult {
            status,
            objective,
            dual,
            iterations: self.iteration,
            improvements: self.best.improvements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dual::compute_reduced_costs;

    fn triangle() -> ScpInstance {
        ScpInstance::new(3, 3, vec![1, 1, 1], &[vec![0, 2], vec![0, 1], vec![1, 2]]).unwrap()
    }

    fn chain() -> ScpInstance {
        // col 0 covers {0, 1}, col 1 covers {1, 2}, col 2 covers {2}
        ScpInstance::new(3, 3, vec![1, 1, 5], &[vec![0], vec![0, 1], vec![1, 2]]).unwrap()
    }

    #[test]
    fn test_rejects_non_finite_upper_bound() {
        let inst = chain();
        let err = BeasleySubgradient::new(&inst, &SubgradientSettings::default(), f64::NAN)
            .unwrap_err();
        assert!(matches!(err, ScpError::InvalidSettings(_)));
    }

    #[test]
    fn test_chain_reaches_lp_bound() {
        let inst = chain();
        let res = BeasleySubgradient::new(&inst, &SubgradientSettings::default(), 2.0)
            .unwrap()
            .run();
        assert!((res.objective - 2.0).abs() < 1e-6, "bound {}", res.objective);
        assert!(res.dual.iter().all(|&u| u >= 0.0));
    }

    #[test]
    fn test_first_step() {
        let inst = chain();
        let mut b = BeasleySubgradient::new(&inst, &SubgradientSettings::default(), 2.0).unwrap();

        // g = (0, -1, 0), |g|² = 1, step = 2·(2.1 − 1.5) = 1.2
        let rec = b.step().unwrap();
        assert!((rec.step - 1.2).abs() < 1e-12);
        // row 1 would go to 0.5 − 1.2 < 0 and is projected onto zero
        assert_eq!(b.dual()[1], 0.0);
        assert_eq!(b.dual()[0], 0.5);
        assert!((b.reduced_costs()[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_lambda_halves_when_stalled() {
        // The starting bound 3/2 is already the LP optimum, so nothing
        // improves and lambda halves after every 11 iterations.
        let inst = triangle();
        let mut b = BeasleySubgradient::new(&inst, &SubgradientSettings::default(), 2.0).unwrap();

        for _ in 0..10 {
            b.step().unwrap();
        }
        assert_eq!(b.lambda(), 2.0);
        b.step().unwrap();
        assert_eq!(b.lambda(), 1.0);
        for _ in 0..11 {
            b.step().unwrap();
        }
        assert_eq!(b.lambda(), 0.5);
        assert!((b.best_objective() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_iteration_invariants() {
        let inst = chain();
        let mut b = BeasleySubgradient::new(&inst, &SubgradientSettings::default(), 2.0).unwrap();
        let mut fresh = vec![0.0; inst.num_cols()];
        let mut last_best = b.best_objective();

        for _ in 0..300 {
            let Some(rec) = b.step() else { break };
            assert!(b.dual().iter().all(|&u| u >= 0.0));
            assert!(rec.best_objective >= last_best);
            last_best = rec.best_objective;

            compute_reduced_costs(&inst, b.dual(), &mut fresh);
            for (a, c) in b.reduced_costs().iter().zip(&fresh) {
                assert!((a - c).abs() < 1e-9);
            }
        }
    }
}
