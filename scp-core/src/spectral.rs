//! Spectral projected subgradient method with momentum.
//!
//! Follows Crema, Loreto & Raydan (2007), "Spectral projected subgradient
//! with a momentum term for the Lagrangian dual approach", Computers &
//! Operations Research 34(10).
//!
//! Each iteration:
//!
//! 1. `m ← alpha·g + mu·m` and a projected step `d = max(0, u + m) - u`.
//! 2. Non-monotone backtracking: the new objective must reach
//!    `worst + gamma·tau·(d·m)/alpha - eta_k`, where `worst` is the lowest
//!    objective among the last `M` iterates and `eta_k = eta_0 / k^1.1`
//!    vanishes. On failure `tau` halves and the step shrinks to `tau·d`.
//! 3. Spectral (Barzilai–Borwein) step scale from the accepted step:
//!    `alpha = tau·|d|² / (d·(g_old - g_new))`, reset to its initial value
//!    when the denominator is not positive.

use crate::dual::DualState;
use crate::error::{try_filled, ScpError, ScpResult};
use crate::instance::ScpInstance;
use crate::settings::{SpectralParams, SubgradientSettings, ZERO_TOL};
use crate::solution::{BestDual, IterationRecord, SubgradientResult, TerminationStatus};
use crate::subgradient;

/// Lowest objective among the last `len` iterates.
///
/// A ring buffer; the minimum is rescanned only when the slot being
/// overwritten held it and the new value is larger.
#[derive(Debug, Clone)]
pub(crate) struct ObjectiveWindow {
    values: Vec<f64>,
    next: usize,
    worst: f64,
    worst_idx: usize,
}

impl ObjectiveWindow {
    /// Window of `len` slots, all holding `initial`.
    pub(crate) fn new(len: usize, initial: f64) -> ScpResult<Self> {
        Ok(Self {
            values: try_filled(len, initial, "objective window")?,
            next: 1 % len,
            worst: initial,
            worst_idx: 0,
        })
    }

    pub(crate) fn worst(&self) -> f64 {
        self.worst
    }

    pub(crate) fn push(&mut self, value: f64) {
        let slot = self.next;
        self.values[slot] = value;
        self.next = (slot + 1) % self.values.len();

        if slot == self.worst_idx {
            if value <= self.worst {
                self.worst = value;
            } else {
                self.rescan(slot);
            }
        } else if value < self.worst {
            self.worst = value;
            self.worst_idx = slot;
        }
    }

    /// The minimum was evicted by a larger value. Ties resolve to the
    /// highest slot.
    fn rescan(&mut self, slot: usize) {
        self.worst = self.values[slot];
        self.worst_idx = slot;
        for (j, &v) in self.values.iter().enumerate().rev() {
            if v < self.worst {
                self.worst = v;
                self.worst_idx = j;
            }
        }
    }
}

/// Spectral projected subgradient driver.
///
/// Construction performs the initialization step; [`step`](Self::step)
/// runs one iteration and [`run`](Self::run) iterates to termination.
#[derive(Debug)]
pub struct SpectralProjectedSubgradient<'a> {
    instance: &'a ScpInstance,
    params: SpectralParams,
    max_iter: usize,
    verbose: bool,
    log_freq: usize,

    /// Current iterate and its reduced costs.
    state: DualState,

    /// Objective of the current iterate.
    objective: f64,

    /// Subgradient at the current iterate.
    subgradient: Vec<i32>,

    /// Scratch for the subgradient at the next iterate.
    next_subgradient: Vec<i32>,

    momentum: Vec<f64>,

    /// Full (tau = 1) projected step per row; meaningful on `changed` only.
    step_dir: Vec<f64>,

    /// Rows moved by the current step.
    changed: Vec<usize>,

    /// Spectral step scale.
    alpha: f64,

    /// Norm of the initial subgradient.
    eta0: f64,

    window: ObjectiveWindow,
    best: BestDual,
    iteration: usize,
    optimal: bool,
}

impl<'a> SpectralProjectedSubgradient<'a> {
    /// Initialize multipliers, reduced costs and the first subgradient.
    pub fn new(instance: &'a ScpInstance, settings: &SubgradientSettings) -> ScpResult<Self> {
        settings.validate()?;
        let params = settings.spectral;
        let n = instance.num_rows();

        let state = DualState::initialize(instance)?;
        let objective = state.objective();

        let mut subgradient = try_filled(n, 0_i32, "subgradient")?;
        let next_subgradient = try_filled(n, 0_i32, "subgradient")?;
        let momentum = try_filled(n, 0.0, "momentum")?;
        let step_dir = try_filled(n, 0.0, "step direction")?;
        let mut changed = Vec::new();
        changed
            .try_reserve_exact(n)
            .map_err(|_| ScpError::OutOfMemory { what: "changed rows", len: n })?;

        let optimal = subgradient::strict(instance, state.reduced_costs(), &mut subgradient);
        let eta0 = subgradient
            .iter()
            .map(|&g| f64::from(g) * f64::from(g))
            .sum::<f64>()
            .sqrt();

        let window = ObjectiveWindow::new(params.window, objective)?;
        let best = BestDual::new(state.dual(), objective)?;

        if settings.verbose {
            log::info!(
                "Spectral projected subgradient: {} rows, {} cols, {} nonzeros, initial bound {:.6}",
                n,
                instance.num_cols(),
                instance.num_nonzeros(),
                objective
            );
        }

        Ok(Self {
            instance,
            params,
            max_iter: settings.max_iter,
            verbose: settings.verbose,
            log_freq: settings.log_freq,
            state,
            objective,
            subgradient,
            next_subgradient,
            momentum,
            step_dir,
            changed,
            alpha: params.initial_step,
            eta0,
            window,
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

    /// Lowest objective in the line-search window.
    pub fn worst_objective(&self) -> f64 {
        self.window.worst()
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
        let alpha = self.alpha;
        let instance = self.instance;
        let p = self.params;

        // Momentum direction and projected step
        self.changed.clear();
        let mut product = 0.0;
        for row in 0..instance.num_rows() {
            let m = alpha * f64::from(self.subgradient[row]) + p.momentum * self.momentum[row];
            self.momentum[row] = m;

            let u = self.state.dual[row];
            let delta = (u + m).max(0.0) - u;
            if delta.abs() > ZERO_TOL {
                self.step_dir[row] = delta;
                product += delta * m;
                self.state.shift_row(instance, row, delta);
                self.changed.push(row);
            }
        }
        let mut objective = self.state.objective();

        // Non-monotone line search along the projected step
        product /= alpha;
        let mut tau = 1.0;
        let eta = if k == 0 {
            f64::INFINITY
        } else {
            self.eta0 / (k as f64).powf(p.eta_exponent)
        };
        let mut threshold = self.window.worst() + p.gamma * tau * product - eta;
        while objective < threshold {
            tau *= 0.5;
            for &row in &self.changed {
                let back = tau * self.step_dir[row];
                if back.abs() > ZERO_TOL {
                    self.state.shift_row(instance, row, -back);
                }
            }
            objective = self.state.objective();
            threshold -= p.gamma * tau * product;
        }
        self.objective = objective;

        self.best.offer(self.state.dual(), objective);

        self.optimal = subgradient::strict(
            instance,
            self.state.reduced_costs(),
            &mut self.next_subgradient,
        );
        self.iteration += 1;

        if !self.optimal {
            // Spectral step scale over the rows that moved
            let mut num = 0.0;
            let mut den = 0.0;
            for &row in &self.changed {
                let d = self.step_dir[row];
                num += d * d;
                den += d * f64::from(self.subgradient[row] - self.next_subgradient[row]);
            }
            self.alpha = if den < ZERO_TOL {
                p.initial_step
            } else {
                tau * num / den
            };

            self.window.push(objective);
        }
        std::mem::swap(&mut self.subgradient, &mut self.next_subgradient);

        if self.verbose && (k % self.log_freq == 0 || self.optimal) {
            log::debug!(
                "sps iter {:4}: obj={:.6} best={:.6} alpha={:.3e} tau={:.3e} moved={}",
                k,
                objective,
                self.best.objective,
                alpha,
                tau,
                self.changed.len()
            );
        }

        Some(IterationRecord {
            iteration: k,
            objective,
            best_objective: self.best.objective,
            step: alpha,
            tau,
            acceptance_threshold: threshold,
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
                "Spectral projected subgradient finished: {} after {} iterations, bound {:.6}",
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

    fn path() -> ScpInstance {
        // col 0 covers {0}, col 1 covers {0, 1}, col 2 covers {1}
        ScpInstance::new(2, 3, vec![1, 1, 1], &[vec![0, 1], vec![1, 2]]).unwrap()
    }

    fn triangle() -> ScpInstance {
        // every column covers two of the three rows
        ScpInstance::new(3, 3, vec![1, 1, 1], &[vec![0, 2], vec![0, 1], vec![1, 2]]).unwrap()
    }

    fn chain() -> ScpInstance {
        // col 0 covers {0, 1}, col 1 covers {1, 2}, col 2 covers {2}
        ScpInstance::new(3, 3, vec![1, 1, 5], &[vec![0], vec![0, 1], vec![1, 2]]).unwrap()
    }

    #[test]
    fn test_window_tracks_minimum() {
        let mut w = ObjectiveWindow::new(3, 5.0).unwrap();
        assert_eq!(w.worst(), 5.0);

        w.push(4.0); // slot 1
        assert_eq!(w.worst(), 4.0);
        w.push(6.0); // slot 2
        assert_eq!(w.worst(), 4.0);
        w.push(7.0); // slot 0 (held 5.0, not the minimum)
        assert_eq!(w.worst(), 4.0);
        w.push(8.0); // slot 1 evicts the minimum: rescan over {7, 8, 6}
        assert_eq!(w.worst(), 6.0);
        w.push(9.0); // slot 2 evicts 6.0 again: {7, 8, 9}
        assert_eq!(w.worst(), 7.0);
        w.push(1.0); // slot 0 evicts 7.0 with something lower
        assert_eq!(w.worst(), 1.0);
    }

    #[test]
    fn test_window_of_one_tracks_latest() {
        let mut w = ObjectiveWindow::new(1, 2.0).unwrap();
        w.push(3.0);
        assert_eq!(w.worst(), 3.0);
        w.push(1.0);
        assert_eq!(w.worst(), 1.0);
        w.push(1.5);
        assert_eq!(w.worst(), 1.5);
    }

    #[test]
    fn test_window_matches_brute_force() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0, 5.0, 8.0, 9.0, 7.0];
        let len = 4;
        let mut w = ObjectiveWindow::new(len, 2.5).unwrap();
        let mut history = vec![2.5];
        for &v in &values {
            w.push(v);
            history.push(v);
            let start = history.len().saturating_sub(len);
            let expected = history[start..].iter().cloned().fold(f64::INFINITY, f64::min);
            let seeded = if history.len() < len { 2.5_f64.min(expected) } else { expected };
            assert_eq!(w.worst(), seeded, "after pushing {}", v);
        }
    }

    #[test]
    fn test_optimal_at_start() {
        let inst = path();
        let settings = SubgradientSettings::default();
        let mut sps = SpectralProjectedSubgradient::new(&inst, &settings).unwrap();
        assert!(sps.is_optimal());
        assert!(sps.step().is_none());

        let res = sps.run();
        assert_eq!(res.status, TerminationStatus::Optimal);
        assert_eq!(res.iterations, 0);
        assert!((res.objective - 1.0).abs() < 1e-12);
        assert_eq!(res.dual, vec![0.5, 0.5]);
    }

    #[test]
    fn test_triangle_keeps_lp_bound() {
        // The starting multipliers (1/2 each) already attain the LP bound 3/2,
        // but the subgradient is not zero there, so the method keeps moving.
        let inst = triangle();
        let settings = SubgradientSettings::default();
        let res = SpectralProjectedSubgradient::new(&inst, &settings).unwrap().run();

        assert_eq!(res.status, TerminationStatus::MaxIterations);
        assert_eq!(res.iterations, 300);
        assert!((res.objective - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_chain_reaches_lp_bound() {
        // LP optimum is 2 (columns 0 and 1); the start is only 1.5.
        let inst = chain();
        let settings = SubgradientSettings::default();
        let res = SpectralProjectedSubgradient::new(&inst, &settings).unwrap().run();

        assert!(res.objective > 1.5);
        assert!((res.objective - 2.0).abs() < 1e-6, "bound {}", res.objective);
        assert!(res.improvements > 0);
    }

    #[test]
    fn test_iteration_invariants() {
        let inst = chain();
        let settings = SubgradientSettings::default();
        let mut sps = SpectralProjectedSubgradient::new(&inst, &settings).unwrap();
        let mut fresh = vec![0.0; inst.num_cols()];
        let mut last_best = sps.best_objective();

        for _ in 0..200 {
            let Some(rec) = sps.step() else { break };

            // non-monotone acceptance
            assert!(rec.objective >= rec.acceptance_threshold);
            assert!(rec.tau > 0.0 && rec.tau <= 1.0);

            // projection onto u >= 0
            assert!(sps.dual().iter().all(|&u| u >= 0.0));

            // incremental reduced costs agree with a full recompute
            compute_reduced_costs(&inst, sps.dual(), &mut fresh);
            for (a, b) in sps.reduced_costs().iter().zip(&fresh) {
                assert!((a - b).abs() < 1e-9);
            }

            assert!(rec.best_objective >= last_best);
            assert!(rec.best_objective >= rec.objective);
            last_best = rec.best_objective;
        }
    }

    #[test]
    fn test_backtracking_keeps_state_consistent() {
        // On the triangle the window minimum stays at 3/2 while iterates
        // oscillate, so some steps must be cut back by the line search.
        let inst = triangle();
        let settings = SubgradientSettings::default();
        let mut sps = SpectralProjectedSubgradient::new(&inst, &settings).unwrap();
        let mut fresh = vec![0.0; inst.num_cols()];
        let mut backtracked = 0;

        for _ in 0..300 {
            let Some(rec) = sps.step() else { break };
            if rec.tau < 1.0 {
                backtracked += 1;
            }

            assert!(rec.objective >= rec.acceptance_threshold);
            assert!(sps.dual().iter().all(|&u| u >= 0.0));

            compute_reduced_costs(&inst, sps.dual(), &mut fresh);
            for (a, b) in sps.reduced_costs().iter().zip(&fresh) {
                assert!((a - b).abs() < 1e-9, "tau={} rc {} vs {}", rec.tau, a, b);
            }
            let recomputed = crate::dual::lagrangian_objective(sps.dual(), &fresh);
            assert!((rec.objective - recomputed).abs() < 1e-9);
        }

        assert!(backtracked > 0);
    }

    #[test]
    fn test_first_step_uses_initial_scale() {
        let inst = chain();
        let settings = SubgradientSettings::default();
        let mut sps = SpectralProjectedSubgradient::new(&inst, &settings).unwrap();

        // subgradient at start is (0, -1, 0): only row 1 moves, by -0.1
        let rec = sps.step().unwrap();
        assert_eq!(rec.step, 0.1);
        assert_eq!(rec.tau, 1.0);
        assert_eq!(rec.acceptance_threshold, f64::NEG_INFINITY);
        assert!((sps.dual()[1] - 0.4).abs() < 1e-12);
        assert!((rec.objective - 1.4).abs() < 1e-12);
        assert!((rec.best_objective - 1.5).abs() < 1e-12);
    }
}
