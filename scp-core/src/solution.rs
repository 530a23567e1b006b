//! Driver results and the best-so-far tracker.

use std::fmt;

use crate::error::{try_filled, ScpResult};

/// Why a driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStatus {
    /// The subgradient vanished: the multipliers maximize the Lagrangian.
    Optimal,

    /// The iteration limit was reached; the best multipliers seen are
    /// returned.
    MaxIterations,
}

impl TerminationStatus {
    /// Returns true if optimality was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self, TerminationStatus::Optimal)
    }
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationStatus::Optimal => write!(f, "Optimal"),
            TerminationStatus::MaxIterations => write!(f, "MaxIterations"),
        }
    }
}

/// Outcome of a complete driver run.
#[derive(Debug, Clone)]
pub struct SubgradientResult {
    /// Termination status.
    pub status: TerminationStatus,

    /// Lower bound: the Lagrangian objective at `dual`.
    pub objective: f64,

    /// Best multipliers (or the optimal final iterate).
    pub dual: Vec<f64>,

    /// Iterations performed.
    pub iterations: usize,

    /// Number of times the best bound improved.
    pub improvements: u64,
}

/// Trace of one driver iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationRecord {
    /// Zero-based iteration index.
    pub iteration: usize,

    /// Objective of the accepted iterate.
    pub objective: f64,

    /// Best objective so far, including this iterate.
    pub best_objective: f64,

    /// Step scale used for this iteration (alpha for the spectral method,
    /// the step size for the Beasley method).
    pub step: f64,

    /// Backtracking factor the line search ended with (1 when the full step
    /// was accepted; always 1 for the Beasley method).
    pub tau: f64,

    /// Right-hand side of the acceptance test the iterate passed
    /// (`-inf` when there was no test).
    pub acceptance_threshold: f64,

    /// The subgradient at the new iterate vanished.
    pub optimal: bool,
}

/// Best multipliers seen so far, kept in a buffer of its own and refreshed
/// by copy whenever the bound improves.
#[derive(Debug, Clone)]
pub(crate) struct BestDual {
    pub(crate) dual: Vec<f64>,
    pub(crate) objective: f64,
    pub(crate) improvements: u64,
}

impl BestDual {
    pub(crate) fn new(dual: &[f64], objective: f64) -> ScpResult<Self> {
        let mut buf = try_filled(dual.len(), 0.0, "best dual vector")?;
        buf.copy_from_slice(dual);
        Ok(Self {
            dual: buf,
            objective,
            improvements: 0,
        })
    }

    /// Adopt `dual` if `objective` strictly improves the bound.
    ///
    /// Returns true if the incumbent changed.
    pub(crate) fn offer(&mut self, dual: &[f64], objective: f64) -> bool {
        if self.objective < objective {
            self.dual.copy_from_slice(dual);
            self.objective = objective;
            self.improvements += 1;
            true
        } else {
            false
        }
    }
}
