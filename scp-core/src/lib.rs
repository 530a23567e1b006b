//! Lagrangian lower bounds for the set-covering problem.
//!
//! Given a 0/1 covering matrix (rows = elements, columns = sets with integer
//! costs), this crate maximizes the Lagrangian dual
//!
//! ```text
//! L(u) = Σ_i u_i + Σ_j min(0, c_j − Σ_{i covered by j} u_i),   u ≥ 0
//! ```
//!
//! by subgradient ascent. Every `L(u)` is a valid lower bound on the cost of
//! any cover, which makes the result usable as a node bound in
//! branch-and-bound or as a pricing signal (through the reduced costs).
//!
//! Two drivers are provided:
//!
//! - **Spectral projected subgradient** with momentum and a non-monotone
//!   line search (Crema, Loreto & Raydan, 2007).
//! - **Basic subgradient** with an upper-bound driven step and step halving
//!   on stagnation (Beasley, 1990).
//!
//! # Example
//!
//! ```
//! use scp_core::{DualBoundSolver, TerminationStatus};
//!
//! // row 0 is covered by columns {0, 1}, row 1 by {1, 2}
//! let mut solver = DualBoundSolver::load(2, 3, vec![1, 1, 1], &[vec![0, 1], vec![1, 2]])?;
//! let result = solver.run_spectral_projected_subgradient(300)?;
//!
//! assert_eq!(result.status, TerminationStatus::Optimal);
//! assert!((result.objective - 1.0).abs() < 1e-9);
//! assert_eq!(solver.reduced_costs()?.len(), 3);
//! # Ok::<(), scp_core::ScpError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod beasley;
pub mod dual;
pub mod error;
pub mod instance;
pub mod settings;
pub mod solution;
pub mod solver;
pub mod spectral;
pub mod store;
pub mod subgradient;

// Re-export main types
pub use beasley::BeasleySubgradient;
pub use dual::{compute_reduced_costs, lagrangian_objective, DualState};
pub use error::{ScpError, ScpResult};
pub use instance::ScpInstance;
pub use settings::{BeasleyParams, SpectralParams, SubgradientSettings};
pub use solution::{IterationRecord, SubgradientResult, TerminationStatus};
pub use solver::DualBoundSolver;
pub use spectral::SpectralProjectedSubgradient;
pub use store::ResultStore;

/// Run the spectral projected subgradient method on `instance`.
pub fn spectral_projected_subgradient(
    instance: &ScpInstance,
    settings: &SubgradientSettings,
) -> ScpResult<SubgradientResult> {
    Ok(SpectralProjectedSubgradient::new(instance, settings)?.run())
}

/// Run Beasley's subgradient method on `instance`, stepping towards
/// `1.05 · upper_bound`.
pub fn basic_subgradient(
    instance: &ScpInstance,
    settings: &SubgradientSettings,
    upper_bound: f64,
) -> ScpResult<SubgradientResult> {
    Ok(BeasleySubgradient::new(instance, settings, upper_bound)?.run())
}
