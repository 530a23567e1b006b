use clap::ValueEnum;
use scp_core::{DualBoundSolver, ScpResult, SubgradientResult};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodChoice {
    /// Spectral projected subgradient with momentum
    Sps,
    /// Beasley's subgradient method (needs an upper bound)
    Basic,
}

impl MethodChoice {
    pub fn name(&self) -> &'static str {
        match self {
            MethodChoice::Sps => "spectral projected subgradient",
            MethodChoice::Basic => "basic subgradient",
        }
    }
}

pub fn run_with_choice(
    solver: &mut DualBoundSolver,
    choice: MethodChoice,
    max_iter: usize,
    upper_bound: Option<f64>,
) -> ScpResult<SubgradientResult> {
    match (choice, upper_bound) {
        (MethodChoice::Sps, _) => solver.run_spectral_projected_subgradient(max_iter),
        (MethodChoice::Basic, Some(ub)) => solver.run_basic_subgradient(max_iter, ub),
        (MethodChoice::Basic, None) => Err(scp_core::ScpError::InvalidSettings(
            "basic subgradient needs an upper bound".into(),
        )),
    }
}
