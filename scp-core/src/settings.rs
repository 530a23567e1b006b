//! Configuration settings for the subgradient drivers.

use crate::error::{ScpError, ScpResult};

/// Step deltas and spectral denominators at or below this magnitude are
/// treated as zero.
pub const ZERO_TOL: f64 = 1e-12;

/// A column with reduced cost below this value is part of the Lagrangian
/// solution; a multiplier below it sits on its lower bound.
pub const REDUCED_COST_TOL: f64 = 1e-14;

/// Parameters of the spectral projected subgradient method with momentum
/// (Crema, Loreto & Raydan, 2007).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralParams {
    /// Step scale used at start-up and whenever the spectral estimate
    /// is degenerate.
    pub initial_step: f64,

    /// Momentum weight applied to the previous direction.
    pub momentum: f64,

    /// Sufficient-increase factor of the non-monotone line search.
    pub gamma: f64,

    /// Number of recent objective values the line search compares against.
    pub window: usize,

    /// Exponent of the vanishing slack: eta_k = eta_0 / k^exponent.
    pub eta_exponent: f64,
}

impl Default for SpectralParams {
    fn default() -> Self {
        Self {
            initial_step: 0.1,
            momentum: 0.7,
            gamma: 0.1,
            window: 10,
            eta_exponent: 1.1,
        }
    }
}

/// Parameters of Beasley's subgradient method (Beasley, 1990).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeasleyParams {
    /// Initial step multiplier (lambda).
    pub initial_lambda: f64,

    /// Non-improving iterations tolerated before lambda is halved.
    pub stall_limit: u32,

    /// The step targets `target_factor * upper_bound`.
    pub target_factor: f64,
}

impl Default for BeasleyParams {
    fn default() -> Self {
        Self {
            initial_lambda: 2.0,
            stall_limit: 10,
            target_factor: 1.05,
        }
    }
}

/// Subgradient driver settings.
#[derive(Debug, Clone)]
pub struct SubgradientSettings {
    // === Termination ===
    /// Maximum number of iterations per run.
    pub max_iter: usize,

    // === Methods ===
    /// Spectral projected subgradient parameters.
    pub spectral: SpectralParams,

    /// Beasley subgradient parameters.
    pub beasley: BeasleyParams,

    // === Output ===
    /// Log progress information.
    pub verbose: bool,

    /// Log frequency (trace every N iterations).
    pub log_freq: usize,
}

impl Default for SubgradientSettings {
    fn default() -> Self {
        Self {
            max_iter: 300,
            spectral: SpectralParams::default(),
            beasley: BeasleyParams::default(),
            // SCP_VERBOSE=1 turns on progress logging without recompiling
            verbose: std::env::var("SCP_VERBOSE")
                .ok()
                .map(|s| s == "1")
                .unwrap_or(false),
            log_freq: 10,
        }
    }
}

impl SubgradientSettings {
    /// Create settings with verbose output enabled.
    pub fn verbose() -> Self {
        let mut s = Self::default();
        s.verbose = true;
        s.log_freq = 1;
        s
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the spectral method parameters.
    pub fn with_spectral(mut self, spectral: SpectralParams) -> Self {
        self.spectral = spectral;
        self
    }

    /// Set the Beasley method parameters.
    pub fn with_beasley(mut self, beasley: BeasleyParams) -> Self {
        self.beasley = beasley;
        self
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> ScpResult<()> {
        if self.log_freq == 0 {
            return Err(ScpError::InvalidSettings("log_freq must be positive".into()));
        }

        let sp = &self.spectral;
        if sp.window == 0 {
            return Err(ScpError::InvalidSettings("spectral window must be positive".into()));
        }
        for (name, value) in [
            ("initial_step", sp.initial_step),
            ("gamma", sp.gamma),
            ("eta_exponent", sp.eta_exponent),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScpError::InvalidSettings(format!(
                    "spectral {} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..1.0).contains(&sp.momentum) {
            return Err(ScpError::InvalidSettings(format!(
                "spectral momentum must lie in [0, 1), got {}",
                sp.momentum
            )));
        }

        let bp = &self.beasley;
        for (name, value) in [
            ("initial_lambda", bp.initial_lambda),
            ("target_factor", bp.target_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScpError::InvalidSettings(format!(
                    "beasley {} must be finite and positive, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
