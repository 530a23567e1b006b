//! Run reports for the benchmark CLI.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use scp_core::SubgradientResult;

/// Outcome of one dual bound run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Instance name (file stem or generator description)
    pub instance: String,
    pub num_rows: usize,
    pub num_cols: usize,
    pub num_nonzeros: usize,
    /// Method that produced the bound
    pub method: String,
    /// "Optimal" or "MaxIterations"
    pub status: String,
    /// Best Lagrangian lower bound
    pub lower_bound: f64,
    /// Upper bound supplied to the basic method, or the greedy cover cost
    pub upper_bound: Option<f64>,
    pub iterations: usize,
    pub improvements: u64,
    pub solve_time_ms: f64,
    /// Best dual vector, only kept when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dual: Option<Vec<f64>>,
    /// Reduced costs of the best dual vector, only kept when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced_costs: Option<Vec<f64>>,
}

impl RunReport {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        instance: String,
        dims: (usize, usize, usize),
        method: &str,
        result: &SubgradientResult,
        upper_bound: Option<f64>,
        elapsed: Duration,
        keep_dual: bool,
    ) -> Self {
        let (num_rows, num_cols, num_nonzeros) = dims;
        Self {
            instance,
            num_rows,
            num_cols,
            num_nonzeros,
            method: method.to_string(),
            status: result.status.to_string(),
            lower_bound: result.objective,
            upper_bound,
            iterations: result.iterations,
            improvements: result.improvements,
            solve_time_ms: elapsed.as_secs_f64() * 1000.0,
            dual: keep_dual.then(|| result.dual.clone()),
            reduced_costs: None,
        }
    }

    /// Relative gap between the upper bound and the lower bound
    pub fn gap(&self) -> Option<f64> {
        self.upper_bound
            .filter(|ub| *ub > 0.0)
            .map(|ub| (ub - self.lower_bound) / ub)
    }

    pub fn print(&self) {
        println!("{}", "=".repeat(60));
        println!("Instance:     {}", self.instance);
        println!(
            "Size:         {} rows x {} cols, {} nonzeros",
            self.num_rows, self.num_cols, self.num_nonzeros
        );
        println!("Method:       {}", self.method);
        println!("Status:       {}", self.status);
        println!("Lower bound:  {:.6}", self.lower_bound);
        if let Some(ub) = self.upper_bound {
            println!("Upper bound:  {:.6}", ub);
        }
        if let Some(gap) = self.gap() {
            println!("Gap:          {:.3}%", gap * 100.0);
        }
        println!(
            "Iterations:   {} ({} improvements)",
            self.iterations, self.improvements
        );
        println!("Time:         {:.3} ms", self.solve_time_ms);
        if let Some(dual) = &self.dual {
            println!("Dual vector:");
            for (row, u) in dual.iter().enumerate() {
                println!("  u[{}] = {:.6}", row, u);
            }
        }
        if let Some(rc) = &self.reduced_costs {
            println!("Reduced costs:");
            for (col, c) in rc.iter().enumerate() {
                println!("  rc[{}] = {:.6}", col, c);
            }
        }
        println!("{}", "=".repeat(60));
    }

    /// Write the report as pretty-printed JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut out = BufWriter::new(
            File::create(path).with_context(|| format!("Cannot create report {}", path.display()))?,
        );
        serde_json::to_writer_pretty(&mut out, self)
            .with_context(|| format!("Cannot serialize report to {}", path.display()))?;
        out.flush()
            .with_context(|| format!("Cannot flush report {}", path.display()))
    }

    /// Read a report written by [`save_json`](Self::save_json).
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let input = BufReader::new(
            File::open(path).with_context(|| format!("Cannot open baseline {}", path.display()))?,
        );
        serde_json::from_reader(input)
            .with_context(|| format!("{} is not a run report", path.display()))
    }

    /// Compare this run's bound against an earlier one.
    pub fn compare(&self, baseline: &RunReport) -> BoundComparison {
        let delta = self.lower_bound - baseline.lower_bound;
        BoundComparison {
            same_instance: self.instance == baseline.instance
                && self.num_rows == baseline.num_rows
                && self.num_cols == baseline.num_cols,
            delta,
            relative: (baseline.lower_bound != 0.0).then(|| delta / baseline.lower_bound.abs()),
            speedup: (self.solve_time_ms > 0.0).then(|| baseline.solve_time_ms / self.solve_time_ms),
        }
    }
}

/// Bound difference between a run and a saved baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundComparison {
    pub same_instance: bool,
    /// `current - baseline`; positive means a tighter bound now
    pub delta: f64,
    pub relative: Option<f64>,
    /// Baseline time over current time
    pub speedup: Option<f64>,
}

impl BoundComparison {
    pub fn print(&self, baseline: &RunReport) {
        if !self.same_instance {
            log::warn!(
                "Baseline was recorded on {} ({}x{}), not this instance",
                baseline.instance,
                baseline.num_rows,
                baseline.num_cols
            );
        }
        println!(
            "Baseline:     {:.6} ({}, {} iterations)",
            baseline.lower_bound, baseline.method, baseline.iterations
        );
        match self.relative {
            Some(rel) => println!("Bound change: {:+.6} ({:+.4}%)", self.delta, rel * 100.0),
            None => println!("Bound change: {:+.6}", self.delta),
        }
        if let Some(speedup) = self.speedup {
            println!("Speedup:      {:.2}x", speedup);
        }
    }
}
