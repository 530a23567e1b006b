//! Seeded random instances and a greedy cover for benchmarking.

use anyhow::{bail, Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use scp_core::ScpInstance;

/// Random instance: each column covers each row with probability
/// `density`; rows left uncovered get one random column. Costs are uniform
/// in 1..=`max_cost`.
pub fn random_instance(
    rows: usize,
    cols: usize,
    density: f64,
    max_cost: u32,
    seed: u64,
) -> Result<ScpInstance> {
    if !(0.0..=1.0).contains(&density) {
        bail!("density must lie in [0, 1], got {}", density);
    }
    if max_cost == 0 {
        bail!("max cost must be positive");
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut incidence = Vec::with_capacity(rows);
    for _ in 0..rows {
        let mut covering: Vec<usize> = (0..cols).filter(|_| rng.gen::<f64>() < density).collect();
        // Ensure every row can be covered
        if covering.is_empty() && cols > 0 {
            covering.push(rng.gen_range(0..cols));
        }
        incidence.push(covering);
    }
    let costs = (0..cols).map(|_| rng.gen_range(1..=max_cost)).collect();

    ScpInstance::new(rows, cols, costs, &incidence)
        .with_context(|| format!("Failed to build random {}x{} instance", rows, cols))
}

/// Greedy cover: repeatedly pick the column with the lowest cost per newly
/// covered row. Returns the chosen columns and their total cost.
pub fn greedy_cover(instance: &ScpInstance) -> (Vec<usize>, u64) {
    let mut covered = vec![false; instance.num_rows()];
    let mut remaining = instance.num_rows();
    let mut chosen = Vec::new();
    let mut total: u64 = 0;

    while remaining > 0 {
        let mut best: Option<(usize, f64)> = None;
        for col in 0..instance.num_cols() {
            let gain = instance
                .rows_of_col(col)
                .iter()
                .filter(|&&row| !covered[row])
                .count();
            if gain == 0 {
                continue;
            }
            let ratio = f64::from(instance.cost(col)) / gain as f64;
            if best.map_or(true, |(_, b)| ratio < b) {
                best = Some((col, ratio));
            }
        }

        // Every row has a covering column, so some column always has gain
        let Some((col, _)) = best else { break };
        for &row in instance.rows_of_col(col) {
            if !covered[row] {
                covered[row] = true;
                remaining -= 1;
            }
        }
        chosen.push(col);
        total += u64::from(instance.cost(col));
    }

    (chosen, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_instance_is_deterministic() {
        let a = random_instance(20, 30, 0.2, 50, 42).unwrap();
        let b = random_instance(20, 30, 0.2, 50, 42).unwrap();
        assert_eq!(a.costs(), b.costs());
        for row in 0..a.num_rows() {
            assert!(!a.cols_of_row(row).is_empty());
            assert_eq!(a.cols_of_row(row), b.cols_of_row(row));
        }
        assert!(a.costs().iter().all(|&c| (1..=50).contains(&c)));
    }

    #[test]
    fn test_random_instance_rejects_bad_density() {
        assert!(random_instance(5, 5, 1.5, 10, 0).is_err());
        assert!(random_instance(5, 5, 0.5, 0, 0).is_err());
    }

    #[test]
    fn test_greedy_cover_covers_every_row() {
        let inst = random_instance(30, 40, 0.1, 20, 3).unwrap();
        let (chosen, cost) = greedy_cover(&inst);

        let mut covered = vec![false; inst.num_rows()];
        for &col in &chosen {
            for &row in inst.rows_of_col(col) {
                covered[row] = true;
            }
        }
        assert!(covered.iter().all(|&c| c));
        let sum: u64 = chosen.iter().map(|&c| u64::from(inst.cost(c))).sum();
        assert_eq!(sum, cost);
    }

    #[test]
    fn test_greedy_prefers_cheap_wide_column() {
        let inst = ScpInstance::new(2, 3, vec![2, 3, 3], &[vec![0, 1], vec![0, 2]]).unwrap();
        assert_eq!(greedy_cover(&inst), (vec![0], 2));
    }
}
