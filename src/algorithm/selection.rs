use crate::{
    algorithm::bitset::Domain,
    math::entropy::shannon_entropy_from_sums,
    spatial::{
        grid::Grid,
        tiles::{CandidateId, TileSet},
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Shannon entropy of a cell's domain under the tileset weights
///
/// Returns 0 for resolved and contradicted cells.
pub fn cell_entropy(grid: &Grid, tileset: &TileSet, cell: usize) -> f64 {
    domain_entropy(&grid.domain(cell), tileset)
}

/// Shannon entropy of a domain under the tileset weights
pub fn domain_entropy(domain: &Domain, tileset: &TileSet) -> f64 {
    if domain.count() <= 1 {
        return 0.0;
    }
    let (sum, sum_log) = domain.iter().fold((0.0, 0.0), |(sum, sum_log), candidate| {
        (
            sum + tileset.weight(candidate),
            sum_log + tileset.weight_log_weight(candidate),
        )
    });
    shannon_entropy_from_sums(sum, sum_log)
}

/// Unresolved cell with the lowest entropy
///
/// Only cells with more than one candidate take part. Ties go to the lowest
/// cell index so identical inputs always pick the same cell. Returns `None`
/// once every cell is resolved.
pub fn select_min_entropy(grid: &Grid, tileset: &TileSet) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for cell in 0..grid.cell_count() {
        if grid.domain_size(cell) <= 1 {
            continue;
        }
        let entropy = cell_entropy(grid, tileset, cell);
        match best {
            Some((_, lowest)) if entropy >= lowest => {}
            _ => best = Some((cell, entropy)),
        }
    }

    best.map(|(cell, _)| cell)
}

/// Seeded random selector for reproducible stochastic choices
#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generic weighted random selection
    ///
    /// Returns index into weights array using cumulative distribution
    pub fn weighted_choice(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return 0;
        }

        let mut rand_val = self.rng.random::<f64>() * total;
        for (i, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            rand_val -= weight;
            if rand_val <= 0.0 {
                return i;
            }
        }
        weights
            .iter()
            .rposition(|&weight| weight > 0.0)
            .unwrap_or(0)
    }

    /// Pick one candidate of a domain with probability proportional to its weight
    pub fn choose_candidate(&mut self, domain: &Domain, tileset: &TileSet) -> Option<CandidateId> {
        let candidates = domain.to_vec();
        if candidates.len() <= 1 {
            return candidates.first().copied();
        }
        let weights: Vec<f64> = candidates
            .iter()
            .map(|&candidate| tileset.weight(candidate))
            .collect();
        let index = self.weighted_choice(&weights);
        candidates.get(index).copied()
    }
}
