//! Seeded synthetic settlement grids for demos and tests.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::automaton::grow_step;
use crate::error::GrowthError;
use crate::grid::{OccupancyGrid, OCCUPIED};
use crate::threshold::Threshold;
use crate::yearly::YearlyGridSet;

/// Each cell occupied independently with probability `density` (clamped to [0, 1]).
pub fn random_grid(width: usize, height: usize, density: f64, seed: u64) -> OccupancyGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let p = density.clamp(0.0, 1.0);
    let mut g = OccupancyGrid::vacant(width, height);
    for cell in g.data.iter_mut() {
        if rng.gen_bool(p) {
            *cell = OCCUPIED;
        }
    }
    g
}

/// Clustered seed: `n_cores` random square cores of half-size `radius`.
/// Looks more like a town map than uniform noise.
pub fn clustered_grid(width: usize, height: usize, n_cores: usize, radius: usize, seed: u64) -> OccupancyGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut g = OccupancyGrid::vacant(width, height);
    if width == 0 || height == 0 {
        return g;
    }
    for _ in 0..n_cores {
        let cr = rng.gen_range(0..height);
        let cc = rng.gen_range(0..width);
        for r in cr.saturating_sub(radius)..(cr + radius + 1).min(height) {
            for c in cc.saturating_sub(radius)..(cc + radius + 1).min(width) {
                // Ragged edges.
                if rng.gen_bool(0.8) {
                    g.set(r, c, OCCUPIED);
                }
            }
        }
    }
    g
}

/// History of `years` grids starting at `start_year`, each year one growth
/// step of the previous one.
pub fn grow_history(
    seed: &OccupancyGrid,
    threshold: Threshold,
    start_year: i32,
    years: usize,
) -> Result<YearlyGridSet, GrowthError> {
    let mut set = YearlyGridSet::new();
    let mut current = seed.clone();
    for k in 0..years {
        if k > 0 {
            current = grow_step(&current, threshold);
        }
        set.insert(start_year + k as i32, current.clone())?;
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_grid() {
        assert_eq!(random_grid(16, 16, 0.3, 9), random_grid(16, 16, 0.3, 9));
        assert_ne!(random_grid(16, 16, 0.3, 9), random_grid(16, 16, 0.3, 10));
    }

    #[test]
    fn density_extremes() {
        assert_eq!(random_grid(8, 8, 0.0, 1).occupied_count(), 0);
        assert_eq!(random_grid(8, 8, 1.0, 1).occupied_count(), 64);
    }

    #[test]
    fn history_is_monotone_and_contiguous() {
        let seed = clustered_grid(20, 20, 3, 2, 5);
        let set = grow_history(&seed, Threshold::new(3).unwrap(), 2020, 5).unwrap();
        assert_eq!(set.years().collect::<Vec<_>>(), vec![2020, 2021, 2022, 2023, 2024]);
        let grids: Vec<_> = set.iter().map(|(_, g)| g.clone()).collect();
        for w in grids.windows(2) {
            assert!(w[0].is_subset_of(&w[1]));
        }
    }
}
