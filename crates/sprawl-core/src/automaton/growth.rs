//! Single-step growth-only transition rule.
use crate::grid::{OccupancyGrid, OCCUPIED, VACANT};
use crate::threshold::Threshold;

use super::neighborhood::{count_neighbors, NeighborCounts};

/// Apply one transition with the counts already computed for `grid`.
pub(crate) fn apply_rule(grid: &OccupancyGrid, counts: &NeighborCounts, threshold: Threshold) -> OccupancyGrid {
    let t = threshold.get();
    let data = grid
        .data
        .iter()
        .zip(&counts.counts)
        .map(|(&v, &n)| if v == OCCUPIED || n >= t { OCCUPIED } else { VACANT })
        .collect();
    OccupancyGrid { data, width: grid.width, height: grid.height, georef: grid.georef }
}

/// Derive the next year's grid.
///
/// - occupied cells stay occupied;
/// - a vacant cell becomes occupied when at least `threshold` of its Moore
///   neighbours are occupied;
/// - everything else stays vacant.
///
/// The input is not modified.
pub fn grow_step(grid: &OccupancyGrid, threshold: Threshold) -> OccupancyGrid {
    apply_rule(grid, &count_neighbors(grid), threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::random_grid;
    use proptest::prelude::*;

    fn t(v: i64) -> Threshold {
        Threshold::new(v).unwrap()
    }

    #[test]
    fn corner_seed_grows_into_three_neighbors() {
        let mut g = OccupancyGrid::vacant(4, 4);
        g.set(0, 0, OCCUPIED);
        let next = grow_step(&g, t(1));
        let expected = OccupancyGrid::from_rows(&[
            &[1, 1, 0, 0],
            &[1, 1, 0, 0],
            &[0, 0, 0, 0],
            &[0, 0, 0, 0],
        ])
        .unwrap();
        assert_eq!(next, expected);
        assert_eq!(next.occupied_count() - g.occupied_count(), 3);
    }

    #[test]
    fn input_is_left_untouched() {
        let g = OccupancyGrid::from_rows(&[&[0, 1, 0], &[1, 0, 1], &[0, 1, 0]]).unwrap();
        let before = g.clone();
        let next = grow_step(&g, t(4));
        assert_eq!(g, before);
        assert!(next.is_occupied(1, 1));
    }

    #[test]
    fn high_threshold_on_edge_never_fires() {
        // Edge cells have at most 5 neighbours, so threshold 6 cannot convert them.
        let g = OccupancyGrid::from_rows(&[&[0, 1, 0], &[1, 1, 1], &[1, 1, 1]]).unwrap();
        let next = grow_step(&g, t(6));
        assert!(!next.is_occupied(0, 0));
        assert!(!next.is_occupied(0, 2));
    }

    proptest! {
        #[test]
        fn growth_is_monotone(seed in 0u64..500, density in 0.0f64..0.6, th in 1i64..=8) {
            let g = random_grid(9, 7, density, seed);
            let next = grow_step(&g, t(th));
            prop_assert!(g.is_subset_of(&next));
        }

        #[test]
        fn lower_threshold_grows_superset(seed in 0u64..500, density in 0.0f64..0.6, lo in 1i64..=8, hi in 1i64..=8) {
            prop_assume!(lo <= hi);
            let g = random_grid(8, 8, density, seed);
            let a = grow_step(&g, t(lo));
            let b = grow_step(&g, t(hi));
            prop_assert!(b.is_subset_of(&a));
        }
    }
}
