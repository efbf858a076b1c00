use std::collections::HashMap;

use crate::automaton::{simulate, SweepStrategy};
use crate::grid::OccupancyGrid;
use crate::threshold::{StepCount, Threshold};

type Key = (u64, Threshold, StepCount);

/// Memo of simulation results keyed by (grid content, threshold, steps).
///
/// Entries keep the initial grid next to the result and a hit is only
/// served when the stored grid equals the requested one, so a fingerprint
/// collision recomputes instead of returning a wrong grid.
#[derive(Debug, Default)]
pub struct SimulationCache {
    entries: HashMap<Key, (OccupancyGrid, OccupancyGrid)>,
    hits: u64,
    misses: u64,
}

impl SimulationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn simulate(
        &mut self,
        initial: &OccupancyGrid,
        threshold: Threshold,
        steps: StepCount,
        strategy: SweepStrategy,
    ) -> OccupancyGrid {
        let key = (initial.fingerprint(), threshold, steps);
        if let Some((stored, result)) = self.entries.get(&key) {
            if stored == initial {
                self.hits += 1;
                return result.clone();
            }
        }
        self.misses += 1;
        let result = simulate(initial, threshold, steps, strategy);
        self.entries.insert(key, (initial.clone(), result.clone()));
        result
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
