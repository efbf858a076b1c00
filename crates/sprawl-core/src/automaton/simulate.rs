//! Multi-step growth driver.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::{OccupancyGrid, OCCUPIED, VACANT};
use crate::threshold::{StepCount, Threshold};

use super::growth::apply_rule;
use super::neighborhood::{count_neighbors, moore_neighbors};

/// How each step is evaluated. Both strategies produce identical grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepStrategy {
    /// Recount every cell's neighbours on every step.
    FullGrid,
    /// Keep counts across steps and only revisit neighbours of newly occupied cells.
    #[default]
    Frontier,
}

/// Apply the growth step `steps` times; `steps == 0` returns a copy of `initial`.
pub fn simulate(
    initial: &OccupancyGrid,
    threshold: Threshold,
    steps: StepCount,
    strategy: SweepStrategy,
) -> OccupancyGrid {
    let out = match strategy {
        SweepStrategy::FullGrid => simulate_full_grid(initial, threshold, steps),
        SweepStrategy::Frontier => simulate_frontier(initial, threshold, steps),
    };
    debug!(
        threshold = threshold.get(),
        steps = steps.get(),
        ?strategy,
        before = initial.occupied_count(),
        after = out.occupied_count(),
        "simulation finished"
    );
    out
}

fn simulate_full_grid(initial: &OccupancyGrid, threshold: Threshold, steps: StepCount) -> OccupancyGrid {
    let mut current = initial.clone();
    for _ in 0..steps.get() {
        let counts = count_neighbors(&current);
        current = apply_rule(&current, &counts, threshold);
    }
    current
}

/// Incremental sweep.
///
/// A vacant cell can only cross the threshold in step k+1 if one of its
/// neighbours was converted in step k, so after the first full scan only the
/// neighbourhood of the previous step's conversions is examined.
fn simulate_frontier(initial: &OccupancyGrid, threshold: Threshold, steps: StepCount) -> OccupancyGrid {
    let (w, h) = (initial.width, initial.height);
    let t = threshold.get();
    let mut cells = initial.data.clone();
    let mut counts = count_neighbors(initial).counts;
    // Cells already scheduled for conversion; they become occupied next step.
    let mut queued = vec![false; cells.len()];

    let mut pending: Vec<usize> = (0..cells.len())
        .filter(|&i| cells[i] == VACANT && counts[i] >= t)
        .collect();
    for &i in &pending {
        queued[i] = true;
    }

    for _ in 0..steps.get() {
        if pending.is_empty() {
            break;
        }
        for &i in &pending {
            cells[i] = OCCUPIED;
        }
        for &i in &pending {
            for n in moore_neighbors(i, w, h) {
                counts[n] += 1;
            }
        }
        let mut next = Vec::new();
        for &i in &pending {
            for n in moore_neighbors(i, w, h) {
                if cells[n] == VACANT && !queued[n] && counts[n] >= t {
                    queued[n] = true;
                    next.push(n);
                }
            }
        }
        pending = next;
    }

    OccupancyGrid { data: cells, width: w, height: h, georef: initial.georef }
}
