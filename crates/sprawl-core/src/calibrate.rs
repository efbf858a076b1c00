//! Historical threshold calibration.
//!
//! Every candidate threshold predicts year Y+1 from year Y for each pair in
//! the calibration window; the candidate with the smallest Hamming error
//! summed over all pairs wins. Candidates are scored in ascending order and
//! the first minimum is kept, so ties resolve to the smallest threshold.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::automaton::growth::apply_rule;
use crate::automaton::neighborhood::{count_neighbors, NeighborCounts};
use crate::error::GrowthError;
use crate::grid::OccupancyGrid;
use crate::metrics::hamming_distance;
use crate::threshold::Threshold;
use crate::yearly::YearlyGridSet;

/// Consecutive year pairs `(first_year + k, first_year + k + 1)` for `k < pairs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationWindow {
    pub first_year: i32,
    pub pairs: usize,
}

impl CalibrationWindow {
    /// Fails when the last year of the window does not fit in an `i32`.
    pub fn new(first_year: i32, pairs: usize) -> Result<Self, GrowthError> {
        let span = i32::try_from(pairs).ok().and_then(|p| first_year.checked_add(p));
        if span.is_none() {
            return Err(GrowthError::InvalidConfig {
                reason: format!("calibration window of {pairs} pairs from {first_year} overflows the year range"),
            });
        }
        Ok(Self { first_year, pairs })
    }

    /// Window of `pairs` pairs starting at the earliest year in `set`.
    pub fn earliest(set: &YearlyGridSet, pairs: usize) -> Result<Self, GrowthError> {
        let first_year = set.first_year().ok_or(GrowthError::EmptyGridSet)?;
        Self::new(first_year, pairs)
    }

    /// Stops at the last pair whose years are representable.
    pub fn year_pairs(&self) -> impl Iterator<Item = (i32, i32)> {
        let first = self.first_year;
        (0..self.pairs).map_while(move |k| {
            let y0 = first.checked_add(i32::try_from(k).ok()?)?;
            Some((y0, y0.checked_add(1)?))
        })
    }
}

/// Total error of one candidate across the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub threshold: Threshold,
    /// Mismatching cells summed over every evaluated pair.
    pub error: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub best: Threshold,
    pub best_error: u64,
    /// One score per candidate, ascending threshold.
    pub scores: Vec<CandidateScore>,
    pub evaluated_pairs: Vec<(i32, i32)>,
    /// Pairs with a missing year; they add zero error to every candidate.
    pub skipped_pairs: Vec<(i32, i32)>,
}

/// A pair ready for scoring: counts are computed once and shared by all candidates.
struct PreparedPair<'a> {
    start: &'a OccupancyGrid,
    counts: NeighborCounts,
    target: &'a OccupancyGrid,
}

/// Select the threshold that best reproduces the observed transitions.
///
/// `candidates` may be in any order and may repeat; they are sorted and
/// deduplicated first. Fails on an empty candidate set or if a pair's grids
/// differ in shape.
pub fn calibrate(
    set: &YearlyGridSet,
    window: &CalibrationWindow,
    candidates: &[Threshold],
) -> Result<CalibrationReport, GrowthError> {
    let mut candidates = candidates.to_vec();
    candidates.sort();
    candidates.dedup();
    if candidates.is_empty() {
        return Err(GrowthError::InvalidConfig { reason: "no candidate thresholds".into() });
    }

    let mut prepared = Vec::new();
    let mut evaluated_pairs = Vec::new();
    let mut skipped_pairs = Vec::new();
    for (y0, y1) in window.year_pairs() {
        match (set.get(y0), set.get(y1)) {
            (Some(start), Some(target)) => {
                start.ensure_same_shape(target)?;
                prepared.push(PreparedPair { start, counts: count_neighbors(start), target });
                evaluated_pairs.push((y0, y1));
            }
            _ => {
                warn!(from = y0, to = y1, "calibration pair incomplete, skipped");
                skipped_pairs.push((y0, y1));
            }
        }
    }
    if prepared.is_empty() {
        warn!(first_year = window.first_year, pairs = window.pairs, "no complete pairs in calibration window");
    }

    let scores = score_candidates(&candidates, &prepared)?;

    // First minimum in ascending order.
    let mut best = scores[0];
    for s in &scores[1..] {
        if s.error < best.error {
            best = *s;
        }
    }
    info!(threshold = best.threshold.get(), error = best.error, pairs = evaluated_pairs.len(), "calibrated threshold");

    Ok(CalibrationReport {
        best: best.threshold,
        best_error: best.error,
        scores,
        evaluated_pairs,
        skipped_pairs,
    })
}

fn score_one(threshold: Threshold, pairs: &[PreparedPair<'_>]) -> Result<CandidateScore, GrowthError> {
    let mut error = 0u64;
    for p in pairs {
        let predicted = apply_rule(p.start, &p.counts, threshold);
        error += hamming_distance(&predicted, p.target)?;
    }
    debug!(threshold = threshold.get(), error, "candidate scored");
    Ok(CandidateScore { threshold, error })
}

#[cfg(feature = "threading")]
fn score_candidates(
    candidates: &[Threshold],
    pairs: &[PreparedPair<'_>],
) -> Result<Vec<CandidateScore>, GrowthError> {
    use rayon::prelude::*;
    // Indexed collect keeps candidate order.
    candidates.par_iter().map(|&t| score_one(t, pairs)).collect()
}

#[cfg(not(feature = "threading"))]
fn score_candidates(
    candidates: &[Threshold],
    pairs: &[PreparedPair<'_>],
) -> Result<Vec<CandidateScore>, GrowthError> {
    candidates.iter().map(|&t| score_one(t, pairs)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::grow_step;
    use crate::grid::OCCUPIED;
    use crate::synthetic::{grow_history, random_grid};

    fn t(v: i64) -> Threshold {
        Threshold::new(v).unwrap()
    }

    #[test]
    fn window_pairs_follow_first_year() {
        let w = CalibrationWindow::new(2020, 4).unwrap();
        let pairs: Vec<_> = w.year_pairs().collect();
        assert_eq!(pairs, vec![(2020, 2021), (2021, 2022), (2022, 2023), (2023, 2024)]);
    }

    #[test]
    fn window_past_year_range_rejected() {
        assert!(matches!(CalibrationWindow::new(i32::MAX, 1), Err(GrowthError::InvalidConfig { .. })));
        assert!(matches!(CalibrationWindow::new(2020, (1 << 32) + 1), Err(GrowthError::InvalidConfig { .. })));
        let last = CalibrationWindow::new(i32::MAX - 2, 2).unwrap();
        assert_eq!(last.year_pairs().collect::<Vec<_>>(), vec![(i32::MAX - 2, i32::MAX - 1), (i32::MAX - 1, i32::MAX)]);

        // Deserialized windows bypass `new`; pairs past i32::MAX are dropped, not wrapped.
        let raw: CalibrationWindow = serde_json::from_str(&format!(r#"{{"first_year":{},"pairs":4}}"#, i32::MAX - 1)).unwrap();
        assert_eq!(raw.year_pairs().collect::<Vec<_>>(), vec![(i32::MAX - 1, i32::MAX)]);
    }

    #[test]
    fn earliest_window_on_empty_set_fails() {
        let set = YearlyGridSet::new();
        assert_eq!(CalibrationWindow::earliest(&set, 4), Err(GrowthError::EmptyGridSet));
    }

    /// 5×5, 2×2 centre block in year A, one extra adjacent cell in year B.
    #[test]
    fn center_block_scenario_picks_smallest_best_fit() {
        let a = OccupancyGrid::from_rows(&[
            &[0, 0, 0, 0, 0],
            &[0, 1, 1, 0, 0],
            &[0, 1, 1, 0, 0],
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
        ])
        .unwrap();
        let mut b = a.clone();
        b.set(1, 3, OCCUPIED);
        let set = YearlyGridSet::from_grids([(2000, a.clone()), (2001, b.clone())]).unwrap();
        let report = calibrate(&set, &CalibrationWindow::new(2000, 1).unwrap(), &Threshold::all()).unwrap();

        // (1,3) sees two occupied neighbours, as do the seven other
        // edge-adjacent cells, so no threshold adds it alone: t=1 adds the
        // whole 12-cell ring, t=2 the 8 edge-adjacent cells, t>=3 nothing.
        let errors: Vec<u64> = report.scores.iter().map(|s| s.error).collect();
        assert_eq!(errors, vec![11, 7, 1, 1, 1, 1, 1, 1]);
        assert_eq!(report.best, t(3));
        assert!(Threshold::all().into_iter().all(|t| grow_step(&a, t) != b));
    }

    #[test]
    fn exact_transition_scores_zero() {
        // Target generated by the rule itself: some threshold must reach error 0.
        let a = OccupancyGrid::from_rows(&[
            &[0, 0, 0, 0, 0],
            &[0, 1, 1, 0, 0],
            &[0, 1, 1, 0, 0],
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
        ])
        .unwrap();
        let b = grow_step(&a, t(2));
        assert_eq!(b.occupied_count(), 12);
        let set = YearlyGridSet::from_grids([(2000, a), (2001, b)]).unwrap();
        let report = calibrate(&set, &CalibrationWindow::new(2000, 1).unwrap(), &Threshold::all()).unwrap();
        assert_eq!(report.best, t(2));
        assert_eq!(report.best_error, 0);
    }

    #[test]
    fn ties_resolve_to_smallest_threshold() {
        // Thresholds 3..=5 all leave an isolated 2×2 block unchanged (outer
        // cells see at most 2 neighbours), while the target also contains a
        // far cell no threshold can produce. 3 and 5 tie; 3 must win.
        let a = OccupancyGrid::from_rows(&[
            &[0, 0, 0, 0, 0, 0],
            &[0, 1, 1, 0, 0, 0],
            &[0, 1, 1, 0, 0, 0],
            &[0, 0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0, 1],
        ])
        .unwrap();
        let mut b = a.clone();
        b.set(4, 0, OCCUPIED);
        let set = YearlyGridSet::from_grids([
            (2010, a.clone()),
            (2011, b.clone()),
            (2013, a),
            (2014, b),
        ])
        .unwrap();
        let candidates = [t(5), t(3)];
        let report = calibrate(&set, &CalibrationWindow::new(2010, 4).unwrap(), &candidates).unwrap();
        assert_eq!(report.evaluated_pairs, vec![(2010, 2011), (2013, 2014)]);
        assert_eq!(report.scores[0].threshold, t(3));
        assert_eq!(report.scores[0].error, 2);
        assert_eq!(report.scores[1].error, 2);
        assert_eq!(report.best, t(3));
    }

    #[test]
    fn aggregate_sum_not_per_pair() {
        let seed = random_grid(12, 12, 0.2, 11);
        let set = grow_history(&seed, t(4), 2020, 5).unwrap();
        let report = calibrate(&set, &CalibrationWindow::new(2020, 4).unwrap(), &Threshold::all()).unwrap();
        // The generating threshold scores zero; anything reported earlier must too.
        assert_eq!(report.scores[3].error, 0);
        assert_eq!(report.best_error, 0);
        assert!(report.best <= t(4));
        assert_eq!(report.evaluated_pairs.len(), 4);
        for s in report.scores.iter().filter(|s| s.threshold < report.best) {
            assert!(s.error > 0);
        }
    }

    #[test]
    fn missing_year_is_skipped_deterministically() {
        let seed = random_grid(10, 10, 0.25, 3);
        let full = grow_history(&seed, t(3), 2020, 5).unwrap();
        let mut partial = YearlyGridSet::new();
        for (year, g) in full.iter() {
            if year != 2022 {
                partial.insert(year, g.clone()).unwrap();
            }
        }
        let window = CalibrationWindow::new(2020, 4).unwrap();
        let first = calibrate(&partial, &window, &Threshold::all()).unwrap();
        let second = calibrate(&partial, &window, &Threshold::all()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.skipped_pairs, vec![(2021, 2022), (2022, 2023)]);
        assert_eq!(first.evaluated_pairs, vec![(2020, 2021), (2023, 2024)]);
        assert_eq!(first.best_error, 0);
        assert!(first.best <= t(3));
    }

    #[test]
    fn window_without_data_returns_smallest_candidate() {
        let set = YearlyGridSet::from_grids([(1990, OccupancyGrid::vacant(3, 3))]).unwrap();
        let report = calibrate(&set, &CalibrationWindow::new(2020, 4).unwrap(), &Threshold::all()).unwrap();
        assert_eq!(report.best, t(1));
        assert!(report.evaluated_pairs.is_empty());
        assert_eq!(report.skipped_pairs.len(), 4);
    }

    #[test]
    fn empty_candidate_set_rejected() {
        let set = YearlyGridSet::from_grids([(2020, OccupancyGrid::vacant(3, 3))]).unwrap();
        let err = calibrate(&set, &CalibrationWindow::new(2020, 1).unwrap(), &[]).unwrap_err();
        assert!(matches!(err, GrowthError::InvalidConfig { .. }));
    }
}
