// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Greedy Cut Selection
//!
//! Repeatedly cuts out the densest eligible region until the roll meets the
//! target. Candidates are ranked by their density over the removal window,
//! with ties going to the longer window and then the earlier start. A region
//! is only eligible when it holds a continuous defect or is denser than the
//! target, so continuous regions always go first.
//!
//! The loop stops as soon as one of these holds:
//!
//! - the roll meets the target with no continuous defect left (success),
//! - the cut budget is spent,
//! - no eligible region is left,
//! - cutting the best candidate would take the roll below the floor.
//!
//! The floor stop is final. Lower-ranked regions are not tried instead, so
//! the outcome never depends on which smaller cuts happen to fit.

use crate::{
    config::Strategy,
    error::{SelectError, UnsatisfiableError, UnsatisfiableReason},
    problem::{CutEvaluation, CutProblem},
    result::SelectionOutcome,
    stats::SelectionStatistics,
};
use selvedge_model::index::RegionIndex;
use std::{cmp::Ordering, time::Instant};

/// Orders candidates best first.
#[inline]
fn rank(problem: &CutProblem<'_>, a: RegionIndex, b: RegionIndex) -> Ordering {
    let (wa, wb) = (problem.window(a), problem.window(b));
    problem
        .candidate_density(b)
        .total_cmp(&problem.candidate_density(a))
        .then(wb.len().total_cmp(&wa.len()))
        .then(wa.start().total_cmp(&wb.start()))
}

/// Returns the best eligible region that is still on the roll.
fn next_candidate(problem: &CutProblem<'_>, removed: &[bool]) -> Option<RegionIndex> {
    RegionIndex::range(problem.num_regions())
        .filter(|&i| !removed[i.get()] && problem.is_eligible(i))
        .min_by(|&a, &b| rank(problem, a, b))
}

/// Runs the greedy selection on a prepared problem.
pub fn select_greedy(problem: &CutProblem<'_>) -> Result<SelectionOutcome, SelectError> {
    let start_time = Instant::now();
    let mut stats = SelectionStatistics::default();

    let mut removed = vec![false; problem.num_regions()];
    let mut selected: Vec<RegionIndex> = Vec::new();
    let mut current: CutEvaluation = problem.evaluate(std::iter::empty());

    let stop: Option<UnsatisfiableReason> = loop {
        if problem.is_satisfied(&current) {
            break None;
        }
        if selected.len() >= problem.cut_limit() {
            break Some(UnsatisfiableReason::CutLimitReached);
        }

        stats.on_iteration();
        let Some(candidate) = next_candidate(problem, &removed) else {
            break Some(UnsatisfiableReason::NoEligibleRegion);
        };

        let next = problem.evaluate(selected.iter().copied().chain(std::iter::once(candidate)));
        if problem.breaches_floor(next.retained_length) {
            log::debug!(
                "greedy: cutting {} {} would leave {:.3} < floor {:.3}, stopping",
                candidate,
                problem.window(candidate),
                next.retained_length,
                problem.min_retained_length()
            );
            break Some(UnsatisfiableReason::FloorReached);
        }

        log::debug!(
            "greedy: cut {} {} (density {:.3}) -> length {:.3}, density {:.3}",
            candidate,
            problem.window(candidate),
            problem.candidate_density(candidate),
            next.retained_length,
            next.density
        );
        removed[candidate.get()] = true;
        selected.push(candidate);
        current = next;
    };

    stats.set_total_time(start_time.elapsed());

    match stop {
        None => {
            stats.on_solution_found();
            log::info!(
                "greedy: {} cut(s), length {:.3}, density {:.3}",
                selected.len(),
                current.retained_length,
                current.density
            );
            Ok(SelectionOutcome::new(
                problem,
                selected,
                &current,
                Strategy::Greedy,
                stats,
            ))
        }
        Some(reason) => {
            log::info!(
                "greedy: target {} unreachable ({}), best density {:.3}",
                problem.target_density(),
                reason,
                current.density
            );
            Err(SelectError::Unsatisfiable(UnsatisfiableError {
                reason,
                target_density: problem.target_density(),
                best_density: current.density,
                retained_length: current.retained_length,
                min_retained_length: problem.min_retained_length(),
                cuts: current.cuts,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SelectionConfig, selector::select_cuts};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use selvedge_core::math::interval::union_length;
    use selvedge_model::{
        Segment,
        defect::Defect,
        region::{Region, merge_into_regions},
    };

    fn run(
        regions: &[Region],
        length: f64,
        width: f64,
        config: &SelectionConfig,
    ) -> Result<SelectionOutcome, SelectError> {
        let problem = CutProblem::new(regions, length, width, config)?;
        select_greedy(&problem)
    }

    fn unsatisfiable(err: SelectError) -> UnsatisfiableError {
        match err {
            SelectError::Unsatisfiable(e) => e,
            other => panic!("expected Unsatisfiable, got {:?}", other),
        }
    }

    #[test]
    fn test_roll_already_within_target_is_untouched() {
        let regions = merge_into_regions(&[Defect::at(23.0, 4).unwrap()], 1.0);
        let config = SelectionConfig::builder().target_density(23.0).build().unwrap();
        let outcome = run(&regions, 103.0, 1.5, &config).unwrap();

        assert!(outcome.is_untouched());
        assert_eq!(outcome.final_length, 103.0);
        assert!((outcome.final_density - 4.0 * 100.0 / (103.0 * 1.5)).abs() < 1e-12);
        assert_eq!(outcome.retained, vec![Segment::new(0.0, 103.0)]);
        assert!(outcome.removed.is_empty());
    }

    #[test]
    fn test_densest_region_goes_first_under_cut_limit() {
        // A: 2 points over 5 m (density 40). B: 1 point over 5 m (density 20).
        let regions = merge_into_regions(
            &[
                Defect::scored(10.0, 15.0, 2).unwrap(),
                Defect::scored(50.0, 55.0, 1).unwrap(),
            ],
            1.0,
        );
        let config = SelectionConfig::builder()
            .target_density(2.0)
            .min_retained_ratio(0.5)
            .max_cuts(1)
            .build()
            .unwrap();
        let outcome = run(&regions, 100.0, 1.0, &config).unwrap();

        assert_eq!(outcome.selected, vec![RegionIndex::new(0)]);
        assert_eq!(outcome.removed, vec![Segment::new(10.0, 15.0)]);
        assert_eq!(outcome.final_length, 95.0);
        assert!(outcome.final_density <= 2.0);
    }

    #[test]
    fn test_continuous_region_is_cut_regardless_of_density() {
        let regions = merge_into_regions(
            &[
                Defect::at(60.0, 1).unwrap(),
                Defect::continuous(15.3, 18.5).unwrap(),
            ],
            1.0,
        );
        let config = SelectionConfig::builder().target_density(23.0).build().unwrap();
        let outcome = run(&regions, 103.0, 1.5, &config).unwrap();

        assert_eq!(outcome.selected, vec![RegionIndex::new(0)]);
        assert_eq!(outcome.removed, vec![Segment::new(15.3, 18.5)]);
        assert!(outcome.final_density.is_finite());
    }

    #[test]
    fn test_floor_breach_is_unsatisfiable() {
        let regions = merge_into_regions(&[Defect::scored(10.0, 40.0, 90).unwrap()], 1.0);
        let config = SelectionConfig::builder()
            .target_density(5.0)
            .min_retained_ratio(0.99)
            .build()
            .unwrap();
        let err = unsatisfiable(run(&regions, 100.0, 1.0, &config).unwrap_err());

        assert_eq!(err.reason, UnsatisfiableReason::FloorReached);
        assert_eq!(err.cuts, 0);
        assert_eq!(err.retained_length, 100.0);
        assert_eq!(err.best_density, 90.0);
        assert!((err.min_retained_length - 99.0).abs() < 1e-9);
    }

    #[test]
    fn test_floor_stop_does_not_fall_back_to_smaller_regions() {
        // The densest region breaches the floor. The smaller one alone would
        // fit, but the selector must stop rather than try it.
        let regions = merge_into_regions(
            &[
                Defect::scored(10.0, 30.0, 200).unwrap(),
                Defect::scored(60.0, 62.0, 10).unwrap(),
            ],
            1.0,
        );
        let config = SelectionConfig::builder()
            .target_density(1.0)
            .min_retained_ratio(0.9)
            .build()
            .unwrap();
        let err = unsatisfiable(run(&regions, 100.0, 1.0, &config).unwrap_err());
        assert_eq!(err.reason, UnsatisfiableReason::FloorReached);
        assert_eq!(err.cuts, 0);
    }

    #[test]
    fn test_zero_cuts_reports_whole_roll_values() {
        let regions = merge_into_regions(&[Defect::scored(10.0, 15.0, 50).unwrap()], 1.0);
        let config = SelectionConfig::builder()
            .target_density(1.0)
            .max_cuts(0)
            .build()
            .unwrap();
        let err = unsatisfiable(run(&regions, 100.0, 1.0, &config).unwrap_err());

        assert_eq!(err.reason, UnsatisfiableReason::CutLimitReached);
        assert_eq!(err.retained_length, 100.0);
        assert_eq!(err.best_density, 50.0);
    }

    #[test]
    fn test_no_eligible_region_left() {
        // After the dense region goes, the splice penalty keeps the roll over
        // the target while the remaining region is itself below it.
        let regions = merge_into_regions(
            &[
                Defect::scored(10.0, 20.0, 50).unwrap(),
                Defect::scored(40.0, 90.0, 5).unwrap(),
            ],
            1.0,
        );
        let config = SelectionConfig::builder()
            .target_density(19.0)
            .min_retained_ratio(0.0)
            .join_penalty(20.0)
            .build()
            .unwrap();
        let err = unsatisfiable(run(&regions, 100.0, 1.0, &config).unwrap_err());

        assert_eq!(err.reason, UnsatisfiableReason::NoEligibleRegion);
        assert_eq!(err.cuts, 1);
        assert_eq!(err.retained_length, 90.0);
        assert!(err.best_density > 19.0);
    }

    #[test]
    fn test_ties_prefer_longer_then_earlier_region() {
        let regions = merge_into_regions(
            &[
                Defect::scored(10.0, 12.0, 2).unwrap(),
                Defect::scored(40.0, 44.0, 4).unwrap(),
                Defect::scored(70.0, 74.0, 4).unwrap(),
            ],
            1.0,
        );
        let config = SelectionConfig::builder()
            .target_density(0.0)
            .min_retained_ratio(0.0)
            .max_cuts(1)
            .build()
            .unwrap();
        let err = unsatisfiable(run(&regions, 100.0, 1.0, &config).unwrap_err());
        assert_eq!(err.cuts, 1);

        let problem = CutProblem::new(&regions, 100.0, 1.0, &config).unwrap();
        let removed = vec![false; 3];
        assert_eq!(next_candidate(&problem, &removed), Some(RegionIndex::new(1)));
    }

    #[test]
    fn test_point_region_uses_configured_cut_length() {
        let regions = merge_into_regions(&[Defect::at(50.0, 30).unwrap()], 1.0);
        let wide = SelectionConfig::builder()
            .target_density(5.0)
            .point_cut_length(2.0)
            .build()
            .unwrap();
        let outcome = run(&regions, 100.0, 1.0, &wide).unwrap();
        assert_eq!(outcome.removed, vec![Segment::new(49.0, 51.0)]);
        assert_eq!(outcome.final_length, 98.0);

        let exact = SelectionConfig::builder()
            .target_density(5.0)
            .point_cut_length(0.0)
            .build()
            .unwrap();
        let outcome = run(&regions, 100.0, 1.0, &exact).unwrap();
        assert_eq!(outcome.final_length, 100.0);
        assert_eq!(outcome.removed, vec![Segment::point(50.0)]);
        assert_eq!(outcome.retained, vec![Segment::new(0.0, 100.0)]);
        assert_eq!(outcome.final_density, 0.0);
    }

    #[test]
    fn test_join_penalty_is_charged_per_cut() {
        let regions = merge_into_regions(&[Defect::scored(10.0, 20.0, 10).unwrap()], 1.0);
        let config = SelectionConfig::builder()
            .target_density(5.0)
            .join_penalty(4.0)
            .build()
            .unwrap();
        let outcome = run(&regions, 100.0, 1.0, &config).unwrap();
        assert_eq!(outcome.final_length, 90.0);
        assert!((outcome.final_density - 4.0 * 100.0 / 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_random_rolls_keep_floor_and_partition_roll() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5e1fed6e);

        for case in 0..300 {
            let length: f64 = rng.random_range(20.0..200.0);
            let n = rng.random_range(0..15);
            let defects: Vec<Defect> = (0..n)
                .map(|_| {
                    let from = rng.random_range(0.0..length);
                    let to = (from + rng.random_range(0.0..4.0)).min(length);
                    if rng.random_bool(0.05) {
                        Defect::continuous(from, to).unwrap()
                    } else {
                        Defect::scored(from, to, rng.random_range(0..12)).unwrap()
                    }
                })
                .collect();
            let regions = merge_into_regions(&defects, rng.random_range(0.0..3.0));
            let mut builder = SelectionConfig::builder()
                .target_density(rng.random_range(0.0..40.0))
                .min_retained_ratio(rng.random_range(0.3..1.0))
                .join_penalty(rng.random_range(0.0..3.0))
                .point_cut_length(rng.random_range(0.0..5.0));
            if rng.random_bool(0.3) {
                builder = builder.max_cuts(rng.random_range(0..4));
            }
            let config = builder.build().unwrap();
            let slack = 1e-9 * length;
            let floor = config.min_retained_length(length) - slack;

            let outcome = match select_cuts(&regions, length, 1.5, &config) {
                Ok(outcome) => outcome,
                Err(SelectError::Unsatisfiable(e)) => {
                    assert!(e.retained_length >= floor, "case {case}: {e}");
                    continue;
                }
                Err(other) => panic!("case {case}: unexpected error {other}"),
            };

            assert!(outcome.final_length >= floor, "case {case}: {outcome}");
            assert!(outcome.final_density <= config.target_density, "case {case}");

            let bounds = Segment::new(0.0, length);
            for pair in outcome.removed.windows(2) {
                assert!(pair[0].end() < pair[1].start(), "case {case}: removed not disjoint");
            }
            for pair in outcome.retained.windows(2) {
                assert!(pair[0].end() <= pair[1].start(), "case {case}: retained not sorted");
            }
            for piece in &outcome.retained {
                assert!(bounds.contains_interval(*piece));
                assert!(
                    outcome.removed.iter().all(|cut| !cut.overlaps_with_length(*piece)),
                    "case {case}: {piece} overlaps a removed segment"
                );
            }
            let kept: f64 = outcome.retained.iter().map(Segment::len).sum();
            let covered = kept + union_length(&outcome.removed);
            assert!((covered - length).abs() <= 1e-6, "case {case}: covers {covered} of {length}");
            assert!((kept - outcome.final_length).abs() <= 1e-6, "case {case}");
        }
    }
}
