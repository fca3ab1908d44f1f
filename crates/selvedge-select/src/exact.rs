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

//! # Exact Cut Selection
//!
//! Finds the set of regions whose removal meets the target while keeping the
//! most material, preferring fewer cuts among equally long results.
//!
//! Regions holding a continuous defect must go, so they are fixed into every
//! candidate set. The remaining regions are searched depth first with an
//! explicit stack, densest first, trying "cut" before "keep". Two
//! facts keep the tree small:
//!
//! - Cutting more never lengthens the roll and always adds a cut, so a node
//!   that does not beat the incumbent cannot lead to one that does.
//! - Once a node meets the target, every extension of it is worse, so the
//!   node is recorded and not expanded.
//!
//! Every other region with points is searched, including regions whose own
//! window is no denser than the target. Removal windows of neighbouring
//! point regions can overlap, so such a region may add only a sliver of
//! removed length once its neighbour is cut. Regions without points are
//! left out: cutting one never lowers the density and never adds length.
//!
//! The search is bounded by `max_exact_regions` up front and by its monitors
//! while running. Any monitor stop is reported as `BudgetExceededError`,
//! even if a feasible set was already found, since it is not proven best.

use crate::{
    config::Strategy,
    error::{BudgetExceededError, SelectError, UnsatisfiableError, UnsatisfiableReason},
    monitor::search_monitor::{SearchCommand, SearchMonitor},
    problem::{CutEvaluation, CutProblem},
    result::SelectionOutcome,
    stats::SelectionStatistics,
};
use fixedbitset::FixedBitSet;
use selvedge_model::{defect::PointTally, index::RegionIndex};
use std::time::Instant;

/// Relative slack when comparing retained lengths.
const LENGTH_TIE_TOLERANCE: f64 = 1e-9;

/// A pending branch: restore the trail to `base`, then optionally cut `take`.
#[derive(Debug, Clone, Copy)]
struct Node {
    depth: usize,
    base: usize,
    take: Option<usize>,
}

/// Returns `true` if `candidate` keeps more roll than `best`, or as much with fewer cuts.
#[inline]
fn improves(candidate: &CutEvaluation, best: &CutEvaluation, tolerance: f64) -> bool {
    if candidate.retained_length > best.retained_length + tolerance {
        return true;
    }
    (candidate.retained_length - best.retained_length).abs() <= tolerance
        && candidate.cuts < best.cuts
}

fn unsatisfiable(
    problem: &CutProblem<'_>,
    reason: UnsatisfiableReason,
    closest: &CutEvaluation,
) -> SelectError {
    SelectError::Unsatisfiable(UnsatisfiableError {
        reason,
        target_density: problem.target_density(),
        best_density: closest.density,
        retained_length: closest.retained_length,
        min_retained_length: problem.min_retained_length(),
        cuts: closest.cuts,
    })
}

/// Runs the exact search on a prepared problem.
///
/// `max_exact_regions` caps the number of searched (non-continuous) regions.
/// The search order puts regions denser than the target first.
pub fn select_exact<M>(
    problem: &CutProblem<'_>,
    max_exact_regions: usize,
    monitor: &mut M,
) -> Result<SelectionOutcome, SelectError>
where
    M: SearchMonitor + ?Sized,
{
    let start_time = Instant::now();
    let mut stats = SelectionStatistics::default();
    let untouched = problem.evaluate(std::iter::empty());

    let mut forced: Vec<RegionIndex> = Vec::new();
    let mut optional: Vec<RegionIndex> = Vec::new();
    for index in RegionIndex::range(problem.num_regions()) {
        if problem.region(index).is_continuous() {
            forced.push(index);
        } else if problem.region(index).points() != PointTally::ZERO {
            optional.push(index);
        }
    }
    optional.sort_by(|&a, &b| {
        problem
            .candidate_density(b)
            .total_cmp(&problem.candidate_density(a))
            .then(problem.window(b).len().total_cmp(&problem.window(a).len()))
            .then(a.cmp(&b))
    });

    if optional.len() > max_exact_regions {
        return Err(SelectError::BudgetExceeded(BudgetExceededError {
            reason: format!(
                "{} candidate regions exceed the exact search limit of {}",
                optional.len(),
                max_exact_regions
            ),
            nodes_explored: 0,
            num_candidates: optional.len(),
        }));
    }
    if forced.len() > problem.cut_limit() {
        return Err(unsatisfiable(
            problem,
            UnsatisfiableReason::CutLimitReached,
            &untouched,
        ));
    }

    log::debug!(
        "exact: {} forced and {} optional region(s), floor {:.3}",
        forced.len(),
        optional.len(),
        problem.min_retained_length()
    );

    let tolerance = LENGTH_TIE_TOLERANCE * problem.roll_length();
    let mut chosen: Vec<usize> = Vec::with_capacity(optional.len());
    let mut bits = FixedBitSet::with_capacity(optional.len());
    let mut best: Option<(CutEvaluation, FixedBitSet)> = None;
    let mut closest = untouched;
    let mut stack = vec![Node {
        depth: 0,
        base: 0,
        take: None,
    }];

    monitor.on_enter_search(problem, &stats);

    let mut aborted: Option<String> = None;
    while let Some(node) = stack.pop() {
        monitor.on_step(&stats);
        if let SearchCommand::Terminate(reason) = monitor.search_command(&stats) {
            aborted = Some(reason);
            break;
        }
        stats.on_node_explored();

        for &k in &chosen[node.base..] {
            bits.set(k, false);
        }
        chosen.truncate(node.base);
        if let Some(k) = node.take {
            chosen.push(k);
            bits.insert(k);
        }

        let evaluation = problem.evaluate(
            forced
                .iter()
                .copied()
                .chain(chosen.iter().map(|&k| optional[k])),
        );

        if problem.breaches_floor(evaluation.retained_length) {
            stats.on_pruning_floor();
            log::trace!("exact: floor prune at depth {}", node.depth);
            continue;
        }
        if best
            .as_ref()
            .is_some_and(|(incumbent, _)| !improves(&evaluation, incumbent, tolerance))
        {
            stats.on_pruning_bound();
            log::trace!("exact: bound prune at depth {}", node.depth);
            continue;
        }
        if evaluation.density < closest.density {
            closest = evaluation;
        }

        if problem.is_satisfied(&evaluation) {
            stats.on_solution_found();
            monitor.on_solution_found(&evaluation, &stats);
            log::debug!(
                "exact: incumbent {} cut(s), length {:.3}, density {:.3}",
                evaluation.cuts,
                evaluation.retained_length,
                evaluation.density
            );
            best = Some((evaluation, bits.clone()));
            continue;
        }

        if node.depth < optional.len() {
            stack.push(Node {
                depth: node.depth + 1,
                base: chosen.len(),
                take: None,
            });
            if forced.len() + chosen.len() < problem.cut_limit() {
                stack.push(Node {
                    depth: node.depth + 1,
                    base: chosen.len(),
                    take: Some(node.depth),
                });
            }
        }
    }

    stats.set_total_time(start_time.elapsed());
    monitor.on_exit_search(&stats);

    if let Some(reason) = aborted {
        log::info!("exact: stopped after {} node(s): {}", stats.nodes_explored, reason);
        return Err(SelectError::BudgetExceeded(BudgetExceededError {
            reason,
            nodes_explored: stats.nodes_explored,
            num_candidates: optional.len(),
        }));
    }

    match best {
        Some((evaluation, bits)) => {
            let selected: Vec<RegionIndex> = forced
                .iter()
                .copied()
                .chain(bits.ones().map(|k| optional[k]))
                .collect();
            log::info!(
                "exact: {} cut(s), length {:.3}, density {:.3} after {} node(s)",
                evaluation.cuts,
                evaluation.retained_length,
                evaluation.density,
                stats.nodes_explored
            );
            Ok(SelectionOutcome::new(
                problem,
                selected,
                &evaluation,
                Strategy::Exact,
                stats,
            ))
        }
        None => {
            log::info!(
                "exact: no subset of {} region(s) meets target {}",
                optional.len(),
                problem.target_density()
            );
            Err(unsatisfiable(
                problem,
                UnsatisfiableReason::NoFeasibleSubset,
                &closest,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SelectionConfig,
        greedy::select_greedy,
        monitor::{node_limit::NodeLimitMonitor, search_monitor::NoOpMonitor},
    };
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use selvedge_model::{
        Segment,
        defect::Defect,
        region::{Region, merge_into_regions},
    };

    fn run(
        regions: &[Region],
        length: f64,
        config: &SelectionConfig,
    ) -> Result<SelectionOutcome, SelectError> {
        let problem = CutProblem::new(regions, length, 1.0, config)?;
        select_exact(&problem, config.max_exact_regions, &mut NoOpMonitor)
    }

    /// Tries every subset and returns the best (retained, cuts), if any.
    fn brute_force(problem: &CutProblem<'_>) -> Option<(f64, usize)> {
        let n = problem.num_regions();
        let tol = LENGTH_TIE_TOLERANCE * problem.roll_length();
        let mut best: Option<(f64, usize)> = None;
        for mask in 0u32..(1 << n) {
            let set: Vec<RegionIndex> = (0..n)
                .filter(|i| mask & (1 << i) != 0)
                .map(RegionIndex::new)
                .collect();
            if set.len() > problem.cut_limit() {
                continue;
            }
            let e = problem.evaluate(set.iter().copied());
            if problem.breaches_floor(e.retained_length) || !problem.is_satisfied(&e) {
                continue;
            }
            let better = match best {
                None => true,
                Some((len, cuts)) => {
                    e.retained_length > len + tol
                        || ((e.retained_length - len).abs() <= tol && e.cuts < cuts)
                }
            };
            if better {
                best = Some((e.retained_length, e.cuts));
            }
        }
        best
    }

    #[test]
    fn test_prefers_more_retained_length_over_greedy_choice() {
        // Greedy takes the densest region (A) first and then still needs B.
        // Cutting C alone meets the target and keeps more roll.
        let regions = merge_into_regions(
            &[
                Defect::scored(10.0, 11.0, 8).unwrap(),
                Defect::scored(30.0, 32.0, 6).unwrap(),
                Defect::scored(60.0, 63.0, 18).unwrap(),
            ],
            1.0,
        );
        let config = SelectionConfig::builder()
            .target_density(15.0)
            .min_retained_ratio(0.5)
            .build()
            .unwrap();

        let exact = run(&regions, 100.0, &config).unwrap();
        assert_eq!(exact.selected, vec![RegionIndex::new(2)]);
        assert_eq!(exact.final_length, 97.0);
        assert_eq!(exact.strategy, Strategy::Exact);

        let problem = CutProblem::new(&regions, 100.0, 1.0, &config).unwrap();
        let greedy = select_greedy(&problem).unwrap();
        assert!(greedy.final_length < exact.final_length);
    }

    #[test]
    fn test_light_region_sharing_a_window_can_be_cheapest() {
        // With 10 m point cuts, the windows around 50 and 51 overlap, so the
        // light defect at 51 costs one extra metre once 50 is cut. Its own
        // window density (20) does not exceed the target, yet cutting it beats
        // cutting the heavier defect at 80, which costs a whole window.
        let mut defects: Vec<Defect> = [5.0, 15.0, 25.0, 70.0, 85.0, 92.0, 97.0]
            .iter()
            .map(|&at| Defect::at(at, 2).unwrap())
            .collect();
        defects.push(Defect::at(50.0, 20).unwrap());
        defects.push(Defect::at(51.0, 2).unwrap());
        defects.push(Defect::at(80.0, 3).unwrap());
        let regions = merge_into_regions(&defects, 0.5);
        let config = SelectionConfig::builder()
            .target_density(20.0)
            .point_cut_length(10.0)
            .build()
            .unwrap();
        let problem = CutProblem::new(&regions, 100.0, 1.0, &config).unwrap();
        assert!(!problem.is_eligible(RegionIndex::new(4)));

        let exact = run(&regions, 100.0, &config).unwrap();
        assert_eq!(exact.selected, vec![RegionIndex::new(3), RegionIndex::new(4)]);
        assert!((exact.final_length - 89.0).abs() < 1e-9);
        assert_eq!(exact.removed, vec![Segment::new(45.0, 56.0)]);

        let greedy = select_greedy(&problem).unwrap();
        assert!(greedy.final_length < exact.final_length);
    }

    #[test]
    fn test_continuous_regions_are_always_cut() {
        let regions = merge_into_regions(
            &[
                Defect::continuous(15.3, 18.5).unwrap(),
                Defect::at(60.0, 1).unwrap(),
            ],
            1.0,
        );
        let config = SelectionConfig::builder().target_density(23.0).build().unwrap();
        let outcome = run(&regions, 103.0, &config).unwrap();
        assert_eq!(outcome.selected, vec![RegionIndex::new(0)]);
        assert_eq!(outcome.removed, vec![Segment::new(15.3, 18.5)]);
    }

    #[test]
    fn test_floor_makes_problem_unsatisfiable() {
        let regions = merge_into_regions(&[Defect::scored(10.0, 40.0, 90).unwrap()], 1.0);
        let config = SelectionConfig::builder()
            .target_density(5.0)
            .min_retained_ratio(0.99)
            .build()
            .unwrap();
        match run(&regions, 100.0, &config) {
            Err(SelectError::Unsatisfiable(e)) => {
                assert_eq!(e.reason, UnsatisfiableReason::NoFeasibleSubset);
                assert_eq!(e.retained_length, 100.0);
            }
            other => panic!("expected Unsatisfiable, got {:?}", other),
        }
    }

    #[test]
    fn test_forced_cuts_over_limit() {
        let regions = merge_into_regions(
            &[
                Defect::continuous(10.0, 11.0).unwrap(),
                Defect::continuous(50.0, 51.0).unwrap(),
            ],
            1.0,
        );
        let config = SelectionConfig::builder().max_cuts(1).build().unwrap();
        match run(&regions, 100.0, &config) {
            Err(SelectError::Unsatisfiable(e)) => {
                assert_eq!(e.reason, UnsatisfiableReason::CutLimitReached)
            }
            other => panic!("expected Unsatisfiable, got {:?}", other),
        }
    }

    #[test]
    fn test_too_many_candidates_exceeds_budget() {
        let defects: Vec<Defect> = (0..10)
            .map(|i| Defect::scored(i as f64 * 10.0, i as f64 * 10.0 + 1.0, 5).unwrap())
            .collect();
        let regions = merge_into_regions(&defects, 1.0);
        let config = SelectionConfig::builder()
            .target_density(1.0)
            .max_exact_regions(4)
            .build()
            .unwrap();
        match run(&regions, 100.0, &config) {
            Err(SelectError::BudgetExceeded(e)) => {
                assert_eq!(e.num_candidates, 10);
                assert_eq!(e.nodes_explored, 0);
            }
            other => panic!("expected BudgetExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_node_limit_stops_search() {
        let defects: Vec<Defect> = (0..12)
            .map(|i| Defect::scored(i as f64 * 8.0, i as f64 * 8.0 + 1.0, 3).unwrap())
            .collect();
        let regions = merge_into_regions(&defects, 1.0);
        let config = SelectionConfig::builder()
            .target_density(0.5)
            .min_retained_ratio(0.0)
            .build()
            .unwrap();
        let problem = CutProblem::new(&regions, 100.0, 1.0, &config).unwrap();

        let mut monitor = NodeLimitMonitor::new(5);
        match select_exact(&problem, 64, &mut monitor) {
            Err(SelectError::BudgetExceeded(e)) => {
                assert_eq!(e.nodes_explored, 5);
                assert!(e.reason.contains("node limit"));
            }
            other => panic!("expected BudgetExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_statistics_are_consistent() {
        let defects: Vec<Defect> = (0..8)
            .map(|i| Defect::scored(i as f64 * 12.0, i as f64 * 12.0 + 2.0, 4 + i).unwrap())
            .collect();
        let regions = merge_into_regions(&defects, 1.0);
        let config = SelectionConfig::builder()
            .target_density(10.0)
            .min_retained_ratio(0.8)
            .build()
            .unwrap();
        let outcome = run(&regions, 100.0, &config).unwrap();
        let stats = &outcome.statistics;

        assert!(stats.nodes_explored >= 1);
        assert!(stats.solutions_found >= 1);
        assert!(stats.prunings_floor + stats.prunings_bound <= stats.nodes_explored);
    }

    #[test]
    fn test_matches_brute_force_on_random_rolls() {
        let mut rng = ChaCha8Rng::seed_from_u64(0xc0ffee);

        for _ in 0..400 {
            let n = rng.random_range(1..9);
            let defects: Vec<Defect> = (0..n)
                .map(|_| {
                    let from = rng.random_range(0.0..95.0);
                    let to = if rng.random_bool(0.5) {
                        from
                    } else {
                        from + rng.random_range(0.0..5.0)
                    };
                    Defect::scored(from, to, rng.random_range(0..20)).unwrap()
                })
                .collect();
            let gap = if rng.random_bool(0.5) {
                0.0
            } else {
                rng.random_range(0.0..2.0)
            };
            let regions = merge_into_regions(&defects, gap);
            let point_cut_length = if rng.random_bool(0.2) {
                0.0
            } else {
                rng.random_range(0.5..8.0)
            };
            let mut builder = SelectionConfig::builder()
                .target_density(rng.random_range(0.0..60.0))
                .min_retained_ratio(rng.random_range(0.5..1.0))
                .join_penalty(rng.random_range(0.0..2.0))
                .point_cut_length(point_cut_length);
            if rng.random_bool(0.3) {
                builder = builder.max_cuts(rng.random_range(0..3));
            }
            let config = builder.build().unwrap();
            let problem = CutProblem::new(&regions, 100.0, 1.0, &config).unwrap();

            let expected = brute_force(&problem);
            match (select_exact(&problem, 64, &mut NoOpMonitor), expected) {
                (Ok(outcome), Some((len, cuts))) => {
                    assert!((outcome.final_length - len).abs() <= 1e-6, "{outcome} vs {len}");
                    assert_eq!(outcome.cuts(), cuts);
                    assert!(outcome.final_density <= config.target_density);
                }
                (Err(SelectError::Unsatisfiable(_)), None) => {}
                (got, want) => panic!("exact {:?} disagrees with brute force {:?}", got, want),
            }
        }
    }
}
