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

//! Entry points that run the configured strategy.

use crate::{
    config::{SelectionConfig, Strategy},
    error::SelectError,
    exact::select_exact,
    greedy::select_greedy,
    monitor::{
        composite::CompositeMonitor, node_limit::NodeLimitMonitor,
        search_monitor::SearchMonitor, time_limit::TimeLimitMonitor,
    },
    problem::CutProblem,
    result::SelectionOutcome,
};
use selvedge_model::region::Region;

/// Chooses which regions to cut from a roll of `roll_length × width`.
///
/// `regions` must be sorted and non-overlapping, as produced by
/// `merge_into_regions`. The input slice is never modified.
///
/// # Errors
///
/// * `Unsatisfiable` if the target cannot be met within the floor and cut budget.
/// * `BudgetExceeded` if the exact search hits its node, time or size limit.
/// * `Config`, `InvalidDimensions`, `InvalidRegions` for bad inputs.
///
/// # Examples
///
/// ```rust
/// use selvedge_model::{defect::Defect, region::merge_into_regions};
/// use selvedge_select::{config::SelectionConfig, select_cuts};
///
/// let defects = [
///     Defect::scored(10.0, 15.0, 2).unwrap(),
///     Defect::scored(50.0, 55.0, 1).unwrap(),
/// ];
/// let regions = merge_into_regions(&defects, 1.0);
/// let config = SelectionConfig::builder()
///     .target_density(2.0)
///     .max_cuts(1)
///     .build()
///     .unwrap();
///
/// let outcome = select_cuts(&regions, 100.0, 1.0, &config).unwrap();
/// assert_eq!(outcome.final_length, 95.0);
/// assert_eq!(outcome.removed[0].start(), 10.0);
/// ```
pub fn select_cuts(
    regions: &[Region],
    roll_length: f64,
    width: f64,
    config: &SelectionConfig,
) -> Result<SelectionOutcome, SelectError> {
    let mut monitor = crate::monitor::search_monitor::NoOpMonitor;
    select_cuts_with_monitor(regions, roll_length, width, config, &mut monitor)
}

/// Like `select_cuts`, with an extra monitor attached to the exact search.
///
/// The configured node and time limits are always enforced alongside
/// `monitor`. The greedy strategy does not consult monitors.
pub fn select_cuts_with_monitor<M>(
    regions: &[Region],
    roll_length: f64,
    width: f64,
    config: &SelectionConfig,
    monitor: &mut M,
) -> Result<SelectionOutcome, SelectError>
where
    M: SearchMonitor + ?Sized,
{
    let problem = CutProblem::new(regions, roll_length, width, config)?;
    log::debug!(
        "selecting cuts: {} region(s), roll {} x {}, {}",
        regions.len(),
        roll_length,
        width,
        config
    );

    match config.strategy {
        Strategy::Greedy => select_greedy(&problem),
        Strategy::Exact => {
            let mut composite = CompositeMonitor::with_capacity(3);
            composite.add_monitor(NodeLimitMonitor::new(config.node_limit));
            if let Some(limit) = config.time_limit {
                composite.add_monitor(TimeLimitMonitor::new(limit));
            }
            composite.add_monitor(monitor);
            select_exact(&problem, config.max_exact_regions, &mut composite)
        }
    }
}
