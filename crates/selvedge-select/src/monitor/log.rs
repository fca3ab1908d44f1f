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

//! Periodic progress reporting for the exact search.
//!
//! Lines go through `log::info!`, so nothing is printed unless the host
//! application installs a logger.

use crate::{
    monitor::search_monitor::{SearchCommand, SearchMonitor},
    problem::{CutEvaluation, CutProblem},
    stats::SelectionStatistics,
};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct LogMonitor {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    best: Option<CutEvaluation>,
}

impl LogMonitor {
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            log_interval,
            clock_check_mask,
            best: None,
        }
    }

    fn log_line(&mut self, stats: &SelectionStatistics) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.start_time).as_secs_f32();

        let best = match &self.best {
            Some(b) => format!("{:.3} m / {} cut(s)", b.retained_length, b.cuts),
            None => "none".to_string(),
        };

        log::info!(
            "{:>8.1}s | nodes {:<12} | best {:<24} | pruned floor {:<10} | pruned bound {:<10}",
            elapsed,
            stats.nodes_explored,
            best,
            stats.prunings_floor,
            stats.prunings_bound
        );

        self.last_log_time = now;
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 4095)
    }
}

impl std::fmt::Display for LogMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogMonitor(log_interval: {}s, clock_check_mask: {})",
            self.log_interval.as_secs(),
            self.clock_check_mask
        )
    }
}

impl SearchMonitor for LogMonitor {
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_enter_search(&mut self, problem: &CutProblem<'_>, _stats: &SelectionStatistics) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best = None;
        log::info!(
            "exact search over {} region(s), roll {} x {}, target {}",
            problem.num_regions(),
            problem.roll_length(),
            problem.width(),
            problem.target_density()
        );
    }

    fn on_exit_search(&mut self, stats: &SelectionStatistics) {
        self.log_line(stats);
        log::info!("exact search finished");
    }

    fn on_solution_found(&mut self, incumbent: &CutEvaluation, _stats: &SelectionStatistics) {
        self.best = Some(*incumbent);
    }

    fn on_step(&mut self, stats: &SelectionStatistics) {
        if (stats.nodes_explored & self.clock_check_mask) == 0
            && self.last_log_time.elapsed() >= self.log_interval
        {
            self.log_line(stats);
        }
    }

    #[inline(always)]
    fn search_command(&self, _stats: &SelectionStatistics) -> SearchCommand {
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let mon = LogMonitor::new(Duration::from_secs(2), 255);
        assert_eq!(
            format!("{}", mon),
            "LogMonitor(log_interval: 2s, clock_check_mask: 255)"
        );
    }

    #[test]
    fn test_never_terminates_and_tracks_incumbent() {
        let mut mon = LogMonitor::default();
        let stats = SelectionStatistics::default();
        mon.on_solution_found(
            &CutEvaluation {
                cuts: 2,
                retained_length: 80.0,
                remaining_points: selvedge_model::defect::PointTally::new(3, 0),
                density: 1.0,
            },
            &stats,
        );
        assert_eq!(mon.best.map(|b| b.cuts), Some(2));
        assert_eq!(mon.search_command(&stats), SearchCommand::Continue);
    }
}
