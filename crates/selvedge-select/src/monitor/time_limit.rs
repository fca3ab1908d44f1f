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

//! # Time Limit Monitor
//!
//! Enforces a wall-clock budget on the exact search. The clock is only read
//! when `(steps & clock_check_mask) == 0`; the default mask (`0x3FF`) checks
//! about every thousand nodes, which is frequent enough for searches whose
//! nodes each merge a handful of intervals.
//!
//! ```rust
//! use selvedge_select::monitor::time_limit::TimeLimitMonitor;
//! use selvedge_select::monitor::search_monitor::{SearchCommand, SearchMonitor};
//! use selvedge_select::stats::SelectionStatistics;
//! use std::time::Duration;
//!
//! let mut mon = TimeLimitMonitor::new(Duration::from_secs(5));
//! let stats = SelectionStatistics::default();
//! mon.on_step(&stats);
//! assert_eq!(mon.search_command(&stats), SearchCommand::Continue);
//! ```

use crate::{
    monitor::search_monitor::{SearchCommand, SearchMonitor},
    problem::{CutEvaluation, CutProblem},
    stats::SelectionStatistics,
};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimitMonitor {
    clock_check_mask: u64,
    steps: u64,
    time_limit: Duration,
    start_time: Instant,
}

impl TimeLimitMonitor {
    /// Check every 1,024 steps.
    const DEFAULT_STEP_CLOCK_CHECK_MASK: u64 = 0x3FF;

    #[inline]
    pub fn new(time_limit: Duration) -> Self {
        Self::with_clock_check_mask(time_limit, Self::DEFAULT_STEP_CLOCK_CHECK_MASK)
    }

    #[inline]
    pub fn with_clock_check_mask(time_limit: Duration, clock_check_mask: u64) -> Self {
        Self {
            clock_check_mask,
            steps: 0,
            time_limit,
            start_time: Instant::now(),
        }
    }

    #[inline]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }
}

impl SearchMonitor for TimeLimitMonitor {
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_enter_search(&mut self, _problem: &CutProblem<'_>, _stats: &SelectionStatistics) {
        self.start_time = Instant::now();
        self.steps = 0;
    }

    fn on_exit_search(&mut self, _stats: &SelectionStatistics) {}

    fn on_solution_found(&mut self, _incumbent: &CutEvaluation, _stats: &SelectionStatistics) {}

    #[inline(always)]
    fn on_step(&mut self, _stats: &SelectionStatistics) {
        self.steps = self.steps.wrapping_add(1);
    }

    #[inline(always)]
    fn search_command(&self, _stats: &SelectionStatistics) -> SearchCommand {
        if (self.steps & self.clock_check_mask) == 0 && self.start_time.elapsed() >= self.time_limit
        {
            return SearchCommand::Terminate("time limit reached".to_string());
        }
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> SelectionStatistics {
        SelectionStatistics::default()
    }

    #[test]
    fn test_default_mask_is_power_of_two_minus_one() {
        let mask = TimeLimitMonitor::DEFAULT_STEP_CLOCK_CHECK_MASK;
        assert_eq!(mask & (mask + 1), 0);
    }

    #[test]
    fn test_terminates_after_time_limit_when_mask_condition_met() {
        let mut mon = TimeLimitMonitor::new(Duration::from_millis(10));
        mon.start_time = Instant::now() - Duration::from_millis(50);
        mon.steps = 0;
        match mon.search_command(&stats()) {
            SearchCommand::Terminate(msg) => {
                assert!(msg.contains("time limit"), "unexpected message: {msg}");
            }
            other => panic!("expected Terminate, got {:?}", other),
        }
    }

    #[test]
    fn test_skips_clock_when_mask_condition_not_met() {
        let mut mon = TimeLimitMonitor::new(Duration::from_millis(1));
        mon.start_time = Instant::now() - Duration::from_millis(50);
        mon.steps = 1;
        assert_eq!(mon.search_command(&stats()), SearchCommand::Continue);
    }

    #[test]
    fn test_zero_mask_always_checks() {
        let mut mon = TimeLimitMonitor::with_clock_check_mask(Duration::from_millis(1), 0);
        mon.start_time = Instant::now() - Duration::from_millis(50);
        mon.steps = 12345;
        assert!(matches!(
            mon.search_command(&stats()),
            SearchCommand::Terminate(_)
        ));
    }

    #[test]
    fn test_continues_before_time_limit() {
        let mon = TimeLimitMonitor::new(Duration::from_secs(60));
        assert_eq!(mon.search_command(&stats()), SearchCommand::Continue);
    }

    #[test]
    fn test_on_step_increments_steps_wrapping() {
        let mut mon = TimeLimitMonitor::new(Duration::from_secs(1));
        mon.steps = u64::MAX;
        mon.on_step(&stats());
        assert_eq!(mon.steps, 0);
    }
}
