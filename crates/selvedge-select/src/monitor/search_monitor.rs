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

use crate::{
    problem::{CutEvaluation, CutProblem},
    stats::SelectionStatistics,
};

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum SearchCommand {
    #[default]
    Continue,
    Terminate(String),
}

impl std::fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate: {}", reason),
        }
    }
}

/// Hooks into the exact cut search.
///
/// `on_step` runs once per node before `search_command` is polled, so a
/// monitor that counts steps sees the node it is asked about.
pub trait SearchMonitor {
    fn name(&self) -> &str;
    fn on_enter_search(&mut self, problem: &CutProblem<'_>, stats: &SelectionStatistics);
    fn on_exit_search(&mut self, stats: &SelectionStatistics);
    fn on_solution_found(&mut self, incumbent: &CutEvaluation, stats: &SelectionStatistics);
    fn on_step(&mut self, stats: &SelectionStatistics);
    fn search_command(&self, stats: &SelectionStatistics) -> SearchCommand;
}

impl std::fmt::Debug for dyn SearchMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}

impl std::fmt::Display for dyn SearchMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}

impl<M> SearchMonitor for &mut M
where
    M: SearchMonitor + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_enter_search(&mut self, problem: &CutProblem<'_>, stats: &SelectionStatistics) {
        (**self).on_enter_search(problem, stats);
    }

    fn on_exit_search(&mut self, stats: &SelectionStatistics) {
        (**self).on_exit_search(stats);
    }

    fn on_solution_found(&mut self, incumbent: &CutEvaluation, stats: &SelectionStatistics) {
        (**self).on_solution_found(incumbent, stats);
    }

    #[inline(always)]
    fn on_step(&mut self, stats: &SelectionStatistics) {
        (**self).on_step(stats);
    }

    #[inline(always)]
    fn search_command(&self, stats: &SelectionStatistics) -> SearchCommand {
        (**self).search_command(stats)
    }
}

/// A monitor that does nothing and never stops the search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpMonitor;

impl SearchMonitor for NoOpMonitor {
    fn name(&self) -> &str {
        "NoOpMonitor"
    }

    fn on_enter_search(&mut self, _problem: &CutProblem<'_>, _stats: &SelectionStatistics) {}

    fn on_exit_search(&mut self, _stats: &SelectionStatistics) {}

    fn on_solution_found(&mut self, _incumbent: &CutEvaluation, _stats: &SelectionStatistics) {}

    #[inline(always)]
    fn on_step(&mut self, _stats: &SelectionStatistics) {}

    #[inline(always)]
    fn search_command(&self, _stats: &SelectionStatistics) -> SearchCommand {
        SearchCommand::Continue
    }
}
