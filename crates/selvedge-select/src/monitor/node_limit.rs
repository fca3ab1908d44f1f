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

//! # Node Limit Monitor
//!
//! Stops the exact search once it has visited a fixed number of nodes. The
//! count is read from the search statistics, so the monitor itself keeps no
//! state and can be reused across searches.

use crate::{
    monitor::search_monitor::{SearchCommand, SearchMonitor},
    problem::{CutEvaluation, CutProblem},
    stats::SelectionStatistics,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLimitMonitor {
    node_limit: u64,
}

impl NodeLimitMonitor {
    #[inline]
    pub fn new(node_limit: u64) -> Self {
        Self { node_limit }
    }

    #[inline]
    pub fn node_limit(&self) -> u64 {
        self.node_limit
    }
}

impl SearchMonitor for NodeLimitMonitor {
    fn name(&self) -> &str {
        "NodeLimitMonitor"
    }

    fn on_enter_search(&mut self, _problem: &CutProblem<'_>, _stats: &SelectionStatistics) {}

    fn on_exit_search(&mut self, _stats: &SelectionStatistics) {}

    fn on_solution_found(&mut self, _incumbent: &CutEvaluation, _stats: &SelectionStatistics) {}

    #[inline(always)]
    fn on_step(&mut self, _stats: &SelectionStatistics) {}

    #[inline(always)]
    fn search_command(&self, stats: &SelectionStatistics) -> SearchCommand {
        if stats.nodes_explored >= self.node_limit {
            return SearchCommand::Terminate(format!("node limit of {} reached", self.node_limit));
        }
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_with_nodes(nodes: u64) -> SelectionStatistics {
        SelectionStatistics {
            nodes_explored: nodes,
            ..Default::default()
        }
    }

    #[test]
    fn test_continues_below_limit() {
        let mon = NodeLimitMonitor::new(5);
        assert_eq!(mon.search_command(&stats_with_nodes(4)), SearchCommand::Continue);
    }

    #[test]
    fn test_terminates_at_limit() {
        let mon = NodeLimitMonitor::new(5);
        match mon.search_command(&stats_with_nodes(5)) {
            SearchCommand::Terminate(msg) => assert_eq!(msg, "node limit of 5 reached"),
            other => panic!("expected Terminate, got {:?}", other),
        }
    }
}
