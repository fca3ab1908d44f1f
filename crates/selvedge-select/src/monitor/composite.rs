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
    monitor::{
        index::MonitorIndex,
        search_monitor::{SearchCommand, SearchMonitor},
    },
    problem::{CutEvaluation, CutProblem},
    stats::SelectionStatistics,
};

/// A composite monitor that forwards events to all of its monitors.
///
/// The first monitor that asks to terminate wins; its reason is reported.
pub struct CompositeMonitor<'a> {
    monitors: Vec<Box<dyn SearchMonitor + 'a>>,
}

impl std::fmt::Debug for CompositeMonitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeMonitor")
            .field("monitors", &self.names().join(", "))
            .finish()
    }
}

impl std::fmt::Display for CompositeMonitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CompositeMonitor([{}])", self.names().join(", "))
    }
}

impl Default for CompositeMonitor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CompositeMonitor<'a> {
    /// Creates a new empty `CompositeMonitor`.
    #[inline]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    /// Adds a monitor.
    #[inline]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: SearchMonitor + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    /// Adds an already boxed monitor.
    #[inline]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn SearchMonitor + 'a>) {
        self.monitors.push(monitor);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// Returns the monitor at `monitor_index`.
    ///
    /// # Panics
    ///
    /// Panics if `monitor_index` is out of bounds.
    #[inline]
    pub fn monitor(&self, monitor_index: MonitorIndex) -> &(dyn SearchMonitor + 'a) {
        let index = monitor_index.get();
        debug_assert!(
            index < self.monitors.len(),
            "called `CompositeMonitor::monitor` with monitor index out of bounds: the len is {} but the index is {}",
            index,
            self.monitors.len()
        );

        self.monitors[index].as_ref()
    }

    fn names(&self) -> Vec<&str> {
        self.monitors.iter().map(|m| m.name()).collect()
    }
}

impl<'a> FromIterator<Box<dyn SearchMonitor + 'a>> for CompositeMonitor<'a> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn SearchMonitor + 'a>>,
    {
        Self {
            monitors: iter.into_iter().collect(),
        }
    }
}

impl SearchMonitor for CompositeMonitor<'_> {
    fn name(&self) -> &str {
        "CompositeMonitor"
    }

    fn on_enter_search(&mut self, problem: &CutProblem<'_>, stats: &SelectionStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(problem, stats);
        }
    }

    fn on_exit_search(&mut self, stats: &SelectionStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(stats);
        }
    }

    fn on_solution_found(&mut self, incumbent: &CutEvaluation, stats: &SelectionStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_solution_found(incumbent, stats);
        }
    }

    fn on_step(&mut self, stats: &SelectionStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_step(stats);
        }
    }

    fn search_command(&self, stats: &SelectionStatistics) -> SearchCommand {
        // Plain loop; this runs once per node.
        for monitor in &self.monitors {
            if let SearchCommand::Terminate(reason) = monitor.search_command(stats) {
                return SearchCommand::Terminate(reason);
            }
        }
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{node_limit::NodeLimitMonitor, search_monitor::NoOpMonitor};

    #[test]
    fn test_empty_composite_continues() {
        let composite = CompositeMonitor::new();
        assert!(composite.is_empty());
        assert_eq!(
            composite.search_command(&SelectionStatistics::default()),
            SearchCommand::Continue
        );
    }

    #[test]
    fn test_first_terminating_monitor_wins() {
        let mut composite = CompositeMonitor::with_capacity(2);
        composite.add_monitor(NoOpMonitor);
        composite.add_monitor(NodeLimitMonitor::new(3));

        let stats = SelectionStatistics {
            nodes_explored: 3,
            ..Default::default()
        };
        match composite.search_command(&stats) {
            SearchCommand::Terminate(reason) => assert!(reason.contains("node limit")),
            other => panic!("expected Terminate, got {:?}", other),
        }
    }

    #[test]
    fn test_display_lists_monitor_names() {
        let composite: CompositeMonitor = vec![
            Box::new(NoOpMonitor) as Box<dyn SearchMonitor>,
            Box::new(NodeLimitMonitor::new(10)),
        ]
        .into_iter()
        .collect();

        assert_eq!(composite.len(), 2);
        assert_eq!(composite.monitor(MonitorIndex::new(1)).name(), "NodeLimitMonitor");
        assert_eq!(
            format!("{}", composite),
            "CompositeMonitor([NoOpMonitor, NodeLimitMonitor])"
        );
    }
}
