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

//! # Search Monitors
//!
//! Observers and controllers for the exact cut search. Monitors see every
//! node, every improving selection and the end of the search, and can stop
//! the search with a reason.
//!
//! ## Submodules
//!
//! - `search_monitor`: Core trait (`SearchMonitor`), `SearchCommand` and the
//!   do-nothing `NoOpMonitor`.
//! - `composite`: Aggregate multiple monitors into a single composite.
//! - `index`: Strongly typed monitor indices.
//! - `node_limit`: Node budget.
//! - `time_limit`: Wall-clock budget with step-filtered clock checks.
//! - `log`: Periodic progress lines through the `log` facade.
//!
//! The exact selector turns any `Terminate` into a `BudgetExceededError`.

pub mod composite;
pub mod index;
pub mod log;
pub mod node_limit;
pub mod search_monitor;
pub mod time_limit;
