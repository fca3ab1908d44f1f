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

//! # Selvedge Select
//!
//! **Choosing which dense regions to cut out of a fabric roll.**
//!
//! Given the regions produced by `selvedge_model::region::merge_into_regions`,
//! the selector decides which to remove so the rest of the roll meets a
//! target defect density without dropping below a minimum retained length.
//!
//! ## Strategies
//!
//! * **Greedy** (`greedy`): cuts the densest eligible region until the target
//!   is met. Fast and predictable; what the cutting table uses day to day.
//! * **Exact** (`exact`): a bounded depth-first search over subsets of
//!   regions with points that keeps the most material, breaking ties by fewer
//!   cuts. Governed by search monitors (`monitor`).
//!
//! ## Architecture
//!
//! * **`config`**: `SelectionConfig`, its builder, and `Strategy`.
//! * **`problem`**: `CutProblem`, the validated inputs and the shared pricing
//!   of a candidate cut set.
//! * **`error`**: `SelectError`, `UnsatisfiableError`, `BudgetExceededError`.
//! * **`result`** / **`stats`**: `SelectionOutcome` and `SelectionStatistics`.
//! * **`selector`**: `select_cuts`, the strategy dispatch.

pub mod config;
pub mod error;
pub mod exact;
pub mod greedy;
pub mod monitor;
pub mod problem;
pub mod result;
pub mod selector;
pub mod stats;

pub use selector::{select_cuts, select_cuts_with_monitor};
