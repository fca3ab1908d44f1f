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

//! # Selvedge Solver
//!
//! **From an inspected roll to a cutting plan.**
//!
//! This crate ties the workspace together: it merges the defects of a
//! `FabricRoll` into regions, hands them to `selvedge_select`, and rebuilds
//! the roll that is left once the chosen regions are cut out.
//!
//! ## Architecture
//!
//! * **`planner`**: `CutPlanner`, the end-to-end pipeline, with optional
//!   scrapping of offcuts too short to sell.
//! * **`reconstruct`**: `reconstruct`, which turns removed segments back into
//!   retained pieces, surviving defects and a final density.
//! * **`join`**: `join_rolls`, which splices several reconstructed rolls
//!   into one delivery roll.

pub mod join;
pub mod planner;
pub mod reconstruct;

pub use planner::{CutPlan, CutPlanner, CutPlannerBuilder, PlanError};
pub use reconstruct::{Reconstruction, reconstruct};
