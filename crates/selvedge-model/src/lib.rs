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

//! # Selvedge Model
//!
//! **The domain model for fabric roll quality assessment.**
//!
//! A roll of fabric is inspected end to end and every flaw is recorded as a
//! longitudinal span with a severity score. This crate turns those raw records
//! into the quantities the cut selector reasons about: defect density over any
//! stretch of the roll, and the contiguous "dense regions" that are candidates
//! for removal.
//!
//! ## Architecture
//!
//! * **`index`**: Strongly typed `DefectIndex` and `RegionIndex`.
//! * **`defect`**: `Defect`, `Points` (scored or continuous), `PointTally`, and
//!   the overlap-based `points_in_range` query.
//! * **`density`**: Points per hundred square units over a whole roll or any
//!   sub-interval, with explicit rules for zero-area sections.
//! * **`roll`**: The validated `FabricRoll` and its `FabricRollBuilder`.
//! * **`region`**: `Region` and the gap-tolerant `merge_into_regions` scan.
//! * **`loading`**: A plain-text defect list loader.
//!
//! ## Design Philosophy
//!
//! 1.  **Immutable inputs**: Defects are never mutated. Every derived view is a
//!     new collection owned by the caller.
//! 2.  **Fail-Fast**: Constructors validate eagerly, so the selector never sees
//!     an inverted span or a position outside the roll.
//! 3.  **No sentinels for errors**: An infinite density is a legitimate value
//!     (an unscoreable flaw), never a stand-in for a failure.

pub mod defect;
pub mod density;
pub mod index;
pub mod loading;
pub mod region;
pub mod roll;

/// A longitudinal range of roll, `[start, end]` in length units.
///
/// Retained and removed material share this type; their role is given by the
/// collection they appear in.
pub type Segment = selvedge_core::math::interval::ClosedInterval<f64>;
