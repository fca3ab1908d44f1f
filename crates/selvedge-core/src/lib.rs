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

//! # Selvedge Core
//!
//! Foundational math and utility primitives for the Selvedge fabric roll
//! ecosystem. The crate is deliberately small: it knows nothing about defects
//! or quality standards, only about positions along a line and about keeping
//! index spaces apart.
//!
//! ## Modules
//!
//! - `math`: Closed real intervals `[start, end]` with overlap and gap
//!   queries, set operations (intersection/hull/difference), widening to a
//!   minimum length inside bounds, and span-set helpers (merge, measure,
//!   complement).
//! - `utils`: Phantom-tagged, strongly typed indices (`TypedIndex<T>`).

pub mod math;
pub mod utils;
