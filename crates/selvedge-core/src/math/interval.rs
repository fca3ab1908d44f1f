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

use num_traits::Float;
use smallvec::{SmallVec, smallvec};

/// A closed interval `[start, end]` over a floating point line.
///
/// Positions along a fabric roll are measured in real units (meters), and a
/// flaw reported at a single position is a valid, zero-length interval. Both
/// bounds therefore belong to the interval, and two intervals that share only
/// a boundary point still overlap.
///
/// # Invariants
/// Both bounds are finite and `start <= end`.
#[derive(Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClosedInterval<T>
where
    T: Float,
{
    start: T,
    end: T,
}

/// Deserializes through `try_new`, so inverted or non-finite bounds are rejected.
#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for ClosedInterval<T>
where
    T: Float + serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Bounds<T> {
            start: T,
            end: T,
        }

        let Bounds { start, end } = Bounds::<T>::deserialize(deserializer)?;
        Self::try_new(start, end).ok_or_else(|| {
            serde::de::Error::custom(
                "invalid interval: bounds must be finite and start must not exceed end",
            )
        })
    }
}

#[inline(always)]
fn two<T: Float>() -> T {
    T::one() + T::one()
}

impl<T> ClosedInterval<T>
where
    T: Float,
{
    /// Creates a new `ClosedInterval`.
    ///
    /// # Panics
    ///
    /// Panics if a bound is not finite or if `start > end`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use selvedge_core::math::interval::ClosedInterval;
    ///
    /// let iv = ClosedInterval::new(2.0, 5.5);
    /// assert_eq!(iv.len(), 3.5);
    /// ```
    #[inline]
    pub fn new(start: T, end: T) -> Self {
        assert!(
            start.is_finite() && end.is_finite() && start <= end,
            "Invalid interval: bounds must be finite and start must be less than or equal to end"
        );
        Self { start, end }
    }

    /// Creates a new `ClosedInterval` if the inputs are valid.
    ///
    /// Returns `None` if a bound is not finite or if `start > end`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use selvedge_core::math::interval::ClosedInterval;
    ///
    /// assert!(ClosedInterval::try_new(0.0, 10.0).is_some());
    /// assert!(ClosedInterval::try_new(3.0, 3.0).is_some());
    /// assert!(ClosedInterval::try_new(10.0, 0.0).is_none());
    /// assert!(ClosedInterval::try_new(f64::NAN, 1.0).is_none());
    /// ```
    #[inline]
    pub fn try_new(start: T, end: T) -> Option<Self> {
        if start.is_finite() && end.is_finite() && start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Creates a new `ClosedInterval` without checking invariants in release builds.
    ///
    /// The caller must ensure both bounds are finite and `start <= end`.
    #[inline]
    pub fn new_unchecked(start: T, end: T) -> Self {
        debug_assert!(
            start <= end,
            "Invalid interval: start must be less than or equal to end"
        );
        Self { start, end }
    }

    /// Creates the zero-length interval `[position, position]`.
    #[inline]
    pub fn point(position: T) -> Self {
        Self::new(position, position)
    }

    /// Returns the start bound.
    #[inline]
    pub const fn start(&self) -> T {
        self.start
    }

    /// Returns the end bound.
    #[inline]
    pub const fn end(&self) -> T {
        self.end
    }

    /// Returns the length of the interval (`end - start`).
    ///
    /// A point interval has length zero; lengths are never padded.
    #[inline]
    pub fn len(&self) -> T {
        self.end - self.start
    }

    /// Returns `true` if the interval has zero length.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Returns the midpoint of the interval.
    #[inline]
    pub fn midpoint(&self) -> T {
        self.start + self.len() / two()
    }

    /// Returns `true` if the two intervals share at least one point.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use selvedge_core::math::interval::ClosedInterval;
    ///
    /// let a = ClosedInterval::new(0.0, 10.0);
    /// assert!(a.intersects(ClosedInterval::new(10.0, 12.0))); // shared boundary
    /// assert!(!a.intersects(ClosedInterval::new(10.5, 12.0)));
    /// ```
    #[inline]
    pub fn intersects(&self, other: Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Returns `true` if the intervals overlap on a stretch of positive length.
    #[inline]
    pub fn overlaps_with_length(&self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns `true` if the empty space between the two intervals is at most `gap`.
    ///
    /// Intersecting intervals are always within any non-negative gap.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use selvedge_core::math::interval::ClosedInterval;
    ///
    /// let a = ClosedInterval::new(0.0, 2.0);
    /// let b = ClosedInterval::new(3.0, 4.0);
    /// assert!(a.within_gap(b, 1.0));
    /// assert!(!a.within_gap(b, 0.5));
    /// ```
    #[inline]
    pub fn within_gap(&self, other: Self, gap: T) -> bool {
        other.start <= self.end + gap && self.start <= other.end + gap
    }

    /// Returns the empty distance between two intervals, or zero if they intersect.
    #[inline]
    pub fn distance(&self, other: Self) -> T {
        if self.intersects(other) {
            T::zero()
        } else if self.end < other.start {
            other.start - self.end
        } else {
            self.start - other.end
        }
    }

    /// Returns `true` if `value` lies in `[start, end]`.
    #[inline]
    pub fn contains_point(&self, value: T) -> bool {
        self.start <= value && value <= self.end
    }

    /// Returns `true` if `other` lies entirely within `self`.
    #[inline]
    pub fn contains_interval(&self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Calculates the intersection of two intervals.
    ///
    /// Returns `None` if they share no point. Intervals touching at a single
    /// boundary intersect in a point interval.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use selvedge_core::math::interval::ClosedInterval;
    ///
    /// let a = ClosedInterval::new(0.0, 10.0);
    /// let b = ClosedInterval::new(5.0, 15.0);
    /// assert_eq!(a.intersection(b), Some(ClosedInterval::new(5.0, 10.0)));
    /// ```
    #[inline]
    pub fn intersection(&self, other: Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start <= end {
            Some(Self::new_unchecked(start, end))
        } else {
            None
        }
    }

    /// Returns the smallest interval covering both, regardless of the space between them.
    #[inline]
    pub fn hull(&self, other: Self) -> Self {
        Self::new_unchecked(self.start.min(other.start), self.end.max(other.end))
    }

    /// Calculates the union of two intervals.
    ///
    /// Returns `None` if the intervals share no point.
    #[inline]
    pub fn union(&self, other: Self) -> Option<Self> {
        if self.intersects(other) {
            Some(self.hull(other))
        } else {
            None
        }
    }

    /// Calculates the set difference `self - other`, keeping only pieces of positive length.
    ///
    /// # Returns
    ///
    /// * 0 intervals: If `other` covers `self`.
    /// * 1 interval: If `other` clips one side of `self` or does not overlap it.
    /// * 2 intervals: If `other` lies strictly inside `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use selvedge_core::math::interval::ClosedInterval;
    ///
    /// let roll = ClosedInterval::new(0.0, 100.0);
    /// let cut = ClosedInterval::new(40.0, 45.0);
    ///
    /// let pieces = roll.difference(cut);
    /// assert_eq!(pieces.len(), 2);
    /// assert_eq!(pieces[0], ClosedInterval::new(0.0, 40.0));
    /// assert_eq!(pieces[1], ClosedInterval::new(45.0, 100.0));
    /// ```
    pub fn difference(&self, other: Self) -> SmallVec<[Self; 2]> {
        if !self.overlaps_with_length(other) {
            return smallvec![*self];
        }

        let mut result = SmallVec::new();
        if self.start < other.start {
            result.push(Self::new_unchecked(self.start, other.start));
        }
        if other.end < self.end {
            result.push(Self::new_unchecked(other.end, self.end));
        }
        result
    }

    /// Widens the interval around its midpoint to at least `min_len`, staying inside `bounds`.
    ///
    /// If the centred window would cross a bound it is shifted back inside.
    /// If `bounds` itself is shorter than `min_len`, `bounds` is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use selvedge_core::math::interval::ClosedInterval;
    ///
    /// let roll = ClosedInterval::new(0.0, 100.0);
    /// let flaw = ClosedInterval::point(23.0);
    /// assert_eq!(flaw.widen_to(1.0, roll), ClosedInterval::new(22.5, 23.5));
    ///
    /// let edge = ClosedInterval::point(0.0);
    /// assert_eq!(edge.widen_to(1.0, roll), ClosedInterval::new(0.0, 1.0));
    /// ```
    pub fn widen_to(&self, min_len: T, bounds: Self) -> Self {
        if self.len() >= min_len {
            return *self;
        }
        if bounds.len() <= min_len {
            return bounds;
        }

        let half = min_len / two();
        let mid = self.midpoint();
        let mut start = mid - half;
        let mut end = mid + half;
        if start < bounds.start {
            start = bounds.start;
            end = bounds.start + min_len;
        } else if end > bounds.end {
            end = bounds.end;
            start = bounds.end - min_len;
        }
        Self::new_unchecked(start, end)
    }
}

impl<T> Default for ClosedInterval<T>
where
    T: Float,
{
    #[inline]
    fn default() -> Self {
        Self {
            start: T::zero(),
            end: T::zero(),
        }
    }
}

impl<T> std::fmt::Debug for ClosedInterval<T>
where
    T: Float + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosedInterval")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

impl<T> std::fmt::Display for ClosedInterval<T>
where
    T: Float + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl<T> std::ops::RangeBounds<T> for ClosedInterval<T>
where
    T: Float,
{
    fn start_bound(&self) -> std::ops::Bound<&T> {
        std::ops::Bound::Included(&self.start)
    }

    fn end_bound(&self) -> std::ops::Bound<&T> {
        std::ops::Bound::Included(&self.end)
    }
}

impl<T> From<ClosedInterval<T>> for std::ops::RangeInclusive<T>
where
    T: Float,
{
    #[inline]
    fn from(iv: ClosedInterval<T>) -> Self {
        iv.start..=iv.end
    }
}

/// Merges intervals that share at least one point into disjoint hulls.
///
/// The input may be in any order; the output is sorted by start and no two
/// output intervals intersect.
///
/// # Examples
///
/// ```rust
/// # use selvedge_core::math::interval::{ClosedInterval, merge_overlapping};
///
/// let merged = merge_overlapping(&[
///     ClosedInterval::new(5.0, 8.0),
///     ClosedInterval::new(0.0, 2.0),
///     ClosedInterval::new(7.0, 9.0),
/// ]);
/// assert_eq!(
///     merged,
///     vec![ClosedInterval::new(0.0, 2.0), ClosedInterval::new(5.0, 9.0)]
/// );
/// ```
pub fn merge_overlapping<T>(intervals: &[ClosedInterval<T>]) -> Vec<ClosedInterval<T>>
where
    T: Float,
{
    let mut sorted = intervals.to_vec();
    sorted.sort_by(|a, b| {
        a.start
            .partial_cmp(&b.start)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.end.partial_cmp(&b.end).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut merged: Vec<ClosedInterval<T>> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        match merged.last_mut() {
            Some(last) if last.intersects(iv) => *last = last.hull(iv),
            _ => merged.push(iv),
        }
    }
    merged
}

/// Returns the total length covered by a set of intervals, counting overlaps once.
///
/// # Examples
///
/// ```rust
/// # use selvedge_core::math::interval::{ClosedInterval, union_length};
///
/// let covered = union_length(&[
///     ClosedInterval::new(0.0, 4.0),
///     ClosedInterval::new(3.0, 5.0),
///     ClosedInterval::new(10.0, 11.0),
/// ]);
/// assert_eq!(covered, 6.0);
/// ```
pub fn union_length<T>(intervals: &[ClosedInterval<T>]) -> T
where
    T: Float,
{
    merge_overlapping(intervals)
        .iter()
        .fold(T::zero(), |acc, iv| acc + iv.len())
}

/// Returns the parts of `bounds` not covered by `holes`, in increasing order.
///
/// Only pieces of positive length are returned; holes may overlap each other
/// and may reach outside `bounds`.
///
/// # Examples
///
/// ```rust
/// # use selvedge_core::math::interval::{ClosedInterval, complement_within};
///
/// let roll = ClosedInterval::new(0.0, 100.0);
/// let kept = complement_within(
///     roll,
///     &[ClosedInterval::new(10.0, 20.0), ClosedInterval::new(90.0, 100.0)],
/// );
/// assert_eq!(
///     kept,
///     vec![ClosedInterval::new(0.0, 10.0), ClosedInterval::new(20.0, 90.0)]
/// );
/// ```
pub fn complement_within<T>(
    bounds: ClosedInterval<T>,
    holes: &[ClosedInterval<T>],
) -> Vec<ClosedInterval<T>>
where
    T: Float,
{
    let mut pieces = vec![bounds];
    for hole in merge_overlapping(holes) {
        let Some(last) = pieces.pop() else {
            break;
        };
        pieces.extend(last.difference(hole));
    }
    pieces.retain(|piece| !piece.is_degenerate());
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    type Iv = ClosedInterval<f64>;

    #[test]
    fn test_construction_valid() {
        let iv = Iv::new(10.0, 20.0);
        assert_eq!(iv.start(), 10.0);
        assert_eq!(iv.end(), 20.0);
        assert_eq!(iv.len(), 10.0);
        assert!(!iv.is_degenerate());
    }

    #[test]
    fn test_point_interval_has_zero_length() {
        let iv = Iv::point(23.0);
        assert_eq!(iv.len(), 0.0);
        assert!(iv.is_degenerate());
        assert!(iv.contains_point(23.0));
    }

    #[test]
    fn test_try_new_rejects_inverted_and_non_finite() {
        assert!(Iv::try_new(5.0, 10.0).is_some());
        assert!(Iv::try_new(10.0, 5.0).is_none());
        assert!(Iv::try_new(f64::NEG_INFINITY, 5.0).is_none());
        assert!(Iv::try_new(0.0, f64::NAN).is_none());
    }

    #[test]
    #[should_panic(expected = "Invalid interval")]
    fn test_new_panic() {
        let _ = Iv::new(3.0, 1.0);
    }

    #[test]
    fn test_intersects_is_closed_on_both_ends() {
        let a = Iv::new(0.0, 10.0);
        assert!(a.intersects(Iv::new(10.0, 20.0)));
        assert!(a.intersects(Iv::point(0.0)));
        assert!(!a.intersects(Iv::new(10.1, 20.0)));
        assert!(!a.overlaps_with_length(Iv::new(10.0, 20.0)));
        assert!(a.overlaps_with_length(Iv::new(9.0, 20.0)));
    }

    #[test]
    fn test_within_gap_is_symmetric() {
        let a = Iv::new(0.0, 2.0);
        let b = Iv::new(5.0, 6.0);
        assert!(a.within_gap(b, 3.0));
        assert!(b.within_gap(a, 3.0));
        assert!(!a.within_gap(b, 2.9));
        assert!(!b.within_gap(a, 2.9));
        assert_eq!(a.distance(b), 3.0);
        assert_eq!(b.distance(a), 3.0);
        assert_eq!(a.distance(Iv::new(1.0, 3.0)), 0.0);
    }

    #[test]
    fn test_intersection_and_union() {
        let a = Iv::new(0.0, 10.0);
        assert_eq!(a.intersection(Iv::new(10.0, 12.0)), Some(Iv::point(10.0)));
        assert_eq!(a.intersection(Iv::new(11.0, 12.0)), None);
        assert_eq!(a.union(Iv::new(8.0, 12.0)), Some(Iv::new(0.0, 12.0)));
        assert_eq!(a.union(Iv::new(11.0, 12.0)), None);
        assert_eq!(a.hull(Iv::new(11.0, 12.0)), Iv::new(0.0, 12.0));
    }

    #[test]
    fn test_difference_cases() {
        let a = Iv::new(0.0, 10.0);

        let covered = a.difference(Iv::new(-1.0, 11.0));
        assert!(covered.is_empty());

        let clipped = a.difference(Iv::new(8.0, 12.0));
        assert_eq!(clipped.as_slice(), &[Iv::new(0.0, 8.0)]);

        let untouched = a.difference(Iv::new(10.0, 12.0));
        assert_eq!(untouched.as_slice(), &[a]);

        let split = a.difference(Iv::new(4.0, 6.0));
        assert_eq!(split.as_slice(), &[Iv::new(0.0, 4.0), Iv::new(6.0, 10.0)]);
    }

    #[test]
    fn test_widen_to_keeps_long_intervals() {
        let bounds = Iv::new(0.0, 100.0);
        let iv = Iv::new(10.0, 15.0);
        assert_eq!(iv.widen_to(1.0, bounds), iv);
    }

    #[test]
    fn test_widen_to_clamps_at_both_ends() {
        let bounds = Iv::new(0.0, 10.0);
        assert_eq!(Iv::point(0.2).widen_to(2.0, bounds), Iv::new(0.0, 2.0));
        assert_eq!(Iv::point(9.9).widen_to(2.0, bounds), Iv::new(8.0, 10.0));
        assert_eq!(Iv::point(5.0).widen_to(2.0, bounds), Iv::new(4.0, 6.0));
        assert_eq!(Iv::point(5.0).widen_to(20.0, bounds), bounds);
    }

    #[test]
    fn test_merge_overlapping_sorts_and_joins_touching() {
        let merged = merge_overlapping(&[
            Iv::new(4.0, 5.0),
            Iv::new(0.0, 1.0),
            Iv::new(1.0, 2.0),
            Iv::new(4.5, 4.6),
        ]);
        assert_eq!(merged, vec![Iv::new(0.0, 2.0), Iv::new(4.0, 5.0)]);
        assert!(merge_overlapping::<f64>(&[]).is_empty());
    }

    #[test]
    fn test_union_length_counts_overlap_once() {
        assert_eq!(union_length(&[Iv::new(0.0, 4.0), Iv::new(2.0, 6.0)]), 6.0);
        assert_eq!(union_length::<f64>(&[]), 0.0);
    }

    #[test]
    fn test_complement_within() {
        let bounds = Iv::new(0.0, 50.0);
        assert_eq!(complement_within(bounds, &[]), vec![bounds]);

        let kept = complement_within(
            bounds,
            &[Iv::new(30.0, 40.0), Iv::new(0.0, 5.0), Iv::new(35.0, 45.0)],
        );
        assert_eq!(kept, vec![Iv::new(5.0, 30.0), Iv::new(45.0, 50.0)]);

        assert!(complement_within(bounds, &[Iv::new(-1.0, 60.0)]).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Iv::new(1.5, 2.0)), "[1.5, 2]");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_rejects_inverted_bounds() {
        let iv: Iv = serde_json::from_str(r#"{"start":1.5,"end":4.0}"#).unwrap();
        assert_eq!(iv, Iv::new(1.5, 4.0));
        assert!(serde_json::from_str::<Iv>(r#"{"start":5.0,"end":1.0}"#).is_err());
    }
}
