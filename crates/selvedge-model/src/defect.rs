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

//! Defect records and point arithmetic.
//!
//! A defect is a flaw observed over `[from, to]` along the roll. Most flaws
//! carry an integer severity score; a *continuous* flaw (a fault running
//! over a stretch of roll, such as a broken end) cannot be scored at all and
//! forces removal of whatever section contains it. `PointTally` keeps the two
//! apart while summing, so that a single continuous flaw turns a sum into
//! `+infinity` without losing the finite part.

use crate::Segment;
use std::str::FromStr;

/// Severity of a single defect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Points {
    /// A finite, non-negative severity score.
    Scored(u32),
    /// An unbounded flaw that cannot be density-scored and must always be removed.
    Continuous,
}

impl Points {
    /// Returns the score as a real number, `+infinity` for a continuous flaw.
    #[inline]
    pub fn value(&self) -> f64 {
        match self {
            Points::Scored(p) => f64::from(*p),
            Points::Continuous => f64::INFINITY,
        }
    }

    /// Returns the finite score, or `None` for a continuous flaw.
    #[inline]
    pub fn score(&self) -> Option<u32> {
        match self {
            Points::Scored(p) => Some(*p),
            Points::Continuous => None,
        }
    }

    #[inline]
    pub fn is_continuous(&self) -> bool {
        matches!(self, Points::Continuous)
    }
}

impl std::fmt::Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Points::Scored(p) => write!(f, "{}", p),
            Points::Continuous => write!(f, "continuous"),
        }
    }
}

impl From<u32> for Points {
    #[inline]
    fn from(points: u32) -> Self {
        Points::Scored(points)
    }
}

impl TryFrom<i64> for Points {
    type Error = InvalidDefectError;

    fn try_from(points: i64) -> Result<Self, Self::Error> {
        u32::try_from(points)
            .map(Points::Scored)
            .map_err(|_| InvalidDefectError::PointsOutOfRange(points))
    }
}

impl FromStr for Points {
    type Err = InvalidDefectError;

    /// Parses an integer score or one of the continuous markers
    /// (`continuous`, `continuous defect`, `cont`, `c`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let lowered = token.to_ascii_lowercase();
        match lowered.as_str() {
            "continuous" | "continuous defect" | "cont" | "c" => return Ok(Points::Continuous),
            _ => {}
        }
        match token.parse::<i64>() {
            Ok(points) => Points::try_from(points),
            Err(_) => Err(InvalidDefectError::UnrecognizedPoints(token.to_owned())),
        }
    }
}

/// Inspection grade of a flaw, as written on the inspection sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefectClass {
    Major,
    Minor,
}

impl std::fmt::Display for DefectClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefectClass::Major => write!(f, "major"),
            DefectClass::Minor => write!(f, "minor"),
        }
    }
}

impl FromStr for DefectClass {
    type Err = InvalidDefectError;

    /// Parses `major` or `minor`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.eq_ignore_ascii_case("major") {
            Ok(DefectClass::Major)
        } else if token.eq_ignore_ascii_case("minor") {
            Ok(DefectClass::Minor)
        } else {
            Err(InvalidDefectError::UnrecognizedClass(token.to_owned()))
        }
    }
}

/// The error type for malformed defect records.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidDefectError {
    /// The span starts after it ends.
    Inverted { from: f64, to: f64 },
    /// A bound is NaN or infinite.
    NonFinitePosition { from: f64, to: f64 },
    /// The score is negative or does not fit a `u32`.
    PointsOutOfRange(i64),
    /// The score is neither an integer nor a continuous marker.
    UnrecognizedPoints(String),
    /// The grade is neither `major` nor `minor`.
    UnrecognizedClass(String),
}

impl std::fmt::Display for InvalidDefectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inverted { from, to } => {
                write!(f, "Invalid defect: from ({}) is greater than to ({})", from, to)
            }
            Self::NonFinitePosition { from, to } => {
                write!(f, "Invalid defect: position [{}, {}] is not finite", from, to)
            }
            Self::PointsOutOfRange(p) => {
                write!(f, "Invalid defect: points {} must be a non-negative integer", p)
            }
            Self::UnrecognizedPoints(token) => write!(
                f,
                "Invalid defect: points '{}' is neither an integer nor a continuous marker",
                token
            ),
            Self::UnrecognizedClass(token) => write!(
                f,
                "Invalid defect: class '{}' is neither major nor minor",
                token
            ),
        }
    }
}

impl std::error::Error for InvalidDefectError {}

/// A single flaw observed over `[from, to]`.
///
/// Defects are immutable once constructed. Deserialization goes through
/// `Defect::new`, so a record with an inverted or non-finite span is rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "DefectRecord"))]
pub struct Defect {
    from: f64,
    to: f64,
    points: Points,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    class: Option<DefectClass>,
}

/// The unvalidated wire form of a `Defect`.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct DefectRecord {
    from: f64,
    to: f64,
    points: Points,
    #[serde(default)]
    class: Option<DefectClass>,
}

#[cfg(feature = "serde")]
impl TryFrom<DefectRecord> for Defect {
    type Error = InvalidDefectError;

    fn try_from(record: DefectRecord) -> Result<Self, Self::Error> {
        let defect = Defect::new(record.from, record.to, record.points)?;
        Ok(match record.class {
            Some(class) => defect.with_class(class),
            None => defect,
        })
    }
}

impl Defect {
    /// Creates a validated defect.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use selvedge_model::defect::{Defect, Points};
    ///
    /// let d = Defect::new(15.3, 18.5, Points::Continuous).unwrap();
    /// assert!(d.is_continuous());
    /// assert!(Defect::new(5.0, 4.0, Points::Scored(1)).is_err());
    /// ```
    pub fn new(from: f64, to: f64, points: Points) -> Result<Self, InvalidDefectError> {
        if !from.is_finite() || !to.is_finite() {
            return Err(InvalidDefectError::NonFinitePosition { from, to });
        }
        if from > to {
            return Err(InvalidDefectError::Inverted { from, to });
        }
        Ok(Self {
            from,
            to,
            points,
            class: None,
        })
    }

    /// Returns this defect graded as `class`.
    #[inline]
    pub fn with_class(self, class: DefectClass) -> Self {
        Self {
            class: Some(class),
            ..self
        }
    }

    /// Creates a scored defect over `[from, to]`.
    #[inline]
    pub fn scored(from: f64, to: f64, points: u32) -> Result<Self, InvalidDefectError> {
        Self::new(from, to, Points::Scored(points))
    }

    /// Creates a continuous defect over `[from, to]`.
    #[inline]
    pub fn continuous(from: f64, to: f64) -> Result<Self, InvalidDefectError> {
        Self::new(from, to, Points::Continuous)
    }

    /// Creates a scored defect at a single position.
    #[inline]
    pub fn at(position: f64, points: u32) -> Result<Self, InvalidDefectError> {
        Self::new(position, position, Points::Scored(points))
    }

    /// Returns the `from` position.
    #[inline]
    pub fn start(&self) -> f64 {
        self.from
    }

    /// Returns the `to` position.
    #[inline]
    pub fn end(&self) -> f64 {
        self.to
    }

    #[inline]
    pub fn points(&self) -> Points {
        self.points
    }

    #[inline]
    pub fn is_continuous(&self) -> bool {
        self.points.is_continuous()
    }

    /// Returns the inspection grade, if one was recorded.
    #[inline]
    pub fn class(&self) -> Option<DefectClass> {
        self.class
    }

    /// Returns the span of the defect as a segment.
    #[inline]
    pub fn span(&self) -> Segment {
        Segment::new_unchecked(self.from, self.to)
    }

    /// Returns `true` if the defect touches `[start, end]` at all.
    ///
    /// Partial overlap counts; this is what keeps density estimates conservative.
    #[inline]
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.from <= end && self.to >= start
    }
}

impl std::fmt::Display for Defect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Defect([{}, {}], points: {}", self.from, self.to, self.points)?;
        if let Some(class) = self.class {
            write!(f, ", class: {}", class)?;
        }
        write!(f, ")")
    }
}

/// A running sum of defect points that keeps continuous flaws separate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointTally {
    scored: u64,
    continuous: usize,
}

impl PointTally {
    pub const ZERO: PointTally = PointTally {
        scored: 0,
        continuous: 0,
    };

    /// Creates a tally from its parts.
    #[inline]
    pub const fn new(scored: u64, continuous: usize) -> Self {
        Self { scored, continuous }
    }

    /// Returns the sum of finite scores.
    #[inline]
    pub const fn scored(&self) -> u64 {
        self.scored
    }

    /// Returns how many continuous flaws were counted.
    #[inline]
    pub const fn continuous_count(&self) -> usize {
        self.continuous
    }

    /// Returns `true` if at least one continuous flaw was counted.
    #[inline]
    pub const fn is_unbounded(&self) -> bool {
        self.continuous > 0
    }

    /// Returns the total as a real number, `+infinity` when unbounded.
    #[inline]
    pub fn value(&self) -> f64 {
        if self.is_unbounded() {
            f64::INFINITY
        } else {
            self.scored as f64
        }
    }

    /// Adds the points of a single defect.
    #[inline]
    pub fn record(&mut self, points: Points) {
        match points {
            Points::Scored(p) => self.scored = self.scored.saturating_add(u64::from(p)),
            Points::Continuous => self.continuous = self.continuous.saturating_add(1),
        }
    }

    /// Removes `other` from this tally, clamping both parts at zero.
    #[inline]
    pub fn saturating_sub(self, other: PointTally) -> PointTally {
        PointTally {
            scored: self.scored.saturating_sub(other.scored),
            continuous: self.continuous.saturating_sub(other.continuous),
        }
    }
}

impl std::ops::Add for PointTally {
    type Output = PointTally;

    #[inline]
    fn add(self, rhs: PointTally) -> PointTally {
        PointTally {
            scored: self.scored.saturating_add(rhs.scored),
            continuous: self.continuous.saturating_add(rhs.continuous),
        }
    }
}

impl std::ops::AddAssign for PointTally {
    #[inline]
    fn add_assign(&mut self, rhs: PointTally) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for PointTally {
    fn sum<I: Iterator<Item = PointTally>>(iter: I) -> Self {
        iter.fold(PointTally::ZERO, |acc, t| acc + t)
    }
}

impl<'a> FromIterator<&'a Defect> for PointTally {
    fn from_iter<I: IntoIterator<Item = &'a Defect>>(iter: I) -> Self {
        let mut tally = PointTally::ZERO;
        for defect in iter {
            tally.record(defect.points());
        }
        tally
    }
}

impl std::fmt::Display for PointTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unbounded() {
            write!(f, "{} + {} continuous", self.scored, self.continuous)
        } else {
            write!(f, "{}", self.scored)
        }
    }
}

/// Sums the points of every defect that overlaps `[start, end]`.
///
/// A defect counts if `defect.from <= end && defect.to >= start`. If any
/// continuous defect is counted, the tally's `value()` is `+infinity`.
///
/// # Examples
///
/// ```rust
/// # use selvedge_model::defect::{Defect, points_in_range};
///
/// let defects = [
///     Defect::at(7.0, 1).unwrap(),
///     Defect::scored(9.0, 12.0, 4).unwrap(),
///     Defect::continuous(15.3, 18.5).unwrap(),
/// ];
/// assert_eq!(points_in_range(&defects, 0.0, 10.0).value(), 5.0);
/// assert_eq!(points_in_range(&defects, 18.0, 30.0).value(), f64::INFINITY);
/// ```
pub fn points_in_range(defects: &[Defect], start: f64, end: f64) -> PointTally {
    defects.iter().filter(|d| d.overlaps(start, end)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_parse_integer_and_markers() {
        assert_eq!("4".parse::<Points>(), Ok(Points::Scored(4)));
        assert_eq!(" 0 ".parse::<Points>(), Ok(Points::Scored(0)));
        assert_eq!("continuous".parse::<Points>(), Ok(Points::Continuous));
        assert_eq!("Continuous Defect".parse::<Points>(), Ok(Points::Continuous));
        assert_eq!("C".parse::<Points>(), Ok(Points::Continuous));
    }

    #[test]
    fn test_points_parse_rejects_negative_and_garbage() {
        assert_eq!(
            "-3".parse::<Points>(),
            Err(InvalidDefectError::PointsOutOfRange(-3))
        );
        assert!(matches!(
            "lots".parse::<Points>(),
            Err(InvalidDefectError::UnrecognizedPoints(t)) if t == "lots"
        ));
        assert!(matches!(
            "1.5".parse::<Points>(),
            Err(InvalidDefectError::UnrecognizedPoints(_))
        ));
    }

    #[test]
    fn test_defect_validation() {
        assert!(Defect::scored(1.0, 1.0, 4).is_ok());
        assert_eq!(
            Defect::scored(2.0, 1.0, 4),
            Err(InvalidDefectError::Inverted { from: 2.0, to: 1.0 })
        );
        assert!(matches!(
            Defect::scored(f64::NAN, 1.0, 4),
            Err(InvalidDefectError::NonFinitePosition { .. })
        ));
    }

    #[test]
    fn test_overlap_counts_partial_coverage() {
        let d = Defect::scored(10.0, 20.0, 3).unwrap();
        assert!(d.overlaps(0.0, 10.0), "touching the start counts");
        assert!(d.overlaps(20.0, 30.0), "touching the end counts");
        assert!(d.overlaps(12.0, 13.0), "range inside the defect counts");
        assert!(!d.overlaps(0.0, 9.99));
        assert!(!d.overlaps(20.01, 30.0));
    }

    #[test]
    fn test_tally_keeps_continuous_separate() {
        let mut tally = PointTally::ZERO;
        tally.record(Points::Scored(4));
        tally.record(Points::Scored(5));
        assert_eq!(tally.value(), 9.0);
        assert!(!tally.is_unbounded());

        tally.record(Points::Continuous);
        assert_eq!(tally.scored(), 9);
        assert_eq!(tally.continuous_count(), 1);
        assert_eq!(tally.value(), f64::INFINITY);

        let removed = PointTally::new(4, 1);
        let rest = tally.saturating_sub(removed);
        assert_eq!(rest, PointTally::new(5, 0));
        assert_eq!(rest.value(), 5.0);
    }

    #[test]
    fn test_points_in_range_sums_overlapping_only() {
        let defects = vec![
            Defect::at(2.0, 4).unwrap(),
            Defect::at(5.0, 4).unwrap(),
            Defect::at(10.0, 1).unwrap(),
            Defect::scored(23.0, 28.0, 10).unwrap(),
        ];
        assert_eq!(points_in_range(&defects, 0.0, 5.0).value(), 8.0);
        assert_eq!(points_in_range(&defects, 25.0, 26.0).value(), 10.0);
        assert_eq!(points_in_range(&defects, 11.0, 22.0).value(), 0.0);
        assert_eq!(points_in_range(&[], 0.0, 100.0), PointTally::ZERO);
    }

    #[test]
    fn test_display() {
        let d = Defect::continuous(15.3, 18.5).unwrap();
        assert_eq!(format!("{}", d), "Defect([15.3, 18.5], points: continuous)");
        assert_eq!(format!("{}", PointTally::new(7, 0)), "7");
        assert_eq!(format!("{}", PointTally::new(7, 2)), "7 + 2 continuous");
    }

    #[test]
    fn test_class_is_optional_and_shown() {
        let d = Defect::at(7.0, 4).unwrap();
        assert_eq!(d.class(), None);

        let graded = d.with_class(DefectClass::Major);
        assert_eq!(graded.class(), Some(DefectClass::Major));
        assert_eq!(graded.points(), Points::Scored(4));
        assert_eq!(format!("{}", graded), "Defect([7, 7], points: 4, class: major)");

        assert_eq!("MINOR".parse::<DefectClass>(), Ok(DefectClass::Minor));
        assert!(matches!(
            "severe".parse::<DefectClass>(),
            Err(InvalidDefectError::UnrecognizedClass(t)) if t == "severe"
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates_span() {
        let d: Defect =
            serde_json::from_str(r#"{"from":1.0,"to":5.0,"points":{"Scored":3},"class":"Major"}"#)
                .unwrap();
        assert_eq!(d, Defect::scored(1.0, 5.0, 3).unwrap().with_class(DefectClass::Major));

        let plain: Defect = serde_json::from_str(r#"{"from":2.0,"to":2.0,"points":"Continuous"}"#)
            .unwrap();
        assert_eq!(plain.class(), None);

        let inverted = serde_json::from_str::<Defect>(r#"{"from":5.0,"to":1.0,"points":{"Scored":3}}"#);
        assert!(inverted.is_err());
    }
}
