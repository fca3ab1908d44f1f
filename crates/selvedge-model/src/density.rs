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

//! Defect density in points per hundred square units (PPHSM).
//!
//! `density = points * 100 / (length * width)`. Zero-area sections are valid
//! inputs rather than errors: a zero-area section with points is maximally
//! bad (`+infinity`) and one without points is perfect (`0`). This keeps the
//! ordering sane for the selector without ever dividing by zero. A NaN
//! length or width has no area either and follows the same rule.

use crate::{
    Segment,
    defect::{Defect, PointTally, points_in_range},
    roll::FabricRoll,
};

/// Area scale of the density unit: points per this many square units.
pub const DENSITY_AREA_SCALE: f64 = 100.0;

/// Returns `points_total * 100 / (length * width)`.
///
/// # Examples
///
/// ```rust
/// # use selvedge_model::density::density;
///
/// let d = density(4.0, 103.0, 1.5);
/// assert!((d - 2.589).abs() < 1e-3);
///
/// assert_eq!(density(3.0, 0.0, 1.5), f64::INFINITY);
/// assert_eq!(density(0.0, 0.0, 1.5), 0.0);
/// ```
#[inline]
pub fn density(points_total: f64, length: f64, width: f64) -> f64 {
    if !(length > 0.0 && width > 0.0) {
        return if points_total > 0.0 { f64::INFINITY } else { 0.0 };
    }
    points_total * DENSITY_AREA_SCALE / (length * width)
}

/// Returns the density of a tally over a `length × width` section.
#[inline]
pub fn tally_density(points: PointTally, length: f64, width: f64) -> f64 {
    density(points.value(), length, width)
}

/// Returns the density of a defect list spread over `length × width`.
///
/// Every defect in the list counts, regardless of its position.
#[inline]
pub fn compute_density(defects: &[Defect], length: f64, width: f64) -> f64 {
    tally_density(defects.iter().collect(), length, width)
}

/// Returns the density of a whole roll.
#[inline]
pub fn whole_roll_density(roll: &FabricRoll) -> f64 {
    tally_density(roll.total_points(), roll.length(), roll.width())
}

/// Returns the density of one section of roll, counting every defect that overlaps it.
///
/// Used to report the quality of each retained piece on its own.
#[inline]
pub fn section_density(defects: &[Defect], section: Segment, width: f64) -> f64 {
    tally_density(
        points_in_range(defects, section.start(), section.end()),
        section.len(),
        width,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::FabricRollBuilder;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_density_formula() {
        assert_eq!(density(3.0, 100.0, 1.0), 3.0);
        assert_eq!(density(0.0, 88.7, 1.5), 0.0);
        assert_eq!(density(f64::INFINITY, 10.0, 1.5), f64::INFINITY);
    }

    #[test]
    fn test_zero_area_rules() {
        assert_eq!(density(1.0, 0.0, 1.5), f64::INFINITY);
        assert_eq!(density(1.0, 10.0, 0.0), f64::INFINITY);
        assert_eq!(density(1.0, -2.0, 1.5), f64::INFINITY);
        assert_eq!(density(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_nan_dimensions_count_as_zero_area() {
        assert_eq!(density(2.0, f64::NAN, 1.5), f64::INFINITY);
        assert_eq!(density(2.0, 10.0, f64::NAN), f64::INFINITY);
        assert_eq!(density(0.0, f64::NAN, f64::NAN), 0.0);
    }

    #[test]
    fn test_compute_density_with_continuous_defect_is_infinite() {
        let defects = [
            Defect::at(7.0, 1).unwrap(),
            Defect::continuous(15.3, 18.5).unwrap(),
        ];
        assert_eq!(compute_density(&defects, 103.0, 1.5), f64::INFINITY);
        assert_eq!(compute_density(&defects[..1], 100.0, 1.0), 1.0);
    }

    #[test]
    fn test_whole_roll_density_single_defect() {
        let mut builder = FabricRollBuilder::new(103.0, 1.5);
        builder.add_defect(Defect::at(23.0, 4).unwrap());
        let roll = builder.build().unwrap();
        let d = whole_roll_density(&roll);
        assert!((d - 400.0 / 154.5).abs() < 1e-12, "got {}", d);
    }

    #[test]
    fn test_section_density_counts_straddling_defects() {
        let defects = [
            Defect::scored(9.0, 11.0, 4).unwrap(),
            Defect::at(30.0, 4).unwrap(),
        ];
        let section = Segment::new(10.0, 20.0);
        assert_eq!(section_density(&defects, section, 1.0), 40.0);
    }

    #[test]
    fn test_density_is_monotone_in_points_and_area() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5e1f);
        for _ in 0..1_000 {
            let points = rng.random_range(0.0..500.0);
            let extra_points = rng.random_range(0.0..50.0);
            let length = rng.random_range(0.1..200.0);
            let width = rng.random_range(0.1..3.0);
            let extra_length = rng.random_range(0.0..50.0);

            let base = density(points, length, width);
            assert!(density(points + extra_points, length, width) >= base);
            assert!(density(points, length + extra_length, width) <= base);
        }
    }
}
