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

//! # Selection Configuration
//!
//! Every knob the cut selector reads lives in `SelectionConfig`. The defaults
//! reproduce the mill's standing quality rule: at most 23 points per hundred
//! square units, at least three quarters of the roll kept, no splice penalty.
//!
//! | Field                | Default     | Meaning                                          |
//! |----------------------|-------------|--------------------------------------------------|
//! | `target_density`     | `23.0`      | Maximum acceptable final density                 |
//! | `min_retained_ratio` | `0.75`      | Fraction of the original length that must remain |
//! | `max_cuts`           | `None`      | Upper bound on removed regions                   |
//! | `join_penalty`       | `0.0`       | Points charged per splice                        |
//! | `gap`                | `1.0`       | Region merge tolerance                           |
//! | `point_cut_length`   | `1.0`       | Minimum length actually excised per region       |
//! | `strategy`           | `Greedy`    | Selection algorithm                              |
//! | `node_limit`         | `1_000_000` | Exact search node budget                         |
//! | `time_limit`         | `None`      | Exact search wall-clock budget                   |
//! | `max_exact_regions`  | `64`        | Largest candidate set the exact search accepts   |

use std::time::Duration;

/// The algorithm used to choose which regions to cut out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Repeatedly removes the densest eligible region.
    #[default]
    Greedy,
    /// Searches subsets of regions for the longest retained roll.
    Exact,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Greedy => write!(f, "Greedy"),
            Strategy::Exact => write!(f, "Exact"),
        }
    }
}

/// The error type for an inconsistent selection configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The target density is NaN or negative.
    InvalidTargetDensity(f64),
    /// The retained ratio lies outside `[0, 1]`.
    InvalidRetainedRatio(f64),
    /// The join penalty is not finite or negative.
    InvalidJoinPenalty(f64),
    /// The merge gap is not finite or negative.
    InvalidGap(f64),
    /// The point-cut length is not finite or negative.
    InvalidPointCutLength(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTargetDensity(v) => {
                write!(f, "Target density must be a non-negative number, got {}", v)
            }
            Self::InvalidRetainedRatio(v) => {
                write!(f, "Minimum retained ratio must lie in [0, 1], got {}", v)
            }
            Self::InvalidJoinPenalty(v) => {
                write!(f, "Join penalty must be finite and non-negative, got {}", v)
            }
            Self::InvalidGap(v) => write!(f, "Merge gap must be finite and non-negative, got {}", v),
            Self::InvalidPointCutLength(v) => {
                write!(f, "Point-cut length must be finite and non-negative, got {}", v)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[inline]
fn finite_non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

/// Parameters of one cut selection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SelectionConfig {
    pub target_density: f64,
    pub min_retained_ratio: f64,
    pub max_cuts: Option<usize>,
    pub join_penalty: f64,
    pub gap: f64,
    /// Regions shorter than this are widened to this length when excised.
    /// Point defects produce zero-length regions, so a zero here means a
    /// point flaw is cut out without losing any material.
    pub point_cut_length: f64,
    pub strategy: Strategy,
    pub node_limit: u64,
    pub time_limit: Option<Duration>,
    pub max_exact_regions: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            target_density: 23.0,
            min_retained_ratio: 0.75,
            max_cuts: None,
            join_penalty: 0.0,
            gap: 1.0,
            point_cut_length: 1.0,
            strategy: Strategy::Greedy,
            node_limit: 1_000_000,
            time_limit: None,
            max_exact_regions: 64,
        }
    }
}

impl SelectionConfig {
    /// Returns a builder seeded with the defaults.
    #[inline]
    pub fn builder() -> SelectionConfigBuilder {
        SelectionConfigBuilder::new()
    }

    /// Checks every numeric field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_density.is_nan() || self.target_density < 0.0 {
            return Err(ConfigError::InvalidTargetDensity(self.target_density));
        }
        if !(0.0..=1.0).contains(&self.min_retained_ratio) {
            return Err(ConfigError::InvalidRetainedRatio(self.min_retained_ratio));
        }
        if !finite_non_negative(self.join_penalty) {
            return Err(ConfigError::InvalidJoinPenalty(self.join_penalty));
        }
        if !finite_non_negative(self.gap) {
            return Err(ConfigError::InvalidGap(self.gap));
        }
        if !finite_non_negative(self.point_cut_length) {
            return Err(ConfigError::InvalidPointCutLength(self.point_cut_length));
        }
        Ok(())
    }

    /// Returns the shortest retained length allowed for a roll of `roll_length`.
    #[inline]
    pub fn min_retained_length(&self, roll_length: f64) -> f64 {
        self.min_retained_ratio * roll_length
    }

    /// Returns `max_cuts`, or `usize::MAX` when unbounded.
    #[inline]
    pub fn cut_limit(&self) -> usize {
        self.max_cuts.unwrap_or(usize::MAX)
    }
}

impl std::fmt::Display for SelectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SelectionConfig(strategy: {}, target: {}, min_retained_ratio: {}, max_cuts: {}, join_penalty: {})",
            self.strategy,
            self.target_density,
            self.min_retained_ratio,
            self.max_cuts
                .map_or_else(|| "unbounded".to_string(), |c| c.to_string()),
            self.join_penalty
        )
    }
}

/// Builder for `SelectionConfig`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionConfigBuilder {
    config: SelectionConfig,
}

impl SelectionConfigBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn target_density(mut self, target_density: f64) -> Self {
        self.config.target_density = target_density;
        self
    }

    #[inline]
    pub fn min_retained_ratio(mut self, ratio: f64) -> Self {
        self.config.min_retained_ratio = ratio;
        self
    }

    #[inline]
    pub fn max_cuts(mut self, max_cuts: usize) -> Self {
        self.config.max_cuts = Some(max_cuts);
        self
    }

    #[inline]
    pub fn unbounded_cuts(mut self) -> Self {
        self.config.max_cuts = None;
        self
    }

    #[inline]
    pub fn join_penalty(mut self, penalty: f64) -> Self {
        self.config.join_penalty = penalty;
        self
    }

    #[inline]
    pub fn gap(mut self, gap: f64) -> Self {
        self.config.gap = gap;
        self
    }

    #[inline]
    pub fn point_cut_length(mut self, length: f64) -> Self {
        self.config.point_cut_length = length;
        self
    }

    #[inline]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    #[inline]
    pub fn node_limit(mut self, limit: u64) -> Self {
        self.config.node_limit = limit;
        self
    }

    #[inline]
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.config.time_limit = Some(limit);
        self
    }

    #[inline]
    pub fn max_exact_regions(mut self, limit: usize) -> Self {
        self.config.max_exact_regions = limit;
        self
    }

    /// Validates and returns the configuration.
    #[inline]
    pub fn build(self) -> Result<SelectionConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
