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

use crate::config::ConfigError;

/// Why a selection could not meet the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsatisfiableReason {
    /// The next cut would have taken the roll below the minimum retained length.
    FloorReached,
    /// The cut budget ran out before the target was met.
    CutLimitReached,
    /// No remaining region was dense enough to be worth cutting.
    NoEligibleRegion,
    /// Every subset of candidate regions was tried and none met the target
    /// within the floor and cut budget.
    NoFeasibleSubset,
    /// Scrapping pieces too short to sell broke the target or the floor.
    OffcutsScrapped,
}

impl std::fmt::Display for UnsatisfiableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FloorReached => write!(f, "minimum retained length reached"),
            Self::CutLimitReached => write!(f, "cut limit reached"),
            Self::NoEligibleRegion => write!(f, "no eligible region left"),
            Self::NoFeasibleSubset => write!(f, "no feasible subset of regions"),
            Self::OffcutsScrapped => write!(f, "scrapping short offcuts"),
        }
    }
}

/// The target density cannot be met without breaking the length floor or the
/// cut budget.
///
/// Carries the best state the selector reached so callers can report how far
/// off the roll is.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsatisfiableError {
    pub reason: UnsatisfiableReason,
    pub target_density: f64,
    /// Density of the roll after the cuts the selector did commit.
    pub best_density: f64,
    /// Length of the roll after the cuts the selector did commit.
    pub retained_length: f64,
    pub min_retained_length: f64,
    pub cuts: usize,
}

impl std::fmt::Display for UnsatisfiableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Target density {} is unreachable ({}): best density {:.3} at retained length {:.3} (floor {:.3}) after {} cut(s)",
            self.target_density,
            self.reason,
            self.best_density,
            self.retained_length,
            self.min_retained_length,
            self.cuts
        )
    }
}

impl std::error::Error for UnsatisfiableError {}

/// The exact search ran out of budget before it could prove a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetExceededError {
    /// The termination message of the monitor that stopped the search.
    pub reason: String,
    pub nodes_explored: u64,
    /// Number of candidate regions handed to the search.
    pub num_candidates: usize,
}

impl std::fmt::Display for BudgetExceededError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Exact search over {} candidate region(s) stopped after {} node(s): {}",
            self.num_candidates, self.nodes_explored, self.reason
        )
    }
}

impl std::error::Error for BudgetExceededError {}

/// The error type for cut selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectError {
    Unsatisfiable(UnsatisfiableError),
    BudgetExceeded(BudgetExceededError),
    Config(ConfigError),
    /// The roll length or width is not finite and positive.
    InvalidDimensions { length: f64, width: f64 },
    /// The regions are unsorted, overlapping or stick out of the roll.
    InvalidRegions(String),
}

impl SelectError {
    #[inline]
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, Self::Unsatisfiable(_))
    }

    #[inline]
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, Self::BudgetExceeded(_))
    }
}

impl std::fmt::Display for SelectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsatisfiable(e) => write!(f, "{}", e),
            Self::BudgetExceeded(e) => write!(f, "{}", e),
            Self::Config(e) => write!(f, "Invalid configuration: {}", e),
            Self::InvalidDimensions { length, width } => write!(
                f,
                "Roll dimensions must be finite and positive, got length {} and width {}",
                length, width
            ),
            Self::InvalidRegions(msg) => write!(f, "Invalid regions: {}", msg),
        }
    }
}

impl std::error::Error for SelectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unsatisfiable(e) => Some(e),
            Self::BudgetExceeded(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UnsatisfiableError> for SelectError {
    fn from(e: UnsatisfiableError) -> Self {
        Self::Unsatisfiable(e)
    }
}

impl From<BudgetExceededError> for SelectError {
    fn from(e: BudgetExceededError) -> Self {
        Self::BudgetExceeded(e)
    }
}

impl From<ConfigError> for SelectError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
