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

//! # Cut Planning
//!
//! `CutPlanner` runs the whole pipeline for one roll: merge defects into
//! regions, select the regions to cut, rebuild the roll, and optionally
//! scrap retained pieces too short to sell.
//!
//! ## Offcut scrapping
//!
//! With `min_piece_length > 0`, every retained piece shorter than that is
//! cut away as well and the roll is rebuilt once more. Scrapping never
//! shortens the remaining pieces, so one pass is enough. If the scrapped
//! roll falls below the length floor or over the target, the plan fails
//! with `UnsatisfiableReason::OffcutsScrapped`.
//!
//! ## Usage
//!
//! ```rust
//! use selvedge_model::{defect::Defect, roll::FabricRoll};
//! use selvedge_solver::planner::CutPlannerBuilder;
//!
//! let roll = FabricRoll::new(103.0, 1.5, vec![
//!     Defect::continuous(15.3, 18.5).unwrap(),
//!     Defect::at(60.0, 4).unwrap(),
//! ])
//! .unwrap();
//!
//! let planner = CutPlannerBuilder::new().target_density(23.0).build().unwrap();
//! let plan = planner.plan(&roll).unwrap();
//!
//! assert_eq!(plan.cuts(), 1);
//! assert!(plan.reconstruction.final_defects.iter().all(|d| !d.is_continuous()));
//! ```

use crate::reconstruct::{ReconstructError, Reconstruction, reconstruct};
use selvedge_core::math::interval::merge_overlapping;
use selvedge_model::{
    Segment,
    region::{Region, merge_into_regions},
    roll::FabricRoll,
};
use selvedge_select::{
    config::{ConfigError, SelectionConfig, Strategy},
    error::{SelectError, UnsatisfiableError, UnsatisfiableReason},
    monitor::search_monitor::{NoOpMonitor, SearchMonitor},
    result::SelectionOutcome,
    select_cuts_with_monitor,
};
use std::time::Duration;

/// The error type for cut planning.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanError {
    Config(ConfigError),
    /// The minimum piece length is not finite or negative.
    InvalidMinPieceLength(f64),
    Select(SelectError),
    Reconstruct(ReconstructError),
}

impl PlanError {
    /// Returns the unsatisfiability details, if that is why planning failed.
    #[inline]
    pub fn as_unsatisfiable(&self) -> Option<&UnsatisfiableError> {
        match self {
            Self::Select(SelectError::Unsatisfiable(e)) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Invalid configuration: {}", e),
            Self::InvalidMinPieceLength(v) => write!(
                f,
                "Minimum piece length must be finite and non-negative, got {}",
                v
            ),
            Self::Select(e) => write!(f, "Cut selection failed: {}", e),
            Self::Reconstruct(e) => write!(f, "Reconstruction failed: {}", e),
        }
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Select(e) => Some(e),
            Self::Reconstruct(e) => Some(e),
            Self::InvalidMinPieceLength(_) => None,
        }
    }
}

impl From<ConfigError> for PlanError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SelectError> for PlanError {
    fn from(e: SelectError) -> Self {
        Self::Select(e)
    }
}

impl From<ReconstructError> for PlanError {
    fn from(e: ReconstructError) -> Self {
        Self::Reconstruct(e)
    }
}

/// Everything decided for one roll.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CutPlan {
    pub length: f64,
    pub width: f64,
    pub regions: Vec<Region>,
    pub selection: SelectionOutcome,
    /// Retained pieces scrapped for being too short, in roll order.
    pub scrapped: Vec<Segment>,
    pub reconstruction: Reconstruction,
}

impl CutPlan {
    /// Returns the number of regions cut out, not counting scrapped offcuts.
    #[inline]
    pub fn cuts(&self) -> usize {
        self.selection.cuts()
    }

    #[inline]
    pub fn final_length(&self) -> f64 {
        self.reconstruction.final_length
    }

    #[inline]
    pub fn final_density(&self) -> f64 {
        self.reconstruction.final_density
    }

    #[inline]
    pub fn retained_segments(&self) -> &[Segment] {
        &self.reconstruction.retained_segments
    }

    /// Returns the fraction of the original roll that is kept.
    #[inline]
    pub fn yield_ratio(&self) -> f64 {
        self.final_length() / self.length
    }
}

impl std::fmt::Display for CutPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CutPlan(regions: {}, cuts: {}, scrapped: {}, length: {:.3} of {:.3}, density: {:.3})",
            self.regions.len(),
            self.cuts(),
            self.scrapped.len(),
            self.final_length(),
            self.length,
            self.final_density()
        )
    }
}

/// Plans the cuts for fabric rolls with a fixed configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CutPlanner {
    config: SelectionConfig,
    min_piece_length: f64,
}

impl CutPlanner {
    /// Creates a planner, validating `config` and `min_piece_length`.
    pub fn new(config: SelectionConfig, min_piece_length: f64) -> Result<Self, PlanError> {
        config.validate()?;
        if !(min_piece_length.is_finite() && min_piece_length >= 0.0) {
            return Err(PlanError::InvalidMinPieceLength(min_piece_length));
        }
        Ok(Self {
            config,
            min_piece_length,
        })
    }

    #[inline]
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    #[inline]
    pub fn min_piece_length(&self) -> f64 {
        self.min_piece_length
    }

    /// Plans the cuts for `roll`.
    #[inline]
    pub fn plan(&self, roll: &FabricRoll) -> Result<CutPlan, PlanError> {
        self.plan_with_monitor(roll, &mut NoOpMonitor)
    }

    /// Plans the cuts for `roll`, attaching `monitor` to the exact search.
    pub fn plan_with_monitor<M>(
        &self,
        roll: &FabricRoll,
        monitor: &mut M,
    ) -> Result<CutPlan, PlanError>
    where
        M: SearchMonitor + ?Sized,
    {
        let (length, width) = (roll.length(), roll.width());
        let regions = merge_into_regions(roll.defects(), self.config.gap);
        let selection =
            select_cuts_with_monitor(&regions, length, width, &self.config, monitor)?;
        let mut reconstruction = reconstruct(
            length,
            width,
            roll.defects(),
            &selection.removed,
            self.config.join_penalty,
        )?;

        let scrapped: Vec<Segment> = reconstruction
            .retained_segments
            .iter()
            .copied()
            .filter(|piece| piece.len() < self.min_piece_length)
            .collect();

        if !scrapped.is_empty() {
            let mut removed = selection.removed.clone();
            removed.extend_from_slice(&scrapped);
            let removed = merge_overlapping(&removed);
            reconstruction = reconstruct(
                length,
                width,
                roll.defects(),
                &removed,
                self.config.join_penalty,
            )?;

            log::debug!(
                "scrapped {} offcut(s) shorter than {}, {:.3} m left",
                scrapped.len(),
                self.min_piece_length,
                reconstruction.final_length
            );

            self.check_scrapped(&reconstruction, length, selection.cuts())?;
        }

        log::info!(
            "planned roll {} x {}: {} region(s), {} cut(s), {} offcut(s), {:.3} m at density {:.3}",
            length,
            width,
            regions.len(),
            selection.cuts(),
            scrapped.len(),
            reconstruction.final_length,
            reconstruction.final_density
        );

        Ok(CutPlan {
            length,
            width,
            regions,
            selection,
            scrapped,
            reconstruction,
        })
    }

    fn check_scrapped(
        &self,
        reconstruction: &Reconstruction,
        length: f64,
        cuts: usize,
    ) -> Result<(), PlanError> {
        let floor = self.config.min_retained_length(length);
        let clean = !reconstruction.final_points().is_unbounded();
        let within_floor = reconstruction.final_length >= floor - 1e-9 * length;
        if clean && within_floor && reconstruction.final_density <= self.config.target_density {
            return Ok(());
        }

        Err(PlanError::Select(SelectError::Unsatisfiable(
            UnsatisfiableError {
                reason: UnsatisfiableReason::OffcutsScrapped,
                target_density: self.config.target_density,
                best_density: reconstruction.final_density,
                retained_length: reconstruction.final_length,
                min_retained_length: floor,
                cuts,
            },
        )))
    }
}

/// Builder for `CutPlanner`.
///
/// Starts from `SelectionConfig::default()` and no offcut scrapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CutPlannerBuilder {
    config: SelectionConfig,
    min_piece_length: f64,
}

impl CutPlannerBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole selection configuration.
    #[inline]
    pub fn config(mut self, config: SelectionConfig) -> Self {
        self.config = config;
        self
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
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.config.time_limit = Some(limit);
        self
    }

    /// Scraps retained pieces shorter than `length`; zero disables scrapping.
    #[inline]
    pub fn min_piece_length(mut self, length: f64) -> Self {
        self.min_piece_length = length;
        self
    }

    #[inline]
    pub fn build(self) -> Result<CutPlanner, PlanError> {
        CutPlanner::new(self.config, self.min_piece_length)
    }
}
