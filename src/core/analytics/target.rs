use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use strum_macros::Display;

/// Horizon year every reduction pathway runs to (UK net zero commitment).
pub const NET_ZERO_TARGET_YEAR: i32 = 2050;

pub const DEFAULT_PATHWAY_WINDOW_YEARS: i32 = 10;

/// A council's emissions reduction commitment: cut emissions from the baseline
/// year's level by the target percentage, reaching the cut at the net zero
/// horizon.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ReductionTarget {
    #[validate(maximum = 2050)]
    pub baseline_year: i32,
    #[validate(minimum = 0.)]
    #[validate(maximum = 100.)]
    pub target_percentage: f64,
    /// Years from the baseline the projected pathway is generated for.
    #[serde(default = "default_pathway_window")]
    #[validate(minimum = 0)]
    pub pathway_window_years: i32,
}

fn default_pathway_window() -> i32 {
    DEFAULT_PATHWAY_WINDOW_YEARS
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PathwayPoint {
    pub year: i32,
    pub target_tonnes: f64,
}

/// A linear trajectory from the baseline year's emissions down to the target
/// level at the net zero horizon.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TargetPathway {
    pub baseline_year: i32,
    pub baseline_tonnes: f64,
    pub target_tonnes: f64,
    pub points: Vec<PathwayPoint>,
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum ProgressStatus {
    #[strum(to_string = "Target Achieved")]
    TargetAchieved,
    #[strum(to_string = "Off Track")]
    OffTrack,
    #[strum(to_string = "On Track")]
    OnTrack,
    #[strum(to_string = "Behind Schedule")]
    BehindSchedule,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProgressAssessment {
    pub baseline_year: i32,
    pub baseline_tonnes: f64,
    pub latest_year: i32,
    pub latest_tonnes: f64,
    pub target_tonnes: f64,
    pub actual_reduction_percent: f64,
    pub expected_reduction_percent: f64,
    pub status: ProgressStatus,
}

impl ReductionTarget {
    /// Emissions level the commitment requires at the net zero horizon.
    pub fn target_emissions(&self, baseline_tonnes: f64) -> f64 {
        baseline_tonnes * (1. - self.target_percentage / 100.)
    }

    /// Project the pathway over the display window, one point per year. The
    /// window is capped at the horizon, and a baseline year at the horizon
    /// collapses the pathway to the single fully-reduced point.
    pub fn pathway(&self, baseline_tonnes: f64) -> TargetPathway {
        let target_tonnes = self.target_emissions(baseline_tonnes);
        let points = if self.baseline_year >= NET_ZERO_TARGET_YEAR {
            vec![PathwayPoint {
                year: NET_ZERO_TARGET_YEAR,
                target_tonnes,
            }]
        } else {
            let span = (NET_ZERO_TARGET_YEAR - self.baseline_year) as f64;
            let last_year =
                (self.baseline_year + self.pathway_window_years).min(NET_ZERO_TARGET_YEAR);
            (self.baseline_year..=last_year)
                .map(|year| PathwayPoint {
                    year,
                    target_tonnes: baseline_tonnes
                        * (1.
                            - (self.target_percentage / 100.)
                                * ((year - self.baseline_year) as f64)
                                / span),
                })
                .collect()
        };

        TargetPathway {
            baseline_year: self.baseline_year,
            baseline_tonnes,
            target_tonnes,
            points,
        }
    }

    /// Classify the latest reported year against the commitment.
    ///
    /// Returns None when the baseline year's emissions are zero, since a
    /// reduction percentage against a zero baseline is undefined.
    pub fn assess_progress(
        &self,
        baseline_tonnes: f64,
        latest_year: i32,
        latest_tonnes: f64,
    ) -> Option<ProgressAssessment> {
        if baseline_tonnes == 0. {
            return None;
        }

        let target_tonnes = self.target_emissions(baseline_tonnes);
        let actual_reduction_percent =
            (baseline_tonnes - latest_tonnes) / baseline_tonnes * 100.;
        let expected_reduction_percent = if self.baseline_year >= NET_ZERO_TARGET_YEAR {
            self.target_percentage
        } else {
            self.target_percentage * ((latest_year - self.baseline_year) as f64)
                / ((NET_ZERO_TARGET_YEAR - self.baseline_year) as f64)
        };

        // the conditions overlap, so the order of checks is load-bearing
        let status = if latest_tonnes <= target_tonnes {
            ProgressStatus::TargetAchieved
        } else if actual_reduction_percent <= 0. {
            ProgressStatus::OffTrack
        } else if actual_reduction_percent >= expected_reduction_percent {
            ProgressStatus::OnTrack
        } else {
            ProgressStatus::BehindSchedule
        };

        Some(ProgressAssessment {
            baseline_year: self.baseline_year,
            baseline_tonnes,
            latest_year,
            latest_tonnes,
            target_tonnes,
            actual_reduction_percent,
            expected_reduction_percent,
            status,
        })
    }
}
