use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

/// First month of the UK financial year (April to March).
pub(crate) const FINANCIAL_YEAR_START_MONTH: u32 = 4;

/// Convention used to attribute a usage date to a conversion-factor year.
///
/// Under the calendar convention the factor year is simply the calendar year of
/// the date. Under the financial convention (UK local-authority reporting,
/// April to March) dates from April onwards belong to the calendar year they
/// fall in, while January to March belong to the previous year.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingPeriodConvention {
    #[default]
    Calendar,
    Financial,
}

impl ReportingPeriodConvention {
    pub fn factor_year_for(&self, date: NaiveDate) -> i32 {
        match self {
            ReportingPeriodConvention::Calendar => date.year(),
            ReportingPeriodConvention::Financial => {
                if date.month() >= FINANCIAL_YEAR_START_MONTH {
                    date.year()
                } else {
                    date.year() - 1
                }
            }
        }
    }
}

impl Display for ReportingPeriodConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportingPeriodConvention::Calendar => write!(f, "calendar"),
            ReportingPeriodConvention::Financial => write!(f, "financial"),
        }
    }
}

/// A point in time a usage figure is reported against. A bare year reads as
/// 1 January of that year.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UsagePeriod {
    Year(i32),
    Date(NaiveDate),
}

impl UsagePeriod {
    pub fn reference_date(&self) -> Result<NaiveDate, YearOutOfRangeError> {
        match self {
            UsagePeriod::Date(date) => Ok(*date),
            UsagePeriod::Year(year) => {
                NaiveDate::from_ymd_opt(*year, 1, 1).ok_or(YearOutOfRangeError(*year))
            }
        }
    }
}

impl From<i32> for UsagePeriod {
    fn from(year: i32) -> Self {
        Self::Year(year)
    }
}

impl From<NaiveDate> for UsagePeriod {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

pub fn resolve_factor_year(
    period: impl Into<UsagePeriod>,
    convention: ReportingPeriodConvention,
) -> Result<i32, YearOutOfRangeError> {
    Ok(convention.factor_year_for(period.into().reference_date()?))
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("Year {0} is outside the supported date range")]
pub struct YearOutOfRangeError(pub(crate) i32);
