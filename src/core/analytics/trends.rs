use crate::core::analytics::totals::totals;
use crate::core::units::{percentage_of, MONTHS_PER_YEAR};
use crate::core::usage::UsageEntry;
use chrono::NaiveDate;
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;
use std::collections::BTreeMap;

pub const ROLLING_WINDOW_MONTHS: usize = 3;

/// Science-based targets ask for a 15% cut against the current run-rate.
pub const SCIENCE_BASED_TARGET_FACTOR: f64 = 0.85;

/// One calendar month's total across every reporting building.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub total_tonnes: f64,
}

impl MonthlyPoint {
    pub fn label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(date) => date.format("%B %Y").to_string(),
            None => format!("{}-{:02}", self.year, self.month),
        }
    }
}

/// Collapse entries into a chronological per-month series, summing across
/// buildings.
pub fn monthly_series(entries: &[UsageEntry]) -> Vec<MonthlyPoint> {
    let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for entry in entries {
        *by_month.entry((entry.year, entry.month)).or_default() += entry.emissions.total_tonnes;
    }

    by_month
        .into_iter()
        .map(|((year, month), total_tonnes)| MonthlyPoint {
            year,
            month,
            total_tonnes,
        })
        .collect()
}

/// Trailing mean over the series, aligned with it. Early positions average
/// over however many months exist so far rather than being dropped.
pub fn rolling_average(series: &[MonthlyPoint], window: usize) -> Vec<f64> {
    let window = window.max(1);
    series
        .iter()
        .enumerate()
        .map(|(idx, _)| {
            let start = (idx + 1).saturating_sub(window);
            let in_window = &series[start..=idx];
            in_window.iter().map(|point| point.total_tonnes).sum::<f64>()
                / in_window.len() as f64
        })
        .collect()
}

/// Run-rate derived from the months on record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AnnualisedRate {
    /// Distinct calendar months with at least one entry.
    pub months_observed: usize,
    pub annualised_tonnes: f64,
    pub science_based_target_tonnes: f64,
}

pub fn annualised_rate(entries: &[UsageEntry]) -> Option<AnnualisedRate> {
    let series = monthly_series(entries);
    if series.is_empty() {
        return None;
    }

    let total: f64 = series.iter().map(|point| point.total_tonnes).sum();
    let annualised_tonnes = total * MONTHS_PER_YEAR as f64 / series.len() as f64;

    Some(AnnualisedRate {
        months_observed: series.len(),
        annualised_tonnes,
        science_based_target_tonnes: annualised_tonnes * SCIENCE_BASED_TARGET_FACTOR,
    })
}

/// Highest and lowest emitting months on record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MonthlyExtremes {
    pub peak: MonthlyPoint,
    pub trough: MonthlyPoint,
}

pub fn monthly_extremes(series: &[MonthlyPoint]) -> Option<MonthlyExtremes> {
    match series
        .iter()
        .minmax_by(|a, b| a.total_tonnes.total_cmp(&b.total_tonnes))
    {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(only) => Some(MonthlyExtremes {
            peak: *only,
            trough: *only,
        }),
        MinMaxResult::MinMax(trough, peak) => Some(MonthlyExtremes {
            peak: *peak,
            trough: *trough,
        }),
    }
}

/// How the estate's emissions divide between the two carriers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CarrierSplit {
    pub electricity_kg: f64,
    pub gas_kg: f64,
    pub electricity_percent: f64,
    pub gas_percent: f64,
}

pub fn carrier_split(entries: &[UsageEntry]) -> Option<CarrierSplit> {
    let summed = totals(entries)?;
    let total_kg = summed.electricity_kg + summed.gas_kg;

    Some(CarrierSplit {
        electricity_kg: summed.electricity_kg,
        gas_kg: summed.gas_kg,
        electricity_percent: percentage_of(summed.electricity_kg, total_kg).unwrap_or(0.),
        gas_percent: percentage_of(summed.gas_kg, total_kg).unwrap_or(0.),
    })
}
