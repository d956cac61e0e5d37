use crate::core::building::Building;
use crate::core::calculation::{calculate_emissions, EmissionsResult};
use crate::core::factors::ConversionFactors;
use crate::core::reporting_period::ReportingPeriodConvention;
use crate::core::units::{FloorArea, MONTHS_PER_YEAR};
use crate::errors::ValidationError;
use chrono::NaiveDate;
use serde::Serialize;

/// Raw meter readings for one building and one month, as captured from bills
/// or a data entry form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MonthlyUsage {
    pub electricity_kwh: f64,
    pub electricity_provider: Option<String>,
    pub gas_kwh: f64,
    pub gas_provider: Option<String>,
}

impl MonthlyUsage {
    pub fn is_empty(&self) -> bool {
        self.electricity_kwh == 0. && self.gas_kwh == 0.
    }
}

/// One month of reported usage for a building together with the emissions
/// derived from it.
///
/// Derived figures are computed once when the entry is created and then
/// frozen: a later change to the factor tables or the reporting-period
/// convention never rewrites recorded history.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UsageEntry {
    pub building_id: String,
    pub building_name: String,
    pub category: String,
    pub floor_area: FloorArea,
    pub year: i32,
    pub month: u32,
    pub electricity_kwh: f64,
    pub electricity_provider: Option<String>,
    pub gas_kwh: f64,
    pub gas_provider: Option<String>,
    pub emissions: EmissionsResult,
}

impl UsageEntry {
    pub(crate) fn compute(
        building: &Building,
        year: i32,
        month: u32,
        usage: MonthlyUsage,
        convention: ReportingPeriodConvention,
        factors: &ConversionFactors,
    ) -> Result<Self, ValidationError> {
        let usage_date = month_start(year, month)?;
        let emissions = calculate_emissions(
            usage.electricity_kwh,
            usage.gas_kwh,
            usage_date,
            convention,
            factors,
        )?;

        Ok(Self {
            building_id: building.id.clone(),
            building_name: building.name.clone(),
            category: building.category.clone(),
            floor_area: building.floor_area,
            year,
            month,
            electricity_kwh: usage.electricity_kwh,
            electricity_provider: usage.electricity_provider,
            gas_kwh: usage.gas_kwh,
            gas_provider: usage.gas_provider,
            emissions,
        })
    }

    /// Month and year the entry covers, e.g. "January 2024".
    pub fn month_label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(date) => date.format("%B %Y").to_string(),
            None => format!("{}-{:02}", self.year, self.month),
        }
    }

    pub fn month_name(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(date) => date.format("%B").to_string(),
            None => format!("{:02}", self.month),
        }
    }
}

pub(crate) fn month_start(year: i32, month: u32) -> Result<NaiveDate, ValidationError> {
    if !(1..=MONTHS_PER_YEAR).contains(&month) {
        return Err(ValidationError::MonthOutOfRange(month));
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(ValidationError::YearOutOfRange(year))
}

#[cfg(test)]
pub(crate) mod test_usage {
    use super::*;
    use crate::core::factors::UK_CONVERSION_FACTORS;

    /// Entry against the published UK factors and the calendar convention,
    /// for a one-building test estate.
    pub(crate) fn entry(
        building_id: &str,
        year: i32,
        month: u32,
        electricity_kwh: f64,
        gas_kwh: f64,
    ) -> UsageEntry {
        let building = Building {
            id: building_id.to_string(),
            name: format!("Building {building_id}"),
            category: "Offices".to_string(),
            floor_area: FloorArea::new(1_000.).unwrap(),
            address: Some("1 Market Square".to_string()),
        };
        UsageEntry::compute(
            &building,
            year,
            month,
            MonthlyUsage {
                electricity_kwh,
                gas_kwh,
                ..Default::default()
            },
            ReportingPeriodConvention::Calendar,
            &UK_CONVERSION_FACTORS,
        )
        .unwrap()
    }
}
