use crate::core::factors::{ConversionFactors, EnergyCarrier};
use crate::core::reporting_period::{resolve_factor_year, ReportingPeriodConvention, UsagePeriod};
use crate::core::units::kilograms_to_tonnes;
use crate::errors::ValidationError;
use serde::Serialize;

/// Emissions derived from one pair of meter readings.
///
/// `factor_year` is the year the reporting-period convention attributed the
/// usage to. When that year is ahead of a published table the latest published
/// factor is applied underneath without changing the attribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EmissionsResult {
    pub electricity_kg: f64,
    pub gas_kg: f64,
    pub total_tonnes: f64,
    pub factor_year: i32,
}

impl EmissionsResult {
    pub fn total_kg(&self) -> f64 {
        self.electricity_kg + self.gas_kg
    }
}

/// Convert a pair of meter readings into CO2e emissions.
///
/// This is a pure function of its arguments: no stored state is read or
/// written, and calling it twice with the same inputs gives the same result.
pub fn calculate_emissions(
    electricity_kwh: f64,
    gas_kwh: f64,
    period: impl Into<UsagePeriod>,
    convention: ReportingPeriodConvention,
    factors: &ConversionFactors,
) -> Result<EmissionsResult, ValidationError> {
    for (carrier, value) in [
        (EnergyCarrier::Electricity, electricity_kwh),
        (EnergyCarrier::Gas, gas_kwh),
    ] {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteUsage { carrier, value });
        }
        if value < 0. {
            return Err(ValidationError::NegativeUsage { carrier, value });
        }
    }

    let factor_year = resolve_factor_year(period, convention)?;
    let electricity_kg =
        electricity_kwh * factors.factor_for(EnergyCarrier::Electricity, factor_year).value;
    let gas_kg = gas_kwh * factors.factor_for(EnergyCarrier::Gas, factor_year).value;

    Ok(EmissionsResult {
        electricity_kg,
        gas_kg,
        total_tonnes: kilograms_to_tonnes(electricity_kg + gas_kg),
        factor_year,
    })
}
