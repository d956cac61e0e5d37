use crate::errors::ValidationError;
use csv::Reader;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{BufReader, Cursor};
use std::sync::LazyLock;
use strum_macros::Display;
use tracing::debug;

/// Metered energy carriers a council reports usage for.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EnergyCarrier {
    Electricity,
    Gas,
}

/// Published UK government greenhouse gas conversion factors for grid
/// electricity and natural gas, used whenever a reporting document does not
/// carry its own tables.
pub static UK_CONVERSION_FACTORS: LazyLock<ConversionFactors> = LazyLock::new(|| {
    let mut electricity: BTreeMap<i32, f64> = Default::default();
    let mut gas: BTreeMap<i32, f64> = Default::default();

    let mut factors_reader = Reader::from_reader(BufReader::new(Cursor::new(include_str!(
        "./UK_conversion_factors_2022-2025.csv"
    ))));
    for factor_row in factors_reader.deserialize() {
        let FactorRow {
            year,
            fuel,
            emissions_factor,
        } = factor_row.expect("Reading the UK conversion factors file failed.");
        match fuel {
            EnergyCarrier::Electricity => electricity.insert(year, emissions_factor),
            EnergyCarrier::Gas => gas.insert(year, emissions_factor),
        };
    }

    ConversionFactors::new(electricity, gas)
        .expect("The UK conversion factors file contained an invalid table.")
});

#[derive(Clone, Debug, Deserialize)]
struct FactorRow {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Fuel")]
    fuel: EnergyCarrier,
    #[serde(rename = "Emissions Factor kgCO2e/kWh")]
    emissions_factor: f64,
}

/// Per-carrier conversion factor tables keyed by factor year, in kgCO2e per kWh.
///
/// Tables are validated at construction: each carrier needs at least one year,
/// and every factor must be a finite non-negative number.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionFactors {
    electricity: BTreeMap<i32, f64>,
    gas: BTreeMap<i32, f64>,
}

impl ConversionFactors {
    pub fn new(
        electricity: BTreeMap<i32, f64>,
        gas: BTreeMap<i32, f64>,
    ) -> Result<Self, ValidationError> {
        for (carrier, table) in [
            (EnergyCarrier::Electricity, &electricity),
            (EnergyCarrier::Gas, &gas),
        ] {
            if table.is_empty() {
                return Err(ValidationError::EmptyFactorTable(carrier));
            }
            for (&year, &value) in table.iter() {
                if !value.is_finite() || value < 0. {
                    return Err(ValidationError::InvalidFactor {
                        carrier,
                        year,
                        value,
                    });
                }
            }
        }

        Ok(Self { electricity, gas })
    }

    fn table(&self, carrier: EnergyCarrier) -> &BTreeMap<i32, f64> {
        match carrier {
            EnergyCarrier::Electricity => &self.electricity,
            EnergyCarrier::Gas => &self.gas,
        }
    }

    /// Factor for the given carrier and factor year. A year the table does not
    /// publish resolves to the latest published year, so reports for periods
    /// ahead of the published series keep working.
    pub fn factor_for(&self, carrier: EnergyCarrier, factor_year: i32) -> FactorSelection {
        let table = self.table(carrier);
        match table.get(&factor_year) {
            Some(&value) => FactorSelection {
                value,
                published_year: factor_year,
            },
            None => {
                let (&published_year, &value) = table
                    .last_key_value()
                    .expect("factor tables are validated non-empty at construction");
                debug!(
                    "no published {carrier} factor for {factor_year}, using latest published year {published_year}"
                );
                FactorSelection {
                    value,
                    published_year,
                }
            }
        }
    }

    /// Years the electricity table publishes, ascending.
    pub fn electricity_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.electricity.keys().copied()
    }

    /// Years the gas table publishes, ascending.
    pub fn gas_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.gas.keys().copied()
    }
}

/// A factor resolved from a table, annotated with the year that actually
/// published it (which differs from the requested year after a fallback).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FactorSelection {
    pub value: f64,
    pub published_year: i32,
}
