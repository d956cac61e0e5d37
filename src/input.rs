use crate::core::analytics::equivalence::EquivalenceFactors;
use crate::core::analytics::target::ReductionTarget;
use crate::core::building::Building;
use crate::core::factors::ConversionFactors;
use crate::core::reporting_period::ReportingPeriodConvention;
use crate::errors::ValidationError;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::collections::BTreeMap;
use std::io::{BufReader, Read};

pub fn ingest_for_processing(json: impl Read) -> Result<InputForProcessing, anyhow::Error> {
    InputForProcessing::init_with_json(json)
}

/// A whole reporting document as submitted by a council, covering the estate,
/// metered usage and any locally overridden reporting conventions.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Input {
    #[serde(default)]
    pub reporting_period: ReportingPeriodConvention,
    #[serde(default)]
    pub conversion_factors: Option<FactorTables>,
    #[serde(default)]
    #[validate]
    pub equivalence_constants: Option<EquivalenceFactors>,
    #[serde(default)]
    #[validate]
    pub buildings: Vec<Building>,
    #[serde(default)]
    #[validate]
    pub usage: Vec<UsageRecord>,
    #[serde(default)]
    #[validate]
    pub reduction_target: Option<ReductionTarget>,
    #[serde(default)]
    #[validate]
    pub demo_data: Option<DemoDataConfig>,
}

/// Raw emissions factor tables as carried in a document, keyed by published year.
/// Checked and promoted to [`ConversionFactors`] when the ledger is built.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FactorTables {
    pub electricity: BTreeMap<i32, f64>,
    pub gas: BTreeMap<i32, f64>,
}

impl TryFrom<FactorTables> for ConversionFactors {
    type Error = ValidationError;

    fn try_from(tables: FactorTables) -> Result<Self, Self::Error> {
        ConversionFactors::new(tables.electricity, tables.gas)
    }
}

/// One month of metered usage for one building.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UsageRecord {
    pub building: String,
    pub year: i32,
    #[validate(minimum = 1)]
    #[validate(maximum = 12)]
    pub month: u32,
    #[validate(minimum = 0.)]
    pub electricity_kwh: f64,
    #[serde(default)]
    pub electricity_provider: Option<String>,
    #[validate(minimum = 0.)]
    pub gas_kwh: f64,
    #[serde(default)]
    pub gas_provider: Option<String>,
}

/// Instructions for synthesising demonstration usage in place of metered data.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DemoDataConfig {
    pub start_year: i32,
    #[serde(default = "default_demo_years")]
    #[validate(minimum = 1)]
    pub years: u32,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 100.)]
    pub annual_reduction_percent: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_demo_years() -> u32 {
    1
}

pub struct InputForProcessing {
    input: Input,
}

/// This type makes methods available for restricted access by wrappers,
/// in order to work towards a reasonable API for wrappers to interact with inputs rather than
/// the more brittle approach of allowing full access to the input data structure.
/// If the full access is encapsulated within methods here, it becomes possible to update the
/// underlying structure without breaking wrappers.
impl InputForProcessing {
    pub fn init_with_json(json: impl Read) -> Result<Self, anyhow::Error> {
        let reader = BufReader::new(json);

        let input: Input = serde_json::from_reader(reader)?;

        input
            .validate()
            .map_err(|err| anyhow!("Submitted reporting document was invalid: {err}"))?;

        Ok(Self { input })
    }

    pub fn finalize(self) -> Input {
        self.input
    }

    pub(crate) fn demo_data_config(&self) -> Option<&DemoDataConfig> {
        self.input.demo_data.as_ref()
    }

    pub(crate) fn buildings(&self) -> &[Building] {
        &self.input.buildings
    }

    pub(crate) fn has_buildings(&self) -> bool {
        !self.input.buildings.is_empty()
    }

    pub(crate) fn usage_record_count(&self) -> usize {
        self.input.usage.len()
    }

    pub(crate) fn add_building(&mut self, building: Building) -> &Self {
        self.input.buildings.push(building);
        self
    }

    pub(crate) fn set_usage(&mut self, usage: Vec<UsageRecord>) -> &Self {
        self.input.usage = usage;
        self
    }
}
