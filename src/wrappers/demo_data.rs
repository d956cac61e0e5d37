use crate::core::building::Building;
use crate::core::factors::UK_CONVERSION_FACTORS;
use crate::core::units::{FloorArea, MONTHS_PER_YEAR};
use crate::input::{DemoDataConfig, Input, InputForProcessing, UsageRecord};
use crate::wrappers::ReportWrapper;
use crate::ReportFlags;
use anyhow::anyhow;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{info, warn};

/// Monthly electricity demand in kWh for a building of the reference floor area.
/// Winter-peaking, matching the shape of observed council metering.
pub(crate) const DEMO_ELECTRICITY_PATTERN_KWH: [f64; 12] = [
    12_500., 11_800., 10_500., 9_200., 8_500., 8_000., 8_200., 8_500., 9_000., 10_000., 11_200.,
    12_000.,
];

/// Monthly gas demand in kWh for a building of the reference floor area.
/// Heating-dominated, so the summer trough is much deeper than for electricity.
pub(crate) const DEMO_GAS_PATTERN_KWH: [f64; 12] = [
    8_000., 7_500., 6_500., 5_000., 3_500., 2_500., 2_000., 2_200., 3_000., 4_500., 6_500., 7_800.,
];

/// Floor area the demand patterns are calibrated for. Buildings scale linearly against this.
const DEMO_REFERENCE_FLOOR_AREA_M2: f64 = 2_500.;

const DEMO_JITTER_MIN: f64 = 0.9;
const DEMO_JITTER_MAX: f64 = 1.1;

const DEMO_ELECTRICITY_PROVIDER: &str = "Demo Energy Ltd";
const DEMO_GAS_PROVIDER: &str = "Demo Gas Ltd";

const DEFAULT_SEED: u64 = 37;

/// A wrapper that discards any metered usage in the document and synthesises
/// demonstration data for the estate instead.
pub(crate) struct DemoDataWrapper;

impl DemoDataWrapper {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

impl ReportWrapper for DemoDataWrapper {
    fn apply_preprocessing(
        &self,
        mut input: InputForProcessing,
        _flags: &ReportFlags,
    ) -> anyhow::Result<Input> {
        apply_demo_data_preprocessing(&mut input)?;
        Ok(input.finalize())
    }
}

/// Rewrites the document in place: ensures there is an estate to report on, then
/// replaces the usage section wholesale with synthesised records.
pub(crate) fn apply_demo_data_preprocessing(input: &mut InputForProcessing) -> anyhow::Result<()> {
    let config = match input.demo_data_config() {
        Some(config) => config.clone(),
        None => DemoDataConfig {
            start_year: UK_CONVERSION_FACTORS
                .electricity_years()
                .last()
                .ok_or_else(|| anyhow!("No published factor year to anchor demo data to"))?,
            years: 1,
            annual_reduction_percent: 0.,
            seed: None,
        },
    };

    if !input.has_buildings() {
        for building in default_demo_estate() {
            input.add_building(building);
        }
    }

    let metered_records = input.usage_record_count();
    if metered_records > 0 {
        warn!("replacing {metered_records} metered usage record(s) with synthesised demo data");
    }

    let mut rng = Pcg64::seed_from_u64(config.seed.unwrap_or(DEFAULT_SEED));
    let mut usage =
        Vec::with_capacity(input.buildings().len() * MONTHS_PER_YEAR as usize * config.years as usize);
    let mut reduction_factor = 1.;
    for offset in 0..config.years {
        usage.extend(generate_year(
            config.start_year + offset as i32,
            input.buildings(),
            reduction_factor,
            &mut rng,
        ));
        reduction_factor *= 1. - config.annual_reduction_percent / 100.;
    }

    info!(
        "demo data wrapper synthesised {} usage records for {} buildings over {} year(s) from {}",
        usage.len(),
        input.buildings().len(),
        config.years,
        config.start_year,
    );
    input.set_usage(usage);

    Ok(())
}

/// Synthesises one year of monthly usage for each building: the reference patterns
/// scaled to the building's floor area, damped by the cumulative reduction factor
/// and jittered so the output reads like real metering rather than a lookup table.
pub(crate) fn generate_year(
    year: i32,
    buildings: &[Building],
    reduction_factor: f64,
    rng: &mut impl Rng,
) -> Vec<UsageRecord> {
    let mut records = Vec::with_capacity(buildings.len() * MONTHS_PER_YEAR as usize);
    for building in buildings {
        let scale = building.floor_area.square_metres() / DEMO_REFERENCE_FLOOR_AREA_M2;
        for month in 1..=MONTHS_PER_YEAR {
            let month_index = (month - 1) as usize;
            records.push(UsageRecord {
                building: building.id.clone(),
                year,
                month,
                electricity_kwh: DEMO_ELECTRICITY_PATTERN_KWH[month_index]
                    * scale
                    * reduction_factor
                    * jitter(rng),
                electricity_provider: Some(DEMO_ELECTRICITY_PROVIDER.to_string()),
                gas_kwh: DEMO_GAS_PATTERN_KWH[month_index] * scale * reduction_factor * jitter(rng),
                gas_provider: Some(DEMO_GAS_PROVIDER.to_string()),
            });
        }
    }

    records
}

fn jitter(rng: &mut impl Rng) -> f64 {
    rng.random_range(DEMO_JITTER_MIN..=DEMO_JITTER_MAX)
}

/// The estate reported on when a document asks for demo data without declaring
/// any buildings of its own.
pub(crate) fn default_demo_estate() -> Vec<Building> {
    [
        ("town-hall", "Town Hall", "Offices", 2_500.),
        ("central-library", "Central Library", "Community", 1_200.),
        ("leisure-centre", "Leisure Centre", "Leisure", 3_400.),
        ("highways-depot", "Highways Depot", "Operational", 1_800.),
        (
            "riverside-primary",
            "Riverside Primary School",
            "Schools",
            2_100.,
        ),
    ]
    .into_iter()
    .map(|(id, name, category, floor_area)| Building {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        floor_area: FloorArea::new(floor_area).expect("demo estate floor areas are positive"),
        address: None,
    })
    .collect()
}
