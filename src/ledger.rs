use crate::core::analytics::equivalence::{EquivalenceFactors, Equivalences};
use crate::core::analytics::seasonal::{seasonal_breakdown, SeasonalBreakdown};
use crate::core::analytics::target::{ProgressAssessment, ReductionTarget, TargetPathway};
use crate::core::analytics::totals::{filtered_totals, totals, EmissionsTotals, UsageFilter};
use crate::core::analytics::trends::{
    annualised_rate, carrier_split, monthly_extremes, monthly_series, rolling_average,
    AnnualisedRate, CarrierSplit, MonthlyExtremes, MonthlyPoint, ROLLING_WINDOW_MONTHS,
};
use crate::core::analytics::yearly::{latest_reported_year, yearly_summaries, YearlySummary};
use crate::core::building::BuildingRegistry;
use crate::core::calculation::EmissionsResult;
use crate::core::factors::{ConversionFactors, UK_CONVERSION_FACTORS};
use crate::core::reporting_period::ReportingPeriodConvention;
use crate::core::units::MONTHS_PER_YEAR;
use crate::core::usage::{MonthlyUsage, UsageEntry};
use crate::errors::ValidationError;
use crate::input::{Input, UsageRecord};
use serde::Serialize;
use tracing::info;

/// The session's reporting state: the estate, the factor tables in force and
/// every usage entry recorded so far, with analytics over them.
///
/// Entries are value objects. Their emissions are computed when they are
/// recorded and never revisited, so changing the reporting convention or the
/// factor tables afterwards only affects entries recorded from then on.
pub struct Ledger {
    reporting_period: ReportingPeriodConvention,
    factors: ConversionFactors,
    equivalence: EquivalenceFactors,
    buildings: BuildingRegistry,
    entries: Vec<UsageEntry>,
    reduction_target: Option<ReductionTarget>,
}

impl Ledger {
    pub fn from_input(input: Input) -> anyhow::Result<Self> {
        let factors = match input.conversion_factors {
            Some(tables) => tables.try_into()?,
            None => UK_CONVERSION_FACTORS.clone(),
        };

        let mut buildings = BuildingRegistry::new();
        for building in input.buildings {
            buildings.register(building)?;
        }

        let mut ledger = Self {
            reporting_period: input.reporting_period,
            factors,
            equivalence: input.equivalence_constants.unwrap_or_default(),
            buildings,
            entries: Vec::with_capacity(input.usage.len()),
            reduction_target: input.reduction_target,
        };
        for record in &input.usage {
            ledger.record_usage(record)?;
        }

        info!(
            "ledger built for {} building(s) with {} usage entr(ies)",
            ledger.buildings.len(),
            ledger.entries.len(),
        );

        Ok(ledger)
    }

    pub fn buildings(&self) -> &BuildingRegistry {
        &self.buildings
    }

    pub fn entries(&self) -> &[UsageEntry] {
        &self.entries
    }

    pub fn reporting_period(&self) -> ReportingPeriodConvention {
        self.reporting_period
    }

    pub fn equivalence_factors(&self) -> &EquivalenceFactors {
        &self.equivalence
    }

    /// Records one month of usage for a known building and returns the
    /// emissions frozen into the new entry.
    pub fn record_usage(&mut self, record: &UsageRecord) -> Result<EmissionsResult, ValidationError> {
        let building = self.buildings.building(&record.building)?;
        let entry = UsageEntry::compute(
            building,
            record.year,
            record.month,
            MonthlyUsage {
                electricity_kwh: record.electricity_kwh,
                electricity_provider: record.electricity_provider.clone(),
                gas_kwh: record.gas_kwh,
                gas_provider: record.gas_provider.clone(),
            },
            self.reporting_period,
            &self.factors,
        )?;
        let emissions = entry.emissions;
        self.entries.push(entry);

        Ok(emissions)
    }

    /// Records a whole year of monthly figures for one building, January first.
    /// Months where both carriers metered zero are skipped rather than recorded
    /// as zero entries. Returns how many months were recorded; on error nothing
    /// is recorded at all.
    pub fn record_year(
        &mut self,
        building_id: &str,
        year: i32,
        monthly: [MonthlyUsage; MONTHS_PER_YEAR as usize],
    ) -> Result<usize, ValidationError> {
        let building = self.buildings.building(building_id)?;
        let mut computed = Vec::new();
        for (month_index, usage) in monthly.into_iter().enumerate() {
            if usage.is_empty() {
                continue;
            }
            computed.push(UsageEntry::compute(
                building,
                year,
                month_index as u32 + 1,
                usage,
                self.reporting_period,
                &self.factors,
            )?);
        }

        let recorded = computed.len();
        self.entries.extend(computed);

        Ok(recorded)
    }

    /// Drops every recorded entry. Buildings, factors and the target survive.
    pub fn clear_entries(&mut self) {
        self.entries.clear();
    }

    /// Changes the reporting convention for entries recorded from now on.
    /// Existing entries keep the factor year they were computed with.
    pub fn set_reporting_period(&mut self, convention: ReportingPeriodConvention) {
        self.reporting_period = convention;
    }

    pub fn totals(&self, filter: &UsageFilter) -> Option<EmissionsTotals> {
        filtered_totals(&self.entries, filter)
    }

    /// Runs the full analytics suite over the recorded entries.
    pub fn run(&self) -> RunResults {
        let overall = totals(&self.entries);
        let yearly = yearly_summaries(&self.entries);
        let latest_year = latest_reported_year(&self.entries);
        let seasonal = latest_year.and_then(|year| seasonal_breakdown(&self.entries, year));
        let monthly = monthly_series(&self.entries);
        let rolling_average_tonnes = rolling_average(&monthly, ROLLING_WINDOW_MONTHS);
        let extremes = monthly_extremes(&monthly);

        let equivalences = overall
            .as_ref()
            .map(|totals| self.equivalence.translate(totals.total_tonnes));

        let (pathway, progress) = match &self.reduction_target {
            Some(target) => {
                let baseline =
                    filtered_totals(&self.entries, &UsageFilter::for_year(target.baseline_year));
                match baseline {
                    Some(baseline_totals) => {
                        let latest = latest_year.and_then(|year| {
                            filtered_totals(&self.entries, &UsageFilter::for_year(year))
                                .map(|totals| (year, totals))
                        });
                        let progress = latest.and_then(|(year, totals)| {
                            target.assess_progress(
                                baseline_totals.total_tonnes,
                                year,
                                totals.total_tonnes,
                            )
                        });
                        (Some(target.pathway(baseline_totals.total_tonnes)), progress)
                    }
                    None => (None, None),
                }
            }
            None => (None, None),
        };

        RunResults {
            totals: overall,
            yearly,
            latest_year,
            seasonal,
            carrier_split: carrier_split(&self.entries),
            monthly_series: monthly,
            rolling_average_tonnes,
            annualised: annualised_rate(&self.entries),
            extremes,
            equivalences,
            pathway,
            progress,
        }
    }
}

/// Everything the analytics suite derives from a ledger in one pass.
/// `None` fields mean there was no data to derive them from, which reads
/// differently to a zero.
#[derive(Clone, Debug, Serialize)]
pub struct RunResults {
    pub totals: Option<EmissionsTotals>,
    pub yearly: Vec<YearlySummary>,
    pub latest_year: Option<i32>,
    pub seasonal: Option<SeasonalBreakdown>,
    pub carrier_split: Option<CarrierSplit>,
    pub monthly_series: Vec<MonthlyPoint>,
    pub rolling_average_tonnes: Vec<f64>,
    pub annualised: Option<AnnualisedRate>,
    pub extremes: Option<MonthlyExtremes>,
    pub equivalences: Option<Equivalences>,
    pub pathway: Option<TargetPathway>,
    pub progress: Option<ProgressAssessment>,
}
