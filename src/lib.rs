pub mod core;
pub mod errors;
pub mod input;
pub mod ledger;
pub mod output;
mod wrappers;

pub use crate::ledger::{Ledger, RunResults};

use crate::core::analytics::totals::UsageFilter;
use crate::core::usage::UsageEntry;
use crate::errors::{CcreCoreError, CcreError, ExportError};
use crate::input::ingest_for_processing;
use crate::output::Output;
#[cfg(feature = "demo")]
use crate::wrappers::demo_data::DemoDataWrapper;
use crate::wrappers::{ChosenWrapper, PassthroughWrapper, ReportWrapper};
use bitflags::bitflags;
use csv::WriterBuilder;
use std::any::Any;
use std::io::Read;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::info;

bitflags! {
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct ReportFlags: u32 {
        /// Discard the document's usage section and synthesise demonstration data instead.
        const DEMO_DATA = 0b1;
        /// Also write a per-building breakdown file.
        const DETAILED_OUTPUT = 0b10;
    }
}

/// Runs a full reporting cycle: ingest the document, apply any wrapper
/// preprocessing, build the ledger, derive the analytics and write the CSV
/// exports to the given output.
pub fn run_report(
    input: impl Read,
    output: impl Output,
    flags: &ReportFlags,
) -> Result<RunResults, CcreError> {
    let input_for_processing = ingest_for_processing(input)?;

    let wrapper = choose_wrapper(flags)?;
    let input = catch_unwind(AssertUnwindSafe(|| {
        wrapper.apply_preprocessing(input_for_processing, flags)
    }))
    .map_err(|panic| CcreError::PanicInWrapper(panic_message(panic)))??;

    let (ledger, results) = catch_unwind(AssertUnwindSafe(
        || -> Result<(Ledger, RunResults), CcreError> {
            let ledger = Ledger::from_input(input)
                .map_err(|err| CcreError::FailureInCalculation(CcreCoreError::new(err)))?;
            let results = ledger.run();
            Ok((ledger, results))
        },
    ))
    .map_err(|panic| CcreError::PanicInCalculation(panic_message(panic)))??;

    if !output.is_noop() {
        write_output_files(&output, &ledger, &results, flags).map_err(CcreError::ErrorInExport)?;
    }

    Ok(results)
}

fn choose_wrapper(flags: &ReportFlags) -> Result<ChosenWrapper, CcreError> {
    if flags.contains(ReportFlags::DEMO_DATA) {
        #[cfg(feature = "demo")]
        return Ok(ChosenWrapper::DemoData(DemoDataWrapper::new()));
        #[cfg(not(feature = "demo"))]
        return Err(CcreError::InvalidRequest(anyhow::anyhow!(
            "Demo data was requested, but this build does not include the demo data wrapper"
        )));
    }

    Ok(ChosenWrapper::Passthrough(PassthroughWrapper::new()))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast_ref::<&str>() {
        Some(message) => message.to_string(),
        None => match payload.downcast_ref::<String>() {
            Some(message) => message.clone(),
            None => "Unknown panic".to_string(),
        },
    }
}

const ENTRIES_OUTPUT_KEY: &str = "entries";
const SUMMARY_OUTPUT_KEY: &str = "summary";
const BUILDINGS_OUTPUT_KEY: &str = "buildings";

pub const ENTRIES_CSV_HEADERS: [&str; 12] = [
    "Building",
    "Building Type",
    "Floor Area",
    "Year",
    "Month",
    "Electricity Usage (kWh)",
    "Electricity Provider",
    "Gas Usage (kWh)",
    "Gas Provider",
    "Electricity Emissions (kg CO2e)",
    "Gas Emissions (kg CO2e)",
    "Total Emissions (tonnes CO2e)",
];

fn write_output_files(
    output: &impl Output,
    ledger: &Ledger,
    results: &RunResults,
    flags: &ReportFlags,
) -> Result<(), ExportError> {
    write_entries_file(output, ledger.entries()).map_err(ExportError::new)?;
    write_summary_file(output, results).map_err(ExportError::new)?;
    if flags.contains(ReportFlags::DETAILED_OUTPUT) {
        write_buildings_file(output, ledger).map_err(ExportError::new)?;
    }

    Ok(())
}

/// Writes the entry collection out as CSV, one row per recorded month of usage,
/// in the order the entries were recorded.
fn write_entries_file(output: &impl Output, entries: &[UsageEntry]) -> anyhow::Result<()> {
    info!("writing out to {ENTRIES_OUTPUT_KEY}");
    let writer = output.writer_for_location_key(ENTRIES_OUTPUT_KEY)?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record(ENTRIES_CSV_HEADERS)?;

    for entry in entries {
        writer.write_record([
            entry.building_name.clone(),
            entry.category.clone(),
            entry.floor_area.square_metres().to_string(),
            entry.year.to_string(),
            entry.month_name(),
            entry.electricity_kwh.to_string(),
            entry.electricity_provider.clone().unwrap_or_default(),
            entry.gas_kwh.to_string(),
            entry.gas_provider.clone().unwrap_or_default(),
            entry.emissions.electricity_kg.to_string(),
            entry.emissions.gas_kg.to_string(),
            entry.emissions.total_tonnes.to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

/// Writes the analytics suite as a sectioned summary file. Rows vary in width
/// between sections, so the writer is set up as flexible.
fn write_summary_file(output: &impl Output, results: &RunResults) -> anyhow::Result<()> {
    info!("writing out to {SUMMARY_OUTPUT_KEY}");
    let writer = output.writer_for_location_key(SUMMARY_OUTPUT_KEY)?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    let totals = match &results.totals {
        Some(totals) => totals,
        None => {
            writer.write_record(["No usage data reported"])?;
            writer.flush()?;
            return Ok(());
        }
    };

    writer.write_record(["Entries", &totals.entry_count.to_string()])?;
    writer.write_record(["Electricity usage (kWh)", &totals.electricity_kwh.to_string()])?;
    writer.write_record(["Gas usage (kWh)", &totals.gas_kwh.to_string()])?;
    writer.write_record([
        "Electricity emissions (kg CO2e)",
        &totals.electricity_kg.to_string(),
    ])?;
    writer.write_record(["Gas emissions (kg CO2e)", &totals.gas_kg.to_string()])?;
    writer.write_record([
        "Total emissions (tonnes CO2e)",
        &totals.total_tonnes.to_string(),
    ])?;

    if let Some(split) = &results.carrier_split {
        writer.write_record([
            "Electricity share of emissions (%)",
            &split.electricity_percent.to_string(),
        ])?;
        writer.write_record(["Gas share of emissions (%)", &split.gas_percent.to_string()])?;
    }

    if let Some(annualised) = &results.annualised {
        writer.write_record(["Months reported", &annualised.months_observed.to_string()])?;
        writer.write_record([
            "Annualised rate (tonnes CO2e/year)",
            &annualised.annualised_tonnes.to_string(),
        ])?;
        writer.write_record([
            "Science based target (tonnes CO2e/year)",
            &annualised.science_based_target_tonnes.to_string(),
        ])?;
    }

    if let Some(equivalences) = &results.equivalences {
        writer.write_record([
            "Trees absorbing for a year",
            &equivalences.trees_absorbing_for_a_year.to_string(),
        ])?;
        writer.write_record(["Car kilometres", &equivalences.car_kilometres.to_string()])?;
        writer.write_record(["Homes for a year", &equivalences.home_years.to_string()])?;
    }

    if let Some(extremes) = &results.extremes {
        writer.write_record([
            "Peak month".to_string(),
            extremes.peak.label(),
            extremes.peak.total_tonnes.to_string(),
        ])?;
        writer.write_record([
            "Trough month".to_string(),
            extremes.trough.label(),
            extremes.trough.total_tonnes.to_string(),
        ])?;
    }

    if !results.yearly.is_empty() {
        writer.write_record([
            "Year",
            "Entries",
            "Electricity (kWh)",
            "Gas (kWh)",
            "Total emissions (tonnes CO2e)",
            "Change from previous (%)",
        ])?;
        for summary in &results.yearly {
            writer.write_record([
                summary.year.to_string(),
                summary.entry_count.to_string(),
                summary.electricity_kwh.to_string(),
                summary.gas_kwh.to_string(),
                summary.total_tonnes.to_string(),
                summary
                    .change_from_previous_percent
                    .map_or_else(|| "n/a".to_string(), |change| change.to_string()),
            ])?;
        }
    }

    if let Some(seasonal) = &results.seasonal {
        writer.write_record([
            "Seasonal breakdown for year".to_string(),
            seasonal.year.to_string(),
        ])?;
        writer.write_record(["Season", "Entries", "Total (tonnes CO2e)", "Share of year (%)"])?;
        for season in &seasonal.seasons {
            writer.write_record([
                season.season.to_string(),
                season.entry_count.to_string(),
                season.total_tonnes.to_string(),
                season.share_percent.to_string(),
            ])?;
        }
    }

    if !results.monthly_series.is_empty() {
        writer.write_record([
            "Month",
            "Total emissions (tonnes CO2e)",
            "Rolling average (tonnes CO2e)",
        ])?;
        for (point, rolling) in results
            .monthly_series
            .iter()
            .zip(&results.rolling_average_tonnes)
        {
            writer.write_record([
                point.label(),
                point.total_tonnes.to_string(),
                rolling.to_string(),
            ])?;
        }
    }

    if let Some(pathway) = &results.pathway {
        writer.write_record(["Target year", "Pathway emissions (tonnes CO2e)"])?;
        for point in &pathway.points {
            writer.write_record([point.year.to_string(), point.target_tonnes.to_string()])?;
        }
    }

    if let Some(progress) = &results.progress {
        writer.write_record(["Progress status", &progress.status.to_string()])?;
        writer.write_record([
            "Actual reduction (%)",
            &progress.actual_reduction_percent.to_string(),
        ])?;
        writer.write_record([
            "Expected reduction (%)",
            &progress.expected_reduction_percent.to_string(),
        ])?;
        writer.write_record([
            "Target at net zero horizon (tonnes CO2e)",
            &progress.target_tonnes.to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

/// Writes one row per registered building with its filtered totals. Buildings
/// with no recorded usage appear as zero rows, so the estate is always complete.
fn write_buildings_file(output: &impl Output, ledger: &Ledger) -> anyhow::Result<()> {
    info!("writing out to {BUILDINGS_OUTPUT_KEY}");
    let writer = output.writer_for_location_key(BUILDINGS_OUTPUT_KEY)?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record([
        "Building",
        "Building Type",
        "Floor Area",
        "Entries",
        "Electricity Usage (kWh)",
        "Gas Usage (kWh)",
        "Electricity Emissions (kg CO2e)",
        "Gas Emissions (kg CO2e)",
        "Total Emissions (tonnes CO2e)",
    ])?;

    for building in ledger.buildings().iter() {
        let totals = ledger
            .totals(&UsageFilter::for_building(&building.id))
            .unwrap_or_default();
        writer.write_record([
            building.name.clone(),
            building.category.clone(),
            building.floor_area.square_metres().to_string(),
            totals.entry_count.to_string(),
            totals.electricity_kwh.to_string(),
            totals.gas_kwh.to_string(),
            totals.electricity_kg.to_string(),
            totals.gas_kg.to_string(),
            totals.total_tonnes.to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{MemoryOutput, SinkOutput};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;

    #[fixture]
    fn document() -> &'static str {
        r#"{
            "Buildings": [
                {"id": "town-hall", "name": "Town Hall", "category": "Offices", "floor_area": 2500.0},
                {"id": "depot", "name": "Highways Depot", "category": "Operational", "floor_area": 1800.0}
            ],
            "Usage": [
                {"building": "town-hall", "year": 2022, "month": 1, "electricity_kwh": 10000.0, "gas_kwh": 8000.0},
                {"building": "town-hall", "year": 2022, "month": 7, "electricity_kwh": 8000.0, "gas_kwh": 2000.0},
                {"building": "depot", "year": 2022, "month": 1, "electricity_kwh": 5000.0, "gas_kwh": 4000.0},
                {"building": "town-hall", "year": 2024, "month": 1, "electricity_kwh": 9000.0, "gas_kwh": 7000.0},
                {"building": "depot", "year": 2024, "month": 7, "electricity_kwh": 4500.0, "gas_kwh": 1500.0}
            ],
            "ReductionTarget": {"baseline_year": 2022, "target_percentage": 50.0}
        }"#
    }

    #[rstest]
    fn should_run_a_report_end_to_end(document: &str) {
        let output = MemoryOutput::new();

        let results = run_report(
            Cursor::new(document),
            &output,
            &ReportFlags::empty(),
        )
        .unwrap();

        assert_eq!(results.totals.unwrap().entry_count, 5);
        assert_eq!(
            output.location_keys(),
            vec!["entries".to_string(), "summary".to_string()]
        );

        let entries_csv = output.string_for_location_key("entries").unwrap();
        let mut lines = entries_csv.lines();
        assert_eq!(lines.next(), Some(ENTRIES_CSV_HEADERS.join(",").as_str()));
        assert_eq!(lines.clone().count(), 5, "one row per usage entry");
        assert!(lines
            .next()
            .unwrap()
            .starts_with("Town Hall,Offices,2500,2022,January,10000,,8000,,"));
    }

    #[rstest]
    fn should_write_emissions_figures_that_parse_back(document: &str) {
        let output = MemoryOutput::new();
        run_report(Cursor::new(document), &output, &ReportFlags::empty()).unwrap();

        let entries_csv = output.bytes_for_location_key("entries").unwrap();
        let mut reader = csv::Reader::from_reader(Cursor::new(entries_csv));
        let first_row = reader.records().next().unwrap().unwrap();

        let electricity_kg: f64 = first_row[9].parse().unwrap();
        let gas_kg: f64 = first_row[10].parse().unwrap();
        let total_tonnes: f64 = first_row[11].parse().unwrap();
        assert_relative_eq!(electricity_kg, 10_000. * 0.23332, max_relative = 1e-12);
        assert_relative_eq!(gas_kg, 8_000. * 0.18521, max_relative = 1e-12);
        assert_relative_eq!(
            total_tonnes,
            (10_000. * 0.23332 + 8_000. * 0.18521) / 1_000.,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn should_produce_byte_identical_exports_for_the_same_document(document: &str) {
        let first = MemoryOutput::new();
        let second = MemoryOutput::new();

        run_report(Cursor::new(document), &first, &ReportFlags::empty()).unwrap();
        run_report(Cursor::new(document), &second, &ReportFlags::empty()).unwrap();

        for location_key in ["entries", "summary"] {
            assert_eq!(
                first.bytes_for_location_key(location_key),
                second.bytes_for_location_key(location_key),
                "{location_key} export should be reproducible"
            );
        }
    }

    #[rstest]
    fn should_include_progress_and_seasonal_sections_in_the_summary(document: &str) {
        let output = MemoryOutput::new();
        run_report(Cursor::new(document), &output, &ReportFlags::empty()).unwrap();

        let summary_csv = output.string_for_location_key("summary").unwrap();
        assert!(summary_csv.contains("Progress status,On Track"));
        assert!(summary_csv.contains("Seasonal breakdown for year,2024"));
        assert!(summary_csv.contains("Target year,Pathway emissions (tonnes CO2e)"));
        assert!(summary_csv.lines().next().unwrap().starts_with("Entries,5"));
    }

    #[rstest]
    fn should_write_a_buildings_file_when_detailed_output_is_requested(document: &str) {
        let output = MemoryOutput::new();
        run_report(
            Cursor::new(document),
            &output,
            &ReportFlags::DETAILED_OUTPUT,
        )
        .unwrap();

        let buildings_csv = output.string_for_location_key("buildings").unwrap();
        assert_eq!(buildings_csv.lines().count(), 3, "header plus two buildings");
        assert!(buildings_csv.contains("Highways Depot,Operational,1800,2,"));
    }

    #[rstest]
    fn should_report_no_data_for_an_empty_document() {
        let output = MemoryOutput::new();

        let results = run_report(Cursor::new("{}"), &output, &ReportFlags::empty()).unwrap();

        assert!(results.totals.is_none());
        assert_eq!(
            output.string_for_location_key("summary").as_deref(),
            Some("No usage data reported\n")
        );
        assert_eq!(
            output.string_for_location_key("entries").unwrap().lines().count(),
            1,
            "entries export should hold only the header row"
        );
    }

    #[rstest]
    fn should_skip_exports_for_a_noop_output(document: &str) {
        let results = run_report(Cursor::new(document), SinkOutput, &ReportFlags::empty()).unwrap();
        assert_eq!(results.totals.unwrap().entry_count, 5);
    }

    #[rstest]
    fn should_class_malformed_documents_as_invalid_requests() {
        let error =
            run_report(Cursor::new("not json"), SinkOutput, &ReportFlags::empty()).unwrap_err();
        assert!(matches!(error, CcreError::InvalidRequest(_)));
    }

    #[rstest]
    fn should_class_unknown_buildings_as_calculation_failures() {
        let json = r#"{
            "Usage": [
                {"building": "phantom", "year": 2024, "month": 1, "electricity_kwh": 1.0, "gas_kwh": 1.0}
            ]
        }"#;
        let error = run_report(Cursor::new(json), SinkOutput, &ReportFlags::empty()).unwrap_err();
        assert!(matches!(error, CcreError::FailureInCalculation(_)));
    }

    #[cfg(feature = "demo")]
    mod demo {
        use super::*;
        use pretty_assertions::assert_eq;

        #[rstest]
        fn should_synthesise_a_demo_estate_when_the_flag_is_set() {
            let output = MemoryOutput::new();

            let results =
                run_report(Cursor::new("{}"), &output, &ReportFlags::DEMO_DATA).unwrap();

            let totals = results.totals.unwrap();
            assert_eq!(totals.entry_count, 5 * 12, "five demo buildings, a year each");

            let entries_csv = output.string_for_location_key("entries").unwrap();
            assert_eq!(entries_csv.lines().count(), 1 + 5 * 12);
            assert!(entries_csv.contains("Demo Energy Ltd"));
            assert!(entries_csv.contains("Demo Gas Ltd"));
        }

        #[rstest]
        fn should_keep_declared_buildings_but_replace_usage(document: &str) {
            let results = run_report(
                Cursor::new(document),
                SinkOutput,
                &ReportFlags::DEMO_DATA,
            )
            .unwrap();

            // two declared buildings, one synthesised year anchored to the latest factor year
            let totals = results.totals.unwrap();
            assert_eq!(totals.entry_count, 2 * 12);
            assert_eq!(results.latest_year, Some(2025));
        }
    }
}
