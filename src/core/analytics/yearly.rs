use crate::core::analytics::totals::totals;
use crate::core::units::percentage_change;
use crate::core::usage::UsageEntry;
use itertools::Itertools;
use serde::Serialize;

/// One reporting year's aggregate figures.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct YearlySummary {
    pub year: i32,
    pub entry_count: usize,
    pub electricity_kwh: f64,
    pub gas_kwh: f64,
    pub total_tonnes: f64,
    /// Change in total emissions against the previous reported year. None for
    /// the earliest year, and when the previous year's total was zero (a
    /// change from nothing has no meaningful percentage).
    pub change_from_previous_percent: Option<f64>,
}

pub fn latest_reported_year(entries: &[UsageEntry]) -> Option<i32> {
    entries.iter().map(|entry| entry.year).max()
}

/// Aggregate entries into per-year summaries, ascending by year.
pub fn yearly_summaries(entries: &[UsageEntry]) -> Vec<YearlySummary> {
    let mut summaries: Vec<YearlySummary> = vec![];
    let mut previous_total: Option<f64> = None;

    for (year, year_entries) in entries
        .iter()
        .map(|entry| (entry.year, entry))
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(year, _)| *year)
    {
        let Some(summed) = totals(year_entries) else {
            continue;
        };
        summaries.push(YearlySummary {
            year,
            entry_count: summed.entry_count,
            electricity_kwh: summed.electricity_kwh,
            gas_kwh: summed.gas_kwh,
            total_tonnes: summed.total_tonnes,
            change_from_previous_percent: previous_total
                .and_then(|previous| percentage_change(summed.total_tonnes, previous)),
        });
        previous_total = Some(summed.total_tonnes);
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::usage::test_usage::entry;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_return_no_summaries_for_no_entries() {
        assert_eq!(yearly_summaries(&[]), vec![]);
        assert_eq!(latest_reported_year(&[]), None);
    }

    #[rstest]
    fn should_group_entries_by_year_ascending() {
        let entries = vec![
            entry("town-hall", 2024, 1, 10_000., 5_000.),
            entry("town-hall", 2022, 1, 12_000., 8_000.),
            entry("library", 2024, 2, 3_000., 1_200.),
        ];
        let summaries = yearly_summaries(&entries);

        assert_eq!(
            summaries.iter().map(|s| s.year).collect::<Vec<_>>(),
            vec![2022, 2024]
        );
        assert_eq!(summaries[1].entry_count, 2);
        assert_relative_eq!(summaries[1].electricity_kwh, 13_000.);
        assert_eq!(latest_reported_year(&entries), Some(2024));
    }

    #[rstest]
    fn should_compute_change_against_the_previous_reported_year() {
        let entries = vec![
            entry("town-hall", 2023, 6, 10_000., 0.),
            entry("town-hall", 2024, 6, 10_000., 0.),
        ];
        let summaries = yearly_summaries(&entries);

        assert_eq!(summaries[0].change_from_previous_percent, None);
        let expected =
            (10_000. * 0.20705 - 10_000. * 0.21233) / (10_000. * 0.21233) * 100.;
        assert_relative_eq!(
            summaries[1].change_from_previous_percent.unwrap(),
            expected,
            max_relative = 1e-9
        );
    }

    #[rstest]
    fn should_not_report_change_against_a_zero_previous_year() {
        let entries = vec![
            entry("town-hall", 2023, 6, 0., 0.),
            entry("town-hall", 2024, 6, 10_000., 0.),
        ];
        let summaries = yearly_summaries(&entries);
        assert_eq!(
            summaries[1].change_from_previous_percent, None,
            "a change from a zero year is undefined, not infinite"
        );
    }

    #[rstest]
    fn should_summarise_a_single_year_without_change() {
        let summaries = yearly_summaries(&[entry("town-hall", 2024, 1, 5_000., 2_000.)]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].change_from_previous_percent, None);
    }
}
