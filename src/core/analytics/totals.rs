use crate::core::usage::UsageEntry;
use serde::Serialize;

/// Criteria for selecting a subset of usage entries. Unset criteria match
/// every entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UsageFilter {
    pub building_id: Option<String>,
    pub years: Option<Vec<i32>>,
    pub month: Option<u32>,
}

impl UsageFilter {
    pub fn for_building(building_id: &str) -> Self {
        Self {
            building_id: Some(building_id.to_string()),
            ..Default::default()
        }
    }

    pub fn for_year(year: i32) -> Self {
        Self {
            years: Some(vec![year]),
            ..Default::default()
        }
    }

    pub fn matches(&self, entry: &UsageEntry) -> bool {
        self.building_id
            .as_ref()
            .map_or(true, |id| &entry.building_id == id)
            && self
                .years
                .as_ref()
                .map_or(true, |years| years.contains(&entry.year))
            && self.month.map_or(true, |month| entry.month == month)
    }
}

/// Aggregate usage and emissions over a selection of entries.
///
/// Only produced when at least one entry was selected, so "no data" stays
/// distinct from "zero usage".
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct EmissionsTotals {
    pub entry_count: usize,
    pub electricity_kwh: f64,
    pub gas_kwh: f64,
    pub electricity_kg: f64,
    pub gas_kg: f64,
    pub total_tonnes: f64,
}

pub fn totals<'a>(entries: impl IntoIterator<Item = &'a UsageEntry>) -> Option<EmissionsTotals> {
    let mut summed: Option<EmissionsTotals> = None;
    for entry in entries {
        let accumulated = summed.get_or_insert_with(Default::default);
        accumulated.entry_count += 1;
        accumulated.electricity_kwh += entry.electricity_kwh;
        accumulated.gas_kwh += entry.gas_kwh;
        accumulated.electricity_kg += entry.emissions.electricity_kg;
        accumulated.gas_kg += entry.emissions.gas_kg;
        accumulated.total_tonnes += entry.emissions.total_tonnes;
    }

    summed
}

pub fn filtered_totals(entries: &[UsageEntry], filter: &UsageFilter) -> Option<EmissionsTotals> {
    totals(entries.iter().filter(|entry| filter.matches(entry)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::usage::test_usage::entry;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn estate() -> Vec<UsageEntry> {
        vec![
            entry("town-hall", 2023, 1, 12_000., 8_000.),
            entry("town-hall", 2024, 1, 10_000., 5_000.),
            entry("town-hall", 2024, 2, 9_500., 4_800.),
            entry("library", 2024, 1, 3_000., 1_200.),
        ]
    }

    #[rstest]
    fn should_report_no_totals_for_no_entries() {
        assert_eq!(totals([]), None);
        assert_eq!(
            filtered_totals(&[], &UsageFilter::default()),
            None,
            "an empty ledger has no totals, not zero totals"
        );
    }

    #[rstest]
    fn should_sum_usage_and_emissions(estate: Vec<UsageEntry>) {
        let summed = totals(&estate).unwrap();
        assert_eq!(summed.entry_count, 4);
        assert_relative_eq!(summed.electricity_kwh, 34_500.);
        assert_relative_eq!(summed.gas_kwh, 19_000.);
        let expected_tonnes: f64 = estate.iter().map(|e| e.emissions.total_tonnes).sum();
        assert_relative_eq!(summed.total_tonnes, expected_tonnes);
    }

    #[rstest]
    fn should_filter_by_building(estate: Vec<UsageEntry>) {
        let summed = filtered_totals(&estate, &UsageFilter::for_building("library")).unwrap();
        assert_eq!(summed.entry_count, 1);
        assert_relative_eq!(summed.electricity_kwh, 3_000.);
    }

    #[rstest]
    fn should_filter_by_year_set(estate: Vec<UsageEntry>) {
        let summed = filtered_totals(
            &estate,
            &UsageFilter {
                years: Some(vec![2024]),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(summed.entry_count, 3);
    }

    #[rstest]
    fn should_filter_by_month_across_years(estate: Vec<UsageEntry>) {
        let summed = filtered_totals(
            &estate,
            &UsageFilter {
                month: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(summed.entry_count, 3);
    }

    #[rstest]
    fn should_combine_filter_criteria(estate: Vec<UsageEntry>) {
        let filter = UsageFilter {
            building_id: Some("town-hall".to_string()),
            years: Some(vec![2024]),
            month: Some(2),
        };
        let summed = filtered_totals(&estate, &filter).unwrap();
        assert_eq!(summed.entry_count, 1);
        assert_relative_eq!(summed.gas_kwh, 4_800.);
    }

    #[rstest]
    fn should_report_none_when_nothing_matches(estate: Vec<UsageEntry>) {
        assert_eq!(
            filtered_totals(&estate, &UsageFilter::for_building("car-park")),
            None
        );
    }

    #[rstest]
    fn should_count_zero_usage_entries_as_data() {
        let entries = vec![entry("town-hall", 2024, 8, 0., 0.)];
        let summed = totals(&entries).unwrap();
        assert_eq!(summed.entry_count, 1);
        assert_eq!(summed.total_tonnes, 0.);
    }
}
