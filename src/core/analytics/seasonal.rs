use crate::core::units::percentage_of;
use crate::core::usage::UsageEntry;
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Meteorological seasons. December belongs to the winter of its own calendar
/// year for breakdown purposes.
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq, Serialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub fn for_month(month: u32) -> Option<Season> {
        match month {
            12 | 1 | 2 => Some(Season::Winter),
            3..=5 => Some(Season::Spring),
            6..=8 => Some(Season::Summer),
            9..=11 => Some(Season::Autumn),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SeasonTotal {
    pub season: Season,
    pub entry_count: usize,
    pub total_tonnes: f64,
    /// Share of the year's total emissions, zero when that total is zero.
    pub share_percent: f64,
}

/// Per-season emissions for one reporting year. Seasons with no usage are
/// present with zero totals rather than omitted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeasonalBreakdown {
    pub year: i32,
    pub seasons: Vec<SeasonTotal>,
    pub year_total_tonnes: f64,
}

pub fn seasonal_breakdown(entries: &[UsageEntry], year: i32) -> Option<SeasonalBreakdown> {
    let year_entries: Vec<&UsageEntry> =
        entries.iter().filter(|entry| entry.year == year).collect();
    if year_entries.is_empty() {
        return None;
    }

    let year_total_tonnes: f64 = year_entries
        .iter()
        .map(|entry| entry.emissions.total_tonnes)
        .sum();
    let seasons = Season::iter()
        .map(|season| {
            let (entry_count, total_tonnes) = year_entries
                .iter()
                .filter(|entry| Season::for_month(entry.month) == Some(season))
                .fold((0_usize, 0.), |(count, tonnes), entry| {
                    (count + 1, tonnes + entry.emissions.total_tonnes)
                });
            SeasonTotal {
                season,
                entry_count,
                total_tonnes,
                share_percent: percentage_of(total_tonnes, year_total_tonnes).unwrap_or(0.),
            }
        })
        .collect();

    Some(SeasonalBreakdown {
        year,
        seasons,
        year_total_tonnes,
    })
}
