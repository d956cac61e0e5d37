use crate::core::units::KILOGRAMS_PER_TONNE;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

pub const TREE_ABSORPTION_KG_PER_YEAR: f64 = 21.;
pub const CAR_KG_PER_KM: f64 = 0.12;
pub const HOME_TONNES_PER_YEAR: f64 = 3.2;

/// Ratios for translating an emissions total into everyday terms. These are
/// published approximations that move over time, so documents can override
/// them without a code change.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct EquivalenceFactors {
    #[validate(exclusive_minimum = 0.)]
    pub tree_absorption_kg_per_year: f64,
    #[validate(exclusive_minimum = 0.)]
    pub car_kg_per_km: f64,
    #[validate(exclusive_minimum = 0.)]
    pub home_tonnes_per_year: f64,
}

impl Default for EquivalenceFactors {
    fn default() -> Self {
        Self {
            tree_absorption_kg_per_year: TREE_ABSORPTION_KG_PER_YEAR,
            car_kg_per_km: CAR_KG_PER_KM,
            home_tonnes_per_year: HOME_TONNES_PER_YEAR,
        }
    }
}

/// Whole-unit equivalents of an emissions total, rounded down so the figures
/// never overstate the impact.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Equivalences {
    pub trees_absorbing_for_a_year: u64,
    pub car_kilometres: u64,
    pub home_years: u64,
}

impl EquivalenceFactors {
    pub fn translate(&self, total_tonnes: f64) -> Equivalences {
        let total_kg = total_tonnes * KILOGRAMS_PER_TONNE as f64;
        Equivalences {
            trees_absorbing_for_a_year: (total_kg / self.tree_absorption_kg_per_year).floor()
                as u64,
            car_kilometres: (total_kg / self.car_kg_per_km).floor() as u64,
            home_years: (total_tonnes / self.home_tonnes_per_year).floor() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_translate_with_published_ratios() {
        let equivalences = EquivalenceFactors::default().translate(100.);
        assert_eq!(
            equivalences,
            Equivalences {
                trees_absorbing_for_a_year: 4_761,
                car_kilometres: 833_333,
                home_years: 31,
            }
        );
    }

    #[rstest]
    fn should_round_down_to_whole_units() {
        let equivalences = EquivalenceFactors::default().translate(2.985);
        assert_eq!(equivalences.trees_absorbing_for_a_year, 142);
        assert_eq!(equivalences.car_kilometres, 24_875);
        assert_eq!(
            equivalences.home_years, 0,
            "less than one household-year rounds down to zero"
        );
    }

    #[rstest]
    fn should_translate_zero_emissions_to_zero_units() {
        assert_eq!(
            EquivalenceFactors::default().translate(0.),
            Equivalences {
                trees_absorbing_for_a_year: 0,
                car_kilometres: 0,
                home_years: 0,
            }
        );
    }

    #[rstest]
    fn should_use_overridden_ratios() {
        let factors = EquivalenceFactors {
            tree_absorption_kg_per_year: 20.,
            ..Default::default()
        };
        assert_eq!(factors.translate(100.).trees_absorbing_for_a_year, 5_000);
    }

    #[rstest]
    fn should_default_unspecified_ratios_when_deserializing() {
        let factors: EquivalenceFactors =
            serde_json::from_str(r#"{"car_kg_per_km": 0.15}"#).unwrap();
        assert_eq!(factors.car_kg_per_km, 0.15);
        assert_eq!(factors.tree_absorption_kg_per_year, 21.);
        assert_eq!(factors.home_tonnes_per_year, 3.2);
        assert!(factors.validate().is_ok());
    }

    #[rstest]
    fn should_flag_non_positive_ratios() {
        let factors = EquivalenceFactors {
            car_kg_per_km: 0.,
            ..Default::default()
        };
        assert!(factors.validate().is_err());
    }
}
