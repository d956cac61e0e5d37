use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::fmt::Display;
use thiserror::Error;

pub const KILOGRAMS_PER_TONNE: u32 = 1_000;
pub const MONTHS_PER_YEAR: u32 = 12;

pub fn kilograms_to_tonnes(kilograms: f64) -> f64 {
    kilograms / KILOGRAMS_PER_TONNE as f64
}

/// Share of a total expressed as a percentage, or None when the total is zero
/// (a share of nothing is undefined rather than 0%).
pub(crate) fn percentage_of(part: f64, total: f64) -> Option<f64> {
    (total != 0.).then(|| part / total * 100.)
}

pub(crate) fn percentage_change(current: f64, previous: f64) -> Option<f64> {
    (previous != 0.).then(|| (current - previous) / previous * 100.)
}

/// Internal floor area of a building in square metres. Always finite and strictly positive.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, PartialOrd, Serialize, Validate)]
#[serde(transparent)]
#[repr(transparent)]
pub struct FloorArea(#[validate(exclusive_minimum = 0.)] f64);

impl FloorArea {
    pub fn new(square_metres: f64) -> Result<Self, FloorAreaError> {
        if !square_metres.is_finite() || square_metres <= 0. {
            return Err(FloorAreaError::InvalidArea(square_metres));
        }

        Ok(Self(square_metres))
    }

    pub fn square_metres(&self) -> f64 {
        self.0
    }
}

impl Display for FloorArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Error)]
pub enum FloorAreaError {
    #[error("Floor area must be a positive number of square metres, got {0}")]
    InvalidArea(f64),
}
