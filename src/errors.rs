use crate::core::factors::EnergyCarrier;
use crate::core::reporting_period::YearOutOfRangeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CcreError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Uncaught error during wrapper preprocessing: {0}")]
    PanicInWrapper(String),
    #[error("Error identified during emissions calculation: {0}")]
    FailureInCalculation(#[from] CcreCoreError),
    #[error("Uncaught error during emissions calculation: {0}")]
    PanicInCalculation(String),
    #[error("Error while writing report output: {0}")]
    ErrorInExport(ExportError),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct CcreCoreError {
    error: anyhow::Error,
}

impl CcreCoreError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ExportError {
    error: anyhow::Error,
}

impl ExportError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

/// A problem with reported usage data or reporting configuration that makes a
/// calculation impossible, caught before any derived figures are produced.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{carrier} usage cannot be negative, got {value} kWh")]
    NegativeUsage { carrier: EnergyCarrier, value: f64 },
    #[error("{carrier} usage must be a finite number of kWh, got {value}")]
    NonFiniteUsage { carrier: EnergyCarrier, value: f64 },
    #[error("Month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),
    #[error("Year {0} is outside the supported date range")]
    YearOutOfRange(i32),
    #[error("No conversion factors provided for {0}")]
    EmptyFactorTable(EnergyCarrier),
    #[error("Conversion factor for {carrier} in {year} must be a finite non-negative number, got {value}")]
    InvalidFactor {
        carrier: EnergyCarrier,
        year: i32,
        value: f64,
    },
    #[error("No building registered with id '{0}'")]
    UnknownBuilding(String),
    #[error("A building with id '{0}' is already registered")]
    DuplicateBuilding(String),
}

impl From<YearOutOfRangeError> for ValidationError {
    fn from(error: YearOutOfRangeError) -> Self {
        Self::YearOutOfRange(error.0)
    }
}
