pub mod analytics;
pub mod building;
pub mod calculation;
pub mod factors;
pub mod reporting_period;
pub mod units;
pub mod usage;
