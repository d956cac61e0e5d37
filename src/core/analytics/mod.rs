pub mod equivalence;
pub mod seasonal;
pub mod target;
pub mod totals;
pub mod trends;
pub mod yearly;
