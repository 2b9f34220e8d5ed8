pub mod chart;
pub mod financials;
pub mod screening;
