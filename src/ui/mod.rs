pub mod meter;
pub mod report;
