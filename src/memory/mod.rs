pub mod budget;
pub mod report;
