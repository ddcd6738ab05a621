pub mod dataset;
pub mod enrichment;
pub mod sample_loader;
pub mod schema_checks;
