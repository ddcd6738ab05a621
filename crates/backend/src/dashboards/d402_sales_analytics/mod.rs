pub mod filters;
pub mod metrics;
pub mod quality;
pub mod schema;
pub mod service;
