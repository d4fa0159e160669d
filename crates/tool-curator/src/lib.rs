pub mod analytics;
pub mod config;
pub mod curation;
pub mod discovery;
pub mod error;
pub mod experiments;
pub mod publishing;
pub mod storage;
pub mod telemetry;
