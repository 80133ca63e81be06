pub mod config;
pub mod data;
pub mod errors;
pub mod horizon;
pub mod scenario;
pub mod timeseries;
