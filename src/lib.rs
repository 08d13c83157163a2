//! covidash - Covid-19 dashboard for Italy
//!
//! Downloads the Protezione Civile contagion reports and the vaccination
//! open data, smooths them into daily series and serves them as interactive
//! charts for the whole country or a single region.

pub mod api;
pub mod charts;
pub mod cli;
pub mod config;
pub mod content;
pub mod dashboard;
pub mod data;
pub mod fetch;
pub mod logging;
pub mod metrics;
pub mod refresh;
