//! Portfolio sentiment monitoring backend: news classification, sentiment
//! history, alerting and the HTTP API around them.

pub mod app;
pub mod config;
pub mod db;
pub mod errors;
pub mod external;
pub mod jobs;
pub mod logging;
pub mod models;
mod routes;
pub mod services;
pub mod state;
