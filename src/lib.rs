//! Cloud Status API Library
//!
//! Fetches public health signals from AWS, Azure and GCP, normalizes them
//! against a fixed service catalog and serves the latest snapshot over HTTP.

pub mod catalog;
pub mod classify;
pub mod config;
pub mod controllers;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod text;

pub use config::Config;
pub use errors::{Result, StatusError};
pub use models::{CacheEntry, NormalizedEvent, NormalizedService, Provider, ProviderStatus, ServiceStatus};
pub use services::ProviderFetcher;
pub use services::refresh::{RefreshReport, Refresher};
pub use state::{AppState, StatusCache};
