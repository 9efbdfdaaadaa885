//! Core library for the OpenWeather One Call forecast helper.
//!
//! This crate defines:
//! - Request/response payloads exchanged with the host module
//! - Query URL construction for the One Call API
//! - Abstraction over the forecast source (HTTP in production, fakes in tests)
//! - The stateless relay that validates, fetches and tags forecasts
//! - Configuration handling
//!
//! It is used by `forecast-helper`, but can also be embedded in other hosts.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod query;
pub mod relay;

pub use config::Config;
pub use error::RelayError;
pub use model::{
    Coordinate, FORECAST_DATA, FORECAST_GET, ForecastRequest, ForecastResponse, HostMessage,
};
pub use provider::{ForecastProvider, OneCallProvider};
pub use query::forecast_url;
pub use relay::ForecastRelay;
pub use reqwest::Url;
