use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Map, Value};
use std::{fmt::Debug, sync::Arc};

use crate::error::RelayError;

pub mod onecall;

pub use onecall::OneCallProvider;

/// Source of forecast bodies: one GET per call, no retries.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Fetch `url` and return the upstream JSON object.
    ///
    /// Non-2xx answers surface as [`RelayError::UpstreamStatus`]; network and
    /// body failures as [`RelayError::Transport`] or [`RelayError::Decode`].
    async fn fetch(&self, url: &Url) -> Result<Map<String, Value>, RelayError>;
}

#[async_trait]
impl<P: ForecastProvider + ?Sized> ForecastProvider for Arc<P> {
    async fn fetch(&self, url: &Url) -> Result<Map<String, Value>, RelayError> {
        (**self).fetch(url).await
    }
}

/// Interpret a successful upstream body as a JSON object.
pub(crate) fn parse_body(body: &[u8]) -> Result<Map<String, Value>, RelayError> {
    match serde_json::from_slice(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(RelayError::NotAnObject),
    }
}
