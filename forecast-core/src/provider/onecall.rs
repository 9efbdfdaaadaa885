use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::RelayError;

use super::{ForecastProvider, parse_body};

/// OpenWeather One Call over HTTP.
///
/// Uses the client's default timeouts; nothing is retried.
#[derive(Debug, Clone, Default)]
pub struct OneCallProvider {
    http: Client,
}

impl OneCallProvider {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ForecastProvider for OneCallProvider {
    async fn fetch(&self, url: &Url) -> Result<Map<String, Value>, RelayError> {
        let res = self.http.get(url.clone()).send().await?;

        let status = res.status();
        debug!(status = status.as_u16(), "OpenWeather responded");

        if !status.is_success() {
            return Err(RelayError::UpstreamStatus(status.as_u16()));
        }

        let body = res.bytes().await?;
        parse_body(&body)
    }
}
