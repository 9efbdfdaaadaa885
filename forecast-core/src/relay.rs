use tracing::{debug, error, info};

use crate::{
    config::Config,
    error::RelayError,
    model::{FORECAST_GET, ForecastRequest, ForecastResponse, HostMessage},
    provider::{ForecastProvider, OneCallProvider},
    query::forecast_url,
};

/// Stateless bridge between the host module and the forecast API.
///
/// Built once at startup and shared; every call takes all of its input as
/// arguments, so concurrent requests never see each other.
#[derive(Debug)]
pub struct ForecastRelay<P = OneCallProvider> {
    provider: P,
    module_name: String,
    default_endpoint: String,
}

impl ForecastRelay<OneCallProvider> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(OneCallProvider::new(), config)
    }
}

impl<P: ForecastProvider> ForecastRelay<P> {
    pub fn new(provider: P, config: &Config) -> Self {
        Self {
            provider,
            module_name: config.module_name.clone(),
            default_endpoint: config.default_endpoint.clone(),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn start(&self) {
        info!("Starting node_helper for {}", self.module_name);
    }

    /// Validate, fetch and tag a forecast. No logging; callers decide what to do with errors.
    pub async fn fetch_forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<ForecastResponse, RelayError> {
        if request.api_key().is_none() {
            return Err(RelayError::MissingApiKey);
        }
        if request.coordinates().is_none() {
            return Err(RelayError::MissingCoordinates);
        }

        let endpoint = request.endpoint().unwrap_or(self.default_endpoint.as_str());
        let url = forecast_url(endpoint, request)?;

        let body = self.provider.fetch(&url).await?;
        Ok(ForecastResponse::new(body, request.instance_id.clone()))
    }

    /// Handle one forecast request: the response on success, a single log line otherwise.
    pub async fn handle_forecast_request(
        &self,
        request: ForecastRequest,
    ) -> Option<ForecastResponse> {
        match self.fetch_forecast(&request).await {
            Ok(response) => {
                debug!(instance_id = ?request.instance_id, "Forecast received");
                Some(response)
            }
            Err(err) => {
                self.log_error(&err);
                None
            }
        }
    }

    /// Dispatch a host notification. Anything other than a forecast request is ignored.
    pub async fn handle_notification(&self, message: HostMessage) -> Option<HostMessage> {
        if message.notification != FORECAST_GET {
            debug!(notification = %message.notification, "Ignoring notification");
            return None;
        }

        let request: ForecastRequest = match serde_json::from_value(message.payload) {
            Ok(request) => request,
            Err(err) => {
                self.log_error(&format!("Invalid forecast request payload: {err}"));
                return None;
            }
        };

        self.handle_forecast_request(request)
            .await
            .map(HostMessage::forecast_data)
    }

    fn log_error(&self, err: &dyn std::fmt::Display) {
        error!(module = %self.module_name, "** ERROR ** {err}");
    }
}
