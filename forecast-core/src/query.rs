use reqwest::Url;

use crate::{error::RelayError, model::ForecastRequest};

/// Build the One Call URL for `request` against `endpoint`.
///
/// Query order is `appid`, `lat`, `lon`, `units` (only when set), `lang`.
/// Callers validate the request first; missing coordinates here are an error, not a panic.
pub fn forecast_url(endpoint: &str, request: &ForecastRequest) -> Result<Url, RelayError> {
    let api_key = request.api_key().ok_or(RelayError::MissingApiKey)?;
    let (lat, lon) = request.coordinates().ok_or(RelayError::MissingCoordinates)?;

    let mut url = Url::parse(endpoint).map_err(|e| RelayError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("appid", api_key)
            .append_pair("lat", &lat.to_string())
            .append_pair("lon", &lon.to_string());
        if let Some(units) = request.units() {
            query.append_pair("units", units);
        }
        query.append_pair("lang", request.language());
    }

    Ok(url)
}
