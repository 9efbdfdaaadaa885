use thiserror::Error;

/// Everything that can end a forecast request without a response.
///
/// None of these reach the host; the relay logs them and drops the request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("No API key configured. Get an API key at https://openweathermap.org/api/one-call-api")]
    MissingApiKey,

    #[error("Latitude and/or longitude not provided.")]
    MissingCoordinates,

    #[error("Invalid forecast endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Upstream answered with a non-2xx status.
    #[error("{0}")]
    UpstreamStatus(u16),

    #[error("{0}")]
    Transport(String),

    #[error("Failed to parse forecast JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Forecast response is not a JSON object")]
    NotAnObject,
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        RelayError::Transport(err.without_url().to_string())
    }
}
