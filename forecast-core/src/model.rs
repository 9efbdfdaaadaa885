use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Host notification asking for a fresh forecast.
pub const FORECAST_GET: &str = "OPENWEATHER_ONE_CALL_FORECAST_GET";

/// Notification sent back to the host with the forecast body.
pub const FORECAST_DATA: &str = "OPENWEATHER_ONE_CALL_FORECAST_DATA";

/// A message exchanged with the host module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMessage {
    pub notification: String,
    #[serde(default)]
    pub payload: Value,
}

impl HostMessage {
    pub fn forecast_data(response: ForecastResponse) -> Self {
        Self {
            notification: FORECAST_DATA.to_string(),
            payload: response.into_value(),
        }
    }
}

/// Latitude or longitude as sent by the host: either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(serde_json::Number),
    Text(String),
}

impl Coordinate {
    pub fn is_blank(&self) -> bool {
        match self {
            Coordinate::Number(_) => false,
            Coordinate::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Number(n) => write!(f, "{n}"),
            Coordinate::Text(s) => f.write_str(s.trim()),
        }
    }
}

impl From<f64> for Coordinate {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Coordinate::Number)
            .unwrap_or_else(|| Coordinate::Text(value.to_string()))
    }
}

impl From<&str> for Coordinate {
    fn from(value: &str) -> Self {
        Coordinate::Text(value.to_string())
    }
}

/// Payload of a `OPENWEATHER_ONE_CALL_FORECAST_GET` notification.
///
/// Every field is optional on the wire; the relay decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub apikey: Option<String>,
    #[serde(default)]
    pub latitude: Option<Coordinate>,
    #[serde(default)]
    pub longitude: Option<Coordinate>,
    /// `metric`, `imperial`, `standard` or blank.
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Opaque token the host uses to route the response back to its widget.
    /// `None` when the field is absent; an explicit `null` is `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub instance_id: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl ForecastRequest {
    pub fn api_key(&self) -> Option<&str> {
        self.apikey.as_deref().filter(|k| !k.is_empty())
    }

    pub fn coordinates(&self) -> Option<(&Coordinate, &Coordinate)> {
        match (&self.latitude, &self.longitude) {
            (Some(lat), Some(lon)) if !lat.is_blank() && !lon.is_blank() => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or_default()
    }

    /// The request endpoint, unless it is missing or blank.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }
}

/// Upstream forecast body with the request's `instanceId` attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ForecastResponse(Map<String, Value>);

impl ForecastResponse {
    /// Attach `instance_id` to an upstream body. An absent id is left off.
    pub fn new(mut body: Map<String, Value>, instance_id: Option<Value>) -> Self {
        if let Some(instance_id) = instance_id {
            body.insert("instanceId".to_string(), instance_id);
        }
        Self(body)
    }

    pub fn instance_id(&self) -> Option<&Value> {
        self.0.get("instanceId")
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
