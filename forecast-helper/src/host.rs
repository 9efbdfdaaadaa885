//! Newline-delimited JSON bridge to the host module.
//!
//! Each stdin line is a `{"notification": ..., "payload": ...}` message; each reply is
//! written as one line on stdout. Requests run concurrently and replies go out in
//! completion order.

use anyhow::{Context, Result};
use forecast_core::{ForecastProvider, ForecastRelay, HostMessage};
use std::sync::Arc;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    task::JoinSet,
};
use tracing::{error, warn};

pub async fn serve<P, R, W>(relay: Arc<ForecastRelay<P>>, input: R, mut output: W) -> Result<()>
where
    P: ForecastProvider + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut in_flight: JoinSet<Option<HostMessage>> = JoinSet::new();
    let mut open = true;

    while open || !in_flight.is_empty() {
        tokio::select! {
            line = lines.next_line(), if open => {
                match line.context("Failed to read from host")? {
                    Some(line) => dispatch(&relay, &mut in_flight, &line),
                    None => open = false,
                }
            }
            Some(done) = in_flight.join_next() => {
                match done {
                    Ok(Some(reply)) => send(&mut output, &reply).await?,
                    Ok(None) => {}
                    Err(err) => error!("Forecast task failed: {err}"),
                }
            }
        }
    }

    Ok(())
}

fn dispatch<P>(
    relay: &Arc<ForecastRelay<P>>,
    in_flight: &mut JoinSet<Option<HostMessage>>,
    line: &str,
) where
    P: ForecastProvider + 'static,
{
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    match serde_json::from_str::<HostMessage>(line) {
        Ok(message) => {
            let relay = Arc::clone(relay);
            in_flight.spawn(async move { relay.handle_notification(message).await });
        }
        Err(err) => warn!(
            module = %relay.module_name(),
            "Skipping unreadable host message: {err}"
        ),
    }
}

async fn send<W: AsyncWrite + Unpin>(output: &mut W, message: &HostMessage) -> Result<()> {
    let mut line = serde_json::to_vec(message).context("Failed to encode host message")?;
    line.push(b'\n');
    output.write_all(&line).await.context("Failed to write to host")?;
    output.flush().await.context("Failed to flush host output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use forecast_core::{Config, FORECAST_DATA, RelayError, Url};
    use serde_json::{Map, Value, json};

    /// Echoes the requested latitude back as the forecast body.
    #[derive(Debug)]
    struct EchoProvider;

    #[async_trait]
    impl ForecastProvider for EchoProvider {
        async fn fetch(&self, url: &Url) -> Result<Map<String, Value>, RelayError> {
            let lat = url
                .query_pairs()
                .find(|(k, _)| k == "lat")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default();
            if lat == "401" {
                return Err(RelayError::UpstreamStatus(401));
            }
            let mut body = Map::new();
            body.insert("lat".into(), Value::String(lat));
            Ok(body)
        }
    }

    fn request_line(lat: &str, instance_id: &str) -> String {
        json!({
            "notification": "OPENWEATHER_ONE_CALL_FORECAST_GET",
            "payload": {
                "apikey": "KEY",
                "latitude": lat,
                "longitude": "2",
                "units": "",
                "language": "en",
                "instanceId": instance_id,
            }
        })
        .to_string()
    }

    async fn run(input: String) -> Vec<Value> {
        let relay = Arc::new(ForecastRelay::new(EchoProvider, &Config::default()));
        let mut output = Vec::new();

        serve(relay, input.as_bytes(), &mut output).await.expect("serve");

        String::from_utf8(output)
            .expect("utf8")
            .lines()
            .map(|l| serde_json::from_str(l).expect("json line"))
            .collect()
    }

    #[tokio::test]
    async fn replies_once_per_valid_request() {
        let input = format!(
            "{}\n{}\n",
            request_line("10", "first"),
            request_line("20", "second")
        );

        let mut replies = run(input).await;
        replies.sort_by_key(|r| r["payload"]["instanceId"].as_str().map(str::to_string));

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["notification"], json!(FORECAST_DATA));
        assert_eq!(replies[0]["payload"], json!({"lat": "10", "instanceId": "first"}));
        assert_eq!(replies[1]["payload"], json!({"lat": "20", "instanceId": "second"}));
    }

    #[tokio::test]
    async fn failures_and_noise_produce_no_output() {
        let input = format!(
            "not json\n\n{}\n{}\n{}\n",
            json!({"notification": "SOMETHING_ELSE", "payload": {}}),
            request_line("401", "denied"),
            request_line("", "no-coords"),
        );

        assert!(run(input).await.is_empty());
    }

    #[tokio::test]
    async fn drains_in_flight_requests_at_eof() {
        let input = request_line("5", "last");

        let replies = run(input).await;

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["payload"]["instanceId"], json!("last"));
    }
}
