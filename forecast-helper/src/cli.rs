use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use forecast_core::{Config, Coordinate, ForecastRelay, ForecastRequest};
use inquire::Text;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

use crate::host;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast-helper", version, about = "OpenWeather One Call forecast helper")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Relay host notifications from stdin and write forecasts to stdout.
    Serve,

    /// Fetch one forecast and print it.
    Fetch {
        #[arg(long)]
        apikey: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        #[arg(long, allow_hyphen_values = true)]
        lon: String,

        /// "metric", "imperial", "standard" or empty.
        #[arg(long, default_value = "")]
        units: String,

        #[arg(long, default_value = "en")]
        lang: String,

        /// Overrides the configured default endpoint.
        #[arg(long)]
        endpoint: Option<String>,

        #[arg(long)]
        instance_id: Option<String>,
    },

    /// Update the helper configuration. Prompts when no flag is given.
    Configure {
        #[arg(long)]
        endpoint: Option<String>,

        #[arg(long)]
        module_name: Option<String>,

        #[arg(long)]
        log_filter: Option<String>,
    },

    /// Print the configuration file path.
    ConfigPath,
}

impl Cli {
    pub async fn run(self, mut config: Config) -> Result<()> {
        match self.command {
            Command::Serve => {
                let relay = Arc::new(ForecastRelay::from_config(&config));
                relay.start();
                let stdin = BufReader::new(tokio::io::stdin());
                host::serve(relay, stdin, tokio::io::stdout()).await?;
                info!("Host closed the connection, exiting");
            }
            Command::Fetch { apikey, lat, lon, units, lang, endpoint, instance_id } => {
                let request = ForecastRequest {
                    endpoint,
                    apikey: Some(apikey),
                    latitude: Some(Coordinate::Text(lat)),
                    longitude: Some(Coordinate::Text(lon)),
                    units: Some(units),
                    language: Some(lang),
                    instance_id: instance_id.map(Value::String),
                };

                let relay = ForecastRelay::from_config(&config);
                let response = relay
                    .fetch_forecast(&request)
                    .await
                    .context("Forecast request failed")?;

                let pretty = serde_json::to_string_pretty(&response)
                    .context("Failed to format forecast")?;
                println!("{pretty}");
            }
            Command::Configure { endpoint, module_name, log_filter } => {
                let interactive = endpoint.is_none() && module_name.is_none() && log_filter.is_none();

                let endpoint = match endpoint {
                    Some(e) => Some(e),
                    None if interactive => Some(
                        Text::new("Default forecast endpoint:")
                            .with_default(&config.default_endpoint)
                            .prompt()
                            .context("Failed to read endpoint")?,
                    ),
                    None => None,
                };
                let module_name = match module_name {
                    Some(m) => Some(m),
                    None if interactive => Some(
                        Text::new("Module name:")
                            .with_default(&config.module_name)
                            .prompt()
                            .context("Failed to read module name")?,
                    ),
                    None => None,
                };

                if let Some(endpoint) = endpoint {
                    config.set_default_endpoint(&endpoint)?;
                }
                if let Some(name) = module_name.filter(|n| !n.trim().is_empty()) {
                    config.module_name = name.trim().to_string();
                }
                if let Some(filter) = log_filter {
                    config.log_filter = filter;
                }

                config.save()?;
                println!("Saved configuration to {}", Config::config_file_path()?.display());
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fetch_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "forecast-helper",
            "fetch",
            "--apikey",
            "KEY",
            "--lat",
            "-33.87",
            "--lon",
            "151.21",
        ])
        .expect("valid args");

        let Command::Fetch { lat, lon, units, lang, endpoint, .. } = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(lat, "-33.87");
        assert_eq!(lon, "151.21");
        assert_eq!(units, "");
        assert_eq!(lang, "en");
        assert!(endpoint.is_none());
    }

    #[test]
    fn fetch_requires_api_key() {
        let err = Cli::try_parse_from(["forecast-helper", "fetch", "--lat", "1", "--lon", "2"])
            .unwrap_err();
        assert!(err.to_string().contains("--apikey"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
