use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, TimeZone};
use forecast_core::Config;
use std::fmt::{self, Display, Write as _};
use tracing::{
    Event, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    EnvFilter,
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer, time::FormatTime},
    registry::LookupSpan,
};

/// Timestamps in the host log style, e.g. `19-Oct-26 14:03`.
struct MirrorTime;

impl FormatTime for MirrorTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        w.write_str(&mirror_timestamp(&Local::now()))
    }
}

fn mirror_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%-d-%b-%y %H:%M").to_string()
}

/// Host log layout: `[module] <time> <message> key=value...`.
///
/// The `module` field moves to the front; events without one start at the timestamp.
struct MirrorFormat<T> {
    timer: T,
}

#[derive(Default)]
struct MirrorFields {
    module: Option<String>,
    message: String,
    rest: Vec<(&'static str, String)>,
}

impl MirrorFields {
    fn record(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = value,
            "module" => self.module = Some(value),
            name => self.rest.push((name, value)),
        }
    }
}

impl Visit for MirrorFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, format!("{value:?}"));
    }
}

impl<S, N, T> FormatEvent<S, N> for MirrorFormat<T>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
    T: FormatTime,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut fields = MirrorFields::default();
        event.record(&mut fields);

        if let Some(module) = &fields.module {
            write!(writer, "[{module}] ")?;
        }
        self.timer.format_time(&mut writer)?;
        write!(writer, " {}", fields.message)?;
        for (name, value) in &fields.rest {
            write!(writer, " {name}={value}")?;
        }
        writeln!(writer)
    }
}

/// Install the global subscriber. Logs go to stderr; stdout belongs to the host.
pub fn init(config: &Config) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)
            .with_context(|| format!("Invalid log filter '{}'", config.log_filter))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(MirrorFormat { timer: MirrorTime })
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {e}"))
}
