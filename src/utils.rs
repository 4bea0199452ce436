use std::{io::Write, time};

use aws_config::{
    meta::region::RegionProviderChain, timeout::TimeoutConfig, BehaviorVersion, SdkConfig,
};
use chrono::{DateTime, Utc};
use lambda_runtime::Context;
use serde::Serialize;
use tracing::{debug, error, info, level_filters::LevelFilter, trace, warn, Level, Subscriber};
use tracing_subscriber::{fmt::MakeWriter, EnvFilter};

use crate::errors::Error;

fn json_subscriber<W>(level: LevelFilter, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::default().add_directive(level.into()))
        .with_writer(writer)
        .json()
        .finish()
}

/// Installs the JSON subscriber on stderr; stdout is kept for output records.
pub fn setup_tracing(level: LevelFilter) {
    let subscriber = json_subscriber(level, std::io::stderr);
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");
}

/// Logs the configured level at that same level so the line is never filtered out.
pub fn announce_log_level(level: LevelFilter) {
    match level.into_level() {
        Some(Level::TRACE) => trace!("log level is set to {}", level),
        Some(Level::DEBUG) => debug!("log level is set to {}", level),
        Some(Level::INFO) => info!("log level is set to {}", level),
        Some(Level::WARN) => warn!("log level is set to {}", level),
        Some(Level::ERROR) => error!("log level is set to {}", level),
        _ => {}
    }
}

pub async fn setup_sdk_config() -> SdkConfig {
    let region_provider = RegionProviderChain::default_provider().or_else("eu-west-1");
    let timeout_config = TimeoutConfig::builder()
        .operation_timeout(time::Duration::from_secs(2))
        .operation_attempt_timeout(time::Duration::from_secs(2))
        .read_timeout(time::Duration::from_secs(2))
        .connect_timeout(time::Duration::from_secs(2))
        .build();

    aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .timeout_config(timeout_config)
        .load()
        .await
}

/// Invocation deadline handed over by the runtime, in milliseconds since the epoch.
pub fn deadline(context: &Context) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(i64::try_from(context.deadline).ok()?)
}

/// Writes `value` as one JSON line.
pub fn print_json<W, T>(out: &mut W, value: &T) -> Result<(), Error>
where
    W: Write,
    T: Serialize + ?Sized,
{
    let line = serde_json::to_string(value)?;
    writeln!(out, "{}", line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use chrono::{NaiveDate, TimeZone};
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct WithDates {
        received_at: DateTime<Utc>,
        published: NaiveDate,
        data: serde_json::Value,
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn print_json_writes_one_line() {
        let mut out = Vec::new();
        print_json(&mut out, &json!({ "getBook": { "id": "42" } })).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"getBook\":{\"id\":\"42\"}}\n"
        );
    }

    #[test]
    fn print_json_renders_dates_as_iso8601() {
        let value = WithDates {
            received_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            published: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
            data: json!({ "createBook": { "id": "1" } }),
        };

        let mut out = Vec::new();
        print_json(&mut out, &value).unwrap();

        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["received_at"], "2024-01-02T03:04:05Z");
        assert_eq!(printed["published"], "1965-08-01");
        assert_eq!(printed["data"]["createBook"]["id"], "1");
    }

    #[test]
    fn deadline_is_read_as_utc() {
        let mut context = Context::default();
        context.deadline = 1_704_067_200_000;

        assert_eq!(
            deadline(&context).unwrap().to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[rstest]
    #[case(LevelFilter::ERROR)]
    #[case(LevelFilter::WARN)]
    #[case(LevelFilter::INFO)]
    #[case(LevelFilter::DEBUG)]
    fn announced_level_passes_its_own_filter(#[case] level: LevelFilter) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = json_subscriber(level, move || writer.clone());

        tracing::subscriber::with_default(subscriber, || announce_log_level(level));

        assert!(captured.contents().contains("log level is set to"));
    }

    #[test]
    fn info_lines_are_filtered_at_error_level() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = json_subscriber(LevelFilter::ERROR, move || writer.clone());

        tracing::subscriber::with_default(subscriber, || info!("request received"));

        assert!(captured.contents().is_empty());
    }
}
