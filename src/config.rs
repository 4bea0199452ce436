//! # Function configuration read from the Lambda environment.

use std::env;
use std::str::FromStr;

use reqwest::Url;
use tracing::level_filters::LevelFilter;

use crate::errors::Error;

pub const ENDPOINT_VAR: &str = "appsync_endpoint";
pub const LOG_LEVEL_VAR: &str = "log_level";
pub const SCHEMA_FETCH_VAR: &str = "schema_fetch";

/// When the GraphQL client introspects the remote schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaFetch {
    /// Introspect every time a client is built, i.e. once per invocation.
    #[default]
    Always,
    /// Introspect on first use and keep the schema for the life of the process.
    Once,
    /// Never introspect; operations are sent without validation.
    Never,
}

impl FromStr for SchemaFetch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(SchemaFetch::Always),
            "once" => Ok(SchemaFetch::Once),
            "never" => Ok(SchemaFetch::Never),
            other => Err(Error::config(format!(
                "{} must be one of always, once, never (got {:?})",
                SCHEMA_FETCH_VAR, other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Url,
    /// `None` when `log_level` is unset; the function then logs errors only.
    pub log_level: Option<LevelFilter>,
    pub schema_fetch: SchemaFetch,
}

impl Config {
    pub fn from_env() -> Result<Config, Error> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_endpoint = lookup(ENDPOINT_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::config(format!("{} must be set", ENDPOINT_VAR)))?;
        let endpoint = Url::parse(raw_endpoint.trim())
            .map_err(|e| Error::config(format!("{} is not a valid URL: {}", ENDPOINT_VAR, e)))?;
        if endpoint.host_str().is_none() {
            return Err(Error::config(format!("{} has no host", ENDPOINT_VAR)));
        }

        let log_level = lookup(LOG_LEVEL_VAR)
            .map(|level| parse_level(&level))
            .transpose()?;

        let schema_fetch = match lookup(SCHEMA_FETCH_VAR) {
            Some(value) => value.parse()?,
            None => SchemaFetch::default(),
        };

        Ok(Config {
            endpoint,
            log_level,
            schema_fetch,
        })
    }

    /// Lowest severity that gets logged.
    pub fn effective_level(&self) -> LevelFilter {
        self.log_level.unwrap_or(LevelFilter::ERROR)
    }
}

/// Accepts tracing level names as well as the Python logging names the
/// function has historically been configured with.
fn parse_level(raw: &str) -> Result<LevelFilter, Error> {
    let normalized = match raw.trim().to_ascii_uppercase().as_str() {
        "WARNING" => "warn".to_owned(),
        "CRITICAL" | "FATAL" => "error".to_owned(),
        "NOTSET" => "trace".to_owned(),
        other => other.to_ascii_lowercase(),
    };
    normalized
        .parse::<LevelFilter>()
        .map_err(|_| Error::config(format!("{} has unknown level {:?}", LOG_LEVEL_VAR, raw)))
}
