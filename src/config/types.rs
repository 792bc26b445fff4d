use std::time::Duration;

use serde::Deserialize;

use crate::args::{OutputFormat, parse_duration};
use crate::error::ValidationError;

/// Contents of `gbload.toml` / `gbload.json`. Every field mirrors a CLI
/// option; options given on the command line take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(alias = "url")]
    pub host: Option<String>,
    pub requests: Option<u64>,
    #[serde(alias = "workers")]
    pub threads: Option<usize>,
    pub percentiles: Option<Vec<u64>>,
    pub request_timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub backoff_initial: Option<DurationValue>,
    pub backoff_max: Option<DurationValue>,
    pub max_attempts: Option<u64>,
    pub deadline: Option<DurationValue>,
    pub seed: Option<u64>,
    pub output_format: Option<OutputFormat>,
    pub export_json: Option<String>,
    pub verbose: Option<bool>,
    pub serve: Option<ServeConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    pub listen: Option<String>,
    pub recent: Option<usize>,
}

/// A duration written either as whole seconds or as text with a unit
/// (`"250ms"`, `"5s"`, `"2m"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration(text),
        }
    }
}
