use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing target host (set --host or provide 'host' in config).")]
    MissingHost,
    #[error("Max attempts {value} exceeds the supported maximum of {max}.")]
    MaxAttemptsTooLarge { value: u64, max: u32 },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Invalid boolean '{value}'.")]
    InvalidBoolean { value: String },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid percentile '{value}': {source}")]
    InvalidPercentile {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Percentile {value} is out of range (0-100).")]
    PercentileOutOfRange { value: u64 },
    #[error("At least one percentile is required.")]
    PercentilesEmpty,
    #[error("Backoff ceiling {max_ms}ms is below the initial delay {initial_ms}ms.")]
    BackoffCeilingBelowInitial { initial_ms: u128, max_ms: u128 },
    #[error("Invalid listen address '{value}': {source}")]
    InvalidListenAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
