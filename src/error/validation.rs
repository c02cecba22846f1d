use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid header format: '{value}'. Expected 'Key: Value'")]
    InvalidHeaderFormat { value: String },
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
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid threshold '{value}'. Expected '<metric>: <aggregation><op><value>'.")]
    InvalidThresholdFormat { value: String },
    #[error("Unknown threshold metric '{metric}'.")]
    UnknownThresholdMetric { metric: String },
    #[error("Aggregation '{aggregation}' is not valid for metric '{metric}'.")]
    InvalidThresholdAggregation { metric: String, aggregation: String },
    #[error("Invalid percentile '{value}'. Expected p(N) with 0 < N <= 100.")]
    InvalidPercentile { value: String },
    #[error("Invalid threshold value '{value}': {source}")]
    InvalidThresholdValue {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("Invalid series '{value}'. Expected 'label=path'.")]
    InvalidSeries { value: String },
    #[error("Invalid offset list '{value}': {source}")]
    InvalidOffsetList {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Offset list must not be empty.")]
    EmptyOffsetList,
    #[error("Unknown color '{value}'.")]
    UnknownColor { value: String },
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
