use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThresholdError {
    #[error("Threshold expression must not be empty.")]
    Empty,
    #[error("Threshold '{expression}' has no comparison operator.")]
    MissingOperator { expression: String },
    #[error("Threshold '{expression}' uses unknown aggregation '{aggregation}'.")]
    UnknownAggregation {
        expression: String,
        aggregation: String,
    },
    #[error("Threshold '{expression}' has invalid bound '{value}'.")]
    InvalidBound { expression: String, value: String },
    #[error("Threshold '{expression}' has invalid percentile '{value}'.")]
    InvalidPercentile { expression: String, value: String },
    #[error("Threshold '{expression}': aggregation '{aggregation}' does not apply to metric '{metric}'.")]
    AggregationMismatch {
        expression: String,
        aggregation: String,
        metric: String,
    },
    #[error("Unknown metric '{value}'.")]
    UnknownMetric { value: String },
    #[error("Invalid metric selector '{value}'.")]
    InvalidSelector { value: String },
    #[error("Series '{selector}' is never recorded; group_duration needs a group tag, iteration metrics take none.")]
    UnrecordedSeries { selector: String },
}
