use hdrhistogram::Histogram;

use crate::error::MetricsError;

/// Significant figures kept by every trend histogram.
const SIGNIFICANT_FIGURES: u8 = 3;

/// Duration histogram in microseconds.
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new auto-resizing histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let hist = Histogram::<u64>::new(SIGNIFICANT_FIGURES).map_err(|err| {
            MetricsError::Histogram {
                context: "create",
                source: Box::new(err),
            }
        })?;
        Ok(Self { hist })
    }

    /// Record a duration in microseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, micros: u64) -> Result<(), MetricsError> {
        let value = micros.max(1);
        self.hist
            .record(value)
            .map_err(|err| MetricsError::Histogram {
                context: "record",
                source: Box::new(err),
            })
    }

    /// Value at the given percentile (0..=100), or 0 when empty.
    #[must_use]
    pub fn value_at_percentile(&self, percentile: f64) -> u64 {
        if self.count() == 0 {
            return 0;
        }
        self.hist.value_at_percentile(percentile)
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}
