//! Incremental mean / standard-deviation tracker.
//!
//! Keeps only the count, running sum and running sum-of-squares, so every
//! `add` is O(1) and the accumulator has a fixed footprint.  Used by the
//! controller to summarise sleeve readings between telemetry reports.
//!
//! Statistics are population statistics: `std_dev = sqrt(sum_sq/n - mean²)`.
//! Requesting either from an empty tracker is an error, never a division
//! by zero.

use log::warn;

use crate::error::StatsError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatTracker {
    count: u64,
    sum: f64,
    sum_sq: f64,
}

impl StatTracker {
    pub const fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    /// Add one sample.  Any type losslessly convertible to `f64` is accepted.
    ///
    /// A full tracker drops the sample rather than let the count drift
    /// from the sums.
    pub fn add(&mut self, sample: impl Into<f64>) {
        let Some(count) = self.count.checked_add(1) else {
            warn!("stat tracker full, sample dropped");
            return;
        };
        let x = sample.into();
        self.count = count;
        self.sum += x;
        self.sum_sq += x * x;
    }

    /// Fold another tracker's samples into this one.  Refused if the
    /// combined count would overflow.
    pub fn merge(&mut self, other: &Self) {
        let Some(count) = self.count.checked_add(other.count) else {
            warn!("stat tracker full, merge of {} samples dropped", other.count);
            return;
        };
        self.count = count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn mean(&self) -> Result<f64, StatsError> {
        if self.count == 0 {
            return Err(StatsError::NoSamples);
        }
        Ok(self.sum / self.count as f64)
    }

    pub fn std_dev(&self) -> Result<f64, StatsError> {
        let mean = self.mean()?;
        let variance = self.sum_sq / self.count as f64 - mean * mean;
        // Rounding can push a zero variance slightly negative.
        Ok(variance.max(0.0).sqrt())
    }

    /// Drop every sample.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
