//! Aggregation of per-query estimates into timing and error statistics.

use crate::{angle::signed_circular_diff, estimator::Estimate};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

/// One estimated query with its ground truth.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub estimate: Estimate,

    /// True heading in degrees.
    pub truth: f64,

    pub elapsed: Duration,
}

impl Sample {
    pub fn new(estimate: Estimate, truth: f64, elapsed: Duration) -> Self {
        Self {
            estimate,
            truth,
            elapsed,
        }
    }

    /// Absolute angular error in degrees along the shorter arc.
    pub fn error(&self) -> f64 {
        signed_circular_diff(self.truth, self.estimate.heading.degrees()).abs()
    }
}

/// Collects samples of a batch run.
#[derive(Clone, Debug, Default)]
pub struct Tally {
    samples: Vec<Sample>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of estimates that fell back to a reference label.
    pub fn fails(&self) -> usize {
        self.samples
            .iter()
            .filter(|sample| sample.estimate.is_fallback())
            .count()
    }

    pub fn summary(&self) -> Summary {
        let (time_mean_ms, time_std_ms) = mean_std(
            self.samples
                .iter()
                .map(|sample| sample.elapsed.as_secs_f64() * 1000.),
        );
        let (error_mean_deg, error_std_deg) = mean_std(self.samples.iter().map(Sample::error));

        Summary {
            samples: self.samples.len(),
            fails: self.fails(),
            time_mean_ms,
            time_std_ms,
            error_mean_deg,
            error_std_deg,
        }
    }
}

impl Extend<Sample> for Tally {
    fn extend<T: IntoIterator<Item = Sample>>(&mut self, iter: T) {
        self.samples.extend(iter);
    }
}

impl FromIterator<Sample> for Tally {
    fn from_iter<T: IntoIterator<Item = Sample>>(iter: T) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

/// Mean and population standard deviation of a batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Summary {
    pub samples: usize,
    pub fails: usize,
    pub time_mean_ms: f64,
    pub time_std_ms: f64,
    pub error_mean_deg: f64,
    pub error_std_deg: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0}±{:.0} ms; {:.2}±{:.2} deg; {}/{} fails",
            self.time_mean_ms,
            self.time_std_ms,
            self.error_mean_deg,
            self.error_std_deg,
            self.fails,
            self.samples
        )
    }
}

/// Returns zeros for an empty input.
fn mean_std<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let (count, sum, sum_sq) = values.fold((0usize, 0., 0.), |(count, sum, sum_sq), value| {
        (count + 1, sum + value, sum_sq + value * value)
    });

    if count == 0 {
        return (0., 0.);
    }

    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64 - mean * mean).max(0.);
    (mean, variance.sqrt())
}
