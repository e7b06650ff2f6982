//! Circular arithmetic on headings expressed in degrees.

use crate::error::Error;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use uom::si::{angle::degree, f64::Angle};

const FULL_TURN: f64 = 360.0;
const HALF_TURN: f64 = 180.0;

/// Returns the signed minimal difference `a - b` wrapped into (-180, 180].
///
/// The result is antisymmetric, `signed_circular_diff(a, b) ==
/// -signed_circular_diff(b, a)`, except when the angles are half a turn apart
/// where both orders give 180.
pub fn signed_circular_diff(a: f64, b: f64) -> f64 {
    // `%` keeps the sign of the dividend and is exact for floats.
    let diff = (a - b) % FULL_TURN;
    if diff > HALF_TURN {
        diff - FULL_TURN
    } else if diff <= -HALF_TURN {
        diff + FULL_TURN
    } else {
        diff
    }
}

/// Maps `degrees` into [0, 360) keeping it congruent modulo a full turn.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(FULL_TURN);

    // Tiny negative inputs round up to exactly one full turn.
    if wrapped >= FULL_TURN { 0.0 } else { wrapped }
}

/// Computes the weighted mean of `(value, weight)` samples.
///
/// Returns [`Error::DegenerateWeights`] if the weights sum to zero, including
/// when there are no samples at all.
pub fn weighted_average<I>(samples: I) -> Result<f64, Error>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (weighted_sum, weight_sum) = samples
        .into_iter()
        .fold((0.0, 0.0), |(weighted_sum, weight_sum), (value, weight)| {
            (weighted_sum + value * weight, weight_sum + weight)
        });

    if weight_sum == 0.0 {
        return Err(Error::DegenerateWeights);
    }

    Ok(weighted_sum / weight_sum)
}

/// Describes the heading of the platform.
///
/// The heading must be between 0.0 inclusive and 360.0 exclusive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Heading {
    degrees: f64,
}

impl Heading {
    /// Creates a new `Heading` from `degrees`.
    ///
    /// Returns `None` if `degrees` is not in [0, 360).
    pub fn from_degrees(degrees: f64) -> Option<Self> {
        if !is_valid(degrees) {
            return None;
        }

        Some(Self { degrees })
    }

    /// Creates a new `Heading` from `degrees` wrapped into [0, 360).
    ///
    /// Returns `None` if `degrees` is not finite.
    pub fn from_degrees_wrapped(degrees: f64) -> Option<Self> {
        if !degrees.is_finite() {
            return None;
        }

        Some(Self {
            degrees: normalize_degrees(degrees),
        })
    }

    /// Creates a new `Heading` from `angle`.
    ///
    /// Returns `None` if `angle` is not in [0, 360) degrees.
    pub fn from_angle(angle: Angle) -> Option<Self> {
        Self::from_degrees(angle.get::<degree>())
    }

    /// Creates a new `Heading` from `angle` wrapped into [0, 360) degrees.
    ///
    /// Returns `None` if `angle` is not finite.
    pub fn from_angle_wrapped(angle: Angle) -> Option<Self> {
        Self::from_degrees_wrapped(angle.get::<degree>())
    }

    /// Returns the heading rotated by `degrees`, wrapping around north.
    ///
    /// Returns `None` if `degrees` is not finite.
    pub fn offset(self, degrees: f64) -> Option<Self> {
        Self::from_degrees_wrapped(self.degrees + degrees)
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    pub fn angle(&self) -> Angle {
        Angle::new::<degree>(self.degrees)
    }
}

/// Returns `true` if `degrees` is in [0, 360), `false` otherwise.
fn is_valid(degrees: f64) -> bool {
    (0.0..FULL_TURN).contains(&degrees)
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} deg", self.degrees)
    }
}
