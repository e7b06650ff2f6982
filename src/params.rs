use crate::error::ConfigError;
use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Tuning parameters for feature detection, descriptor matching and relative
/// pose recovery.
///
/// Every field is checked against the matching associated range when the
/// value is built, so a `VisionParams` is always within bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawVisionParams"))]
pub struct VisionParams {
    feature_count: u32,
    pyramid_scale_factor: f64,
    patch_size: u32,
    matcher_search_budget: u32,
    pose_success_probability: f64,
    pose_inlier_threshold: f64,
}

impl VisionParams {
    /// Maximum number of features retained per image.
    pub const FEATURE_COUNT: RangeInclusive<u32> = 100..=5000;

    /// Decimation ratio between two levels of the detector's image pyramid.
    ///
    /// A ratio of 2 is the classical pyramid where each level has 4x fewer
    /// pixels. Large ratios degrade matching, ratios close to 1 need many
    /// levels to cover the same scale range.
    pub const PYRAMID_SCALE_FACTOR: RangeInclusive<f64> = 1.01..=2.0;

    /// Size in pixels of the patch used by the descriptor.
    pub const PATCH_SIZE: RangeInclusive<u32> = 10..=50;

    /// Number of candidates an approximate matcher may visit per query.
    pub const MATCHER_SEARCH_BUDGET: RangeInclusive<u32> = 1..=100;

    /// Desired confidence of the robust relative pose estimate.
    pub const POSE_SUCCESS_PROBABILITY: RangeInclusive<f64> = 0.9..=0.9999;

    /// Maximum epipolar distance in pixels for a correspondence to be an inlier.
    pub const POSE_INLIER_THRESHOLD: RangeInclusive<f64> = 1.0..=10.0;

    /// Creates a new `VisionParams`.
    ///
    /// Returns an error naming the first field outside of its range.
    pub fn try_new(
        feature_count: u32,
        pyramid_scale_factor: f64,
        patch_size: u32,
        matcher_search_budget: u32,
        pose_success_probability: f64,
        pose_inlier_threshold: f64,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            feature_count: check("feature_count", feature_count, Self::FEATURE_COUNT)?,
            pyramid_scale_factor: check(
                "pyramid_scale_factor",
                pyramid_scale_factor,
                Self::PYRAMID_SCALE_FACTOR,
            )?,
            patch_size: check("patch_size", patch_size, Self::PATCH_SIZE)?,
            matcher_search_budget: check(
                "matcher_search_budget",
                matcher_search_budget,
                Self::MATCHER_SEARCH_BUDGET,
            )?,
            pose_success_probability: check(
                "pose_success_probability",
                pose_success_probability,
                Self::POSE_SUCCESS_PROBABILITY,
            )?,
            pose_inlier_threshold: check(
                "pose_inlier_threshold",
                pose_inlier_threshold,
                Self::POSE_INLIER_THRESHOLD,
            )?,
        })
    }

    /// Draws every field uniformly from its valid range.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            feature_count: rng.random_range(Self::FEATURE_COUNT),
            pyramid_scale_factor: rng.random_range(Self::PYRAMID_SCALE_FACTOR),
            patch_size: rng.random_range(Self::PATCH_SIZE),
            matcher_search_budget: rng.random_range(Self::MATCHER_SEARCH_BUDGET),
            pose_success_probability: rng.random_range(Self::POSE_SUCCESS_PROBABILITY),
            pose_inlier_threshold: rng.random_range(Self::POSE_INLIER_THRESHOLD),
        }
    }

    pub fn feature_count(&self) -> u32 {
        self.feature_count
    }

    pub fn pyramid_scale_factor(&self) -> f64 {
        self.pyramid_scale_factor
    }

    pub fn patch_size(&self) -> u32 {
        self.patch_size
    }

    pub fn matcher_search_budget(&self) -> u32 {
        self.matcher_search_budget
    }

    pub fn pose_success_probability(&self) -> f64 {
        self.pose_success_probability
    }

    pub fn pose_inlier_threshold(&self) -> f64 {
        self.pose_inlier_threshold
    }
}

fn check<T>(name: &'static str, value: T, range: RangeInclusive<T>) -> Result<T, ConfigError>
where
    T: Copy + PartialOrd + Into<f64>,
{
    if !range.contains(&value) {
        return Err(ConfigError::OutOfRange {
            name,
            value: value.into(),
            min: (*range.start()).into(),
            max: (*range.end()).into(),
        });
    }

    Ok(value)
}

impl Default for VisionParams {
    /// Returns the best parameters found by random search over the ranges.
    fn default() -> Self {
        Self {
            feature_count: 1230,
            pyramid_scale_factor: 1.8847186328577767,
            patch_size: 44,
            matcher_search_budget: 18,
            pose_success_probability: 0.9827160798859101,
            pose_inlier_threshold: 7.0,
        }
    }
}

impl Distribution<VisionParams> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> VisionParams {
        VisionParams::random(rng)
    }
}

/// Unchecked mirror of [`VisionParams`] used to validate deserialized input.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawVisionParams {
    feature_count: u32,
    pyramid_scale_factor: f64,
    patch_size: u32,
    matcher_search_budget: u32,
    pose_success_probability: f64,
    pose_inlier_threshold: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawVisionParams> for VisionParams {
    type Error = ConfigError;

    fn try_from(raw: RawVisionParams) -> Result<Self, Self::Error> {
        Self::try_new(
            raw.feature_count,
            raw.pyramid_scale_factor,
            raw.patch_size,
            raw.matcher_search_budget,
            raw.pose_success_probability,
            raw.pose_inlier_threshold,
        )
    }
}
