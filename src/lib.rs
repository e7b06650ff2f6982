// #![warn(missing_docs)]

//! Heading estimation against labelled reference views.
//!
//! A [`catalog::Catalog`] holds the features of reference images taken at
//! known headings. A query image is scored against every reference with a
//! ratio-tested nearest-neighbour match count, and an
//! [`estimator::Strategy`] turns those scores into a [`angle::Heading`].

pub mod angle;
pub mod catalog;
#[allow(missing_docs)]
pub mod error;
pub mod estimator;
pub mod features;
pub mod matcher;
pub mod params;
pub mod pose;
pub mod scorer;
pub mod stats;

pub mod prelude {
    pub use crate::{
        angle::Heading,
        catalog::{Catalog, Reference},
        error::{ConfigError, Error},
        estimator::{Estimate, HeadingEstimator, Strategy},
        features::{Descriptor, FeatureDetector, Features, Keypoint},
        matcher::{BruteForceHamming, DescriptorMatcher, Neighbor},
        params::VisionParams,
        pose::{EulerAngles, Intrinsics, NoSolution, PoseSolver, RelativePose},
        stats::{Summary, Tally},
    };
}
