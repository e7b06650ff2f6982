use crate::{error::Error, params::VisionParams};
use nalgebra::Point2;

/// A packed 256-bit binary descriptor compared by Hamming distance.
pub type Descriptor = [u8; 32];

/// A salient image location found by a [`FeatureDetector`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    /// Location in pixel co-ordinates.
    pub position: Point2<f64>,

    /// Diameter of the neighbourhood the descriptor was computed over.
    pub size: f64,

    /// Dominant orientation of the neighbourhood in degrees.
    pub angle: f64,
}

impl Keypoint {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point2::new(x, y),
            size: 0.,
            angle: 0.,
        }
    }
}

/// Keypoints paired one to one with their descriptors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Features {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<Descriptor>,
}

impl Features {
    /// Returns an error if `keypoints` and `descriptors` differ in length.
    pub fn new(keypoints: Vec<Keypoint>, descriptors: Vec<Descriptor>) -> Result<Self, Error> {
        if keypoints.len() != descriptors.len() {
            return Err(Error::FeatureCountMismatch {
                keypoints: keypoints.len(),
                descriptors: descriptors.len(),
            });
        }

        Ok(Self {
            keypoints,
            descriptors,
        })
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Extracts keypoints and descriptors from an image of type `I`.
///
/// Implementations must be deterministic for a fixed set of parameters; the
/// detector reads the feature cap, pyramid scale factor and patch size from
/// `params`.
pub trait FeatureDetector<I: ?Sized> {
    type Error: std::error::Error + Send + Sync + 'static;

    fn detect(&self, image: &I, params: &VisionParams) -> Result<Features, Self::Error>;
}
