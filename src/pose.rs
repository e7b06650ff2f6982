use nalgebra::{Matrix3, Point2};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Below this value of `sqrt(r00^2 + r10^2)` a rotation is treated as gimbal
/// locked.
const SINGULARITY_THRESHOLD: f64 = 1e-6;

/// Pinhole camera intrinsics in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Intrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl Intrinsics {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Derives focal lengths from a field of view in radians and the
    /// principal point, which is assumed to be the image center.
    pub fn from_fov(fov: f64, cx: f64, cy: f64) -> Self {
        let half = (fov / 2.).tan();
        Self {
            fx: cx / half,
            fy: cy / half,
            cx,
            cy,
        }
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, 0., self.cx, //
            0., self.fy, self.cy, //
            0., 0., 1.,
        )
    }
}

impl Default for Intrinsics {
    /// A 640x480 camera with a horizontal field of view of 1.0123 rad.
    fn default() -> Self {
        Self::from_fov(1.0123, 320., 240.)
    }
}

/// Rotation between two views recovered from point correspondences.
#[derive(Clone, Debug, PartialEq)]
pub struct RelativePose {
    pub rotation: Matrix3<f64>,

    /// `true` for every correspondence consistent with the recovered pose.
    pub inliers: Vec<bool>,
}

/// Reasons a robust solver can fail to recover a relative pose.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NoSolution {
    #[error("expected at least {required} correspondences but got: {found}")]
    TooFewCorrespondences { found: usize, required: usize },
    #[error("correspondences are geometrically degenerate")]
    Degenerate,
    #[error("no model reached consensus")]
    NoConsensus,
}

/// Recovers the relative rotation between two views.
///
/// A failure is an expected outcome and is reported through [`NoSolution`],
/// not through a panic.
pub trait PoseSolver {
    /// `points1` and `points2` are index aligned pixel positions in the first
    /// and second view.
    fn recover_pose(
        &self,
        points1: &[Point2<f64>],
        points2: &[Point2<f64>],
        intrinsics: &Intrinsics,
        success_probability: f64,
        inlier_threshold: f64,
    ) -> Result<RelativePose, NoSolution>;
}

// In degrees
// X, Y, Z axis order
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl EulerAngles {
    /// Decomposes `r = Rz(yaw) * Ry(pitch) * Rx(roll)`.
    ///
    /// Near gimbal lock the yaw is fixed to zero and the roll absorbs the
    /// remaining rotation.
    pub fn from_matrix(r: &Matrix3<f64>) -> Self {
        let sy = (r[(0, 0)].powi(2) + r[(1, 0)].powi(2)).sqrt();
        let pitch = (-r[(2, 0)]).atan2(sy);

        let (roll, yaw) = if sy < SINGULARITY_THRESHOLD {
            ((-r[(1, 2)]).atan2(r[(1, 1)]), 0.)
        } else {
            (r[(2, 1)].atan2(r[(2, 2)]), r[(1, 0)].atan2(r[(0, 0)]))
        };

        Self {
            roll: roll.to_degrees(),
            pitch: pitch.to_degrees(),
            yaw: yaw.to_degrees(),
        }
    }
}
