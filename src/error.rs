use thiserror::Error;

/// Boxed error raised by an external detection or matching capability.
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("weighted average is undefined when the weights sum to zero")]
    DegenerateWeights,

    #[error("expected label angle in range [0, 360) but got: {degrees}")]
    InvalidLabel { degrees: f64 },

    #[error("a catalog needs at least one reference")]
    EmptyCatalog,

    #[error("got {keypoints} keypoints but {descriptors} descriptors")]
    FeatureCountMismatch {
        keypoints: usize,
        descriptors: usize,
    },

    #[error("feature extraction failed")]
    Extraction(#[source] CapabilityError),

    #[error("descriptor matching failed")]
    Matching(#[source] CapabilityError),
}

impl Error {
    pub(crate) fn extraction<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Extraction(Box::new(err))
    }

    pub(crate) fn matching<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Matching(Box::new(err))
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("expected {name} in range [{min}, {max}] but got: {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
