use crate::{
    angle::Heading,
    error::Error,
    features::{Descriptor, FeatureDetector, Features, Keypoint},
    params::VisionParams,
};
use tracing::debug;

/// A reference view with a known heading.
#[derive(Clone, Debug, PartialEq)]
pub struct Reference {
    heading: Heading,
    features: Features,
}

impl Reference {
    pub fn new(heading: Heading, features: Features) -> Self {
        Self { heading, features }
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        self.features.keypoints()
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        self.features.descriptors()
    }
}

/// An immutable, ordered set of reference views.
///
/// A catalog is built once and only read afterwards, so it can be shared by
/// reference across threads estimating different queries.
#[derive(Clone, Debug)]
pub struct Catalog {
    params: VisionParams,
    references: Vec<Reference>,
}

impl Catalog {
    /// Detects features in every reference image with `detector`.
    ///
    /// `entries` pairs each image with its heading label in degrees. The
    /// catalog keeps the order of `entries`. The first detection failure
    /// aborts the build.
    pub fn build<I, D, E>(entries: E, params: VisionParams, detector: &D) -> Result<Self, Error>
    where
        D: FeatureDetector<I>,
        E: IntoIterator<Item = (I, f64)>,
    {
        let references = entries
            .into_iter()
            .map(|(image, degrees)| {
                let heading =
                    Heading::from_degrees(degrees).ok_or(Error::InvalidLabel { degrees })?;
                let features = detector
                    .detect(&image, &params)
                    .map_err(Error::extraction)?;

                debug!(%heading, features = features.len(), "built reference");
                Ok(Reference::new(heading, features))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Self::from_references(references, params)
    }

    /// Wraps already detected references.
    pub fn from_references(
        references: Vec<Reference>,
        params: VisionParams,
    ) -> Result<Self, Error> {
        if references.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        Ok(Self { params, references })
    }

    pub fn params(&self) -> &VisionParams {
        &self.params
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, fmt};

    #[derive(Debug)]
    struct Unreadable;

    impl fmt::Display for Unreadable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "unreadable image")
        }
    }

    impl std::error::Error for Unreadable {}

    /// Treats an image as the x co-ordinate of its only keypoint.
    #[derive(Default)]
    struct CountingDetector {
        calls: Cell<usize>,
    }

    impl FeatureDetector<f64> for CountingDetector {
        type Error = Unreadable;

        fn detect(&self, image: &f64, _params: &VisionParams) -> Result<Features, Self::Error> {
            self.calls.set(self.calls.get() + 1);
            if image.is_nan() {
                return Err(Unreadable);
            }

            Ok(Features::new(vec![Keypoint::at(*image, 0.)], vec![[0; 32]])
                .expect("one keypoint per descriptor"))
        }
    }

    #[test]
    fn keeps_input_order() {
        let detector = CountingDetector::default();
        let catalog = Catalog::build(
            vec![(1., 90.), (2., 0.), (3., 270.)],
            VisionParams::default(),
            &detector,
        )
        .unwrap();

        let headings: Vec<f64> = catalog
            .references()
            .iter()
            .map(|reference| reference.heading().degrees())
            .collect();
        assert_eq!(headings, vec![90., 0., 270.]);
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
        assert_eq!(catalog.references()[2].keypoints()[0].position.x, 3.);
        assert_eq!(detector.calls.get(), 3);
    }

    #[test]
    fn detection_failure_is_propagated() {
        let detector = CountingDetector::default();
        let err = Catalog::build(
            vec![(1., 0.), (f64::NAN, 90.), (3., 180.)],
            VisionParams::default(),
            &detector,
        )
        .unwrap_err();

        let Error::Extraction(source) = err else {
            panic!("expected an extraction error, got {err:?}");
        };
        assert!(source.downcast_ref::<Unreadable>().is_some());
        assert_eq!(detector.calls.get(), 2);
    }

    #[test]
    fn rejects_out_of_range_label() {
        let err = Catalog::build(
            vec![(1., 360.)],
            VisionParams::default(),
            &CountingDetector::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidLabel { degrees } if degrees == 360.));
    }

    #[test]
    fn rejects_empty_catalog() {
        let entries: Vec<(f64, f64)> = vec![];
        let err = Catalog::build(entries, VisionParams::default(), &CountingDetector::default())
            .unwrap_err();
        assert!(matches!(err, Error::EmptyCatalog));
    }

    #[test]
    fn catalog_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }
}
