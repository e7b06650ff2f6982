//! Ratio-test filtering of nearest-neighbour matches between a reference and
//! a query.

use crate::{
    catalog::{Catalog, Reference},
    error::Error,
    features::{Descriptor, Features},
    matcher::{DescriptorMatcher, Neighbor},
};
use nalgebra::Point2;

/// A match survives only if its nearest distance is strictly below this
/// fraction of the second-nearest distance.
pub const RATIO_THRESHOLD: f32 = 0.7;

/// Number of neighbours requested per descriptor.
const K: usize = 2;

/// The score of a single reference against a query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefMatch {
    /// Heading label of the reference in degrees.
    pub angle: f64,

    /// Number of matches that passed the ratio test.
    pub score: u32,
}

/// Matched point positions, index aligned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Correspondences {
    pub reference: Vec<Point2<f64>>,
    pub query: Vec<Point2<f64>>,
}

impl Correspondences {
    pub fn len(&self) -> usize {
        self.reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }
}

/// Scores references against a query using a [`DescriptorMatcher`].
pub struct Scorer<'a, M> {
    matcher: &'a M,
    search_budget: u32,
}

impl<'a, M: DescriptorMatcher> Scorer<'a, M> {
    pub fn new(matcher: &'a M, search_budget: u32) -> Self {
        Self {
            matcher,
            search_budget,
        }
    }

    /// Counts the reference descriptors whose match in `query` passes the
    /// ratio test.
    pub fn score(&self, reference: &Reference, query: &[Descriptor]) -> Result<u32, Error> {
        let count = self
            .knn(reference, query)?
            .iter()
            .filter_map(|neighbors| ratio_test(neighbors))
            .count();

        // Bounded by the number of reference descriptors.
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Pairs keypoint positions of every match that passes the ratio test,
    /// in reference descriptor order.
    ///
    /// Neighbour indices outside of `query` are skipped.
    pub fn correspondences(
        &self,
        reference: &Reference,
        query: &Features,
    ) -> Result<Correspondences, Error> {
        let (reference_points, query_points) = self
            .knn(reference, query.descriptors())?
            .iter()
            .enumerate()
            .filter_map(|(source, neighbors)| {
                let nearest = ratio_test(neighbors)?;
                let reference_point = reference.keypoints().get(source)?.position;
                let query_point = query.keypoints().get(nearest.index)?.position;
                Some((reference_point, query_point))
            })
            .unzip();

        Ok(Correspondences {
            reference: reference_points,
            query: query_points,
        })
    }

    /// Scores every reference in `catalog`, in catalog order.
    pub fn ref_matches(
        &self,
        catalog: &Catalog,
        query: &[Descriptor],
    ) -> Result<Vec<RefMatch>, Error> {
        catalog
            .references()
            .iter()
            .map(|reference| {
                Ok(RefMatch {
                    angle: reference.heading().degrees(),
                    score: self.score(reference, query)?,
                })
            })
            .collect()
    }

    fn knn(
        &self,
        reference: &Reference,
        query: &[Descriptor],
    ) -> Result<Vec<Vec<Neighbor>>, Error> {
        self.matcher
            .match_knn(reference.descriptors(), query, K, self.search_budget)
            .map_err(Error::matching)
    }
}

/// Returns the nearest neighbour if it is distinctly closer than the second.
///
/// Descriptors with fewer than two neighbours never pass.
fn ratio_test(neighbors: &[Neighbor]) -> Option<&Neighbor> {
    match neighbors {
        [nearest, second, ..] if nearest.distance < RATIO_THRESHOLD * second.distance => {
            Some(nearest)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{angle::Heading, features::Keypoint, matcher::BruteForceHamming};
    use std::fmt;

    /// Replays fixed neighbour lists regardless of the descriptors.
    struct Scripted(Vec<Vec<Neighbor>>);

    #[derive(Debug)]
    struct Offline;

    impl fmt::Display for Offline {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "matcher offline")
        }
    }

    impl std::error::Error for Offline {}

    impl DescriptorMatcher for Scripted {
        type Error = Offline;

        fn match_knn(
            &self,
            _source: &[Descriptor],
            _target: &[Descriptor],
            _k: usize,
            _search_budget: u32,
        ) -> Result<Vec<Vec<Neighbor>>, Self::Error> {
            if self.0.is_empty() {
                return Err(Offline);
            }
            Ok(self.0.clone())
        }
    }

    fn n(index: usize, distance: f32) -> Neighbor {
        Neighbor { index, distance }
    }

    fn reference(points: usize) -> Reference {
        Reference::new(
            Heading::from_degrees(0.).unwrap(),
            Features::new(
                (0..points).map(|i| Keypoint::at(i as f64, 0.)).collect(),
                vec![[0; 32]; points],
            )
            .unwrap(),
        )
    }

    fn query(points: usize) -> Features {
        Features::new(
            (0..points).map(|i| Keypoint::at(0., 10. * i as f64)).collect(),
            vec![[0; 32]; points],
        )
        .unwrap()
    }

    #[test]
    fn ratio_test_is_strict() {
        assert!(ratio_test(&[n(0, 6.9), n(1, 10.)]).is_some());
        assert!(ratio_test(&[n(0, 7.), n(1, 10.)]).is_none());
        assert!(ratio_test(&[n(0, 0.), n(1, 0.)]).is_none());
    }

    #[test]
    fn lone_neighbor_is_excluded() {
        assert!(ratio_test(&[n(0, 0.)]).is_none());
        assert!(ratio_test(&[]).is_none());
    }

    #[test]
    fn counts_survivors() {
        let matcher = Scripted(vec![
            vec![n(0, 1.), n(1, 10.)],
            vec![n(1, 8.), n(0, 10.)],
            vec![n(2, 1.)],
            vec![n(2, 2.), n(0, 30.)],
        ]);
        let score = Scorer::new(&matcher, 1)
            .score(&reference(4), query(3).descriptors())
            .unwrap();
        assert_eq!(score, 2);
    }

    #[test]
    fn emits_point_pairs_in_order() {
        let matcher = Scripted(vec![
            vec![n(2, 1.), n(1, 10.)],
            vec![n(1, 8.), n(0, 10.)],
            vec![n(0, 2.), n(1, 30.)],
        ]);
        let correspondences = Scorer::new(&matcher, 1)
            .correspondences(&reference(3), &query(3))
            .unwrap();

        assert_eq!(
            correspondences.reference,
            vec![Point2::new(0., 0.), Point2::new(2., 0.)]
        );
        assert_eq!(
            correspondences.query,
            vec![Point2::new(0., 20.), Point2::new(0., 0.)]
        );
    }

    #[test]
    fn skips_out_of_bounds_neighbors() {
        let matcher = Scripted(vec![vec![n(9, 1.), n(1, 10.)]]);
        let correspondences = Scorer::new(&matcher, 1)
            .correspondences(&reference(1), &query(2))
            .unwrap();
        assert!(correspondences.is_empty());
    }

    #[test]
    fn matcher_failure_is_propagated() {
        let err = Scorer::new(&Scripted(vec![]), 1)
            .score(&reference(1), query(1).descriptors())
            .unwrap_err();

        let Error::Matching(source) = err else {
            panic!("expected a matching error, got {err:?}");
        };
        assert!(source.downcast_ref::<Offline>().is_some());
    }

    #[test]
    fn identical_views_match_fully() {
        let descriptors: Vec<Descriptor> = (0..8)
            .map(|i| {
                let mut descriptor = [0u8; 32];
                descriptor[i] = 0xff;
                descriptor
            })
            .collect();
        let keypoints: Vec<Keypoint> = (0..8).map(|i| Keypoint::at(i as f64, 1.)).collect();
        let features = Features::new(keypoints, descriptors).unwrap();
        let reference = Reference::new(Heading::from_degrees(45.).unwrap(), features.clone());

        let scorer = Scorer::new(&BruteForceHamming, 18);
        assert_eq!(scorer.score(&reference, features.descriptors()).unwrap(), 8);

        let correspondences = scorer.correspondences(&reference, &features).unwrap();
        assert_eq!(correspondences.reference, correspondences.query);
    }
}
