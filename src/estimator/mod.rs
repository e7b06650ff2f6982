pub mod best_reference;
pub mod relative_pose;
pub mod weighted_average;

use crate::{
    angle::Heading,
    catalog::Catalog,
    error::Error,
    features::{FeatureDetector, Features},
    matcher::DescriptorMatcher,
    pose::{Intrinsics, NoSolution, PoseSolver},
    scorer::Scorer,
    stats::{Sample, Summary, Tally},
};
use rayon::prelude::*;
use std::time::Instant;
use tracing::debug;

/// Selects how scores against the catalog are turned into a heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Label of the reference with the most matches.
    BestReference,

    /// Best label offset by the score weighted differences to the top three.
    WeightedAverage,

    /// Best reference refined by the relative rotation to the query.
    RelativePose,
}

/// A heading produced for one query.
#[derive(Clone, Debug, PartialEq)]
pub struct Estimate {
    pub heading: Heading,

    /// Set when relative pose recovery failed and the best reference's label
    /// was used instead.
    pub fallback: Option<NoSolution>,
}

impl Estimate {
    pub fn new(heading: Heading) -> Self {
        Self {
            heading,
            fallback: None,
        }
    }

    pub fn with_fallback(heading: Heading, cause: NoSolution) -> Self {
        Self {
            heading,
            fallback: Some(cause),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Estimates the heading of query images against a reference catalog.
pub struct HeadingEstimator<D, M, P> {
    catalog: Catalog,
    detector: D,
    matcher: M,
    solver: P,
    intrinsics: Intrinsics,
}

impl<D, M, P> HeadingEstimator<D, M, P> {
    pub fn new(
        catalog: Catalog,
        detector: D,
        matcher: M,
        solver: P,
        intrinsics: Intrinsics,
    ) -> Self {
        Self {
            catalog,
            detector,
            matcher,
            solver,
            intrinsics,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// Detects features in `image` and estimates its heading with `strategy`.
    pub fn estimate<I>(&self, image: &I, strategy: Strategy) -> Result<Estimate, Error>
    where
        D: FeatureDetector<I>,
        M: DescriptorMatcher,
        P: PoseSolver,
    {
        let query = self
            .detector
            .detect(image, self.catalog.params())
            .map_err(Error::extraction)?;

        self.estimate_features(&query, strategy)
    }

    /// Estimates the heading of already detected query features.
    pub fn estimate_features(
        &self,
        query: &Features,
        strategy: Strategy,
    ) -> Result<Estimate, Error>
    where
        M: DescriptorMatcher,
        P: PoseSolver,
    {
        debug!(?strategy, features = query.len(), "estimating heading");
        let scorer = Scorer::new(&self.matcher, self.catalog.params().matcher_search_budget());

        match strategy {
            Strategy::BestReference => {
                best_reference::estimate(&self.catalog, &scorer, query).map(Estimate::new)
            }
            Strategy::WeightedAverage => {
                weighted_average::estimate(&self.catalog, &scorer, query).map(Estimate::new)
            }
            Strategy::RelativePose => relative_pose::estimate(
                &self.catalog,
                &scorer,
                query,
                &self.solver,
                &self.intrinsics,
            ),
        }
    }

    /// Estimates every `(image, true heading in degrees)` query in parallel and
    /// summarizes timing, error and fallbacks.
    ///
    /// The first failing query aborts the evaluation.
    pub fn par_evaluate<I>(
        &self,
        queries: &[(I, f64)],
        strategy: Strategy,
    ) -> Result<Summary, Error>
    where
        I: Sync,
        D: FeatureDetector<I> + Sync,
        M: DescriptorMatcher + Sync,
        P: PoseSolver + Sync,
    {
        let samples = queries
            .par_iter()
            .map(|(image, truth)| {
                let start = Instant::now();
                let estimate = self.estimate(image, strategy)?;
                Ok(Sample::new(estimate, *truth, start.elapsed()))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(samples.into_iter().collect::<Tally>().summary())
    }
}
