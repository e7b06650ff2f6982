use crate::{
    angle::{Heading, signed_circular_diff, weighted_average},
    catalog::Catalog,
    error::Error,
    features::Features,
    matcher::DescriptorMatcher,
    scorer::{RefMatch, Scorer},
};

/// Number of best scoring references that contribute to the estimate.
pub const TOP_K: usize = 3;

/// Combines the best scoring references into one heading.
///
/// The label of the best reference is offset by the score weighted mean of
/// `signed_circular_diff(main, label)` over the top [`TOP_K`] references, so
/// the best reference contributes no offset and near ties shift the result
/// by up to half a turn.
pub fn combine(matches: &[RefMatch]) -> Result<Heading, Error> {
    let mut ranked = matches.to_vec();

    // Stable, so equal scores keep catalog order.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    let main = ranked.first().ok_or(Error::EmptyCatalog)?.angle;
    let delta = weighted_average(
        ranked
            .iter()
            .take(TOP_K)
            .map(|candidate| {
                (
                    signed_circular_diff(main, candidate.angle),
                    f64::from(candidate.score),
                )
            }),
    )?;

    let degrees = main + delta;
    Heading::from_degrees_wrapped(degrees).ok_or(Error::InvalidLabel { degrees })
}

/// Estimates the heading as the best label offset by the score weighted
/// circular differences to the top references.
pub fn estimate<M: DescriptorMatcher>(
    catalog: &Catalog,
    scorer: &Scorer<'_, M>,
    query: &Features,
) -> Result<Heading, Error> {
    combine(&scorer.ref_matches(catalog, query.descriptors())?)
}
