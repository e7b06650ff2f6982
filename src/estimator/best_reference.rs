use crate::{
    angle::Heading,
    catalog::Catalog,
    error::Error,
    features::Features,
    matcher::DescriptorMatcher,
    scorer::{RefMatch, Scorer},
};

/// Returns the first reference with the highest score and its position.
///
/// Unlike `Iterator::max_by_key`, ties resolve to the earliest entry.
pub fn select(matches: &[RefMatch]) -> Option<(usize, &RefMatch)> {
    matches
        .iter()
        .enumerate()
        .fold(None, |best, (index, candidate)| match best {
            Some((_, current)) if candidate.score <= current.score => best,
            _ => Some((index, candidate)),
        })
}

/// Estimates the heading as the label of the best scoring reference.
pub fn estimate<M: DescriptorMatcher>(
    catalog: &Catalog,
    scorer: &Scorer<'_, M>,
    query: &Features,
) -> Result<Heading, Error> {
    let matches = scorer.ref_matches(catalog, query.descriptors())?;
    let (index, _) = select(&matches).ok_or(Error::EmptyCatalog)?;
    Ok(catalog.references()[index].heading())
}
