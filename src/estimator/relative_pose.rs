use super::{Estimate, best_reference};
use crate::{
    catalog::Catalog,
    error::Error,
    features::Features,
    matcher::DescriptorMatcher,
    pose::{EulerAngles, Intrinsics, NoSolution, PoseSolver},
    scorer::Scorer,
};
use tracing::{debug, warn};

/// Refines the best reference's label with the rotation recovered between the
/// reference view and the query.
///
/// The camera is mounted so that its pitch axis is the platform's yaw axis,
/// so the recovered pitch is added to the label. If the solver finds no
/// solution, or the rotation has no finite pitch, the label is returned
/// unchanged and the estimate is marked as a fallback.
pub fn estimate<M, P>(
    catalog: &Catalog,
    scorer: &Scorer<'_, M>,
    query: &Features,
    solver: &P,
    intrinsics: &Intrinsics,
) -> Result<Estimate, Error>
where
    M: DescriptorMatcher,
    P: PoseSolver,
{
    let matches = scorer.ref_matches(catalog, query.descriptors())?;
    let (index, _) = best_reference::select(&matches).ok_or(Error::EmptyCatalog)?;
    let reference = &catalog.references()[index];

    let correspondences = scorer.correspondences(reference, query)?;
    debug!(
        reference = %reference.heading(),
        correspondences = correspondences.len(),
        "recovering relative pose"
    );

    let params = catalog.params();
    let refined = solver
        .recover_pose(
            &correspondences.reference,
            &correspondences.query,
            intrinsics,
            params.pose_success_probability(),
            params.pose_inlier_threshold(),
        )
        .and_then(|pose| {
            let angles = EulerAngles::from_matrix(&pose.rotation);
            reference
                .heading()
                .offset(angles.pitch)
                .ok_or(NoSolution::Degenerate)
        });

    match refined {
        Ok(heading) => Ok(Estimate::new(heading)),
        Err(cause) => {
            warn!(reference = %reference.heading(), %cause, "falling back to reference heading");
            Ok(Estimate::with_fallback(reference.heading(), cause))
        }
    }
}
