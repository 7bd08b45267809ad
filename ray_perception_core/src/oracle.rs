// ray_perception_core/src/oracle.rs

use rayon::prelude::*;

use crate::error::OracleError;
use crate::types::{LayerMask, RayHit, RayQuery};

/// The contract the scene engine must expose to the sensor.
///
/// The sensor never owns collision geometry. It only asks, for a ray with a
/// world-space origin and unit direction, whether something on a visible layer
/// lies within `max_distance` and how far away it is.
///
/// Implementations are read-only from the sensor's point of view and must be
/// safe to query from several threads at once (`Sync`), because the batched
/// path fans queries out over a thread pool.
pub trait RaycastOracle: Send + Sync {
    /// Casts one ray. `Ok(None)` means nothing was hit within `max_distance`.
    fn cast_single(
        &self,
        ray: &RayQuery,
        max_distance: f32,
        layer_mask: LayerMask,
    ) -> Result<Option<RayHit>, OracleError>;

    /// Casts every ray in `rays` and returns one record per ray, in input order.
    ///
    /// The default implementation runs `cast_single` for each ray on the rayon
    /// pool and joins before returning. Any failing query fails the whole batch.
    /// Engines with a native batch API should override this.
    fn cast_batch(
        &self,
        rays: &[RayQuery],
        max_distance: f32,
        layer_mask: LayerMask,
    ) -> Result<Vec<Option<RayHit>>, OracleError> {
        rays.par_iter()
            .map(|ray| self.cast_single(ray, max_distance, layer_mask))
            .collect()
    }
}
