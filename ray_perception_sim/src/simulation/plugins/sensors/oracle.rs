// ray_perception_sim/src/simulation/plugins/sensors/oracle.rs

use avian3d::prelude::{SpatialQuery, SpatialQueryFilter};
use bevy::prelude::{Dir3, Entity};
use ray_perception_core::{
    error::OracleError,
    oracle::RaycastOracle,
    types::{LayerMask, RayHit, RayQuery},
};

use crate::simulation::core::transforms::{
    nalgebra_point_to_bevy_vec3, nalgebra_vector_to_bevy_vec3,
};

/// Answers the perception core's ray queries with avian3d's spatial query pipeline.
///
/// Built fresh for every sensor on every run of the sensor system, because it
/// borrows the `SpatialQuery` system parameter.
pub struct SpatialQueryOracle<'a, 'w, 's> {
    spatial_query: &'a SpatialQuery<'w, 's>,
    /// The agent carrying the sensor. Its own collider is never reported as a hit.
    excluded: Entity,
}

impl<'a, 'w, 's> SpatialQueryOracle<'a, 'w, 's> {
    pub fn new(spatial_query: &'a SpatialQuery<'w, 's>, excluded: Entity) -> Self {
        Self {
            spatial_query,
            excluded,
        }
    }
}

impl RaycastOracle for SpatialQueryOracle<'_, '_, '_> {
    fn cast_single(
        &self,
        ray: &RayQuery,
        max_distance: f32,
        layer_mask: LayerMask,
    ) -> Result<Option<RayHit>, OracleError> {
        let origin = nalgebra_point_to_bevy_vec3(&ray.origin);
        let direction = Dir3::new(nalgebra_vector_to_bevy_vec3(&ray.direction)).map_err(|e| {
            OracleError::Backend(format!("ray direction is not a valid Dir3: {:?}", e))
        })?;

        let filter =
            SpatialQueryFilter::from_mask(layer_mask.0).with_excluded_entities([self.excluded]);

        // `solid = true`: a ray starting inside a collider hits it at distance 0.
        let hit = self
            .spatial_query
            .cast_ray(origin, direction, max_distance, true, &filter);

        Ok(hit.map(|hit| RayHit {
            distance: hit.distance,
        }))
    }
}
