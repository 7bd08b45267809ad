// ray_perception_core/src/scene.rs

//! A small analytic scene that answers raycasts exactly.
//!
//! It is the reference `RaycastOracle` for running the sensor without an
//! engine, and the fixture the strategy-equivalence tests run against.

use nalgebra::{Point3, Vector3};

use crate::error::OracleError;
use crate::oracle::RaycastOracle;
use crate::types::{LayerMask, RayHit, RayQuery};

const PARALLEL_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Sphere { center: Point3<f64>, radius: f64 },
    /// An axis-aligned box.
    Cuboid {
        center: Point3<f64>,
        half_extents: Vector3<f64>,
    },
}

impl Primitive {
    /// Distance along the ray to the first intersection, if any.
    ///
    /// Shapes are solid: a ray starting inside a shape hits it at distance 0.
    pub fn intersect(&self, ray: &RayQuery) -> Option<f64> {
        match self {
            Primitive::Sphere { center, radius } => intersect_sphere(ray, center, *radius),
            Primitive::Cuboid {
                center,
                half_extents,
            } => intersect_cuboid(ray, center, half_extents),
        }
    }
}

/// A primitive together with the collision layers it lives on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneShape {
    pub primitive: Primitive,
    pub layers: LayerMask,
}

impl SceneShape {
    pub fn sphere(center: Point3<f64>, radius: f64, layers: LayerMask) -> Self {
        Self {
            primitive: Primitive::Sphere { center, radius },
            layers,
        }
    }

    /// An axis-aligned box with full side lengths `size`.
    pub fn cuboid(center: Point3<f64>, size: [f64; 3], layers: LayerMask) -> Self {
        Self {
            primitive: Primitive::Cuboid {
                center,
                half_extents: Vector3::new(size[0], size[1], size[2]) * 0.5,
            },
            layers,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyticScene {
    shapes: Vec<SceneShape>,
    ready: bool,
}

impl Default for AnalyticScene {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticScene {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            ready: true,
        }
    }

    pub fn add(&mut self, shape: SceneShape) -> &mut Self {
        self.shapes.push(shape);
        self
    }

    /// A scene that is not ready fails every query with `OracleError::SceneNotReady`.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn shapes(&self) -> &[SceneShape] {
        &self.shapes
    }
}

impl RaycastOracle for AnalyticScene {
    fn cast_single(
        &self,
        ray: &RayQuery,
        max_distance: f32,
        layer_mask: LayerMask,
    ) -> Result<Option<RayHit>, OracleError> {
        if !self.ready {
            return Err(OracleError::SceneNotReady);
        }

        let nearest = self
            .shapes
            .iter()
            .filter(|shape| shape.layers.intersects(layer_mask))
            .filter_map(|shape| shape.primitive.intersect(ray))
            .filter(|&t| t <= max_distance as f64)
            .min_by(|a, b| a.total_cmp(b));

        Ok(nearest.map(|t| RayHit { distance: t as f32 }))
    }
}

fn intersect_sphere(ray: &RayQuery, center: &Point3<f64>, radius: f64) -> Option<f64> {
    let oc = ray.origin - center;
    let b = ray.direction.dot(&oc);
    let c = oc.norm_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let far = -b + root;
    if far < 0.0 {
        return None;
    }
    Some((-b - root).max(0.0))
}

// Slab test.
fn intersect_cuboid(
    ray: &RayQuery,
    center: &Point3<f64>,
    half_extents: &Vector3<f64>,
) -> Option<f64> {
    let min = center - half_extents;
    let max = center + half_extents;
    let mut t_near = f64::NEG_INFINITY;
    let mut t_far = f64::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];
        if direction.abs() < PARALLEL_EPSILON {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }

        let t1 = (min[axis] - origin) / direction;
        let t2 = (max[axis] - origin) / direction;
        t_near = t_near.max(t1.min(t2));
        t_far = t_far.min(t1.max(t2));
    }

    if t_far < t_near.max(0.0) {
        return None;
    }
    Some(t_near.max(0.0))
}
