use nalgebra::{Point3, Vector3};

use super::{finish, positive, Primitive};
use crate::{error::Error, Float, MeshData};

/// An axis-aligned box centered at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid<R = f32> {
    /// Extent along X
    pub width: R,
    /// Extent along Y
    pub height: R,
    /// Extent along Z
    pub depth: R,
}

impl<R: Float> Cuboid<R> {
    /// Parameters in field order.
    pub fn new(width: R, height: R, depth: R) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }
}

impl<R: Float> Primitive for Cuboid<R> {
    type Real = R;

    fn generate(&self) -> MeshData<R> {
        cuboid(self.width, self.height, self.depth)
    }

    fn validate(&self) -> Result<(), Error> {
        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("depth", self.depth)
    }
}

/// Faces as `(normal, tangent)`; the bitangent is `normal × tangent`.
///
/// Order: back, front, right, left, top, bottom.
const FACES: [([i8; 3], [i8; 3]); 6] = [
    ([0, 0, -1], [-1, 0, 0]),
    ([0, 0, 1], [1, 0, 0]),
    ([1, 0, 0], [0, 0, -1]),
    ([-1, 0, 0], [0, 0, 1]),
    ([0, 1, 0], [1, 0, 0]),
    ([0, -1, 0], [1, 0, 0]),
];

/// Corners of a face in tangent space, counter-clockwise.
const CORNERS: [(i8, i8); 4] = [(-1, -1), (1, -1), (1, 1), (-1, 1)];

/// 24 vertices (faces don't share vertices, so that each keeps its own normal) and 12
/// triangles.
pub fn cuboid<R: Float>(width: R, height: R, depth: R) -> MeshData<R> {
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("cuboid", ?width, ?height, ?depth).entered();

    let half = Vector3::new(width, height, depth) * R::HALF;
    let to_vec = |v: [i8; 3]| Vector3::from(v.map(|c| R::cast_f64(c as f64)));

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (normal, tangent)) in FACES.into_iter().enumerate() {
        let normal = to_vec(normal);
        let tangent = to_vec(tangent);
        let bitangent = normal.cross(&tangent);
        for (u, v) in CORNERS {
            let corner =
                normal + tangent * R::cast_f64(u as f64) + bitangent * R::cast_f64(v as f64);
            positions.push(Point3::from(corner.component_mul(&half)));
            normals.push(normal);
        }
        let base = face as u32 * 4;
        indices.extend([0, 1, 2, 0, 2, 3].map(|i| base + i));
    }

    finish(MeshData {
        positions: Some(positions),
        normals: Some(normals),
        texcoords: None,
        colors: None,
        indices: Some(indices),
    })
}
