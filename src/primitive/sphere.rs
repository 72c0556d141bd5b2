use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use super::{addressable, finish, positive, Primitive};
use crate::{error::Error, Float, MeshData};

/// An icosphere centered at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere<R = f32> {
    /// Times each face of the icosahedron is split into four
    pub subdivisions: u32,
    /// Distance from the origin to every vertex
    pub radius: R,
}

impl<R: Float> Sphere<R> {
    /// Parameters in field order.
    pub fn new(subdivisions: u32, radius: R) -> Self {
        Self {
            subdivisions,
            radius,
        }
    }
}

impl Sphere {
    /// The most subdivisions accepted by [validate](Primitive::validate).
    ///
    /// Each level quadruples the mesh; at this level it already has over a million triangles,
    /// and the index count stays far below `u32::MAX`.
    pub const MAX_SUBDIVISIONS: u32 = 8;

    /// `10·4ⁿ + 2`
    pub const fn vertex_count(subdivisions: u32) -> u64 {
        10u64
            .saturating_mul(4u64.saturating_pow(subdivisions))
            .saturating_add(2)
    }

    /// `20·4ⁿ`
    pub const fn triangle_count(subdivisions: u32) -> u64 {
        20u64.saturating_mul(4u64.saturating_pow(subdivisions))
    }

    /// `60·4ⁿ`
    pub const fn index_count(subdivisions: u32) -> u64 {
        Self::triangle_count(subdivisions).saturating_mul(3)
    }
}

const _: () = assert!(Sphere::<f32>::index_count(Sphere::<f32>::MAX_SUBDIVISIONS) <= u32::MAX as u64);

impl<R: Float> Primitive for Sphere<R> {
    type Real = R;

    fn generate(&self) -> MeshData<R> {
        sphere(self.subdivisions, self.radius)
    }

    fn validate(&self) -> Result<(), Error> {
        positive("radius", self.radius)?;
        if self.subdivisions > Sphere::MAX_SUBDIVISIONS {
            return Err(Error::TooMany {
                name: "subdivisions",
                max: Sphere::MAX_SUBDIVISIONS,
                value: self.subdivisions,
            });
        }
        addressable(Sphere::vertex_count(self.subdivisions))
    }
}

#[rustfmt::skip]
const ICOSAHEDRON_FACES: [u32; 60] = [
    0, 11, 5,   0, 5, 1,    0, 1, 7,    0, 7, 10,   0, 10, 11,
    1, 5, 9,    5, 11, 4,   11, 10, 2,  10, 7, 6,   7, 1, 8,
    3, 9, 4,    3, 4, 2,    3, 2, 6,    3, 6, 8,    3, 8, 9,
    4, 9, 5,    2, 4, 11,   6, 2, 10,   8, 6, 7,    9, 8, 1,
];

fn icosahedron<R: Float>() -> Vec<Vector3<R>> {
    let phi = (R::ONE + R::cast_f64(5.0).sqrt()) * R::HALF;
    let (o, i) = (R::ZERO, R::ONE);
    vec![
        Vector3::new(-i, phi, o),
        Vector3::new(i, phi, o),
        Vector3::new(-i, -phi, o),
        Vector3::new(i, -phi, o),
        Vector3::new(o, -i, phi),
        Vector3::new(o, i, phi),
        Vector3::new(o, -i, -phi),
        Vector3::new(o, i, -phi),
        Vector3::new(phi, o, -i),
        Vector3::new(phi, o, i),
        Vector3::new(-phi, o, -i),
        Vector3::new(-phi, o, i),
    ]
}

/// Split every triangle into 4, placing the new vertices on the sphere.
fn subdivide<R: Float>(vertices: &mut Vec<Vector3<R>>, indices: &[u32], radius: R) -> Vec<u32> {
    // (min, max) of the edge's endpoints -> midpoint
    let mut midpoints = HashMap::<(u32, u32), u32>::new();
    let mut midpoint = |a: u32, b: u32| -> u32 {
        *midpoints.entry((a.min(b), a.max(b))).or_insert_with(|| {
            let mid = (vertices[a as usize] + vertices[b as usize]).normalize() * radius;
            vertices.push(mid);
            (vertices.len() - 1) as u32
        })
    };

    let mut result = Vec::with_capacity(indices.len() * 4);
    for tri in indices.chunks_exact(3) {
        let (v1, v2, v3) = (tri[0], tri[1], tri[2]);
        let a = midpoint(v1, v2);
        let b = midpoint(v2, v3);
        let c = midpoint(v3, v1);
        result.extend([v1, a, c, v2, b, a, v3, c, b, a, b, c]);
    }
    result
}

/// Subdivided icosahedron: `20·4ⁿ` triangles over `10·4ⁿ + 2` vertices.
///
/// Normals point straight out from the center. No texture coordinates.
pub fn sphere<R: Float>(subdivisions: u32, radius: R) -> MeshData<R> {
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("sphere", subdivisions, ?radius).entered();

    let mut vertices = icosahedron::<R>()
        .into_iter()
        .map(|v| v.normalize() * radius)
        .collect::<Vec<_>>();
    let mut indices = ICOSAHEDRON_FACES.to_vec();
    for _ in 0..subdivisions {
        indices = subdivide(&mut vertices, &indices, radius);
    }

    let normals = vertices.iter().map(|v| v.normalize()).collect::<Vec<_>>();
    let positions = normals
        .iter()
        .map(|n| Point3::from(n * radius))
        .collect::<Vec<_>>();

    finish(MeshData {
        positions: Some(positions),
        normals: Some(normals),
        texcoords: None,
        colors: None,
        indices: Some(indices),
    })
}
