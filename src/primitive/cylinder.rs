use nalgebra::{Point3, Vector3};

use super::{addressable, at_least, finish, positive, Primitive};
use crate::{error::Error, Float, MeshData};

/// A closed, Y-up cylinder centered at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder<R = f32> {
    /// Distance from the Y axis to the side
    pub radius: R,
    /// Extent along Y
    pub height: R,
    /// Vertices in each ring
    pub segments: u32,
}

impl<R: Float> Cylinder<R> {
    /// Fewer would collapse the rings into a line
    pub const MIN_SEGMENTS: u32 = 3;
    /// The most segments for which all `4·segments` vertices fit in a `u32` index
    pub const MAX_SEGMENTS: u32 = 1 << 30;

    /// Parameters in field order.
    pub fn new(radius: R, height: R, segments: u32) -> Self {
        Self {
            radius,
            height,
            segments,
        }
    }
}

impl<R: Float> Primitive for Cylinder<R> {
    type Real = R;

    fn generate(&self) -> MeshData<R> {
        cylinder(self.radius, self.height, self.segments)
    }

    fn validate(&self) -> Result<(), Error> {
        positive("radius", self.radius)?;
        positive("height", self.height)?;
        at_least("segments", Self::MIN_SEGMENTS, self.segments)?;
        if self.segments > Self::MAX_SEGMENTS {
            return Err(Error::TooMany {
                name: "segments",
                max: Self::MAX_SEGMENTS,
                value: self.segments,
            });
        }
        addressable(self.segments as u64 * 4)
    }
}

/// `segments` (clamped to `3..=2³⁰`) around; `4·segments` vertices in four rings: side top, side bottom,
/// cap top, cap bottom. The caps are triangle fans from their ring's first vertex.
pub fn cylinder<R: Float>(radius: R, height: R, segments: u32) -> MeshData<R> {
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("cylinder", ?radius, ?height, segments).entered();

    let s = segments.clamp(Cylinder::<R>::MIN_SEGMENTS, Cylinder::<R>::MAX_SEGMENTS);
    #[cfg(feature = "tracing")]
    if s != segments {
        tracing::debug!(segments, clamped = s, "cylinder segments out of range");
    }

    let half = height * R::HALF;
    let step = R::two_pi() / R::cast_u32(s);
    let ring = |r: u32, i: u32| r * s + i;

    let mut positions = vec![Point3::origin(); 4 * s as usize];
    let mut normals = vec![Vector3::zeros(); 4 * s as usize];
    for i in 0..s {
        let (sin, cos) = (step * R::cast_u32(i)).sin_cos();
        let radial = Vector3::new(cos, R::ZERO, sin);
        let (x, z) = (cos * radius, sin * radius);
        for (r, y, normal) in [
            (0, half, radial),
            (1, -half, radial),
            (2, half, Vector3::y()),
            (3, -half, -Vector3::y()),
        ] {
            positions[ring(r, i) as usize] = Point3::new(x, y, z);
            normals[ring(r, i) as usize] = normal;
        }
    }

    let mut indices = Vec::with_capacity(6 * s as usize + 6 * (s as usize - 2));
    for i in 0..s {
        let j = (i + 1) % s;
        indices.extend([
            ring(0, i),
            ring(0, j),
            ring(1, i),
            ring(1, j),
            ring(1, i),
            ring(0, j),
        ]);
    }
    for i in 1..s - 1 {
        indices.extend([ring(2, 0), ring(2, i + 1), ring(2, i)]);
        indices.extend([ring(3, 0), ring(3, i), ring(3, i + 1)]);
    }

    finish(MeshData {
        positions: Some(positions),
        normals: Some(normals),
        texcoords: None,
        colors: None,
        indices: Some(indices),
    })
}
