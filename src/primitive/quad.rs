use nalgebra::{Point2, Point3, Vector3};

use super::{finish, positive, Primitive};
use crate::{error::Error, Float, MeshData};

/// A flat rectangle in the XY plane, centered at the origin and facing +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad<R = f32> {
    /// Extent along X
    pub width: R,
    /// Extent along Y
    pub height: R,
}

impl<R: Float> Quad<R> {
    /// Parameters in field order.
    pub fn new(width: R, height: R) -> Self {
        Self { width, height }
    }
}

impl<R: Float> Primitive for Quad<R> {
    type Real = R;

    fn generate(&self) -> MeshData<R> {
        quad(self.width, self.height)
    }

    fn validate(&self) -> Result<(), Error> {
        positive("width", self.width)?;
        positive("height", self.height)
    }
}

/// 4 vertices, 2 triangles; texture coordinates span `[0, 1]²`.
pub fn quad<R: Float>(width: R, height: R) -> MeshData<R> {
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("quad", ?width, ?height).entered();

    let (x, y) = (width * R::HALF, height * R::HALF);
    let (o, i) = (R::ZERO, R::ONE);
    finish(MeshData {
        positions: Some(vec![
            Point3::new(-x, -y, o),
            Point3::new(-x, y, o),
            Point3::new(x, y, o),
            Point3::new(x, -y, o),
        ]),
        normals: Some(vec![Vector3::z(); 4]),
        texcoords: Some(vec![
            Point2::new(o, o),
            Point2::new(o, i),
            Point2::new(i, i),
            Point2::new(i, o),
        ]),
        colors: None,
        indices: Some(vec![0, 2, 1, 0, 3, 2]),
    })
}
