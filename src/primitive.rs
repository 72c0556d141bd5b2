//! Procedural generators for basic geometric primitives.
//!
//! Each primitive is available both as a free function, which accepts any parameters and
//! clamps the ones it can't work with, and as a parameter struct implementing [Primitive],
//! which can reject bad parameters before generating anything.
//!
//! All generators are right-handed and Y-up where orientation matters; front faces wind
//! counter-clockwise.

mod capsule;
mod cuboid;
mod cylinder;
mod quad;
mod sphere;

pub use capsule::*;
pub use cuboid::*;
pub use cylinder::*;
pub use quad::*;
pub use sphere::*;

use crate::{error::Error, Float, MeshData};

/// Parameters describing a procedurally generated mesh.
pub trait Primitive {
    type Real: Float;

    /// Generate the mesh. Never fails; out-of-range parameters are clamped or produce
    /// degenerate geometry.
    fn generate(&self) -> MeshData<Self::Real>;

    /// Check that these parameters describe a well-formed mesh.
    fn validate(&self) -> Result<(), Error>;

    /// [Validate](Primitive::validate) these parameters, then [generate](Primitive::generate).
    fn try_generate(&self) -> Result<MeshData<Self::Real>, Error> {
        self.validate()?;
        Ok(self.generate())
    }
}

pub(crate) fn positive<R: Float>(name: &'static str, value: R) -> Result<(), Error> {
    let value = value.as_f64();
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::NonPositive { name, value })
    }
}

pub(crate) fn non_negative<R: Float>(name: &'static str, value: R) -> Result<(), Error> {
    let value = value.as_f64();
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::Negative { name, value })
    }
}

pub(crate) fn at_least(name: &'static str, min: u32, value: u32) -> Result<(), Error> {
    if value >= min {
        Ok(())
    } else {
        Err(Error::TooFew { name, min, value })
    }
}

pub(crate) fn addressable(vertex_count: u64) -> Result<(), Error> {
    if vertex_count <= u32::MAX as u64 + 1 {
        Ok(())
    } else {
        Err(Error::TooManyVertices(vertex_count))
    }
}

/// Log the size of a freshly generated mesh.
#[inline]
pub(crate) fn finish<R: Float>(mesh: MeshData<R>) -> MeshData<R> {
    #[cfg(feature = "tracing")]
    tracing::trace!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "generated mesh"
    );
    mesh
}
