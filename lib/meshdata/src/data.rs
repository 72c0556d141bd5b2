//! # See Also
//!
//! * [`buffer`] for turning a [`MeshData`] into GPU-ready bytes

pub mod attribute;
pub mod buffer;
mod mesh;

pub use mesh::*;
