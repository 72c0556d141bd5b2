//! Procedural meshes for basic geometric primitives.
//!
//! Generators return [MeshData], which [meshdata::buffer] can pack into GPU-ready vertex and
//! index buffers.
//!
//! ```
//! use protomesh::{primitive::{Capsule, Primitive}, sphere};
//!
//! let ball = sphere::<f32>(1, 0.5);
//! assert_eq!(ball.vertex_count(), 42);
//!
//! let pill = Capsule::new(0.5f32, 1.0, 16, 16, 0).try_generate().unwrap();
//! assert!(pill.validate().is_ok());
//! ```
#![cfg_attr(not(debug_assertions), warn(missing_docs))]

pub mod error;
mod float;
pub mod primitive;

pub use error::Error;
pub use float::Float;
pub use primitive::{capsule, cuboid, cylinder, quad, sphere, Primitive};

pub use meshdata;
pub use meshdata::MeshData;
