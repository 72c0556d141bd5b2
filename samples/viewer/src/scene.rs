use meshdata::{
    buffer::{BufferError, MeshBuffers, VertexLayout},
    MeshData,
};
use nalgebra::{Matrix4, Vector3};
use protomesh::primitive::{Capsule, Cuboid, Cylinder, Primitive, Quad, Sphere};

use crate::cli::Cli;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("couldn't generate {name}")]
    Generate {
        name: &'static str,
        #[source]
        source: protomesh::Error,
    },
    #[error("couldn't pack {name}")]
    Pack {
        name: &'static str,
        #[source]
        source: BufferError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneOptions {
    pub subdivisions: u32,
    pub segments: u32,
    /// Overrides every object's own layout
    pub layout: Option<VertexLayout>,
}

impl From<&Cli> for SceneOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            subdivisions: cli.subdivisions,
            segments: cli.segments,
            layout: cli.layout.map(VertexLayout::from),
        }
    }
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            subdivisions: 2,
            segments: 16,
            layout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: &'static str,
    pub mesh: MeshData<f32>,
    pub layout: VertexLayout,
    pub model: Matrix4<f32>,
}

impl SceneObject {
    pub fn pack(&self) -> Result<MeshBuffers, SceneError> {
        MeshBuffers::pack(&self.mesh, self.layout).map_err(|source| SceneError::Pack {
            name: self.name,
            source,
        })
    }
}

/// Spacing between objects along X
pub const SPACING: f32 = 2.0;
/// X of the first object
pub const START: f32 = -3.0;

fn object<P: Primitive<Real = f32>>(
    index: usize,
    name: &'static str,
    primitive: P,
    layout: VertexLayout,
) -> Result<SceneObject, SceneError> {
    let mesh = primitive
        .try_generate()
        .map_err(|source| SceneError::Generate { name, source })?;
    let x = START + SPACING * index as f32;
    Ok(SceneObject {
        name,
        mesh,
        layout,
        model: Matrix4::new_translation(&Vector3::new(x, 0.0, 0.0)),
    })
}

/// One of every primitive, in a row along X.
///
/// Flat primitives keep their attributes in separate arrays and curved ones interleave them,
/// unless [SceneOptions::layout] says otherwise.
pub fn build(options: SceneOptions) -> Result<Vec<SceneObject>, SceneError> {
    use VertexLayout::{Interleaved, Separate};
    let layout = |default| options.layout.unwrap_or(default);
    let (subdivisions, segments) = (options.subdivisions, options.segments);

    let objects = vec![
        object(0, "quad", Quad::new(1.0, 1.0), layout(Separate))?,
        object(1, "box", Cuboid::new(1.0, 1.0, 1.0), layout(Separate))?,
        object(2, "sphere", Sphere::new(subdivisions, 0.5), layout(Interleaved))?,
        object(3, "cylinder", Cylinder::new(0.5, 1.0, segments), layout(Interleaved))?,
        object(
            4,
            "capsule",
            Capsule::new(0.5, 1.0, segments, segments, 0),
            layout(Interleaved),
        )?,
    ];

    for o in &objects {
        tracing::debug!(
            name = o.name,
            vertices = o.mesh.vertex_count(),
            triangles = o.mesh.triangle_count(),
            layout = ?o.layout,
            "generated"
        );
    }
    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene() {
        let objects = build(SceneOptions::default()).unwrap();
        let summary = objects
            .iter()
            .map(|o| (o.name, o.layout, o.model[(0, 3)]))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            [
                ("quad", VertexLayout::Separate, -3.0),
                ("box", VertexLayout::Separate, -1.0),
                ("sphere", VertexLayout::Interleaved, 1.0),
                ("cylinder", VertexLayout::Interleaved, 3.0),
                ("capsule", VertexLayout::Interleaved, 5.0),
            ]
        );
        assert_eq!(objects[2].mesh.vertex_count(), 162);
        assert_eq!(objects[3].mesh.vertex_count(), 64);
        for o in &objects {
            let buffers = o.pack().unwrap();
            assert_eq!(buffers.draw_count(), o.mesh.index_count());
        }
    }

    #[test]
    fn layout_override() {
        let objects = build(SceneOptions {
            layout: Some(VertexLayout::Interleaved),
            ..Default::default()
        })
        .unwrap();
        assert!(objects.iter().all(|o| o.layout == VertexLayout::Interleaved));
    }

    #[test]
    fn bad_parameters() {
        let err = build(SceneOptions {
            subdivisions: Sphere::MAX_SUBDIVISIONS + 1,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, SceneError::Generate { name: "sphere", .. }));

        let err = build(SceneOptions {
            segments: 2,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, SceneError::Generate { name: "cylinder", .. }));
    }
}
