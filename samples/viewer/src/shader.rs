use std::{borrow::Cow, num::NonZeroU64};

use meshdata::buffer::VertexBuffer;
use naga::{AddressSpace, Binding, Module, ShaderStage, TypeInner};

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("couldn't parse shader `{label}`:\n{message}")]
    Parse { label: String, message: String },
    #[error("invalid shader `{label}`: {message}")]
    Validation { label: String, message: String },
    #[error("shader `{label}` has no {stage:?} entry point named `{name}`")]
    MissingEntryPoint {
        label: String,
        stage: ShaderStage,
        name: String,
    },
    #[error("shader reads `{name}` from location {location}, but the mesh has nothing there")]
    MissingAttribute { name: String, location: u32 },
    #[error("shader has no uniform named `{0}`")]
    MissingUniform(String),
}

/// WGSL source for one vertex + fragment program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub label: Cow<'static, str>,
    pub wgsl: Cow<'static, str>,
    pub vertex_entry: Cow<'static, str>,
    pub fragment_entry: Cow<'static, str>,
}

/// Solid color with Lambert diffuse & constant ambient lighting.
///
/// Reads position from location 0 and normal from location 1; uniforms `mvp`, `model`,
/// `color` & `light_dir` are bindings 0 through 3 of group 0.
pub const DEFAULT_LIT_COLOR: ShaderSource = ShaderSource {
    label: Cow::Borrowed("lit color"),
    wgsl: Cow::Borrowed(include_str!("shaders/lit_color.wgsl")),
    vertex_entry: Cow::Borrowed("vs_main"),
    fragment_entry: Cow::Borrowed("fs_main"),
};

/// A `@location` input of the vertex entry point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderVertexAttribute {
    pub name: String,
    pub location: u32,
    /// 1 for scalars, otherwise the vector width
    pub components: u32,
    /// Bytes
    pub size: u32,
}

/// A `var<uniform>` global.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderUniform {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    /// Bytes
    pub size: u32,
}

/// What a shader expects from the pipeline it's used in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reflection {
    /// Sorted by location
    pub vertex_attributes: Vec<ShaderVertexAttribute>,
    /// Sorted by (group, binding)
    pub uniforms: Vec<ShaderUniform>,
}

fn entry_point<'m>(
    module: &'m Module,
    source: &ShaderSource,
    stage: ShaderStage,
    name: &str,
) -> Result<&'m naga::EntryPoint, ShaderError> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == name)
        .ok_or_else(|| ShaderError::MissingEntryPoint {
            label: source.label.to_string(),
            stage,
            name: name.to_owned(),
        })
}

impl Reflection {
    /// Parse & validate `source`, then collect its vertex inputs and uniforms.
    pub fn parse(source: &ShaderSource) -> Result<Self, ShaderError> {
        let module = naga::front::wgsl::parse_str(&source.wgsl).map_err(|e| ShaderError::Parse {
            label: source.label.to_string(),
            message: e.emit_to_string(&source.wgsl),
        })?;
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| ShaderError::Validation {
            label: source.label.to_string(),
            message: e.into_inner().to_string(),
        })?;

        let vertex = entry_point(&module, source, ShaderStage::Vertex, &source.vertex_entry)?;
        entry_point(&module, source, ShaderStage::Fragment, &source.fragment_entry)?;

        let attribute = |name: &Option<String>, ty: naga::Handle<naga::Type>, binding: &Option<Binding>| {
            let Some(Binding::Location { location, .. }) = binding else {
                return None;
            };
            let inner = &module.types[ty].inner;
            Some(ShaderVertexAttribute {
                name: name.clone().unwrap_or_default(),
                location: *location,
                components: match inner {
                    TypeInner::Vector { size, .. } => *size as u32,
                    _ => 1,
                },
                size: inner.size(module.to_ctx()),
            })
        };

        let mut vertex_attributes = Vec::new();
        for arg in &vertex.function.arguments {
            match &module.types[arg.ty].inner {
                TypeInner::Struct { members, .. } if arg.binding.is_none() => vertex_attributes
                    .extend(members.iter().filter_map(|m| attribute(&m.name, m.ty, &m.binding))),
                _ => vertex_attributes.extend(attribute(&arg.name, arg.ty, &arg.binding)),
            }
        }
        vertex_attributes.sort_by_key(|a| a.location);

        let mut uniforms = module
            .global_variables
            .iter()
            .filter(|(_, var)| var.space == AddressSpace::Uniform)
            .filter_map(|(_, var)| {
                let binding = var.binding.as_ref()?;
                Some(ShaderUniform {
                    name: var.name.clone().unwrap_or_default(),
                    group: binding.group,
                    binding: binding.binding,
                    size: module.types[var.ty].inner.size(module.to_ctx()),
                })
            })
            .collect::<Vec<_>>();
        uniforms.sort_by_key(|u| (u.group, u.binding));

        Ok(Self {
            vertex_attributes,
            uniforms,
        })
    }

    pub fn uniform(&self, name: &str) -> Result<&ShaderUniform, ShaderError> {
        self.uniforms
            .iter()
            .find(|u| u.name == name)
            .ok_or_else(|| ShaderError::MissingUniform(name.to_owned()))
    }

    /// Every vertex input must be bound by `buffer`.
    pub fn check_layout(&self, buffer: &VertexBuffer) -> Result<(), ShaderError> {
        match self
            .vertex_attributes
            .iter()
            .find(|a| !buffer.bindings.iter().any(|b| b.location == a.location))
        {
            Some(missing) => Err(ShaderError::MissingAttribute {
                name: missing.name.clone(),
                location: missing.location,
            }),
            None => Ok(()),
        }
    }

    /// Layout entries for the uniforms in `group`, visible to both stages.
    pub fn bind_group_layout_entries(&self, group: u32) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.uniforms
            .iter()
            .filter(|u| u.group == group)
            .map(|u| wgpu::BindGroupLayoutEntry {
                binding: u.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(u.size as u64),
                },
                count: None,
            })
            .collect()
    }
}

/// A compiled shader module, plus what it expects as input.
#[derive(Debug)]
pub struct ShaderProgram {
    pub label: String,
    pub module: wgpu::ShaderModule,
    pub vertex_entry: String,
    pub fragment_entry: String,
    reflection: Reflection,
}

impl ShaderProgram {
    pub fn compile(device: &wgpu::Device, source: &ShaderSource) -> Result<Self, ShaderError> {
        let reflection = Reflection::parse(source)?;
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&source.label),
            source: wgpu::ShaderSource::Wgsl(source.wgsl.clone()),
        });

        for attr in &reflection.vertex_attributes {
            tracing::info!(
                shader = %source.label,
                name = %attr.name,
                location = attr.location,
                components = attr.components,
                size = attr.size,
                "vertex attribute"
            );
        }
        for u in &reflection.uniforms {
            tracing::info!(
                shader = %source.label,
                name = %u.name,
                group = u.group,
                binding = u.binding,
                size = u.size,
                "uniform"
            );
        }

        Ok(Self {
            label: source.label.to_string(),
            module,
            vertex_entry: source.vertex_entry.to_string(),
            fragment_entry: source.fragment_entry.to_string(),
            reflection,
        })
    }

    #[inline]
    pub fn reflection(&self) -> &Reflection {
        &self.reflection
    }

    #[inline]
    pub fn vertex_attributes(&self) -> &[ShaderVertexAttribute] {
        &self.reflection.vertex_attributes
    }

    #[inline]
    pub fn uniforms(&self) -> &[ShaderUniform] {
        &self.reflection.uniforms
    }

    #[inline]
    pub fn uniform(&self, name: &str) -> Result<&ShaderUniform, ShaderError> {
        self.reflection.uniform(name)
    }

    #[inline]
    pub fn check_layout(&self, buffer: &VertexBuffer) -> Result<(), ShaderError> {
        self.reflection.check_layout(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshdata::{buffer::VertexLayout, MeshData};
    use nalgebra::Point3;

    fn with_wgsl(wgsl: &'static str) -> ShaderSource {
        ShaderSource {
            wgsl: Cow::Borrowed(wgsl),
            ..DEFAULT_LIT_COLOR
        }
    }

    #[test]
    fn lit_color_reflection() {
        let r = Reflection::parse(&DEFAULT_LIT_COLOR).unwrap();
        assert_eq!(
            r.vertex_attributes,
            [
                ShaderVertexAttribute {
                    name: "position".into(),
                    location: 0,
                    components: 3,
                    size: 12,
                },
                ShaderVertexAttribute {
                    name: "normal".into(),
                    location: 1,
                    components: 3,
                    size: 12,
                },
            ]
        );
        let uniforms = r
            .uniforms
            .iter()
            .map(|u| (u.name.as_str(), u.group, u.binding, u.size))
            .collect::<Vec<_>>();
        assert_eq!(
            uniforms,
            [
                ("mvp", 0, 0, 64),
                ("model", 0, 1, 64),
                ("color", 0, 2, 16),
                ("light_dir", 0, 3, 16),
            ]
        );
        assert_eq!(r.uniform("color").unwrap().binding, 2);
        assert!(matches!(
            r.uniform("lightDir"),
            Err(ShaderError::MissingUniform(name)) if name == "lightDir"
        ));
        assert_eq!(r.bind_group_layout_entries(0).len(), 4);
        assert!(r.bind_group_layout_entries(1).is_empty());
    }

    #[test]
    fn plain_arguments() {
        let r = Reflection::parse(&with_wgsl(
            "@vertex fn vs_main(@location(2) uv: vec2<f32>, @builtin(vertex_index) i: u32, \
             @location(0) w: f32) -> @builtin(position) vec4<f32> { return vec4<f32>(uv, w, 1.0); }
             @fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }",
        ))
        .unwrap();
        let attrs = r
            .vertex_attributes
            .iter()
            .map(|a| (a.name.as_str(), a.location, a.components, a.size))
            .collect::<Vec<_>>();
        assert_eq!(attrs, [("w", 0, 1, 4), ("uv", 2, 2, 8)]);
        assert!(r.uniforms.is_empty());
    }

    #[test]
    fn errors() {
        assert!(matches!(
            Reflection::parse(&with_wgsl("fn vs_main( {")),
            Err(ShaderError::Parse { .. })
        ));
        assert!(matches!(
            Reflection::parse(&ShaderSource {
                fragment_entry: Cow::Borrowed("main"),
                ..DEFAULT_LIT_COLOR
            }),
            Err(ShaderError::MissingEntryPoint {
                stage: ShaderStage::Fragment,
                ..
            })
        ));
        // the vertex stage can't be used as a fragment entry point
        assert!(matches!(
            Reflection::parse(&ShaderSource {
                fragment_entry: Cow::Borrowed("vs_main"),
                ..DEFAULT_LIT_COLOR
            }),
            Err(ShaderError::MissingEntryPoint { .. })
        ));
    }

    #[test]
    fn layout_check() {
        let r = Reflection::parse(&DEFAULT_LIT_COLOR).unwrap();
        let lit = VertexBuffer::pack(&protomesh::cuboid(1.0, 1.0, 1.0), VertexLayout::Separate)
            .unwrap();
        r.check_layout(&lit).unwrap();

        let unlit = MeshData {
            positions: Some(vec![Point3::origin(); 3]),
            ..MeshData::new()
        };
        let unlit = VertexBuffer::pack(&unlit, VertexLayout::Interleaved).unwrap();
        assert!(matches!(
            r.check_layout(&unlit),
            Err(ShaderError::MissingAttribute { location: 1, .. })
        ));
    }
}
