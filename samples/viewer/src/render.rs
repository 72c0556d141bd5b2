use std::{collections::HashMap, sync::Arc};

use meshdata::{
    attribute::{as_bytes, AttributeUsage},
    buffer::{GpuMesh, VertexBuffer, VertexLayout},
};
use nalgebra::{Matrix4, Vector3, Vector4};
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    camera::Camera,
    scene::{SceneError, SceneObject},
    shader::{ShaderError, ShaderProgram, DEFAULT_LIT_COLOR},
};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("couldn't create a surface for the window")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no graphics adapter can present to the window")]
    NoAdapter,
    #[error("the window surface isn't supported by the adapter")]
    UnsupportedSurface,
    #[error("couldn't open the graphics device")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};
pub const OBJECT_COLOR: Vector4<f32> = Vector4::new(0.0, 1.0, 0.0, 1.0);
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Direction towards the light; `w` is padding.
pub fn light_direction() -> Vector4<f32> {
    Vector3::new(-1.5, 2.0, 1.0).normalize().push(0.0)
}

/// Meshes with the same arrangement of the same attributes share pipelines.
type PipelineKey = (VertexLayout, Vec<AttributeUsage>);

struct Pipelines {
    fill: wgpu::RenderPipeline,
    /// Only if the device supports [wgpu::PolygonMode::Line]
    line: Option<wgpu::RenderPipeline>,
}

/// A mesh and everything needed to draw it.
pub struct DrawCall {
    pub name: &'static str,
    pub mesh: GpuMesh,
    pub model: Matrix4<f32>,
    pipeline: PipelineKey,
    mvp: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: wgpu::TextureView,
    pipelines: HashMap<PipelineKey, Pipelines>,
    draws: Vec<DrawCall>,
    wireframe_supported: bool,
}

fn create_depth(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("depth"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    program: &ShaderProgram,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    format: wgpu::TextureFormat,
    polygon_mode: wgpu::PolygonMode,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&program.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &program.module,
            entry_point: &program.vertex_entry,
            compilation_options: Default::default(),
            buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: &program.module,
            entry_point: &program.fragment_entry,
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // the quad is single-sided
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn uniform_buffer(device: &wgpu::Device, label: &str, contents: &[f32]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: as_bytes(contents),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

impl Renderer {
    pub async fn new(window: Arc<Window>, objects: &[SceneObject]) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        let info = adapter.get_info();
        tracing::info!(name = %info.name, backend = ?info.backend, "using adapter");

        let wireframe_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        if !wireframe_supported {
            tracing::warn!("adapter can't draw lines; wireframe mode is unavailable");
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("viewer"),
                    required_features: if wireframe_supported {
                        wgpu::Features::POLYGON_MODE_LINE
                    } else {
                        wgpu::Features::empty()
                    },
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(RenderError::UnsupportedSurface)?;
        if let Some(srgb) = caps.formats.iter().copied().find(|f| f.is_srgb()) {
            config.format = srgb;
        }
        config.present_mode = caps
            .present_modes
            .iter()
            .copied()
            .find(|m| *m == wgpu::PresentMode::Mailbox)
            .unwrap_or(wgpu::PresentMode::AutoVsync);
        surface.configure(&device, &config);
        let depth = create_depth(&device, &config);

        let program = ShaderProgram::compile(&device, &DEFAULT_LIT_COLOR)?;
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniforms"),
            entries: &program.reflection().bind_group_layout_entries(0),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&program.label),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let color = uniform_buffer(&device, "color", OBJECT_COLOR.as_slice());
        let light_dir = uniform_buffer(&device, "light_dir", light_direction().as_slice());

        let mut pipelines = HashMap::new();
        let mut draws = Vec::with_capacity(objects.len());
        for object in objects {
            let buffers = object.pack()?;
            program.check_layout(&buffers.vertices)?;
            let mesh = GpuMesh::upload(&device, Some(object.name), &buffers);

            let key = (mesh.layout, mesh.usages.clone());
            if !pipelines.contains_key(&key) {
                let layouts = VertexBuffer::wgpu_layouts(&mesh.slots);
                let pipeline = |mode| {
                    create_pipeline(&device, &pipeline_layout, &program, &layouts, config.format, mode)
                };
                tracing::debug!(layout = ?key.0, usages = ?key.1, "creating pipelines");
                pipelines.insert(
                    key.clone(),
                    Pipelines {
                        fill: pipeline(wgpu::PolygonMode::Fill),
                        line: wireframe_supported.then(|| pipeline(wgpu::PolygonMode::Line)),
                    },
                );
            }

            let mvp = uniform_buffer(&device, "mvp", Matrix4::<f32>::identity().as_slice());
            let model = uniform_buffer(&device, "model", object.model.as_slice());
            let entries = [
                ("mvp", &mvp),
                ("model", &model),
                ("color", &color),
                ("light_dir", &light_dir),
            ]
            .into_iter()
            .map(|(name, buffer)| {
                Ok(wgpu::BindGroupEntry {
                    binding: program.uniform(name)?.binding,
                    resource: buffer.as_entire_binding(),
                })
            })
            .collect::<Result<Vec<_>, ShaderError>>()?;
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(object.name),
                layout: &bind_group_layout,
                entries: &entries,
            });

            draws.push(DrawCall {
                name: object.name,
                mesh,
                model: object.model,
                pipeline: key,
                mvp,
                bind_group,
            });
        }
        tracing::info!(
            draws = draws.len(),
            pipelines = pipelines.len(),
            inputs = program.vertex_attributes().len(),
            uniforms = program.uniforms().len(),
            format = ?config.format,
            "renderer ready"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth,
            pipelines,
            draws,
            wireframe_supported,
        })
    }

    #[inline]
    pub fn window(&self) -> &Window {
        &self.window
    }

    #[inline]
    pub fn wireframe_supported(&self) -> bool {
        self.wireframe_supported
    }

    #[inline]
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth = create_depth(&self.device, &self.config);
        }
    }

    pub fn render(&mut self, camera: &Camera, wireframe: bool) -> Result<(), wgpu::SurfaceError> {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let view_projection = camera.projection_matrix(aspect) * camera.view_matrix();
        for draw in &self.draws {
            let mvp = view_projection * draw.model;
            self.queue.write_buffer(&draw.mvp, 0, as_bytes(mvp.as_slice()));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for draw in &self.draws {
                let Some(pipelines) = self.pipelines.get(&draw.pipeline) else {
                    continue;
                };
                let pipeline = match (&pipelines.line, wireframe) {
                    (Some(line), true) => line,
                    _ => &pipelines.fill,
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &draw.bind_group, &[]);
                draw.mesh.draw(&mut pass);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_is_normalized() {
        let light = light_direction();
        assert!((light.xyz().norm() - 1.0).abs() < 1e-6);
        assert_eq!(light.w, 0.0);
        assert!(light.x < 0.0 && light.y > 0.0 && light.z > 0.0);
    }
}
