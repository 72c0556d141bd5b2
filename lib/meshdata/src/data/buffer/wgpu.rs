use wgpu::util::DeviceExt;

use super::{BufferType, IndexFormat, MeshBuffers, VertexBuffer, VertexLayout};
use crate::attribute::{AttributeComponent, AttributeFormat, AttributeType, AttributeUsage};

impl BufferType {
    pub fn to_wgpu(self) -> wgpu::BufferUsages {
        match self {
            Self::Array => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            Self::ElementArray => wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        }
    }
}

impl IndexFormat {
    pub fn to_wgpu(self) -> wgpu::IndexFormat {
        match self {
            Self::U16 => wgpu::IndexFormat::Uint16,
            Self::U32 => wgpu::IndexFormat::Uint32,
        }
    }
}

impl AttributeFormat {
    /// The matching vertex format, if wgpu has one.
    pub fn to_wgpu(self) -> Option<wgpu::VertexFormat> {
        use AttributeComponent as C;
        use AttributeType as T;
        use wgpu::VertexFormat as V;
        Some(match (self.ty, self.comp) {
            (T::Scalar, C::F32) => V::Float32,
            (T::Vec2, C::F32) => V::Float32x2,
            (T::Vec3, C::F32) => V::Float32x3,
            (T::Vec4, C::F32) => V::Float32x4,
            (T::Scalar, C::U32) => V::Uint32,
            (T::Vec2, C::U32) => V::Uint32x2,
            (T::Vec3, C::U32) => V::Uint32x3,
            (T::Vec4, C::U32) => V::Uint32x4,
            (T::Vec2, C::U16) => V::Uint16x2,
            (T::Vec4, C::U16) => V::Uint16x4,
            (T::Scalar | T::Vec3, C::U16) => return None,
        })
    }
}

/// One vertex buffer slot: the attributes read from it and where it starts in the
/// underlying buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexSlot {
    /// Byte offset into the vertex buffer at which this slot is bound
    pub offset: u64,
    pub array_stride: u64,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexSlot {
    pub fn layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

impl VertexBuffer {
    /// Vertex buffer slots for this buffer: one for [VertexLayout::Interleaved], one per
    /// attribute for [VertexLayout::Separate].
    ///
    /// Attributes with no wgpu vertex format are skipped.
    pub fn wgpu_slots(&self) -> Vec<VertexSlot> {
        let attribute = |b: &super::AttributeBinding, offset: u64| {
            b.format.to_wgpu().map(|format| wgpu::VertexAttribute {
                format,
                offset,
                shader_location: b.location,
            })
        };
        match self.layout {
            VertexLayout::Interleaved => vec![VertexSlot {
                offset: 0,
                array_stride: self.bindings.first().map_or(0, |b| b.stride as u64),
                attributes: self
                    .bindings
                    .iter()
                    .filter_map(|b| attribute(b, b.offset as u64))
                    .collect(),
            }],
            VertexLayout::Separate => self
                .bindings
                .iter()
                .filter_map(|b| {
                    attribute(b, 0).map(|attr| VertexSlot {
                        offset: b.offset as u64,
                        array_stride: b.stride as u64,
                        attributes: vec![attr],
                    })
                })
                .collect(),
        }
    }

    pub fn wgpu_layouts<'s>(slots: &'s [VertexSlot]) -> Vec<wgpu::VertexBufferLayout<'s>> {
        slots.iter().map(VertexSlot::layout).collect()
    }
}

/// A mesh uploaded to the GPU.
#[derive(Debug)]
pub struct GpuMesh {
    pub vertices: wgpu::Buffer,
    pub indices: Option<(wgpu::Buffer, wgpu::IndexFormat)>,
    pub layout: VertexLayout,
    pub usages: Vec<AttributeUsage>,
    pub slots: Vec<VertexSlot>,
    /// Number of indices, or vertices for non-indexed meshes
    pub count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, label: Option<&str>, mesh: &MeshBuffers) -> Self {
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label,
            contents: mesh.vertices.buffer.as_slice(),
            usage: VertexBuffer::TYPE.to_wgpu(),
        });
        let indices = mesh.indices.as_ref().map(|i| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label,
                contents: i.buffer.as_slice(),
                usage: super::IndexBuffer::TYPE.to_wgpu(),
            });
            (buffer, i.format.to_wgpu())
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(
            label,
            vertex_bytes = mesh.vertices.buffer.len(),
            count = mesh.draw_count(),
            "uploaded mesh"
        );

        Self {
            vertices,
            indices,
            layout: mesh.vertices.layout,
            usages: mesh.vertices.bindings.iter().map(|b| b.usage).collect(),
            slots: mesh.vertices.wgpu_slots(),
            count: mesh.draw_count() as u32,
        }
    }

    pub fn layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        VertexBuffer::wgpu_layouts(&self.slots)
    }

    /// Bind every vertex slot (and the index buffer, if any) and draw the whole mesh.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.count == 0 {
            return;
        }
        for (i, slot) in self.slots.iter().enumerate() {
            pass.set_vertex_buffer(i as u32, self.vertices.slice(slot.offset..));
        }
        match &self.indices {
            Some((buffer, format)) => {
                pass.set_index_buffer(buffer.slice(..), *format);
                pass.draw_indexed(0..self.count, 0, 0..1);
            }
            None => pass.draw(0..self.count, 0..1),
        }
    }
}
