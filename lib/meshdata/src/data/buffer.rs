//! Packing [MeshData] into GPU-ready byte buffers.

use protomesh_common::ArrayIndex;

use crate::{
    attribute::{
        as_bytes, Attribute, AttributeComponent, AttributeFormat, AttributeUsage,
    },
    check_indices, MeshData, MeshError,
};

#[cfg(feature = "wgpu")]
mod wgpu;
#[cfg(feature = "wgpu")]
pub use self::wgpu::*;

#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error("vertex buffer has no {0:?} attribute")]
    MissingAttribute(AttributeUsage),
    #[error("{usage:?} attribute is stored as {stored:?}; requested {requested:?}")]
    AttributeFormat {
        usage: AttributeUsage,
        stored: AttributeFormat,
        requested: AttributeFormat,
    },
    #[error("index {index} at position {position} does not fit in {format:?}")]
    IndexOverflow {
        position: usize,
        index: u32,
        format: IndexFormat,
    },
    #[error("attribute range out of bounds of buffer")]
    RangeOverflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferType {
    Array,
    ElementArray,
}

/// A data blob which can be sent to the GPU
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    pub data: Vec<u8>,
}

impl Buffer {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.data.as_slice()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append attribute values to the end of the buffer.
    #[inline]
    pub fn extend_from<T: Attribute>(&mut self, values: &[T]) {
        self.data.extend_from_slice(as_bytes(values));
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

/// How vertex attributes are arranged within a [VertexBuffer].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexLayout {
    /// `[P, N, U, C, P, N, U, C, ...]`
    #[default]
    Interleaved,
    /// `[P, P, ..., N, N, ..., U, U, ...]`
    Separate,
}

/// Where one attribute lives within a [VertexBuffer].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeBinding {
    pub usage: AttributeUsage,
    /// Shader input location
    pub location: u32,
    pub format: AttributeFormat,
    /// Byte offset of the first value
    pub offset: usize,
    /// Bytes between consecutive values
    pub stride: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexBuffer {
    pub buffer: Buffer,
    pub layout: VertexLayout,
    pub bindings: Vec<AttributeBinding>,
    pub vertex_count: usize,
}

impl VertexBuffer {
    pub const TYPE: BufferType = BufferType::Array;

    /// Pack every populated attribute of `mesh` in [canonical order](AttributeUsage::ALL).
    ///
    /// Fails if the mesh doesn't [validate](MeshData::validate).
    pub fn pack(mesh: &MeshData<f32>, layout: VertexLayout) -> Result<Self, BufferError> {
        mesh.validate()?;
        let vertex_count = mesh.vertex_count();
        let vertex_size = mesh.vertex_size();

        let mut bindings = Vec::new();
        let mut offset = 0;
        for usage in mesh.attribute_usages() {
            let format = AttributeFormat::new(usage.attr_type(), AttributeComponent::F32);
            let size = format.size_bytes();
            let stride = match layout {
                VertexLayout::Interleaved => vertex_size,
                VertexLayout::Separate => size,
            };
            bindings.push(AttributeBinding {
                usage,
                location: usage.location(),
                format,
                offset,
                stride,
            });
            offset += match layout {
                VertexLayout::Interleaved => size,
                VertexLayout::Separate => size * vertex_count,
            };
        }

        let mut buffer = Buffer::with_capacity(vertex_size * vertex_count);
        match layout {
            VertexLayout::Interleaved => {
                let sources = bindings
                    .iter()
                    .map(|b| (attribute_bytes(mesh, b.usage), b.format.size_bytes()))
                    .collect::<Vec<_>>();
                for i in 0..vertex_count {
                    for (bytes, size) in &sources {
                        buffer.data.extend_from_slice(&bytes[i * size..(i + 1) * size]);
                    }
                }
            }
            VertexLayout::Separate => {
                for binding in &bindings {
                    buffer
                        .data
                        .extend_from_slice(attribute_bytes(mesh, binding.usage));
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            ?layout,
            vertex_count,
            bytes = buffer.len(),
            attributes = bindings.len(),
            "packed vertex buffer"
        );

        Ok(Self {
            buffer,
            layout,
            bindings,
            vertex_count,
        })
    }

    pub fn binding(&self, usage: AttributeUsage) -> Option<&AttributeBinding> {
        self.bindings.iter().find(|b| b.usage == usage)
    }

    /// Read the values of one attribute back out of the buffer.
    #[allow(unsafe_code)]
    pub fn read<T: Attribute>(&self, usage: AttributeUsage) -> Result<Vec<T>, BufferError> {
        let binding = self
            .binding(usage)
            .ok_or(BufferError::MissingAttribute(usage))?;
        let requested = AttributeFormat::of::<T>();
        if binding.format != requested {
            return Err(BufferError::AttributeFormat {
                usage,
                stored: binding.format,
                requested,
            });
        }
        let size = requested.size_bytes();
        (0..self.vertex_count)
            .map(|i| {
                let start = binding.offset + i * binding.stride;
                let bytes = self
                    .buffer
                    .data
                    .get(start..start + size)
                    .ok_or(BufferError::RangeOverflow)?;
                // safety: `Attribute` guarantees every bit pattern of `size` bytes is a valid T
                Ok(unsafe { std::ptr::read_unaligned(bytes.as_ptr() as *const T) })
            })
            .collect()
    }
}

fn attribute_bytes(mesh: &MeshData<f32>, usage: AttributeUsage) -> &[u8] {
    match usage {
        AttributeUsage::Position => mesh.positions.as_deref().map(as_bytes),
        AttributeUsage::Normal => mesh.normals.as_deref().map(as_bytes),
        AttributeUsage::Texcoord => mesh.texcoords.as_deref().map(as_bytes),
        AttributeUsage::Color => mesh.colors.as_deref().map(as_bytes),
    }
    .unwrap_or(&[])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    pub const fn size(self) -> usize {
        match self {
            IndexFormat::U16 => std::mem::size_of::<u16>(),
            IndexFormat::U32 => std::mem::size_of::<u32>(),
        }
    }
}

/// Integer types an [IndexBuffer] can be packed as.
pub trait IndexElement: ArrayIndex + Attribute {
    const FORMAT: IndexFormat;
}

impl IndexElement for u16 {
    const FORMAT: IndexFormat = IndexFormat::U16;
}

impl IndexElement for u32 {
    const FORMAT: IndexFormat = IndexFormat::U32;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBuffer {
    pub buffer: Buffer,
    pub format: IndexFormat,
    pub count: usize,
}

impl IndexBuffer {
    pub const TYPE: BufferType = BufferType::ElementArray;

    /// Pack `indices` using the narrowest [IndexFormat] that holds every value.
    pub fn pack(indices: &[u32], vertex_count: usize) -> Result<Self, BufferError> {
        let max = indices.iter().copied().max().unwrap_or(0);
        if max <= u16::MAX as u32 {
            Self::pack_as::<u16>(indices, vertex_count)
        } else {
            Self::pack_as::<u32>(indices, vertex_count)
        }
    }

    /// Pack `indices` as `Idx`, failing if any of them doesn't fit.
    pub fn pack_as<Idx: IndexElement>(
        indices: &[u32],
        vertex_count: usize,
    ) -> Result<Self, BufferError> {
        check_indices(indices, vertex_count)?;
        let values = indices
            .iter()
            .enumerate()
            .map(|(position, &index)| {
                num_traits::cast::<u32, Idx>(index).ok_or(BufferError::IndexOverflow {
                    position,
                    index,
                    format: Idx::FORMAT,
                })
            })
            .collect::<Result<Vec<Idx>, _>>()?;
        let mut buffer = Buffer::with_capacity(values.len() * Idx::FORMAT.size());
        buffer.extend_from(&values);

        #[cfg(feature = "tracing")]
        tracing::debug!(format = ?Idx::FORMAT, count = values.len(), "packed index buffer");

        Ok(Self {
            buffer,
            format: Idx::FORMAT,
            count: values.len(),
        })
    }

    /// Decode the stored indices.
    pub fn read(&self) -> Vec<u32> {
        match self.format {
            IndexFormat::U16 => self
                .buffer
                .data
                .chunks_exact(2)
                .map(|c| u16::from_ne_bytes([c[0], c[1]]) as u32)
                .collect(),
            IndexFormat::U32 => self
                .buffer
                .data
                .chunks_exact(4)
                .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        }
    }
}

/// Everything needed to draw one mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshBuffers {
    pub vertices: VertexBuffer,
    pub indices: Option<IndexBuffer>,
}

impl MeshBuffers {
    pub fn pack(mesh: &MeshData<f32>, layout: VertexLayout) -> Result<Self, BufferError> {
        let vertices = VertexBuffer::pack(mesh, layout)?;
        let indices = mesh
            .indices
            .as_deref()
            .map(|i| IndexBuffer::pack(i, vertices.vertex_count))
            .transpose()?;
        Ok(Self { vertices, indices })
    }

    /// Number of elements a draw call covers; non-indexed meshes draw every vertex as a
    /// triangle list.
    pub fn draw_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.vertices.vertex_count, |i| i.count)
    }
}
