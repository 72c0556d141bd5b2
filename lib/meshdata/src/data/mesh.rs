use nalgebra::Scalar;

use crate::attribute::{AttributeUsage, Normal, Position, Rgba, Texcoord};

/// Reasons a [MeshData] cannot be packed into buffers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("mesh has no vertex attributes")]
    Empty,
    #[error("{usage:?} attribute has {actual} values; expected {expected}")]
    AttributeCount {
        usage: AttributeUsage,
        expected: usize,
        actual: usize,
    },
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),
    #[error("index {index} at position {position} is out of range: 0..{vertex_count} ∌ {index}")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// Vertex data for a single mesh: a set of optional, parallel attribute sequences and an
/// optional triangle list.
///
/// # Invariants
///
/// Not enforced on construction, but checked by [MeshData::validate] and required by the
/// [buffer](crate::buffer) packers:
///
/// * every populated attribute sequence has the same length (the vertex count)
/// * if present, `indices.len() % 3 == 0` and every index is `< vertex_count`
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData<Real: Scalar = f32> {
    pub positions: Option<Vec<Position<Real>>>,
    pub normals: Option<Vec<Normal<Real>>>,
    pub texcoords: Option<Vec<Texcoord<Real>>>,
    pub colors: Option<Vec<Rgba<Real>>>,
    /// Triangle list, counter-clockwise front faces
    pub indices: Option<Vec<u32>>,
}

impl<Real: Scalar> Default for MeshData<Real> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Real: Scalar> MeshData<Real> {
    /// Construct a mesh with no attributes and no indices.
    pub fn new() -> Self {
        Self {
            positions: None,
            normals: None,
            texcoords: None,
            colors: None,
            indices: None,
        }
    }

    /// Number of values stored for `usage`, or `None` if that attribute isn't present.
    pub fn attribute_len(&self, usage: AttributeUsage) -> Option<usize> {
        match usage {
            AttributeUsage::Position => self.positions.as_ref().map(Vec::len),
            AttributeUsage::Normal => self.normals.as_ref().map(Vec::len),
            AttributeUsage::Texcoord => self.texcoords.as_ref().map(Vec::len),
            AttributeUsage::Color => self.colors.as_ref().map(Vec::len),
        }
    }

    #[inline]
    pub fn has_attribute(&self, usage: AttributeUsage) -> bool {
        self.attribute_len(usage).is_some()
    }

    /// The populated attributes, in packing order.
    pub fn attribute_usages(&self) -> impl Iterator<Item = AttributeUsage> + '_ {
        AttributeUsage::ALL
            .into_iter()
            .filter(|u| self.has_attribute(*u))
    }

    /// The number of vertices; i.e. the length of the longest attribute sequence.
    pub fn vertex_count(&self) -> usize {
        AttributeUsage::ALL
            .into_iter()
            .filter_map(|u| self.attribute_len(u))
            .max()
            .unwrap_or(0)
    }

    /// Size in bytes of a single vertex with every populated attribute.
    pub fn vertex_size(&self) -> usize {
        use std::mem::size_of;
        self.attribute_usages()
            .map(|u| match u {
                AttributeUsage::Position => size_of::<Position<Real>>(),
                AttributeUsage::Normal => size_of::<Normal<Real>>(),
                AttributeUsage::Texcoord => size_of::<Texcoord<Real>>(),
                AttributeUsage::Color => size_of::<Rgba<Real>>(),
            })
            .sum()
    }

    /// Whether every populated attribute sequence is either empty or [vertex_count](Self::vertex_count) long.
    pub fn has_valid_attribute_count(&self) -> bool {
        let count = self.vertex_count();
        AttributeUsage::ALL
            .into_iter()
            .filter_map(|u| self.attribute_len(u))
            .all(|len| len == 0 || len == count)
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.index_count() / 3
    }

    /// Check the invariants described in the type documentation.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.vertex_size() == 0 {
            return Err(MeshError::Empty);
        }
        let vertex_count = self.vertex_count();
        for usage in self.attribute_usages() {
            let actual = self.attribute_len(usage).unwrap_or(0);
            if actual != vertex_count {
                return Err(MeshError::AttributeCount {
                    usage,
                    expected: vertex_count,
                    actual,
                });
            }
        }
        if let Some(indices) = &self.indices {
            if indices.len() % 3 != 0 {
                return Err(MeshError::IncompleteTriangle(indices.len()));
            }
            check_indices(indices, vertex_count)?;
        }
        Ok(())
    }
}

/// Ensure every index refers to one of `vertex_count` vertices.
pub(crate) fn check_indices(indices: &[u32], vertex_count: usize) -> Result<(), MeshError> {
    match indices
        .iter()
        .enumerate()
        .find(|(_, &i)| i as usize >= vertex_count)
    {
        Some((position, &index)) => Err(MeshError::IndexOutOfRange {
            position,
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}
