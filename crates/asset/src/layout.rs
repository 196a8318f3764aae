//! Vertex buffer layout of [`MeshVertex`] as consumed by the shaders.
//! Location 0: position, 1: normal, 2: uv; one interleaved buffer.

use std::mem::{offset_of, size_of};

use crate::mesh::MeshVertex;

/// One float vertex attribute inside the interleaved buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    /// Shader input location.
    pub location: u32,
    /// Number of `f32` components.
    pub components: u32,
    /// Byte offset from the start of the vertex.
    pub offset: usize,
}

impl VertexAttribute {
    pub const fn offset_floats(&self) -> usize {
        self.offset / size_of::<f32>()
    }
}

/// Distance in bytes between consecutive vertices.
pub const VERTEX_STRIDE: usize = size_of::<MeshVertex>();

pub const POSITION: VertexAttribute = VertexAttribute {
    name: "position",
    location: 0,
    components: 3,
    offset: offset_of!(MeshVertex, position),
};

pub const NORMAL: VertexAttribute = VertexAttribute {
    name: "normal",
    location: 1,
    components: 3,
    offset: offset_of!(MeshVertex, normal),
};

pub const UV: VertexAttribute = VertexAttribute {
    name: "uv",
    location: 2,
    components: 2,
    offset: offset_of!(MeshVertex, uv),
};

pub const ATTRIBUTES: [VertexAttribute; 3] = [POSITION, NORMAL, UV];
