use std::fmt;

use thiserror::Error;

/// Vertex attribute a face corner refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    Position,
    Normal,
    TexCoord,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attribute::Position => "position",
            Attribute::Normal => "normal",
            Attribute::TexCoord => "texcoord",
        })
    }
}

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Failed to read OBJ {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed OBJ {path}, line {line}: {message}")]
    Syntax {
        path: String,
        line: usize,
        message: String,
    },
    #[error(
        "Face on line {line} of shape '{shape}' references {attribute} index {index}, but only {available} are defined"
    )]
    IndexOutOfRange {
        shape: String,
        line: usize,
        attribute: Attribute,
        index: i64,
        available: usize,
    },
    #[error("Too many vertices for a 32-bit index buffer (>{})", u32::MAX)]
    TooManyVertices,
    #[error("Interleaved vertex data has {0} floats, not a multiple of 8")]
    MisalignedVertices(usize),
    #[error("Index buffer has {0} entries, not a multiple of 3")]
    IncompleteTriangle(usize),
    #[error("Index {index} is out of range for {vertex_count} vertices")]
    VertexIndexOutOfRange { index: u32, vertex_count: usize },
    #[error("Grid needs at least 2 points per side, got {0}")]
    GridTooSmall(usize),
}

pub type MeshResult<T> = Result<T, MeshError>;
