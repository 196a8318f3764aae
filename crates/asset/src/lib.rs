//! Asset loading for the viewer.
//! OBJ meshes are deduplicated into an interleaved vertex buffer plus a u32
//! index buffer, ready for upload with the layout in [`layout`].

pub mod error;
pub mod layout;
pub mod material;
pub mod mesh;
pub mod obj;

pub use error::{MeshError, MeshResult};
pub use mesh::{Mesh, MeshVertex};
pub use obj::{ObjAsset, ParseMode};
