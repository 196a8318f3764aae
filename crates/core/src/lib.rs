//! Core types: math re-exports, bounds and object-space transforms.

pub use glam::{EulerRot, Mat4, Quat, Vec3, Vec4, vec3};

pub mod bounds;
pub mod transform;
