use crate::{EulerRot, Mat4, Quat, Vec3};

/// Object-space model transform applied to mesh data before upload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles in degrees (XYZ order).
    pub rotation_deg: Vec3,
    pub scale: Vec3,
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation_deg: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    #[inline]
    pub fn from_trs(translation: Vec3, rotation_deg: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation_deg,
            scale,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Build matrix = T * R * S (column-major Mat4 per glam).
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        let q = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation_deg.x.to_radians(),
            self.rotation_deg.y.to_radians(),
            self.rotation_deg.z.to_radians(),
        );
        Mat4::from_scale_rotation_translation(self.scale, q, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Inverse transpose of `m`: the matrix that carries normals through `m`.
///
/// Returns `None` for a singular matrix.
pub fn normal_matrix(m: Mat4) -> Option<Mat4> {
    let det = m.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    Some(m.inverse().transpose())
}
