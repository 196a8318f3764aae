//! Axis-aligned bounding boxes over object-space positions.

use crate::{Mat4, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing every point, or `None` for an empty set.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn max_extent(&self) -> f32 {
        self.extent().max_element()
    }

    /// Matrix moving the box center to the origin and scaling uniformly so the
    /// largest side becomes 1.0: `scale(1 / max_extent) * translate(-center)`.
    ///
    /// A flat box (zero max extent) is only translated.
    pub fn unit_fit_matrix(&self) -> Mat4 {
        let translate = Mat4::from_translation(-self.center());
        let max_extent = self.max_extent();
        if max_extent > 0.0 && max_extent.is_finite() {
            Mat4::from_scale(Vec3::splat(1.0 / max_extent)) * translate
        } else {
            translate
        }
    }
}
