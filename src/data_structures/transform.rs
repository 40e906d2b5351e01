//! Local node transformation.
//!
//! Every node of a model carries a position, a rotation and a scale relative
//! to its parent. World transforms are obtained by multiplying the matrices
//! down the tree.

use cgmath::One;

/// Position, rotation (as quaternion) and scale of a node relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Multiplies all three scale components by the same `factor`.
    pub fn scale_uniformly(&mut self, factor: f32) {
        self.scale *= factor;
    }

    pub fn is_finite(&self) -> bool {
        let v = self.rotation.v;
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.rotation.s,
            v.x,
            v.y,
            v.z,
            self.scale.x,
            self.scale.y,
            self.scale.z,
        ]
        .iter()
        .all(|c| c.is_finite())
    }

    /// A zero scale component collapses the subtree and makes bounds meaningless.
    pub fn has_degenerate_scale(&self) -> bool {
        self.scale.x == 0.0 || self.scale.y == 0.0 || self.scale.z == 0.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Rotation3, Transform as _};

    use super::*;

    #[test]
    fn default_is_identity() {
        let p = Transform::default()
            .to_matrix()
            .transform_point(cgmath::Point3::new(1.0, 2.0, 3.0));
        assert_eq!(p, cgmath::Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn translation_is_applied_after_scale() {
        let mut t = Transform::new();
        t.position = cgmath::Vector3::new(1.0, 0.0, 0.0);
        t.scale_uniformly(2.0);
        let p = t
            .to_matrix()
            .transform_point(cgmath::Point3::new(0.0, 3.0, 0.0));
        assert_eq!(p, cgmath::Point3::new(1.0, 6.0, 0.0));
    }

    #[test]
    fn rotation_turns_about_the_node_origin() {
        let t = Transform {
            rotation: cgmath::Quaternion::from_angle_y(cgmath::Deg(90.0)),
            ..Transform::new()
        };
        let p = t
            .to_matrix()
            .transform_point(cgmath::Point3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-6);
        assert!((p.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn detects_broken_transforms() {
        let mut t = Transform::new();
        assert!(t.is_finite());
        assert!(!t.has_degenerate_scale());
        t.scale.y = 0.0;
        assert!(t.has_degenerate_scale());
        t.position.x = f32::NAN;
        assert!(!t.is_finite());
    }
}
