//! Bounding volumes used for normalization, picking and culling.

use cgmath::{InnerSpace, Transform as _};

/// Axis-aligned bounding box.
///
/// The empty box has `min = +inf` and `max = -inf` so that expanding it by the
/// first point yields a degenerate box around that point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: cgmath::Point3<f32>,
    pub max: cgmath::Point3<f32>,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: cgmath::Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: cgmath::Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Box centered on the origin with the given full extents.
    pub fn centered(width: f32, height: f32, depth: f32) -> Self {
        let half = cgmath::Vector3::new(width / 2.0, height / 2.0, depth / 2.0);
        Self {
            min: cgmath::Point3::new(-half.x, -half.y, -half.z),
            max: cgmath::Point3::new(half.x, half.y, half.z),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand_point((*p).into());
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_point(&mut self, p: cgmath::Point3<f32>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn union(&mut self, other: &Aabb) {
        if other.is_empty() {
            return;
        }
        self.expand_point(other.min);
        self.expand_point(other.max);
    }

    /// Width, height and depth. Zero for an empty box.
    pub fn size(&self) -> cgmath::Vector3<f32> {
        if self.is_empty() {
            return cgmath::Vector3::new(0.0, 0.0, 0.0);
        }
        self.max - self.min
    }

    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }

    pub fn center(&self) -> cgmath::Point3<f32> {
        cgmath::Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /**
     * Transforms all eight corners and returns the box around them.
     *
     * For rotated nodes this is a conservative bound, never a tight one.
     */
    pub fn transformed(&self, matrix: &cgmath::Matrix4<f32>) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let mut out = Aabb::empty();
        for &x in &[self.min.x, self.max.x] {
            for &y in &[self.min.y, self.max.y] {
                for &z in &[self.min.z, self.max.z] {
                    out.expand_point(matrix.transform_point(cgmath::Point3::new(x, y, z)));
                }
            }
        }
        out
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: cgmath::Point3<f32>,
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere around the box center that contains every point.
    pub fn from_points(points: &[[f32; 3]]) -> Self {
        let center = Aabb::from_points(points).center();
        if points.is_empty() {
            return Self {
                center: cgmath::Point3::new(0.0, 0.0, 0.0),
                radius: 0.0,
            };
        }
        let radius = points
            .iter()
            .map(|p| (cgmath::Point3::from(*p) - center).magnitude())
            .fold(0.0_f32, f32::max);
        Self { center, radius }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_has_no_size() {
        let aabb = Aabb::empty();
        assert!(aabb.is_empty());
        assert_eq!(aabb.max_dimension(), 0.0);
    }

    #[test]
    fn union_ignores_empty_boxes() {
        let mut aabb = Aabb::centered(2.0, 4.0, 6.0);
        aabb.union(&Aabb::empty());
        assert_eq!(aabb, Aabb::centered(2.0, 4.0, 6.0));
        assert_eq!(aabb.max_dimension(), 6.0);
    }

    #[test]
    fn translation_moves_box() {
        let m = cgmath::Matrix4::from_translation(cgmath::Vector3::new(10.0, 0.0, 0.0));
        let moved = Aabb::centered(1.0, 1.0, 1.0).transformed(&m);
        assert_eq!(moved.min, cgmath::Point3::new(9.5, -0.5, -0.5));
        assert_eq!(moved.max, cgmath::Point3::new(10.5, 0.5, 0.5));
    }

    #[test]
    fn sphere_contains_all_points() {
        let points = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]];
        let sphere = BoundingSphere::from_points(&points);
        assert_eq!(sphere.center, cgmath::Point3::new(1.0, 1.0, 0.0));
        for p in points {
            let d = (cgmath::Point3::from(p) - sphere.center).magnitude();
            assert!(d <= sphere.radius + 1e-6);
        }
    }
}
