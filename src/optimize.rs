//! Render-oriented post-processing applied to every resolved model before it is cached.
//!
//! Each node is handled according to its [`Capabilities`] tag: shadows are
//! enabled, reflection intensity is lowered so placeholders don't look
//! over-bright, and mesh bounds are precomputed for picking and culling.

use crate::data_structures::model::{Capabilities, Geometry, Model};

pub const DEFAULT_REFLECTION_INTENSITY: f32 = 0.5;

pub fn optimize(model: &mut Model, reflection_intensity: f32) {
    model.visit_mut(&mut |node| {
        let caps = node.capabilities;
        if caps.contains(Capabilities::SHADOWS) {
            node.cast_shadow = true;
            node.receive_shadow = true;
        }
        if caps.contains(Capabilities::REFLECTION_INTENSITY) {
            if let Some(material) = node.material.as_mut() {
                material.env_map_intensity = Some(reflection_intensity);
            }
        }
        if caps.contains(Capabilities::MESH_BOUNDS) {
            if let Some(Geometry::Mesh(mesh)) = node.geometry.as_mut() {
                mesh.compute_bounds();
            }
        }
    });
}
