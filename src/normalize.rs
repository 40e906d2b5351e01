//! Uniform rescaling so every asset fits a common size.

use crate::data_structures::model::Model;

pub const DEFAULT_TARGET_SIZE: f32 = 1.0;

/**
 * Shrinks `model` so its largest bounding-box dimension equals `target_size`.
 *
 * Models that already fit are left untouched; nothing is ever scaled up. The
 * factor is applied to the root transform, equally on all three axes, and
 * returned (`1.0` when nothing changed).
 */
pub fn normalize(model: &mut Model, target_size: f32) -> f32 {
    let max_dimension = model.bounding_box().max_dimension();
    if max_dimension > target_size {
        let factor = target_size / max_dimension;
        model.root.transform.scale_uniformly(factor);
        factor
    } else {
        1.0
    }
}
