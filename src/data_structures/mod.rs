//! Asset data structures: the model tree, transforms and bounding volumes.
//!
//! - `model` contains nodes, geometry and material descriptors and the `Model` tree
//! - `transform` holds per-node position, rotation and scale
//! - `bounds` has axis-aligned boxes and bounding spheres

pub mod bounds;
pub mod model;
pub mod transform;
