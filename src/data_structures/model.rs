//! The model tree.
//!
//! A [`Model`] owns a root [`Node`]; every node owns its children by value, so
//! `Model::clone` is a deep copy that shares nothing with its source. This is
//! what lets the loader hand out clones that callers may mutate freely.

use bitflags::bitflags;

use crate::{
    data_structures::{
        bounds::{Aabb, BoundingSphere},
        transform::Transform,
    },
    error::ModelDefect,
};

bitflags! {
    /// What the optimizer may do to a node. Set once when the node is built.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// The node is drawn and can cast/receive shadows.
        const SHADOWS = 1;
        /// The geometry is a raw mesh buffer whose bounds can be precomputed.
        const MESH_BOUNDS = 1 << 1;
        /// The material has an environment-reflection intensity.
        const REFLECTION_INTENSITY = 1 << 2;
    }
}

/// Linear RGB colour with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_hex(&self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    /// `Some` when the material reacts to environment maps.
    pub env_map_intensity: Option<f32>,
}

impl Material {
    /// Physically based material; supports reflection intensity.
    pub fn standard(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
            env_map_intensity: Some(1.0),
        }
    }

    /// Unlit material without environment reflections.
    pub fn basic(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
            env_map_intensity: None,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self.transparent = opacity < 1.0;
        self
    }
}

/// Precomputed bounds of a mesh buffer, in the mesh's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshBounds {
    pub aabb: Aabb,
    pub sphere: BoundingSphere,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshBuffer {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub bounds: Option<MeshBounds>,
}

impl MeshBuffer {
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            bounds: None,
        }
    }

    pub fn compute_bounds(&mut self) -> MeshBounds {
        let bounds = MeshBounds {
            aabb: Aabb::from_points(&self.positions),
            sphere: BoundingSphere::from_points(&self.positions),
        };
        self.bounds = Some(bounds);
        bounds
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// Box centered on the node origin.
    Cuboid { width: f32, height: f32, depth: f32 },
    /// Possibly tapered cylinder along the y axis, centered on the node origin.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    Mesh(MeshBuffer),
}

impl Geometry {
    pub fn local_bounds(&self) -> Aabb {
        match self {
            Geometry::Cuboid {
                width,
                height,
                depth,
            } => Aabb::centered(*width, *height, *depth),
            Geometry::Cylinder {
                radius_top,
                radius_bottom,
                height,
            } => {
                let diameter = 2.0 * radius_top.max(*radius_bottom);
                Aabb::centered(diameter, *height, diameter)
            }
            Geometry::Mesh(mesh) => match &mesh.bounds {
                Some(bounds) => bounds.aabb,
                None => Aabb::from_points(&mesh.positions),
            },
        }
    }

    fn defect(&self, node: &str) -> Option<ModelDefect> {
        let invalid = || ModelDefect::InvalidGeometry {
            node: node.to_string(),
        };
        match self {
            Geometry::Cuboid {
                width,
                height,
                depth,
            } => [width, height, depth]
                .iter()
                .any(|d| !d.is_finite() || **d < 0.0)
                .then(invalid),
            Geometry::Cylinder {
                radius_top,
                radius_bottom,
                height,
            } => [radius_top, radius_bottom, height]
                .iter()
                .any(|d| !d.is_finite() || **d < 0.0)
                .then(invalid),
            Geometry::Mesh(mesh) => {
                if mesh.positions.is_empty()
                    || mesh.positions.iter().flatten().any(|c| !c.is_finite())
                {
                    return Some(invalid());
                }
                mesh.indices
                    .iter()
                    .find(|&&i| i as usize >= mesh.positions.len())
                    .map(|&index| ModelDefect::IndexOutOfRange {
                        node: node.to_string(),
                        index,
                        len: mesh.positions.len(),
                    })
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub geometry: Option<Geometry>,
    pub material: Option<Material>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub capabilities: Capabilities,
    pub children: Vec<Node>,
}

impl Node {
    /// A node without geometry that only groups its children.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            geometry: None,
            material: None,
            cast_shadow: false,
            receive_shadow: false,
            capabilities: Capabilities::empty(),
            children: Vec::new(),
        }
    }

    /// A drawable node. Its capability tag is derived from the geometry and material kinds.
    pub fn drawable(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        let mut capabilities = Capabilities::SHADOWS;
        if let Geometry::Mesh(_) = geometry {
            capabilities |= Capabilities::MESH_BOUNDS;
        }
        if material.env_map_intensity.is_some() {
            capabilities |= Capabilities::REFLECTION_INTENSITY;
        }
        Self {
            geometry: Some(geometry),
            material: Some(material),
            capabilities,
            ..Self::group(name)
        }
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = cgmath::Vector3::new(x, y, z);
        self
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn is_drawable(&self) -> bool {
        self.geometry.is_some()
    }

    /// Depth-first, pre-order traversal starting at `self`.
    pub fn iter(&self) -> Nodes<'_> {
        Nodes { stack: vec![self] }
    }

    pub fn visit_mut(&mut self, visitor: &mut dyn FnMut(&mut Node)) {
        visitor(self);
        for child in self.children.iter_mut() {
            child.visit_mut(visitor);
        }
    }

    fn accumulate_bounds(&self, parent: &cgmath::Matrix4<f32>, out: &mut Aabb) {
        let world = parent * self.transform.to_matrix();
        if let Some(geometry) = &self.geometry {
            out.union(&geometry.local_bounds().transformed(&world));
        }
        for child in &self.children {
            child.accumulate_bounds(&world, out);
        }
    }

    fn defect(&self) -> Option<ModelDefect> {
        if !self.transform.is_finite() {
            return Some(ModelDefect::NonFiniteTransform {
                node: self.name.clone(),
            });
        }
        if self.transform.has_degenerate_scale() {
            return Some(ModelDefect::DegenerateScale {
                node: self.name.clone(),
            });
        }
        if let Some(material) = &self.material {
            if !(0.0..=1.0).contains(&material.opacity) {
                return Some(ModelDefect::OpacityOutOfRange {
                    node: self.name.clone(),
                    opacity: material.opacity,
                });
            }
        }
        self.geometry.as_ref().and_then(|g| g.defect(&self.name))
    }
}

pub struct Nodes<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// One loadable 3D asset.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub root: Node,
}

impl Model {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// A model with a bare root and nothing to draw.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(Node::group(name))
    }

    pub fn nodes(&self) -> Nodes<'_> {
        self.root.iter()
    }

    pub fn drawables(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|n| n.is_drawable())
    }

    pub fn is_empty(&self) -> bool {
        self.drawables().next().is_none()
    }

    pub fn find(&self, name: &str) -> Option<&Node> {
        self.nodes().find(|n| n.name == name)
    }

    pub fn visit_mut(&mut self, visitor: &mut dyn FnMut(&mut Node)) {
        self.root.visit_mut(visitor);
    }

    /// World-space bounding box of all geometry, root transform included.
    pub fn bounding_box(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        self.root
            .accumulate_bounds(&cgmath::Matrix4::from_scale(1.0), &mut aabb);
        aabb
    }

    /// Checks that the tree can be measured, cloned and drawn. Reports the first defect found.
    pub fn validate(&self) -> Result<(), ModelDefect> {
        match self.nodes().find_map(Node::defect) {
            Some(defect) => Err(defect),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(name: &str, size: f32) -> Node {
        Node::drawable(
            name,
            Geometry::Cuboid {
                width: size,
                height: size,
                depth: size,
            },
            Material::standard(Color::from_hex(0xff0000)),
        )
    }

    #[test]
    fn hex_round_trips_through_color() {
        assert_eq!(Color::from_hex(0x808080).to_hex(), 0x808080);
        assert_eq!(Color::from_hex(0xffff00), Color::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn capabilities_follow_geometry_and_material() {
        let cuboid = cube("c", 1.0);
        assert_eq!(
            cuboid.capabilities,
            Capabilities::SHADOWS | Capabilities::REFLECTION_INTENSITY
        );

        let mesh = Node::drawable(
            "m",
            Geometry::Mesh(MeshBuffer::new(vec![[0.0; 3]], vec![0])),
            Material::basic(Color::from_hex(0xffffff)),
        );
        assert_eq!(
            mesh.capabilities,
            Capabilities::SHADOWS | Capabilities::MESH_BOUNDS
        );

        assert!(Node::group("g").capabilities.is_empty());
    }

    #[test]
    fn clone_is_independent() {
        let mut root = Node::group("root");
        root.add_child(cube("a", 1.0));
        let original = Model::new(root);

        let mut copy = original.clone();
        assert_eq!(copy, original);
        copy.root.children[0].transform.position.x = 5.0;
        copy.root.children[0].material.as_mut().unwrap().opacity = 0.1;

        assert_eq!(original.root.children[0].transform.position.x, 0.0);
        assert_eq!(
            original.root.children[0].material.as_ref().unwrap().opacity,
            1.0
        );
    }

    #[test]
    fn nodes_are_visited_depth_first() {
        let mut a = Node::group("a");
        a.add_child(Node::group("a1"));
        let mut root = Node::group("root");
        root.add_child(a);
        root.add_child(Node::group("b"));

        let names: Vec<_> = Model::new(root).nodes().map(|n| n.name.clone()).collect();
        assert_eq!(names, ["root", "a", "a1", "b"]);
    }

    #[test]
    fn bounding_box_includes_child_offsets() {
        let mut root = Node::group("root");
        root.add_child(cube("left", 1.0).with_position(-2.0, 0.0, 0.0));
        root.add_child(cube("right", 1.0).with_position(2.0, 0.0, 0.0));
        let model = Model::new(root);

        let size = model.bounding_box().size();
        assert!((size.x - 5.0).abs() < 1e-6);
        assert!((size.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_model_has_empty_bounds() {
        let model = Model::empty("nothing");
        assert!(model.is_empty());
        assert!(model.bounding_box().is_empty());
        assert!(model.validate().is_ok());
    }

    #[test]
    fn validate_reports_broken_nodes() {
        let mut root = Node::group("root");
        root.add_child(Node::drawable(
            "mesh",
            Geometry::Mesh(MeshBuffer::new(vec![[0.0; 3]; 3], vec![0, 1, 7])),
            Material::basic(Color::from_hex(0)),
        ));
        let model = Model::new(root);
        assert_eq!(
            model.validate(),
            Err(ModelDefect::IndexOutOfRange {
                node: "mesh".to_string(),
                index: 7,
                len: 3
            })
        );

        let mut flat = Model::new(cube("flat", 1.0));
        flat.root.transform.scale.z = 0.0;
        assert!(matches!(
            flat.validate(),
            Err(ModelDefect::DegenerateScale { .. })
        ));
    }

    #[test]
    fn meshes_without_vertices_are_invalid() {
        let model = Model::new(Node::drawable(
            "hollow",
            Geometry::Mesh(MeshBuffer::new(Vec::new(), Vec::new())),
            Material::standard(Color::from_hex(0xffffff)),
        ));
        assert_eq!(
            model.validate(),
            Err(ModelDefect::InvalidGeometry {
                node: "hollow".to_string()
            })
        );
    }
}
