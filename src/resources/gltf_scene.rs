//! glTF / GLB decoding into a [`Model`].
//!
//! Only what the dashboard needs is read: the node hierarchy with its
//! transforms, vertex positions, indices and the PBR base colour of each
//! primitive. Textures, skins and animation channels are ignored.

use std::path::Path;

use anyhow::{Context, bail};

use crate::{
    data_structures::{
        model::{Color, Geometry, Material, MeshBuffer, Model, Node},
        transform::Transform,
    },
    resources::file::load_binary,
};

pub async fn load_model_gltf(file: &Path) -> anyhow::Result<Model> {
    let bytes = load_binary(file).await?;
    let gltf = gltf::Gltf::from_slice(&bytes)
        .with_context(|| format!("failed to parse {}", file.display()))?;
    let base_dir = file.parent().unwrap_or_else(|| Path::new("."));

    // Load buffers
    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                Some(blob) => buffer_data.push(blob.into()),
                None => bail!("{} references a binary chunk it does not have", file.display()),
            },
            gltf::buffer::Source::Uri(uri) => {
                if uri.starts_with("data:") {
                    bail!("embedded data URIs are not supported ({})", file.display());
                }
                buffer_data.push(load_binary(&base_dir.join(uri)).await?);
            }
        }
    }

    let scene = match gltf.default_scene().or_else(|| gltf.scenes().next()) {
        Some(scene) => scene,
        None => bail!("{} contains no scene", file.display()),
    };
    let mut roots = scene
        .nodes()
        .map(|node| to_node(node, &buffer_data))
        .collect::<anyhow::Result<Vec<Node>>>()
        .with_context(|| format!("failed to decode {}", file.display()))?;

    let root = if roots.len() == 1 {
        roots.remove(0)
    } else {
        let mut root = Node::group(scene.name().unwrap_or("scene"));
        root.children = roots;
        root
    };
    Ok(Model::new(root))
}

fn to_node(node: gltf::Node, buffers: &[Vec<u8>]) -> anyhow::Result<Node> {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node-{}", node.index()));
    let mut scene_node = Node::group(name);

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

            let primitive_name = format!(
                "{}-{}",
                mesh.name().unwrap_or("mesh"),
                primitive.index()
            );
            // Accessors that point past the end of their buffer read as None
            let positions: Vec<[f32; 3]> = match reader.read_positions() {
                Some(positions) => positions.collect(),
                None => bail!("{primitive_name} has no readable POSITION accessor"),
            };
            // Non-indexed primitives draw their vertices in order
            let indices: Vec<u32> = match (primitive.indices(), reader.read_indices()) {
                (_, Some(indices)) => indices.into_u32().collect(),
                (None, None) => (0..positions.len() as u32).collect(),
                (Some(_), None) => bail!("{primitive_name} has an unreadable index accessor"),
            };

            let [r, g, b, a] = primitive.material().pbr_metallic_roughness().base_color_factor();
            let material = Material::standard(Color::new(r, g, b)).with_opacity(a);

            scene_node.add_child(Node::drawable(
                primitive_name,
                Geometry::Mesh(MeshBuffer::new(positions, indices)),
                material,
            ));
        }
    }

    let (translation, rotation, scale) = node.transform().decomposed();
    scene_node.transform = Transform {
        position: translation.into(),
        rotation: rotation.into(),
        scale: scale.into(),
    };
    for child in node.children() {
        scene_node.add_child(to_node(child, buffers)?);
    }

    Ok(scene_node)
}
