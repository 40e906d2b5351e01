use std::{
    io::{BufReader, Cursor},
    path::Path,
};

use crate::{
    data_structures::model::{Color, Geometry, Material, MeshBuffer, Model, Node},
    resources::file::load_string,
};

/// Used for objects whose MTL is missing or has no diffuse colour.
const DEFAULT_DIFFUSE: u32 = 0xb0b0b0;

/**
 * Wavefront OBJ loading. Each object in the file becomes one drawable child of
 * a group named after the file. Material libraries are resolved relative to the
 * OBJ file; only diffuse colour and dissolve are used.
 */
pub async fn load_model_obj(file: &Path) -> anyhow::Result<Model> {
    let obj_text = load_string(file).await?;
    let obj_cursor = Cursor::new(obj_text);
    let mut obj_reader = BufReader::new(obj_cursor);
    let base_dir = file.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        move |p| {
            let mtl_path = base_dir.join(p);
            async move {
                match load_string(&mtl_path).await {
                    Ok(mat_text) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text))),
                    Err(e) => {
                        log::warn!("{e:#}");
                        Err(tobj::LoadError::OpenFileFailed)
                    }
                }
            }
        },
    )
    .await?;

    // A broken MTL only costs the colours, not the geometry
    let materials = obj_materials.unwrap_or_else(|e| {
        log::warn!("ignoring materials of {}: {e}", file.display());
        Vec::new()
    });

    let name = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "obj".to_string());
    let mut root = Node::group(name);
    for m in models {
        let positions = m
            .mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        let material = match m.mesh.material_id.and_then(|id| materials.get(id)) {
            Some(mtl) => {
                let color = mtl
                    .diffuse
                    .map_or(Color::from_hex(DEFAULT_DIFFUSE), |[r, g, b]| Color::new(r, g, b));
                Material::standard(color).with_opacity(mtl.dissolve.unwrap_or(1.0))
            }
            None => Material::standard(Color::from_hex(DEFAULT_DIFFUSE)),
        };
        root.add_child(Node::drawable(
            m.name,
            Geometry::Mesh(MeshBuffer::new(positions, m.mesh.indices)),
            material,
        ));
    }
    Ok(Model::new(root))
}
