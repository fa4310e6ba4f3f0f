//! Binary glTF (GLB) to [`SceneNode`] conversion.
//!
//! Only what the demo draws is kept: node hierarchy and transforms, triangle
//! primitives with positions/normals/indices, and the PBR base colour.
//! Textures, skins and animations are ignored.

use crate::core::error::AssetError;
use crate::core::pose::Transform;
use crate::core::scene::{Drawable, Geometry, Material, MeshData, PhysicalMaterial, SceneNode};
use glam::{Quat, Vec3};
use gltf::buffer::Source;
use gltf::mesh::Mode;
use std::rc::Rc;

/// Parse a GLB blob into a detached scene fragment rooted at a node named
/// after the glTF scene.
pub fn parse(path: &str, bytes: &[u8]) -> Result<SceneNode, AssetError> {
    let parse_err = |reason: String| AssetError::Parse {
        path: path.to_string(),
        reason,
    };
    let gltf = gltf::Gltf::from_slice(bytes).map_err(|e| parse_err(e.to_string()))?;
    let blob = gltf.blob.as_deref();
    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| parse_err("no scene".to_string()))?;

    let mut root = SceneNode::new(scene.name().unwrap_or("scene"));
    for node in scene.nodes() {
        root.children.push(convert_node(&node, blob));
    }
    Ok(root)
}

fn convert_node(node: &gltf::Node<'_>, blob: Option<&[u8]>) -> SceneNode {
    let (t, r, s) = node.transform().decomposed();
    let mut out = SceneNode::new(node.name().unwrap_or("")).with_transform(Transform {
        translation: Vec3::from_array(t),
        rotation: Quat::from_array(r),
        scale: Vec3::from_array(s),
    });

    if let Some(mesh) = node.mesh() {
        for prim in mesh.primitives() {
            if prim.mode() != Mode::Triangles {
                log::debug!("[glb] skipping {:?} primitive", prim.mode());
                continue;
            }
            if let Some(drawable) = convert_primitive(&prim, blob) {
                out.children.push(SceneNode::new("primitive").with_drawable(drawable));
            }
        }
    }

    for child in node.children() {
        out.children.push(convert_node(&child, blob));
    }
    out
}

fn convert_primitive(prim: &gltf::Primitive<'_>, blob: Option<&[u8]>) -> Option<Drawable> {
    let reader = prim.reader(|buffer| match buffer.source() {
        Source::Bin => blob,
        Source::Uri(_) => None,
    });
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    if positions.is_empty() {
        return None;
    }
    let indices: Vec<u32> = match reader.read_indices() {
        Some(ix) => ix.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(n) => n.collect(),
        None => vertex_normals(&positions, &indices),
    };

    let pbr = prim.material().pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();
    let material = PhysicalMaterial {
        metalness: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
        ..PhysicalMaterial::with_color([r, g, b])
    };

    Some(Drawable::new(
        Geometry::Mesh(Rc::new(MeshData {
            positions,
            normals,
            indices,
        })),
        Material::Physical(material),
    ))
}

/// Area-weighted vertex normals for meshes exported without them.
pub fn vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from_array(positions[a]);
        let n = (Vec3::from_array(positions[b]) - pa).cross(Vec3::from_array(positions[c]) - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}
