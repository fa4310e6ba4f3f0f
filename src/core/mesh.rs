//! Triangle tessellation of the procedural [`Geometry`] shapes.

use crate::core::constants::{SPHERE_SEGMENTS, TORUS_RADIAL_SEGMENTS, TORUS_TUBULAR_SEGMENTS};
use crate::core::scene::{Geometry, MeshData};
use glam::Vec3;
use std::f32::consts::TAU;
use std::rc::Rc;

impl Geometry {
    /// Triangle mesh for this shape. Loaded meshes are shared, not copied.
    pub fn tessellate(&self) -> Rc<MeshData> {
        match self {
            Geometry::Cube { size } => Rc::new(cube(*size)),
            Geometry::Ring {
                inner,
                outer,
                segments,
            } => Rc::new(ring(*inner, *outer, *segments)),
            Geometry::Torus { radius, tube } => Rc::new(torus(
                *radius,
                *tube,
                TORUS_RADIAL_SEGMENTS,
                TORUS_TUBULAR_SEGMENTS,
            )),
            Geometry::Sphere { radius } => {
                Rc::new(sphere(*radius, SPHERE_SEGMENTS, SPHERE_SEGMENTS / 2))
            }
            Geometry::Mesh(m) => m.clone(),
        }
    }
}

pub fn cube(size: f32) -> MeshData {
    let h = size * 0.5;
    let mut m = MeshData::default();
    // (normal, u axis, v axis) per face
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    for (n, u, v) in faces {
        let base = m.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            m.positions.push(((n + u * su + v * sv) * h).to_array());
            m.normals.push(n.to_array());
        }
        m.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    m
}

/// Flat annulus in the XZ plane, facing +Y.
pub fn ring(inner: f32, outer: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut m = MeshData::default();
    for i in 0..=segments {
        let a = i as f32 / segments as f32 * TAU;
        let (s, c) = a.sin_cos();
        m.positions.push([c * inner, 0.0, s * inner]);
        m.positions.push([c * outer, 0.0, s * outer]);
        m.normals.push([0.0, 1.0, 0.0]);
        m.normals.push([0.0, 1.0, 0.0]);
    }
    for i in 0..segments {
        let k = i * 2;
        m.indices
            .extend_from_slice(&[k, k + 2, k + 1, k + 1, k + 2, k + 3]);
    }
    m
}

/// Torus around the local Z axis.
pub fn torus(radius: f32, tube: f32, radial: u32, tubular: u32) -> MeshData {
    let (radial, tubular) = (radial.max(3), tubular.max(3));
    let mut m = MeshData::default();
    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let center = Vec3::new(u.cos() * radius, u.sin() * radius, 0.0);
            let p = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            m.positions.push(p.to_array());
            m.normals
                .push((p - center).try_normalize().unwrap_or(Vec3::Z).to_array());
        }
    }
    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            m.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    m
}

pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let (ws, hs) = (width_segments.max(3), height_segments.max(2));
    let mut m = MeshData::default();
    for y in 0..=hs {
        let theta = y as f32 / hs as f32 * std::f32::consts::PI;
        for x in 0..=ws {
            let phi = x as f32 / ws as f32 * TAU;
            let n = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            m.positions.push((n * radius).to_array());
            m.normals.push(n.to_array());
        }
    }
    let row = ws + 1;
    for y in 0..hs {
        for x in 0..ws {
            let a = y * row + x + 1;
            let b = y * row + x;
            let c = (y + 1) * row + x;
            let d = (y + 1) * row + x + 1;
            if y != 0 {
                m.indices.extend_from_slice(&[a, b, d]);
            }
            if y != hs - 1 {
                m.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    m
}

/// Unique edges of a triangle list, for wireframe drawing.
pub fn edge_indices(indices: &[u32]) -> Vec<u32> {
    let mut seen = fnv::FnvHashSet::default();
    let mut out = Vec::new();
    for tri in indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            if seen.insert((a.min(b), a.max(b))) {
                out.push(a);
                out.push(b);
            }
        }
    }
    out
}

/// Cached mesh keys that no live drawable uses any more. `live` may repeat
/// keys when several drawables share a mesh.
pub fn stale_keys<'a>(
    cached: impl IntoIterator<Item = &'a u64>,
    live: impl IntoIterator<Item = u64>,
) -> Vec<u64> {
    let live: fnv::FnvHashSet<u64> = live.into_iter().collect();
    cached
        .into_iter()
        .filter(|k| !live.contains(k))
        .copied()
        .collect()
}
