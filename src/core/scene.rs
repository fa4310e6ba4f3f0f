//! Scene fragments and the retained scene graph.
//!
//! Loaders and builders produce detached [`SceneNode`] trees. The placement
//! logic only talks to the [`SceneHost`] trait; [`Scene`] is the in-memory
//! implementation the WebGL renderer draws from.

use crate::core::error::SceneError;
use crate::core::pose::{Aabb, Transform};
use fnv::FnvHashMap;
use glam::{Mat4, Vec3};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Triangle mesh in model space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().map(|p| Vec3::from_array(*p)))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Cube { size: f32 },
    /// Flat annulus lying in the XZ plane.
    Ring { inner: f32, outer: f32, segments: u32 },
    /// Torus around the local Z axis.
    Torus { radius: f32, tube: f32 },
    Sphere { radius: f32 },
    Mesh(Rc<MeshData>),
}

impl Geometry {
    pub fn bounds(&self) -> Option<Aabb> {
        match self {
            Geometry::Cube { size } => Some(Aabb::from_half_extents(Vec3::splat(size * 0.5))),
            Geometry::Ring { outer, .. } => {
                Some(Aabb::from_half_extents(Vec3::new(*outer, 0.0, *outer)))
            }
            Geometry::Torus { radius, tube } => Some(Aabb::from_half_extents(Vec3::new(
                radius + tube,
                radius + tube,
                *tube,
            ))),
            Geometry::Sphere { radius } => Some(Aabb::from_half_extents(Vec3::splat(*radius))),
            Geometry::Mesh(m) => m.bounds(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalMaterial {
    pub color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub reflectivity: f32,
    pub env_map_intensity: f32,
}

impl PhysicalMaterial {
    pub fn with_color(color: [f32; 3]) -> Self {
        Self {
            color,
            metalness: 0.0,
            roughness: 1.0,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            reflectivity: 0.5,
            env_map_intensity: 1.0,
        }
    }
}

/// Unlit material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BasicMaterial {
    pub color: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    pub wireframe: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    Physical(PhysicalMaterial),
    Basic(BasicMaterial),
}

impl Material {
    pub fn color(&self) -> [f32; 3] {
        match self {
            Material::Physical(m) => m.color,
            Material::Basic(m) => m.color,
        }
    }

    pub fn opacity(&self) -> f32 {
        match self {
            Material::Physical(_) => 1.0,
            Material::Basic(m) => m.opacity,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Drawable {
    pub geometry: Geometry,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Drawable {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// Detached scene fragment.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub drawable: Option<Drawable>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            visible: true,
            drawable: None,
            children: Vec::new(),
        }
    }

    pub fn with_drawable(mut self, drawable: Drawable) -> Self {
        self.drawable = Some(drawable);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first visit of this node and every descendant.
    pub fn traverse_mut(&mut self, f: &mut impl FnMut(&mut SceneNode)) {
        f(self);
        for c in &mut self.children {
            c.traverse_mut(f);
        }
    }

    pub fn traverse(&self, f: &mut impl FnMut(&SceneNode)) {
        f(self);
        for c in &self.children {
            c.traverse(f);
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    /// World-space bounds of every drawable in the subtree, with this node's
    /// own transform applied (the node is treated as unparented).
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds_under(&Mat4::IDENTITY)
    }

    fn bounds_under(&self, parent: &Mat4) -> Option<Aabb> {
        let world = *parent * self.transform.matrix();
        let own = self
            .drawable
            .as_ref()
            .and_then(|d| d.geometry.bounds())
            .map(|b| b.transformed(&world));
        self.children
            .iter()
            .filter_map(|c| c.bounds_under(&world))
            .fold(own, |acc, b| match acc {
                Some(a) => Some(a.union(&b)),
                None => Some(b),
            })
    }
}

/// Minimal scene-graph interface the placement logic depends on.
pub trait SceneHost {
    fn attach(&mut self, parent: Option<NodeId>, node: SceneNode) -> Result<NodeId, SceneError>;
    fn detach(&mut self, id: NodeId) -> Result<(), SceneError>;
    /// First descendant of `root` (or `root` itself) with the given name.
    fn find(&self, root: NodeId, name: &str) -> Option<NodeId>;
    fn transform(&self, id: NodeId) -> Option<Transform>;
    fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), SceneError>;
    fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<(), SceneError>;
    fn set_opacity(&mut self, id: NodeId, opacity: f32) -> Result<(), SceneError>;
    fn world_matrix(&self, id: NodeId) -> Option<Mat4>;
    fn node_count(&self) -> usize;
}

#[derive(Clone, Debug)]
struct Entry {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    transform: Transform,
    visible: bool,
    drawable: Option<Drawable>,
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: FnvHashMap<NodeId, Entry>,
    roots: Vec<NodeId>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, id: NodeId) -> Option<bool> {
        self.nodes.get(&id).map(|e| e.visible)
    }

    pub fn drawable(&self, id: NodeId) -> Option<&Drawable> {
        self.nodes.get(&id).and_then(|e| e.drawable.as_ref())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Visit every drawable whose whole ancestor chain is visible.
    pub fn visit_visible(&self, f: &mut impl FnMut(NodeId, &Mat4, &Drawable)) {
        for root in &self.roots {
            self.visit_from(*root, &Mat4::IDENTITY, f);
        }
    }

    fn visit_from(&self, id: NodeId, parent: &Mat4, f: &mut impl FnMut(NodeId, &Mat4, &Drawable)) {
        let Some(e) = self.nodes.get(&id) else {
            return;
        };
        if !e.visible {
            return;
        }
        let world = *parent * e.transform.matrix();
        if let Some(d) = &e.drawable {
            f(id, &world, d);
        }
        for c in &e.children {
            self.visit_from(*c, &world, f);
        }
    }

    fn insert(&mut self, parent: Option<NodeId>, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let SceneNode {
            name,
            transform,
            visible,
            drawable,
            children,
        } = node;
        self.nodes.insert(
            id,
            Entry {
                name,
                parent,
                children: Vec::with_capacity(children.len()),
                transform,
                visible,
                drawable,
            },
        );
        for child in children {
            let cid = self.insert(Some(id), child);
            if let Some(e) = self.nodes.get_mut(&id) {
                e.children.push(cid);
            }
        }
        id
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(e) = self.nodes.remove(&id) {
            for c in e.children {
                self.remove_subtree(c);
            }
        }
    }

    fn entry_mut(&mut self, id: NodeId) -> Result<&mut Entry, SceneError> {
        self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id.0))
    }
}

impl SceneHost for Scene {
    fn attach(&mut self, parent: Option<NodeId>, node: SceneNode) -> Result<NodeId, SceneError> {
        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) {
                return Err(SceneError::UnknownNode(p.0));
            }
        }
        let id = self.insert(parent, node);
        match parent {
            Some(p) => self.entry_mut(p)?.children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    fn detach(&mut self, id: NodeId) -> Result<(), SceneError> {
        let parent = self
            .nodes
            .get(&id)
            .ok_or(SceneError::UnknownNode(id.0))?
            .parent;
        match parent {
            Some(p) => {
                if let Some(pe) = self.nodes.get_mut(&p) {
                    pe.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        self.remove_subtree(id);
        Ok(())
    }

    fn find(&self, root: NodeId, name: &str) -> Option<NodeId> {
        let e = self.nodes.get(&root)?;
        if e.name == name {
            return Some(root);
        }
        e.children.iter().find_map(|c| self.find(*c, name))
    }

    fn transform(&self, id: NodeId) -> Option<Transform> {
        self.nodes.get(&id).map(|e| e.transform)
    }

    fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.entry_mut(id)?.transform = transform;
        Ok(())
    }

    fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<(), SceneError> {
        self.entry_mut(id)?.visible = visible;
        Ok(())
    }

    fn set_opacity(&mut self, id: NodeId, opacity: f32) -> Result<(), SceneError> {
        if let Some(Drawable {
            material: Material::Basic(m),
            ..
        }) = &mut self.entry_mut(id)?.drawable
        {
            m.opacity = opacity;
        }
        Ok(())
    }

    fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let e = self.nodes.get(&id)?;
        let local = e.transform.matrix();
        match e.parent {
            Some(p) => Some(self.world_matrix(p)? * local),
            None => Some(local),
        }
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
