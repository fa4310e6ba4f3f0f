//! Model loading with fixed per-model post-processing and a fallback cube.

use crate::core::constants::*;
use crate::core::emitter::EmitterId;
use crate::core::error::AssetError;
use crate::core::pose::Transform;
use crate::core::scene::{
    BasicMaterial, Drawable, Geometry, Material, PhysicalMaterial, SceneNode,
};
use glam::{Quat, Vec3};

// Node names used to find parts of a placed model after it is attached.
pub const MODEL_NODE: &str = "model";
pub const AUDIO_ANCHOR_NODE: &str = "audio-anchor";
pub const VISUALIZER_NODE: &str = "visualizer";

pub fn ring_node_name(i: usize) -> String {
    format!("ring-{i}")
}

/// The two placeable models. Model A carries the red emitter, model B the blue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelId {
    A,
    B,
}

impl ModelId {
    pub const ALL: [ModelId; 2] = [ModelId::A, ModelId::B];

    pub fn emitter(self) -> EmitterId {
        match self {
            ModelId::A => EmitterId::Red,
            ModelId::B => EmitterId::Blue,
        }
    }

    pub fn container_name(self) -> &'static str {
        match self {
            ModelId::A => "model-a",
            ModelId::B => "model-b",
        }
    }
}

/// Async source of parsed model fragments (GLB over `fetch` on the web).
#[allow(async_fn_in_trait)]
pub trait ModelSource {
    async fn fetch(&self, id: ModelId) -> Result<SceneNode, AssetError>;
}

/// A model ready to attach: post-processed, or the fallback cube.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelInstance {
    pub id: ModelId,
    pub root: SceneNode,
    pub fallback: bool,
}

/// Load `id` from `source`. Never fails: errors are logged and replaced by
/// the fallback cube.
pub async fn load<S: ModelSource>(source: &S, id: ModelId) -> ModelInstance {
    let fetched = match source.fetch(id).await {
        Ok(node) if has_drawable(&node) => Ok(node),
        Ok(_) => Err(AssetError::Empty(id.container_name().to_string())),
        Err(e) => Err(e),
    };
    match fetched {
        Ok(node) => {
            log::info!("[assets] loaded {:?} ({} nodes)", id, node.node_count());
            post_process(id, node)
        }
        Err(e) => {
            log::warn!("[assets] {:?}: {}; using fallback cube", id, e);
            fallback(id)
        }
    }
}

fn has_drawable(node: &SceneNode) -> bool {
    let mut found = false;
    node.traverse(&mut |n| found |= n.drawable.is_some());
    found
}

/// Apply the fixed per-model policy to a freshly parsed fragment.
pub fn post_process(id: ModelId, mut model: SceneNode) -> ModelInstance {
    model.name = MODEL_NODE.to_string();
    model.traverse_mut(&mut |n| {
        if let Some(d) = &mut n.drawable {
            d.cast_shadow = true;
            d.receive_shadow = true;
        }
    });

    let anchor_at = match id {
        ModelId::A => {
            model.transform.scale = Vec3::splat(RED_MODEL_SCALE);
            Vec3::ZERO
        }
        ModelId::B => {
            let center = model.bounds().map(|b| b.center()).unwrap_or(Vec3::ZERO);
            model.transform.translation -= center;
            model.transform.scale = Vec3::splat(BLUE_MODEL_SCALE);
            // Scaling moves the centroid, so the box is measured again.
            model
                .bounds()
                .map(|b| b.center())
                .unwrap_or(model.transform.translation)
        }
    };

    let anchor = SceneNode::new(AUDIO_ANCHOR_NODE)
        .with_transform(Transform::from_translation(anchor_at))
        .with_child(visualizer(id.emitter()));
    let root = SceneNode::new(id.container_name())
        .with_child(anchor)
        .with_child(model);
    ModelInstance {
        id,
        root,
        fallback: false,
    }
}

/// Deterministic stand-in for a model that failed to load.
pub fn fallback(id: ModelId) -> ModelInstance {
    let material = PhysicalMaterial {
        color: id.emitter().color(),
        metalness: FALLBACK_METALNESS,
        roughness: FALLBACK_ROUGHNESS,
        clearcoat: FALLBACK_CLEARCOAT,
        clearcoat_roughness: FALLBACK_CLEARCOAT_ROUGHNESS,
        reflectivity: FALLBACK_REFLECTIVITY,
        env_map_intensity: FALLBACK_ENV_MAP_INTENSITY,
    };
    let mut cube = Drawable::new(
        Geometry::Cube {
            size: FALLBACK_CUBE_SIZE,
        },
        Material::Physical(material),
    );
    cube.cast_shadow = true;
    cube.receive_shadow = true;
    let root = SceneNode::new(id.container_name())
        .with_drawable(cube)
        .with_child(SceneNode::new(AUDIO_ANCHOR_NODE));
    ModelInstance {
        id,
        root,
        fallback: true,
    }
}

/// Wireframe sphere with three rings, hidden until visualization is enabled.
pub fn visualizer(emitter: EmitterId) -> SceneNode {
    let color = emitter.color();
    let sphere = Drawable::new(
        Geometry::Sphere {
            radius: VISUALIZER_SPHERE_RADIUS,
        },
        Material::Basic(BasicMaterial {
            color,
            opacity: VISUALIZER_SPHERE_OPACITY,
            transparent: true,
            wireframe: true,
        }),
    );
    let mut root = SceneNode::new(VISUALIZER_NODE).with_drawable(sphere);
    root.visible = false;
    for i in 0..VISUALIZER_RING_COUNT {
        let ring = Drawable::new(
            Geometry::Torus {
                radius: VISUALIZER_RING_BASE_RADIUS + i as f32 * VISUALIZER_RING_STEP,
                tube: VISUALIZER_RING_TUBE,
            },
            Material::Basic(BasicMaterial {
                color,
                opacity: VISUALIZER_RING_OPACITY,
                transparent: true,
                wireframe: false,
            }),
        );
        let t = Transform {
            rotation: Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
            ..Transform::IDENTITY
        };
        root = root.with_child(
            SceneNode::new(ring_node_name(i))
                .with_transform(t)
                .with_drawable(ring),
        );
    }
    root
}
