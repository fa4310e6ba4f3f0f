// Host-side tests for model post-processing, the fallback cube and the
// visualizer fragment.

mod support;

use ar_sound::core::assets::{
    self, fallback, post_process, ring_node_name, visualizer, AUDIO_ANCHOR_NODE, MODEL_NODE,
    VISUALIZER_NODE,
};
use ar_sound::core::constants::*;
use ar_sound::core::scene::{Geometry, Material};
use ar_sound::core::{AssetError, EmitterId, ModelId, ModelSource, SceneNode};
use glam::Vec3;
use pollster::block_on;
use support::*;

fn child<'a>(node: &'a SceneNode, name: &str) -> &'a SceneNode {
    node.children
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no child named {name}"))
}

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-5
}

#[test]
fn model_a_is_scaled_and_anchored_at_its_origin() {
    let inst = post_process(ModelId::A, model_fragment(Vec3::new(0.1, 0.2, 0.0)));
    assert!(!inst.fallback);
    assert_eq!(inst.root.name, "model-a");

    let model = child(&inst.root, MODEL_NODE);
    assert_eq!(model.transform.scale, Vec3::splat(RED_MODEL_SCALE));
    assert_eq!(model.transform.translation, Vec3::ZERO);

    let anchor = child(&inst.root, AUDIO_ANCHOR_NODE);
    assert_eq!(anchor.transform.translation, Vec3::ZERO);
}

#[test]
fn model_b_is_recentered_and_anchored_at_its_scaled_centroid() {
    let inst = post_process(ModelId::B, model_fragment(Vec3::new(2.0, 0.0, 0.0)));
    assert_eq!(inst.root.name, "model-b");

    let model = child(&inst.root, MODEL_NODE);
    assert_eq!(model.transform.scale, Vec3::splat(BLUE_MODEL_SCALE));
    assert!(close(model.transform.translation, Vec3::new(-2.0, 0.0, 0.0)));

    let centroid = model.bounds().unwrap().center();
    assert!(close(centroid, Vec3::new(-1.4, 0.0, 0.0)));
    let anchor = child(&inst.root, AUDIO_ANCHOR_NODE);
    assert!(close(anchor.transform.translation, centroid));
}

#[test]
fn parsed_meshes_cast_and_receive_shadows() {
    let inst = post_process(ModelId::A, model_fragment(Vec3::ZERO));
    let model = child(&inst.root, MODEL_NODE);
    let mut drawables = 0;
    model.traverse(&mut |n| {
        if let Some(d) = &n.drawable {
            drawables += 1;
            assert!(d.cast_shadow && d.receive_shadow);
        }
    });
    assert_eq!(drawables, 1);
}

#[test]
fn loaded_models_carry_a_hidden_visualizer_under_the_anchor() {
    for id in ModelId::ALL {
        let inst = post_process(id, model_fragment(Vec3::ZERO));
        let anchor = child(&inst.root, AUDIO_ANCHOR_NODE);
        let viz = child(anchor, VISUALIZER_NODE);
        assert!(!viz.visible);
        let d = viz.drawable.as_ref().unwrap();
        assert_eq!(d.material.color(), id.emitter().color());
    }
}

#[test]
fn visualizer_has_a_wireframe_sphere_and_growing_rings() {
    let viz = visualizer(EmitterId::Blue);
    let sphere = viz.drawable.as_ref().unwrap();
    assert_eq!(
        sphere.geometry,
        Geometry::Sphere {
            radius: VISUALIZER_SPHERE_RADIUS
        }
    );
    match sphere.material {
        Material::Basic(m) => {
            assert!(m.wireframe && m.transparent);
            assert_eq!(m.opacity, VISUALIZER_SPHERE_OPACITY);
            assert_eq!(m.color, BLUE_COLOR);
        }
        other => panic!("unexpected sphere material {other:?}"),
    }

    assert_eq!(viz.children.len(), VISUALIZER_RING_COUNT);
    for (i, ring) in viz.children.iter().enumerate() {
        assert_eq!(ring.name, ring_node_name(i));
        let d = ring.drawable.as_ref().unwrap();
        match d.geometry {
            Geometry::Torus { radius, tube } => {
                assert!((radius - (0.2 + 0.2 * i as f32)).abs() < 1e-6);
                assert_eq!(tube, VISUALIZER_RING_TUBE);
            }
            ref g => panic!("ring {i} is {g:?}"),
        }
        assert_eq!(d.material.opacity(), VISUALIZER_RING_OPACITY);
    }
}

#[test]
fn fallback_is_a_colored_cube_without_visualizer() {
    let red = fallback(ModelId::A);
    assert!(red.fallback);
    assert_eq!(red.root.name, "model-a");
    let d = red.root.drawable.as_ref().unwrap();
    assert_eq!(d.geometry, Geometry::Cube { size: 0.8 });
    match d.material {
        Material::Physical(m) => {
            assert_eq!(m.color, RED_COLOR);
            assert_eq!(m.metalness, 0.6);
            assert_eq!(m.roughness, 0.2);
            assert_eq!(m.clearcoat, 0.5);
            assert_eq!(m.clearcoat_roughness, 0.3);
            assert_eq!(m.reflectivity, 0.8);
            assert_eq!(m.env_map_intensity, 0.8);
        }
        other => panic!("unexpected fallback material {other:?}"),
    }
    assert!(d.cast_shadow && d.receive_shadow);
    assert_eq!(red.root.children.len(), 1);
    assert_eq!(red.root.children[0].name, AUDIO_ANCHOR_NODE);
    let mut has_viz = false;
    red.root.traverse(&mut |n| has_viz |= n.name == VISUALIZER_NODE);
    assert!(!has_viz);

    let blue = fallback(ModelId::B);
    assert_eq!(blue.root.drawable.unwrap().material.color(), BLUE_COLOR);
}

#[test]
fn failed_fetch_falls_back() {
    let models = MockModels::failing(ModelId::B);
    let a = block_on(assets::load(&models, ModelId::A));
    let b = block_on(assets::load(&models, ModelId::B));
    assert!(!a.fallback);
    assert!(b.fallback);
    assert_eq!(models.fetches.get(), 2);
}

struct EmptyModels;

impl ModelSource for EmptyModels {
    async fn fetch(&self, _id: ModelId) -> Result<SceneNode, AssetError> {
        Ok(SceneNode::new("scene").with_child(SceneNode::new("camera")))
    }
}

#[test]
fn model_without_geometry_falls_back() {
    let inst = block_on(assets::load(&EmptyModels, ModelId::A));
    assert!(inst.fallback);
    assert_eq!(inst, fallback(ModelId::A));
}

#[test]
fn model_ids_map_to_emitters() {
    assert_eq!(ModelId::A.emitter(), EmitterId::Red);
    assert_eq!(ModelId::B.emitter(), EmitterId::Blue);
    assert_ne!(ModelId::A.container_name(), ModelId::B.container_name());
}
