// Host-side tests for the FPS meter, ring animation and reticle.

use ar_sound::core::assets::visualizer;
use ar_sound::core::constants::*;
use ar_sound::core::frame::{reticle_node, ring_pose, FpsReading, Visualizer};
use ar_sound::core::scene::{Geometry, Material};
use ar_sound::core::{EmitterId, FpsMeter, FpsTier, Scene, SceneHost};

fn run_meter(frames: u32, span_ms: f64) -> Option<FpsReading> {
    let mut m = FpsMeter::new(0.0);
    let step = span_ms / frames as f64;
    for i in 1..frames {
        assert_eq!(m.tick(i as f64 * step), None);
    }
    m.tick(span_ms)
}

#[test]
fn fps_tiers_follow_thresholds() {
    assert_eq!(FpsTier::classify(60), FpsTier::Good);
    assert_eq!(FpsTier::classify(51), FpsTier::Good);
    assert_eq!(FpsTier::classify(50), FpsTier::Warning);
    assert_eq!(FpsTier::classify(31), FpsTier::Warning);
    assert_eq!(FpsTier::classify(30), FpsTier::Bad);
    assert_eq!(FpsTier::classify(0), FpsTier::Bad);
    assert_eq!(FpsTier::Good.css_class(), "fps-good");
    assert_eq!(FpsTier::Warning.css_class(), "fps-warning");
    assert_eq!(FpsTier::Bad.css_class(), "fps-bad");
}

#[test]
fn meter_reports_once_per_window() {
    for (frames, tier) in [(55, FpsTier::Good), (40, FpsTier::Warning), (20, FpsTier::Bad)] {
        let r = run_meter(frames, 1000.0).expect("window elapsed");
        assert_eq!(r.fps, frames);
        assert_eq!(r.tier, tier);
    }
}

#[test]
fn meter_is_silent_inside_the_window_and_restarts_after() {
    let mut m = FpsMeter::new(100.0);
    assert_eq!(m.tick(500.0), None);
    assert_eq!(m.tick(1099.0), None);
    let r = m.tick(1100.0).unwrap();
    assert_eq!(r.fps, 3);
    // counting restarts from the report time
    assert_eq!(m.tick(1600.0), None);
    let r = m.tick(2100.0).unwrap();
    assert_eq!(r.fps, 2);
}

#[test]
fn meter_scales_by_actual_elapsed_time() {
    let mut m = FpsMeter::new(0.0);
    for i in 1..30 {
        assert!(m.tick(i as f64 * 30.0).is_none());
    }
    // 30 frames over 1.5 s
    assert_eq!(m.tick(1500.0).map(|r| r.fps), Some(20));
}

#[test]
fn ring_pose_at_time_zero() {
    let p = ring_pose(0.0, 0, 0.0);
    assert_eq!(p.scale, 1.0);
    assert_eq!(p.spin, 0.0);
    assert!((p.opacity - VISUALIZER_RING_OPACITY).abs() < 1e-6);

    let p = ring_pose(0.0, 1, 0.0);
    assert!((p.scale - (1.0 + 0.2 * 1f32.sin())).abs() < 1e-6);
}

#[test]
fn ring_pose_stays_in_range() {
    for step in 0..200 {
        let t = step as f32 * 0.05;
        for ring in 0..VISUALIZER_RING_COUNT {
            for phase in [EmitterId::Red.phase(), EmitterId::Blue.phase()] {
                let p = ring_pose(t, ring, phase);
                assert!((0.8 - 1e-5..=1.2 + 1e-5).contains(&p.scale));
                assert!((0.1 - 1e-5..=0.3 + 1e-5).contains(&p.opacity));
            }
        }
    }
}

#[test]
fn outer_rings_spin_faster() {
    let t = 2.0;
    let spins: Vec<f32> = (0..3).map(|i| ring_pose(t, i, 0.0).spin).collect();
    assert_eq!(spins, vec![1.0, 2.0, 3.0]);
}

#[test]
fn emitters_animate_in_antiphase() {
    let t = 0.3;
    let red = ring_pose(t, 0, EmitterId::Red.phase());
    let blue = ring_pose(t, 0, EmitterId::Blue.phase());
    assert!(((red.scale - 1.0) + (blue.scale - 1.0)).abs() < 1e-5);
    assert_eq!(red.spin, blue.spin);
}

#[test]
fn animate_writes_ring_transforms_and_opacity() {
    let mut scene = Scene::new();
    let root = scene.attach(None, visualizer(EmitterId::Red)).unwrap();
    let rings: Vec<_> = (0..VISUALIZER_RING_COUNT)
        .map(|i| scene.find(root, &format!("ring-{i}")).unwrap())
        .collect();
    let viz = Visualizer {
        emitter: EmitterId::Red,
        root,
        rings: rings.clone(),
    };
    viz.animate(&mut scene, 1.25).unwrap();

    for (i, id) in rings.iter().enumerate() {
        let expect = ring_pose(1.25, i, 0.0);
        let t = scene.transform(*id).unwrap();
        assert!((t.scale.x - expect.scale).abs() < 1e-6);
        assert_eq!(t.translation, glam::Vec3::ZERO);
        let opacity = scene.drawable(*id).unwrap().material.opacity();
        assert!((opacity - expect.opacity).abs() < 1e-6);
    }
    // the sphere keeps its own opacity
    let sphere = scene.drawable(root).unwrap().material.opacity();
    assert_eq!(sphere, VISUALIZER_SPHERE_OPACITY);
}

#[test]
fn animate_reports_missing_rings() {
    let mut scene = Scene::new();
    let root = scene.attach(None, visualizer(EmitterId::Blue)).unwrap();
    let ring = scene.find(root, "ring-0").unwrap();
    let viz = Visualizer {
        emitter: EmitterId::Blue,
        root,
        rings: vec![ring],
    };
    scene.detach(root).unwrap();
    assert!(viz.animate(&mut scene, 0.0).is_err());
}

#[test]
fn reticle_is_a_hidden_flat_ring() {
    let r = reticle_node();
    assert!(!r.visible);
    let d = r.drawable.unwrap();
    assert_eq!(
        d.geometry,
        Geometry::Ring {
            inner: 0.15,
            outer: 0.2,
            segments: 32
        }
    );
    assert!(matches!(d.material, Material::Basic(m) if m.color == [1.0, 1.0, 1.0]));
}
