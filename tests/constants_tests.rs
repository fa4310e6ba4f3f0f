// Host-side tests for constants and their relationships.
// The web constants are wasm-gated in the crate, so both files are included
// directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod core_constants {
    include!("../src/core/constants.rs");
}

use constants::*;
use core_constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn emitter_defaults_are_valid_parameters() {
    // Volumes are gains, never negative
    assert!(RED_DEFAULT_VOLUME >= 0.0);
    assert!(BLUE_DEFAULT_VOLUME >= 0.0);

    // Reference distance must be strictly positive
    assert!(RED_DEFAULT_REF_DISTANCE > 0.0);
    assert!(BLUE_DEFAULT_REF_DISTANCE > 0.0);

    // Blue rolls off more gently than red
    assert!(DEFAULT_ROLLOFF > 0.0);
    assert!(BLUE_ROLLOFF_SCALE > 0.0 && BLUE_ROLLOFF_SCALE < 1.0);

    // Cone: outer angle wraps the inner one, outer gain is a fraction
    assert!(CONE_OUTER_DEG >= CONE_INNER_DEG);
    assert!(CONE_OUTER_DEG <= 360.0);
    assert!(CONE_OUTER_GAIN >= 0.0 && CONE_OUTER_GAIN <= 1.0);
    assert!(EXTERNAL_BLUE_VOLUME_GAIN > 1.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn placement_geometry() {
    // Roughly six feet between the two models
    assert!((SECOND_MODEL_OFFSET - 6.0 * 0.3048).abs() < 0.01);
    assert_eq!(FLOOR_HEIGHT, 0.0);
    assert!(RED_MODEL_SCALE > BLUE_MODEL_SCALE);
    assert!(FALLBACK_CUBE_SIZE > 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn visualizer_animation_stays_visible() {
    // Rings never shrink to nothing or turn fully opaque/transparent
    assert!(RING_SCALE_SWING < 1.0);
    assert!(VISUALIZER_RING_OPACITY - RING_OPACITY_SWING > 0.0);
    assert!(VISUALIZER_RING_OPACITY + RING_OPACITY_SWING < 1.0);

    // Innermost ring clears the sphere, rings do not overlap
    assert!(VISUALIZER_RING_BASE_RADIUS - VISUALIZER_RING_TUBE > VISUALIZER_SPHERE_RADIUS);
    assert!(VISUALIZER_RING_STEP > 2.0 * VISUALIZER_RING_TUBE);
    assert!(VISUALIZER_RING_COUNT > 0);

    assert!(RETICLE_OUTER_RADIUS > RETICLE_INNER_RADIUS);
    assert!(RETICLE_SEGMENTS >= 3);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn fps_and_ui_timing() {
    assert!(FPS_WINDOW_MS > 0.0);
    assert!(FPS_GOOD_ABOVE > FPS_WARNING_ABOVE);
    assert!(PLACEMENT_ERROR_MS > 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn tessellation_is_not_degenerate() {
    assert!(SPHERE_SEGMENTS >= 3 && SPHERE_SEGMENTS % 2 == 0);
    assert!(TORUS_RADIAL_SEGMENTS >= 3);
    assert!(TORUS_TUBULAR_SEGMENTS >= 3);
}

#[test]
fn asset_paths_point_at_the_served_folders() {
    for p in [MODEL_A_PATH, MODEL_B_PATH] {
        assert!(p.starts_with("model/") && p.ends_with(".glb"));
    }
    for p in [RED_SOUND_PATH, BLUE_SOUND_PATH] {
        assert!(p.starts_with("sounds/") && p.ends_with(".mp3"));
    }
    assert_ne!(RED_SOUND_PATH, BLUE_SOUND_PATH);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn renderer_and_panner_ranges() {
    assert!(KEY_LIGHT_INTENSITY > 0.0);
    assert!(AMBIENT_INTENSITY > 0.0);
    assert!(HEMI_SKY_INTENSITY > 0.0);
    assert!(KEY_LIGHT_DIR.iter().any(|c| *c != 0.0));
    assert!(PANNER_MAX_DISTANCE > 1000.0);
}

#[test]
fn dom_ids_are_distinct() {
    let mut ids = vec![
        CONTAINER_ID,
        START_BUTTON_ID,
        AR_PROMPT_ID,
        INSTRUCTIONS_ID,
        SOUND_CONTROLS_ID,
        TOGGLE_CONTROLS_ID,
        EXTERNAL_CONTROLS_ID,
        ERROR_MESSAGE_ID,
        FPS_COUNTER_ID,
        VISUALIZER_CHECKBOX_ID,
        VISUALIZER_BUTTON_ID,
        TOGGLE_SETTINGS_ID,
    ];
    let n = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), n);
}
