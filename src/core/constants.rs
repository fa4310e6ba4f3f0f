// Placement, emitter and animation tuning shared by the core state machines.

// Placement
pub const SECOND_MODEL_OFFSET: f32 = 1.83; // ~6 feet behind the hit point
pub const FLOOR_HEIGHT: f32 = 0.0;

// Model post-processing
pub const RED_MODEL_SCALE: f32 = 15.0;
pub const BLUE_MODEL_SCALE: f32 = 0.3;

// Fallback primitive
pub const FALLBACK_CUBE_SIZE: f32 = 0.8;
pub const FALLBACK_METALNESS: f32 = 0.6;
pub const FALLBACK_ROUGHNESS: f32 = 0.2;
pub const FALLBACK_CLEARCOAT: f32 = 0.5;
pub const FALLBACK_CLEARCOAT_ROUGHNESS: f32 = 0.3;
pub const FALLBACK_REFLECTIVITY: f32 = 0.8;
pub const FALLBACK_ENV_MAP_INTENSITY: f32 = 0.8;

pub const RED_COLOR: [f32; 3] = [1.0, 0.0, 0.0];
pub const BLUE_COLOR: [f32; 3] = [0.0, 0.0, 1.0];

// Emitter defaults
pub const RED_DEFAULT_VOLUME: f32 = 15.0;
pub const RED_DEFAULT_REF_DISTANCE: f32 = 0.3;
pub const BLUE_DEFAULT_VOLUME: f32 = 1.0;
pub const BLUE_DEFAULT_REF_DISTANCE: f32 = 1.0; // 1 m
pub const DEFAULT_ROLLOFF: f32 = 1.9;
pub const BLUE_ROLLOFF_SCALE: f32 = 0.8;
pub const CONE_INNER_DEG: f32 = 180.0;
pub const CONE_OUTER_DEG: f32 = 230.0;
pub const CONE_OUTER_GAIN: f32 = 0.3;
pub const EXTERNAL_BLUE_VOLUME_GAIN: f32 = 1.5;

// Reticle ring
pub const RETICLE_INNER_RADIUS: f32 = 0.15;
pub const RETICLE_OUTER_RADIUS: f32 = 0.2;
pub const RETICLE_SEGMENTS: u32 = 32;

// Sound visualizer
pub const VISUALIZER_RING_COUNT: usize = 3;
pub const VISUALIZER_SPHERE_RADIUS: f32 = 0.1;
pub const VISUALIZER_SPHERE_OPACITY: f32 = 0.3;
pub const VISUALIZER_RING_BASE_RADIUS: f32 = 0.2;
pub const VISUALIZER_RING_STEP: f32 = 0.2;
pub const VISUALIZER_RING_TUBE: f32 = 0.02;
pub const VISUALIZER_RING_OPACITY: f32 = 0.2;
pub const RING_SCALE_SWING: f32 = 0.2;
pub const RING_SCALE_RATE: f32 = 2.0;
pub const RING_SPIN_RATE: f32 = 0.5;
pub const RING_OPACITY_SWING: f32 = 0.1;
pub const RING_OPACITY_RATE: f32 = 3.0;

// FPS meter
pub const FPS_WINDOW_MS: f64 = 1000.0;
pub const FPS_GOOD_ABOVE: u32 = 50;
pub const FPS_WARNING_ABOVE: u32 = 30;

// UI
pub const PLACEMENT_ERROR_MS: f64 = 2000.0;

// Tessellation of procedural shapes
pub const SPHERE_SEGMENTS: u32 = 32;
pub const TORUS_RADIAL_SEGMENTS: u32 = 16;
pub const TORUS_TUBULAR_SEGMENTS: u32 = 32;
