// Web-side tuning: asset locations, DOM ids and renderer lighting.
// Placement and audio constants live in `core/constants.rs`.

// Assets
pub const MODEL_A_PATH: &str = "model/model1.glb";
pub const MODEL_B_PATH: &str = "model/model2.glb";
pub const RED_SOUND_PATH: &str = "sounds/2.mp3";
pub const BLUE_SOUND_PATH: &str = "sounds/1.mp3";

// DOM ids
pub const CONTAINER_ID: &str = "container";
pub const START_BUTTON_ID: &str = "start-ar";
pub const AR_PROMPT_ID: &str = "ar-prompt";
pub const INSTRUCTIONS_ID: &str = "instructions";
pub const SOUND_CONTROLS_ID: &str = "sound-controls";
pub const TOGGLE_CONTROLS_ID: &str = "toggle-controls";
pub const EXTERNAL_CONTROLS_ID: &str = "external-controls";
pub const ERROR_MESSAGE_ID: &str = "error-message";
pub const FPS_COUNTER_ID: &str = "fps-counter";
pub const VISUALIZER_CHECKBOX_ID: &str = "visualizer-toggle";
pub const VISUALIZER_BUTTON_ID: &str = "external-visualizer-toggle";
pub const TOGGLE_SETTINGS_ID: &str = "toggle-settings";

// Lighting (single directional key light + ambient fill)
pub const KEY_LIGHT_DIR: [f32; 3] = [5.0, 10.0, 7.0]; // light position, aimed at origin
pub const KEY_LIGHT_INTENSITY: f32 = 1.5;
pub const AMBIENT_INTENSITY: f32 = 0.5;
pub const HEMI_SKY_INTENSITY: f32 = 0.7;

// Panner
pub const PANNER_MAX_DISTANCE: f32 = 10000.0;
