//! DOM-independent view of the overlay UI.
//!
//! The core writes here; `overlay.rs` mirrors it into the page whenever
//! `take_dirty` reports a change.

use crate::core::constants::PLACEMENT_ERROR_MS;
use fnv::FnvHashMap;

pub const INSTRUCTIONS_TEXT: &str = "Tap on the ground to place objects";
pub const PLACEMENT_ERROR_TEXT: &str = "Error placing objects. Please try again.";
pub const SESSION_ERROR_TEXT: &str = "Failed to start AR session. Please try again.";
pub const FPS_PLACEHOLDER: &str = "FPS: --";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Panel {
    ArPrompt,
    Instructions,
    SoundControls,
    ToggleControls,
    ExternalControls,
    ErrorMessage,
    FpsCounter,
}

impl Panel {
    pub const ALL: [Panel; 7] = [
        Panel::ArPrompt,
        Panel::Instructions,
        Panel::SoundControls,
        Panel::ToggleControls,
        Panel::ExternalControls,
        Panel::ErrorMessage,
        Panel::FpsCounter,
    ];
}

/// Text labels that mirror slider values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Readout {
    RedVolume,
    BlueVolume,
    RefDistance,
    Rolloff,
    ModelScale,
    Model2Scale,
}

#[derive(Clone, Debug)]
pub struct UiState {
    visible: FnvHashMap<Panel, bool>,
    readouts: FnvHashMap<Readout, String>,
    pub instructions_text: String,
    pub error_text: String,
    pub fps_text: String,
    pub fps_class: &'static str,
    pub settings_collapsed: bool,
    pub visualizers_active: bool,
    error_deadline_ms: Option<f64>,
    dirty: bool,
}

impl Default for UiState {
    fn default() -> Self {
        let mut visible = FnvHashMap::default();
        for p in Panel::ALL {
            visible.insert(p, p == Panel::ArPrompt);
        }
        Self {
            visible,
            readouts: FnvHashMap::default(),
            instructions_text: INSTRUCTIONS_TEXT.to_string(),
            error_text: String::new(),
            fps_text: FPS_PLACEHOLDER.to_string(),
            fps_class: "",
            settings_collapsed: false,
            visualizers_active: false,
            error_deadline_ms: None,
            dirty: true,
        }
    }
}

impl UiState {
    pub fn is_visible(&self, panel: Panel) -> bool {
        self.visible.get(&panel).copied().unwrap_or(false)
    }

    pub fn set_visible(&mut self, panel: Panel, visible: bool) {
        if self.visible.insert(panel, visible) != Some(visible) {
            self.dirty = true;
        }
    }

    pub fn show(&mut self, panel: Panel) {
        self.set_visible(panel, true);
    }

    pub fn hide(&mut self, panel: Panel) {
        self.set_visible(panel, false);
    }

    pub fn readout(&self, r: Readout) -> Option<&str> {
        self.readouts.get(&r).map(String::as_str)
    }

    pub fn readouts(&self) -> impl Iterator<Item = (Readout, &str)> {
        self.readouts.iter().map(|(r, s)| (*r, s.as_str()))
    }

    pub fn set_readout(&mut self, r: Readout, text: String) {
        self.readouts.insert(r, text);
        self.dirty = true;
    }

    pub fn show_error(&mut self, text: impl Into<String>) {
        self.error_text = text.into();
        self.show(Panel::ErrorMessage);
        self.dirty = true;
    }

    pub fn set_fps(&mut self, text: String, class: &'static str) {
        self.fps_text = text;
        self.fps_class = class;
        self.dirty = true;
    }

    pub fn toggle_settings(&mut self) {
        self.settings_collapsed = !self.settings_collapsed;
        self.dirty = true;
    }

    pub fn set_visualizers_active(&mut self, active: bool) {
        self.visualizers_active = active;
        self.dirty = true;
    }

    /// Show the placement error in the instructions panel until
    /// `now_ms + PLACEMENT_ERROR_MS`.
    pub fn show_placement_error(&mut self, now_ms: f64) {
        self.instructions_text = PLACEMENT_ERROR_TEXT.to_string();
        self.show(Panel::Instructions);
        self.error_deadline_ms = Some(now_ms + PLACEMENT_ERROR_MS);
        self.dirty = true;
    }

    pub fn placement_error_pending(&self) -> bool {
        self.error_deadline_ms.is_some()
    }

    /// Clear an expired placement error. Returns true if one was cleared.
    pub fn expire(&mut self, now_ms: f64) -> bool {
        match self.error_deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.error_deadline_ms = None;
                self.instructions_text = INSTRUCTIONS_TEXT.to_string();
                self.hide(Panel::Instructions);
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    /// Drop a pending placement error without the timeout (session end).
    pub fn cancel_placement_error(&mut self) {
        if self.error_deadline_ms.take().is_some() {
            self.instructions_text = INSTRUCTIONS_TEXT.to_string();
            self.dirty = true;
        }
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
