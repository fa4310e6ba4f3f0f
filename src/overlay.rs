use crate::constants::*;
use crate::core::ui::{Panel, Readout, UiState};
use crate::dom;
use web_sys as web;

#[inline]
fn panel_id(panel: Panel) -> &'static str {
    match panel {
        Panel::ArPrompt => AR_PROMPT_ID,
        Panel::Instructions => INSTRUCTIONS_ID,
        Panel::SoundControls => SOUND_CONTROLS_ID,
        Panel::ToggleControls => TOGGLE_CONTROLS_ID,
        Panel::ExternalControls => EXTERNAL_CONTROLS_ID,
        Panel::ErrorMessage => ERROR_MESSAGE_ID,
        Panel::FpsCounter => FPS_COUNTER_ID,
    }
}

#[inline]
fn readout_id(r: Readout) -> &'static str {
    match r {
        Readout::RedVolume => "red-volume-value",
        Readout::BlueVolume => "blue-volume-value",
        Readout::RefDistance => "ref-distance-value",
        Readout::Rolloff => "rolloff-value",
        Readout::ModelScale => "model-scale-value",
        Readout::Model2Scale => "model2-scale-value",
    }
}

/// Mirror the UI state into the page if anything changed since last call.
pub fn sync(document: &web::Document, ui: &mut UiState) {
    if !ui.take_dirty() {
        return;
    }
    for p in Panel::ALL {
        dom::set_hidden(document, panel_id(p), !ui.is_visible(p));
    }
    dom::set_text(document, INSTRUCTIONS_ID, &ui.instructions_text);
    if !ui.error_text.is_empty() {
        dom::set_text(document, ERROR_MESSAGE_ID, &ui.error_text);
    }
    for (r, text) in ui.readouts() {
        dom::set_text(document, readout_id(r), text);
    }

    dom::set_text(document, FPS_COUNTER_ID, &ui.fps_text);
    for class in ["fps-good", "fps-warning", "fps-bad"] {
        dom::set_class(document, FPS_COUNTER_ID, class, class == ui.fps_class);
    }

    dom::set_class(document, SOUND_CONTROLS_ID, "collapsed", ui.settings_collapsed);
    dom::set_class(document, VISUALIZER_BUTTON_ID, "active", ui.visualizers_active);
    dom::set_checked(document, VISUALIZER_CHECKBOX_ID, ui.visualizers_active);
}
