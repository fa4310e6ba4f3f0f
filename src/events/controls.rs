use crate::core::control::{ControlKind, CONTROLS};
use crate::core::Command;
use crate::dom;
use crate::overlay;
use crate::WebApp;
use web_sys as web;

/// Forward every panel control to the app as a typed command.
pub fn wire_controls(document: &web::Document, app: &WebApp) {
    for spec in CONTROLS {
        let app = app.clone();
        let doc = document.clone();
        let control = spec.id;
        dom::add_listener(document, control, spec.kind.event(), move |ev| {
            let value = match spec.kind {
                ControlKind::Button => String::new(),
                _ => dom::event_value(&ev).unwrap_or_default(),
            };
            match Command::from_input(control, &value) {
                Ok(cmd) => dispatch(&app, &doc, cmd),
                Err(e) => log::warn!("[controls] {}", e),
            }
        });
    }

    // Mobile: act on touchend and suppress the synthetic click that follows.
    let app = app.clone();
    let doc = document.clone();
    dom::add_listener(
        document,
        crate::constants::TOGGLE_SETTINGS_ID,
        "touchend",
        move |ev| {
            ev.prevent_default();
            dispatch(&app, &doc, Command::ToggleSettingsPanel);
        },
    );
}

fn dispatch(app: &WebApp, document: &web::Document, cmd: Command) {
    let mut app = app.borrow_mut();
    if let Err(e) = app.dispatch(cmd) {
        log::warn!("[controls] {:?} rejected: {}", cmd, e);
    }
    overlay::sync(document, &mut app.ui);
}
