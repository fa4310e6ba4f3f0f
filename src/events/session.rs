use crate::assets::GltfModelSource;
use crate::audio::AudioEngine;
use crate::constants::START_BUTTON_ID;
use crate::core::app::{end_session, place_models, start_session};
use crate::core::{UserGesture, XrError};
use crate::dom;
use crate::frame::{self, FrameContext};
use crate::overlay;
use crate::xr::{WebXrRuntime, XrFrameSampler};
use crate::WebApp;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

#[derive(Clone)]
pub struct SessionWiring {
    pub document: web::Document,
    pub app: WebApp,
    pub runtime: Rc<WebXrRuntime>,
    pub audio: AudioEngine,
    pub models: GltfModelSource,
    pub frame: Rc<RefCell<FrameContext>>,
}

impl SessionWiring {
    fn sync_overlay(&self) {
        overlay::sync(&self.document, &mut self.app.borrow_mut().ui);
    }
}

/// The AR button: negotiate a session, then hook its events and start
/// the frame loop.
pub fn wire_start_button(w: &SessionWiring) {
    let document = w.document.clone();
    let w = w.clone();
    dom::add_click_listener(&document, START_BUTTON_ID, move || {
        let gesture = UserGesture::from_user_action();
        w.audio.resume();
        let w = w.clone();
        spawn_local(async move {
            match start_session(&w.app, w.runtime.as_ref(), gesture).await {
                Ok(()) => {
                    let handles = w.app.borrow().session.handles().cloned();
                    if let Some(h) = handles {
                        wire_session_events(&w, &h.session);
                        frame::start_loop(w.frame.clone(), h.session);
                    }
                }
                Err(XrError::NotReady(state)) => {
                    log::warn!("[xr] start ignored in {:?}", state);
                }
                Err(XrError::SessionPending) => {
                    log::warn!("[xr] start ignored; a session request is pending");
                }
                // reported by the app already
                Err(_) => {}
            }
            w.sync_overlay();
        });
    });
}

fn wire_session_events(w: &SessionWiring, session: &web::XrSession) {
    let wsel = w.clone();
    let on_select = Closure::wrap(Box::new(move |ev: web::Event| {
        let frame = ev
            .dyn_ref::<web::XrInputSourceEvent>()
            .map(web::XrInputSourceEvent::frame);
        let sampler = frame.as_ref().map(|frame| XrFrameSampler { frame });
        let hit = wsel.app.borrow().select_hit(sampler.as_ref());
        let w = wsel.clone();
        spawn_local(async move {
            let outcome = place_models(&w.app, &w.models, &w.audio, hit, instant::now).await;
            log::debug!("[place] {:?}", outcome);
            w.sync_overlay();
        });
    }) as Box<dyn FnMut(web::Event)>);
    _ = session.add_event_listener_with_callback("select", on_select.as_ref().unchecked_ref());
    on_select.forget();

    let wend = w.clone();
    let on_end = Closure::wrap(Box::new(move |_ev: web::Event| {
        end_session(&wend.app, wend.runtime.as_ref());
        wend.sync_overlay();
    }) as Box<dyn FnMut(web::Event)>);
    _ = session.add_event_listener_with_callback("end", on_end.as_ref().unchecked_ref());
    on_end.forget();
}
