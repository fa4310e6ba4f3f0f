use crate::audio::AudioEngine;
use crate::overlay;
use crate::render::Renderer;
use crate::xr::{viewer_frame, XrFrameSampler};
use crate::WebApp;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub app: WebApp,
    pub renderer: Renderer,
    pub audio: AudioEngine,
    pub document: web::Document,
}

impl FrameContext {
    /// One XR animation frame. Returns false once the session is gone so the
    /// loop stops rescheduling.
    pub fn frame(&mut self, xr_frame: &web::XrFrame) -> bool {
        let mut app = self.app.borrow_mut();
        let Some(handles) = app.session.handles().cloned() else {
            return false;
        };
        let sampler = XrFrameSampler { frame: xr_frame };
        if app.on_frame(instant::now(), Some(&sampler)) {
            if let Some(layer) = handles.session.render_state().base_layer() {
                if let Some(view) = viewer_frame(xr_frame, &handles, &layer) {
                    self.audio
                        .update_listener(view.position, view.forward, view.up);
                    self.renderer
                        .render(&app.scene, layer.framebuffer().as_ref(), &view.views);
                }
            }
        }
        overlay::sync(&self.document, &mut app.ui);
        true
    }
}

/// Drive `ctx` from `session.requestAnimationFrame` until the session ends.
pub fn start_loop(ctx: Rc<RefCell<FrameContext>>, session: web::XrSession) {
    type XrCallback = Closure<dyn FnMut(f64, web::XrFrame)>;
    let f: Rc<RefCell<Option<XrCallback>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let s = session.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_t: f64, xr_frame: web::XrFrame| {
        if !ctx.borrow_mut().frame(&xr_frame) {
            log::info!("[frame] session gone; loop stopped");
            return;
        }
        if let Some(cb) = f.borrow().as_ref() {
            s.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64, web::XrFrame)>));
    if let Some(cb) = g.borrow().as_ref() {
        session.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
