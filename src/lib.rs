//! Spatial-audio AR demo: tap the floor to drop two sound-emitting models.
//!
//! `core` is plain Rust and builds on any target; everything else is the
//! browser glue and only exists on wasm32.

pub mod core;

#[cfg(target_arch = "wasm32")]
mod assets;
#[cfg(target_arch = "wasm32")]
mod audio;
#[cfg(target_arch = "wasm32")]
mod constants;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod events;
#[cfg(target_arch = "wasm32")]
mod frame;
#[cfg(target_arch = "wasm32")]
mod overlay;
#[cfg(target_arch = "wasm32")]
mod render;
#[cfg(target_arch = "wasm32")]
mod xr;

#[cfg(target_arch = "wasm32")]
pub use entry::start;

#[cfg(target_arch = "wasm32")]
pub(crate) type WebApp =
    crate::core::SharedApp<crate::core::Scene, audio::WebVoice, xr::XrHandles>;

#[cfg(target_arch = "wasm32")]
mod entry {
    use crate::assets::GltfModelSource;
    use crate::audio::AudioEngine;
    use crate::constants::CONTAINER_ID;
    use crate::core::app::check_support;
    use crate::core::{App, Scene};
    use crate::events::{self, SessionWiring};
    use crate::frame::FrameContext;
    use crate::render::Renderer;
    use crate::xr::WebXrRuntime;
    use crate::{dom, overlay};
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::spawn_local;
    use web_sys as web;

    fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
        dom::sync_canvas_backing_size(canvas);
        let canvas_resize = canvas.clone();
        let resize_closure = Closure::wrap(Box::new(move || {
            dom::sync_canvas_backing_size(&canvas_resize);
        }) as Box<dyn FnMut()>);
        if let Some(window) = web::window() {
            _ = window.add_event_listener_with_callback(
                "resize",
                resize_closure.as_ref().unchecked_ref(),
            );
        }
        resize_closure.forget();
    }

    /// Canvas the XR layer renders through, created inside the overlay root.
    fn create_canvas(document: &web::Document) -> anyhow::Result<web::HtmlCanvasElement> {
        let canvas: web::HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .dyn_into()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        let parent = document
            .get_element_by_id(CONTAINER_ID)
            .map(web::Node::from)
            .or_else(|| document.body().map(web::Node::from))
            .ok_or_else(|| anyhow::anyhow!("missing #{}", CONTAINER_ID))?;
        parent
            .append_child(&canvas)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(canvas)
    }

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();
        log::info!("ar-sound starting");

        spawn_local(async move {
            if let Err(e) = init().await {
                log::error!("init error: {:?}", e);
            }
        });
        Ok(())
    }

    async fn init() -> anyhow::Result<()> {
        let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

        let canvas = create_canvas(&document)?;
        wire_canvas_resize(&canvas);
        let gl = Renderer::context_for(&canvas)?;
        let renderer = Renderer::new(gl.clone())?;
        let runtime = Rc::new(WebXrRuntime::new(gl));

        let audio = AudioEngine::new()?;
        let app = App::new(Scene::new())?.into_shared();

        let frame = Rc::new(RefCell::new(FrameContext {
            app: app.clone(),
            renderer,
            audio: audio.clone(),
            document: document.clone(),
        }));
        let wiring = SessionWiring {
            document: document.clone(),
            app: app.clone(),
            runtime: runtime.clone(),
            audio: audio.clone(),
            models: GltfModelSource,
            frame,
        };
        events::wire_controls(&document, &app);
        events::wire_start_button(&wiring);

        check_support(&app, runtime.as_ref()).await;
        overlay::sync(&document, &mut app.borrow_mut().ui);

        audio.load_buffers().await;
        Ok(())
    }
}
