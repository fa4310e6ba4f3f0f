//! WebXR session negotiation and per-frame hit testing.
//!
//! Requires `--cfg=web_sys_unstable_apis` (see `.cargo/config.toml`).

use crate::core::placement::{ArRuntime, HitSampler, SessionInit};
use crate::core::{HitTestSample, Pose, XrError};
use glam::{Mat4, Vec3};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn js_err(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

fn features(list: &[&str]) -> js_sys::Array {
    list.iter().map(|f| JsValue::from_str(f)).collect()
}

/// Everything a running session needs kept alive.
#[derive(Clone)]
pub struct XrHandles {
    pub session: web::XrSession,
    pub ref_space: web::XrReferenceSpace,
    pub hit_source: web::XrHitTestSource,
}

pub struct WebXrRuntime {
    gl: web::WebGl2RenderingContext,
}

impl WebXrRuntime {
    /// `gl` must have been created with `xrCompatible: true`.
    pub fn new(gl: web::WebGl2RenderingContext) -> Self {
        Self { gl }
    }

    fn xr_system() -> Option<web::XrSystem> {
        let navigator = web::window()?.navigator();
        let has_xr = js_sys::Reflect::has(&navigator, &JsValue::from_str("xr")).unwrap_or(false);
        if !has_xr {
            return None;
        }
        Some(navigator.xr())
    }

    async fn setup(&self, session: &web::XrSession) -> Result<XrHandles, XrError> {
        let setup_err = |e: JsValue| XrError::SessionSetup(js_err(e));

        let layer = web::XrWebGlLayer::new_with_web_gl2_rendering_context(session, &self.gl)
            .map_err(setup_err)?;
        let state = web::XrRenderStateInit::new();
        state.set_base_layer(Some(&layer));
        session.update_render_state_with_state(&state);

        // local-floor is optional; fall back to local.
        let ref_space = match JsFuture::from(
            session.request_reference_space(web::XrReferenceSpaceType::LocalFloor),
        )
        .await
        {
            Ok(space) => space,
            Err(e) => {
                log::warn!("[xr] local-floor unavailable ({}); using local", js_err(e));
                JsFuture::from(session.request_reference_space(web::XrReferenceSpaceType::Local))
                    .await
                    .map_err(setup_err)?
            }
        }
        .dyn_into::<web::XrReferenceSpace>()
        .map_err(setup_err)?;

        let viewer_space: web::XrReferenceSpace =
            JsFuture::from(session.request_reference_space(web::XrReferenceSpaceType::Viewer))
                .await
                .map_err(setup_err)?
                .dyn_into()
                .map_err(setup_err)?;
        let opts = web::XrHitTestOptionsInit::new(&viewer_space);
        let hit_source: web::XrHitTestSource =
            JsFuture::from(session.request_hit_test_source(&opts))
                .await
                .map_err(setup_err)?
                .dyn_into()
                .map_err(setup_err)?;

        Ok(XrHandles {
            session: session.clone(),
            ref_space,
            hit_source,
        })
    }
}

impl ArRuntime for WebXrRuntime {
    type Handles = XrHandles;

    async fn is_supported(&self) -> Result<bool, XrError> {
        let xr = Self::xr_system().ok_or(XrError::ApiMissing)?;
        let supported = JsFuture::from(xr.is_session_supported(web::XrSessionMode::ImmersiveAr))
            .await
            .map_err(|e| XrError::SessionRequest(js_err(e)))?;
        Ok(supported.as_bool().unwrap_or(false))
    }

    async fn request_session(&self, init: &SessionInit) -> Result<XrHandles, XrError> {
        let xr = Self::xr_system().ok_or(XrError::ApiMissing)?;
        let mode = web::XrSessionMode::from_js_value(&JsValue::from_str(init.mode))
            .unwrap_or(web::XrSessionMode::ImmersiveAr);

        let session_init = web::XrSessionInit::new();
        session_init.set_required_features(&features(init.required_features));
        session_init.set_optional_features(&features(init.optional_features));
        if let Some(root) = crate::dom::window_document()
            .and_then(|d| d.get_element_by_id(init.dom_overlay_root))
        {
            let overlay = js_sys::Object::new();
            _ = js_sys::Reflect::set(&overlay, &JsValue::from_str("root"), &root);
            _ = js_sys::Reflect::set(&session_init, &JsValue::from_str("domOverlay"), &overlay);
        }

        let session: web::XrSession =
            JsFuture::from(xr.request_session_with_options(mode, &session_init))
                .await
                .map_err(|e| XrError::SessionRequest(js_err(e)))?
                .dyn_into()
                .map_err(|e| XrError::SessionRequest(js_err(e)))?;

        match self.setup(&session).await {
            Ok(handles) => Ok(handles),
            Err(e) => {
                _ = session.end();
                Err(e)
            }
        }
    }

    fn release(&self, handles: XrHandles) {
        handles.hit_source.cancel();
        log::debug!("[xr] hit-test source cancelled");
    }

    fn discard(&self, handles: XrHandles) {
        handles.hit_source.cancel();
        _ = handles.session.end();
        log::debug!("[xr] unadopted session ended");
    }
}

/// `XRFrame.getHitTestResults`, with the exception a frame that is no
/// longer active throws turned into `None`.
fn hit_results(frame: &web::XrFrame, source: &web::XrHitTestSource) -> Option<js_sys::Array> {
    let query: js_sys::Function =
        js_sys::Reflect::get(frame, &JsValue::from_str("getHitTestResults"))
            .ok()?
            .dyn_into()
            .ok()?;
    match query.call1(frame, source) {
        Ok(results) => results.dyn_into().ok(),
        Err(e) => {
            log::debug!("[xr] hit test unavailable on this frame: {}", js_err(e));
            None
        }
    }
}

/// One frame's view of the session: an animation frame or the frame
/// carried by a select event.
pub struct XrFrameSampler<'a> {
    pub frame: &'a web::XrFrame,
}

impl HitSampler<XrHandles> for XrFrameSampler<'_> {
    fn sample(&self, handles: &XrHandles) -> HitTestSample {
        let Some(results) = hit_results(self.frame, &handles.hit_source) else {
            return HitTestSample::miss();
        };
        HitTestSample::first_of(
            results
                .iter()
                .filter_map(|r| r.dyn_into::<web::XrHitTestResult>().ok())
                .filter_map(|r| r.get_pose(&handles.ref_space))
                .filter_map(|p| matrix16(&p.transform().matrix()))
                .map(|m| Pose::from_matrix(&m))
                .take(1),
        )
    }
}

pub(crate) fn matrix16(v: &[f32]) -> Option<[f32; 16]> {
    v.try_into().ok()
}

/// One eye (or the single phone view) for this frame.
pub struct ViewParams {
    pub view_proj: Mat4,
    pub viewport: (i32, i32, i32, i32),
}

/// Camera state of a frame: per-view matrices plus the viewer pose for the
/// audio listener.
pub struct ViewerFrame {
    pub views: Vec<ViewParams>,
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
}

pub fn viewer_frame(
    frame: &web::XrFrame,
    handles: &XrHandles,
    layer: &web::XrWebGlLayer,
) -> Option<ViewerFrame> {
    let pose = frame.get_viewer_pose(&handles.ref_space)?;
    let viewer = Mat4::from_cols_array(&matrix16(&pose.transform().matrix())?);
    let views = pose
        .views()
        .iter()
        .filter_map(|v| v.dyn_into::<web::XrView>().ok())
        .filter_map(|view| {
            let proj = Mat4::from_cols_array(&matrix16(&view.projection_matrix())?);
            let inv = Mat4::from_cols_array(&matrix16(&view.transform().inverse().matrix())?);
            let vp = layer.get_viewport(&view)?;
            Some(ViewParams {
                view_proj: proj * inv,
                viewport: (vp.x(), vp.y(), vp.width(), vp.height()),
            })
        })
        .collect();
    Some(ViewerFrame {
        views,
        position: viewer.w_axis.truncate(),
        forward: viewer.transform_vector3(Vec3::NEG_Z),
        up: viewer.transform_vector3(Vec3::Y),
    })
}
