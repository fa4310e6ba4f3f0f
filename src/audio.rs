use crate::constants::{BLUE_SOUND_PATH, PANNER_MAX_DISTANCE, RED_SOUND_PATH};
use crate::core::emitter::{AudioBackend, DirectionalCone, DistanceModel, EmitterId, SpatialVoice};
use crate::core::AudioError;
use crate::dom;
use glam::Vec3;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn node_err(label: &str, e: wasm_bindgen::JsValue) -> AudioError {
    log::error!("[audio] {} error: {:?}", label, e);
    AudioError::Node(format!("{}: {:?}", label, e))
}

fn create_gain(audio_ctx: &web::AudioContext, value: f32) -> Result<web::GainNode, AudioError> {
    let g = web::GainNode::new(audio_ctx).map_err(|e| node_err("GainNode", e))?;
    g.gain().set_value(value);
    Ok(g)
}

/// Decoded sound buffers plus the context that plays them.
#[derive(Clone)]
pub struct AudioEngine {
    pub ctx: web::AudioContext,
    buffers: Rc<RefCell<[Option<web::AudioBuffer>; 2]>>,
}

impl AudioEngine {
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(Self {
            ctx,
            buffers: Rc::new(RefCell::new([None, None])),
        })
    }

    /// Browsers keep the context suspended until a user gesture.
    pub fn resume(&self) {
        _ = self.ctx.resume();
    }

    /// Fetch and decode both emitter sounds. A failed sound is logged and
    /// left empty; placement will report it.
    pub async fn load_buffers(&self) {
        for (id, path) in [
            (EmitterId::Red, RED_SOUND_PATH),
            (EmitterId::Blue, BLUE_SOUND_PATH),
        ] {
            match self.decode(path).await {
                Ok(buf) => {
                    log::info!("[audio] decoded {} ({:.1}s)", path, buf.duration());
                    self.buffers.borrow_mut()[id.index()] = Some(buf);
                }
                Err(e) => log::error!("[audio] {}: {}", path, e),
            }
        }
    }

    async fn decode(&self, path: &str) -> Result<web::AudioBuffer, AudioError> {
        let data = dom::fetch_array_buffer(path)
            .await
            .map_err(|e| AudioError::Node(e.to_string()))?;
        let promise = self
            .ctx
            .decode_audio_data(&data)
            .map_err(|e| node_err("decodeAudioData", e))?;
        JsFuture::from(promise)
            .await
            .map_err(|e| node_err("decodeAudioData", e))?
            .dyn_into::<web::AudioBuffer>()
            .map_err(|e| node_err("AudioBuffer", e))
    }

    pub fn update_listener(&self, position: Vec3, forward: Vec3, up: Vec3) {
        let listener = self.ctx.listener();
        listener.set_position(position.x as f64, position.y as f64, position.z as f64);
        _ = listener.set_orientation(
            forward.x as f64,
            forward.y as f64,
            forward.z as f64,
            up.x as f64,
            up.y as f64,
            up.z as f64,
        );
    }
}

impl AudioBackend for AudioEngine {
    type Voice = WebVoice;

    fn create_voice(&self, id: EmitterId) -> Result<WebVoice, AudioError> {
        let buffer = self.buffers.borrow()[id.index()]
            .clone()
            .ok_or(AudioError::BufferMissing(id))?;
        let source = self
            .ctx
            .create_buffer_source()
            .map_err(|e| node_err("AudioBufferSourceNode", e))?;
        source.set_buffer(Some(&buffer));

        let gain = create_gain(&self.ctx, 1.0)?;
        let panner = web::PannerNode::new(&self.ctx).map_err(|e| node_err("PannerNode", e))?;
        panner.set_panning_model(web::PanningModelType::Hrtf);
        panner.set_max_distance(PANNER_MAX_DISTANCE as f64);

        _ = source.connect_with_audio_node(&gain);
        _ = gain.connect_with_audio_node(&panner);
        _ = panner.connect_with_audio_node(&self.ctx.destination());

        Ok(WebVoice {
            source,
            gain,
            panner,
            started: Cell::new(false),
        })
    }
}

/// Buffer source -> gain (volume) -> panner (attenuation, cone).
pub struct WebVoice {
    source: web::AudioBufferSourceNode,
    gain: web::GainNode,
    panner: web::PannerNode,
    started: Cell<bool>,
}

impl SpatialVoice for WebVoice {
    fn set_volume(&self, volume: f32) {
        self.gain.gain().set_value(volume);
    }

    fn set_reference_distance(&self, distance: f32) {
        self.panner.set_ref_distance(distance as f64);
    }

    fn set_rolloff_factor(&self, rolloff: f32) {
        self.panner.set_rolloff_factor(rolloff as f64);
    }

    fn set_distance_model(&self, model: DistanceModel) {
        self.panner.set_distance_model(match model {
            DistanceModel::Linear => web::DistanceModelType::Linear,
            DistanceModel::Inverse => web::DistanceModelType::Inverse,
            DistanceModel::Exponential => web::DistanceModelType::Exponential,
        });
    }

    fn set_directional_cone(&self, cone: &DirectionalCone) {
        self.panner.set_cone_inner_angle(cone.inner_angle_deg as f64);
        self.panner.set_cone_outer_angle(cone.outer_angle_deg as f64);
        self.panner.set_cone_outer_gain(cone.outer_gain as f64);
    }

    fn set_looping(&self, looping: bool) {
        self.source.set_loop(looping);
    }

    fn set_position(&self, position: Vec3) {
        self.panner.position_x().set_value(position.x);
        self.panner.position_y().set_value(position.y);
        self.panner.position_z().set_value(position.z);
    }

    fn set_orientation(&self, forward: Vec3) {
        self.panner.orientation_x().set_value(forward.x);
        self.panner.orientation_y().set_value(forward.y);
        self.panner.orientation_z().set_value(forward.z);
    }

    fn play(&self) -> Result<(), AudioError> {
        // a buffer source can only be started once
        if self.started.replace(true) {
            return Ok(());
        }
        self.source.start().map_err(|e| node_err("start", e))
    }

    fn stop(&self) {
        if self.started.get() {
            _ = self.source.stop();
        }
        _ = self.panner.disconnect();
    }
}
