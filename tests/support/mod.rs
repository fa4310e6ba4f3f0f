// In-memory stand-ins for the browser runtime, audio engine and model
// loader, shared by the host-side tests.

#![allow(dead_code)]

use ar_sound::core::assets::{ModelId, ModelSource};
use ar_sound::core::emitter::DirectionalCone;
use ar_sound::core::placement::{ArRuntime, HitSampler, SessionInit};
use ar_sound::core::scene::{Drawable, Geometry, Material, PhysicalMaterial, Scene, SceneNode};
use ar_sound::core::{
    App, AssetError, AudioBackend, AudioError, DistanceModel, EmitterId, HitTestSample, Pose,
    SharedApp, SpatialVoice, Transform, XrError,
};
use glam::{Quat, Vec3};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

pub type TestApp = App<Scene, MockVoice, u32>;
pub type SharedTestApp = SharedApp<Scene, MockVoice, u32>;

#[derive(Clone, Debug, PartialEq)]
pub enum VoiceCall {
    Volume(f32),
    RefDistance(f32),
    Rolloff(f32),
    Model(DistanceModel),
    Cone(DirectionalCone),
    Looping(bool),
    Position(Vec3),
    Orientation(Vec3),
    Play,
    Stop,
}

/// Shared call log, one entry per voice method call.
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<(EmitterId, VoiceCall)>>>);

impl CallLog {
    pub fn push(&self, id: EmitterId, call: VoiceCall) {
        self.0.borrow_mut().push((id, call));
    }

    pub fn calls(&self, id: EmitterId) -> Vec<VoiceCall> {
        self.0
            .borrow()
            .iter()
            .filter(|(e, _)| *e == id)
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn count(&self, id: EmitterId, call: &VoiceCall) -> usize {
        self.calls(id).iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

pub struct MockVoice {
    pub id: EmitterId,
    log: CallLog,
    fail_play: bool,
}

impl MockVoice {
    pub fn new(id: EmitterId, log: &CallLog) -> Self {
        Self {
            id,
            log: log.clone(),
            fail_play: false,
        }
    }
}

impl SpatialVoice for MockVoice {
    fn set_volume(&self, volume: f32) {
        self.log.push(self.id, VoiceCall::Volume(volume));
    }
    fn set_reference_distance(&self, distance: f32) {
        self.log.push(self.id, VoiceCall::RefDistance(distance));
    }
    fn set_rolloff_factor(&self, rolloff: f32) {
        self.log.push(self.id, VoiceCall::Rolloff(rolloff));
    }
    fn set_distance_model(&self, model: DistanceModel) {
        self.log.push(self.id, VoiceCall::Model(model));
    }
    fn set_directional_cone(&self, cone: &DirectionalCone) {
        self.log.push(self.id, VoiceCall::Cone(*cone));
    }
    fn set_looping(&self, looping: bool) {
        self.log.push(self.id, VoiceCall::Looping(looping));
    }
    fn set_position(&self, position: Vec3) {
        self.log.push(self.id, VoiceCall::Position(position));
    }
    fn set_orientation(&self, forward: Vec3) {
        self.log.push(self.id, VoiceCall::Orientation(forward));
    }
    fn play(&self) -> Result<(), AudioError> {
        if self.fail_play {
            return Err(AudioError::Node("start failed".to_string()));
        }
        self.log.push(self.id, VoiceCall::Play);
        Ok(())
    }
    fn stop(&self) {
        self.log.push(self.id, VoiceCall::Stop);
    }
}

#[derive(Default)]
pub struct MockAudio {
    pub log: CallLog,
    /// Emitter whose buffer is "not decoded".
    pub missing: Cell<Option<EmitterId>>,
    pub fail_play: Cell<bool>,
    pub created: Cell<usize>,
}

impl AudioBackend for MockAudio {
    type Voice = MockVoice;

    fn create_voice(&self, id: EmitterId) -> Result<MockVoice, AudioError> {
        if self.missing.get() == Some(id) {
            return Err(AudioError::BufferMissing(id));
        }
        self.created.set(self.created.get() + 1);
        Ok(MockVoice {
            id,
            log: self.log.clone(),
            fail_play: self.fail_play.get(),
        })
    }
}

struct NoopWake;

impl Wake for NoopWake {
    fn wake(self: Arc<Self>) {}
}

/// Poll a future exactly once, so tests can interleave two of them.
pub fn poll_once<F: Future>(fut: Pin<&mut F>) -> Poll<F::Output> {
    let waker = Waker::from(Arc::new(NoopWake));
    fut.poll(&mut Context::from_waker(&waker))
}

/// Pending while the flag is set.
struct Hold<'a>(&'a Cell<bool>);

impl Future for Hold<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.0.get() {
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }
}

pub struct MockRuntime {
    pub supported: Result<bool, XrError>,
    pub fail_session: Cell<bool>,
    /// Keep session requests pending until cleared.
    pub hold: Cell<bool>,
    pub requests: Cell<usize>,
    pub released: RefCell<Vec<u32>>,
    pub discarded: RefCell<Vec<u32>>,
    next_handle: Cell<u32>,
}

impl MockRuntime {
    pub fn supported() -> Self {
        Self::with_support(Ok(true))
    }

    pub fn with_support(supported: Result<bool, XrError>) -> Self {
        Self {
            supported,
            fail_session: Cell::new(false),
            hold: Cell::new(false),
            requests: Cell::new(0),
            released: RefCell::new(Vec::new()),
            discarded: RefCell::new(Vec::new()),
            next_handle: Cell::new(1),
        }
    }
}

impl ArRuntime for MockRuntime {
    type Handles = u32;

    async fn is_supported(&self) -> Result<bool, XrError> {
        self.supported.clone()
    }

    async fn request_session(&self, init: &SessionInit) -> Result<u32, XrError> {
        assert_eq!(init.required_features, &["hit-test"]);
        self.requests.set(self.requests.get() + 1);
        Hold(&self.hold).await;
        if self.fail_session.get() {
            return Err(XrError::SessionRequest("NotAllowedError".to_string()));
        }
        let h = self.next_handle.get();
        self.next_handle.set(h + 1);
        Ok(h)
    }

    fn release(&self, handles: u32) {
        self.released.borrow_mut().push(handles);
    }

    fn discard(&self, handles: u32) {
        self.discarded.borrow_mut().push(handles);
    }
}

/// A frame whose hit test reports a fixed sample.
pub struct MockFrame(pub HitTestSample);

impl HitSampler<u32> for MockFrame {
    fn sample(&self, _handles: &u32) -> HitTestSample {
        self.0
    }
}

pub fn solid(color: [f32; 3], size: f32) -> Drawable {
    Drawable::new(
        Geometry::Cube { size },
        Material::Physical(PhysicalMaterial::with_color(color)),
    )
}

/// Parsed-model stand-in: a unit cube one level below the scene root,
/// offset by `offset`.
pub fn model_fragment(offset: Vec3) -> SceneNode {
    SceneNode::new("scene").with_child(
        SceneNode::new("body")
            .with_transform(Transform::from_translation(offset))
            .with_drawable(solid([0.5, 0.5, 0.5], 1.0)),
    )
}

#[derive(Default)]
pub struct MockModels {
    pub fail: [bool; 2],
    pub fetches: Cell<usize>,
}

impl MockModels {
    pub fn failing(id: ModelId) -> Self {
        let mut m = Self::default();
        m.fail[id as usize] = true;
        m
    }
}

impl ModelSource for MockModels {
    async fn fetch(&self, id: ModelId) -> Result<SceneNode, AssetError> {
        self.fetches.set(self.fetches.get() + 1);
        if self.fail[id as usize] {
            return Err(AssetError::Status {
                path: format!("model/{:?}.glb", id),
                status: 404,
            });
        }
        Ok(model_fragment(Vec3::ZERO))
    }
}

pub fn floor_hit(x: f32, z: f32) -> HitTestSample {
    HitTestSample::hit(Pose::new(Vec3::new(x, 0.0, z), Quat::IDENTITY))
}

pub fn new_app() -> TestApp {
    App::new(Scene::new()).expect("reticle attaches to an empty scene")
}

/// App driven through support check and session start.
pub fn active_app(runtime: &MockRuntime) -> SharedTestApp {
    let app = new_app().into_shared();
    pollster::block_on(ar_sound::core::app::check_support(&app, runtime));
    pollster::block_on(ar_sound::core::app::start_session(
        &app,
        runtime,
        ar_sound::core::UserGesture::from_user_action(),
    ))
    .expect("session starts");
    app
}
