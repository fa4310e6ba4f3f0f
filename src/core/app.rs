//! Application context and the async drivers for its three suspend points.
//!
//! All mutable state lives in one [`App`]; the web layer keeps it in an
//! `Rc<RefCell<_>>` and the drivers below never hold a borrow across `.await`.

use crate::core::assets::{self, ModelId, ModelInstance, ModelSource};
use crate::core::assets::{ring_node_name, AUDIO_ANCHOR_NODE, MODEL_NODE, VISUALIZER_NODE};
use crate::core::constants::VISUALIZER_RING_COUNT;
use crate::core::control::{one_decimal, verbatim, Command};
use crate::core::emitter::{AudioBackend, EmitterId, EmitterStore, SpatialVoice};
use crate::core::error::{ControlError, PlacementError, SceneError, XrError};
use crate::core::frame::{reticle_node, FpsMeter, Visualizer};
use crate::core::placement::{
    placement_poses, ArRuntime, HitSampler, PlacementSession, PlacementState, PlacementTicket,
    SessionInit, UserGesture,
};
use crate::core::pose::{HitTestSample, Pose, Transform};
use crate::core::scene::{NodeId, SceneHost};
use crate::core::ui::{Panel, Readout, UiState, SESSION_ERROR_TEXT};
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

/// One model placed in the scene and bound to its emitter.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedObject {
    pub id: ModelId,
    pub emitter: EmitterId,
    pub container: NodeId,
    /// Target of the scale slider; `None` for the fallback cube.
    pub model: Option<NodeId>,
    pub audio_anchor: NodeId,
    pub anchor_pose: Pose,
    pub scale: f32,
    pub visualizer: Option<Visualizer>,
}

#[derive(Debug, PartialEq)]
pub enum PlacementOutcome {
    /// Tap ignored: wrong state, placement in flight, or no hit.
    Ignored,
    Placed,
    /// The session ended while the models were loading.
    Discarded,
    Failed(PlacementError),
}

pub struct App<S, V, H> {
    pub session: PlacementSession<H>,
    pub emitters: EmitterStore<V>,
    pub scene: S,
    pub ui: UiState,
    placed: Vec<PlacedObject>,
    reticle: NodeId,
    last_hit: HitTestSample,
    visualizers_visible: bool,
    fps: Option<FpsMeter>,
}

pub type SharedApp<S, V, H> = Rc<RefCell<App<S, V, H>>>;

impl<S: SceneHost, V: SpatialVoice, H> App<S, V, H> {
    pub fn new(mut scene: S) -> Result<Self, SceneError> {
        let reticle = scene.attach(None, reticle_node())?;
        Ok(Self {
            session: PlacementSession::new(),
            emitters: EmitterStore::new(),
            scene,
            ui: UiState::default(),
            placed: Vec::new(),
            reticle,
            last_hit: HitTestSample::miss(),
            visualizers_visible: false,
            fps: None,
        })
    }

    pub fn into_shared(self) -> SharedApp<S, V, H> {
        Rc::new(RefCell::new(self))
    }

    #[inline]
    pub fn state(&self) -> PlacementState {
        self.session.state()
    }

    pub fn placed(&self) -> &[PlacedObject] {
        &self.placed
    }

    pub fn reticle(&self) -> NodeId {
        self.reticle
    }

    pub fn visualizers_visible(&self) -> bool {
        self.visualizers_visible
    }

    /// Hit under the reticle as of the last frame.
    pub fn last_hit(&self) -> HitTestSample {
        self.last_hit
    }

    /// Where a tap places: the hit on the tap's own frame, else the last
    /// frame's hit.
    pub fn select_hit<F: HitSampler<H>>(&self, frame: Option<&F>) -> HitTestSample {
        let sampled = match (frame, self.session.handles()) {
            (Some(f), Some(h)) => f.sample(h),
            _ => HitTestSample::miss(),
        };
        if sampled.pose.is_some() {
            sampled
        } else {
            self.last_hit
        }
    }

    // ---------------- lifecycle ----------------

    pub fn on_support_checked(&mut self, result: Result<bool, XrError>) {
        match self.session.support_checked(result) {
            Ok(()) => log::info!("[xr] immersive-ar supported"),
            Err(XrError::NotReady(s)) => log::warn!("[xr] support result ignored in {:?}", s),
            Err(e) => {
                log::warn!("[xr] {}", e);
                self.ui.hide(Panel::ArPrompt);
                self.ui.show_error(e.to_string());
            }
        }
    }

    /// Adopt a freshly negotiated session. Hands the handles back when no
    /// session was expected.
    pub fn on_session_started(&mut self, handles: H) -> Result<(), H> {
        self.session.session_started(handles)?;
        log::info!("[xr] session started");
        self.ui.hide(Panel::ArPrompt);
        self.ui.hide(Panel::ErrorMessage);
        self.ui.show(Panel::Instructions);
        self.ui.show(Panel::SoundControls);
        Ok(())
    }

    pub fn on_session_failed(&mut self, err: &XrError) {
        self.session.start_failed();
        log::error!("[xr] failed to start AR session: {}", err);
        self.ui.show_error(SESSION_ERROR_TEXT);
    }

    /// Tear down everything tied to the session. Returns the released
    /// runtime handles so the caller can cancel them.
    pub fn on_session_ended(&mut self) -> Option<H> {
        if !matches!(
            self.state(),
            PlacementState::SessionActiveNoPlacement | PlacementState::Placed
        ) {
            return None;
        }
        let handles = self.session.session_ended();
        log::info!("[xr] session ended");
        let placed = std::mem::take(&mut self.placed);
        self.remove_placed(&placed);
        _ = self.scene.set_visible(self.reticle, false);
        self.last_hit = HitTestSample::miss();
        self.fps = None;
        self.ui.cancel_placement_error();
        self.ui.show(Panel::ArPrompt);
        for p in [
            Panel::Instructions,
            Panel::SoundControls,
            Panel::ToggleControls,
            Panel::ExternalControls,
            Panel::FpsCounter,
        ] {
            self.ui.hide(p);
        }
        handles
    }

    // ---------------- placement ----------------

    /// Attach both models at the ticket's pose, bind and start their
    /// emitters, then commit. Rolls back on any failure.
    pub fn complete_placement<A>(
        &mut self,
        ticket: &PlacementTicket,
        models: [ModelInstance; 2],
        audio: &A,
        now_ms: f64,
    ) -> PlacementOutcome
    where
        A: AudioBackend<Voice = V>,
    {
        if !self.session.is_current(ticket) {
            log::warn!("[place] session ended while loading; discarding models");
            return PlacementOutcome::Discarded;
        }
        let poses = placement_poses(&ticket.pose);
        let result = self.construct(models, poses, audio).and_then(|placed| {
            match self.play_all(&placed) {
                Ok(()) => Ok(placed),
                Err(e) => {
                    self.remove_placed(&placed);
                    Err(e)
                }
            }
        });
        match result {
            Ok(placed) => {
                self.session.commit(ticket);
                log::info!(
                    "[place] placed {} objects at ({:.2},{:.2},{:.2})",
                    placed.len(),
                    poses[0].position.x,
                    poses[0].position.y,
                    poses[0].position.z
                );
                self.placed = placed;
                self.last_hit = HitTestSample::miss();
                _ = self.scene.set_visible(self.reticle, false);
                self.ui.hide(Panel::Instructions);
                for p in [
                    Panel::ToggleControls,
                    Panel::SoundControls,
                    Panel::ExternalControls,
                    Panel::FpsCounter,
                ] {
                    self.ui.show(p);
                }
                PlacementOutcome::Placed
            }
            Err(e) => {
                log::error!("[place] error placing objects: {}", e);
                self.session.abort(ticket);
                self.ui.show_placement_error(now_ms);
                PlacementOutcome::Failed(e)
            }
        }
    }

    fn construct<A>(
        &mut self,
        models: [ModelInstance; 2],
        poses: [Pose; 2],
        audio: &A,
    ) -> Result<Vec<PlacedObject>, PlacementError>
    where
        A: AudioBackend<Voice = V>,
    {
        let mut placed = Vec::with_capacity(2);
        for (inst, pose) in models.into_iter().zip(poses) {
            match self.place_one(inst, pose, audio) {
                Ok(p) => placed.push(p),
                Err(e) => {
                    self.remove_placed(&placed);
                    return Err(e);
                }
            }
        }
        Ok(placed)
    }

    fn place_one<A>(
        &mut self,
        inst: ModelInstance,
        pose: Pose,
        audio: &A,
    ) -> Result<PlacedObject, PlacementError>
    where
        A: AudioBackend<Voice = V>,
    {
        let id = inst.id;
        let emitter = id.emitter();
        let mut root = inst.root;
        root.transform = Transform {
            scale: root.transform.scale,
            ..Transform::from_pose(&pose)
        };
        let container = self.scene.attach(None, root)?;

        let audio_anchor = self
            .scene
            .find(container, AUDIO_ANCHOR_NODE)
            .unwrap_or(container);
        let model = if inst.fallback {
            None
        } else {
            self.scene.find(container, MODEL_NODE)
        };
        let visualizer = self.scene.find(container, VISUALIZER_NODE).map(|root| Visualizer {
            emitter,
            root,
            rings: (0..VISUALIZER_RING_COUNT)
                .filter_map(|i| self.scene.find(root, &ring_node_name(i)))
                .collect(),
        });

        let bound = (|| -> Result<V, PlacementError> {
            if let Some(v) = &visualizer {
                self.scene.set_visible(v.root, self.visualizers_visible)?;
            }
            let voice = audio.create_voice(emitter)?;
            if let Some(m) = self.scene.world_matrix(audio_anchor) {
                let (_, rot, pos) = m.to_scale_rotation_translation();
                voice.set_position(pos);
                voice.set_orientation(rot * Vec3::Z);
            }
            Ok(voice)
        })();
        let voice = match bound {
            Ok(v) => v,
            Err(e) => {
                _ = self.scene.detach(container);
                return Err(e);
            }
        };
        self.emitters.bind(emitter, voice);

        let scale = model
            .and_then(|m| self.scene.transform(m))
            .map(|t| t.scale.x)
            .unwrap_or(1.0);
        Ok(PlacedObject {
            id,
            emitter,
            container,
            model,
            audio_anchor,
            anchor_pose: pose,
            scale,
            visualizer,
        })
    }

    fn play_all(&self, placed: &[PlacedObject]) -> Result<(), PlacementError> {
        for p in placed {
            if let Some(v) = self.emitters.voice(p.emitter) {
                v.play()?;
            }
        }
        Ok(())
    }

    fn remove_placed(&mut self, placed: &[PlacedObject]) {
        for p in placed {
            _ = self.scene.detach(p.container);
            self.emitters.unbind(p.emitter);
        }
    }

    // ---------------- controls ----------------

    pub fn dispatch(&mut self, cmd: Command) -> Result<(), ControlError> {
        match cmd {
            Command::SetVolume { id, volume } => {
                self.emitters.set_volume(id, volume)?;
                let r = match id {
                    EmitterId::Red => Readout::RedVolume,
                    EmitterId::Blue => Readout::BlueVolume,
                };
                self.ui.set_readout(r, one_decimal(volume));
            }
            Command::SetExternalBlueVolume(v) => {
                self.emitters.set_volume(
                    EmitterId::Blue,
                    v * crate::core::constants::EXTERNAL_BLUE_VOLUME_GAIN,
                )?;
            }
            Command::SetReferenceDistance(d) => {
                for id in EmitterId::ALL {
                    self.emitters.set_reference_distance(id, d)?;
                }
                self.ui.set_readout(Readout::RefDistance, verbatim(d));
            }
            Command::SetRolloff(r) => {
                for id in EmitterId::ALL {
                    self.emitters.set_rolloff(id, r)?;
                }
                self.ui.set_readout(Readout::Rolloff, verbatim(r));
            }
            Command::SetDistanceModel(m) => {
                for id in EmitterId::ALL {
                    self.emitters.set_distance_model(id, m);
                }
            }
            Command::SetModelScale { id, scale } => {
                let r = match id {
                    ModelId::A => Readout::ModelScale,
                    ModelId::B => Readout::Model2Scale,
                };
                self.ui.set_readout(r, one_decimal(scale));
                self.set_model_scale(id, scale);
            }
            Command::SetVisualizers(on) => self.set_visualizers(on),
            Command::ToggleVisualizers => self.set_visualizers(!self.visualizers_visible),
            Command::ToggleSettingsPanel => self.ui.toggle_settings(),
        }
        Ok(())
    }

    fn set_model_scale(&mut self, id: ModelId, scale: f32) {
        let Some(p) = self.placed.iter_mut().find(|p| p.id == id) else {
            return;
        };
        let Some(model) = p.model else {
            return;
        };
        if let Some(t) = self.scene.transform(model) {
            if self
                .scene
                .set_transform(model, t.with_uniform_scale(scale))
                .is_ok()
            {
                p.scale = scale;
            }
        }
    }

    fn set_visualizers(&mut self, on: bool) {
        self.visualizers_visible = on;
        self.ui.set_visualizers_active(on);
        for v in self.placed.iter().filter_map(|p| p.visualizer.as_ref()) {
            _ = self.scene.set_visible(v.root, on);
        }
    }

    // ---------------- frame ----------------

    /// Run one frame's bookkeeping. `frame` is `None` when the runtime
    /// delivered no frame this tick; nothing is updated then. Returns
    /// whether the caller should render.
    pub fn on_frame<F: HitSampler<H>>(&mut self, now_ms: f64, frame: Option<&F>) -> bool {
        let Some(frame) = frame else {
            return false;
        };
        if !matches!(
            self.state(),
            PlacementState::SessionActiveNoPlacement | PlacementState::Placed
        ) {
            return false;
        }

        let meter = self.fps.get_or_insert_with(|| FpsMeter::new(now_ms));
        if let Some(r) = meter.tick(now_ms) {
            self.ui.set_fps(format!("FPS: {}", r.fps), r.tier.css_class());
        }

        if self.visualizers_visible {
            let t_sec = (now_ms * 0.001) as f32;
            for v in self.placed.iter().filter_map(|p| p.visualizer.as_ref()) {
                if let Err(e) = v.animate(&mut self.scene, t_sec) {
                    log::warn!("[frame] visualizer: {}", e);
                }
            }
        }

        if !self.session.is_placed() {
            if let Some(h) = self.session.handles() {
                let hit = frame.sample(h);
                self.update_reticle(&hit);
            }
        }

        self.ui.expire(now_ms);
        true
    }

    fn update_reticle(&mut self, hit: &HitTestSample) {
        self.last_hit = *hit;
        match &hit.pose {
            Some(pose) => {
                _ = self.scene.set_transform(self.reticle, Transform::from_pose(pose));
                _ = self.scene.set_visible(self.reticle, true);
            }
            None => {
                _ = self.scene.set_visible(self.reticle, false);
            }
        }
    }
}

// ---------------- async drivers ----------------

/// Suspend point (a): capability query.
pub async fn check_support<S, V, H, R>(app: &SharedApp<S, V, H>, runtime: &R)
where
    S: SceneHost,
    V: SpatialVoice,
    R: ArRuntime<Handles = H>,
{
    let result = runtime.is_supported().await;
    app.borrow_mut().on_support_checked(result);
}

/// Suspend point (b): session negotiation. Rejected without a state change
/// unless the app is awaiting a session and no other request is pending.
pub async fn start_session<S, V, H, R>(
    app: &SharedApp<S, V, H>,
    runtime: &R,
    gesture: UserGesture,
) -> Result<(), XrError>
where
    S: SceneHost,
    V: SpatialVoice,
    R: ArRuntime<Handles = H>,
{
    app.borrow_mut().session.begin_start(&gesture)?;
    match runtime.request_session(&SessionInit::default()).await {
        Ok(handles) => {
            let adopted = app.borrow_mut().on_session_started(handles);
            if let Err(handles) = adopted {
                let state = app.borrow().state();
                log::warn!("[xr] session arrived in {:?}; ending it", state);
                runtime.discard(handles);
                return Err(XrError::NotReady(state));
            }
            Ok(())
        }
        Err(e) => {
            app.borrow_mut().on_session_failed(&e);
            Err(e)
        }
    }
}

/// Session end from the runtime: reset the app and release the handles.
pub fn end_session<S, V, H, R>(app: &SharedApp<S, V, H>, runtime: &R)
where
    S: SceneHost,
    V: SpatialVoice,
    R: ArRuntime<Handles = H>,
{
    let released = app.borrow_mut().on_session_ended();
    if let Some(handles) = released {
        runtime.release(handles);
    }
}

/// Suspend point (c): load both models for a tap, then place them.
pub async fn place_models<S, V, H, M, A>(
    app: &SharedApp<S, V, H>,
    models: &M,
    audio: &A,
    hit: HitTestSample,
    clock: impl Fn() -> f64,
) -> PlacementOutcome
where
    S: SceneHost,
    V: SpatialVoice,
    M: ModelSource,
    A: AudioBackend<Voice = V>,
{
    let ticket = app.borrow_mut().session.begin_placement(&hit);
    let Some(ticket) = ticket else {
        return PlacementOutcome::Ignored;
    };
    let a = assets::load(models, ModelId::A).await;
    let b = assets::load(models, ModelId::B).await;
    app.borrow_mut()
        .complete_placement(&ticket, [a, b], audio, clock())
}
