//! Audio parameter store for the two spatial emitters.
//!
//! Parameters are validated and stored here first; if the emitter's voice is
//! bound they are pushed to it immediately, otherwise they wait for `bind`.

use crate::core::constants::*;
use crate::core::error::{AudioError, ParamError};
use glam::Vec3;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmitterId {
    Red,
    Blue,
}

impl EmitterId {
    pub const ALL: [EmitterId; 2] = [EmitterId::Red, EmitterId::Blue];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            EmitterId::Red => 0,
            EmitterId::Blue => 1,
        }
    }

    pub fn color(self) -> [f32; 3] {
        match self {
            EmitterId::Red => RED_COLOR,
            EmitterId::Blue => BLUE_COLOR,
        }
    }

    /// Animation phase offset of this emitter's visualizer.
    pub fn phase(self) -> f32 {
        match self {
            EmitterId::Red => 0.0,
            EmitterId::Blue => std::f32::consts::PI,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DistanceModel {
    Linear,
    Inverse,
    #[default]
    Exponential,
}

impl DistanceModel {
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceModel::Linear => "linear",
            DistanceModel::Inverse => "inverse",
            DistanceModel::Exponential => "exponential",
        }
    }
}

impl FromStr for DistanceModel {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(DistanceModel::Linear),
            "inverse" => Ok(DistanceModel::Inverse),
            "exponential" => Ok(DistanceModel::Exponential),
            other => Err(ParamError::DistanceModel(other.to_string())),
        }
    }
}

impl fmt::Display for DistanceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalCone {
    pub inner_angle_deg: f32,
    pub outer_angle_deg: f32,
    pub outer_gain: f32,
}

impl Default for DirectionalCone {
    fn default() -> Self {
        Self {
            inner_angle_deg: CONE_INNER_DEG,
            outer_angle_deg: CONE_OUTER_DEG,
            outer_gain: CONE_OUTER_GAIN,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Emitter {
    pub id: EmitterId,
    pub volume: f32,
    pub reference_distance: f32,
    pub rolloff_factor: f32,
    pub distance_model: DistanceModel,
    pub cone: DirectionalCone,
    pub looping: bool,
}

impl Emitter {
    pub fn with_defaults(id: EmitterId) -> Self {
        let (volume, reference_distance, rolloff_factor) = match id {
            EmitterId::Red => (RED_DEFAULT_VOLUME, RED_DEFAULT_REF_DISTANCE, DEFAULT_ROLLOFF),
            EmitterId::Blue => (
                BLUE_DEFAULT_VOLUME,
                BLUE_DEFAULT_REF_DISTANCE,
                DEFAULT_ROLLOFF * BLUE_ROLLOFF_SCALE,
            ),
        };
        Self {
            id,
            volume,
            reference_distance,
            rolloff_factor,
            distance_model: DistanceModel::default(),
            cone: DirectionalCone::default(),
            looping: true,
        }
    }

    fn apply_all<V: SpatialVoice>(&self, voice: &V) {
        voice.set_volume(self.volume);
        voice.set_reference_distance(self.reference_distance);
        voice.set_rolloff_factor(self.rolloff_factor);
        voice.set_distance_model(self.distance_model);
        voice.set_directional_cone(&self.cone);
        voice.set_looping(self.looping);
    }
}

/// A playable spatial voice in the underlying audio engine.
pub trait SpatialVoice {
    fn set_volume(&self, volume: f32);
    fn set_reference_distance(&self, distance: f32);
    fn set_rolloff_factor(&self, rolloff: f32);
    fn set_distance_model(&self, model: DistanceModel);
    fn set_directional_cone(&self, cone: &DirectionalCone);
    fn set_looping(&self, looping: bool);
    fn set_position(&self, position: Vec3);
    fn set_orientation(&self, forward: Vec3);
    fn play(&self) -> Result<(), AudioError>;
    fn stop(&self);
}

/// Creates voices for emitters at placement time.
pub trait AudioBackend {
    type Voice: SpatialVoice;

    fn create_voice(&self, id: EmitterId) -> Result<Self::Voice, AudioError>;
}

pub struct EmitterStore<V> {
    emitters: [Emitter; 2],
    voices: [Option<V>; 2],
}

impl<V: SpatialVoice> Default for EmitterStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: SpatialVoice> EmitterStore<V> {
    pub fn new() -> Self {
        Self {
            emitters: [
                Emitter::with_defaults(EmitterId::Red),
                Emitter::with_defaults(EmitterId::Blue),
            ],
            voices: [None, None],
        }
    }

    pub fn emitter(&self, id: EmitterId) -> &Emitter {
        &self.emitters[id.index()]
    }

    pub fn voice(&self, id: EmitterId) -> Option<&V> {
        self.voices[id.index()].as_ref()
    }

    pub fn is_bound(&self, id: EmitterId) -> bool {
        self.voices[id.index()].is_some()
    }

    pub fn set_volume(&mut self, id: EmitterId, volume: f32) -> Result<(), ParamError> {
        if !volume.is_finite() || volume < 0.0 {
            return Err(ParamError::Volume(volume));
        }
        self.emitters[id.index()].volume = volume;
        if let Some(v) = self.voice(id) {
            v.set_volume(volume);
        }
        Ok(())
    }

    pub fn set_reference_distance(&mut self, id: EmitterId, distance: f32) -> Result<(), ParamError> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(ParamError::ReferenceDistance(distance));
        }
        self.emitters[id.index()].reference_distance = distance;
        if let Some(v) = self.voice(id) {
            v.set_reference_distance(distance);
        }
        Ok(())
    }

    pub fn set_rolloff(&mut self, id: EmitterId, rolloff: f32) -> Result<(), ParamError> {
        if !rolloff.is_finite() || rolloff < 0.0 {
            return Err(ParamError::Rolloff(rolloff));
        }
        self.emitters[id.index()].rolloff_factor = rolloff;
        if let Some(v) = self.voice(id) {
            v.set_rolloff_factor(rolloff);
        }
        Ok(())
    }

    pub fn set_distance_model(&mut self, id: EmitterId, model: DistanceModel) {
        self.emitters[id.index()].distance_model = model;
        if let Some(v) = self.voice(id) {
            v.set_distance_model(model);
        }
    }

    /// Bind a voice and push the full stored record to it. Returns the
    /// previously bound voice, if any, already stopped.
    pub fn bind(&mut self, id: EmitterId, voice: V) -> Option<V> {
        self.emitters[id.index()].apply_all(&voice);
        let prev = self.voices[id.index()].replace(voice);
        if let Some(p) = &prev {
            p.stop();
        }
        prev
    }

    pub fn unbind(&mut self, id: EmitterId) -> Option<V> {
        let prev = self.voices[id.index()].take();
        if let Some(p) = &prev {
            p.stop();
        }
        prev
    }
}
