pub mod app;
pub mod assets;
pub mod constants;
pub mod control;
pub mod emitter;
pub mod error;
pub mod frame;
pub mod glb;
pub mod mesh;
pub mod placement;
pub mod pose;
pub mod scene;
pub mod ui;

pub use app::{App, PlacedObject, PlacementOutcome, SharedApp};
pub use assets::{ModelId, ModelInstance, ModelSource};
pub use control::Command;
pub use emitter::{AudioBackend, DistanceModel, EmitterId, EmitterStore, SpatialVoice};
pub use error::*;
pub use frame::{FpsMeter, FpsTier};
pub use placement::{ArRuntime, HitSampler, PlacementSession, PlacementState, UserGesture};
pub use pose::{Aabb, HitTestSample, Pose, Transform};
pub use scene::{NodeId, Scene, SceneHost, SceneNode};
pub use ui::{Panel, Readout, UiState};
