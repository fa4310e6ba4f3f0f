//! Error types for the host-testable core.
//!
//! The wasm glue converts JS exceptions into these at the trait boundary, so
//! the state machines never see a `JsValue`.

use thiserror::Error;

/// Rejected audio parameter value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    #[error("volume must be a finite value >= 0, got {0}")]
    Volume(f32),
    #[error("reference distance must be a finite value > 0, got {0}")]
    ReferenceDistance(f32),
    #[error("rolloff factor must be a finite value >= 0, got {0}")]
    Rolloff(f32),
    #[error("unknown distance model {0:?}")]
    DistanceModel(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum XrError {
    #[error("WebXR not available in your browser")]
    ApiMissing,
    #[error("AR not supported")]
    Unsupported,
    #[error("session request failed: {0}")]
    SessionRequest(String),
    #[error("session setup failed: {0}")]
    SessionSetup(String),
    #[error("a session request is already pending")]
    SessionPending,
    #[error("no session can be started in state {0:?}")]
    NotReady(crate::core::PlacementState),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssetError {
    #[error("fetch of {path} failed: {reason}")]
    Fetch { path: String, reason: String },
    #[error("fetch of {path} returned HTTP {status}")]
    Status { path: String, status: u16 },
    #[error("could not parse {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("{0} contains no drawable geometry")]
    Empty(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("unknown scene node {0}")]
    UnknownNode(u32),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    #[error("no decoded buffer for {0:?} emitter yet")]
    BufferMissing(crate::core::EmitterId),
    #[error("audio node error: {0}")]
    Node(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlacementError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// A DOM control produced a value the dispatcher cannot use.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    #[error("unknown control {0:?}")]
    UnknownControl(String),
    #[error("control {control:?} sent non-numeric value {value:?}")]
    NotANumber { control: String, value: String },
    #[error(transparent)]
    Param(#[from] ParamError),
}
