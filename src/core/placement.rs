//! AR session lifecycle and the one-shot placement state machine.
//!
//! The machine is synchronous; the async drivers in `core::app` call into it
//! before and after each suspend point. `H` is whatever the runtime needs to
//! keep alive for hit testing (session, reference spaces, hit-test source).

use crate::core::constants::{FLOOR_HEIGHT, SECOND_MODEL_OFFSET};
use crate::core::error::XrError;
use crate::core::pose::{HitTestSample, Pose};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementState {
    AwaitingSupportCheck,
    Unsupported,
    AwaitingSession,
    SessionActiveNoPlacement,
    Placed,
}

/// Features requested for the AR session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionInit {
    pub mode: &'static str,
    pub required_features: &'static [&'static str],
    pub optional_features: &'static [&'static str],
    /// Element id used as the DOM overlay root.
    pub dom_overlay_root: &'static str,
}

impl Default for SessionInit {
    fn default() -> Self {
        Self {
            mode: "immersive-ar",
            required_features: &["hit-test"],
            optional_features: &["dom-overlay", "local-floor"],
            dom_overlay_root: "container",
        }
    }
}

/// Proof that a call originates from a direct user action. Browsers refuse
/// to start an immersive session otherwise.
#[derive(Debug)]
pub struct UserGesture {
    _private: (),
}

impl UserGesture {
    /// Only call from inside a click/tap handler.
    pub fn from_user_action() -> Self {
        Self { _private: () }
    }
}

/// Session negotiation against the platform AR runtime.
#[allow(async_fn_in_trait)]
pub trait ArRuntime {
    type Handles;

    /// `Err(XrError::ApiMissing)` when the capability API is absent.
    async fn is_supported(&self) -> Result<bool, XrError>;

    async fn request_session(&self, init: &SessionInit) -> Result<Self::Handles, XrError>;

    /// Cancel the hit-test source and drop the session handles. The session
    /// itself has already ended.
    fn release(&self, handles: Self::Handles);

    /// End a session that was negotiated but never adopted.
    fn discard(&self, handles: Self::Handles);
}

/// Per-frame hit-test query against the held handles.
pub trait HitSampler<H> {
    fn sample(&self, handles: &H) -> HitTestSample;
}

/// Issued when a placement starts; redeemed once the models are built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementTicket {
    epoch: u64,
    pub pose: Pose,
}

pub struct PlacementSession<H> {
    state: PlacementState,
    handles: Option<H>,
    epoch: u64,
    in_flight: bool,
    starting: bool,
}

impl<H> Default for PlacementSession<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> PlacementSession<H> {
    pub fn new() -> Self {
        Self {
            state: PlacementState::AwaitingSupportCheck,
            handles: None,
            epoch: 0,
            in_flight: false,
            starting: false,
        }
    }

    #[inline]
    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn handles(&self) -> Option<&H> {
        self.handles.as_ref()
    }

    pub fn is_placing(&self) -> bool {
        self.in_flight
    }

    /// A session request is out and has not resolved yet.
    pub fn is_starting(&self) -> bool {
        self.starting
    }

    pub fn is_placed(&self) -> bool {
        self.state == PlacementState::Placed
    }

    /// Record the capability query result. Only meaningful once.
    pub fn support_checked(&mut self, result: Result<bool, XrError>) -> Result<(), XrError> {
        if self.state != PlacementState::AwaitingSupportCheck {
            return Err(XrError::NotReady(self.state));
        }
        match result {
            Ok(true) => {
                self.state = PlacementState::AwaitingSession;
                Ok(())
            }
            Ok(false) => {
                self.state = PlacementState::Unsupported;
                Err(XrError::Unsupported)
            }
            Err(e) => {
                self.state = PlacementState::Unsupported;
                Err(e)
            }
        }
    }

    /// Whether a session may be requested right now.
    pub fn can_start(&self, _gesture: &UserGesture) -> Result<(), XrError> {
        match self.state {
            PlacementState::AwaitingSession if self.starting => Err(XrError::SessionPending),
            PlacementState::AwaitingSession => Ok(()),
            s => Err(XrError::NotReady(s)),
        }
    }

    /// Claim the single session request slot. Released by `session_started`
    /// or `start_failed`.
    pub fn begin_start(&mut self, gesture: &UserGesture) -> Result<(), XrError> {
        self.can_start(gesture)?;
        self.starting = true;
        Ok(())
    }

    /// The session request was rejected; a new tap may retry.
    pub fn start_failed(&mut self) {
        self.starting = false;
    }

    /// Take ownership of the runtime handles. Handed back if no session was
    /// expected, so the caller can release them.
    pub fn session_started(&mut self, handles: H) -> Result<(), H> {
        if self.state != PlacementState::AwaitingSession {
            return Err(handles);
        }
        self.handles = Some(handles);
        self.starting = false;
        self.state = PlacementState::SessionActiveNoPlacement;
        self.epoch += 1;
        self.in_flight = false;
        Ok(())
    }

    /// Reset to `AwaitingSession`, returning the released handles.
    pub fn session_ended(&mut self) -> Option<H> {
        match self.state {
            PlacementState::SessionActiveNoPlacement | PlacementState::Placed => {
                self.state = PlacementState::AwaitingSession;
                self.epoch += 1;
                self.in_flight = false;
                self.starting = false;
                self.handles.take()
            }
            _ => None,
        }
    }

    /// Start a placement from a tap. `None` when the tap must be ignored.
    pub fn begin_placement(&mut self, hit: &HitTestSample) -> Option<PlacementTicket> {
        if self.state != PlacementState::SessionActiveNoPlacement || self.in_flight {
            return None;
        }
        let pose = hit.pose?;
        self.in_flight = true;
        Some(PlacementTicket {
            epoch: self.epoch,
            pose,
        })
    }

    /// False once the session that issued `ticket` has ended.
    pub fn is_current(&self, ticket: &PlacementTicket) -> bool {
        self.in_flight
            && ticket.epoch == self.epoch
            && self.state == PlacementState::SessionActiveNoPlacement
    }

    /// Transition to `Placed`. Returns false for a stale ticket.
    pub fn commit(&mut self, ticket: &PlacementTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight = false;
        self.state = PlacementState::Placed;
        true
    }

    /// Give up on a placement; the user may tap again.
    pub fn abort(&mut self, ticket: &PlacementTicket) {
        if ticket.epoch == self.epoch {
            self.in_flight = false;
        }
    }
}

/// Poses of model A and model B for a confirmed hit.
///
/// B sits `SECOND_MODEL_OFFSET` behind A along the hit's ground-projected
/// forward axis; both rest on the floor.
pub fn placement_poses(hit: &Pose) -> [Pose; 2] {
    let mut a = *hit;
    a.position.y = FLOOR_HEIGHT;
    let mut b = *hit;
    b.position -= hit.ground_forward() * SECOND_MODEL_OFFSET;
    b.position.y = FLOOR_HEIGHT;
    [a, b]
}
