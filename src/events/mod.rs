pub mod controls;
pub mod session;

pub use controls::wire_controls;
pub use session::{wire_start_button, SessionWiring};
