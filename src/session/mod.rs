//! Measurement Session Control
//!
//! Start/stop control of the station's measurement session, with the
//! displayed state always taken from the server.
//!
//! ## Architecture
//!
//! - **protocol**: request/response shapes of the control and state endpoints
//! - **state**: session state and what the UI shows for it
//! - **machine**: synchronous state machine with per-action busy flags
//! - **controller**: async driver owning the API handle and the UI observer
//!
//! ## Flow
//!
//! 1. `refresh()` on load mirrors the server state
//! 2. `start()`/`stop()` mark their control busy and post the action
//! 3. The response (or failure) clears the busy flag and updates the view

mod controller;
mod machine;
mod protocol;
mod state;

pub use controller::{MeasurementApi, SessionController, SessionObserver};
pub use machine::{Notification, NotificationKind, SessionMachine, Ticket, WarningPolicy};
pub use protocol::{
    ControlAction, ControlResponse, StateResponse, DEFAULT_CONTROL_PATH, DEFAULT_STATE_PATH,
};
pub use state::{ControlView, SessionState, SessionView};
