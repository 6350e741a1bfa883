//! Session state machine
//!
//! Holds the mirrored server state plus one busy flag per action. Requests
//! are tracked with [`Ticket`]s; cancelling bumps a generation counter so
//! responses to older tickets are dropped.

use serde::{Deserialize, Serialize};

use super::protocol::{ControlAction, ControlResponse};
use super::state::{SessionState, SessionView};
use crate::error::{StationError, StationResult};

/// What to do with the session state when the server answers with a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningPolicy {
    /// Leave the displayed state as it was before the action
    #[default]
    KeepState,
    /// Apply the action's target state anyway
    Transition,
}

impl std::str::FromStr for WarningPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" | "keep_state" => Ok(WarningPolicy::KeepState),
            "transition" => Ok(WarningPolicy::Transition),
            other => Err(format!("unknown warning policy: {}", other)),
        }
    }
}

/// Severity of a notification, named after Bootstrap alert variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Warning,
    Danger,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Danger => "danger",
            NotificationKind::Info => "info",
        }
    }

    pub fn alert_class(&self) -> String {
        format!("alert alert-{} mt-3", self.as_str())
    }
}

/// Message for the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Danger, message)
    }
}

/// Handle for one pending control request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    action: ControlAction,
    generation: u64,
}

impl Ticket {
    pub fn action(&self) -> ControlAction {
        self.action
    }
}

/// Mirror of the server's session state
#[derive(Debug, Clone, Default)]
pub struct SessionMachine {
    state: SessionState,
    start_busy: bool,
    stop_busy: bool,
    generation: u64,
    /// Bumped whenever a control response sets the state
    epoch: u64,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn view(&self) -> SessionView {
        SessionView::new(self.state, self.start_busy, self.stop_busy)
    }

    pub fn is_busy(&self, action: ControlAction) -> bool {
        match action {
            ControlAction::Start => self.start_busy,
            ControlAction::Stop => self.stop_busy,
        }
    }

    fn set_busy(&mut self, action: ControlAction, busy: bool) {
        match action {
            ControlAction::Start => self.start_busy = busy,
            ControlAction::Stop => self.stop_busy = busy,
        }
    }

    /// Mark `action` as pending. Fails if the same action is already pending.
    pub fn begin(&mut self, action: ControlAction) -> StationResult<Ticket> {
        if self.is_busy(action) {
            return Err(StationError::Busy(action));
        }
        self.set_busy(action, true);
        Ok(Ticket {
            action,
            generation: self.generation,
        })
    }

    /// Whether a ticket still belongs to the current generation
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply the outcome of a control request.
    ///
    /// Returns `None` when the ticket was cancelled; the state is then left
    /// alone and nothing should be shown.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: &StationResult<ControlResponse>,
        policy: WarningPolicy,
    ) -> Option<Notification> {
        if !self.is_current(&ticket) {
            return None;
        }

        let action = ticket.action;
        self.set_busy(action, false);
        if outcome.is_ok() {
            self.epoch = self.epoch.wrapping_add(1);
        }

        let notification = match outcome {
            Ok(response) => match response.warning_text() {
                Some(warning) => {
                    if policy == WarningPolicy::Transition {
                        self.state = SessionState::from_active(
                            response.activa.unwrap_or(action.target_active()),
                        );
                    }
                    Notification::warning(format!("Advertencia: {}", warning))
                }
                None => {
                    self.state = SessionState::from_active(
                        response.activa.unwrap_or(action.target_active()),
                    );
                    let status = response
                        .status
                        .as_deref()
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or(action.default_status());
                    Notification::success(status)
                }
            },
            Err(err) => Notification::danger(err.user_message()),
        };

        Some(notification)
    }

    /// Overwrite the mirrored state with the server's answer
    pub fn apply_server_state(&mut self, active: bool) {
        self.state = SessionState::from_active(active);
    }

    /// Invalidate every pending request and clear the busy flags
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.start_busy = false;
        self.stop_busy = false;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Changes each time a control response is applied. A state query
    /// issued under an older epoch is older than the displayed state.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SERVER_COMMUNICATION_ERROR;

    fn ok(status: &str) -> StationResult<ControlResponse> {
        Ok(ControlResponse {
            status: Some(status.to_string()),
            ..Default::default()
        })
    }

    fn warning(text: &str) -> StationResult<ControlResponse> {
        Ok(ControlResponse {
            warning: Some(text.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_start_success() {
        let mut machine = SessionMachine::new();
        let ticket = machine.begin(ControlAction::Start).unwrap();
        assert!(machine.view().start.busy);

        let note = machine
            .complete(ticket, &ok("Medición iniciada"), WarningPolicy::KeepState)
            .unwrap();
        assert_eq!(note, Notification::success("Medición iniciada"));

        let view = machine.view();
        assert_eq!(view.state, SessionState::Active);
        assert!(!view.start.available);
        assert!(view.stop.available);
        assert!(!view.start.busy);
    }

    #[test]
    fn test_stop_success() {
        let mut machine = SessionMachine::new();
        machine.apply_server_state(true);

        let ticket = machine.begin(ControlAction::Stop).unwrap();
        let note = machine
            .complete(ticket, &ok("Medición detenida"), WarningPolicy::KeepState)
            .unwrap();

        assert_eq!(note.kind, NotificationKind::Success);
        assert_eq!(note.message, "Medición detenida");
        assert_eq!(machine.state(), SessionState::Inactive);
    }

    #[test]
    fn test_warning_keeps_state() {
        let mut machine = SessionMachine::new();
        let ticket = machine.begin(ControlAction::Start).unwrap();
        let note = machine
            .complete(ticket, &warning("Sensor sin calibrar"), WarningPolicy::KeepState)
            .unwrap();

        assert_eq!(note, Notification::warning("Advertencia: Sensor sin calibrar"));
        assert_eq!(machine.state(), SessionState::Inactive);
        assert!(!machine.is_busy(ControlAction::Start));
    }

    #[test]
    fn test_warning_transition_policy() {
        let mut machine = SessionMachine::new();
        let ticket = machine.begin(ControlAction::Start).unwrap();
        machine.complete(ticket, &warning("Ya estaba activa"), WarningPolicy::Transition);
        assert_eq!(machine.state(), SessionState::Active);
    }

    #[test]
    fn test_activa_field_wins_over_target() {
        let mut machine = SessionMachine::new();
        let ticket = machine.begin(ControlAction::Start).unwrap();
        let response = Ok(ControlResponse {
            status: Some("Sin dispositivo".to_string()),
            activa: Some(false),
            ..Default::default()
        });
        machine.complete(ticket, &response, WarningPolicy::KeepState);
        assert_eq!(machine.state(), SessionState::Inactive);
    }

    #[test]
    fn test_missing_status_uses_default() {
        let mut machine = SessionMachine::new();
        let ticket = machine.begin(ControlAction::Start).unwrap();
        let note = machine
            .complete(ticket, &Ok(ControlResponse::default()), WarningPolicy::KeepState)
            .unwrap();
        assert_eq!(note.message, "Medición iniciada");
    }

    #[test]
    fn test_transport_failure_releases_control() {
        let mut machine = SessionMachine::new();
        machine.apply_server_state(true);
        let ticket = machine.begin(ControlAction::Stop).unwrap();

        let note = machine
            .complete(
                ticket,
                &Err(StationError::Transport("connection reset".to_string())),
                WarningPolicy::KeepState,
            )
            .unwrap();

        assert_eq!(note, Notification::danger(SERVER_COMMUNICATION_ERROR));
        let view = machine.view();
        assert_eq!(view.state, SessionState::Active);
        assert!(view.start.clickable());
        assert!(view.stop.clickable());
    }

    #[test]
    fn test_busy_guard_per_action() {
        let mut machine = SessionMachine::new();
        let _ticket = machine.begin(ControlAction::Start).unwrap();

        assert_eq!(
            machine.begin(ControlAction::Start),
            Err(StationError::Busy(ControlAction::Start))
        );
        assert!(machine.begin(ControlAction::Stop).is_ok());
    }

    #[test]
    fn test_cancel_drops_late_response() {
        let mut machine = SessionMachine::new();
        let ticket = machine.begin(ControlAction::Start).unwrap();
        machine.cancel();

        assert!(!machine.is_current(&ticket));
        assert!(!machine.is_busy(ControlAction::Start));
        assert_eq!(
            machine.complete(ticket, &ok("Medición iniciada"), WarningPolicy::KeepState),
            None
        );
        assert_eq!(machine.state(), SessionState::Inactive);

        // A fresh request after cancelling goes through normally
        let ticket = machine.begin(ControlAction::Start).unwrap();
        assert!(machine
            .complete(ticket, &ok("Medición iniciada"), WarningPolicy::KeepState)
            .is_some());
        assert_eq!(machine.state(), SessionState::Active);
    }

    #[test]
    fn test_epoch_moves_on_applied_responses() {
        let mut machine = SessionMachine::new();
        let start = machine.epoch();

        let ticket = machine.begin(ControlAction::Start).unwrap();
        machine.complete(
            ticket,
            &Err(StationError::Transport("refused".to_string())),
            WarningPolicy::KeepState,
        );
        assert_eq!(machine.epoch(), start);

        let ticket = machine.begin(ControlAction::Start).unwrap();
        machine.complete(ticket, &ok("Medición iniciada"), WarningPolicy::KeepState);
        assert_ne!(machine.epoch(), start);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("keep".parse::<WarningPolicy>(), Ok(WarningPolicy::KeepState));
        assert_eq!("Transition".parse::<WarningPolicy>(), Ok(WarningPolicy::Transition));
        assert!("maybe".parse::<WarningPolicy>().is_err());
    }
}
