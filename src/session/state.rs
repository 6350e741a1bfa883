//! Session state and its on-screen representation

use serde::{Deserialize, Serialize};

/// Whether the measurement device is recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    #[default]
    Inactive,
}

impl SessionState {
    pub fn from_active(active: bool) -> Self {
        if active {
            SessionState::Active
        } else {
            SessionState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    /// Text of the `#estado .badge`
    pub fn badge_label(&self) -> &'static str {
        match self {
            SessionState::Active => "Activo",
            SessionState::Inactive => "Inactivo",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            SessionState::Active => "bg-success",
            SessionState::Inactive => "bg-secondary",
        }
    }

    /// Text of the `#estadoMedicion` alert
    pub fn alert_text(&self) -> &'static str {
        match self {
            SessionState::Active => "Estado: Activa",
            SessionState::Inactive => "Estado: Inactiva",
        }
    }

    pub fn alert_class(&self) -> &'static str {
        match self {
            SessionState::Active => "alert alert-success mb-4",
            SessionState::Inactive => "alert alert-secondary mb-4",
        }
    }
}

/// One start/stop control
///
/// `available` follows the session state (styled as enabled or disabled);
/// `busy` is the optimistic disable while the control's own request is
/// pending. A control accepts clicks whenever it is not busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlView {
    pub available: bool,
    pub busy: bool,
}

impl ControlView {
    pub fn clickable(&self) -> bool {
        !self.busy
    }

    /// CSS classes for a Bootstrap button of the given colour
    pub fn button_class(&self, color: &str) -> String {
        if self.available {
            format!("btn btn-{}", color)
        } else {
            format!("btn btn-{} disabled", color)
        }
    }
}

/// Everything the UI needs to draw the session panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionView {
    pub state: SessionState,
    pub start: ControlView,
    pub stop: ControlView,
}

impl SessionView {
    pub fn new(state: SessionState, start_busy: bool, stop_busy: bool) -> Self {
        let active = state.is_active();
        Self {
            state,
            start: ControlView {
                available: !active,
                busy: start_busy,
            },
            stop: ControlView {
                available: active,
                busy: stop_busy,
            },
        }
    }
}

impl Default for SessionView {
    fn default() -> Self {
        Self::new(SessionState::default(), false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_view() {
        let view = SessionView::new(SessionState::Active, false, false);
        assert_eq!(view.state.badge_label(), "Activo");
        assert_eq!(view.state.badge_class(), "bg-success");
        assert!(!view.start.available);
        assert!(view.stop.available);
        assert_eq!(view.start.button_class("success"), "btn btn-success disabled");
        assert_eq!(view.stop.button_class("danger"), "btn btn-danger");
    }

    #[test]
    fn test_availability_is_exclusive() {
        for state in [SessionState::Active, SessionState::Inactive] {
            for (start_busy, stop_busy) in [(false, false), (true, false), (false, true), (true, true)] {
                let view = SessionView::new(state, start_busy, stop_busy);
                assert_ne!(view.start.available, view.stop.available);
                assert_ne!(view.state.badge_label(), "");
            }
        }
    }

    #[test]
    fn test_busy_control_not_clickable() {
        let view = SessionView::new(SessionState::Inactive, true, false);
        assert!(!view.start.clickable());
        assert!(view.stop.clickable());
    }
}
