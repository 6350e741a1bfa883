//! Control and state endpoint payloads

use serde::{Deserialize, Serialize};
use std::fmt;

/// Endpoint receiving start/stop actions
pub const DEFAULT_CONTROL_PATH: &str = "/control-medicion/";

/// Endpoint reporting whether a session is running
pub const DEFAULT_STATE_PATH: &str = "/estado-medicion/";

/// User action on the measurement session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlAction {
    #[serde(rename = "iniciar")]
    Start,
    #[serde(rename = "detener")]
    Stop,
}

impl ControlAction {
    /// Value sent in the `action` form field
    pub fn as_param(&self) -> &'static str {
        match self {
            ControlAction::Start => "iniciar",
            ControlAction::Stop => "detener",
        }
    }

    /// Form-encoded request body
    pub fn form_body(&self) -> String {
        format!("action={}", self.as_param())
    }

    /// Whether the session runs after this action succeeds
    pub fn target_active(&self) -> bool {
        matches!(self, ControlAction::Start)
    }

    /// Success message used when the server sends no `status`
    pub fn default_status(&self) -> &'static str {
        match self {
            ControlAction::Start => "Medición iniciada",
            ControlAction::Stop => "Medición detenida",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Body returned by the control endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activa: Option<bool>,
}

impl ControlResponse {
    /// Non-empty warning text, if the server sent one
    pub fn warning_text(&self) -> Option<&str> {
        self.warning.as_deref().filter(|w| !w.trim().is_empty())
    }
}

/// Body returned by the state endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResponse {
    pub activa: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_params() {
        assert_eq!(ControlAction::Start.form_body(), "action=iniciar");
        assert_eq!(ControlAction::Stop.form_body(), "action=detener");
        assert!(ControlAction::Start.target_active());
        assert!(!ControlAction::Stop.target_active());
    }

    #[test]
    fn test_control_response_optional_fields() {
        let resp: ControlResponse = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert_eq!(resp.status.as_deref(), Some("ok"));
        assert_eq!(resp.warning_text(), None);
        assert_eq!(resp.activa, None);

        let resp: ControlResponse =
            serde_json::from_str(r#"{"warning": "  ", "activa": true}"#).unwrap();
        assert_eq!(resp.warning_text(), None);
        assert_eq!(resp.activa, Some(true));
    }

    #[test]
    fn test_state_response() {
        let resp: StateResponse = serde_json::from_str(r#"{"activa": false}"#).unwrap();
        assert!(!resp.activa);
        assert!(serde_json::from_str::<StateResponse>("{}").is_err());
    }
}
