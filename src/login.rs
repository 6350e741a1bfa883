//! Login Form Validation
//!
//! Client-side checks run before credentials are submitted, the form
//! encoding used for asynchronous submission, and interpretation of the
//! server's answer.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::error::StationError;

/// Route the browser is sent to after a successful login
pub const DEFAULT_LANDING_ROUTE: &str = "/dashboard/";

/// Default login form action
pub const DEFAULT_LOGIN_PATH: &str = "/login/";

/// Shown when the login request cannot reach the server
pub const CONNECTION_ERROR: &str = "Error de conexión. Intente nuevamente.";

/// Shown when the server rejects without a usable error body
pub const INVALID_CREDENTIALS: &str = "Usuario o contraseña incorrectos";

/// Input problems detected before submission
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Por favor complete todos los campos")]
    MissingFields,

    #[error("El nombre de usuario no puede contener espacios")]
    UsernameWhitespace,

    #[error("La contraseña no puede contener espacios")]
    PasswordWhitespace,
}

/// How the login form submits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMode {
    /// Block invalid submissions, let valid ones go through as a normal form POST
    Blocking,
    /// Always intercept and submit in the background
    #[default]
    Async,
}

/// Validation rules applied to the login form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginRules {
    /// Reject usernames or passwords with whitespace left after trimming
    pub reject_embedded_whitespace: bool,
}

impl Default for LoginRules {
    fn default() -> Self {
        Self {
            reject_embedded_whitespace: true,
        }
    }
}

/// Validated credentials: trimmed username, password exactly as typed
///
/// Only obtainable through [`Credentials::validate`]. The password is
/// redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Check a username/password pair.
    ///
    /// Both checks look at the trimmed values, but only the username is
    /// stored trimmed; the password is submitted unchanged.
    pub fn validate(
        username: &str,
        password: &str,
        rules: &LoginRules,
    ) -> Result<Self, ValidationError> {
        let username = username.trim();
        let trimmed_password = password.trim();

        if username.is_empty() || trimmed_password.is_empty() {
            return Err(ValidationError::MissingFields);
        }

        if rules.reject_embedded_whitespace {
            if username.chars().any(char::is_whitespace) {
                return Err(ValidationError::UsernameWhitespace);
            }
            if trimmed_password.chars().any(char::is_whitespace) {
                return Err(ValidationError::PasswordWhitespace);
            }
        }

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// URL-encoded form body, optionally carrying the anti-forgery token
    pub fn to_form_body(&self, csrf_token: Option<&str>) -> String {
        let mut body = format!(
            "username={}&password={}",
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password)
        );
        if let Some(token) = csrf_token {
            body.push_str("&csrfmiddlewaretoken=");
            body.push_str(&urlencoding::encode(token));
        }
        body
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of an asynchronous login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Accepted; navigate to `redirect_to`
    LoggedIn { redirect_to: String },
    /// Server rejected the credentials
    Rejected { message: String },
    /// The request never completed
    ConnectionFailed { message: String },
}

impl LoginOutcome {
    pub fn logged_in(landing_route: &str) -> Self {
        LoginOutcome::LoggedIn {
            redirect_to: landing_route.to_string(),
        }
    }

    /// Build a rejection from the error body returned by the server
    pub fn rejected_from_body(body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .map(|value| collect_error_messages(&value))
            .filter(|msg| !msg.is_empty())
            .unwrap_or_else(|| INVALID_CREDENTIALS.to_string());

        LoginOutcome::Rejected { message }
    }

    /// Map a failed request to an outcome; never surfaces the raw error
    pub fn from_error(err: &StationError) -> Self {
        match err {
            StationError::Server { message, .. } => LoginOutcome::Rejected {
                message: message.clone(),
            },
            StationError::Validation(e) => LoginOutcome::Rejected {
                message: e.to_string(),
            },
            _ => LoginOutcome::ConnectionFailed {
                message: CONNECTION_ERROR.to_string(),
            },
        }
    }

    /// Message to show in the inline error element, if any
    pub fn error_message(&self) -> Option<&str> {
        match self {
            LoginOutcome::LoggedIn { .. } => None,
            LoginOutcome::Rejected { message } | LoginOutcome::ConnectionFailed { message } => {
                Some(message)
            }
        }
    }
}

/// Flatten a server error payload into one display string
///
/// Accepts `{"field": ["msg", ...]}`, `{"field": "msg"}`, Django's
/// `{"field": [{"message": "msg", "code": ...}]}` and plain strings.
/// Messages are joined with a single space.
pub fn collect_error_messages(value: &serde_json::Value) -> String {
    let mut messages = Vec::new();
    gather_messages(value, &mut messages);
    messages.join(" ")
}

fn gather_messages(value: &serde_json::Value, out: &mut Vec<String>) {
    use serde_json::Value;

    match value {
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() {
                out.push(s.to_string());
            }
        }
        Value::Array(items) => {
            for item in items {
                gather_messages(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(message) = map.get("message") {
                gather_messages(message, out);
            } else {
                for field_errors in map.values() {
                    gather_messages(field_errors, out);
                }
            }
        }
        _ => {}
    }
}
