//! HTTP API Client
//!
//! Functions for communicating with the station server from the browser.

use alcoholimetro::chart::Sample;
use alcoholimetro::csrf::{token_from_cookies, CSRF_HEADER};
use alcoholimetro::login::collect_error_messages;
use alcoholimetro::session::{
    ControlAction, ControlResponse, MeasurementApi, StateResponse, DEFAULT_CONTROL_PATH,
    DEFAULT_STATE_PATH,
};
use alcoholimetro::{Credentials, LoginMode, LoginOutcome, StationError, StationResult, WarningPolicy};
use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::AbortController;

/// Default API base URL: the page's own origin
pub const DEFAULT_API_BASE: &str = "";

const API_URL_KEY: &str = "alcoholimetro_api_url";
const WARNING_POLICY_KEY: &str = "alcoholimetro_warning_policy";
const LOGIN_MODE_KEY: &str = "alcoholimetro_login_mode";
const STATE_PATH_KEY: &str = "alcoholimetro_state_path";
const LOGIN_PAGE_REJECTION_KEY: &str = "alcoholimetro_login_page_is_rejection";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = local_storage()
        .and_then(|storage| storage.get_item(API_URL_KEY).ok().flatten())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

fn stored_setting(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

/// State endpoint path, for servers that route it elsewhere (e.g. under `/api/`)
pub fn get_state_path() -> String {
    state_path_or_default(stored_setting(STATE_PATH_KEY))
}

fn state_path_or_default(stored: Option<String>) -> String {
    stored
        .map(|path| path.trim().to_string())
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| DEFAULT_STATE_PATH.to_string())
}

/// Every dashboard request goes through the same base, login included
fn api_url(base: &str, path: &str) -> String {
    format!("{}{}", base, path)
}

/// Whether an ok login response that stays on the login page is a rejection
fn login_page_is_rejection() -> bool {
    stored_setting(LOGIN_PAGE_REJECTION_KEY).as_deref() == Some("true")
}

/// Whether `url` points at `path`, ignoring query and fragment
fn lands_on(url: &str, path: &str) -> bool {
    let url = url.split(['?', '#']).next().unwrap_or_default();
    url.ends_with(path)
}

/// Login form mode for this browser: `blocking` or `async` (default)
pub fn get_login_mode() -> LoginMode {
    match local_storage()
        .and_then(|storage| storage.get_item(LOGIN_MODE_KEY).ok().flatten())
        .as_deref()
    {
        Some("blocking") => LoginMode::Blocking,
        _ => LoginMode::Async,
    }
}

/// Warning policy chosen for this browser, default when unset or invalid
pub fn get_warning_policy() -> WarningPolicy {
    local_storage()
        .and_then(|storage| storage.get_item(WARNING_POLICY_KEY).ok().flatten())
        .and_then(|value| match value.parse() {
            Ok(policy) => Some(policy),
            Err(e) => {
                log::warn!("Ignoring stored warning policy: {}", e);
                None
            }
        })
        .unwrap_or_default()
}

/// Anti-forgery token from `document.cookie`
pub fn csrf_token() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let document = document.dyn_into::<web_sys::HtmlDocument>().ok()?;
    let cookies = document.cookie().ok()?;
    token_from_cookies(&cookies)
}

/// Samples injected by the page as the global `muestrasData`.
///
/// Missing or malformed data yields an empty list.
pub fn read_page_samples() -> Vec<Sample> {
    let Some(window) = web_sys::window() else {
        return Vec::new();
    };
    let value = match js_sys::Reflect::get(&window, &JsValue::from_str("muestrasData")) {
        Ok(value) if !value.is_undefined() && !value.is_null() => value,
        _ => return Vec::new(),
    };

    let json: String = match js_sys::JSON::stringify(&value) {
        Ok(json) => json.into(),
        Err(_) => return Vec::new(),
    };

    serde_json::from_str(&json).unwrap_or_else(|e| {
        log::error!("Invalid muestrasData: {}", e);
        Vec::new()
    })
}

fn map_gloo_error(err: gloo_net::Error) -> StationError {
    match err {
        gloo_net::Error::SerdeError(e) => StationError::Parse(e.to_string()),
        other => StationError::Transport(other.to_string()),
    }
}

/// Non-success responses become [`StationError::Server`] with the server's
/// own message when the body has one
async fn check_status(response: Response) -> StationResult<Response> {
    if response.ok() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .map(|v| collect_error_messages(&v))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Error del servidor ({})", status));

    Err(StationError::Server { status, message })
}

/// Submit the login form in the background.
///
/// Never fails: connection problems become [`LoginOutcome::ConnectionFailed`].
pub async fn submit_login(action: &str, credentials: &Credentials, landing_route: &str) -> LoginOutcome {
    let token = csrf_token();
    let url = api_url(&get_api_base(), action);

    let mut builder = Request::post(&url).header("Content-Type", FORM_CONTENT_TYPE);
    if let Some(token) = &token {
        builder = builder.header(CSRF_HEADER, token);
    }

    let response = match builder
        .body(credentials.to_form_body(token.as_deref()))
        .map_err(map_gloo_error)
    {
        Ok(request) => request.send().await.map_err(map_gloo_error),
        Err(e) => Err(e),
    };

    let response = match response {
        Ok(response) => response,
        Err(err) => {
            log::error!("Login request failed: {}", err);
            return LoginOutcome::from_error(&err);
        }
    };

    if !response.ok() {
        let body = response.text().await.unwrap_or_default();
        return LoginOutcome::rejected_from_body(&body);
    }

    if login_page_is_rejection() && lands_on(&response.url(), action) {
        return LoginOutcome::rejected_from_body("");
    }

    LoginOutcome::logged_in(landing_route)
}

/// Control and state endpoints, with every request tied to one
/// `AbortController` so leaving the page cancels them.
pub struct StationApi {
    base: String,
    state_path: String,
    abort: Option<AbortController>,
}

impl StationApi {
    pub fn new() -> Self {
        let abort = AbortController::new()
            .map_err(|e| log::warn!("AbortController unavailable: {:?}", e))
            .ok();
        Self {
            base: get_api_base(),
            state_path: get_state_path(),
            abort,
        }
    }

    fn url(&self, path: &str) -> String {
        api_url(&self.base, path)
    }

    fn with_abort(&self, builder: RequestBuilder) -> RequestBuilder {
        let signal = self.abort.as_ref().map(|c| c.signal());
        builder.abort_signal(signal.as_ref())
    }

    /// Abort every request still in flight
    pub fn abort(&self) {
        if let Some(controller) = &self.abort {
            controller.abort();
        }
    }
}

#[async_trait(?Send)]
impl MeasurementApi for StationApi {
    async fn send_action(&self, action: ControlAction) -> StationResult<ControlResponse> {
        let builder = Request::post(&self.url(DEFAULT_CONTROL_PATH))
            .header(CSRF_HEADER, &csrf_token().unwrap_or_default())
            .header("Content-Type", FORM_CONTENT_TYPE);

        let response = self
            .with_abort(builder)
            .body(action.form_body())
            .map_err(map_gloo_error)?
            .send()
            .await
            .map_err(map_gloo_error)?;
        let response = check_status(response).await?;

        let body: ControlResponse = response.json().await.map_err(map_gloo_error)?;
        log::debug!("Control response: {:?}", body);
        Ok(body)
    }

    async fn fetch_state(&self) -> StationResult<bool> {
        let response = self
            .with_abort(Request::get(&self.url(&self.state_path)))
            .send()
            .await
            .map_err(map_gloo_error)?;
        let response = check_status(response).await?;

        let state: StateResponse = response.json().await.map_err(map_gloo_error)?;
        Ok(state.activa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lands_on_ignores_query() {
        assert!(lands_on("http://estacion.local/login/", "/login/"));
        assert!(lands_on("http://estacion.local/login/?next=/dashboard/", "/login/"));
        assert!(lands_on("/login/#form", "/login/"));
        assert!(!lands_on("http://estacion.local/dashboard/", "/login/"));
    }

    #[test]
    fn test_login_and_control_share_api_base() {
        let base = "https://estacion.local";
        let api = StationApi {
            base: base.to_string(),
            state_path: DEFAULT_STATE_PATH.to_string(),
            abort: None,
        };

        assert_eq!(api_url(base, "/login/"), "https://estacion.local/login/");
        assert_eq!(api.url(DEFAULT_CONTROL_PATH), "https://estacion.local/control-medicion/");
    }

    #[test]
    fn test_state_path_setting() {
        assert_eq!(state_path_or_default(None), DEFAULT_STATE_PATH);
        assert_eq!(state_path_or_default(Some("  ".to_string())), DEFAULT_STATE_PATH);
        assert_eq!(
            state_path_or_default(Some("/api/estado-medicion/".to_string())),
            "/api/estado-medicion/"
        );
    }
}
