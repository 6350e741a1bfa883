//! Station HTTP Client
//!
//! `reqwest` client for the station server. Keeps the session and
//! anti-forgery cookies in a jar so a login carries over to the control
//! requests that follow.

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_TYPE, REFERER};
use reqwest::{Client, Response, Url};
use std::sync::Arc;
use std::time::Duration;

use crate::config::StationConfig;
use crate::csrf::{token_from_cookies, CSRF_HEADER};
use crate::error::{StationError, StationResult};
use crate::login::{collect_error_messages, Credentials, LoginOutcome};
use crate::reading::{ReadingReceipt, SensorReading};
use crate::session::{ControlAction, ControlResponse, MeasurementApi, StateResponse};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Station server client
pub struct StationClient {
    client: Client,
    jar: Arc<Jar>,
    base_url: Url,
    config: StationConfig,
}

impl StationClient {
    /// Create a client for the configured server
    pub fn new(config: StationConfig) -> StationResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| StationError::Config(format!("invalid base_url {}: {}", config.base_url, e)))?;

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StationError::Config(e.to_string()))?;

        Ok(Self {
            client,
            jar,
            base_url,
            config,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> StationResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| StationError::Config(format!("invalid path {}: {}", path, e)))
    }

    /// Anti-forgery token currently held in the cookie jar
    pub fn csrf_token(&self) -> Option<String> {
        let cookies = self.jar.cookies(&self.base_url)?;
        let cookies = cookies.to_str().ok()?;
        token_from_cookies(cookies)
    }

    /// Visit the login page so the server issues a `csrftoken` cookie
    pub async fn prime_csrf(&self) -> StationResult<()> {
        let url = self.endpoint(&self.config.login_path)?;
        let response = self.client.get(url).send().await?;
        tracing::debug!(status = %response.status(), "Fetched login page");
        Ok(())
    }

    /// Submit credentials the way the dashboard's login form does.
    ///
    /// Never returns an error: transport failures become
    /// [`LoginOutcome::ConnectionFailed`].
    pub async fn login(&self, credentials: &Credentials, landing_route: &str) -> LoginOutcome {
        match self.try_login(credentials, landing_route).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(error = %err, "Login request failed");
                LoginOutcome::from_error(&err)
            }
        }
    }

    async fn try_login(
        &self,
        credentials: &Credentials,
        landing_route: &str,
    ) -> StationResult<LoginOutcome> {
        if self.csrf_token().is_none() {
            self.prime_csrf().await?;
        }
        let token = self.csrf_token();
        let login_url = self.endpoint(&self.config.login_path)?;

        let mut request = self
            .client
            .post(login_url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(REFERER, login_url.as_str())
            .body(credentials.to_form_body(token.as_deref()));
        if let Some(token) = &token {
            request = request.header(CSRF_HEADER, token.as_str());
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::info!(status = %status, "Login rejected");
            return Ok(LoginOutcome::rejected_from_body(&body));
        }

        if self.config.login_page_is_rejection && response.url().path() == login_url.path() {
            tracing::info!("Login rejected: returned to login page");
            return Ok(LoginOutcome::rejected_from_body(""));
        }

        tracing::info!("Logged in");
        Ok(LoginOutcome::logged_in(landing_route))
    }

    /// End the server session
    pub async fn logout(&self) -> StationResult<()> {
        let url = self.endpoint(&self.config.logout_path)?;
        let response = self.client.get(url).send().await?;
        check_status(response).await?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Upload one sensor reading
    pub async fn submit_reading(&self, reading: &SensorReading) -> StationResult<ReadingReceipt> {
        let url = self.endpoint(&self.config.readings_path)?;
        let response = self.client.post(url).json(reading).send().await?;
        let response = check_status(response).await?;
        let receipt: ReadingReceipt = response.json().await?;

        tracing::info!(
            employee = %reading.employee_id,
            ppm = reading.alcohol_ppm,
            status = %receipt.status,
            "Reading uploaded"
        );
        Ok(receipt)
    }
}

#[async_trait(?Send)]
impl MeasurementApi for StationClient {
    async fn send_action(&self, action: ControlAction) -> StationResult<ControlResponse> {
        let url = self.endpoint(&self.config.control_path)?;
        let token = self.csrf_token().unwrap_or_default();

        let response = self
            .client
            .post(url)
            .header(CSRF_HEADER, token)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(action.form_body())
            .send()
            .await?;
        let response = check_status(response).await?;

        Ok(response.json().await?)
    }

    async fn fetch_state(&self) -> StationResult<bool> {
        let url = self.endpoint(&self.config.state_path)?;
        let response = self.client.get(url).send().await?;
        let response = check_status(response).await?;
        let state: StateResponse = response.json().await?;
        Ok(state.activa)
    }
}

/// Turn a non-success response into [`StationError::Server`], keeping the
/// server's own message when the body carries one
async fn check_status(response: Response) -> StationResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .map(|v| collect_error_messages(&v))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Error del servidor")
                .to_string()
        });

    Err(StationError::Server {
        status: status.as_u16(),
        message,
    })
}
