//! # Alcoholimetro
//!
//! Client side of a breathalyzer measurement station: login validation,
//! measurement session control and alcohol reading charts.
//!
//! ## Features
//!
//! - **Login validation**: trimming, empty and whitespace checks before any request
//! - **Session control**: start/stop with the displayed state always taken from the server
//! - **In-flight guard**: one pending request per action, cancellable as a group
//! - **Charts**: Chart.js-shaped line chart of recorded readings
//!
//! ## Modules
//!
//! - [`login`]: credential validation and login outcomes
//! - [`session`]: session state machine and controller
//! - [`chart`]: samples, chart configuration and summaries
//! - [`reading`]: station sensor readings
//! - [`config`]: TOML configuration with environment overrides
//! - `client` (feature `native`): `reqwest` client for the station server
//!
//! The platform-neutral modules compile to WebAssembly with
//! `default-features = false`; the dashboard crate uses them that way.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use alcoholimetro::config::StationConfig;
//! use alcoholimetro::session::{Notification, SessionController, SessionObserver, SessionView};
//! use alcoholimetro::StationClient;
//!
//! struct Print;
//!
//! impl SessionObserver for Print {
//!     fn render(&self, view: &SessionView) {
//!         println!("{}", view.state.alert_text());
//!     }
//!     fn notify(&self, n: &Notification) {
//!         println!("[{}] {}", n.kind.as_str(), n.message);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StationConfig::default();
//!     let policy = config.warning_policy;
//!     let client = StationClient::new(config)?;
//!
//!     let controller = SessionController::new(client, Print, policy);
//!     controller.refresh().await?;
//!     controller.start().await?;
//!     Ok(())
//! }
//! ```

pub mod chart;
pub mod config;
pub mod csrf;
pub mod error;
pub mod login;
pub mod reading;
pub mod session;

#[cfg(feature = "native")]
pub mod client;
#[cfg(feature = "native")]
pub mod samples;

pub use chart::{build_chart_config, ChartConfig, Sample, SampleSummary};
pub use error::{StationError, StationResult};
pub use login::{Credentials, LoginMode, LoginOutcome, LoginRules, ValidationError};
pub use session::{
    ControlAction, MeasurementApi, Notification, NotificationKind, SessionController,
    SessionObserver, SessionState, SessionView, WarningPolicy,
};

#[cfg(feature = "native")]
pub use client::StationClient;
