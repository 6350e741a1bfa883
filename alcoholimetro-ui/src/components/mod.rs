//! UI Components
//!
//! Reusable Leptos components for the dashboard.

pub mod chart;
pub mod loading;
pub mod login_form;
pub mod nav;
pub mod session_controls;
pub mod toast;

pub use chart::AlcoholChart;
pub use loading::InlineLoading;
pub use login_form::LoginForm;
pub use nav::Nav;
pub use session_controls::SessionControls;
pub use toast::Toast;
