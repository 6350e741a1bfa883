//! Pages
//!
//! Top-level page components for each route.

pub mod dashboard;
pub mod login;

pub use dashboard::Dashboard;
pub use login::LoginPage;
