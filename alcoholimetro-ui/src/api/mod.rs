//! Station server access

pub mod client;

pub use client::{
    csrf_token, get_login_mode, get_warning_policy, read_page_samples, submit_login,
    StationApi,
};
