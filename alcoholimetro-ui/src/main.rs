//! Alcoholimetro Dashboard
//!
//! Breathalyzer station dashboard built with Leptos (WASM).
//!
//! # Features
//!
//! - Login form with client-side validation and background submission
//! - Start/stop control of the measurement session
//! - Line chart of the readings supplied with the page
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. It talks to the station server over HTTP using the session
//! cookie and the `csrftoken` anti-forgery cookie.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Route log records (including the core's tracing events) to the console
    let _ = console_log::init_with_level(log::Level::Info);

    log::info!("Alcoholimetro dashboard v{}", env!("CARGO_PKG_VERSION"));

    mount_to_body(|| view! { <app::App /> });
}
