//! Login Form Component
//!
//! Validates credentials in the browser before anything is sent. In
//! [`LoginMode::Async`] the form is always submitted in the background and
//! the page navigates on success; in [`LoginMode::Blocking`] only invalid
//! input is stopped and valid input goes out as a normal form POST.

use alcoholimetro::login::{DEFAULT_LANDING_ROUTE, DEFAULT_LOGIN_PATH};
use alcoholimetro::{Credentials, LoginMode, LoginOutcome, LoginRules};
use leptos::*;

use crate::api;
use crate::components::InlineLoading;

/// Login form
#[component]
pub fn LoginForm(
    #[prop(default = LoginMode::Async)] mode: LoginMode,
    #[prop(default = DEFAULT_LOGIN_PATH)] action: &'static str,
) -> impl IntoView {
    let username_ref = create_node_ref::<html::Input>();
    let password_ref = create_node_ref::<html::Input>();
    let (error, set_error) = create_signal(None::<String>);
    let (submitting, set_submitting) = create_signal(false);
    let rules = LoginRules::default();

    let on_submit = move |ev: ev::SubmitEvent| {
        let username = username_ref.get().map(|i| i.value()).unwrap_or_default();
        let password = password_ref.get().map(|i| i.value()).unwrap_or_default();

        let credentials = match Credentials::validate(&username, &password, &rules) {
            Ok(credentials) => credentials,
            Err(e) => {
                ev.prevent_default();
                set_error.set(Some(e.to_string()));
                return;
            }
        };
        set_error.set(None);

        if mode == LoginMode::Blocking {
            return;
        }

        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        set_submitting.set(true);

        spawn_local(async move {
            let outcome = api::submit_login(action, &credentials, DEFAULT_LANDING_ROUTE).await;
            set_submitting.set(false);

            match outcome {
                LoginOutcome::LoggedIn { redirect_to } => navigate(&redirect_to),
                other => set_error.set(other.error_message().map(str::to_string)),
            }
        });
    };

    view! {
        <form id="login-form" method="post" action=action on:submit=on_submit novalidate=true>
            <input type="hidden" name="csrfmiddlewaretoken" value=api::csrf_token().unwrap_or_default() />

            <div class="mb-3">
                <label for="username" class="form-label">"Usuario"</label>
                <input
                    id="username"
                    name="username"
                    type="text"
                    class="form-control"
                    autocomplete="username"
                    node_ref=username_ref
                />
            </div>

            <div class="mb-3">
                <label for="password" class="form-label">"Contraseña"</label>
                <input
                    id="password"
                    name="password"
                    type="password"
                    class="form-control"
                    autocomplete="current-password"
                    node_ref=password_ref
                />
            </div>

            <button type="submit" class="btn btn-primary w-100" disabled=submitting>
                {move || submitting.get().then(|| view! { <InlineLoading /> })}
                "Ingresar"
            </button>

            {move || {
                error.get().map(|msg| view! {
                    <div id="loginError" class="alert alert-danger mt-3" role="alert">
                        {msg}
                    </div>
                })
            }}
        </form>
    }
}

/// Full page load so the server sees the new session cookie
fn navigate(path: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.location().set_href(path) {
        log::error!("Failed to navigate to {}: {:?}", path, e);
    }
}
