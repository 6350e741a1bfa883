//! Login Page

use leptos::*;

use crate::api;
use crate::components::LoginForm;

/// Login page component
#[component]
pub fn LoginPage() -> impl IntoView {
    let mode = api::get_login_mode();

    view! {
        <div class="row justify-content-center">
            <div class="col-md-6 col-lg-4">
                <div class="card shadow-sm">
                    <div class="card-body">
                        <h1 class="h4 mb-4 text-center">"Iniciar sesión"</h1>
                        <LoginForm mode=mode />
                    </div>
                </div>
            </div>
        </div>
    }
}
