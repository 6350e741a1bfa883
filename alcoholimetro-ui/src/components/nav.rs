//! Navigation Component
//!
//! Header navigation bar with brand and links.

use leptos::*;
use leptos_router::*;

/// Navigation header component
#[component]
pub fn Nav() -> impl IntoView {
    view! {
        <nav class="navbar navbar-expand navbar-dark bg-dark">
            <div class="container">
                <A href="/dashboard/" class="navbar-brand">
                    "Alcoholímetro"
                </A>

                <div class="navbar-nav ms-auto">
                    <A href="/dashboard/" class="nav-link" active_class="active">
                        "Panel"
                    </A>
                    // Served by the station server, so skip the client-side router
                    <a href="/logout/" rel="external" class="nav-link">
                        "Cerrar sesión"
                    </a>
                </div>
            </div>
        </nav>
    }
}
