//! App Root Component
//!
//! Main application component with routing and global providers.

use leptos::*;
use leptos_router::*;

use crate::components::{Nav, Toast};
use crate::pages::{Dashboard, LoginPage};
use crate::state::global::provide_global_state;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_global_state();

    view! {
        <Router>
            <Nav />

            <main class="container py-4">
                <Routes>
                    <Route path="/" view=|| view! { <Redirect path="/dashboard/" /> } />
                    <Route path="/login/" view=LoginPage />
                    <Route path="/dashboard/" view=Dashboard />
                    <Route path="/*any" view=NotFound />
                </Routes>
            </main>

            <Toast />
        </Router>
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="text-center py-5">
            <h1 class="display-6 mb-3">"Página no encontrada"</h1>
            <A href="/dashboard/" class="btn btn-primary">
                "Ir al panel"
            </A>
        </div>
    }
}
