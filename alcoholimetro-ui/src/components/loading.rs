//! Loading Component

use leptos::*;

/// Inline spinner shown inside a button while its request is pending
#[component]
pub fn InlineLoading() -> impl IntoView {
    view! {
        <span class="spinner-border spinner-border-sm me-2" role="status" aria-hidden="true" />
    }
}
