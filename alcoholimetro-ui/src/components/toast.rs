//! Toast Notification Component
//!
//! Shows session and login notifications as Bootstrap alerts.

use alcoholimetro::Notification;
use leptos::*;

use crate::state::global::GlobalState;

/// Toast notification container
#[component]
pub fn Toast() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    view! {
        <div class="position-fixed bottom-0 end-0 p-3" style="z-index: 1080">
            <For
                each=move || state.notifications.get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <ToastMessage
                            notification=toast.notification
                            on_close=move || state.dismiss(id)
                        />
                    }
                }
            />
        </div>
    }
}

#[component]
fn ToastMessage(notification: Notification, on_close: impl Fn() + 'static) -> impl IntoView {
    view! {
        <div
            class=format!("{} alert-dismissible shadow", notification.kind.alert_class())
            role="alert"
        >
            {notification.message}
            <button
                type="button"
                class="btn-close"
                aria-label="Cerrar"
                on:click=move |_| on_close()
            />
        </div>
    }
}
