//! Session Controls Component
//!
//! Start/stop buttons, state badge and state alert for the measurement
//! session. All session logic lives in [`SessionController`]; this
//! component only mirrors the views it renders.

use alcoholimetro::session::SessionView;
use alcoholimetro::{Notification, SessionController, SessionObserver, SessionState};
use leptos::*;
use std::rc::Rc;

use crate::api::StationApi;
use crate::components::InlineLoading;
use crate::state::global::GlobalState;

/// Pushes controller output into Leptos signals
struct SignalObserver {
    view: WriteSignal<SessionView>,
    state: GlobalState,
}

impl SessionObserver for SignalObserver {
    fn render(&self, view: &SessionView) {
        // The panel may already be gone when a cleanup renders
        let _ = self.view.try_set(*view);
    }

    fn notify(&self, notification: &Notification) {
        self.state.show_notification(notification.clone());
    }
}

type Controller = SessionController<StationApi, SignalObserver>;

/// Measurement session panel
#[component]
pub fn SessionControls() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let (view, set_view) = create_signal(SessionView::new(SessionState::Inactive, false, false));

    let controller: Rc<Controller> = Rc::new(SessionController::new(
        StationApi::new(),
        SignalObserver {
            view: set_view,
            state,
        },
        state.warning_policy.get_untracked(),
    ));

    // Mirror the server state on load
    {
        let controller = Rc::clone(&controller);
        spawn_local(async move {
            if let Err(e) = controller.refresh().await {
                log::warn!("Initial state refresh failed: {}", e);
            }
        });
    }

    {
        let controller = Rc::clone(&controller);
        on_cleanup(move || {
            controller.cancel_pending();
            controller.api().abort();
        });
    }

    let on_start = {
        let controller = Rc::clone(&controller);
        move |_| {
            let controller = Rc::clone(&controller);
            spawn_local(async move {
                if let Err(e) = controller.start().await {
                    log::debug!("Start request ended with: {}", e);
                }
            });
        }
    };

    let on_stop = {
        let controller = Rc::clone(&controller);
        move |_| {
            let controller = Rc::clone(&controller);
            spawn_local(async move {
                if let Err(e) = controller.stop().await {
                    log::debug!("Stop request ended with: {}", e);
                }
            });
        }
    };

    view! {
        <div class="card mb-4">
            <div class="card-body">
                <div class="d-flex align-items-center justify-content-between mb-3">
                    <h2 class="h5 mb-0">"Medición"</h2>
                    <div id="estado">
                        <span class=move || format!("badge {}", view.get().state.badge_class())>
                            {move || view.get().state.badge_label()}
                        </span>
                    </div>
                </div>

                <div id="estadoMedicion" class=move || view.get().state.alert_class() role="alert">
                    {move || view.get().state.alert_text()}
                </div>

                <div class="d-flex gap-2">
                    <button
                        id="btnIniciar"
                        type="button"
                        class=move || view.get().start.button_class("success")
                        disabled=move || !view.get().start.clickable()
                        on:click=on_start
                    >
                        {move || view.get().start.busy.then(|| view! { <InlineLoading /> })}
                        "Iniciar medición"
                    </button>

                    <button
                        id="btnDetener"
                        type="button"
                        class=move || view.get().stop.button_class("danger")
                        disabled=move || !view.get().stop.clickable()
                        on:click=on_stop
                    >
                        {move || view.get().stop.busy.then(|| view! { <InlineLoading /> })}
                        "Detener medición"
                    </button>
                </div>
            </div>
        </div>
    }
}
