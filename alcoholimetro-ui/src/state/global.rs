//! Global Application State
//!
//! Reactive state management using Leptos signals.

use alcoholimetro::{Notification, WarningPolicy};
use leptos::*;

/// How long a notification stays on screen
pub const NOTIFICATION_TIMEOUT_MS: u32 = 4000;

/// Global application state provided to all components
#[derive(Clone, Copy)]
pub struct GlobalState {
    /// Notifications currently on screen, oldest first
    pub notifications: RwSignal<Vec<Toasted>>,
    /// How the dashboard treats control warnings
    pub warning_policy: RwSignal<WarningPolicy>,
    next_id: StoredValue<u64>,
}

/// A notification with the id used to dismiss it
#[derive(Clone, Debug, PartialEq)]
pub struct Toasted {
    pub id: u64,
    pub notification: Notification,
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let state = GlobalState {
        notifications: create_rw_signal(Vec::new()),
        warning_policy: create_rw_signal(crate::api::get_warning_policy()),
        next_id: store_value(0),
    };

    provide_context(state);
}

impl GlobalState {
    /// Show a notification (auto-clears after timeout)
    pub fn show_notification(&self, notification: Notification) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);

        self.notifications
            .update(|list| push_toast(list, Toasted { id, notification }));

        let state = *self;
        gloo_timers::callback::Timeout::new(NOTIFICATION_TIMEOUT_MS, move || {
            state.dismiss(id);
        })
        .forget();
    }

    /// Remove a notification early
    pub fn dismiss(&self, id: u64) {
        self.notifications.update(|list| remove_toast(list, id));
    }
}

fn push_toast(list: &mut Vec<Toasted>, toast: Toasted) {
    list.push(toast);
}

fn remove_toast(list: &mut Vec<Toasted>, id: u64) {
    list.retain(|t| t.id != id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_toast_by_id() {
        let mut list = Vec::new();
        push_toast(
            &mut list,
            Toasted {
                id: 0,
                notification: Notification::success("Medición iniciada"),
            },
        );
        push_toast(
            &mut list,
            Toasted {
                id: 1,
                notification: Notification::danger("Error"),
            },
        );

        remove_toast(&mut list, 0);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, 1);

        // Unknown ids are ignored
        remove_toast(&mut list, 7);
        assert_eq!(list.len(), 1);
    }
}
