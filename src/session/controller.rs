//! Session controller
//!
//! Drives the [`SessionMachine`] against a [`MeasurementApi`] and reports
//! every change to a [`SessionObserver`]. Built once per page (or CLI run)
//! and shared by the start/stop handlers.

use async_trait::async_trait;
use std::cell::RefCell;

use super::machine::{Notification, SessionMachine, WarningPolicy};
use super::protocol::{ControlAction, ControlResponse};
use super::state::{SessionState, SessionView};
use crate::error::{StationError, StationResult};

/// Shown when the state query on load fails
pub const STATE_UNAVAILABLE: &str = "No se pudo obtener el estado de la medición";

/// Transport for the control and state endpoints
#[async_trait(?Send)]
pub trait MeasurementApi {
    /// Post a start/stop action
    async fn send_action(&self, action: ControlAction) -> StationResult<ControlResponse>;

    /// Query whether a session is running
    async fn fetch_state(&self) -> StationResult<bool>;
}

/// Receiver of view updates and notifications
pub trait SessionObserver {
    fn render(&self, view: &SessionView);
    fn notify(&self, notification: &Notification);
}

/// Measurement session controller
pub struct SessionController<A, O> {
    api: A,
    observer: O,
    policy: WarningPolicy,
    machine: RefCell<SessionMachine>,
}

impl<A: MeasurementApi, O: SessionObserver> SessionController<A, O> {
    pub fn new(api: A, observer: O, policy: WarningPolicy) -> Self {
        Self {
            api,
            observer,
            policy,
            machine: RefCell::new(SessionMachine::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn policy(&self) -> WarningPolicy {
        self.policy
    }

    pub fn view(&self) -> SessionView {
        self.machine.borrow().view()
    }

    pub fn state(&self) -> SessionState {
        self.machine.borrow().state()
    }

    /// Start a measurement session
    pub async fn start(&self) -> StationResult<SessionState> {
        self.control(ControlAction::Start).await
    }

    /// Stop the running measurement session
    pub async fn stop(&self) -> StationResult<SessionState> {
        self.control(ControlAction::Stop).await
    }

    /// Mirror the server's current state.
    ///
    /// An answer that arrives after a start/stop response was applied is
    /// older than what is shown, so it is dropped and the current state kept.
    pub async fn refresh(&self) -> StationResult<SessionState> {
        let (generation, epoch) = {
            let machine = self.machine.borrow();
            (machine.generation(), machine.epoch())
        };

        let result = self.api.fetch_state().await;

        let view = {
            let mut machine = self.machine.borrow_mut();
            if machine.generation() != generation {
                return Err(StationError::Cancelled);
            }
            if machine.epoch() != epoch {
                tracing::debug!("Discarding state query overtaken by a control response");
                return Ok(machine.state());
            }
            match &result {
                Ok(active) => machine.apply_server_state(*active),
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to query measurement state");
                }
            }
            machine.view()
        };

        match result {
            Ok(_) => {
                tracing::debug!(state = ?view.state, "Measurement state refreshed");
                self.observer.render(&view);
                Ok(view.state)
            }
            Err(err) => {
                self.observer.notify(&Notification::danger(STATE_UNAVAILABLE));
                Err(err)
            }
        }
    }

    /// Drop every pending request; late responses are ignored.
    pub fn cancel_pending(&self) {
        let view = {
            let mut machine = self.machine.borrow_mut();
            machine.cancel();
            machine.view()
        };
        tracing::debug!("Pending measurement requests cancelled");
        self.observer.render(&view);
    }

    async fn control(&self, action: ControlAction) -> StationResult<SessionState> {
        let begun = self.machine.borrow_mut().begin(action);
        let ticket = match begun {
            Ok(ticket) => ticket,
            Err(err) => {
                tracing::debug!(action = %action, "Ignoring click while request is pending");
                return Err(err);
            }
        };
        self.observer.render(&self.view());

        tracing::info!(action = %action, "Sending measurement control action");
        let outcome = self.api.send_action(action).await;

        let (notification, view) = {
            let mut machine = self.machine.borrow_mut();
            let notification = machine.complete(ticket, &outcome, self.policy);
            (notification, machine.view())
        };

        let Some(notification) = notification else {
            tracing::debug!(action = %action, "Discarding response to cancelled request");
            return Err(StationError::Cancelled);
        };

        match &outcome {
            Ok(response) => tracing::info!(
                action = %action,
                state = ?view.state,
                warning = response.warning_text().unwrap_or(""),
                "Measurement control completed"
            ),
            Err(err) => tracing::error!(action = %action, error = %err, "Measurement control failed"),
        }

        self.observer.render(&view);
        self.observer.notify(&notification);

        outcome.map(|_| view.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SERVER_COMMUNICATION_ERROR;
    use crate::session::NotificationKind;
    use std::cell::Cell;
    use std::collections::VecDeque;

    /// Scripted API: pops one canned result per call and yields once so
    /// concurrent calls interleave.
    #[derive(Default)]
    struct FakeApi {
        actions: RefCell<VecDeque<StationResult<ControlResponse>>>,
        states: RefCell<VecDeque<StationResult<bool>>>,
        calls: Cell<usize>,
        /// Extra yields before a state query answers
        state_delay: usize,
    }

    impl FakeApi {
        fn with_action(self, result: StationResult<ControlResponse>) -> Self {
            self.actions.borrow_mut().push_back(result);
            self
        }

        fn with_state(self, result: StationResult<bool>) -> Self {
            self.states.borrow_mut().push_back(result);
            self
        }

        fn with_state_delay(mut self, yields: usize) -> Self {
            self.state_delay = yields;
            self
        }
    }

    #[async_trait(?Send)]
    impl MeasurementApi for FakeApi {
        async fn send_action(&self, _action: ControlAction) -> StationResult<ControlResponse> {
            self.calls.set(self.calls.get() + 1);
            tokio::task::yield_now().await;
            self.actions
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(StationError::Transport("no script".to_string())))
        }

        async fn fetch_state(&self) -> StationResult<bool> {
            self.calls.set(self.calls.get() + 1);
            for _ in 0..=self.state_delay {
                tokio::task::yield_now().await;
            }
            self.states
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(StationError::Transport("no script".to_string())))
        }
    }

    #[derive(Default)]
    struct Recorder {
        views: RefCell<Vec<SessionView>>,
        notes: RefCell<Vec<Notification>>,
    }

    impl SessionObserver for Recorder {
        fn render(&self, view: &SessionView) {
            self.views.borrow_mut().push(*view);
        }

        fn notify(&self, notification: &Notification) {
            self.notes.borrow_mut().push(notification.clone());
        }
    }

    fn status(text: &str) -> StationResult<ControlResponse> {
        Ok(ControlResponse {
            status: Some(text.to_string()),
            ..Default::default()
        })
    }

    fn controller(api: FakeApi) -> SessionController<FakeApi, Recorder> {
        SessionController::new(api, Recorder::default(), WarningPolicy::KeepState)
    }

    #[tokio::test]
    async fn test_refresh_mirrors_server_state() {
        let ctl = controller(FakeApi::default().with_state(Ok(true)));

        assert_eq!(ctl.refresh().await, Ok(SessionState::Active));

        let view = ctl.observer().views.borrow().last().copied().unwrap();
        assert_eq!(view.state.badge_label(), "Activo");
        assert_eq!(view.state.badge_class(), "bg-success");
        assert!(!view.start.available);
        assert!(view.stop.available);
    }

    #[tokio::test]
    async fn test_refresh_failure_notifies() {
        let ctl = controller(
            FakeApi::default().with_state(Err(StationError::Parse("bad json".to_string()))),
        );

        assert!(ctl.refresh().await.is_err());
        assert_eq!(ctl.state(), SessionState::Inactive);
        assert_eq!(
            ctl.observer().notes.borrow().as_slice(),
            &[Notification::danger(STATE_UNAVAILABLE)]
        );
    }

    #[tokio::test]
    async fn test_start_renders_busy_then_active() {
        let ctl = controller(FakeApi::default().with_action(status("Medición iniciada")));

        assert_eq!(ctl.start().await, Ok(SessionState::Active));

        let views = ctl.observer().views.borrow();
        assert_eq!(views.len(), 2);
        assert!(views[0].start.busy);
        assert_eq!(views[0].state, SessionState::Inactive);
        assert!(!views[1].start.busy);
        assert_eq!(views[1].state, SessionState::Active);
        assert_eq!(
            ctl.observer().notes.borrow().as_slice(),
            &[Notification::success("Medición iniciada")]
        );
    }

    #[tokio::test]
    async fn test_stop_after_active() {
        let ctl = controller(
            FakeApi::default()
                .with_state(Ok(true))
                .with_action(status("Medición detenida")),
        );
        ctl.refresh().await.unwrap();

        assert_eq!(ctl.stop().await, Ok(SessionState::Inactive));
        let notes = ctl.observer().notes.borrow();
        assert_eq!(notes.last().unwrap().kind, NotificationKind::Success);
        assert_eq!(notes.last().unwrap().message, "Medición detenida");
    }

    #[tokio::test]
    async fn test_network_failure_reenables_controls() {
        let ctl = controller(
            FakeApi::default().with_action(Err(StationError::Transport("refused".to_string()))),
        );

        assert!(ctl.start().await.is_err());

        let view = ctl.view();
        assert!(view.start.clickable());
        assert!(view.stop.clickable());
        assert_eq!(view.state, SessionState::Inactive);
        assert_eq!(
            ctl.observer().notes.borrow().as_slice(),
            &[Notification::danger(SERVER_COMMUNICATION_ERROR)]
        );
    }

    #[tokio::test]
    async fn test_double_click_sends_one_request() {
        let ctl = controller(
            FakeApi::default()
                .with_action(status("Medición iniciada"))
                .with_action(status("Medición iniciada")),
        );

        let (first, second) = tokio::join!(ctl.start(), ctl.start());

        assert_eq!(first, Ok(SessionState::Active));
        assert_eq!(second, Err(StationError::Busy(ControlAction::Start)));
        assert_eq!(ctl.api().calls.get(), 1);
    }

    #[tokio::test]
    async fn test_cancel_discards_pending_response() {
        let ctl = controller(FakeApi::default().with_action(status("Medición iniciada")));

        let (result, _) = tokio::join!(ctl.start(), async { ctl.cancel_pending() });

        assert_eq!(result, Err(StationError::Cancelled));
        assert_eq!(ctl.state(), SessionState::Inactive);
        assert!(ctl.view().start.clickable());
        assert!(ctl.observer().notes.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_discards_pending_refresh() {
        let ctl = controller(FakeApi::default().with_state(Ok(true)));

        let (result, _) = tokio::join!(ctl.refresh(), async { ctl.cancel_pending() });

        assert_eq!(result, Err(StationError::Cancelled));
        assert_eq!(ctl.state(), SessionState::Inactive);
        // Only the cancellation itself rendered
        assert_eq!(ctl.observer().views.borrow().len(), 1);
        assert!(ctl.observer().notes.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_slow_refresh_does_not_undo_start() {
        let ctl = controller(
            FakeApi::default()
                .with_state(Ok(false))
                .with_state_delay(2)
                .with_action(status("Medición iniciada")),
        );

        let (refreshed, started) = tokio::join!(ctl.refresh(), ctl.start());

        assert_eq!(started, Ok(SessionState::Active));
        assert_eq!(refreshed, Ok(SessionState::Active));
        assert_eq!(ctl.state(), SessionState::Active);
        assert!(ctl.view().stop.available);
    }
}
