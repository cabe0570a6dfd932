// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::future::pending;
use std::mem::take;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::Receiver;
use tokio::task::JoinError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio::time::interval;

use crate::detector::ChangeDetector;
use crate::fetch::DataFetcher;
use crate::fetch::FetchError;
use crate::fetch::Snapshot;
use crate::input::HELP;
use crate::input::UserInput;
use crate::presenter::CONNECTION_ERROR_MESSAGE;
use crate::presenter::Notification;
use crate::presenter::Presenter;
use crate::state::ConnectionStatus;
use crate::state::ViewState;
use crate::types::filter::StatusFilter;
use crate::types::timestamp::Timestamp;

const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

type RefreshTask = JoinHandle<Result<Snapshot, FetchError>>;

enum Event {
    RefreshDue,
    Fetched(Result<Result<Snapshot, FetchError>, JoinError>),
    Input(Option<UserInput>),
    ClockTick,
}

/// Owns the dashboard state and drives the polling loop.
pub struct Controller<P: Presenter> {
    fetcher: Arc<DataFetcher>,
    state: ViewState,
    status: ConnectionStatus,
    detector: ChangeDetector,
    presenter: P,
}

impl<P: Presenter> Controller<P> {
    pub fn new(fetcher: DataFetcher, presenter: P) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            state: ViewState::default(),
            status: ConnectionStatus::default(),
            detector: ChangeDetector::new(),
            presenter,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    #[cfg(test)]
    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    #[cfg(test)]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Run one refresh cycle to completion.
    pub async fn refresh(&mut self) {
        let result = self.fetcher.refresh().await;
        self.complete_refresh(result);
    }

    /// Apply the outcome of a refresh: update the state and render, then
    /// look for new arrivals.
    pub fn complete_refresh(&mut self, result: Result<Snapshot, FetchError>) {
        match result {
            Ok(snapshot) => {
                self.state = take(&mut self.state).with_snapshot(snapshot);
                self.status.mark_online(Timestamp::now());
                self.redraw();
                self.detect_changes();
            }
            Err(e) => {
                log::error!("Error loading data: {e}");
                self.go_offline();
            }
        }
    }

    /// Apply the outcome of a spawned refresh task. A task that died counts
    /// as a failed refresh.
    fn complete_task(&mut self, joined: Result<Result<Snapshot, FetchError>, JoinError>) {
        match joined {
            Ok(result) => self.complete_refresh(result),
            Err(e) => {
                log::error!("Refresh task failed: {e}");
                self.go_offline();
            }
        }
    }

    /// Keep the stale state, but tell the viewer we lost the server.
    fn go_offline(&mut self) {
        self.status.mark_offline();
        self.presenter.notify(Notification::error(CONNECTION_ERROR_MESSAGE));
        self.redraw();
    }

    fn detect_changes(&mut self) {
        let checked_in = self.state.counts().checked_in;
        let event = self.detector.detect(checked_in, self.state.most_recent());
        if let Some(event) = event {
            log::info!("New check-in: {}", event.record.full_name);
            self.presenter.notify(Notification::arrival(event));
            self.redraw();
        }
    }

    /// Apply a viewer command. Returns `false` when the viewer wants to quit.
    /// `Refresh` is handled by the polling loop, not here.
    pub fn apply_input(&mut self, input: UserInput) -> bool {
        match input {
            UserInput::Filter(filter) => {
                self.state = take(&mut self.state).with_filter(filter);
            }
            UserInput::Search(text) => {
                self.state = take(&mut self.state).with_search(&text);
            }
            UserInput::Clear => {
                self.state = take(&mut self.state)
                    .with_filter(StatusFilter::All)
                    .with_search("");
            }
            UserInput::Help => {
                self.presenter.notify(Notification::info(HELP));
            }
            UserInput::Refresh => {}
            UserInput::Quit => return false,
        }
        self.redraw();
        true
    }

    pub fn redraw(&mut self) {
        self.presenter.render(&self.state, &self.status);
    }

    /// Poll until the viewer quits. Refreshes never overlap: a tick that
    /// arrives while one is still in flight is skipped.
    pub async fn run(mut self, refresh_interval: Duration, mut input: Option<Receiver<UserInput>>) {
        let mut refresh_timer = interval(refresh_interval);
        refresh_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut clock_timer = interval(CLOCK_INTERVAL);
        clock_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight: Option<RefreshTask> = None;

        loop {
            let event = tokio::select! {
                _ = refresh_timer.tick() => Event::RefreshDue,
                joined = join_refresh(&mut in_flight) => Event::Fetched(joined),
                received = receive_input(&mut input) => Event::Input(received),
                _ = clock_timer.tick() => Event::ClockTick,
            };
            match event {
                Event::RefreshDue | Event::Input(Some(UserInput::Refresh)) => {
                    if in_flight.is_some() {
                        log::debug!("Refresh still in flight, skipping this one.");
                    } else {
                        let fetcher = self.fetcher.clone();
                        in_flight = Some(tokio::spawn(async move { fetcher.refresh().await }));
                    }
                }
                Event::Fetched(joined) => {
                    in_flight = None;
                    self.complete_task(joined);
                }
                Event::Input(Some(command)) => {
                    if !self.apply_input(command) {
                        log::debug!("Quitting.");
                        break;
                    }
                }
                Event::Input(None) => {
                    log::debug!("No more input, polling continues.");
                    input = None;
                }
                Event::ClockTick => self.redraw(),
            }
        }

        if let Some(task) = in_flight {
            task.abort();
        }
    }
}

async fn join_refresh(
    in_flight: &mut Option<RefreshTask>,
) -> Result<Result<Snapshot, FetchError>, JoinError> {
    match in_flight {
        Some(task) => task.await,
        None => pending().await,
    }
}

async fn receive_input(input: &mut Option<Receiver<UserInput>>) -> Option<UserInput> {
    match input {
        Some(rx) => rx.recv().await,
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Instant;

    use axum::http::StatusCode;
    use tokio::sync::mpsc::channel;

    use super::*;
    use crate::error::Fallible;
    use crate::helper::MockApi;
    use crate::presenter::NotificationKind;
    use crate::presenter::recording::RecordingPresenter;
    use crate::types::student::StudentId;

    const ROSTER: &str = r#"{"students": [
        {"id": 1, "fullName": "Ana Rojas"},
        {"id": 2, "fullName": "Bruno Díaz"},
        {"id": 3, "fullName": "Carla Soto"}
    ]}"#;

    async fn controller(api: &MockApi) -> Fallible<Controller<RecordingPresenter>> {
        let fetcher = DataFetcher::new(&api.url(), Duration::from_secs(5))?;
        Ok(Controller::new(fetcher, RecordingPresenter::default()))
    }

    /// Lets a test look at what a controller drew after it moved into `run`.
    #[derive(Clone, Default)]
    struct SharedPresenter(Arc<Mutex<RecordingPresenter>>);

    impl Presenter for SharedPresenter {
        fn render(&mut self, state: &ViewState, status: &ConnectionStatus) {
            self.0.lock().unwrap().render(state, status);
        }

        fn notify(&mut self, notification: Notification) {
            self.0.lock().unwrap().notify(notification);
        }
    }

    fn arrivals(presenter: &RecordingPresenter) -> Vec<&Notification> {
        presenter
            .notifications
            .iter()
            .filter(|n| matches!(n.kind, NotificationKind::Arrival(_)))
            .collect()
    }

    #[tokio::test]
    async fn test_first_cycle_sets_baseline() -> Fallible<()> {
        let api = MockApi::start().await?;
        api.set_students(ROSTER);
        api.set_attendance(r#"{"attendanceToday": [{"studentId": 2, "fullName": "Bruno Díaz", "checkInTime": "09:00"}]}"#);
        let mut controller = controller(&api).await?;
        controller.refresh().await;

        assert!(controller.status().online);
        assert!(controller.status().last_updated.is_some());
        assert_eq!(controller.state().students.len(), 3);
        assert_eq!(controller.state().counts().present, 1);
        assert_eq!(controller.state().counts().absent, 2);
        assert!(controller.presenter().notifications.is_empty());
        assert_eq!(controller.presenter().renders.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_new_arrival_notifies_once() -> Fallible<()> {
        let api = MockApi::start().await?;
        api.set_students(ROSTER);
        api.set_attendance(r#"{"attendanceToday": [{"studentId": 2, "fullName": "Bruno Díaz", "checkInTime": "09:00"}]}"#);
        let mut controller = controller(&api).await?;
        controller.refresh().await;

        api.set_attendance(
            r#"{"attendanceToday": [
                {"studentId": 3, "fullName": "Carla Soto", "checkInTime": "09:02"},
                {"studentId": 2, "fullName": "Bruno Díaz", "checkInTime": "09:00"}
            ]}"#,
        );
        controller.refresh().await;
        let notified = arrivals(controller.presenter());
        assert_eq!(notified.len(), 1);
        match &notified[0].kind {
            NotificationKind::Arrival(event) => {
                assert_eq!(event.record.student_id, StudentId::new("3"));
                assert_eq!(notified[0].message(), "Carla Soto checked in");
            }
            _ => panic!("expected an arrival"),
        }

        // Same data again: nothing new.
        controller.refresh().await;
        assert_eq!(arrivals(controller.presenter()).len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_arrival_outside_the_roster_notifies() -> Fallible<()> {
        let api = MockApi::start().await?;
        api.set_students(r#"{"students": [{"id": 1, "fullName": "Ana Rojas"}]}"#);
        api.set_attendance(r#"{"attendanceToday": [{"studentId": 1, "fullName": "Ana Rojas", "checkInTime": "08:00"}]}"#);
        let mut controller = controller(&api).await?;
        controller.refresh().await;

        // Somebody checks in before the roster knows about them.
        api.set_attendance(
            r#"{"attendanceToday": [
                {"studentId": 9, "fullName": "Diego Paz", "checkInTime": "08:05"},
                {"studentId": 1, "fullName": "Ana Rojas", "checkInTime": "08:00"}
            ]}"#,
        );
        controller.refresh().await;
        let counts = controller.state().counts();
        assert_eq!(counts.present, 1);
        assert_eq!(counts.absent, 0);
        assert_eq!(counts.checked_in, 2);
        let notified = arrivals(controller.presenter());
        assert_eq!(notified.len(), 1);
        assert_eq!(notified[0].message(), "Diego Paz checked in");
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_task_goes_offline() -> Fallible<()> {
        let api = MockApi::start().await?;
        api.set_students(ROSTER);
        let mut controller = controller(&api).await?;
        controller.refresh().await;
        assert!(controller.status().online);
        let before = controller.state().clone();

        let task: RefreshTask = tokio::spawn(pending());
        task.abort();
        let joined = task.await;
        assert!(joined.is_err());
        controller.complete_task(joined);

        assert!(!controller.status().online);
        assert_eq!(controller.state(), &before);
        let last = controller.presenter().notifications.last().unwrap();
        assert!(last.is_error());
        assert_eq!(last.message(), CONNECTION_ERROR_MESSAGE);
        let (_, drawn) = controller.presenter().renders.last().unwrap();
        assert!(!drawn.online);
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_state() -> Fallible<()> {
        let api = MockApi::start().await?;
        api.set_students(ROSTER);
        let mut controller = controller(&api).await?;
        controller.apply_input(UserInput::Filter(StatusFilter::Absent));
        controller.refresh().await;
        let before = controller.state().clone();
        let stamp = controller.status().last_updated.clone();

        api.set_students_status(StatusCode::SERVICE_UNAVAILABLE);
        api.set_attendance_status(StatusCode::SERVICE_UNAVAILABLE);
        controller.refresh().await;

        assert!(!controller.status().online);
        assert_eq!(controller.status().last_updated, stamp);
        assert_eq!(controller.state(), &before);
        assert_eq!(controller.state().filter, StatusFilter::Absent);
        let last = controller.presenter().notifications.last().unwrap();
        assert!(last.is_error());
        assert_eq!(last.message(), CONNECTION_ERROR_MESSAGE);
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_does_not_move_baseline() -> Fallible<()> {
        let api = MockApi::start().await?;
        api.set_students(ROSTER);
        let mut controller = controller(&api).await?;

        api.set_students_status(StatusCode::INTERNAL_SERVER_ERROR);
        controller.refresh().await;
        api.set_students_status(StatusCode::OK);
        api.set_attendance(r#"{"attendanceToday": [{"studentId": 1, "fullName": "Ana Rojas", "checkInTime": "08:00"}]}"#);
        controller.refresh().await;

        // The first good cycle only sets the baseline.
        assert!(arrivals(controller.presenter()).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_input() -> Fallible<()> {
        let api = MockApi::start().await?;
        let mut controller = controller(&api).await?;
        assert!(controller.apply_input(UserInput::Search("ana".to_string())));
        assert!(controller.apply_input(UserInput::Filter(StatusFilter::Present)));
        assert_eq!(controller.state().search, "ana");
        assert_eq!(controller.state().filter, StatusFilter::Present);
        assert!(controller.apply_input(UserInput::Clear));
        assert_eq!(controller.state().search, "");
        assert_eq!(controller.state().filter, StatusFilter::All);
        assert!(!controller.apply_input(UserInput::Quit));
        Ok(())
    }

    #[tokio::test]
    async fn test_run_until_quit() -> Fallible<()> {
        let api = MockApi::start().await?;
        api.set_students(ROSTER);
        let controller = controller(&api).await?;
        let (tx, rx) = channel(4);
        let run = tokio::spawn(controller.run(Duration::from_millis(50), Some(rx)));
        tokio::time::sleep(Duration::from_millis(200)).await;
        tx.send(UserInput::Quit).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
        Ok(())
    }

    #[tokio::test]
    async fn test_slow_refreshes_do_not_overlap() -> Fallible<()> {
        const DELAY: Duration = Duration::from_millis(150);
        let api = MockApi::start().await?;
        api.set_students(ROSTER);
        api.set_delay(DELAY);
        let fetcher = DataFetcher::new(&api.url(), Duration::from_secs(5))?;
        let presenter = SharedPresenter::default();
        let controller = Controller::new(fetcher, presenter.clone());
        let (tx, rx) = channel(4);

        let started = Instant::now();
        // The timer fires far more often than the API can answer.
        let run = tokio::spawn(controller.run(Duration::from_millis(20), Some(rx)));
        tokio::time::sleep(Duration::from_millis(700)).await;
        tx.send(UserInput::Quit).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
        let elapsed = started.elapsed();

        assert_eq!(api.max_in_flight(), 1);
        assert!(api.requests() >= 2);
        let most = (elapsed.as_millis() / DELAY.as_millis()) as usize + 1;
        assert!(api.requests() <= most, "{} requests in {elapsed:?}", api.requests());

        let recorded = presenter.0.lock().unwrap();
        let (state, status) = recorded.renders.last().unwrap();
        assert!(status.online);
        assert_eq!(state.students.len(), 3);
        assert!(recorded.notifications.iter().all(|n| !n.is_error()));
        Ok(())
    }
}
