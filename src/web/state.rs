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

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use crate::presenter::Notification;
use crate::presenter::Presenter;
use crate::presenter::TOAST_DURATION;
use crate::state::ConnectionStatus;
use crate::state::ViewState;

#[derive(Clone)]
pub struct ServerState {
    pub refresh_interval: Duration,
    pub max_recent: usize,
    pub mutable: Arc<Mutex<MutableState>>,
}

#[derive(Default)]
pub struct MutableState {
    pub state: ViewState,
    pub status: ConnectionStatus,
    pub notifications: Vec<Notification>,
}

impl MutableState {
    /// Notifications a page loaded `now` should still show. A page only
    /// reloads once per refresh interval, so anything issued within the last
    /// interval is kept; the page fades it out after the toast duration.
    pub fn visible_notifications(&self, now: Instant, window: Duration) -> Vec<Notification> {
        let window = window.max(TOAST_DURATION);
        self.notifications
            .iter()
            .filter(|n| now.duration_since(n.issued_at) < window)
            .cloned()
            .collect()
    }
}

impl ServerState {
    pub fn new(refresh_interval: Duration, max_recent: usize) -> Self {
        Self {
            refresh_interval,
            max_recent,
            mutable: Arc::new(Mutex::new(MutableState::default())),
        }
    }

    pub fn presenter(&self) -> WebPresenter {
        WebPresenter {
            window: self.refresh_interval,
            mutable: self.mutable.clone(),
        }
    }
}

/// Publishes the controller's state for the web handlers to read.
pub struct WebPresenter {
    window: Duration,
    mutable: Arc<Mutex<MutableState>>,
}

impl Presenter for WebPresenter {
    fn render(&mut self, state: &ViewState, status: &ConnectionStatus) {
        let mut mutable = self.mutable.lock().unwrap();
        mutable.state = state.clone();
        mutable.status = status.clone();
    }

    fn notify(&mut self, notification: Notification) {
        let mut mutable = self.mutable.lock().unwrap();
        let now = Instant::now();
        let window = self.window.max(TOAST_DURATION);
        mutable
            .notifications
            .retain(|n| now.duration_since(n.issued_at) < window);
        mutable.notifications.push(notification);
    }
}
