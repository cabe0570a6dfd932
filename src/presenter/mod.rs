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

pub mod terminal;

use std::time::Duration;
use std::time::Instant;

use crate::detector::ArrivalEvent;
use crate::state::ConnectionStatus;
use crate::state::ViewState;

/// How long a notification stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

pub const CONNECTION_ERROR_MESSAGE: &str = "Could not connect to the server";

#[derive(Clone, PartialEq, Debug)]
pub enum NotificationKind {
    Arrival(ArrivalEvent),
    Info(String),
    Error(String),
}

/// A transient message shown on top of the dashboard.
#[derive(Clone, PartialEq, Debug)]
pub struct Notification {
    pub kind: NotificationKind,
    pub issued_at: Instant,
}

impl Notification {
    pub fn arrival(event: ArrivalEvent) -> Self {
        Self {
            kind: NotificationKind::Arrival(event),
            issued_at: Instant::now(),
        }
    }

    pub fn info(message: &str) -> Self {
        Self {
            kind: NotificationKind::Info(message.to_string()),
            issued_at: Instant::now(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            kind: NotificationKind::Error(message.to_string()),
            issued_at: Instant::now(),
        }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            NotificationKind::Arrival(event) => format!("{} checked in", event.record.full_name),
            NotificationKind::Info(message) | NotificationKind::Error(message) => message.clone(),
        }
    }

    #[cfg(test)]
    pub fn is_error(&self) -> bool {
        matches!(self.kind, NotificationKind::Error(_))
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.issued_at) >= TOAST_DURATION
    }
}

/// The surface the dashboard is drawn on.
pub trait Presenter {
    /// Redraw from the current state.
    fn render(&mut self, state: &ViewState, status: &ConnectionStatus);

    /// Show a transient notification.
    fn notify(&mut self, notification: Notification);
}
