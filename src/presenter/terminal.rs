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

use std::io::Write;
use std::time::Instant;

use crate::presenter::Notification;
use crate::presenter::NotificationKind;
use crate::presenter::Presenter;
use crate::projector::Projection;
use crate::state::ConnectionStatus;
use crate::state::DashboardView;
use crate::state::ViewState;
use crate::types::timestamp::Timestamp;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const BELL: &str = "\x07";

/// Draws the dashboard as plain text.
pub struct TerminalPresenter<W: Write> {
    out: W,
    max_recent: usize,
    clear_screen: bool,
    sound: bool,
    toasts: Vec<Notification>,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, max_recent: usize) -> Self {
        Self {
            out,
            max_recent,
            clear_screen: false,
            sound: false,
            toasts: Vec::new(),
        }
    }

    /// Clear the screen before every frame.
    pub fn clear_screen(self, clear_screen: bool) -> Self {
        Self {
            clear_screen,
            ..self
        }
    }

    /// Ring the terminal bell when somebody checks in.
    pub fn sound(self, sound: bool) -> Self {
        Self { sound, ..self }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    fn draw(&mut self, state: &ViewState, status: &ConnectionStatus) -> std::io::Result<()> {
        let now = Instant::now();
        self.toasts.retain(|toast| !toast.is_expired(now));
        if self.clear_screen {
            write!(self.out, "{CLEAR_SCREEN}")?;
        }
        let view = state.dashboard(self.max_recent);
        write_dashboard(&mut self.out, &view, status, Timestamp::now(), &self.toasts)?;
        self.out.flush()
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, state: &ViewState, status: &ConnectionStatus) {
        if let Err(e) = self.draw(state, status) {
            log::warn!("Failed to draw the dashboard: {e}");
        }
    }

    fn notify(&mut self, notification: Notification) {
        if self.sound && matches!(notification.kind, NotificationKind::Arrival(_)) {
            if let Err(e) = write!(self.out, "{BELL}") {
                log::warn!("Failed to ring the bell: {e}");
            }
        }
        self.toasts.push(notification);
    }
}

/// Write one frame of the dashboard.
pub fn write_dashboard<W: Write>(
    out: &mut W,
    view: &DashboardView<'_>,
    status: &ConnectionStatus,
    now: Timestamp,
    toasts: &[Notification],
) -> std::io::Result<()> {
    writeln!(out, "Attendance | {} {}", now.long_date(), now.time_of_day())?;
    let marker = if status.online { "●" } else { "○" };
    match &status.last_updated {
        Some(at) => writeln!(out, "{marker} {} (last updated {at})", status.label())?,
        None => writeln!(out, "{marker} {}", status.label())?,
    }
    writeln!(out)?;
    writeln!(
        out,
        "Present: {}   Absent: {}   Total: {}",
        view.counts.present, view.counts.absent, view.counts.total
    )?;
    if view.search.is_empty() {
        writeln!(out, "Filter: {}", view.filter)?;
    } else {
        writeln!(out, "Filter: {}   Search: {}", view.filter, view.search)?;
    }
    writeln!(out)?;

    match &view.projection {
        Projection::NoStudents => writeln!(out, "No students registered")?,
        Projection::NoMatches => writeln!(out, "No students match the current filters")?,
        Projection::Rows(rows) => {
            writeln!(
                out,
                "{:<10} {:<30} {:<16} {}",
                "STATUS", "NAME", "NATIONAL ID", "CHECK-IN"
            )?;
            for row in rows {
                let status = if row.is_present() { "Present" } else { "Absent" };
                let national_id = row.student.national_id.as_deref().unwrap_or("N/A");
                let check_in = row.record.map_or("--", |r| r.check_in_time.as_str());
                writeln!(
                    out,
                    "{:<10} {:<30} {:<16} {}",
                    status, row.student.full_name, national_id, check_in
                )?;
            }
        }
    }
    writeln!(out)?;

    writeln!(out, "Latest check-ins")?;
    if view.recent.is_empty() {
        writeln!(out, "  No check-ins today")?;
    }
    for record in view.recent {
        writeln!(
            out,
            "  {:<30} {:<16} {}",
            record.full_name,
            record.device_label(),
            record.check_in_time
        )?;
    }

    if !toasts.is_empty() {
        writeln!(out)?;
    }
    for toast in toasts {
        let icon = match toast.kind {
            NotificationKind::Arrival(_) => "[+]",
            NotificationKind::Info(_) => "[i]",
            NotificationKind::Error(_) => "[!]",
        };
        writeln!(out, "{icon} {}", toast.message())?;
    }
    Ok(())
}
