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

use serde::Serialize;

use crate::fetch::Snapshot;
use crate::index::AttendanceIndex;
use crate::projector::Counts;
use crate::projector::Projection;
use crate::projector::count;
use crate::projector::project;
use crate::types::attendance::AttendanceRecord;
use crate::types::filter::StatusFilter;
use crate::types::student::Student;
use crate::types::timestamp::Timestamp;

/// Everything the dashboard knows: the last good data from the API, plus
/// the viewer's filter and search.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ViewState {
    pub students: Vec<Student>,
    /// Most recent first.
    pub attendance_today: Vec<AttendanceRecord>,
    pub filter: StatusFilter,
    pub search: String,
}

impl ViewState {
    /// Replace the roster and the check-ins together. The filter and search
    /// carry over.
    pub fn with_snapshot(self, snapshot: Snapshot) -> Self {
        Self {
            students: snapshot.students,
            attendance_today: snapshot.attendance_today,
            ..self
        }
    }

    pub fn with_filter(self, filter: StatusFilter) -> Self {
        Self { filter, ..self }
    }

    pub fn with_search(self, search: &str) -> Self {
        Self {
            search: search.to_string(),
            ..self
        }
    }

    pub fn index(&self) -> AttendanceIndex<'_> {
        AttendanceIndex::build(&self.attendance_today)
    }

    pub fn counts(&self) -> Counts {
        count(&self.students, &self.index())
    }

    /// The newest check-in, if any.
    pub fn most_recent(&self) -> Option<&AttendanceRecord> {
        self.attendance_today.first()
    }

    /// Compute everything a presenter needs to draw the dashboard.
    pub fn dashboard(&self, max_recent: usize) -> DashboardView<'_> {
        let index = self.index();
        let counts = count(&self.students, &index);
        let projection = project(&self.students, &index, self.filter, &self.search);
        let recent_len = self.attendance_today.len().min(max_recent);
        DashboardView {
            counts,
            projection,
            recent: &self.attendance_today[..recent_len],
            filter: self.filter,
            search: &self.search,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView<'a> {
    pub counts: Counts,
    pub projection: Projection<'a>,
    /// The latest check-ins, most recent first.
    pub recent: &'a [AttendanceRecord],
    pub filter: StatusFilter,
    pub search: &'a str,
}

/// Whether the last refresh worked, and when the last good one happened.
#[derive(Clone, PartialEq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub online: bool,
    pub last_updated: Option<String>,
}

impl ConnectionStatus {
    pub fn mark_online(&mut self, at: Timestamp) {
        self.online = true;
        self.last_updated = Some(at.time_of_day());
    }

    pub fn mark_offline(&mut self) {
        self.online = false;
    }

    pub fn label(&self) -> &'static str {
        if self.online {
            "Connected to server"
        } else {
            "Offline"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::student::StudentId;

    fn snapshot(students: &[&str], present: &[&str]) -> Snapshot {
        Snapshot {
            students: students
                .iter()
                .map(|id| Student {
                    id: StudentId::new(id),
                    full_name: format!("Student {id}"),
                    national_id: None,
                })
                .collect(),
            attendance_today: present
                .iter()
                .map(|id| AttendanceRecord {
                    student_id: StudentId::new(id),
                    full_name: format!("Student {id}"),
                    check_in_time: "09:00".to_string(),
                    device_id: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_snapshot_keeps_filter_and_search() {
        let state = ViewState::default()
            .with_filter(StatusFilter::Absent)
            .with_search("student");
        let state = state.with_snapshot(snapshot(&["a", "b"], &["a"]));
        assert_eq!(state.filter, StatusFilter::Absent);
        assert_eq!(state.search, "student");
        assert_eq!(state.students.len(), 2);
        assert_eq!(state.attendance_today.len(), 1);
    }

    #[test]
    fn test_dashboard() {
        let state = ViewState::default()
            .with_snapshot(snapshot(&["a", "b", "c"], &["c", "a"]))
            .with_filter(StatusFilter::Present);
        let view = state.dashboard(1);
        assert_eq!(
            view.counts,
            Counts {
                total: 3,
                present: 2,
                absent: 1,
                checked_in: 2,
            }
        );
        let names: Vec<&str> = view
            .projection
            .rows()
            .iter()
            .map(|row| row.student.id.as_str())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(view.recent.len(), 1);
        assert_eq!(view.recent[0].student_id, StudentId::new("c"));
        assert_eq!(state.most_recent(), Some(&view.recent[0]));
    }

    #[test]
    fn test_dashboard_json() -> crate::error::Fallible<()> {
        let state = ViewState::default().with_snapshot(snapshot(&["a"], &[]));
        let json = serde_json::to_value(state.dashboard(10))?;
        assert_eq!(json["counts"]["absent"], 1);
        assert_eq!(json["projection"]["kind"], "rows");
        assert_eq!(json["projection"]["rows"][0]["student"]["id"], "a");
        assert_eq!(json["projection"]["rows"][0]["record"], serde_json::Value::Null);
        assert_eq!(json["filter"], "all");
        Ok(())
    }

    #[test]
    fn test_connection_status() {
        let mut status = ConnectionStatus::default();
        assert!(!status.online);
        assert_eq!(status.last_updated, None);
        status.mark_online(Timestamp::now());
        assert!(status.online);
        assert!(status.last_updated.is_some());
        let stamp = status.last_updated.clone();
        status.mark_offline();
        assert_eq!(status.label(), "Offline");
        assert_eq!(status.last_updated, stamp);
    }
}
