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

use crate::index::AttendanceIndex;
use crate::types::attendance::AttendanceRecord;
use crate::types::filter::StatusFilter;
use crate::types::student::Student;

/// One line of the attendance table.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct Row<'a> {
    pub student: &'a Student,
    /// Today's check-in, if the student is present.
    pub record: Option<&'a AttendanceRecord>,
}

impl Row<'_> {
    pub fn is_present(&self) -> bool {
        self.record.is_some()
    }
}

/// The rows to display. The two empty cases are rendered differently.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "camelCase")]
pub enum Projection<'a> {
    /// The roster itself is empty.
    NoStudents,
    /// The roster is not empty, but nothing survived the search and filter.
    NoMatches,
    Rows(Vec<Row<'a>>),
}

impl<'a> Projection<'a> {
    #[cfg(test)]
    pub fn rows(&self) -> &[Row<'a>] {
        match self {
            Projection::Rows(rows) => rows,
            Projection::NoStudents | Projection::NoMatches => &[],
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub total: usize,
    /// Roster students with a check-in. `present + absent == total`.
    pub present: usize,
    pub absent: usize,
    /// Distinct students in today's check-ins, whether or not they are on
    /// the roster yet. This is what arrival detection watches.
    pub checked_in: usize,
}

/// Narrow the roster down to the rows to display, in roster order.
pub fn project<'a>(
    students: &'a [Student],
    index: &AttendanceIndex<'a>,
    filter: StatusFilter,
    search: &str,
) -> Projection<'a> {
    if students.is_empty() {
        return Projection::NoStudents;
    }
    let needle = search.to_lowercase();
    let rows: Vec<Row<'a>> = students
        .iter()
        .filter(|student| needle.is_empty() || student.matches(&needle))
        .map(|student| Row {
            student,
            record: index.get(&student.id),
        })
        .filter(|row| filter.admits(row.is_present()))
        .collect();
    if rows.is_empty() {
        Projection::NoMatches
    } else {
        Projection::Rows(rows)
    }
}

/// Headline numbers over the whole roster, ignoring search and filter.
pub fn count(students: &[Student], index: &AttendanceIndex<'_>) -> Counts {
    let total = students.len();
    let present = students.iter().filter(|s| index.contains(&s.id)).count();
    Counts {
        total,
        present,
        absent: total - present,
        checked_in: index.check_in_count(),
    }
}
