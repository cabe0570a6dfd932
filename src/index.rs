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

use std::collections::HashMap;

use crate::types::attendance::AttendanceRecord;
use crate::types::student::StudentId;

/// Today's check-ins keyed by student. Borrowed from the records it was
/// built from, and rebuilt from scratch whenever the records change.
pub struct AttendanceIndex<'a> {
    by_student: HashMap<&'a StudentId, &'a AttendanceRecord>,
}

impl<'a> AttendanceIndex<'a> {
    /// Index the records. If a student appears more than once, the record
    /// that comes later in the sequence wins. Records without a student id
    /// are left out.
    pub fn build(records: &'a [AttendanceRecord]) -> Self {
        let mut by_student = HashMap::with_capacity(records.len());
        for record in records {
            if record.student_id.is_missing() {
                log::debug!("Skipping check-in without a student id.");
                continue;
            }
            by_student.insert(&record.student_id, record);
        }
        Self { by_student }
    }

    pub fn get(&self, id: &StudentId) -> Option<&'a AttendanceRecord> {
        self.by_student.get(id).copied()
    }

    pub fn contains(&self, id: &StudentId) -> bool {
        self.by_student.contains_key(id)
    }

    /// Number of distinct students who checked in.
    pub fn check_in_count(&self) -> usize {
        self.by_student.len()
    }
}
