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

use crate::types::attendance::AttendanceRecord;

/// Somebody new checked in since the last cycle.
#[derive(Clone, PartialEq, Debug)]
pub struct ArrivalEvent {
    pub record: AttendanceRecord,
}

/// Watches the present count across refreshes and reports increases.
///
/// Several arrivals within one interval produce a single event, which
/// refers to the most recent record only.
#[derive(Default)]
pub struct ChangeDetector {
    /// `None` until the first refresh establishes a baseline.
    previous_present_count: Option<usize>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detect(
        &mut self,
        current_present_count: usize,
        most_recent: Option<&AttendanceRecord>,
    ) -> Option<ArrivalEvent> {
        let previous = self.previous_present_count.replace(current_present_count);
        match previous {
            Some(previous) if current_present_count > previous => {
                most_recent.map(|record| ArrivalEvent {
                    record: record.clone(),
                })
            }
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn baseline(&self) -> Option<usize> {
        self.previous_present_count
    }
}
