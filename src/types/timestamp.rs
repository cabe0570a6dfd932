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

use chrono::DateTime;
use chrono::Local;

/// A wall-clock instant in the local timezone, used for the dashboard clock
/// and the "last updated" stamp.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Timestamp(DateTime<Local>);

impl Timestamp {
    #[cfg(test)]
    pub fn new(ts: DateTime<Local>) -> Self {
        Self(ts)
    }

    pub fn now() -> Self {
        Self(Local::now())
    }

    /// The time of day, e.g. `09:05:31`.
    pub fn time_of_day(self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }

    /// The long-form date, e.g. `Monday, October 19, 2026`.
    pub fn long_date(self) -> String {
        self.0.format("%A, %B %-d, %Y").to_string()
    }
}
