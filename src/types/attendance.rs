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

use serde::Deserialize;
use serde::Serialize;

use crate::types::lenient::null_as_default;
use crate::types::student::StudentId;

/// A check-in recorded today. The server sends these most recent first.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub student_id: StudentId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    /// Locale-formatted time of day, passed through verbatim.
    #[serde(default, deserialize_with = "null_as_default")]
    pub check_in_time: String,
    #[serde(default)]
    pub device_id: Option<String>,
}

impl AttendanceRecord {
    pub fn device_label(&self) -> &str {
        self.device_id.as_deref().unwrap_or("Unknown")
    }
}
