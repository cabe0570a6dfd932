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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::Fallible;
use crate::types::attendance::AttendanceRecord;
use crate::types::student::Student;

pub const STUDENTS_PATH: &str = "/api/students";
pub const ATTENDANCE_PATH: &str = "/api/attendance/today";

/// Both resources from one successful refresh.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Snapshot {
    pub students: Vec<Student>,
    pub attendance_today: Vec<AttendanceRecord>,
}

#[derive(Deserialize)]
struct StudentsBody {
    #[serde(default)]
    students: Option<Vec<Student>>,
}

#[derive(Deserialize)]
struct AttendanceBody {
    #[serde(default, rename = "attendanceToday")]
    attendance_today: Option<Vec<AttendanceRecord>>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum FetchCause {
    /// The request never produced a response.
    Network(String),
    /// The server answered with a non-success status.
    HttpStatus(u16),
    /// The body was not the JSON we expected.
    Parse(String),
}

#[derive(Clone, PartialEq, Debug)]
pub struct FetchError {
    pub endpoint: &'static str,
    pub cause: FetchCause,
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            FetchCause::Network(msg) => write!(f, "GET {}: network error: {msg}", self.endpoint),
            FetchCause::HttpStatus(code) => write!(f, "GET {}: HTTP status {code}", self.endpoint),
            FetchCause::Parse(msg) => write!(f, "GET {}: invalid JSON: {msg}", self.endpoint),
        }
    }
}

impl Error for FetchError {}

/// Reads the roster and today's attendance from the attendance API.
pub struct DataFetcher {
    client: Client,
    base_url: String,
}

impl DataFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Fallible<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch both resources concurrently. Fails if either request fails.
    pub async fn refresh(&self) -> Result<Snapshot, FetchError> {
        let (students, attendance) = tokio::join!(
            self.get_json::<StudentsBody>(STUDENTS_PATH),
            self.get_json::<AttendanceBody>(ATTENDANCE_PATH),
        );
        let students = students?.students.unwrap_or_default();
        let attendance_today = attendance?.attendance_today.unwrap_or_default();
        log::debug!(
            "Fetched {} students and {} check-ins.",
            students.len(),
            attendance_today.len()
        );
        Ok(Snapshot {
            students,
            attendance_today,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, FetchError> {
        let url = format!("{}{endpoint}", self.base_url);
        let fail = |cause| FetchError { endpoint, cause };
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fail(FetchCause::Network(e.to_string())))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fail(FetchCause::HttpStatus(status.as_u16())));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| fail(FetchCause::Network(e.to_string())))?;
        serde_json::from_slice(&body).map_err(|e| fail(FetchCause::Parse(e.to_string())))
    }
}
