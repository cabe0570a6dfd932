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

//! A stand-in for the attendance API, served on a free local port.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::time::sleep;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::fetch::ATTENDANCE_PATH;
use crate::fetch::STUDENTS_PATH;

type Reply = (StatusCode, [(HeaderName, &'static str); 1], String);

#[derive(Clone)]
struct Endpoint {
    status: StatusCode,
    body: String,
}

struct Responses {
    students: Endpoint,
    attendance: Endpoint,
    /// How long the roster endpoint takes to answer.
    delay: Duration,
}

/// Roster requests seen so far.
#[derive(Default)]
struct Traffic {
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[derive(Clone)]
struct Shared {
    responses: Arc<Mutex<Responses>>,
    traffic: Arc<Traffic>,
}

#[derive(Clone)]
pub struct MockApi {
    port: u16,
    shared: Shared,
}

impl MockApi {
    /// Start serving an empty roster with no check-ins.
    pub async fn start() -> Fallible<Self> {
        let port = portpicker::pick_unused_port()
            .ok_or_else(|| ErrorReport::new("no free port"))?;
        let shared = Shared {
            responses: Arc::new(Mutex::new(Responses {
                students: Endpoint {
                    status: StatusCode::OK,
                    body: r#"{"students": []}"#.to_string(),
                },
                attendance: Endpoint {
                    status: StatusCode::OK,
                    body: r#"{"attendanceToday": []}"#.to_string(),
                },
                delay: Duration::ZERO,
            })),
            traffic: Arc::new(Traffic::default()),
        };
        let app = Router::new();
        let app = app.route(STUDENTS_PATH, get(students));
        let app = app.route(ATTENDANCE_PATH, get(attendance));
        let app = app.with_state(shared.clone());
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self { port, shared })
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn set_students(&self, body: &str) {
        let mut responses = self.shared.responses.lock().unwrap();
        responses.students.body = body.to_string();
    }

    pub fn set_attendance(&self, body: &str) {
        let mut responses = self.shared.responses.lock().unwrap();
        responses.attendance.body = body.to_string();
    }

    pub fn set_students_status(&self, status: StatusCode) {
        let mut responses = self.shared.responses.lock().unwrap();
        responses.students.status = status;
    }

    pub fn set_attendance_status(&self, status: StatusCode) {
        let mut responses = self.shared.responses.lock().unwrap();
        responses.attendance.status = status;
    }

    /// Make the roster endpoint slow.
    pub fn set_delay(&self, delay: Duration) {
        let mut responses = self.shared.responses.lock().unwrap();
        responses.delay = delay;
    }

    /// Roster requests received so far.
    pub fn requests(&self) -> usize {
        self.shared.traffic.requests.load(Ordering::SeqCst)
    }

    /// The most roster requests that were ever being served at once.
    pub fn max_in_flight(&self) -> usize {
        self.shared.traffic.max_in_flight.load(Ordering::SeqCst)
    }
}

fn reply(endpoint: &Endpoint) -> Reply {
    (
        endpoint.status,
        [(CONTENT_TYPE, "application/json")],
        endpoint.body.clone(),
    )
}

async fn students(State(shared): State<Shared>) -> Reply {
    let (endpoint, delay) = {
        let responses = shared.responses.lock().unwrap();
        (responses.students.clone(), responses.delay)
    };
    let traffic = &shared.traffic;
    traffic.requests.fetch_add(1, Ordering::SeqCst);
    let serving = traffic.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    traffic.max_in_flight.fetch_max(serving, Ordering::SeqCst);
    sleep(delay).await;
    traffic.in_flight.fetch_sub(1, Ordering::SeqCst);
    reply(&endpoint)
}

async fn attendance(State(shared): State<Shared>) -> Reply {
    let responses = shared.responses.lock().unwrap();
    reply(&responses.attendance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_api_serves_defaults() -> Fallible<()> {
        let api = MockApi::start().await?;
        let response = reqwest::get(format!("{}{STUDENTS_PATH}", api.url())).await?;
        assert!(response.status().is_success());
        assert_eq!(response.text().await?, r#"{"students": []}"#);
        assert_eq!(api.requests(), 1);
        assert_eq!(api.max_in_flight(), 1);
        Ok(())
    }
}
