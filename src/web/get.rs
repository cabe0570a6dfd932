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

use std::time::Instant;

use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::html;
use serde::Deserialize;

use crate::presenter::Notification;
use crate::presenter::NotificationKind;
use crate::projector::Projection;
use crate::state::ConnectionStatus;
use crate::state::DashboardView;
use crate::types::filter::StatusFilter;
use crate::types::timestamp::Timestamp;
use crate::web::state::ServerState;
use crate::web::template::page_template;

/// Every page load chooses its own filter and search.
#[derive(Deserialize, Default)]
pub struct DashboardQuery {
    pub filter: Option<StatusFilter>,
    pub q: Option<String>,
}

pub async fn get_handler(
    State(state): State<ServerState>,
    Query(query): Query<DashboardQuery>,
) -> (StatusCode, Html<String>) {
    let (view_state, status, notifications) = {
        let mutable = state.mutable.lock().unwrap();
        let notifications =
            mutable.visible_notifications(Instant::now(), state.refresh_interval);
        (mutable.state.clone(), mutable.status.clone(), notifications)
    };
    let view_state = view_state
        .with_filter(query.filter.unwrap_or_default())
        .with_search(query.q.as_deref().unwrap_or(""));
    let view = view_state.dashboard(state.max_recent);
    let body = render_dashboard(&view, &status, Timestamp::now(), &notifications);
    let page = page_template(body, state.refresh_interval.as_secs());
    (StatusCode::OK, Html(page.into_string()))
}

fn render_dashboard(
    view: &DashboardView<'_>,
    status: &ConnectionStatus,
    now: Timestamp,
    notifications: &[Notification],
) -> Markup {
    let status_class = if status.online { "online" } else { "offline" };
    html! {
        div.root {
            div.header {
                h1 { "Attendance" }
                div.clock {
                    span.date { (now.long_date()) }
                    " "
                    span.time { (now.time_of_day()) }
                }
                div.status {
                    span class=(format!("status-indicator {status_class}")) {}
                    span #status-text { (status.label()) }
                    @if let Some(at) = &status.last_updated {
                        span.last-updated { " (last updated " (at) ")" }
                    }
                }
            }
            div.stats {
                div.stat.present {
                    span #total-present { (view.counts.present) }
                    span.label { "Present" }
                }
                div.stat.absent {
                    span #total-absent { (view.counts.absent) }
                    span.label { "Absent" }
                }
            }
            form.controls action="/" method="get" {
                input type="search" name="q" value=(view.search) placeholder="Search by name or national ID";
                @for filter in StatusFilter::ALL {
                    label {
                        @if filter == view.filter {
                            input type="radio" name="filter" value=(filter.as_str()) checked;
                        } @else {
                            input type="radio" name="filter" value=(filter.as_str());
                        }
                        (filter_label(filter))
                    }
                }
                input type="submit" value="Apply";
            }
            div.columns {
                (attendance_table(&view.projection))
                (recent_list(view))
            }
            div.toasts {
                @for notification in notifications {
                    div class=(format!("toast {}", toast_class(notification))) {
                        (notification.message())
                    }
                }
            }
        }
    }
}

fn toast_class(notification: &Notification) -> &'static str {
    match notification.kind {
        NotificationKind::Arrival(_) => "success",
        NotificationKind::Info(_) => "info",
        NotificationKind::Error(_) => "error",
    }
}

fn filter_label(filter: StatusFilter) -> &'static str {
    match filter {
        StatusFilter::All => "All",
        StatusFilter::Present => "Present",
        StatusFilter::Absent => "Absent",
    }
}

fn attendance_table(projection: &Projection<'_>) -> Markup {
    html! {
        table.attendance {
            thead {
                tr {
                    th { "Status" }
                    th { "Name" }
                    th { "National ID" }
                    th { "Check-in" }
                }
            }
            tbody #student-list {
                @match projection {
                    Projection::NoStudents => {
                        tr { td.empty colspan="4" { "No students registered" } }
                    }
                    Projection::NoMatches => {
                        tr { td.empty colspan="4" { "No students match the current filters" } }
                    }
                    Projection::Rows(rows) => {
                        @for row in rows {
                            tr {
                                td {
                                    @if row.is_present() {
                                        span.badge.present { "Present" }
                                    } @else {
                                        span.badge.absent { "Absent" }
                                    }
                                }
                                td { (row.student.full_name) }
                                td { (row.student.national_id.as_deref().unwrap_or("N/A")) }
                                td.check-in {
                                    (row.record.map_or("--", |r| r.check_in_time.as_str()))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn recent_list(view: &DashboardView<'_>) -> Markup {
    html! {
        div.recent {
            h2 { "Latest check-ins" }
            @if view.recent.is_empty() {
                p.empty { "No check-ins today" }
            }
            @for record in view.recent {
                div.recent-item {
                    div {
                        div.name { (record.full_name) }
                        div.device { (record.device_label()) }
                    }
                    div.time { (record.check_in_time) }
                }
            }
        }
    }
}
