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

use std::fmt::Display;
use std::fmt::Formatter;
use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::config::Config;
use crate::error::Fallible;
use crate::fetch::DataFetcher;
use crate::presenter::terminal::write_dashboard;
use crate::state::ConnectionStatus;
use crate::state::DashboardView;
use crate::state::ViewState;
use crate::types::filter::StatusFilter;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone, Copy)]
pub enum SnapshotFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for SnapshotFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotFormat::Text => write!(f, "text"),
            SnapshotFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotOutput<'a> {
    status: &'a ConnectionStatus,
    #[serde(flatten)]
    dashboard: DashboardView<'a>,
}

/// Fetch once and print the dashboard.
pub async fn print_snapshot(
    config: &Config,
    filter: StatusFilter,
    search: Option<String>,
    format: SnapshotFormat,
) -> Fallible<()> {
    config.validate()?;
    let fetcher = DataFetcher::new(&config.api_url, config.request_timeout())?;
    let snapshot = fetcher.refresh().await?;
    let state = ViewState::default()
        .with_snapshot(snapshot)
        .with_filter(filter)
        .with_search(search.as_deref().unwrap_or(""));
    let mut status = ConnectionStatus::default();
    status.mark_online(Timestamp::now());
    let mut out = std::io::stdout();
    write_snapshot(&mut out, &state, &status, config.max_recent, format)
}

fn write_snapshot<W: Write>(
    out: &mut W,
    state: &ViewState,
    status: &ConnectionStatus,
    max_recent: usize,
    format: SnapshotFormat,
) -> Fallible<()> {
    let dashboard = state.dashboard(max_recent);
    match format {
        SnapshotFormat::Text => {
            write_dashboard(out, &dashboard, status, Timestamp::now(), &[])?;
        }
        SnapshotFormat::Json => {
            let output = SnapshotOutput { status, dashboard };
            let json = serde_json::to_string_pretty(&output)?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}
