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

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;
use clap::Parser;

use crate::cmd::snapshot::SnapshotFormat;
use crate::cmd::snapshot::print_snapshot;
use crate::cmd::watch::WatchOptions;
use crate::cmd::watch::watch;
use crate::config::Config;
use crate::error::Fallible;
use crate::types::filter::StatusFilter;
use crate::web::server::start_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Show the live dashboard in the terminal.
    Watch {
        #[command(flatten)]
        api: ApiArgs,
        /// Initial status filter.
        #[arg(long, default_value_t = StatusFilter::All)]
        filter: StatusFilter,
        /// Initial search text.
        #[arg(long)]
        search: Option<String>,
        /// Don't clear the screen between frames.
        #[arg(long)]
        no_clear: bool,
        /// Don't ring the bell on new check-ins.
        #[arg(long)]
        no_sound: bool,
    },
    /// Serve the live dashboard over HTTP.
    Serve {
        #[command(flatten)]
        api: ApiArgs,
        /// Address to serve the dashboard on.
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,
        /// Open the dashboard in the browser.
        #[arg(long)]
        open: bool,
    },
    /// Fetch once and print the dashboard.
    Snapshot {
        #[command(flatten)]
        api: ApiArgs,
        #[arg(long, default_value_t = StatusFilter::All)]
        filter: StatusFilter,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = SnapshotFormat::Text)]
        format: SnapshotFormat,
    },
}

#[derive(Args)]
struct ApiArgs {
    /// Path to the configuration file. Defaults to `rollcall.toml` in the
    /// working directory, if present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base address of the attendance API.
    #[arg(long)]
    api_url: Option<String>,
    /// Seconds between refreshes.
    #[arg(long)]
    interval: Option<u64>,
}

impl ApiArgs {
    fn load(self) -> Fallible<Config> {
        let config = Config::load(self.config)?;
        Ok(config.with_overrides(self.api_url, self.interval))
    }
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Watch {
            api,
            filter,
            search,
            no_clear,
            no_sound,
        } => {
            let mut config = api.load()?;
            if no_sound {
                config.sound = false;
            }
            let options = WatchOptions {
                filter,
                search,
                clear_screen: !no_clear,
            };
            watch(config, options).await
        }
        Command::Serve { api, bind, open } => {
            let config = api.load()?;
            let bind: SocketAddr = bind.parse()?;
            start_server(config, bind, open).await
        }
        Command::Snapshot {
            api,
            filter,
            search,
            format,
        } => {
            let config = api.load()?;
            print_snapshot(&config, filter, search, format).await
        }
    }
}
