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

use std::io::IsTerminal;
use std::io::stdout;

use tokio::signal::ctrl_c;

use crate::config::Config;
use crate::controller::Controller;
use crate::error::Fallible;
use crate::fetch::DataFetcher;
use crate::input::UserInput;
use crate::input::spawn_stdin_reader;
use crate::presenter::terminal::TerminalPresenter;
use crate::types::filter::StatusFilter;

pub struct WatchOptions {
    pub filter: StatusFilter,
    pub search: Option<String>,
    pub clear_screen: bool,
}

/// Draw the dashboard in the terminal until the viewer quits.
pub async fn watch(config: Config, options: WatchOptions) -> Fallible<()> {
    config.validate()?;
    let fetcher = DataFetcher::new(&config.api_url, config.request_timeout())?;
    let out = stdout();
    let clear_screen = options.clear_screen && out.is_terminal();
    let presenter = TerminalPresenter::new(out, config.max_recent)
        .clear_screen(clear_screen)
        .sound(config.sound);
    let mut controller = Controller::new(fetcher, presenter);
    controller.apply_input(UserInput::Filter(options.filter));
    if let Some(search) = options.search {
        controller.apply_input(UserInput::Search(search));
    }

    log::debug!(
        "Polling {} every {}s",
        config.api_url,
        config.refresh_interval_secs
    );
    let input = spawn_stdin_reader();
    tokio::select! {
        _ = controller.run(config.refresh_interval(), Some(input)) => {}
        _ = ctrl_c() => {
            log::debug!("Interrupted.");
        }
    }
    Ok(())
}
