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

use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::io::stdin;
use tokio::sync::mpsc::Receiver;
use tokio::sync::mpsc::channel;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::filter::StatusFilter;

pub const HELP: &str = "Commands: filter <all|present|absent>, search [text], clear, refresh, quit";

/// Something the viewer asked for.
#[derive(Clone, PartialEq, Debug)]
pub enum UserInput {
    Filter(StatusFilter),
    /// Empty text clears the search.
    Search(String),
    /// Reset both filter and search.
    Clear,
    Refresh,
    Help,
    Quit,
}

pub fn parse_input(line: &str) -> Fallible<UserInput> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    match command.to_lowercase().as_str() {
        "filter" | "f" => {
            if rest.is_empty() {
                return fail("usage: filter <all|present|absent>");
            }
            Ok(UserInput::Filter(rest.parse()?))
        }
        "search" | "s" | "/" => Ok(UserInput::Search(rest.to_string())),
        "clear" => Ok(UserInput::Clear),
        "refresh" | "r" => Ok(UserInput::Refresh),
        "help" | "h" | "?" => Ok(UserInput::Help),
        "quit" | "q" | "exit" => Ok(UserInput::Quit),
        "" => fail("empty command"),
        other => Err(ErrorReport::new(&format!("unknown command: {other}"))),
    }
}

/// Read commands from standard input, one per line, until it closes.
pub fn spawn_stdin_reader() -> Receiver<UserInput> {
    let (tx, rx) = channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match parse_input(&line) {
                        Ok(input) => {
                            if tx.send(input).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            log::warn!("{e}");
                            eprintln!("{e}. {HELP}");
                        }
                    }
                }
                Ok(None) => {
                    log::debug!("Standard input closed.");
                    break;
                }
                Err(e) => {
                    log::error!("Failed to read standard input: {e}");
                    break;
                }
            }
        }
    });
    rx
}
