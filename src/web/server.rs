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
use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::signal::ctrl_c;
use tokio::time::sleep;

use crate::config::Config;
use crate::controller::Controller;
use crate::error::Fallible;
use crate::fetch::DataFetcher;
use crate::web::get::get_handler;
use crate::web::state::ServerState;

pub fn router(state: ServerState) -> Router {
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    app.with_state(state)
}

/// Poll the API in the background and serve the dashboard until interrupted.
pub async fn start_server(config: Config, bind: SocketAddr, open_browser: bool) -> Fallible<()> {
    config.validate()?;
    let fetcher = DataFetcher::new(&config.api_url, config.request_timeout())?;
    let state = ServerState::new(config.refresh_interval(), config.max_recent);
    let controller = Controller::new(fetcher, state.presenter());
    log::debug!("Polling {} every {}s", config.api_url, config.refresh_interval_secs);
    let polling = tokio::spawn(controller.run(config.refresh_interval(), None));

    if open_browser {
        let url = format!("http://{bind}/");
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(bind).await {
                    drop(stream);
                    break;
                }
                sleep(Duration::from_millis(1)).await;
            }
            let _ = open::that(url);
        });
    }

    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    println!("Serving the dashboard on http://{bind}/");
    let served = axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = ctrl_c().await;
        })
        .await;
    polling.abort();
    served?;
    Ok(())
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}
