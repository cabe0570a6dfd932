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

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_MAX_RECENT: usize = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const CONFIG_FILE_NAME: &str = "rollcall.toml";

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base address of the attendance API.
    pub api_url: String,
    pub refresh_interval_secs: u64,
    /// How many of the latest check-ins to list.
    pub max_recent: usize,
    pub request_timeout_secs: u64,
    /// Ring the bell on new check-ins.
    pub sound: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            max_recent: DEFAULT_MAX_RECENT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            sound: true,
        }
    }
}

impl Config {
    /// Load the configuration. An explicit path must exist; otherwise
    /// `rollcall.toml` in the working directory is used if present, and
    /// the defaults if not.
    pub fn load(path: Option<PathBuf>) -> Fallible<Self> {
        let path = match path {
            Some(path) => {
                if !path.exists() {
                    return fail("configuration file does not exist.");
                }
                path
            }
            None => {
                let path = PathBuf::from(CONFIG_FILE_NAME);
                if !path.exists() {
                    log::debug!("No configuration file, using defaults.");
                    return Ok(Self::default());
                }
                path
            }
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Fallible<Self> {
        log::debug!("Loading configuration from {}", path.display());
        let content = read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Fallible<()> {
        if self.api_url.trim().is_empty() {
            return fail("api_url must not be empty.");
        }
        if self.refresh_interval_secs == 0 {
            return fail("refresh_interval_secs must be positive.");
        }
        if self.request_timeout_secs == 0 {
            return fail("request_timeout_secs must be positive.");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(self, api_url: Option<String>, refresh_interval_secs: Option<u64>) -> Self {
        Self {
            api_url: api_url.unwrap_or(self.api_url),
            refresh_interval_secs: refresh_interval_secs.unwrap_or(self.refresh_interval_secs),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.refresh_interval(), Duration::from_secs(10));
        assert_eq!(config.max_recent, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("rollcall.toml");
        write(&path, "api_url = \"http://10.0.0.5:8000\"\nmax_recent = 5\n")?;
        let config = Config::load(Some(path))?;
        assert_eq!(config.api_url, "http://10.0.0.5:8000");
        assert_eq!(config.max_recent, 5);
        assert_eq!(config.refresh_interval_secs, DEFAULT_REFRESH_INTERVAL_SECS);
        Ok(())
    }

    #[test]
    fn test_unknown_key() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("rollcall.toml");
        write(&path, "refresh = 3\n")?;
        assert!(Config::from_file(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_zero_interval() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("rollcall.toml");
        write(&path, "refresh_interval_secs = 0\n")?;
        let err = Config::from_file(&path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "error: refresh_interval_secs must be positive."
        );
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load(Some(PathBuf::from("./derpherp.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(Some("http://api".to_string()), None);
        assert_eq!(config.api_url, "http://api");
        assert_eq!(config.refresh_interval_secs, DEFAULT_REFRESH_INTERVAL_SECS);
        let config = config.with_overrides(None, Some(2));
        assert_eq!(config.api_url, "http://api");
        assert_eq!(config.refresh_interval_secs, 2);
    }
}
