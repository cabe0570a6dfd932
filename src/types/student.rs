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

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::types::lenient::null_as_default;

/// A student's identifier. The API may send it as a number or a string, so
/// it is normalized to its textual form.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct StudentId(String);

impl StudentId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// The API sent no usable id.
    pub fn is_missing(&self) -> bool {
        self.0.trim().is_empty()
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StudentId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for StudentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StudentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Integer(i64),
            Float(f64),
            Text(String),
        }

        let id = match Raw::deserialize(deserializer)? {
            Raw::Integer(n) => n.to_string(),
            Raw::Float(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        Ok(StudentId(id))
    }
}

/// A student on the roster.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: StudentId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default)]
    pub national_id: Option<String>,
}

impl Student {
    /// Whether the search needle (already lowercased) occurs in the student's
    /// name or national id.
    pub fn matches(&self, needle: &str) -> bool {
        if self.full_name.to_lowercase().contains(needle) {
            return true;
        }
        match &self.national_id {
            Some(national_id) => national_id.to_lowercase().contains(needle),
            None => false,
        }
    }
}
