// Copyright 2024 Saptak Santra
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

//! World sizing and limits

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// World construction settings
///
/// Every field has a default, so a partial JSON document is enough:
/// ```
/// use cell_ecs::WorldConfig;
///
/// let config = WorldConfig::from_json_str(r#"{ "max_archetypes": 512 }"#).unwrap();
/// assert_eq!(config.max_archetypes, 512);
/// assert_eq!(config.row_reserve, 128);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Archetype table capacity reserved up front
    pub initial_archetype_capacity: usize,

    /// Entity index capacity reserved up front
    pub initial_entity_capacity: usize,

    /// Rows reserved in every newly created archetype
    pub row_reserve: usize,

    /// Hard cap on distinct archetypes
    pub max_archetypes: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_archetype_capacity: 64,
            initial_entity_capacity: 1024,
            row_reserve: 128,
            max_archetypes: 10_000,
        }
    }
}

impl WorldConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
