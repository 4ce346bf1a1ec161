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

//! Error types
//!
//! Every failure is local to the call that produced it. A failed mutation
//! leaves the world exactly as it was before the call.

use std::fmt;

use crate::archetype::ArchetypeId;
use crate::component::ComponentId;
use crate::entity::EntityId;

/// ECS error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Entity id is not present in the entity index
    EntityNotFound(EntityId),

    /// Component id was never registered
    UnknownComponent(ComponentId),

    /// Tag used as a data component, data component used as a tag,
    /// or a typed handle whose element type does not match the stored column
    InvalidComponentUse {
        component: ComponentId,
        reason: &'static str,
    },

    /// Archetype id does not exist
    ArchetypeNotFound(ArchetypeId),

    /// Configured archetype cap reached
    ArchetypeLimitExceeded { limit: usize },

    /// A deferred command reported failure
    CommandFailed(String),

    /// Configuration could not be parsed
    ConfigError(String),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::EntityNotFound(entity) => write!(f, "Entity not found: {entity}"),
            EcsError::UnknownComponent(component) => {
                write!(f, "Unknown component: {component}")
            }
            EcsError::InvalidComponentUse { component, reason } => {
                write!(f, "Invalid use of component {component}: {reason}")
            }
            EcsError::ArchetypeNotFound(id) => write!(f, "Archetype not found: {id}"),
            EcsError::ArchetypeLimitExceeded { limit } => {
                write!(f, "Archetype limit exceeded ({limit})")
            }
            EcsError::CommandFailed(msg) => write!(f, "Command failed: {msg}"),
            EcsError::ConfigError(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<serde_json::Error> for EcsError {
    fn from(err: serde_json::Error) -> Self {
        EcsError::ConfigError(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
