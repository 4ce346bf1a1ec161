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

//! Entity identifiers and location metadata.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::archetype::ArchetypeId;
use crate::error::{EcsError, Result};

/// Entity identifier.
///
/// Ids are handed out densely in increasing order and are never reused by the
/// index that minted them, even after the entity is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id. Mostly useful for tests and diagnostics.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Entity location in archetype (archetype_id, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLocation {
    pub archetype_id: ArchetypeId,
    pub archetype_row: usize,
}

/// Sparse map from entity id to its current location.
#[derive(Debug, Default)]
pub struct EntityIndex {
    next_id: u64,
    sparse: FxHashMap<EntityId, EntityLocation>,
}

impl EntityIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut sparse = FxHashMap::default();
        sparse.reserve(capacity);
        Self { next_id: 0, sparse }
    }

    /// Mint the next id and record where it lives.
    pub fn allocate(&mut self, location: EntityLocation) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.sparse.insert(id, location);
        id
    }

    pub fn get(&self, entity: EntityId) -> Option<EntityLocation> {
        self.sparse.get(&entity).copied()
    }

    /// Location lookup that reports a missing entity as an error.
    pub fn locate(&self, entity: EntityId) -> Result<EntityLocation> {
        self.get(entity).ok_or(EcsError::EntityNotFound(entity))
    }

    pub fn set(&mut self, entity: EntityId, location: EntityLocation) {
        if let Some(slot) = self.sparse.get_mut(&entity) {
            *slot = location;
        }
    }

    /// Point an entity at a new row inside the same archetype (swap-remove fixup).
    pub fn set_row(&mut self, entity: EntityId, row: usize) {
        if let Some(slot) = self.sparse.get_mut(&entity) {
            slot.archetype_row = row;
        }
    }

    pub fn remove(&mut self, entity: EntityId) -> Option<EntityLocation> {
        self.sparse.remove(&entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.sparse.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.sparse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparse.is_empty()
    }

    /// Number of ids ever handed out, live or deleted.
    pub fn allocated(&self) -> u64 {
        self.next_id
    }
}
