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

//! Deferred world mutations
//!
//! Queries hold a shared borrow of the world, so structural changes found
//! during a pass are recorded here and applied once the pass is over.

use crate::component::{Component, ComponentData, ComponentId};
use crate::entity::EntityId;
use crate::error::{EcsError, Result};
use crate::world::World;

/// Type alias for world mutation closures
pub type CommandClosure = Box<dyn FnOnce(&mut World) -> Result<()> + Send>;

/// Deferred command for world mutations
pub enum Command {
    /// Create an entity and hand it to the closure
    Create(Box<dyn FnOnce(&mut World, EntityId) -> Result<()> + Send>),

    Delete(EntityId),

    /// Attach a component without a value
    Add(EntityId, ComponentId),

    Remove(EntityId, ComponentId),

    /// Custom world mutation (also carries typed `set`s)
    Custom(CommandClosure),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Create(_) => write!(f, "Create(...)"),
            Command::Delete(e) => f.debug_tuple("Delete").field(e).finish(),
            Command::Add(e, c) => f.debug_tuple("Add").field(e).field(c).finish(),
            Command::Remove(e, c) => f.debug_tuple("Remove").field(e).field(c).finish(),
            Command::Custom(_) => write!(f, "Custom(...)"),
        }
    }
}

/// Command buffer for deferred operations
///
/// Commands run in the order they were queued. The first failure stops the
/// flush; the remaining commands are dropped.
#[derive(Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    /// Queue creation of an entity, then `init` on it
    pub fn create<F>(&mut self, init: F)
    where
        F: FnOnce(&mut World, EntityId) -> Result<()> + Send + 'static,
    {
        self.commands.push(Command::Create(Box::new(init)));
    }

    pub fn delete(&mut self, entity: EntityId) {
        self.commands.push(Command::Delete(entity));
    }

    pub fn add(&mut self, entity: EntityId, component: impl Into<ComponentId>) {
        self.commands.push(Command::Add(entity, component.into()));
    }

    /// Queue a typed write
    pub fn set<T: ComponentData>(&mut self, entity: EntityId, component: Component<T>, value: T) {
        self.custom(move |world| world.set(entity, component, value));
    }

    pub fn remove(&mut self, entity: EntityId, component: impl Into<ComponentId>) {
        self.commands.push(Command::Remove(entity, component.into()));
    }

    /// Queue a custom world mutation
    pub fn custom<F>(&mut self, f: F)
    where
        F: FnOnce(&mut World) -> Result<()> + Send + 'static,
    {
        self.commands.push(Command::Custom(Box::new(f)));
    }

    /// Apply all commands to the world and clear the buffer
    pub fn apply(&mut self, world: &mut World) -> Result<()> {
        for command in self.commands.drain(..) {
            match command {
                Command::Create(init) => {
                    let entity = world.create();
                    init(world, entity)?;
                }
                Command::Delete(entity) => world.delete(entity)?,
                Command::Add(entity, component) => world.add(entity, component)?,
                Command::Remove(entity, component) => world.remove(entity, component)?,
                Command::Custom(f) => f(world).map_err(|err| match err {
                    EcsError::CommandFailed(_) => err,
                    other => EcsError::CommandFailed(other.to_string()),
                })?,
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}
