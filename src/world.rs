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

//! World: central entity and archetype storage
//!
//! # Iteration and mutation
//!
//! A query borrows the world immutably while every mutating method takes
//! `&mut self`, so the compiler rejects mutation while a query is being
//! consumed. Swap-remove would otherwise relocate rows the iterator has not
//! reached yet. Collect what you need first, or queue the changes in a
//! [`CommandBuffer`](crate::command::CommandBuffer):
//!
//! ```compile_fail
//! use cell_ecs::World;
//!
//! let mut world = World::new();
//! let mass = world.component::<f32>();
//! let e = world.create();
//! world.set(e, mass, 1.0).unwrap();
//!
//! for (entity, _) in world.query(mass).iter() {
//!     world.delete(entity).unwrap();
//! }
//! ```
//!
//! ```
//! use cell_ecs::World;
//!
//! let mut world = World::new();
//! let mass = world.component::<f32>();
//! let e = world.create();
//! world.set(e, mass, 1.0).unwrap();
//!
//! let doomed = world.query(mass).entities();
//! for entity in doomed {
//!     world.delete(entity).unwrap();
//! }
//! assert_eq!(world.entity_count(), 0);
//! ```

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::archetype::{Archetype, ArchetypeId, TypeSignature};
use crate::component::{
    Component, ComponentData, ComponentId, ComponentRecord, ComponentRegistry, Tag,
};
use crate::config::WorldConfig;
use crate::entity::{EntityId, EntityIndex, EntityLocation};
use crate::error::{EcsError, Result};
use crate::graph::ArchetypeGraph;
use crate::query::{QueryBuilder, QueryData};

/// What an entity holds for one data component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentSlot<'a, T> {
    /// Component not attached
    Absent,
    /// Attached with `add` but never `set`
    Uninitialized,
    Value(&'a T),
}

impl<'a, T> ComponentSlot<'a, T> {
    pub fn value(self) -> Option<&'a T> {
        match self {
            ComponentSlot::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, ComponentSlot::Absent)
    }
}

/// Central ECS world
///
/// Owns the component registry, the entity index and every archetype.
pub struct World {
    registry: ComponentRegistry,
    entities: EntityIndex,
    graph: ArchetypeGraph,
    config: WorldConfig,
}

impl World {
    /// Create a new, empty world with an empty registry.
    pub fn new() -> Self {
        Self::with_registry(ComponentRegistry::new())
    }

    /// Create a world over components registered ahead of time.
    pub fn with_registry(registry: ComponentRegistry) -> Self {
        Self::with_config(registry, WorldConfig::default())
    }

    pub fn with_config(registry: ComponentRegistry, config: WorldConfig) -> Self {
        let graph = ArchetypeGraph::new(&registry, &config);
        Self {
            entities: EntityIndex::with_capacity(config.initial_entity_capacity),
            registry,
            graph,
            config,
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Register a data component after construction
    pub fn component<T: ComponentData>(&mut self) -> Component<T> {
        let component = self.registry.component::<T>();
        self.graph.sync_records(&self.registry);
        component
    }

    /// Register a tag after construction
    pub fn tag(&mut self) -> Tag {
        let tag = self.registry.tag();
        self.graph.sync_records(&self.registry);
        tag
    }

    /// Create an entity with no components
    pub fn create(&mut self) -> EntityId {
        let root = self.graph.root();
        let id = self.entities.allocate(EntityLocation {
            archetype_id: root,
            archetype_row: usize::MAX,
        });

        #[cfg(feature = "profiling")]
        let span = info_span!("world.create", entity = id.raw());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        if let Some(archetype) = self.graph.get_mut(root) {
            let row = archetype.allocate_row(id);
            self.entities.set_row(id, row);
        }

        id
    }

    /// Remove an entity and all of its components
    pub fn delete(&mut self, entity: EntityId) -> Result<()> {
        let location = self.entities.locate(entity)?;

        #[cfg(feature = "profiling")]
        let span = info_span!(
            "world.delete",
            entity = entity.raw(),
            archetype = location.archetype_id.raw()
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let archetype = self
            .graph
            .get_mut(location.archetype_id)
            .ok_or(EcsError::ArchetypeNotFound(location.archetype_id))?;

        if let Some(swapped) = archetype.remove_row(location.archetype_row) {
            self.entities.set_row(swapped, location.archetype_row);
        }
        self.entities.remove(entity);
        Ok(())
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(entity)
    }

    /// Check if entity has a component. False for unknown entities.
    pub fn has(&self, entity: EntityId, component: impl Into<ComponentId>) -> bool {
        let component = component.into();
        self.archetype_of(entity)
            .is_some_and(|archetype| archetype.has(component))
    }

    /// Attach a component without a value.
    ///
    /// Tags are complete after this call. A data component reads back as
    /// [`ComponentSlot::Uninitialized`] until [`World::set`] writes it.
    pub fn add(&mut self, entity: EntityId, component: impl Into<ComponentId>) -> Result<()> {
        let component = component.into();
        let location = self.entities.locate(entity)?;
        if self.location_has(location, component) {
            return Ok(());
        }
        if !self.registry.is_registered(component) {
            return Err(EcsError::UnknownComponent(component));
        }

        let to = self.graph.transition(
            location.archetype_id,
            component,
            true,
            &self.registry,
        )?;
        self.move_entity(entity, location, to)?;
        Ok(())
    }

    /// Write a data component, attaching it first if needed.
    ///
    /// Only [`Component`] handles carry a value type, so a tag cannot be set:
    ///
    /// ```compile_fail
    /// use cell_ecs::World;
    ///
    /// let mut world = World::new();
    /// let food = world.tag();
    /// let e = world.create();
    /// world.set(e, food, 1.0).unwrap();
    /// ```
    pub fn set<T: ComponentData>(
        &mut self,
        entity: EntityId,
        component: Component<T>,
        value: T,
    ) -> Result<()> {
        let mut location = self.entities.locate(entity)?;
        self.check_element_type::<T>(component.id())?;

        if !self.location_has(location, component.id()) {
            let to = self.graph.transition(
                location.archetype_id,
                component.id(),
                true,
                &self.registry,
            )?;
            location = self.move_entity(entity, location, to)?;
        }

        let column = self
            .graph
            .get_mut(location.archetype_id)
            .and_then(|archetype| archetype.column_mut(component.id()))
            .and_then(|column| column.as_typed_mut::<T>())
            .ok_or(EcsError::InvalidComponentUse {
                component: component.id(),
                reason: "column does not hold this element type",
            })?;
        column.set(location.archetype_row, value);
        Ok(())
    }

    /// Get a component value.
    ///
    /// `None` if the entity is unknown, the component is absent, or it was
    /// added but never set.
    pub fn get<T: ComponentData>(&self, entity: EntityId, component: Component<T>) -> Option<&T> {
        let location = self.entities.get(entity)?;
        self.graph
            .get(location.archetype_id)?
            .column(component.id())?
            .as_typed::<T>()?
            .get(location.archetype_row)
    }

    /// Get a mutable component value, writing in place without migration
    pub fn get_mut<T: ComponentData>(
        &mut self,
        entity: EntityId,
        component: Component<T>,
    ) -> Option<&mut T> {
        let location = self.entities.get(entity)?;
        self.graph
            .get_mut(location.archetype_id)?
            .column_mut(component.id())?
            .as_typed_mut::<T>()?
            .get_mut(location.archetype_row)
    }

    /// Distinguish absent, uninitialized and set components.
    pub fn slot<T: ComponentData>(
        &self,
        entity: EntityId,
        component: Component<T>,
    ) -> Result<ComponentSlot<'_, T>> {
        let location = self.entities.locate(entity)?;
        self.check_element_type::<T>(component.id())?;

        let archetype = self
            .graph
            .get(location.archetype_id)
            .ok_or(EcsError::ArchetypeNotFound(location.archetype_id))?;
        let Some(column) = archetype.column(component.id()) else {
            return Ok(ComponentSlot::Absent);
        };
        let typed = column.as_typed::<T>().ok_or(EcsError::InvalidComponentUse {
            component: component.id(),
            reason: "column does not hold this element type",
        })?;

        Ok(match typed.get(location.archetype_row) {
            Some(value) => ComponentSlot::Value(value),
            None => ComponentSlot::Uninitialized,
        })
    }

    /// Detach a component. No-op if absent.
    pub fn remove(&mut self, entity: EntityId, component: impl Into<ComponentId>) -> Result<()> {
        let component = component.into();
        let location = self.entities.locate(entity)?;
        if !self.location_has(location, component) {
            return Ok(());
        }

        let to = self.graph.transition(
            location.archetype_id,
            component,
            false,
            &self.registry,
        )?;
        self.move_entity(entity, location, to)?;
        Ok(())
    }

    /// Start a query projecting `data`
    pub fn query<'w, Q: QueryData<'w>>(&'w self, data: Q) -> QueryBuilder<'w, Q> {
        QueryBuilder::new(self, data)
    }

    /// Get entity location
    pub fn location(&self, entity: EntityId) -> Option<EntityLocation> {
        self.entities.get(entity)
    }

    pub fn archetype_of(&self, entity: EntityId) -> Option<&Archetype> {
        let location = self.entities.get(entity)?;
        self.graph.get(location.archetype_id)
    }

    pub fn signature_of(&self, entity: EntityId) -> Option<&TypeSignature> {
        self.archetype_of(entity).map(Archetype::signature)
    }

    /// Get archetype by ID
    pub fn archetype(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.graph.get(id)
    }

    /// Get all archetypes
    pub fn archetypes(&self) -> &[Archetype] {
        self.graph.archetypes()
    }

    pub fn archetype_count(&self) -> usize {
        self.graph.len()
    }

    /// Archetype holding exactly `signature`, if one was ever created
    pub fn find_archetype(&self, signature: &TypeSignature) -> Option<ArchetypeId> {
        self.graph.lookup(signature)
    }

    pub fn component_record(&self, component: impl Into<ComponentId>) -> Option<&ComponentRecord> {
        self.graph.record(component.into())
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub(crate) fn graph(&self) -> &ArchetypeGraph {
        &self.graph
    }

    fn location_has(&self, location: EntityLocation, component: ComponentId) -> bool {
        self.graph
            .get(location.archetype_id)
            .is_some_and(|archetype| archetype.has(component))
    }

    fn check_element_type<T: ComponentData>(&self, component: ComponentId) -> Result<()> {
        let info = self
            .registry
            .info(component)
            .ok_or(EcsError::UnknownComponent(component))?;
        if info.is_tag() {
            return Err(EcsError::InvalidComponentUse {
                component,
                reason: "tags carry no value",
            });
        }
        if info.element_type() != Some(std::any::TypeId::of::<T>()) {
            return Err(EcsError::InvalidComponentUse {
                component,
                reason: "element type does not match registration",
            });
        }
        Ok(())
    }

    /// Internal: Move entity from one archetype to another
    fn move_entity(
        &mut self,
        entity: EntityId,
        from: EntityLocation,
        to: ArchetypeId,
    ) -> Result<EntityLocation> {
        if from.archetype_id == to {
            return Ok(from);
        }

        #[cfg(feature = "profiling")]
        let span = info_span!(
            "world.migrate",
            entity = entity.raw(),
            from = from.archetype_id.raw(),
            to = to.raw()
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let (source, dest) = self
            .graph
            .pair_mut(from.archetype_id, to)
            .ok_or(EcsError::ArchetypeNotFound(to))?;
        let (dest_row, swapped) = source
            .move_row_into(from.archetype_row, dest)
            .ok_or(EcsError::EntityNotFound(entity))?;

        if let Some(swapped) = swapped {
            self.entities.set_row(swapped, from.archetype_row);
        }

        let location = EntityLocation {
            archetype_id: to,
            archetype_row: dest_row,
        };
        self.entities.set(entity, location);
        Ok(location)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
