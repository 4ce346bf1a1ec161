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

use serde::Serialize;

use crate::archetype::ArchetypeId;
use crate::component::ComponentId;
use crate::entity::EntityId;
use crate::error::Result;
use crate::world::World;

/// World inspector for debugging
pub struct WorldInspector;

impl WorldInspector {
    pub fn entity_count(world: &World) -> usize {
        world.entity_count()
    }

    /// Get archetype summary
    pub fn archetype_summary(world: &World) -> Vec<ArchetypeInfo> {
        world
            .archetypes()
            .iter()
            .map(|archetype| ArchetypeInfo {
                id: archetype.id(),
                key: archetype.signature().key(),
                components: archetype
                    .signature()
                    .ids()
                    .iter()
                    .map(|&id| ComponentInfoView::new(world, id))
                    .collect(),
                entity_count: archetype.len(),
            })
            .collect()
    }

    pub fn summary(world: &World) -> WorldSummary {
        WorldSummary {
            entity_count: world.entity_count(),
            archetype_count: world.archetype_count(),
            component_count: world.registry().len(),
            archetypes: Self::archetype_summary(world),
        }
    }

    /// Pretty JSON dump of [`WorldInspector::summary`]
    pub fn to_json(world: &World) -> Result<String> {
        Ok(serde_json::to_string_pretty(&Self::summary(world))?)
    }

    /// Where an entity lives and what it holds; `None` if unknown
    pub fn entity(world: &World, entity: EntityId) -> Option<EntityInfo> {
        let location = world.location(entity)?;
        let archetype = world.archetype(location.archetype_id)?;
        Some(EntityInfo {
            entity,
            archetype: location.archetype_id,
            row: location.archetype_row,
            components: archetype
                .signature()
                .ids()
                .iter()
                .map(|&id| ComponentInfoView::new(world, id))
                .collect(),
        })
    }

    /// Print world summary to console
    pub fn print_summary(world: &World) {
        println!("=== World Summary ===");
        println!("Entities: {}", Self::entity_count(world));
        println!("Archetypes: {}", world.archetype_count());

        println!("\n=== Archetypes ===");
        for info in Self::archetype_summary(world) {
            println!(
                "Archetype {} [{}]: {} entities",
                info.id, info.key, info.entity_count
            );
        }
    }

    /// Print entity details
    pub fn print_entity(world: &World, entity: EntityId) {
        match Self::entity(world, entity) {
            Some(info) => {
                println!("=== Entity {entity} ===");
                println!("Archetype: {}", info.archetype);
                println!("Row: {}", info.row);
                for component in info.components {
                    println!("  {} ({})", component.id, component.type_name);
                }
            }
            None => println!("Entity {entity} not found"),
        }
    }
}

/// Component as shown by the inspector
#[derive(Clone, Debug, Serialize)]
pub struct ComponentInfoView {
    pub id: ComponentId,
    pub type_name: &'static str,
    pub is_tag: bool,
}

impl ComponentInfoView {
    fn new(world: &World, id: ComponentId) -> Self {
        let info = world.registry().info(id);
        Self {
            id,
            type_name: info.map_or("unregistered", |info| info.type_name()),
            is_tag: info.is_some_and(|info| info.is_tag()),
        }
    }
}

/// Archetype information for debugging
#[derive(Clone, Debug, Serialize)]
pub struct ArchetypeInfo {
    pub id: ArchetypeId,
    /// Canonical signature key, ids joined with `_`
    pub key: String,
    pub components: Vec<ComponentInfoView>,
    pub entity_count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct EntityInfo {
    pub entity: EntityId,
    pub archetype: ArchetypeId,
    pub row: usize,
    pub components: Vec<ComponentInfoView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct WorldSummary {
    pub entity_count: usize,
    pub archetype_count: usize,
    pub component_count: usize,
    pub archetypes: Vec<ArchetypeInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archetype_summary() {
        let mut world = World::new();
        let food = world.tag();
        let mass = world.component::<f32>();
        let e = world.create();
        world.add(e, food).unwrap();
        world.set(e, mass, 1.0).unwrap();

        let summary = WorldInspector::summary(&world);
        assert_eq!(summary.entity_count, 1);
        assert_eq!(summary.component_count, 2);
        // root, {food}, {food, mass}
        assert_eq!(summary.archetype_count, 3);

        let last = summary.archetypes.last().unwrap();
        assert_eq!(last.key, "0_1");
        assert_eq!(last.entity_count, 1);
        assert!(last.components[0].is_tag);
        assert_eq!(last.components[1].type_name, "f32");
    }

    #[test]
    fn test_entity_info() {
        let mut world = World::new();
        let food = world.tag();
        let e = world.create();
        world.add(e, food).unwrap();

        let info = WorldInspector::entity(&world, e).unwrap();
        assert_eq!(info.row, 0);
        assert_eq!(info.components.len(), 1);
        assert!(WorldInspector::entity(&world, EntityId::from_raw(7)).is_none());
    }

    #[test]
    fn test_json_output() {
        let mut world = World::new();
        let mass = world.component::<f32>();
        let e = world.create();
        world.set(e, mass, 2.0).unwrap();

        let json = WorldInspector::to_json(&world).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["entity_count"], 1);
        assert_eq!(value["archetypes"][1]["key"], "0");
    }
}
