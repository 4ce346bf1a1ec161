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

//! Mirror of server snapshots into a world
//!
//! The server names globs by its own ids. [`SnapshotMirror`] keeps the side
//! table from those ids to local entities and brings the world in line with
//! each decoded snapshot. Applying the same snapshot twice leaves the world
//! unchanged.

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::builtin::game::{session_color, GameComponents};
use crate::component::Tag;
use crate::entity::EntityId;
use crate::error::Result;
use crate::world::World;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub session_id: String,
}

/// One glob as decoded from a snapshot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobState {
    /// Server-side id, stable for the glob's lifetime
    pub id: u64,
    pub mass: f32,
    pub position: Vec2,
    /// `None` for food
    pub player: Option<PlayerInfo>,
}

/// What one [`SnapshotMirror::apply`] changed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entities created this tick, in snapshot order
    pub created: Vec<EntityId>,
    /// Count of already-mirrored globs refreshed
    pub updated: usize,
    /// Entities deleted because their glob left the snapshot
    pub deleted: Vec<EntityId>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty()
    }
}

/// Side table from server ids to local entities
#[derive(Debug, Default)]
pub struct SnapshotMirror {
    entities: FxHashMap<u64, EntityId>,
}

impl SnapshotMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local entity mirroring server id `external`
    pub fn entity_for(&self, external: u64) -> Option<EntityId> {
        self.entities.get(&external).copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Bring `world` in line with one snapshot.
    ///
    /// Unseen globs get an entity with position, color and the food or player
    /// tags. Every glob gets its mass and position written. Globs missing from
    /// the snapshot are deleted.
    pub fn apply(
        &mut self,
        world: &mut World,
        game: &GameComponents,
        globs: &[GlobState],
        local_session: Option<&str>,
    ) -> Result<SyncReport> {
        #[cfg(feature = "profiling")]
        let span = info_span!("mirror.apply", globs = globs.len());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let mut report = SyncReport::default();
        let mut stale = self.entities.clone();

        for glob in globs {
            stale.remove(&glob.id);

            let entity = match self.entity_for(glob.id) {
                Some(entity) if world.contains(entity) => {
                    report.updated += 1;
                    entity
                }
                _ => {
                    let entity = world.create();
                    if let Some(player) = &glob.player {
                        world.set(entity, game.color, session_color(&player.session_id))?;
                    }
                    self.entities.insert(glob.id, entity);
                    report.created.push(entity);
                    entity
                }
            };

            let is_player = glob.player.is_some();
            let is_local = match (&glob.player, local_session) {
                (Some(player), Some(session)) => player.session_id == session,
                _ => false,
            };
            set_tag(world, entity, game.food, !is_player)?;
            set_tag(world, entity, game.player, is_player)?;
            set_tag(world, entity, game.local_player, is_local)?;

            world.set(entity, game.position, glob.position)?;
            world.set(entity, game.mass, glob.mass)?;
        }

        for (external, entity) in stale {
            if world.contains(entity) {
                world.delete(entity)?;
            }
            self.entities.remove(&external);
            report.deleted.push(entity);
        }
        report.deleted.sort_unstable();

        Ok(report)
    }

    /// Delete every mirrored entity and forget the table
    pub fn clear(&mut self, world: &mut World) -> Result<()> {
        for (_, entity) in self.entities.drain() {
            if world.contains(entity) {
                world.delete(entity)?;
            }
        }
        Ok(())
    }
}

fn set_tag(world: &mut World, entity: EntityId, tag: Tag, wanted: bool) -> Result<()> {
    match (wanted, world.has(entity, tag)) {
        (true, false) => world.add(entity, tag),
        (false, true) => world.remove(entity, tag),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentRegistry;

    fn setup() -> (World, GameComponents) {
        let mut registry = ComponentRegistry::new();
        let game = GameComponents::register(&mut registry);
        (World::with_registry(registry), game)
    }

    fn food(id: u64, mass: f32) -> GlobState {
        GlobState {
            id,
            mass,
            position: Vec2::new(id as f32, 0.0),
            player: None,
        }
    }

    fn player(id: u64, mass: f32, session: &str) -> GlobState {
        GlobState {
            id,
            mass,
            position: Vec2::ZERO,
            player: Some(PlayerInfo {
                name: format!("blob{id}"),
                session_id: session.to_string(),
            }),
        }
    }

    #[test]
    fn test_first_sight_creates_entities() -> Result<()> {
        let (mut world, game) = setup();
        let mut mirror = SnapshotMirror::new();

        let report = mirror.apply(
            &mut world,
            &game,
            &[food(1, 1.0), player(2, 20.0, "me"), player(3, 15.0, "them")],
            Some("me"),
        )?;
        assert_eq!(report.created.len(), 3);
        assert_eq!(report.updated, 0);

        let me = mirror.entity_for(2).unwrap();
        assert!(world.has(me, game.player));
        assert!(world.has(me, game.local_player));
        assert!(!world.has(me, game.food));
        assert_eq!(world.get(me, game.color), Some(&session_color("me")));

        let pellet = mirror.entity_for(1).unwrap();
        assert!(world.has(pellet, game.food));
        assert_eq!(world.get(pellet, game.color), None);
        assert_eq!(world.query(game.local_player).count(), 1);
        Ok(())
    }

    #[test]
    fn test_mass_updates_every_tick() -> Result<()> {
        let (mut world, game) = setup();
        let mut mirror = SnapshotMirror::new();

        mirror.apply(&mut world, &game, &[player(7, 10.0, "s")], None)?;
        let entity = mirror.entity_for(7).unwrap();
        let location = world.location(entity);

        let report = mirror.apply(&mut world, &game, &[player(7, 12.5, "s")], None)?;
        assert!(report.is_noop());
        assert_eq!(report.updated, 1);
        assert_eq!(world.get(entity, game.mass), Some(&12.5));
        assert_eq!(world.location(entity), location);
        Ok(())
    }

    #[test]
    fn test_stale_globs_are_deleted() -> Result<()> {
        let (mut world, game) = setup();
        let mut mirror = SnapshotMirror::new();

        mirror.apply(&mut world, &game, &[food(1, 1.0), food(2, 1.0)], None)?;
        let eaten = mirror.entity_for(1).unwrap();

        let report = mirror.apply(&mut world, &game, &[food(2, 1.0)], None)?;
        assert_eq!(report.deleted, vec![eaten]);
        assert!(!world.contains(eaten));
        assert_eq!(mirror.entity_for(1), None);
        assert_eq!(mirror.len(), 1);
        Ok(())
    }

    #[test]
    fn test_reapplying_is_idempotent() -> Result<()> {
        let (mut world, game) = setup();
        let mut mirror = SnapshotMirror::new();
        let snapshot = [food(1, 1.0), player(2, 20.0, "me")];

        mirror.apply(&mut world, &game, &snapshot, Some("me"))?;
        let archetypes = world.archetype_count();
        let entities = world.entity_count();

        let report = mirror.apply(&mut world, &game, &snapshot, Some("me"))?;
        assert!(report.is_noop());
        assert_eq!(world.archetype_count(), archetypes);
        assert_eq!(world.entity_count(), entities);
        Ok(())
    }

    #[test]
    fn test_clear_deletes_everything() -> Result<()> {
        let (mut world, game) = setup();
        let mut mirror = SnapshotMirror::new();
        mirror.apply(&mut world, &game, &[food(1, 1.0), food(2, 2.0)], None)?;

        mirror.clear(&mut world)?;
        assert!(mirror.is_empty());
        assert_eq!(world.entity_count(), 0);
        Ok(())
    }
}
