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

use std::time::Instant;

use cell_ecs::prelude::*;
use glam::Vec2;

fn snapshot(tick: u64, count: u64) -> Vec<GlobState> {
    // A sliding window of ids so every tick creates and deletes a few globs
    (tick..tick + count)
        .map(|id| GlobState {
            id,
            mass: 1.0 + (id % 50) as f32,
            position: Vec2::new(id as f32, tick as f32),
            player: (id % 10 == 0).then(|| PlayerInfo {
                name: format!("blob{id}"),
                session_id: format!("session{id}"),
            }),
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut registry = ComponentRegistry::new();
    let game = GameComponents::register(&mut registry);
    let mut world = World::with_registry(registry);
    let mut mirror = SnapshotMirror::new();

    let start = Instant::now();
    {
        let _span = tracing::info_span!("mirror_ticks", ticks = 60).entered();
        for tick in 0..60 {
            let globs = snapshot(tick, 5_000);
            let report = mirror.apply(&mut world, &game, &globs, Some("session10"))?;
            if tick % 20 == 0 {
                tracing::info!(
                    created = report.created.len(),
                    deleted = report.deleted.len(),
                    "tick {}",
                    tick
                );
            }
        }
    }
    println!("60 snapshot ticks complete in: {:?}", start.elapsed());

    let start = Instant::now();
    let total: f32 = world
        .query((game.mass, game.position))
        .with(game.player)
        .iter()
        .filter_map(|(_, mass, _)| mass.copied())
        .sum();
    println!("player mass {total} summed in: {:?}", start.elapsed());

    WorldInspector::print_summary(&world);
    Ok(())
}
