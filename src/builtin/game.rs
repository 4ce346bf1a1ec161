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

//! Components of the blob game client.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentRegistry, Tag};

/// 8-bit color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Stable color for a player session.
///
/// Uses the `hash * 31 + c` string hash over UTF-16 units, wrapping at 32 bits,
/// and takes one byte per channel.
pub fn session_color(session_id: &str) -> Rgb {
    let hash = session_id
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            (unit as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
        });
    Rgb::new(
        (hash & 0xff) as u8,
        ((hash >> 8) & 0xff) as u8,
        ((hash >> 16) & 0xff) as u8,
    )
}

/// Handles for every component the game uses
///
/// Registered once, in a fixed order, so a fresh registry always yields the
/// same ids.
#[derive(Clone, Copy, Debug)]
pub struct GameComponents {
    pub food: Tag,
    pub player: Tag,
    /// The blob controlled by this client
    pub local_player: Tag,
    pub mass: Component<f32>,
    pub position: Component<Vec2>,
    pub color: Component<Rgb>,
}

impl GameComponents {
    pub fn register(registry: &mut ComponentRegistry) -> Self {
        Self {
            food: registry.tag(),
            player: registry.tag(),
            local_player: registry.tag(),
            mass: registry.component::<f32>(),
            position: registry.component::<Vec2>(),
            color: registry.component::<Rgb>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_order() {
        let mut registry = ComponentRegistry::new();
        let game = GameComponents::register(&mut registry);

        assert_eq!(game.food.id().raw(), 0);
        assert_eq!(game.local_player.id().raw(), 2);
        assert_eq!(game.position.id().raw(), 4);
        assert_eq!(registry.is_tag(game.player.id()), Some(true));
        assert_eq!(registry.is_tag(game.mass.id()), Some(false));
    }

    #[test]
    fn test_session_color_is_stable() {
        // "a" hashes to 97
        assert_eq!(session_color("a"), Rgb::new(97, 0, 0));
        // "ab": 97 * 31 + 98 = 3105 = 0x0c21
        assert_eq!(session_color("ab"), Rgb::new(0x21, 0x0c, 0));
        assert_eq!(session_color("xyz"), session_color("xyz"));
        assert_eq!(session_color(""), Rgb::new(0, 0, 0));
    }
}
