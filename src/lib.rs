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

//! Cell ECS - archetype Entity Component System for a cell-growth game client
//!
//! Entities with the same component set share an archetype; data components
//! live in type-erased columns, tags cost no storage. Adding or removing a
//! component migrates the entity between archetypes.

pub mod archetype;
pub mod builtin;
pub mod command;
pub mod component;
pub mod config;
pub mod debug;
pub mod entity;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod query;
pub mod replication;
pub mod world;

pub use archetype::*;
pub use command::*;
pub use component::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use graph::*;
pub use query::*;
pub use world::*;
