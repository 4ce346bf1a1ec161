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

//! Query system with archetype filtering
//!
//! A query has a projection (the handles whose values are yielded, in order)
//! and a filter set (the projection plus anything added with `with`).
//! Matching starts from the filter component that belongs to the fewest
//! archetypes and only looks at those archetypes.
//!
//! Every row of a matching archetype is yielded. A projected data component
//! yields `Option<&T>`: `None` when the component was added but never set.
//!
//! ```
//! use cell_ecs::{Present, World};
//!
//! let mut world = World::new();
//! let player = world.tag();
//! let mass = world.component::<f32>();
//!
//! let e = world.create();
//! world.add(e, player).unwrap();
//! world.set(e, mass, 12.0).unwrap();
//!
//! let rows: Vec<_> = world.query((mass, player)).iter().collect();
//! assert_eq!(rows, vec![(e, Some(&12.0), Present)]);
//! ```

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::archetype::{Archetype, ArchetypeId, TypedColumn};
use crate::component::{Component, ComponentData, ComponentId, ComponentIdList, ComponentIds, Tag};
use crate::entity::EntityId;
use crate::world::World;

/// Yielded in place of a value for projected tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Present;

/// One projected term of a query
pub trait Fetch<'w>: Copy {
    /// The type of data returned for this term
    type Item;
    /// Per-archetype state (e.g. a column reference)
    type State;

    fn id(&self) -> ComponentId;

    /// Prepare to fetch from an archetype; `None` if it lacks the component
    fn prepare(&self, archetype: &'w Archetype) -> Option<Self::State>;

    /// Fetch the value at `row`; `None` skips the row (neither built-in term does)
    fn fetch(state: &Self::State, row: usize) -> Option<Self::Item>;
}

impl<'w, T: ComponentData> Fetch<'w> for Component<T> {
    type Item = Option<&'w T>;
    type State = &'w TypedColumn<T>;

    fn id(&self) -> ComponentId {
        (*self).id()
    }

    fn prepare(&self, archetype: &'w Archetype) -> Option<Self::State> {
        archetype.column((*self).id())?.as_typed::<T>()
    }

    fn fetch(state: &Self::State, row: usize) -> Option<Self::Item> {
        // Uninitialized cells project as None
        Some(state.get(row))
    }
}

impl<'w> Fetch<'w> for Tag {
    type Item = Present;
    type State = ();

    fn id(&self) -> ComponentId {
        (*self).id()
    }

    fn prepare(&self, archetype: &'w Archetype) -> Option<Self::State> {
        archetype.has((*self).id()).then_some(())
    }

    fn fetch(_state: &Self::State, _row: usize) -> Option<Self::Item> {
        Some(Present)
    }
}

/// A full projection: a single handle or a tuple of up to six.
///
/// Items are flat tuples led by the entity id, e.g. `(EntityId, Option<&f32>, Present)`.
pub trait QueryData<'w>: Copy {
    type Item;
    type State;

    fn projection_ids(&self, out: &mut ComponentIdList);

    fn prepare(&self, archetype: &'w Archetype) -> Option<Self::State>;

    fn fetch(state: &Self::State, entity: EntityId, row: usize) -> Option<Self::Item>;
}

impl<'w, T: ComponentData> QueryData<'w> for Component<T> {
    type Item = (EntityId, Option<&'w T>);
    type State = &'w TypedColumn<T>;

    fn projection_ids(&self, out: &mut ComponentIdList) {
        out.push(Fetch::id(self));
    }

    fn prepare(&self, archetype: &'w Archetype) -> Option<Self::State> {
        Fetch::prepare(self, archetype)
    }

    fn fetch(state: &Self::State, entity: EntityId, row: usize) -> Option<Self::Item> {
        Some((entity, <Self as Fetch<'w>>::fetch(state, row)?))
    }
}

impl<'w> QueryData<'w> for Tag {
    type Item = (EntityId, Present);
    type State = ();

    fn projection_ids(&self, out: &mut ComponentIdList) {
        out.push(Fetch::id(self));
    }

    fn prepare(&self, archetype: &'w Archetype) -> Option<Self::State> {
        Fetch::prepare(self, archetype)
    }

    fn fetch(_state: &Self::State, entity: EntityId, _row: usize) -> Option<Self::Item> {
        Some((entity, Present))
    }
}

macro_rules! impl_query_data {
    ($($T:ident),*) => {
        #[allow(non_snake_case)]
        impl<'w, $($T: Fetch<'w>),*> QueryData<'w> for ($($T,)*) {
            type Item = (EntityId, $(<$T as Fetch<'w>>::Item,)*);
            type State = ($(<$T as Fetch<'w>>::State,)*);

            fn projection_ids(&self, out: &mut ComponentIdList) {
                let ($($T,)*) = self;
                $(out.push($T.id());)*
            }

            fn prepare(&self, archetype: &'w Archetype) -> Option<Self::State> {
                let ($($T,)*) = self;
                Some(($($T.prepare(archetype)?,)*))
            }

            fn fetch(state: &Self::State, entity: EntityId, row: usize) -> Option<Self::Item> {
                let ($($T,)*) = state;
                Some((entity, $(<$T as Fetch<'w>>::fetch($T, row)?,)*))
            }
        }
    };
}

impl_query_data!(A);
impl_query_data!(A, B);
impl_query_data!(A, B, C);
impl_query_data!(A, B, C, D);
impl_query_data!(A, B, C, D, E);
impl_query_data!(A, B, C, D, E, F);

/// Query under construction
///
/// Nothing is matched until [`QueryBuilder::iter`] is called, and every call
/// matches afresh. There is no way to resume a previous iteration; build the
/// query again instead.
pub struct QueryBuilder<'w, Q> {
    world: &'w World,
    data: Q,
    filter: ComponentIdList,
    exclude: ComponentIdList,
}

impl<'w, Q: QueryData<'w>> QueryBuilder<'w, Q> {
    pub(crate) fn new(world: &'w World, data: Q) -> Self {
        let mut filter = ComponentIdList::new();
        data.projection_ids(&mut filter);
        Self {
            world,
            data,
            filter,
            exclude: ComponentIdList::new(),
        }
    }

    /// Also require `ids`, without projecting them
    pub fn with(mut self, ids: impl ComponentIds) -> Self {
        ids.extend_ids(&mut self.filter);
        self
    }

    /// Skip archetypes containing any of `ids`
    pub fn without(mut self, ids: impl ComponentIds) -> Self {
        ids.extend_ids(&mut self.exclude);
        self
    }

    /// Required component ids (projection first, then `with` additions)
    pub fn filter_ids(&self) -> &[ComponentId] {
        &self.filter
    }

    /// Archetypes that satisfy the filter, found through the pivot component.
    pub fn matched_archetypes(&self) -> Vec<ArchetypeId> {
        let graph = self.world.graph();

        let mut pivot: Option<(ComponentId, usize)> = None;
        for &component in &self.filter {
            // Unregistered filter component: nothing can match
            let Some(record) = graph.record(component) else {
                return Vec::new();
            };
            let rarer = match pivot {
                Some((_, best)) => record.archetype_count() < best,
                None => true,
            };
            if rarer {
                pivot = Some((component, record.archetype_count()));
            }
        }

        let Some(pivot) = pivot.and_then(|(component, _)| graph.record(component)) else {
            return Vec::new();
        };

        pivot
            .archetypes()
            .filter(|&archetype| {
                self.filter.iter().all(|&component| {
                    graph
                        .record(component)
                        .is_some_and(|record| record.contains(archetype))
                })
            })
            .filter(|&archetype| {
                graph.get(archetype).is_some_and(|archetype| {
                    !self.exclude.iter().any(|&component| archetype.has(component))
                })
            })
            .collect()
    }

    pub fn iter(&self) -> QueryIter<'w, Q> {
        #[cfg(feature = "profiling")]
        let span = info_span!(
            "query.iter",
            filter = self.filter.len(),
            archetype_count = self.world.archetype_count()
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        QueryIter {
            world: self.world,
            data: self.data,
            matched: self.matched_archetypes(),
            archetype_index: 0,
            current: None,
            row: 0,
        }
    }

    /// Count matching rows
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Materialize matching entity ids, releasing nothing but ids.
    ///
    /// The returned list does not borrow the world, so it can drive mutations.
    pub fn entities(&self) -> Vec<EntityId> {
        let mut out = Vec::new();
        let matched = self.matched_archetypes();
        for id in matched {
            let Some(archetype) = self.world.archetype(id) else {
                continue;
            };
            let Some(state) = self.data.prepare(archetype) else {
                continue;
            };
            for (row, &entity) in archetype.entities().iter().enumerate() {
                if Q::fetch(&state, entity, row).is_some() {
                    out.push(entity);
                }
            }
        }
        out
    }
}

impl<'w, Q: QueryData<'w>> IntoIterator for QueryBuilder<'w, Q> {
    type Item = Q::Item;
    type IntoIter = QueryIter<'w, Q>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Immutable query iterator
///
/// Rows are visited back to front within each archetype; callers must not
/// rely on any order.
pub struct QueryIter<'w, Q: QueryData<'w>> {
    world: &'w World,
    data: Q,
    matched: Vec<ArchetypeId>,
    archetype_index: usize,
    current: Option<(&'w Archetype, Q::State)>,
    row: usize,
}

impl<'w, Q: QueryData<'w>> QueryIter<'w, Q> {
    /// Archetypes this iteration walks
    pub fn matched_archetype_count(&self) -> usize {
        self.matched.len()
    }
}

impl<'w, Q: QueryData<'w>> Iterator for QueryIter<'w, Q> {
    type Item = Q::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((archetype, state)) = &self.current {
                if self.row > 0 {
                    self.row -= 1;
                    let row = self.row;
                    let Some(&entity) = archetype.entities().get(row) else {
                        continue;
                    };
                    if let Some(item) = Q::fetch(state, entity, row) {
                        return Some(item);
                    }
                    continue;
                }
            }
            self.current = None;

            let id = *self.matched.get(self.archetype_index)?;
            self.archetype_index += 1;

            let Some(archetype) = self.world.archetype(id) else {
                continue;
            };
            if archetype.is_empty() {
                continue;
            }
            if let Some(state) = self.data.prepare(archetype) {
                self.row = archetype.len();
                self.current = Some((archetype, state));
            }
        }
    }
}
