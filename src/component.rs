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

//! Component identities and the registry that mints them
//!
//! A component is either a data component, which owns a column of values of one
//! element type, or a tag, which is presence-only. The flavor is fixed when the
//! id is minted and never changes.
//!
//! Ids come from an explicit [`ComponentRegistry`]. A registry is handed to the
//! world at construction, so two worlds never share an id sequence.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::archetype::{ArchetypeId, ColumnFactory, TypedColumn};

/// Inline capacity for component id lists (signatures, filters)
pub const INLINE_COMPONENTS: usize = 8;

/// Small list of component ids
pub type ComponentIdList = SmallVec<[ComponentId; INLINE_COMPONENTS]>;

/// Marker trait for component values
///
/// Values must be 'static (no borrowed data)
pub trait ComponentData: 'static + Send + Sync {}

/// Automatically implement ComponentData for all valid types
impl<T: 'static + Send + Sync> ComponentData for T {}

/// Untyped component identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(u32);

impl ComponentId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Handle to a data component whose values are of type `T`.
///
/// `T` lives at the type level only; the handle is just an id.
pub struct Component<T> {
    id: ComponentId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Component<T> {
    pub(crate) const fn new(id: ComponentId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub const fn id(self) -> ComponentId {
        self.id
    }
}

impl<T> Clone for Component<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Component<T> {}

impl<T> PartialEq for Component<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Component<T> {}

impl<T> Hash for Component<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Component<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component")
            .field(&self.id)
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<T> From<Component<T>> for ComponentId {
    fn from(component: Component<T>) -> Self {
        component.id
    }
}

/// Handle to a presence-only component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(ComponentId);

impl Tag {
    pub const fn id(self) -> ComponentId {
        self.0
    }
}

impl From<Tag> for ComponentId {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

/// Component flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Data,
    Tag,
}

/// Registration metadata for one component id
#[derive(Clone)]
pub struct ComponentInfo {
    kind: ComponentKind,
    type_name: &'static str,
    element_type: Option<TypeId>,
    new_column: Option<ColumnFactory>,
}

impl ComponentInfo {
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn is_tag(&self) -> bool {
        self.kind == ComponentKind::Tag
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// `TypeId` of the element type; `None` for tags
    pub fn element_type(&self) -> Option<TypeId> {
        self.element_type
    }

    pub(crate) fn column_factory(&self) -> Option<ColumnFactory> {
        self.new_column
    }
}

impl fmt::Debug for ComponentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInfo")
            .field("kind", &self.kind)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Mints component ids.
///
/// Tags and data components share one id sequence starting at zero, so the ids
/// a registry hands out depend only on the order of calls made on it.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    entries: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a presence-only component
    pub fn tag(&mut self) -> Tag {
        Tag(self.push(ComponentInfo {
            kind: ComponentKind::Tag,
            type_name: "tag",
            element_type: None,
            new_column: None,
        }))
    }

    /// Register a data component with element type `T`
    pub fn component<T: ComponentData>(&mut self) -> Component<T> {
        Component::new(self.push(ComponentInfo {
            kind: ComponentKind::Data,
            type_name: std::any::type_name::<T>(),
            element_type: Some(TypeId::of::<T>()),
            new_column: Some(TypedColumn::<T>::boxed),
        }))
    }

    fn push(&mut self, info: ComponentInfo) -> ComponentId {
        let id = ComponentId(self.entries.len() as u32);
        self.entries.push(info);
        id
    }

    pub fn info(&self, id: ComponentId) -> Option<&ComponentInfo> {
        self.entries.get(id.index())
    }

    pub fn is_registered(&self, id: ComponentId) -> bool {
        id.index() < self.entries.len()
    }

    /// `None` when the id was never registered
    pub fn is_tag(&self, id: ComponentId) -> Option<bool> {
        self.info(id).map(ComponentInfo::is_tag)
    }

    pub fn type_name(&self, id: ComponentId) -> Option<&'static str> {
        self.info(id).map(ComponentInfo::type_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &ComponentInfo)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, info)| (ComponentId(index as u32), info))
    }
}

/// Per-component archetype membership.
///
/// Maps every archetype that includes the component to the column slot the
/// component occupies there.
#[derive(Debug, Clone)]
pub struct ComponentRecord {
    is_tag: bool,
    archetypes: FxHashMap<ArchetypeId, usize>,
}

impl ComponentRecord {
    pub fn new(is_tag: bool) -> Self {
        Self {
            is_tag,
            archetypes: FxHashMap::default(),
        }
    }

    pub fn is_tag(&self) -> bool {
        self.is_tag
    }

    /// Number of archetypes that include this component
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    pub fn column_slot(&self, archetype: ArchetypeId) -> Option<usize> {
        self.archetypes.get(&archetype).copied()
    }

    pub fn contains(&self, archetype: ArchetypeId) -> bool {
        self.archetypes.contains_key(&archetype)
    }

    pub fn archetypes(&self) -> impl Iterator<Item = ArchetypeId> + '_ {
        self.archetypes.keys().copied()
    }

    pub(crate) fn insert(&mut self, archetype: ArchetypeId, slot: usize) {
        self.archetypes.insert(archetype, slot);
    }
}

/// Anything that names one or more components.
///
/// Used by query filters and the command buffer so callers can pass a single
/// handle or a tuple of handles.
pub trait ComponentIds {
    fn extend_ids(self, out: &mut ComponentIdList);

    fn to_id_list(self) -> ComponentIdList
    where
        Self: Sized,
    {
        let mut out = ComponentIdList::new();
        self.extend_ids(&mut out);
        out
    }
}

impl ComponentIds for ComponentId {
    fn extend_ids(self, out: &mut ComponentIdList) {
        out.push(self);
    }
}

impl ComponentIds for Tag {
    fn extend_ids(self, out: &mut ComponentIdList) {
        out.push(self.0);
    }
}

impl<T> ComponentIds for Component<T> {
    fn extend_ids(self, out: &mut ComponentIdList) {
        out.push(self.id);
    }
}

impl ComponentIds for &[ComponentId] {
    fn extend_ids(self, out: &mut ComponentIdList) {
        out.extend_from_slice(self);
    }
}

macro_rules! impl_component_ids {
    ($($T:ident),*) => {
        impl<$($T: ComponentIds),*> ComponentIds for ($($T,)*) {
            #[allow(non_snake_case)]
            fn extend_ids(self, out: &mut ComponentIdList) {
                let ($($T,)*) = self;
                $($T.extend_ids(out);)*
            }
        }
    };
}

impl_component_ids!(A);
impl_component_ids!(A, B);
impl_component_ids!(A, B, C);
impl_component_ids!(A, B, C, D);
impl_component_ids!(A, B, C, D, E);
impl_component_ids!(A, B, C, D, E, F);
