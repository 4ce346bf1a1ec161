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

//! Archetype storage with row allocation and removal
//!
//! An archetype is a table holding every entity whose component set equals
//! its [`TypeSignature`]. Each data component gets one column; every tag
//! shares the single [`TAG_COLUMN`] sentinel, which never stores anything.

use std::any::Any;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::component::{ComponentData, ComponentId, ComponentIdList};
use crate::entity::EntityId;

/// Index of an archetype in the world's archetype table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArchetypeId(u32);

impl ArchetypeId {
    /// Archetype of entities with no components
    pub const ROOT: ArchetypeId = ArchetypeId(0);

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

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Canonical component set: ids sorted ascending, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeSignature(ComponentIdList);

impl TypeSignature {
    /// The empty signature of the root archetype
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I: IntoIterator<Item = ComponentId>>(ids: I) -> Self {
        let mut list: ComponentIdList = ids.into_iter().collect();
        list.sort_unstable();
        list.dedup();
        Self(list)
    }

    pub fn ids(&self) -> &[ComponentId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Copy of this signature with `id` inserted in sorted position.
    /// Returns `None` when `id` is already present.
    pub fn with(&self, id: ComponentId) -> Option<Self> {
        match self.0.binary_search(&id) {
            Ok(_) => None,
            Err(at) => {
                let mut list = self.0.clone();
                list.insert(at, id);
                Some(Self(list))
            }
        }
    }

    /// Copy of this signature with `id` removed.
    /// Returns `None` when `id` is absent.
    pub fn without(&self, id: ComponentId) -> Option<Self> {
        let at = self.0.binary_search(&id).ok()?;
        let mut list = self.0.clone();
        list.remove(at);
        Some(Self(list))
    }

    /// Ids joined with `_`, e.g. `"0_3_4"`; empty for the root.
    pub fn key(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(|id| id.raw().to_string()).collect();
        parts.join("_")
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Builds an empty column for one data component
pub type ColumnFactory = fn() -> Box<dyn ColumnStorage>;

/// Type-erased growable column of one data component.
///
/// Cells are optional: a row appended without a value stays uninitialized
/// until something writes it.
pub trait ColumnStorage: Any + Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an uninitialized cell
    fn push_uninit(&mut self);

    /// Move the value at `row` into `dst[dst_row]`, leaving `row` uninitialized.
    /// `dst` must hold the same element type; otherwise the value is dropped
    /// and `dst[dst_row]` stays uninitialized.
    fn take_into(&mut self, row: usize, dst: &mut dyn ColumnStorage, dst_row: usize);

    /// Remove `row` by moving the last cell into it
    fn swap_remove(&mut self, row: usize);

    fn reserve(&mut self, additional: usize);

    fn element_type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Column of `T` values
pub struct TypedColumn<T> {
    cells: Vec<Option<T>>,
}

impl<T: ComponentData> TypedColumn<T> {
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    pub(crate) fn boxed() -> Box<dyn ColumnStorage> {
        Box::new(Self::new())
    }

    /// Value at `row`, `None` if out of range or uninitialized
    pub fn get(&self, row: usize) -> Option<&T> {
        self.cells.get(row)?.as_ref()
    }

    pub fn get_mut(&mut self, row: usize) -> Option<&mut T> {
        self.cells.get_mut(row)?.as_mut()
    }

    pub fn is_set(&self, row: usize) -> bool {
        matches!(self.cells.get(row), Some(Some(_)))
    }

    /// Write `value` into an existing row. Returns false if `row` is out of range.
    pub fn set(&mut self, row: usize, value: T) -> bool {
        match self.cells.get_mut(row) {
            Some(cell) => {
                *cell = Some(value);
                true
            }
            None => false,
        }
    }
}

impl<T: ComponentData> Default for TypedColumn<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ComponentData> ColumnStorage for TypedColumn<T> {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn push_uninit(&mut self) {
        self.cells.push(None);
    }

    fn take_into(&mut self, row: usize, dst: &mut dyn ColumnStorage, dst_row: usize) {
        let value = self.cells.get_mut(row).and_then(Option::take);
        if let Some(dst) = dst.as_any_mut().downcast_mut::<TypedColumn<T>>() {
            if let Some(cell) = dst.cells.get_mut(dst_row) {
                *cell = value;
            }
        }
    }

    fn swap_remove(&mut self, row: usize) {
        if row < self.cells.len() {
            self.cells.swap_remove(row);
        }
    }

    fn reserve(&mut self, additional: usize) {
        self.cells.reserve(additional);
    }

    fn element_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Storage stand-in for tags. Holds nothing, whatever the row count.
#[derive(Debug)]
pub struct TagColumn;

impl TagColumn {
    pub fn len(&self) -> usize {
        0
    }

    pub fn is_empty(&self) -> bool {
        true
    }
}

/// The one sentinel shared by every tag column of every archetype
pub static TAG_COLUMN: TagColumn = TagColumn;

/// One column slot of an archetype
pub enum Column {
    Tag(&'static TagColumn),
    Data(Box<dyn ColumnStorage>),
}

impl Column {
    pub fn tag() -> Self {
        Column::Tag(&TAG_COLUMN)
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Column::Tag(_))
    }

    /// Number of stored cells; always zero for tags
    pub fn storage_len(&self) -> usize {
        match self {
            Column::Tag(sentinel) => sentinel.len(),
            Column::Data(storage) => storage.len(),
        }
    }

    pub fn as_tag(&self) -> Option<&'static TagColumn> {
        match self {
            Column::Tag(sentinel) => Some(sentinel),
            Column::Data(_) => None,
        }
    }

    pub fn as_storage(&self) -> Option<&dyn ColumnStorage> {
        match self {
            Column::Tag(_) => None,
            Column::Data(storage) => Some(storage.as_ref()),
        }
    }

    /// Typed view; `None` for tags or a different element type
    pub fn as_typed<T: ComponentData>(&self) -> Option<&TypedColumn<T>> {
        match self {
            Column::Tag(_) => None,
            Column::Data(storage) => storage.as_any().downcast_ref::<TypedColumn<T>>(),
        }
    }

    pub fn as_typed_mut<T: ComponentData>(&mut self) -> Option<&mut TypedColumn<T>> {
        match self {
            Column::Tag(_) => None,
            Column::Data(storage) => storage.as_any_mut().downcast_mut::<TypedColumn<T>>(),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Tag(_) => f.write_str("Tag"),
            Column::Data(storage) => f
                .debug_struct("Data")
                .field("type", &storage.element_type_name())
                .field("len", &storage.len())
                .finish(),
        }
    }
}

/// Archetype: Structure of Arrays storage
pub struct Archetype {
    id: ArchetypeId,
    signature: TypeSignature,
    entities: Vec<EntityId>,
    columns: Vec<Column>,
    column_indices: FxHashMap<ComponentId, usize>,
}

impl Archetype {
    /// Create an archetype; `columns[i]` must belong to `signature.ids()[i]`
    pub fn new(id: ArchetypeId, signature: TypeSignature, columns: Vec<Column>) -> Self {
        debug_assert_eq!(signature.len(), columns.len());
        let column_indices = signature
            .ids()
            .iter()
            .enumerate()
            .map(|(slot, &component)| (component, slot))
            .collect();

        Self {
            id,
            signature,
            entities: Vec::new(),
            columns,
            column_indices,
        }
    }

    /// The root archetype (no components)
    pub fn root() -> Self {
        Self::new(ArchetypeId::ROOT, TypeSignature::new(), Vec::new())
    }

    pub fn id(&self) -> ArchetypeId {
        self.id
    }

    /// Get signature
    pub fn signature(&self) -> &TypeSignature {
        &self.signature
    }

    /// Append `entity` and an uninitialized cell to every data column
    pub fn allocate_row(&mut self, entity: EntityId) -> usize {
        let row = self.entities.len();
        self.entities.push(entity);

        for column in &mut self.columns {
            if let Column::Data(storage) = column {
                storage.push_uninit();
            }
        }

        row
    }

    /// Swap-remove `row`.
    ///
    /// Returns the entity that was moved into `row` from the end of the table,
    /// or `None` if `row` was the last row (or out of range).
    pub fn remove_row(&mut self, row: usize) -> Option<EntityId> {
        if row >= self.entities.len() {
            return None;
        }

        self.entities.swap_remove(row);
        for column in &mut self.columns {
            if let Column::Data(storage) = column {
                storage.swap_remove(row);
            }
        }

        self.entities.get(row).copied()
    }

    /// Move the entity at `row` into `dest`.
    ///
    /// Appends the entity to `dest`, moves every data value whose component is
    /// in both signatures, then swap-removes `row` here. Returns the new row in
    /// `dest` and the entity swapped into `row`, if any.
    pub(crate) fn move_row_into(
        &mut self,
        row: usize,
        dest: &mut Archetype,
    ) -> Option<(usize, Option<EntityId>)> {
        let entity = *self.entities.get(row)?;
        let dest_row = dest.allocate_row(entity);

        for (slot, component) in self.signature.ids().iter().enumerate() {
            let Column::Data(source) = &mut self.columns[slot] else {
                continue;
            };
            let Some(&dest_slot) = dest.column_indices.get(component) else {
                continue;
            };
            if let Column::Data(target) = &mut dest.columns[dest_slot] {
                source.take_into(row, target.as_mut(), dest_row);
            }
        }

        let swapped = self.remove_row(row);
        Some((dest_row, swapped))
    }

    /// Column slot of `component`, if the archetype has it
    pub fn column_index(&self, component: ComponentId) -> Option<usize> {
        self.column_indices.get(&component).copied()
    }

    pub fn has(&self, component: ComponentId) -> bool {
        self.column_indices.contains_key(&component)
    }

    pub fn column(&self, component: ComponentId) -> Option<&Column> {
        let slot = self.column_index(component)?;
        self.columns.get(slot)
    }

    pub fn column_mut(&mut self, component: ComponentId) -> Option<&mut Column> {
        let slot = self.column_index(component)?;
        self.columns.get_mut(slot)
    }

    pub fn column_by_index(&self, slot: usize) -> Option<&Column> {
        self.columns.get(slot)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Reserve space for additional rows
    pub fn reserve_rows(&mut self, additional: usize) {
        self.entities.reserve(additional);
        for column in &mut self.columns {
            if let Column::Data(storage) = column {
                storage.reserve(additional);
            }
        }
    }

    /// Get all entities
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if archetype is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl fmt::Debug for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archetype")
            .field("id", &self.id)
            .field("signature", &self.signature.key())
            .field("len", &self.entities.len())
            .field("columns", &self.columns)
            .finish()
    }
}
