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

//! Archetype graph: signature → archetype cache plus component records
//!
//! Archetypes are created the first time an entity needs a given component
//! combination and are never destroyed. The live set is therefore exactly the
//! combinations ever observed, not the power set of registered components.

use ahash::AHashMap;

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::archetype::{Archetype, ArchetypeId, Column, TypeSignature};
use crate::component::{ComponentId, ComponentRecord, ComponentRegistry};
use crate::config::WorldConfig;
use crate::error::{EcsError, Result};

/// Owns every archetype and the per-component membership records
pub struct ArchetypeGraph {
    /// All archetypes, addressed by `ArchetypeId`
    archetypes: Vec<Archetype>,

    /// Canonical signature → archetype
    by_signature: AHashMap<TypeSignature, ArchetypeId>,

    /// Memoized edges: (from, component, adding?) → to
    transitions: AHashMap<(ArchetypeId, ComponentId, bool), ArchetypeId>,

    /// Component records indexed by component id
    records: Vec<ComponentRecord>,

    row_reserve: usize,
    max_archetypes: usize,
}

impl ArchetypeGraph {
    pub fn new(registry: &ComponentRegistry, config: &WorldConfig) -> Self {
        let mut archetypes = Vec::with_capacity(config.initial_archetype_capacity);
        archetypes.push(Archetype::root());

        let mut by_signature = AHashMap::with_capacity(config.initial_archetype_capacity);
        by_signature.insert(TypeSignature::new(), ArchetypeId::ROOT);

        let mut graph = Self {
            archetypes,
            by_signature,
            transitions: AHashMap::with_capacity(config.initial_archetype_capacity * 2),
            records: Vec::with_capacity(registry.len()),
            row_reserve: config.row_reserve,
            max_archetypes: config.max_archetypes,
        };
        graph.sync_records(registry);
        graph
    }

    /// Create records for ids registered since the last sync
    pub fn sync_records(&mut self, registry: &ComponentRegistry) {
        for (_, info) in registry.iter().skip(self.records.len()) {
            self.records.push(ComponentRecord::new(info.is_tag()));
        }
    }

    pub fn record(&self, component: ComponentId) -> Option<&ComponentRecord> {
        self.records.get(component.index())
    }

    pub fn root(&self) -> ArchetypeId {
        ArchetypeId::ROOT
    }

    pub fn get(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id.index())
    }

    pub fn get_mut(&mut self, id: ArchetypeId) -> Option<&mut Archetype> {
        self.archetypes.get_mut(id.index())
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    pub fn lookup(&self, signature: &TypeSignature) -> Option<ArchetypeId> {
        self.by_signature.get(signature).copied()
    }

    /// Resolve `signature` to its archetype, creating it on first use.
    pub fn ensure(
        &mut self,
        signature: &TypeSignature,
        registry: &ComponentRegistry,
    ) -> Result<ArchetypeId> {
        if signature.is_empty() {
            return Ok(ArchetypeId::ROOT);
        }

        if let Some(id) = self.lookup(signature) {
            return Ok(id);
        }

        self.create(signature.clone(), registry)
    }

    fn create(
        &mut self,
        signature: TypeSignature,
        registry: &ComponentRegistry,
    ) -> Result<ArchetypeId> {
        if self.archetypes.len() >= self.max_archetypes {
            return Err(EcsError::ArchetypeLimitExceeded {
                limit: self.max_archetypes,
            });
        }

        // Validate every id before building anything
        let mut columns = Vec::with_capacity(signature.len());
        for &component in signature.ids() {
            let info = registry
                .info(component)
                .ok_or(EcsError::UnknownComponent(component))?;
            let column = match info.column_factory() {
                Some(factory) => Column::Data(factory()),
                None => Column::tag(),
            };
            columns.push(column);
        }

        self.sync_records(registry);

        let id = ArchetypeId::from_raw(self.archetypes.len() as u32);

        #[cfg(feature = "profiling")]
        let span = info_span!(
            "graph.create_archetype",
            archetype = id.raw(),
            signature = %signature,
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        for (slot, &component) in signature.ids().iter().enumerate() {
            if let Some(record) = self.records.get_mut(component.index()) {
                record.insert(id, slot);
            }
        }

        let mut archetype = Archetype::new(id, signature.clone(), columns);
        archetype.reserve_rows(self.row_reserve);

        self.archetypes.push(archetype);
        self.by_signature.insert(signature, id);

        Ok(id)
    }

    /// Archetype reached from `from` by adding (`add == true`) or removing
    /// `component`. Returns `from` itself when the edge is a no-op.
    pub fn transition(
        &mut self,
        from: ArchetypeId,
        component: ComponentId,
        add: bool,
        registry: &ComponentRegistry,
    ) -> Result<ArchetypeId> {
        if let Some(&to) = self.transitions.get(&(from, component, add)) {
            return Ok(to);
        }

        let source = self
            .get(from)
            .ok_or(EcsError::ArchetypeNotFound(from))?
            .signature();
        let target = if add {
            source.with(component)
        } else {
            source.without(component)
        };

        let to = match target {
            Some(signature) => self.ensure(&signature, registry)?,
            None => from,
        };

        self.transitions.insert((from, component, add), to);
        Ok(to)
    }

    /// Two distinct archetypes borrowed mutably at once
    pub(crate) fn pair_mut(
        &mut self,
        a: ArchetypeId,
        b: ArchetypeId,
    ) -> Option<(&mut Archetype, &mut Archetype)> {
        let (ai, bi) = (a.index(), b.index());
        if ai == bi || ai >= self.archetypes.len() || bi >= self.archetypes.len() {
            return None;
        }

        if ai < bi {
            let (left, right) = self.archetypes.split_at_mut(bi);
            Some((&mut left[ai], &mut right[0]))
        } else {
            let (left, right) = self.archetypes.split_at_mut(ai);
            Some((&mut right[0], &mut left[bi]))
        }
    }

    /// Cached edge count, for diagnostics
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (ComponentRegistry, ArchetypeGraph) {
        let mut registry = ComponentRegistry::new();
        registry.tag();
        registry.component::<f32>();
        registry.component::<u32>();
        let graph = ArchetypeGraph::new(&registry, &WorldConfig::default());
        (registry, graph)
    }

    #[test]
    fn test_empty_signature_is_root() {
        let (registry, mut graph) = setup();
        let id = graph.ensure(&TypeSignature::new(), &registry).unwrap();
        assert_eq!(id, ArchetypeId::ROOT);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_ensure_caches_by_signature() {
        let (registry, mut graph) = setup();
        let sig = TypeSignature::from_ids([ComponentId::from_raw(2), ComponentId::from_raw(0)]);
        let first = graph.ensure(&sig, &registry).unwrap();
        let again = graph.ensure(&sig, &registry).unwrap();
        assert_eq!(first, again);
        assert_eq!(graph.len(), 2);

        let tag_record = graph.record(ComponentId::from_raw(0)).unwrap();
        assert!(tag_record.is_tag());
        assert_eq!(tag_record.column_slot(first), Some(0));
        let data_record = graph.record(ComponentId::from_raw(2)).unwrap();
        assert_eq!(data_record.column_slot(first), Some(1));
        assert_eq!(data_record.archetype_count(), 1);
    }

    #[test]
    fn test_unknown_component_creates_nothing() {
        let (registry, mut graph) = setup();
        let sig = TypeSignature::from_ids([ComponentId::from_raw(1), ComponentId::from_raw(40)]);
        assert_eq!(
            graph.ensure(&sig, &registry),
            Err(EcsError::UnknownComponent(ComponentId::from_raw(40)))
        );
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.record(ComponentId::from_raw(1)).unwrap().archetype_count(), 0);
    }

    #[test]
    fn test_transitions_are_memoized() {
        let (registry, mut graph) = setup();
        let mass = ComponentId::from_raw(1);
        let to = graph
            .transition(ArchetypeId::ROOT, mass, true, &registry)
            .unwrap();
        assert_eq!(graph.transition_count(), 1);
        let again = graph
            .transition(ArchetypeId::ROOT, mass, true, &registry)
            .unwrap();
        assert_eq!(again, to);
        assert_eq!(graph.transition_count(), 1);

        let back = graph.transition(to, mass, false, &registry).unwrap();
        assert_eq!(back, ArchetypeId::ROOT);
        // Removing an absent component stays put
        let stay = graph
            .transition(ArchetypeId::ROOT, mass, false, &registry)
            .unwrap();
        assert_eq!(stay, ArchetypeId::ROOT);
    }

    #[test]
    fn test_archetype_limit() {
        let mut registry = ComponentRegistry::new();
        let a = registry.tag();
        let b = registry.tag();
        let config = WorldConfig {
            max_archetypes: 2,
            ..WorldConfig::default()
        };
        let mut graph = ArchetypeGraph::new(&registry, &config);
        graph.ensure(&TypeSignature::from_ids([a.id()]), &registry).unwrap();
        assert_eq!(
            graph.ensure(&TypeSignature::from_ids([b.id()]), &registry),
            Err(EcsError::ArchetypeLimitExceeded { limit: 2 })
        );
    }
}
