//! Entity Registry
//!
//! Maps entity names to [`EntityDescriptor`]s. Populated during startup and read
//! by the resolver, the validator and document assembly. The map sits behind a
//! read-mostly lock so lookups from concurrent callers never observe a
//! partially inserted entity.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::entity::{EntityDescriptor, SchemaCapable};
use crate::error::Result;
use crate::graph::references::ReferenceGraph;
use crate::resolve::ResolverOptions;

/// Name-to-entity lookup used by the resolver
pub trait EntityLookup {
    fn lookup(&self, name: &str) -> Option<Arc<EntityDescriptor>>;
}

impl EntityLookup for HashMap<String, Arc<EntityDescriptor>> {
    fn lookup(&self, name: &str) -> Option<Arc<EntityDescriptor>> {
        self.get(name).cloned()
    }
}

/// The entity registry
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: RwLock<HashMap<String, Arc<EntityDescriptor>>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // The map is only ever replaced entry by entry, so a poisoned lock still
    // guards a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<EntityDescriptor>>> {
        self.entities.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<EntityDescriptor>>> {
        self.entities.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a descriptor, replacing any entity of the same name
    ///
    /// Returns the replaced descriptor.
    pub fn register(&self, descriptor: EntityDescriptor) -> Option<Arc<EntityDescriptor>> {
        let name = descriptor.name.clone();
        let previous = self.write().insert(name.clone(), Arc::new(descriptor));
        if previous.is_some() {
            tracing::warn!(entity = %name, "replacing registered entity");
        } else {
            tracing::debug!(entity = %name, "registered entity");
        }
        previous
    }

    /// Register a schema-capable value
    pub fn register_entity<E: SchemaCapable + ?Sized>(&self, entity: &E) -> Option<Arc<EntityDescriptor>> {
        self.register(EntityDescriptor::from_entity(entity))
    }

    pub fn get(&self, name: &str) -> Option<Arc<EntityDescriptor>> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot of all descriptors, sorted by name
    pub fn descriptors(&self) -> Vec<Arc<EntityDescriptor>> {
        let mut descriptors: Vec<_> = self.read().values().cloned().collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Registered names resembling `query`, best match first
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        let matcher = SkimMatcherV2::default().ignore_case();
        let mut results: Vec<(i64, String)> = self
            .read()
            .keys()
            .filter_map(|name| matcher.fuzzy_match(name, query).map(|score| (score, name.clone())))
            .collect();

        results.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        results.into_iter().take(limit).map(|(_, name)| name).collect()
    }

    /// Entity-to-entity reference graph over every schema-capable entity
    pub fn reference_graph(&self, options: &ResolverOptions) -> Result<ReferenceGraph> {
        ReferenceGraph::build(&self.descriptors(), options)
    }
}

impl EntityLookup for EntityRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<EntityDescriptor>> {
        self.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NilEntity;
    use std::thread;

    #[test]
    fn test_register_and_lookup() {
        let registry = EntityRegistry::new();
        assert!(registry.is_empty());

        registry.register_entity(&NilEntity);
        registry.register(EntityDescriptor::new("Widget", r#"{"type":"object"}"#, "{}"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["NilEntity", "Widget"]);
        assert!(registry.lookup("Widget").is_some());
        assert!(registry.lookup("widget").is_none());
    }

    #[test]
    fn test_later_registration_wins() {
        let registry = EntityRegistry::new();
        registry.register(EntityDescriptor::new("Widget", r#"{"type":"object"}"#, "{}"));
        let previous = registry.register(EntityDescriptor::new("Widget", r#"{"type":"string"}"#, "\"w\""));

        assert!(previous.is_some());
        assert_eq!(registry.len(), 1);
        let current = registry.get("Widget").unwrap();
        assert_eq!(current.example, b"\"w\"".to_vec());
    }

    #[test]
    fn test_suggest() {
        let registry = EntityRegistry::new();
        for name in ["HealthCheck", "Widget", "WidgetList"] {
            registry.register(EntityDescriptor::new(name, "{}", "{}"));
        }

        let suggestions = registry.suggest("healthchk", 3);
        assert_eq!(suggestions.first().map(String::as_str), Some("HealthCheck"));
        assert!(registry.suggest("zzz", 3).is_empty());
    }

    #[test]
    fn test_concurrent_readers() {
        let registry = Arc::new(EntityRegistry::new());
        registry.register_entity(&NilEntity);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.lookup("NilEntity").is_some())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
