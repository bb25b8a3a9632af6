//! Entity Reference Graph
//!
//! Directed graph of entity-to-entity references, built from each entity's
//! schema. Used to report reference cycles and dangling references across a
//! registry before resolution is attempted.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::entity::EntityDescriptor;
use crate::error::Result;
use crate::resolve::{entity_identifier, ResolverOptions};

use super::SchemaWalker;

/// A reference from one entity to a name no registered entity carries
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DanglingReference {
    pub from: String,
    pub target: String,
}

/// Entity reference graph
#[derive(Debug, Default)]
pub struct ReferenceGraph {
    graph: DiGraph<String, ()>,
    node_indices: HashMap<String, NodeIndex>,
    dangling: Vec<DanglingReference>,
}

impl ReferenceGraph {
    /// Build the graph; entities without a schema become leaf nodes
    ///
    /// Reference tokens map to entity names the same way the resolver maps
    /// them under `options`, so every edge is one `dereference` can follow.
    pub fn build(descriptors: &[Arc<EntityDescriptor>], options: &ResolverOptions) -> Result<Self> {
        let walker = SchemaWalker::new(options.walk);
        let mut graph = DiGraph::with_capacity(descriptors.len(), descriptors.len() * 2);
        let mut node_indices = HashMap::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let idx = graph.add_node(descriptor.name.clone());
            node_indices.insert(descriptor.name.clone(), idx);
        }

        let mut dangling = Vec::new();
        for descriptor in descriptors.iter().filter(|d| d.is_schema_capable()) {
            let schema = descriptor.parse_schema()?;
            let from_idx = node_indices[&descriptor.name];

            let targets: BTreeSet<String> = walker
                .collect_refs(&schema)?
                .iter()
                .map(|token| entity_identifier(token, &options.definitions_prefix).to_string())
                .filter(|id| !schema.definitions.contains_key(id))
                .collect();

            for target in targets {
                match node_indices.get(&target) {
                    Some(&to_idx) => {
                        graph.add_edge(from_idx, to_idx, ());
                    }
                    None => dangling.push(DanglingReference {
                        from: descriptor.name.clone(),
                        target,
                    }),
                }
            }
        }
        dangling.sort();

        Ok(Self {
            graph,
            node_indices,
            dangling,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Names referenced directly by `name`, sorted
    pub fn references_of(&self, name: &str) -> Vec<String> {
        let Some(&idx) = self.node_indices.get(name) else {
            return Vec::new();
        };
        let mut out: Vec<String> = self
            .graph
            .neighbors(idx)
            .filter_map(|n| self.graph.node_weight(n).cloned())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// References whose target is not registered
    pub fn dangling(&self) -> &[DanglingReference] {
        &self.dangling
    }

    /// Groups of mutually referencing entities, including self-references
    ///
    /// Members and groups are sorted by name.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut groups: Vec<Vec<String>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut members: Vec<String> = scc
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).cloned())
                    .collect();
                members.sort();
                members
            })
            .collect();
        groups.sort();
        groups
    }
}
