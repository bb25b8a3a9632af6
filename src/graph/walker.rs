//! Schema Graph Walker
//!
//! Recursive traversal over a [`SchemaNode`] tree. Nodes are visited in a fixed
//! order: the node itself, `additionalItems`, tuple `items`, single `items`,
//! `contains`, `additionalProperties`, `properties` (sorted by name),
//! `allOf`, `anyOf`, `oneOf`, `not`. The root's `definitions` are visited after
//! the root tree; nested `definitions` are never entered.
//!
//! Boolean schemas carry no keywords and are skipped. Recursion is bounded by
//! [`WalkOptions::max_depth`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::schema::{Items, SchemaNode, SchemaOrBool};

/// Default recursion bound for walker and validator
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Walker settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkOptions {
    /// Deepest nesting level accepted before failing with `DepthLimitExceeded`
    pub max_depth: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Traverses schema graphs in a deterministic order
#[derive(Debug, Clone, Default)]
pub struct SchemaWalker {
    options: WalkOptions,
}

// =============================================================================
// Child enumeration
// =============================================================================

fn schema_of(slot: &SchemaOrBool) -> Option<&SchemaNode> {
    slot.as_schema()
}

fn children(node: &SchemaNode) -> Vec<(String, &SchemaNode)> {
    let mut out: Vec<(String, &SchemaNode)> = Vec::new();

    if let Some(child) = node.additional_items.as_deref().and_then(schema_of) {
        out.push(("additionalItems".to_string(), child));
    }
    match &node.items {
        Some(Items::Tuple(list)) => {
            for (i, item) in list.iter().enumerate() {
                if let Some(child) = item.as_schema() {
                    out.push((format!("items/{}", i), child));
                }
            }
        }
        Some(Items::Single(child)) => out.push(("items".to_string(), &**child)),
        Some(Items::Bool(_)) | None => {}
    }
    if let Some(child) = node.contains.as_deref().and_then(schema_of) {
        out.push(("contains".to_string(), child));
    }
    if let Some(child) = node.additional_properties.as_deref().and_then(schema_of) {
        out.push(("additionalProperties".to_string(), child));
    }
    for (name, prop) in &node.properties {
        if let Some(child) = prop.as_schema() {
            out.push((format!("properties/{}", name), child));
        }
    }
    for (keyword, list) in [("allOf", &node.all_of), ("anyOf", &node.any_of), ("oneOf", &node.one_of)] {
        for (i, member) in list.iter().enumerate() {
            if let Some(child) = member.as_schema() {
                out.push((format!("{}/{}", keyword, i), child));
            }
        }
    }
    if let Some(child) = node.not.as_deref().and_then(schema_of) {
        out.push(("not".to_string(), child));
    }

    out
}

fn children_mut(node: &mut SchemaNode) -> Vec<(String, &mut SchemaNode)> {
    let SchemaNode {
        items,
        additional_items,
        contains,
        additional_properties,
        properties,
        all_of,
        any_of,
        one_of,
        not,
        ..
    } = node;

    let mut out: Vec<(String, &mut SchemaNode)> = Vec::new();

    if let Some(child) = additional_items.as_deref_mut().and_then(SchemaOrBool::as_schema_mut) {
        out.push(("additionalItems".to_string(), child));
    }
    match items {
        Some(Items::Tuple(list)) => {
            for (i, item) in list.iter_mut().enumerate() {
                if let Some(child) = item.as_schema_mut() {
                    out.push((format!("items/{}", i), child));
                }
            }
        }
        Some(Items::Single(child)) => out.push(("items".to_string(), &mut **child)),
        Some(Items::Bool(_)) | None => {}
    }
    if let Some(child) = contains.as_deref_mut().and_then(SchemaOrBool::as_schema_mut) {
        out.push(("contains".to_string(), child));
    }
    if let Some(child) = additional_properties.as_deref_mut().and_then(SchemaOrBool::as_schema_mut) {
        out.push(("additionalProperties".to_string(), child));
    }
    for (name, prop) in properties.iter_mut() {
        if let Some(child) = prop.as_schema_mut() {
            out.push((format!("properties/{}", name), child));
        }
    }
    for (keyword, list) in [("allOf", all_of), ("anyOf", any_of), ("oneOf", one_of)] {
        for (i, member) in list.iter_mut().enumerate() {
            if let Some(child) = member.as_schema_mut() {
                out.push((format!("{}/{}", keyword, i), child));
            }
        }
    }
    if let Some(child) = not.as_deref_mut().and_then(SchemaOrBool::as_schema_mut) {
        out.push(("not".to_string(), child));
    }

    out
}

fn breadcrumb(path: &[String]) -> String {
    if path.is_empty() {
        return "#".to_string();
    }
    format!("#/{}", path.join("/"))
}

// =============================================================================
// Walker
// =============================================================================

impl SchemaWalker {
    pub fn new(options: WalkOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> WalkOptions {
        self.options
    }

    /// Visit every reachable node
    pub fn walk<F>(&self, root: &SchemaNode, mut visit: F) -> Result<()>
    where
        F: FnMut(&SchemaNode),
    {
        let mut path = Vec::new();
        self.walk_node(root, &mut path, &mut visit)?;

        for (name, def) in &root.definitions {
            if let Some(def) = def.as_schema() {
                path.push(format!("definitions/{}", name));
                self.walk_node(def, &mut path, &mut visit)?;
                path.pop();
            }
        }
        Ok(())
    }

    /// Visit every reachable node, allowing in-place mutation
    ///
    /// A node is visited before its children are enumerated, so children
    /// replaced by `visit` are walked in their new form and never revisited.
    pub fn walk_mut<F>(&self, root: &mut SchemaNode, mut visit: F) -> Result<()>
    where
        F: FnMut(&mut SchemaNode),
    {
        let mut path = Vec::new();
        self.walk_node_mut(root, &mut path, &mut visit)?;

        for (name, def) in root.definitions.iter_mut() {
            if let Some(def) = def.as_schema_mut() {
                path.push(format!("definitions/{}", name));
                self.walk_node_mut(def, &mut path, &mut visit)?;
                path.pop();
            }
        }
        Ok(())
    }

    /// All reference tokens in visitation order
    pub fn collect_refs(&self, root: &SchemaNode) -> Result<Vec<String>> {
        let mut refs = Vec::new();
        self.walk(root, |node| {
            if let Some(token) = &node.reference {
                tracing::trace!(reference = %token, "found reference");
                refs.push(token.clone());
            }
        })?;
        Ok(refs)
    }

    /// Hand every reference token slot to `rewrite`
    pub fn for_each_ref_mut<F>(&self, root: &mut SchemaNode, mut rewrite: F) -> Result<()>
    where
        F: FnMut(&mut String),
    {
        self.walk_mut(root, |node| {
            if let Some(token) = node.reference.as_mut() {
                rewrite(token);
            }
        })
    }

    fn check_depth(&self, path: &[String]) -> Result<()> {
        if path.len() > self.options.max_depth {
            return Err(SchemaError::DepthLimitExceeded {
                breadcrumb: breadcrumb(path),
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }

    fn walk_node<F>(&self, node: &SchemaNode, path: &mut Vec<String>, visit: &mut F) -> Result<()>
    where
        F: FnMut(&SchemaNode),
    {
        self.check_depth(path)?;
        visit(node);

        for (segment, child) in children(node) {
            path.push(segment);
            self.walk_node(child, path, visit)?;
            path.pop();
        }
        Ok(())
    }

    fn walk_node_mut<F>(&self, node: &mut SchemaNode, path: &mut Vec<String>, visit: &mut F) -> Result<()>
    where
        F: FnMut(&mut SchemaNode),
    {
        self.check_depth(path)?;
        visit(node);

        for (segment, child) in children_mut(node) {
            path.push(segment);
            self.walk_node_mut(child, path, visit)?;
            path.pop();
        }
        Ok(())
    }
}
