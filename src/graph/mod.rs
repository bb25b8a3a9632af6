//! Schema Graph
//!
//! Traversal of individual schema documents ([`walker`]) and the
//! entity-to-entity reference graph spanning a registry ([`references`]).

pub mod walker;
pub mod references;

pub use walker::{SchemaWalker, WalkOptions, DEFAULT_MAX_DEPTH};
pub use references::{DanglingReference, ReferenceGraph};
