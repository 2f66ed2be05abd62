//! Extractors Module
//!
//! Tree-sitter based prop extraction.
//!
//! # Architecture
//!
//! - `base` - lowered syntax arena, node navigation and path queries
//! - `typescript` - parser adapter plus the export and type resolvers

pub mod base;
pub mod typescript;

// Re-export the public API
pub use base::{NodeRef, QueryStep, Relation, SyntaxKind, SyntaxTree, Walk};
pub use typescript::{extract_props, parse_source, PropTypeRef, PropsExtractor};
