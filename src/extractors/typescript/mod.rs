//! TypeScript component prop extraction with modular architecture
//!
//! Resolves the prop surface of a component entry module in two passes: find
//! the type argument the default-exported class passes to its base class, then
//! expand that type into its ordered property names.
//!
//! - **parser**: tree-sitter adapter lowering TS/TSX into the syntax arena
//! - **exports**: the three default-export idioms that yield a prop-type name
//! - **interfaces**: interface / type-alias lookup, inline and one import away
//! - **imports**: import-binding lookup shared by both resolvers

mod exports;
mod imports;
mod interfaces;
pub mod parser;

pub use exports::PropTypeRef;
pub use parser::{SourceParser, TsParser};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::ApiError;
use crate::extractors::base::SyntaxTree;
use crate::module_cache::ModuleCache;

/// Parse a standalone source string without touching the filesystem
///
/// `file_name` only selects the grammar (`.tsx` gets the TSX grammar) and is
/// recorded as the tree's path.
pub fn parse_source(source: &str, file_name: &str) -> anyhow::Result<SyntaxTree> {
    let mut parser = TsParser::new()?;
    Ok(parser.parse(source.to_string(), Path::new(file_name))?)
}

/// Resolve the props of one entry module using a shared cache
pub fn extract_props(cache: &mut ModuleCache, entry: &Path) -> Result<Vec<String>, ApiError> {
    PropsExtractor::new(cache).extract_props(entry)
}

/// Main prop extractor that orchestrates export and type resolution
pub struct PropsExtractor<'c> {
    cache: &'c mut ModuleCache,
    /// (module, type name) pairs currently being expanded
    resolving: HashSet<(PathBuf, String)>,
}

impl<'c> PropsExtractor<'c> {
    pub fn new(cache: &'c mut ModuleCache) -> Self {
        Self {
            cache,
            resolving: HashSet::new(),
        }
    }

    /// Ordered prop names of the component exported by `entry`
    ///
    /// Duplicates are kept: a name declared both by a base type and by the
    /// type itself appears twice, bases first.
    pub fn extract_props(&mut self, entry: &Path) -> Result<Vec<String>, ApiError> {
        let module = self.cache.get_or_load(entry)?;
        let prop_type = self
            .find_prop_type(&module)?
            .ok_or_else(|| ApiError::ExportNotFound {
                path: module.path().to_path_buf(),
            })?;

        debug!(
            "🎯 {} exports props `{}` (declared from {})",
            module.path().display(),
            prop_type.name,
            prop_type.module.path().display()
        );

        self.resolve_type(&prop_type.module, &prop_type.name)
    }

    /// Locate the prop-type reference of a module's default export
    pub fn find_prop_type(
        &mut self,
        module: &Arc<SyntaxTree>,
    ) -> Result<Option<PropTypeRef>, ApiError> {
        exports::find_prop_type(self, module)
    }

    /// Expand a type name visible in `module` into its property names
    pub fn resolve_type(
        &mut self,
        module: &Arc<SyntaxTree>,
        name: &str,
    ) -> Result<Vec<String>, ApiError> {
        interfaces::resolve_type(self, module, name)
    }

    // ========================================================================
    // Internal access for sub-modules
    // ========================================================================

    pub(crate) fn cache_mut(&mut self) -> &mut ModuleCache {
        &mut *self.cache
    }

    /// Mark `(module, name)` as in progress; false if it already was
    pub(crate) fn enter(&mut self, module: &Path, name: &str) -> bool {
        self.resolving
            .insert((module.to_path_buf(), name.to_string()))
    }

    pub(crate) fn leave(&mut self, module: &Path, name: &str) {
        self.resolving
            .remove(&(module.to_path_buf(), name.to_string()));
    }
}
