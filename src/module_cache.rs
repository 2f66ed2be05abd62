//! Module Cache - parse each module at most once per run
//!
//! Keys are canonical file paths, so `./button`, `./button/index` and the
//! absolute path of `button/index.tsx` all share one entry. Parsed trees are
//! handed out as `Arc`s and never change after insertion.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::ApiError;
use crate::extractors::base::SyntaxTree;
use crate::extractors::typescript::{SourceParser, TsParser};
use crate::utils::paths::normalize_path;

/// Suffixes tried, in order, when a module path does not name a file directly
pub const MODULE_SUFFIXES: &[&str] = &["", ".ts", ".tsx", ".d.ts", "/index.ts", "/index.tsx"];

pub struct ModuleCache {
    parser: Box<dyn SourceParser>,
    modules: HashMap<PathBuf, Arc<SyntaxTree>>,
    /// Requested spelling to canonical key
    aliases: HashMap<PathBuf, PathBuf>,
}

impl ModuleCache {
    /// Cache backed by the tree-sitter TypeScript parser
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::with_parser(TsParser::new()?))
    }

    pub fn with_parser(parser: impl SourceParser + 'static) -> Self {
        Self {
            parser: Box::new(parser),
            modules: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Return the parsed module at `path`, loading it on first request
    ///
    /// `path` may omit the extension or name a directory with an index file.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<SyntaxTree>, ApiError> {
        let requested = normalize_path(path);
        let known = self.aliases.get(&requested).unwrap_or(&requested);
        if let Some(module) = self.modules.get(known) {
            return Ok(Arc::clone(module));
        }

        let Some(found) = resolve_module_file(&requested) else {
            return Err(ApiError::FileNotFound { path: requested });
        };
        let resolved = found.canonicalize().unwrap_or(found);
        if let Some(module) = self.modules.get(&resolved) {
            let module = Arc::clone(module);
            self.aliases.insert(requested, resolved);
            return Ok(module);
        }

        debug!("📂 Open file: {}", resolved.display());
        let source = fs::read_to_string(&resolved).map_err(|source| ApiError::Io {
            path: resolved.clone(),
            source,
        })?;
        let module = Arc::new(self.parser.parse(source, &resolved)?);
        if requested != resolved {
            self.aliases.insert(requested, resolved.clone());
        }
        self.modules.insert(resolved, Arc::clone(&module));
        Ok(module)
    }

    /// Already-loaded module under its canonical path
    pub fn get(&self, path: &Path) -> Option<&Arc<SyntaxTree>> {
        self.modules.get(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// First existing file among `path` + each of [`MODULE_SUFFIXES`]
pub fn resolve_module_file(path: &Path) -> Option<PathBuf> {
    MODULE_SUFFIXES
        .iter()
        .map(|suffix| {
            let mut candidate = path.as_os_str().to_os_string();
            candidate.push(suffix);
            PathBuf::from(candidate)
        })
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Counts how many times the wrapped parser actually runs
    struct CountingParser {
        inner: TsParser,
        calls: Rc<Cell<usize>>,
    }

    impl SourceParser for CountingParser {
        fn parse(&mut self, source: String, path: &Path) -> Result<SyntaxTree, ApiError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.parse(source, path)
        }
    }

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("button")).unwrap();
        fs::write(
            dir.path().join("button/index.tsx"),
            "export default class Button extends Component<ButtonProps> {}\n",
        )
        .unwrap();
        fs::write(dir.path().join("types.d.ts"), "interface T { a: string }\n").unwrap();
        dir
    }

    #[test]
    fn test_suffix_resolution_order() {
        let dir = project();
        let root = dir.path();

        assert_eq!(
            resolve_module_file(&root.join("button")),
            Some(root.join("button/index.tsx"))
        );
        assert_eq!(resolve_module_file(&root.join("types")), Some(root.join("types.d.ts")));
        assert_eq!(
            resolve_module_file(&root.join("button/index.tsx")),
            Some(root.join("button/index.tsx"))
        );
        assert_eq!(resolve_module_file(&root.join("missing")), None);
    }

    #[test]
    fn test_same_module_through_different_spellings() {
        let dir = project();
        let calls = Rc::new(Cell::new(0));
        let mut cache = ModuleCache::with_parser(CountingParser {
            inner: TsParser::new().unwrap(),
            calls: Rc::clone(&calls),
        });

        let first = cache.get_or_load(&dir.path().join("button")).unwrap();
        let second = cache.get_or_load(&dir.path().join("button/index")).unwrap();
        let third = cache
            .get_or_load(&dir.path().join("button/./index.tsx"))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(first.path()).is_some());
    }

    #[test]
    fn test_repeat_lookup_uses_recorded_alias() {
        let dir = project();
        let mut cache = ModuleCache::new().unwrap();
        let spelling = dir.path().join("button");

        let first = cache.get_or_load(&spelling).unwrap();
        assert_eq!(cache.aliases.get(&spelling), Some(&first.path().to_path_buf()));

        // the file is gone, so only the recorded alias can answer
        fs::remove_file(dir.path().join("button/index.tsx")).unwrap();
        let again = cache.get_or_load(&spelling).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_module() {
        let dir = project();
        let mut cache = ModuleCache::new().unwrap();
        let err = cache.get_or_load(&dir.path().join("nowhere")).unwrap_err();
        assert_eq!(err.kind(), FailureKind::FileNotFound);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_parse_failure_is_not_cached() {
        let dir = project();
        fs::write(dir.path().join("broken.ts"), "interface {\n").unwrap();

        let mut cache = ModuleCache::new().unwrap();
        let err = cache.get_or_load(&dir.path().join("broken")).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ParseError);
        assert!(cache.is_empty());
    }
}
