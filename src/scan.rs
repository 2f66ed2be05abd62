//! Batch scanning of component entry modules
//!
//! Enumerates entry modules under a project root and resolves each one's prop
//! surface. A failure in one entry is recorded in the report and the scan moves
//! on; only failing to enumerate entries at all aborts the run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::FailureKind;
use crate::extractors::typescript::extract_props;
use crate::module_cache::ModuleCache;
use crate::utils::paths::{normalize_path, to_relative_unix_style};

/// Optional per-project configuration file, read from the scan root
pub const CONFIG_FILE: &str = "propscan.json";

/// Entry modules scanned when no pattern is configured
pub const DEFAULT_PATTERN: &str = "components/*/index.ts*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Project root; relative values are resolved against the config's directory
    pub root: PathBuf,
    /// Glob, relative to `root`, selecting entry modules
    pub pattern: String,
    /// Worker threads; 1 scans sequentially
    pub jobs: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            pattern: DEFAULT_PATTERN.to_string(),
            jobs: 1,
        }
    }
}

impl ScanConfig {
    /// Load `propscan.json` from `dir`, or defaults rooted at `dir` when absent
    pub fn load(dir: &Path) -> Result<Self> {
        let file = dir.join(CONFIG_FILE);
        let mut config = if file.is_file() {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let config: ScanConfig = serde_json::from_str(&content)
                .with_context(|| format!("Invalid configuration in {}", file.display()))?;
            debug!("Loaded {}", file.display());
            config
        } else {
            Self::default()
        };

        config.root = normalize_path(&dir.join(&config.root));
        Ok(config)
    }
}

/// Scan result for a single entry module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Entry path relative to the scan root, `/`-separated
    pub path: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Resolved { props: Vec<String> },
    Failed { kind: FailureKind, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub files: Vec<FileReport>,
}

impl ScanReport {
    pub fn resolved_count(&self) -> usize {
        self.files
            .iter()
            .filter(|file| matches!(file.outcome, Outcome::Resolved { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.files.len() - self.resolved_count()
    }
}

/// Entry modules matching `root/pattern`, sorted
pub fn enumerate_entries(config: &ScanConfig) -> Result<Vec<PathBuf>> {
    let root = config
        .root
        .to_str()
        .context("Scan root contains invalid UTF-8")?;
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(root.trim_end_matches(['/', '\\'])),
        config.pattern
    );

    let mut entries = Vec::new();
    for entry in
        glob::glob(&pattern).with_context(|| format!("Invalid scan pattern '{}'", pattern))?
    {
        match entry {
            Ok(path) if path.is_file() => entries.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable path: {}", e),
        }
    }

    entries.sort();
    Ok(entries)
}

/// Resolve every entry module under `config.root`
pub fn run(config: &ScanConfig) -> Result<ScanReport> {
    let entries = enumerate_entries(config)?;
    info!(
        "🔍 Scanning {} entry modules under {}",
        entries.len(),
        config.root.display()
    );

    let files = if config.jobs > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs)
            .build()
            .context("Failed to build scan thread pool")?;

        // One cache per worker; nothing is shared across threads.
        pool.install(|| {
            entries
                .par_iter()
                .map_init(ModuleCache::new, |cache, entry| -> Result<FileReport> {
                    let cache = cache.as_mut().map_err(|e| anyhow!("{:#}", e))?;
                    Ok(scan_entry(cache, &config.root, entry))
                })
                .collect::<Result<Vec<_>>>()
        })?
    } else {
        let mut cache = ModuleCache::new()?;
        entries
            .iter()
            .map(|entry| scan_entry(&mut cache, &config.root, entry))
            .collect()
    };

    let report = ScanReport { files };
    info!(
        "✅ Scan finished: {} resolved, {} failed",
        report.resolved_count(),
        report.failed_count()
    );
    Ok(report)
}

fn scan_entry(cache: &mut ModuleCache, root: &Path, entry: &Path) -> FileReport {
    let path =
        to_relative_unix_style(entry, root).unwrap_or_else(|_| entry.display().to_string());

    let outcome = match extract_props(cache, entry) {
        Ok(props) => {
            debug!("{}: {} props", path, props.len());
            Outcome::Resolved { props }
        }
        Err(err) => {
            warn!("⚠️  {}: {}", path, err);
            Outcome::Failed {
                kind: err.kind(),
                message: err.to_string(),
            }
        }
    };

    FileReport { path, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn samples() -> ScanConfig {
        ScanConfig {
            root: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_samples"),
            ..ScanConfig::default()
        }
    }

    fn props(report: &ScanReport, path: &str) -> Outcome {
        report
            .files
            .iter()
            .find(|file| file.path == path)
            .map(|file| file.outcome.clone())
            .unwrap_or_else(|| panic!("{path} missing from report"))
    }

    fn resolved(names: &[&str]) -> Outcome {
        Outcome::Resolved {
            props: names.iter().map(|name| name.to_string()).collect(),
        }
    }

    #[test]
    fn test_enumerate_entries_is_sorted() {
        let entries = enumerate_entries(&samples()).unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|path| to_relative_unix_style(path, &samples().root).unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "components/alert/index.tsx",
                "components/badge/index.tsx",
                "components/button/index.tsx",
                "components/divider/index.tsx",
                "components/icon/index.ts",
                "components/layout/index.tsx",
                "components/tabs/index.ts",
                "components/tag/index.tsx",
            ]
        );
    }

    #[test]
    fn test_scan_sample_project() {
        let report = run(&samples()).unwrap();

        assert_eq!(report.files.len(), 8);
        assert_eq!(
            props(&report, "components/alert/index.tsx"),
            resolved(&["type", "message", "closable", "onClose"])
        );
        assert_eq!(
            props(&report, "components/button/index.tsx"),
            resolved(&["prefixCls", "className", "type", "size", "onClick"])
        );
        assert_eq!(
            props(&report, "components/tag/index.tsx"),
            resolved(&["prefixCls", "className", "color", "closable"])
        );
        assert_eq!(
            props(&report, "components/tabs/index.ts"),
            resolved(&["activeKey", "onChange"])
        );
        assert_eq!(
            props(&report, "components/divider/index.tsx"),
            resolved(&["prefixCls", "className", "dashed", "orientation"])
        );

        // failures are recorded and the scan continues
        match props(&report, "components/badge/index.tsx") {
            Outcome::Failed { kind, .. } => assert_eq!(kind, FailureKind::TypeNotFound),
            other => panic!("expected failure, got {other:?}"),
        }
        match props(&report, "components/icon/index.ts") {
            Outcome::Failed { kind, .. } => assert_eq!(kind, FailureKind::ExportNotFound),
            other => panic!("expected failure, got {other:?}"),
        }
        match props(&report, "components/layout/index.tsx") {
            Outcome::Failed { kind, .. } => assert_eq!(kind, FailureKind::ExportNotFound),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(report.resolved_count(), 5);
        assert_eq!(report.failed_count(), 3);
    }

    #[test]
    fn test_parallel_scan_matches_sequential() {
        let sequential = run(&samples()).unwrap();
        let parallel = run(&ScanConfig {
            jobs: 4,
            ..samples()
        })
        .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "root": "packages/ui", "pattern": "src/*/index.tsx" }"#,
        )
        .unwrap();

        let config = ScanConfig::load(dir.path()).unwrap();
        assert_eq!(config.root, dir.path().join("packages/ui"));
        assert_eq!(config.pattern, "src/*/index.tsx");
        assert_eq!(config.jobs, 1);
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ScanConfig::load(dir.path()).unwrap();
        assert_eq!(config.root, dir.path());
        assert_eq!(config.pattern, DEFAULT_PATTERN);
    }

    #[test]
    fn test_invalid_config_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        let err = ScanConfig::load(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid configuration"));
    }

    #[test]
    fn test_report_json_shape() {
        let report = ScanReport {
            files: vec![
                FileReport {
                    path: "components/a/index.tsx".to_string(),
                    outcome: resolved(&["x"]),
                },
                FileReport {
                    path: "components/b/index.tsx".to_string(),
                    outcome: Outcome::Failed {
                        kind: FailureKind::FileNotFound,
                        message: "file not found: b".to_string(),
                    },
                },
            ],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "files": [
                    { "path": "components/a/index.tsx", "status": "resolved", "props": ["x"] },
                    {
                        "path": "components/b/index.tsx",
                        "status": "failed",
                        "kind": "file_not_found",
                        "message": "file not found: b"
                    }
                ]
            })
        );
    }
}
