// Propscan Core - static extraction of component prop surfaces
//
// Parses TypeScript component modules with tree-sitter and reports, for each
// default-exported component, the ordered names of the props it accepts.
// Architecture: parser adapter -> syntax arena -> export/type resolvers, with a
// per-run module cache and a thin batch driver on top.

pub mod error;
pub mod extractors;
pub mod language;
pub mod module_cache;
pub mod scan;
pub mod utils;

pub use error::{ApiError, FailureKind};
pub use extractors::typescript::{extract_props, PropTypeRef, PropsExtractor};
pub use module_cache::ModuleCache;
pub use scan::{FileReport, Outcome, ScanConfig, ScanReport};
