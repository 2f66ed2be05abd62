// Utilities Module
//
// Helpers shared by the module cache and the scan driver.

/// Path normalization and root-relative conversion
pub mod paths;
