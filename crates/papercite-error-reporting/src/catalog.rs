//! Error code catalog and lookup.
//!
//! Maps error codes (like "PC-1-1") to their metadata. Codes are
//! `PC-<subsystem>-<number>`: subsystem 1 is citation processing, subsystem 2
//! is style configuration.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata for an error code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorCodeInfo {
    /// Subsystem name (e.g., "citeproc", "style")
    pub subsystem: String,

    /// Short title for the error
    pub title: String,

    /// Default message template
    pub message_template: String,

    /// When this error was introduced (version)
    pub since_version: String,
}

/// Global error catalog, embedded at compile time from `error_catalog.json`.
///
/// # Panics
///
/// Panics on first access if the embedded JSON is invalid.
pub static ERROR_CATALOG: Lazy<HashMap<String, ErrorCodeInfo>> = Lazy::new(|| {
    let json_data = include_str!("../error_catalog.json");
    serde_json::from_str(json_data).expect("Invalid error catalog JSON - this is a bug in papercite")
});

/// Look up error code information.
///
/// # Example
///
/// ```
/// use papercite_error_reporting::catalog::get_error_info;
///
/// let info = get_error_info("PC-1-1").unwrap();
/// assert_eq!(info.title, "Unknown Reference");
/// ```
pub fn get_error_info(code: &str) -> Option<&ErrorCodeInfo> {
    ERROR_CATALOG.get(code)
}

/// Get the subsystem name for an error code.
pub fn get_subsystem(code: &str) -> Option<&str> {
    ERROR_CATALOG.get(code).map(|info| info.subsystem.as_str())
}
