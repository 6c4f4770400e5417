//! Data source reader
//!
//! Loads JSON data files from the data directory and extracts a single
//! top-level field. Everything under that field is passed through untouched.

use crate::error::{PanelError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A JSON data file exposed through the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSource {
    /// Exact request path that serves this source
    pub route: &'static str,
    /// File name inside the data directory
    pub filename: &'static str,
    /// Top-level field extracted from the file
    pub field: &'static str,
}

/// Data files served by the API
pub const DATA_SOURCES: &[DataSource] = &[
    DataSource {
        route: "/api/domains",
        filename: "domains.json",
        field: "domainManagement",
    },
    DataSource {
        route: "/api/websites",
        filename: "websites-servers.json",
        field: "personalWebsites",
    },
];

impl DataSource {
    /// Find the data source served at `route`. Matching is exact.
    #[must_use]
    pub fn for_route(route: &str) -> Option<&'static DataSource> {
        DATA_SOURCES.iter().find(|source| source.route == route)
    }

    /// Read this source's field from `data_dir`.
    ///
    /// # Errors
    ///
    /// See [`read_field`].
    pub fn load(&self, data_dir: &Path) -> Result<Value> {
        read_field(&data_dir.join(self.filename), self.field)
    }
}

/// Read `path` as JSON and return the top-level field `key`.
///
/// A missing key yields an empty array.
///
/// # Errors
///
/// Returns an error if the file cannot be read as UTF-8 text, is not valid
/// JSON, or its top-level value is not an object.
pub fn read_field(path: &Path, key: &str) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|source| PanelError::DataRead {
        path: path.to_path_buf(),
        source,
    })?;

    // Numbers keep their source text, so large integers pass through unchanged.
    let document: Value =
        serde_json::from_str(&text).map_err(|source| PanelError::DataParse {
            path: path.to_path_buf(),
            source,
        })?;

    let Value::Object(mut fields) = document else {
        return Err(PanelError::DataShape(path.to_path_buf()));
    };

    match fields.remove(key) {
        Some(value) => Ok(value),
        None => {
            tracing::debug!("{} has no `{key}` field; using an empty list", path.display());
            Ok(Value::Array(Vec::new()))
        }
    }
}
