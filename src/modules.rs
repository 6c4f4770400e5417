//! Module availability prober
//!
//! Each panel module is backed by one file in the data directory. A module is
//! available when that file exists; the check runs on every call.

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Known modules and the data file backing each one, in display order
pub const MODULES: &[(&str, &str)] = &[
    ("domains", "domains.json"),
    ("websites", "websites-servers.json"),
    ("hardware", "computer-hardware.json"),
    ("backup", "backup-management.md"),
    ("network", "network-services.md"),
    ("files", "file-management.md"),
];

/// Availability of a single module at probe time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub name: &'static str,
    pub source_filename: &'static str,
    pub available: bool,
}

#[derive(Serialize)]
struct ModuleStatus {
    available: bool,
    source: &'static str,
}

/// Check every registered module against `data_dir`.
#[must_use]
pub fn probe(data_dir: &Path) -> Vec<ModuleDescriptor> {
    MODULES
        .iter()
        .map(|&(name, source_filename)| ModuleDescriptor {
            name,
            source_filename,
            available: data_dir.join(source_filename).exists(),
        })
        .collect()
}

/// Render probe results as `{name: {available, source}}`, keeping registry order.
#[must_use]
pub fn to_json(modules: &[ModuleDescriptor]) -> Value {
    let entries: Map<String, Value> = modules
        .iter()
        .map(|module| {
            let status = ModuleStatus {
                available: module.available,
                source: module.source_filename,
            };
            (module.name.to_string(), serde_json::json!(status))
        })
        .collect();
    Value::Object(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_directory_has_nothing_available() {
        let dir = tempdir().unwrap();
        let modules = probe(dir.path());

        assert_eq!(modules.len(), 6);
        assert!(modules.iter().all(|m| !m.available));
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let dir = tempdir().unwrap();
        let modules = probe(&dir.path().join("computer-data-structure"));
        assert!(modules.iter().all(|m| !m.available));
    }

    #[test]
    fn availability_follows_the_filesystem() {
        let dir = tempdir().unwrap();
        let backup = dir.path().join("backup-management.md");

        fs::write(&backup, "# Backups").unwrap();
        let before = probe(dir.path());
        assert!(before.iter().find(|m| m.name == "backup").unwrap().available);

        fs::remove_file(&backup).unwrap();
        let after = probe(dir.path());
        assert!(!after.iter().find(|m| m.name == "backup").unwrap().available);
    }

    #[test]
    fn json_keeps_registry_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("domains.json"), "{}").unwrap();

        let value = to_json(&probe(dir.path()));
        let object = value.as_object().unwrap();
        let names: Vec<&str> = object.keys().map(String::as_str).collect();

        assert_eq!(
            names,
            ["domains", "websites", "hardware", "backup", "network", "files"]
        );
        assert_eq!(
            object["domains"],
            serde_json::json!({"available": true, "source": "domains.json"})
        );
        assert_eq!(object["files"]["available"], false);
    }
}
