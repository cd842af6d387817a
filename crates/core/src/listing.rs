//! Inventory and playbook discovery.
//!
//! Inventories are `*.inv` files and playbooks are `*.yml` files sitting
//! directly in the playbook directory. Subdirectories (roles, group_vars)
//! are not scanned. Hidden files are skipped.

use std::io;
use std::path::Path;

/// File extension (without the dot) identifying inventories.
pub const INVENTORY_EXTENSION: &str = "inv";

/// File extension (without the dot) identifying playbooks.
pub const PLAYBOOK_EXTENSION: &str = "yml";

/// List inventory file names under `base`, sorted.
pub fn list_inventories(base: &Path) -> io::Result<Vec<String>> {
    list_with_extension(base, INVENTORY_EXTENSION)
}

/// List playbook file names under `base`, sorted.
pub fn list_playbooks(base: &Path) -> io::Result<Vec<String>> {
    list_with_extension(base, PLAYBOOK_EXTENSION)
}

fn list_with_extension(base: &Path, extension: &str) -> io::Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in std::fs::read_dir(base)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        // Non UTF-8 names cannot be sent back over the JSON API anyway.
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !name.starts_with('.') {
                names.push(name.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("create temp dir");
        for name in [
            "web.inv",
            "db.inv",
            "site.yml",
            "deploy.yml",
            "notes.txt",
            "site.yaml",
            ".hidden.yml",
        ] {
            std::fs::write(dir.path().join(name), "").expect("write file");
        }
        std::fs::create_dir(dir.path().join("roles.yml")).expect("mkdir");
        dir
    }

    #[test]
    fn lists_inventories_sorted() {
        let dir = populated_dir();
        let names = list_inventories(dir.path()).expect("list");
        assert_eq!(names, vec!["db.inv", "web.inv"]);
    }

    #[test]
    fn lists_only_yml_files_as_playbooks() {
        let dir = populated_dir();
        let names = list_playbooks(dir.path()).expect("list");
        assert_eq!(names, vec!["deploy.yml", "site.yml"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        assert!(list_playbooks(&dir.path().join("absent")).is_err());
    }
}
