//! Entity loading utilities
//!
//! Generic helpers for reading and writing YAML entities, shared by the
//! repository and the CLI commands.

use miette::{IntoDiagnostic, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::entity::Entity;

fn is_yaml(path: &Path) -> bool {
    path.extension().map_or(false, |e| e == "yaml" || e == "yml")
}

/// Load all entities of type T below a directory, recursively
///
/// Files that fail to parse are skipped with a warning.
pub fn load_all<T: DeserializeOwned + 'static>(dir: &Path) -> Result<Vec<T>> {
    let mut entities = Vec::new();

    if !dir.exists() {
        return Ok(entities);
    }

    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_yaml(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    // deterministic load order regardless of filesystem
    paths.sort();

    for path in paths {
        let content = fs::read_to_string(&path).into_diagnostic()?;
        match serde_yml::from_str::<T>(&content) {
            Ok(entity) => entities.push(entity),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unparseable file"),
        }
    }

    Ok(entities)
}

/// Load a single entity from a file
pub fn load_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).into_diagnostic()?;
    serde_yml::from_str(&content).into_diagnostic()
}

/// Find an entity by exact title, or by full or partial ID
pub fn find_entity<T: Entity + 'static>(dir: &Path, query: &str) -> Result<Option<T>> {
    let mut entities: Vec<T> = load_all(dir)?;
    let index = entities
        .iter()
        .position(|e| e.title() == query)
        .or_else(|| {
            entities
                .iter()
                .position(|e| e.id().to_string().contains(query))
        });
    Ok(index.map(|i| entities.swap_remove(i)))
}

/// Write an entity as YAML, creating parent directories as needed
pub fn save_entity<T: Serialize>(path: &Path, entity: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(entity).into_diagnostic()?;
    fs::write(path, yaml).into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_all_empty_dir() {
        let dir = tempdir().unwrap();
        let result: Result<Vec<serde_json::Value>> = load_all(dir.path());
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_load_all_nonexistent_dir() {
        let result: Result<Vec<serde_json::Value>> = load_all(Path::new("/nonexistent/path"));
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_load_all_recurses_and_skips_bad_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("acme")).unwrap();
        fs::write(dir.path().join("acme/a.tps.yaml"), "value: 1\n").unwrap();
        fs::write(dir.path().join("b.tps.yaml"), "value: 2\n").unwrap();
        fs::write(dir.path().join("c.tps.yaml"), "other: [\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "value: 3\n").unwrap();

        #[derive(serde::Deserialize)]
        struct Doc {
            value: u32,
        }

        let docs: Vec<Doc> = load_all(dir.path()).unwrap();
        let mut values: Vec<u32> = docs.iter().map(|d| d.value).collect();
        values.sort();
        assert_eq!(values, vec![1, 2]);
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Named {
        id: String,
        name: String,
    }

    impl Entity for Named {
        type Id = String;

        fn id(&self) -> &String {
            &self.id
        }

        fn title(&self) -> &str {
            &self.name
        }
    }

    #[test]
    fn test_find_entity_by_title_then_id() {
        let dir = tempdir().unwrap();
        let first = Named {
            id: "BSL-01HQ3K4N5M6P7R8S9T0VWXYZAB".to_string(),
            name: "BSL-01HQ9".to_string(),
        };
        let second = Named {
            id: "BSL-01HQ9ZZZZZZZZZZZZZZZZZZZZZ".to_string(),
            name: "release".to_string(),
        };
        save_entity(&dir.path().join("a.tps.yaml"), &first).unwrap();
        save_entity(&dir.path().join("nested/b.tps.yaml"), &second).unwrap();

        // an exact title wins over a partial id
        let found: Named = find_entity(dir.path(), "BSL-01HQ9").unwrap().unwrap();
        assert_eq!(found.name, "BSL-01HQ9");

        let found: Named = find_entity(dir.path(), "01HQ9ZZ").unwrap().unwrap();
        assert_eq!(found.name, "release");

        let missing: Option<Named> = find_entity(dir.path(), "v2").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_find_entity_nonexistent_dir() {
        let result: Option<Named> = find_entity(Path::new("/nonexistent/path"), "BSL-123").unwrap();
        assert!(result.is_none());
    }
}
