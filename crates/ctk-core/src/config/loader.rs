//! Multi-file configuration loading.

use std::path::Path;

use indexmap::IndexMap;

use crate::config::{ConfigPath, interpolate, is_yaml_file};
use crate::error::ConfigError;

/// Trait for configs that can be assembled from several YAML files.
///
/// Named entries (the `entries` map) must be unique across files. Everything
/// else is merged section by section via `merge_settings`.
pub trait Mergeable: Sized + Default {
    type Key: Eq + std::hash::Hash + Clone + std::fmt::Display;
    type Entry;

    fn entries_mut(&mut self) -> &mut IndexMap<Self::Key, Self::Entry>;

    /// Merge the non-keyed sections of `other` into `self` (last write wins).
    fn merge_settings(&mut self, other: &mut Self);

    fn parse_yaml(contents: &str) -> Result<Self, ConfigError>;

    fn merge(&mut self, mut other: Self) -> Result<(), ConfigError> {
        let duplicates: Vec<String> = other
            .entries_mut()
            .keys()
            .filter(|key| self.entries_mut().contains_key(*key))
            .map(|key| key.to_string())
            .collect();

        if !duplicates.is_empty() {
            return Err(ConfigError::DuplicateEntries { keys: duplicates });
        }

        self.merge_settings(&mut other);
        for (key, entry) in other.entries_mut().drain(..) {
            self.entries_mut().insert(key, entry);
        }
        Ok(())
    }
}

/// Load and merge configuration from files and directories, in order.
///
/// All failures are collected so that one run reports every broken file.
pub fn load_from_paths<C: Mergeable>(paths: &[ConfigPath]) -> Result<C, ConfigError> {
    let mut config = C::default();
    let mut errors = Vec::new();

    for path in paths {
        let (location, partial) = match path {
            ConfigPath::File(file) => (file.as_path(), load_file::<C>(file)),
            ConfigPath::Dir(dir) => (dir.as_path(), load_dir::<C>(dir)),
        };
        if let Err(e) = partial.and_then(|partial| config.merge(partial)) {
            errors.push(format!("{}: {}", location.display(), e));
        }
    }

    if !errors.is_empty() {
        return Err(ConfigError::MultipleErrors { errors });
    }
    Ok(config)
}

fn load_file<C: Mergeable>(path: &Path) -> Result<C, ConfigError> {
    if !is_yaml_file(path) {
        return Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let contents =
        std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile { source })?;

    let result = interpolate(&contents);
    if !result.is_ok() {
        return Err(ConfigError::EnvInterpolation {
            message: result.errors.join("\n"),
        });
    }

    C::parse_yaml(&result.text)
}

fn load_dir<C: Mergeable>(dir: &Path) -> Result<C, ConfigError> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .map_err(|source| ConfigError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_yaml_file(path))
        .collect();
    files.sort();

    let mut config = C::default();
    let mut errors = Vec::new();
    for path in files {
        if let Err(e) = load_file::<C>(&path).and_then(|partial| config.merge(partial)) {
            errors.push(format!("{}: {}", path.display(), e));
        }
    }

    if !errors.is_empty() {
        return Err(ConfigError::MultipleErrors { errors });
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct TestConfig {
        name: Option<String>,
        entries: IndexMap<String, u32>,
    }

    impl Mergeable for TestConfig {
        type Key = String;
        type Entry = u32;

        fn entries_mut(&mut self) -> &mut IndexMap<String, u32> {
            &mut self.entries
        }

        fn merge_settings(&mut self, other: &mut Self) {
            if other.name.is_some() {
                self.name = other.name.take();
            }
        }

        fn parse_yaml(contents: &str) -> Result<Self, ConfigError> {
            serde_yaml::from_str(contents).map_err(|source| ConfigError::YamlParse { source })
        }
    }

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        write!(std::fs::File::create(&path).unwrap(), "{contents}").unwrap();
        path
    }

    #[test]
    fn test_files_merge_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.yaml", "name: first\nentries:\n  one: 1\n");
        let b = write(dir.path(), "b.yml", "name: second\nentries:\n  two: 2\n");

        let config: TestConfig =
            load_from_paths(&[ConfigPath::file(a), ConfigPath::file(b)]).unwrap();
        assert_eq!(config.name.as_deref(), Some("second"));
        assert_eq!(config.entries.keys().collect::<Vec<_>>(), vec!["one", "two"]);
    }

    #[test]
    fn test_directory_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "10.yaml", "entries:\n  one: 1\n");
        write(dir.path(), "notes.txt", "not: yaml: at all");

        let config: TestConfig = load_from_paths(&[ConfigPath::dir(dir.path())]).unwrap();
        assert_eq!(config.entries.len(), 1);
    }

    #[test]
    fn test_errors_are_collected() {
        let dir = tempfile::tempdir().unwrap();
        let toml = write(dir.path(), "ctk.toml", "name = 'x'");
        let missing = dir.path().join("missing.yaml");

        let err = load_from_paths::<TestConfig>(&[ConfigPath::file(toml), ConfigPath::file(missing)])
            .unwrap_err();
        match err {
            ConfigError::MultipleErrors { errors } => assert_eq!(errors.len(), 2),
            other => panic!("Expected MultipleErrors, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_entries() {
        let mut first = TestConfig::default();
        first.entries.insert("one".into(), 1);
        let mut second = TestConfig::default();
        second.entries.insert("one".into(), 2);

        match first.merge(second) {
            Err(ConfigError::DuplicateEntries { keys }) => assert_eq!(keys, vec!["one"]),
            other => panic!("Expected DuplicateEntries, got {other:?}"),
        }
    }
}
