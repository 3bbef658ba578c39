//! Configuration path types for multi-file loading.

use std::path::PathBuf;

use clap::Args;

/// A configuration source - either a single file or a directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigPath {
    File(PathBuf),
    Dir(PathBuf),
}

impl ConfigPath {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self::Dir(path.into())
    }
}

/// Check if a path has a YAML extension.
pub fn is_yaml_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

/// Config file options shared by every `ctk` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to configuration file (can be specified multiple times)
    #[arg(short, long, global = true)]
    pub config: Vec<PathBuf>,

    /// Path to configuration directory (can be specified multiple times)
    #[arg(short = 'C', long = "config-dir", global = true)]
    pub config_dirs: Vec<PathBuf>,
}

impl ConfigArgs {
    /// Files first, then directories, preserving order within each group.
    pub fn config_paths(&self) -> Vec<ConfigPath> {
        self.config
            .iter()
            .map(ConfigPath::file)
            .chain(self.config_dirs.iter().map(ConfigPath::dir))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_is_yaml_file() {
        assert!(is_yaml_file(Path::new("ctk.yaml")));
        assert!(is_yaml_file(Path::new("ctk.yml")));
        assert!(!is_yaml_file(Path::new("ctk.toml")));
        assert!(!is_yaml_file(Path::new("README")));
    }

    #[test]
    fn test_files_precede_directories() {
        let args = ConfigArgs {
            config: vec!["a.yaml".into(), "b.yaml".into()],
            config_dirs: vec!["conf.d".into()],
        };
        assert_eq!(
            args.config_paths(),
            vec![
                ConfigPath::file("a.yaml"),
                ConfigPath::file("b.yaml"),
                ConfigPath::dir("conf.d"),
            ]
        );
    }
}
