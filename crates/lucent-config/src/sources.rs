//! Where an index description comes from.
//!
//! A lucent configuration is layered. Project files named `.lucent.toml` are collected from
//! the working directory upward until one sets `root = true`; the user's `~/.lucent.toml`
//! comes last, unless a root file sealed the project off.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::{ConfigError, parse::is_root_config};

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".lucent.toml";

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// In the working directory or one of its ancestors.
    Project,
    /// The user's `~/.lucent.toml`.
    Global,
}

/// One configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    /// Path to the file.
    pub path: PathBuf,
    /// Where it was found.
    pub kind: SourceKind,
    /// Whether the file sets `root = true`.
    pub root: bool,
}

/// The configuration files that apply to a directory, highest precedence first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    /// Files, closest first.
    sources: Vec<ConfigSource>,
}

impl ConfigSources {
    /// Collects the files that apply to `cwd`, using the current user's home directory.
    pub fn discover(cwd: &Path) -> Self {
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Self::discover_with_home(cwd, home.as_deref())
    }

    /// Collects the files that apply to `cwd` with an explicit home directory.
    ///
    /// The home file is classified as global even when `cwd` lies below home, and it is
    /// never listed twice.
    pub fn discover_with_home(cwd: &Path, home: Option<&Path>) -> Self {
        let global = home.map(|h| h.join(CONFIG_FILENAME));
        let mut sources = Vec::new();

        for dir in cwd.ancestors() {
            let path = dir.join(CONFIG_FILENAME);
            if !path.is_file() {
                continue;
            }
            let root = is_root_config(&path);
            let kind = if global.as_ref() == Some(&path) {
                SourceKind::Global
            } else {
                SourceKind::Project
            };
            sources.push(ConfigSource { path, kind, root });
            if root {
                return Self { sources };
            }
        }

        if let Some(path) = global
            && path.is_file()
            && !sources.iter().any(|s| s.path == path)
        {
            let root = is_root_config(&path);
            sources.push(ConfigSource {
                path,
                kind: SourceKind::Global,
                root,
            });
        }
        Self { sources }
    }

    /// Returns the files, highest precedence first.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigSource> {
        self.sources.iter()
    }

    /// Returns the file paths, highest precedence first.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.sources.iter().map(|s| s.path.clone()).collect()
    }

    /// Returns true when no file applies.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Returns the path of the user's `~/.lucent.toml`.
pub fn global_config_path() -> Result<PathBuf, ConfigError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
        .ok_or(ConfigError::NoHomeDirectory)
}
