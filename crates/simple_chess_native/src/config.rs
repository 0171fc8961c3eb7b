//! # Loader Configuration
//!
//! Read once at bootstrap. Layers, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. TOML text or file ([`LoaderConfig::from_toml_str`], [`LoaderConfig::from_toml_file`])
//! 3. Environment variables ([`LoaderConfig::apply_env`])
//!
//! ```toml
//! primary_library = "simple-chess-games-c"
//! fallback_library = "simple-chess-games"
//! payload_dir = "/opt/chess/native"
//! scratch_root = "/var/tmp"
//! scratch_prefix = "chess-native-"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{LoadError, LoadResult};
use crate::payload::{
    DirectoryPayloads, EmbeddedPayloads, LibraryNames, PayloadSource, FALLBACK_LIBRARY,
    PRIMARY_LIBRARY,
};

/// Overrides [`LoaderConfig::payload_dir`].
pub const ENV_PAYLOAD_DIR: &str = "SIMPLE_CHESS_PAYLOAD_DIR";

/// Overrides [`LoaderConfig::scratch_root`].
pub const ENV_SCRATCH_DIR: &str = "SIMPLE_CHESS_SCRATCH_DIR";

/// Default scratch directory name prefix.
pub const DEFAULT_SCRATCH_PREFIX: &str = "chess-native-";

/// How the native library is located and unpacked.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Library stem tried first.
    pub primary_library: String,
    /// Library stem tried when the primary fails to load.
    pub fallback_library: String,
    /// On-disk payload tree used instead of the compiled-in table.
    pub payload_dir: Option<PathBuf>,
    /// Parent of the scratch directory; the system temp dir when unset.
    pub scratch_root: Option<PathBuf>,
    /// Scratch directory name prefix.
    pub scratch_prefix: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            primary_library: PRIMARY_LIBRARY.to_string(),
            fallback_library: FALLBACK_LIBRARY.to_string(),
            payload_dir: None,
            scratch_root: None,
            scratch_prefix: DEFAULT_SCRATCH_PREFIX.to_string(),
        }
    }
}

impl LoaderConfig {
    /// Parses TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> LoadResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| LoadError::ConfigFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    /// Defaults overridden by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_env(|key| std::env::var_os(key))
    }

    /// Applies overrides from `lookup`. Empty values are ignored.
    #[must_use]
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<std::ffi::OsString>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(dir) = non_empty(ENV_PAYLOAD_DIR) {
            self.payload_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = non_empty(ENV_SCRATCH_DIR) {
            self.scratch_root = Some(PathBuf::from(dir));
        }
        self
    }

    /// Library stems in load order.
    #[must_use]
    pub fn library_names(&self) -> LibraryNames {
        LibraryNames { primary: self.primary_library.clone(), fallback: self.fallback_library.clone() }
    }

    /// Payload source selected by this configuration.
    #[must_use]
    pub fn payload_source(&self) -> Box<dyn PayloadSource> {
        match &self.payload_dir {
            Some(dir) => Box::new(DirectoryPayloads::new(dir)),
            None => Box::new(EmbeddedPayloads::compiled()),
        }
    }
}
