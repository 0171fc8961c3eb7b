//! # Bootstrap Error Types
//!
//! Everything that can stop the native engine from becoming available.
//! All of these are fatal for the process: there is no degraded mode
//! without the engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The host could not be mapped to a payload target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The operating system name is not one we ship binaries for.
    #[error("unsupported platform: {os}")]
    UnsupportedPlatform {
        /// OS name as reported by the host.
        os: String,
    },

    /// The processor architecture is not one we ship binaries for.
    #[error("unsupported architecture: {arch}")]
    UnsupportedArchitecture {
        /// Architecture string as reported by the host.
        arch: String,
    },
}

/// Result type for platform resolution.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Extraction or loading failed.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Not a single payload exists for the resolved target.
    #[error("no native libraries found for platform: {platform}/{architecture}")]
    NoPayloads {
        /// Platform directory name.
        platform: &'static str,
        /// Architecture directory name.
        architecture: &'static str,
    },

    /// The private scratch directory could not be created.
    #[error("could not create scratch directory: {0}")]
    ScratchDir(#[source] io::Error),

    /// A payload could not be read or written.
    #[error("failed to extract {file}: {source}")]
    Extract {
        /// File being read or written.
        file: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The loader configuration could not be parsed.
    #[error("invalid loader configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The loader configuration file could not be read.
    #[error("could not read loader configuration {path}: {source}")]
    ConfigFile {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Neither the primary nor the fallback library could be loaded.
    #[error(
        "failed to load native chess library. Platform: {os} {arch} \
         (primary: {primary}; fallback: {fallback})"
    )]
    NativeLibraryLoad {
        /// Host OS name.
        os: String,
        /// Host architecture.
        arch: String,
        /// Why the primary library failed.
        primary: String,
        /// Why the fallback library failed.
        fallback: String,
    },

    /// The library loaded but does not export a required entry point.
    #[error("native library is missing symbol {symbol}: {reason}")]
    MissingSymbol {
        /// Symbol name.
        symbol: String,
        /// Loader message.
        reason: String,
    },
}

/// Result type for extraction and loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Any failure during bootstrap.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Unsupported host.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Extraction or loading failed.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Result type for bootstrap.
pub type BootstrapResult<T> = Result<T, BootstrapError>;
