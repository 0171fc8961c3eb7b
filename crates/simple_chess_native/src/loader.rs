//! # Library Loader
//!
//! Resolve, extract, open. The three steps run strictly in that order so an
//! unsupported host never touches the filesystem.
//!
//! ```text
//! HostInfo ──resolve──▶ Target ──extract──▶ Extraction ──open──▶ LoadedLibrary
//!     │                                         │
//!     └─ PlatformError                          └─ primary, then fallback
//! ```
//!
//! Opening goes through [`LibraryOpener`] so the primary/fallback chain can
//! be exercised without a real shared object.

#![allow(unsafe_code)]

use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::config::LoaderConfig;
use crate::error::{BootstrapResult, LoadError, LoadResult};
use crate::extract::{extract, Extraction, LibraryRole, ScratchDir};
use crate::payload::PayloadSource;
use crate::platform::{resolve, HostInfo, Target};

/// Opens a dynamic library from a path.
pub trait LibraryOpener {
    /// The opened library.
    type Library;
    /// Why opening failed.
    type Error: Display;

    /// Opens the library at `path`.
    fn open(&self, path: &Path) -> Result<Self::Library, Self::Error>;
}

/// Opens libraries with the platform loader.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemOpener;

impl LibraryOpener for SystemOpener {
    type Library = libloading::Library;
    type Error = libloading::Error;

    fn open(&self, path: &Path) -> Result<Self::Library, Self::Error> {
        // SAFETY: the file was written by us into a private directory; its
        // initializers are the engine's own.
        unsafe { libloading::Library::new(path) }
    }
}

/// A library that was opened, together with the directory it lives in.
#[derive(Debug)]
pub struct LoadedLibrary<L> {
    /// The opened library.
    pub library: L,
    /// Which candidate succeeded.
    pub role: LibraryRole,
    /// Path it was opened from.
    pub path: PathBuf,
    /// Target it was resolved for.
    pub target: Target,
    /// Scratch directory holding the extracted files.
    pub scratch: ScratchDir,
}

/// Resolves `host` and extracts the matching payloads.
///
/// The scratch directory is created only after resolution succeeded.
pub fn prepare(
    host: &HostInfo,
    config: &LoaderConfig,
    source: &dyn PayloadSource,
) -> BootstrapResult<(Target, Extraction)> {
    let target = resolve(host)?;
    let dir = ScratchDir::create(config.scratch_root.as_deref(), &config.scratch_prefix)?;
    let extraction = extract(source, target, &config.library_names(), dir)?;
    Ok((target, extraction))
}

/// Runs the full pipeline: resolve, extract, open.
pub fn load_library<O: LibraryOpener>(
    host: &HostInfo,
    config: &LoaderConfig,
    source: &dyn PayloadSource,
    opener: &O,
) -> BootstrapResult<LoadedLibrary<O::Library>> {
    let (target, extraction) = prepare(host, config, source)?;
    Ok(open_extracted(host, target, extraction, opener)?)
}

/// Opens the primary library, falling back to the secondary one.
///
/// A candidate that was not extracted counts as a failed attempt.
pub fn open_extracted<O: LibraryOpener>(
    host: &HostInfo,
    target: Target,
    extraction: Extraction,
    opener: &O,
) -> LoadResult<LoadedLibrary<O::Library>> {
    let primary = match try_open(opener, &extraction, LibraryRole::Primary) {
        Ok((library, path)) => {
            tracing::info!(path = %path.display(), "loaded primary native library");
            return Ok(LoadedLibrary {
                library,
                role: LibraryRole::Primary,
                path,
                target,
                scratch: extraction.dir,
            });
        }
        Err(reason) => reason,
    };
    tracing::warn!(%target, reason = %primary, "primary native library failed to load, trying fallback");

    match try_open(opener, &extraction, LibraryRole::Fallback) {
        Ok((library, path)) => {
            tracing::info!(path = %path.display(), "loaded fallback native library");
            Ok(LoadedLibrary { library, role: LibraryRole::Fallback, path, target, scratch: extraction.dir })
        }
        Err(fallback) => {
            tracing::error!(%target, %primary, %fallback, "no native library could be loaded");
            // best effort; the load error is what the caller needs
            let _ = extraction.dir.remove();
            Err(LoadError::NativeLibraryLoad {
                os: host.os_name.clone(),
                arch: host.arch.clone(),
                primary,
                fallback,
            })
        }
    }
}

fn try_open<O: LibraryOpener>(
    opener: &O,
    extraction: &Extraction,
    role: LibraryRole,
) -> Result<(O::Library, PathBuf), String> {
    let path = extraction.file(role).ok_or_else(|| "not extracted".to_string())?;
    opener
        .open(path)
        .map(|library| (library, path.to_path_buf()))
        .map_err(|err| err.to_string())
}
