//! # Payload Extraction
//!
//! Copies the payloads for one [`Target`] out of a [`PayloadSource`] into a
//! freshly created private scratch directory, ready for the dynamic loader.
//!
//! ```text
//! /native/linux/x86_64/libsimple-chess-games-c.so   (absent, skipped)
//! /native/linux/x86_64/libsimple-chess-games.so  ──▶ <scratch>/libsimple-chess-games.so  (0o755)
//! ```
//!
//! A missing individual payload is skipped. Finding none at all is the only
//! extraction failure that is not an I/O error.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{LoadError, LoadResult};
use crate::payload::{library_file_name, resource_key, LibraryNames, PayloadSource};
use crate::platform::{Platform, Target};

/// Which of the two candidate libraries a file is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibraryRole {
    /// The preferred library.
    Primary,
    /// The library tried when the primary fails to load.
    Fallback,
}

/// A private temporary directory holding extracted libraries.
///
/// Removed on drop, or explicitly through [`ScratchDir::remove`]. Removal is
/// best effort and a directory that has already vanished is not an error.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Creates a fresh directory named `<prefix><random>` under `root`, or
    /// under the system temp directory when `root` is `None`.
    pub fn create(root: Option<&Path>, prefix: &str) -> LoadResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(LoadError::ScratchDir)?;
        tracing::debug!(path = %dir.path().display(), "created scratch directory");
        Ok(Self { dir })
    }

    /// Directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the directory and everything in it.
    pub fn remove(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed scratch directory");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// Result of a successful extraction.
#[derive(Debug)]
pub struct Extraction {
    /// Owns the directory the files were written to.
    pub dir: ScratchDir,
    /// Written files, primary first.
    pub files: Vec<(LibraryRole, PathBuf)>,
}

impl Extraction {
    /// Path of the file extracted for `role`, if it was present.
    #[must_use]
    pub fn file(&self, role: LibraryRole) -> Option<&Path> {
        self.files
            .iter()
            .find(|(candidate, _)| *candidate == role)
            .map(|(_, path)| path.as_path())
    }
}

/// Extracts the primary and fallback payloads for `target` into `dir`.
///
/// Fails with [`LoadError::NoPayloads`] when neither payload exists. On
/// non-Windows targets each written file is made executable.
pub fn extract(
    source: &dyn PayloadSource,
    target: Target,
    names: &LibraryNames,
    dir: ScratchDir,
) -> LoadResult<Extraction> {
    let platform = target.platform();
    let mut files = Vec::with_capacity(2);

    for (role, stem) in [(LibraryRole::Primary, &names.primary), (LibraryRole::Fallback, &names.fallback)] {
        let file_name = library_file_name(platform, stem);
        let key = resource_key(target, &file_name);

        let bytes = source
            .fetch(&key)
            .map_err(|source| LoadError::Extract { file: PathBuf::from(&key), source })?;
        let Some(bytes) = bytes else {
            tracing::debug!(%key, "payload not present");
            continue;
        };

        let path = dir.path().join(&file_name);
        std::fs::write(&path, &bytes)
            .map_err(|source| LoadError::Extract { file: path.clone(), source })?;
        if platform != Platform::Windows {
            mark_executable(&path)?;
        }

        tracing::info!(%key, path = %path.display(), bytes = bytes.len(), "extracted native library");
        files.push((role, path));
    }

    if files.is_empty() {
        return Err(LoadError::NoPayloads {
            platform: target.platform_dir(),
            architecture: target.arch_dir(),
        });
    }

    Ok(Extraction { dir, files })
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> LoadResult<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|source| LoadError::Extract { file: path.to_path_buf(), source })
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> LoadResult<()> {
    Ok(())
}
