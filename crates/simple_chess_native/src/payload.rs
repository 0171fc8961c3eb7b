//! # Payload Sources
//!
//! Where prebuilt engine binaries come from. Every binary is addressed by a
//! resource key of the form `/native/<platform>/<architecture>/<file>`.
//!
//! | Source                | Backing store                          |
//! |-----------------------|----------------------------------------|
//! | [`EmbeddedPayloads`]  | `include_bytes!` table built by build.rs |
//! | [`DirectoryPayloads`] | an on-disk tree with the same layout   |

use std::borrow::Cow;
use std::io;
use std::path::PathBuf;

use crate::platform::{Platform, Target};

/// Default primary library stem.
pub const PRIMARY_LIBRARY: &str = "simple-chess-games-c";

/// Default fallback library stem.
pub const FALLBACK_LIBRARY: &str = "simple-chess-games";

/// A lookup from resource key to binary payload.
pub trait PayloadSource: Send + Sync {
    /// The payload stored under `key`, or `None` when absent.
    ///
    /// Absence is not an error. Only a payload that exists but cannot be
    /// read is.
    fn fetch(&self, key: &str) -> io::Result<Option<Cow<'_, [u8]>>>;
}

/// Payloads compiled into the binary.
#[derive(Clone, Copy, Debug)]
pub struct EmbeddedPayloads {
    table: &'static [(&'static str, &'static [u8])],
}

impl EmbeddedPayloads {
    /// The table generated at build time from `native/`.
    #[must_use]
    pub fn compiled() -> Self {
        Self::new(include!(concat!(env!("OUT_DIR"), "/payloads.rs")))
    }

    /// Wraps an explicit table.
    #[must_use]
    pub const fn new(table: &'static [(&'static str, &'static [u8])]) -> Self {
        Self { table }
    }

    /// Number of payloads in the table.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl PayloadSource for EmbeddedPayloads {
    fn fetch(&self, key: &str) -> io::Result<Option<Cow<'_, [u8]>>> {
        Ok(self
            .table
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, bytes)| Cow::Borrowed(*bytes)))
    }
}

/// Payloads read from a directory laid out as
/// `<root>/<platform>/<architecture>/<file>`.
#[derive(Clone, Debug)]
pub struct DirectoryPayloads {
    root: PathBuf,
}

impl DirectoryPayloads {
    /// Source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PayloadSource for DirectoryPayloads {
    fn fetch(&self, key: &str) -> io::Result<Option<Cow<'_, [u8]>>> {
        let relative = key.trim_start_matches("/native/");
        match std::fs::read(self.root.join(relative)) {
            Ok(bytes) => Ok(Some(Cow::Owned(bytes))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// The primary and fallback library stems, in load order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryNames {
    /// Tried first.
    pub primary: String,
    /// Tried when the primary fails to load.
    pub fallback: String,
}

impl Default for LibraryNames {
    fn default() -> Self {
        Self { primary: PRIMARY_LIBRARY.to_string(), fallback: FALLBACK_LIBRARY.to_string() }
    }
}

/// File name of library `stem` on `platform`.
///
/// ```
/// use simple_chess_native::payload::library_file_name;
/// use simple_chess_native::Platform;
///
/// assert_eq!(library_file_name(Platform::Android, "simple-chess-games"), "libsimple-chess-games.so");
/// assert_eq!(library_file_name(Platform::MacOs, "simple-chess-games"), "libsimple-chess-games.dylib");
/// ```
#[must_use]
pub fn library_file_name(platform: Platform, stem: &str) -> String {
    match platform {
        Platform::Linux | Platform::Android => format!("lib{stem}.so"),
        Platform::Windows => format!("lib{stem}.dll"),
        Platform::MacOs => format!("lib{stem}.dylib"),
    }
}

/// Resource key of `file` for `target`.
#[must_use]
pub fn resource_key(target: Target, file: &str) -> String {
    format!("/native/{}/{}/{file}", target.platform_dir(), target.arch_dir())
}
