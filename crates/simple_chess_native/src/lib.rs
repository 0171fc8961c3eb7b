//! # Simple Chess Native
//!
//! Gets the prebuilt `simple-chess-games` engine into the process.
//!
//! ## Bootstrap Pipeline
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌──────────────┐
//! │ HostInfo │──▶│ resolve  │──▶│ extract   │──▶│ open + bind  │──▶ NativeEngine
//! └──────────┘   └──────────┘   └───────────┘   └──────────────┘
//!                  Platform       scratch dir     primary, then
//!                  Error          + payloads      fallback name
//! ```
//!
//! Every failure along the pipeline is fatal. There is no degraded mode:
//! without the engine there is nothing to play.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod loader;
pub mod payload;
pub mod platform;

pub use config::LoaderConfig;
pub use engine::NativeEngine;
pub use error::{
    BootstrapError, BootstrapResult, LoadError, LoadResult, PlatformError, PlatformResult,
};
pub use extract::{extract, Extraction, LibraryRole, ScratchDir};
pub use loader::{load_library, prepare, LibraryOpener, LoadedLibrary, SystemOpener};
pub use payload::{DirectoryPayloads, EmbeddedPayloads, LibraryNames, PayloadSource};
pub use platform::{
    resolve, AndroidAbi, Architecture, HostInfo, Platform, RuntimeHints, Target,
};
