//! # Process-Wide Engine
//!
//! The native library is brought up at most once per process.
//!
//! 1. The first call to [`engine`] or [`init`] runs the bootstrap
//! 2. Every later call gets the same engine, or the same first failure
//! 3. [`teardown`] removes the extracted files; the engine stays loaded
//!
//! A failed bootstrap is never retried.
//!
//! The static is never dropped. On unix the extracted files are unlinked
//! during bootstrap, so nothing is left behind. On other hosts call
//! [`teardown`] before exit, or the scratch directory stays on disk.

use std::sync::{Arc, OnceLock};

use simple_chess_abi::ChessEngine;
use simple_chess_native::{BootstrapError, LoaderConfig, NativeEngine};

use crate::error::{ChessError, ChessResult};

static ENGINE: OnceLock<Result<Arc<NativeEngine>, Arc<BootstrapError>>> = OnceLock::new();

/// The process-wide engine, bootstrapped from the environment on first use.
pub fn engine() -> ChessResult<Arc<dyn ChessEngine>> {
    init(&LoaderConfig::from_env())
}

/// The process-wide engine, bootstrapped with `config` on first use.
///
/// `config` is ignored once a bootstrap has run.
pub fn init(config: &LoaderConfig) -> ChessResult<Arc<dyn ChessEngine>> {
    let slot = ENGINE.get_or_init(|| {
        NativeEngine::bootstrap(config).map(Arc::new).map_err(|err| {
            tracing::error!(%err, "native chess engine bootstrap failed");
            Arc::new(err)
        })
    });
    match slot {
        Ok(engine) => Ok(Arc::clone(engine) as Arc<dyn ChessEngine>),
        Err(err) => Err(ChessError::Bootstrap(Arc::clone(err))),
    }
}

/// Best-effort removal of the scratch directory. A no-op if the engine was
/// never loaded or the files are already gone.
pub fn teardown() {
    if let Some(Ok(engine)) = ENGINE.get() {
        engine.release_scratch();
    }
}
