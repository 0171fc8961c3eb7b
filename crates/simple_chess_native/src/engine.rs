//! # Native Engine
//!
//! [`ChessEngine`] backed by the dynamically loaded library. Symbols are
//! bound once, right after loading; a library missing any of the seven
//! entry points is rejected.
//!
//! On unix the extracted files are unlinked as soon as the symbols are
//! bound. The mapping stays valid, so nothing is left on disk even when the
//! engine lives in a static that is never dropped. Elsewhere a loaded
//! library cannot be deleted, and the scratch directory goes away with the
//! engine or on [`NativeEngine::release_scratch`].

#![allow(unsafe_code)]

use std::ffi::CStr;
use std::fmt;
use std::path::{Path, PathBuf};

use libloading::Library;
use parking_lot::Mutex;
use simple_chess_abi::engine::{
    symbols, ClaimDrawFn, CreateGameFromFenFn, CreateNewGameFn, DestroyGameFn,
    MakeMoveFn, MakeMoveWithDrawOfferFn, ResignFn,
};
use simple_chess_abi::{ChessEngine, Color, Game, PieceMove};

use crate::config::LoaderConfig;
use crate::error::{BootstrapResult, LoadError, LoadResult};
use crate::extract::{LibraryRole, ScratchDir};
use crate::loader::{load_library, SystemOpener};
use crate::payload::PayloadSource;
use crate::platform::{HostInfo, Target};

/// The engine loaded from a shared library.
///
/// Field order matters: the library is unloaded before the scratch
/// directory holding its file is removed.
pub struct NativeEngine {
    create_new_game: CreateNewGameFn,
    create_game_from_fen: CreateGameFromFenFn,
    make_move: MakeMoveFn,
    make_move_with_draw_offer: MakeMoveWithDrawOfferFn,
    claim_draw: ClaimDrawFn,
    resign: ResignFn,
    destroy_game: DestroyGameFn,
    _library: Library,
    scratch: Mutex<Option<ScratchDir>>,
    target: Target,
    role: LibraryRole,
    path: PathBuf,
}

impl NativeEngine {
    /// Bootstraps for the running host.
    pub fn bootstrap(config: &LoaderConfig) -> BootstrapResult<Self> {
        let host = HostInfo::detect();
        let source = config.payload_source();
        Self::bootstrap_with(&host, config, source.as_ref())
    }

    /// Bootstraps for an explicit host and payload source.
    pub fn bootstrap_with(
        host: &HostInfo,
        config: &LoaderConfig,
        source: &dyn PayloadSource,
    ) -> BootstrapResult<Self> {
        let loaded = load_library(host, config, source, &SystemOpener)?;
        let library = loaded.library;

        // SAFETY: the signatures match the engine's exported C declarations.
        let engine = unsafe {
            Self {
                create_new_game: bind(&library, symbols::CREATE_NEW_GAME)?,
                create_game_from_fen: bind(&library, symbols::CREATE_GAME_FROM_FEN)?,
                make_move: bind(&library, symbols::MAKE_MOVE)?,
                make_move_with_draw_offer: bind(&library, symbols::MAKE_MOVE_WITH_DRAW_OFFER)?,
                claim_draw: bind(&library, symbols::CLAIM_DRAW)?,
                resign: bind(&library, symbols::RESIGN)?,
                destroy_game: bind(&library, symbols::DESTROY_GAME)?,
                _library: library,
                scratch: Mutex::new(Some(loaded.scratch)),
                target: loaded.target,
                role: loaded.role,
                path: loaded.path,
            }
        };

        tracing::info!(target = %engine.target, role = ?engine.role, "native chess engine ready");
        #[cfg(unix)]
        engine.release_scratch();
        Ok(engine)
    }

    /// Target the library was resolved for.
    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }

    /// Which candidate library was loaded.
    #[must_use]
    pub fn role(&self) -> LibraryRole {
        self.role
    }

    /// Path the library was loaded from. On unix the file is already gone.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the scratch directory now instead of at drop.
    ///
    /// The library stays mapped, so the engine remains usable on platforms
    /// that allow unlinking a loaded file. Calling this twice is a no-op.
    pub fn release_scratch(&self) {
        release(&self.scratch);
    }
}

/// Takes the directory out of `slot` and removes it. Returns whether there
/// was one to remove.
fn release(slot: &Mutex<Option<ScratchDir>>) -> bool {
    let Some(dir) = slot.lock().take() else {
        return false;
    };
    let path = dir.path().to_path_buf();
    if let Err(err) = dir.remove() {
        tracing::warn!(%err, path = %path.display(), "could not remove scratch directory");
    }
    true
}

impl fmt::Debug for NativeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeEngine")
            .field("target", &self.target)
            .field("role", &self.role)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Looks up `name` and copies the function pointer out.
///
/// # Safety
///
/// `T` must be the exact function-pointer type of the exported symbol.
unsafe fn bind<T: Copy>(library: &Library, name: &[u8]) -> LoadResult<T> {
    // SAFETY: forwarded to the caller
    let symbol = unsafe { library.get::<T>(name) }.map_err(|err| LoadError::MissingSymbol {
        symbol: String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name)).into_owned(),
        reason: err.to_string(),
    })?;
    Ok(*symbol)
}

impl ChessEngine for NativeEngine {
    fn create_new_game(&self) -> *mut Game {
        // SAFETY: no arguments; the engine allocates
        unsafe { (self.create_new_game)() }
    }

    fn create_game_from_fen(&self, fen: &CStr) -> *mut Game {
        // SAFETY: `fen` is NUL-terminated and outlives the call
        unsafe { (self.create_game_from_fen)(fen.as_ptr()) }
    }

    unsafe fn make_move(&self, game: *const Game, piece_move: PieceMove) -> *mut Game {
        // SAFETY: forwarded to the caller
        unsafe { (self.make_move)(game, piece_move) }
    }

    unsafe fn make_move_with_draw_offer(
        &self,
        game: *const Game,
        piece_move: PieceMove,
        offer_draw: bool,
    ) -> *mut Game {
        // SAFETY: forwarded to the caller
        unsafe { (self.make_move_with_draw_offer)(game, piece_move, offer_draw) }
    }

    unsafe fn claim_draw(&self, game: *const Game) -> *mut Game {
        // SAFETY: forwarded to the caller
        unsafe { (self.claim_draw)(game) }
    }

    unsafe fn resign(&self, game: *const Game, resigner: Color) -> *mut Game {
        // SAFETY: forwarded to the caller
        unsafe { (self.resign)(game, resigner.to_raw()) }
    }

    unsafe fn destroy_game(&self, game: *mut Game) {
        // SAFETY: forwarded to the caller
        unsafe { (self.destroy_game)(game) }
    }
}
