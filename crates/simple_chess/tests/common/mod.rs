//! In-process stand-in for the native engine.
//!
//! Produces `Game` records with the exact ABI layout, including heap-backed
//! history and move views. Move generation is pseudo-legal (no castling, no
//! self-check filtering), which is enough for handle-level tests.
//!
//! Tracks every record it hands out and panics on a double destroy. Single
//! entry points can be told to return null, as a failing engine would.

#![allow(dead_code)]
#![allow(unsafe_code)]

use std::collections::HashSet;
use std::ffi::CStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytemuck::Zeroable;
use parking_lot::Mutex;
use simple_chess::{GameManager, Move, Piece as HostPiece, Square as HostSquare};
use simple_chess_abi::{
    encode_text, Board, ChessEngine, CheckType, Color, DrawReason, Game, GameHistoryEntry,
    GameStage, GameState, Piece, PieceMove, PieceType, PlayedMove, Square,
};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const KNIGHT_STEPS: [(i32, i32); 8] =
    [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
const KING_STEPS: [(i32, i32); 8] =
    [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];
const ROOK_RAYS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
const BISHOP_RAYS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FakePosition {
    board: [Option<(PieceType, Color)>; 64],
    active: Color,
    castling: u8,
    en_passant: Option<usize>,
    half_moves: u16,
    full_moves: u16,
}

/// Heap record; `game` must stay the first field so `*mut Game` and
/// `*mut FakeRecord` share an address.
#[repr(C)]
struct FakeRecord {
    game: Game,
    history: Vec<GameHistoryEntry>,
    moves: Vec<PieceMove>,
    position: FakePosition,
}

/// Entry points that can be made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entry {
    NewGame,
    ClaimDraw,
    Resign,
}

#[derive(Default)]
pub struct FakeEngine {
    live: Mutex<HashSet<usize>>,
    refused: Mutex<HashSet<Entry>>,
    created: AtomicUsize,
    destroyed: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn manager(self: &Arc<Self>) -> GameManager {
        GameManager::new(Arc::clone(self) as Arc<dyn ChessEngine>)
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.lock().len()
    }

    /// Makes `entry` return null from now on.
    pub fn refuse(&self, entry: Entry) {
        self.refused.lock().insert(entry);
    }

    fn refuses(&self, entry: Entry) -> bool {
        self.refused.lock().contains(&entry)
    }

    fn publish(&self, position: FakePosition, history: Vec<GameHistoryEntry>, state: GameState, draw: Option<DrawReason>) -> *mut Game {
        let moves = if state.is_terminal() { Vec::new() } else { legal_moves(&position) };
        let mut record = Box::new(FakeRecord { game: Game::zeroed(), history, moves, position });

        let claimable = (state == GameState::Playing && position.half_moves >= 100)
            .then_some(DrawReason::FiftyMoveRule);

        record.game.state = state as i32;
        record.game.draw_reason = draw.map_or(0, |reason| reason as i32);
        record.game.history = record.history.as_ptr();
        record.game.history_size = u16::try_from(record.history.len()).unwrap();
        record.game.available_moves = record.moves.as_ptr();
        record.game.available_move_count = u16::try_from(record.moves.len()).unwrap();
        record.game.current_stage = stage_of(&position);
        record.game.is_draw_claimable = u8::from(claimable.is_some());
        record.game.reason_to_claim_draw = claimable.map_or(0, |reason| reason as i32);

        let raw = Box::into_raw(record);
        self.live.lock().insert(raw as usize);
        self.created.fetch_add(1, Ordering::SeqCst);
        raw.cast::<Game>()
    }

    unsafe fn read(&self, game: *const Game) -> &FakeRecord {
        assert!(self.live.lock().contains(&(game as usize)), "use of a destroyed game");
        unsafe { &*game.cast::<FakeRecord>() }
    }

    fn successor(&self, record: &FakeRecord, piece_move: PieceMove, offer_draw: bool) -> *mut Game {
        let position = record.position;
        let legal = record.moves.iter().any(|m| *m == piece_move);
        if !legal || record.game.state != GameState::Playing as i32 {
            return std::ptr::null_mut();
        }

        let (next, mut played) = apply(&position, &piece_move);
        played.offers_draw = u8::from(offer_draw);

        let mut history = record.history.clone();
        history.push(GameHistoryEntry { fen: encode_text(&to_fen(&position)), played_move: played });

        if next.half_moves >= 150 {
            self.publish(next, history, GameState::Drawn, Some(DrawReason::SeventyFiveMoveRule))
        } else {
            self.publish(next, history, GameState::Playing, None)
        }
    }
}

impl ChessEngine for FakeEngine {
    fn create_new_game(&self) -> *mut Game {
        if self.refuses(Entry::NewGame) {
            return std::ptr::null_mut();
        }
        let position = parse_fen(START_FEN).unwrap();
        self.publish(position, Vec::new(), GameState::Playing, None)
    }

    fn create_game_from_fen(&self, fen: &CStr) -> *mut Game {
        match fen.to_str().ok().and_then(parse_fen) {
            Some(position) => self.publish(position, Vec::new(), GameState::Playing, None),
            None => std::ptr::null_mut(),
        }
    }

    unsafe fn make_move(&self, game: *const Game, piece_move: PieceMove) -> *mut Game {
        let record = unsafe { self.read(game) };
        self.successor(record, piece_move, false)
    }

    unsafe fn make_move_with_draw_offer(&self, game: *const Game, piece_move: PieceMove, offer_draw: bool) -> *mut Game {
        let record = unsafe { self.read(game) };
        self.successor(record, piece_move, offer_draw)
    }

    unsafe fn claim_draw(&self, game: *const Game) -> *mut Game {
        let record = unsafe { self.read(game) };
        if record.game.is_draw_claimable != 1 || self.refuses(Entry::ClaimDraw) {
            return std::ptr::null_mut();
        }
        let reason = DrawReason::try_from(record.game.reason_to_claim_draw).unwrap();
        self.publish(record.position, record.history.clone(), GameState::Drawn, Some(reason))
    }

    unsafe fn resign(&self, game: *const Game, resigner: Color) -> *mut Game {
        let record = unsafe { self.read(game) };
        if self.refuses(Entry::Resign) {
            return std::ptr::null_mut();
        }
        let state = GameState::after_resignation_of(resigner);
        self.publish(record.position, record.history.clone(), state, None)
    }

    unsafe fn destroy_game(&self, game: *mut Game) {
        assert!(self.live.lock().remove(&(game as usize)), "double destroy");
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        drop(unsafe { Box::from_raw(game.cast::<FakeRecord>()) });
    }
}

// ---------------------------------------------------------------------------
// FEN
// ---------------------------------------------------------------------------

fn piece_letter(kind: PieceType) -> char {
    match kind {
        PieceType::Pawn => 'p',
        PieceType::Rook => 'r',
        PieceType::Knight => 'n',
        PieceType::Bishop => 'b',
        PieceType::Queen => 'q',
        PieceType::King => 'k',
    }
}

fn parse_fen(fen: &str) -> Option<FakePosition> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return None;
    }

    let mut board = [None; 64];
    let rows: Vec<&str> = fields[0].split('/').collect();
    if rows.len() != 8 {
        return None;
    }
    for (row, text) in rows.iter().enumerate() {
        let rank = 7 - row;
        let mut file = 0usize;
        for c in text.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
                continue;
            }
            let kind = PieceType::ALL.into_iter().find(|k| piece_letter(*k) == c.to_ascii_lowercase())?;
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            if file >= 8 {
                return None;
            }
            board[rank * 8 + file] = Some((kind, color));
            file += 1;
        }
        if file != 8 {
            return None;
        }
    }

    for color in [Color::White, Color::Black] {
        if board.iter().filter(|p| **p == Some((PieceType::King, color))).count() != 1 {
            return None;
        }
    }

    let active = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        _ => return None,
    };

    let mut castling = 0u8;
    if fields[2] != "-" {
        for c in fields[2].chars() {
            castling |= match c {
                'K' => 0x01,
                'Q' => 0x02,
                'k' => 0x04,
                'q' => 0x08,
                _ => return None,
            };
        }
    }

    let en_passant = match fields[3] {
        "-" => None,
        text => Some(text.parse::<HostSquare>().ok()?.index()),
    };

    Some(FakePosition {
        board,
        active,
        castling,
        en_passant,
        half_moves: fields[4].parse().ok()?,
        full_moves: fields[5].parse().ok()?,
    })
}

fn to_fen(position: &FakePosition) -> String {
    let mut fen = String::new();
    for rank in (0..8).rev() {
        let mut empty = 0;
        for file in 0..8 {
            match position.board[rank * 8 + file] {
                Some((kind, color)) => {
                    if empty > 0 {
                        fen.push_str(&empty.to_string());
                        empty = 0;
                    }
                    let letter = piece_letter(kind);
                    fen.push(if color == Color::White { letter.to_ascii_uppercase() } else { letter });
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            fen.push_str(&empty.to_string());
        }
        if rank > 0 {
            fen.push('/');
        }
    }

    fen.push_str(if position.active == Color::White { " w " } else { " b " });
    if position.castling == 0 {
        fen.push('-');
    }
    for (bit, c) in [(0x01, 'K'), (0x02, 'Q'), (0x04, 'k'), (0x08, 'q')] {
        if position.castling & bit != 0 {
            fen.push(c);
        }
    }
    match position.en_passant.and_then(HostSquare::from_index) {
        Some(square) => fen.push_str(&format!(" {square}")),
        None => fen.push_str(" -"),
    }
    fen.push_str(&format!(" {} {}", position.half_moves, position.full_moves));
    fen
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

fn abi_square(index: usize) -> Square {
    Square::from_index(index).unwrap()
}

fn on_board(rank: i32, file: i32) -> Option<usize> {
    ((0..8).contains(&rank) && (0..8).contains(&file)).then(|| (rank * 8 + file) as usize)
}

fn moves_for(position: &FakePosition, color: Color) -> Vec<PieceMove> {
    let mut out = Vec::new();
    for from in 0..64 {
        let Some((kind, owner)) = position.board[from] else { continue };
        if owner != color {
            continue;
        }
        let (rank, file) = ((from / 8) as i32, (from % 8) as i32);
        let piece = Piece::new(kind, color);
        let mut push = |to: usize, promotion: Option<PieceType>| {
            out.push(PieceMove::new(piece, abi_square(from), abi_square(to), promotion));
        };
        let target = |to: usize| position.board[to].map(|(_, c)| c);

        match kind {
            PieceType::Pawn => {
                let dir = if color == Color::White { 1 } else { -1 };
                let start = if color == Color::White { 1 } else { 6 };
                let last = if color == Color::White { 7 } else { 0 };
                let mut emit = |to: usize| {
                    if (to / 8) as i32 == last {
                        for promo in [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight] {
                            push(to, Some(promo));
                        }
                    } else {
                        push(to, None);
                    }
                };
                if let Some(one) = on_board(rank + dir, file).filter(|&to| target(to).is_none()) {
                    emit(one);
                    if rank == start {
                        if let Some(two) = on_board(rank + 2 * dir, file).filter(|&to| target(to).is_none()) {
                            emit(two);
                        }
                    }
                }
                for df in [-1, 1] {
                    if let Some(to) = on_board(rank + dir, file + df) {
                        if target(to) == Some(color.opposite()) || position.en_passant == Some(to) {
                            emit(to);
                        }
                    }
                }
            }
            PieceType::Knight | PieceType::King => {
                let steps = if kind == PieceType::Knight { KNIGHT_STEPS } else { KING_STEPS };
                for (dr, df) in steps {
                    if let Some(to) = on_board(rank + dr, file + df) {
                        if target(to) != Some(color) {
                            push(to, None);
                        }
                    }
                }
            }
            PieceType::Bishop | PieceType::Rook | PieceType::Queen => {
                let rays: Vec<(i32, i32)> = match kind {
                    PieceType::Bishop => BISHOP_RAYS.to_vec(),
                    PieceType::Rook => ROOK_RAYS.to_vec(),
                    _ => BISHOP_RAYS.iter().chain(ROOK_RAYS.iter()).copied().collect(),
                };
                for (dr, df) in rays {
                    let (mut r, mut f) = (rank + dr, file + df);
                    while let Some(to) = on_board(r, f) {
                        match target(to) {
                            None => push(to, None),
                            Some(c) if c != color => {
                                push(to, None);
                                break;
                            }
                            Some(_) => break,
                        }
                        r += dr;
                        f += df;
                    }
                }
            }
        }
    }
    out
}

fn legal_moves(position: &FakePosition) -> Vec<PieceMove> {
    moves_for(position, position.active)
}

fn king_attacked(position: &FakePosition, king: Color) -> bool {
    let Some(square) = position.board.iter().position(|p| *p == Some((PieceType::King, king))) else {
        return false;
    };
    moves_for(position, king.opposite()).iter().any(|m| m.dst.index().ok() == Some(square))
}

fn apply(position: &FakePosition, piece_move: &PieceMove) -> (FakePosition, PlayedMove) {
    let from = piece_move.src.index().unwrap();
    let to = piece_move.dst.index().unwrap();
    let (kind, color) = position.board[from].unwrap();

    let mut next = *position;
    let mut captured = next.board[to];
    if kind == PieceType::Pawn && position.en_passant == Some(to) && captured.is_none() {
        let victim = if color == Color::White { to - 8 } else { to + 8 };
        captured = next.board[victim].take();
    }

    let promotion = piece_move.promotion().unwrap();
    next.board[from] = None;
    next.board[to] = Some((promotion.unwrap_or(kind), color));

    next.en_passant = (kind == PieceType::Pawn && from.abs_diff(to) == 16).then(|| (from + to) / 2);
    next.half_moves = if kind == PieceType::Pawn || captured.is_some() { 0 } else { position.half_moves + 1 };
    if color == Color::Black {
        next.full_moves += 1;
    }
    for (square, bits) in [(4usize, 0x03u8), (0, 0x02), (7, 0x01), (60, 0x0C), (56, 0x08), (63, 0x04)] {
        if from == square || to == square {
            next.castling &= !bits;
        }
    }
    next.active = color.opposite();

    let check = if king_attacked(&next, next.active) { CheckType::Check } else { CheckType::None };

    let mut notation = String::new();
    if kind == PieceType::Pawn {
        if captured.is_some() {
            notation.push(char::from(piece_move.src.file));
            notation.push('x');
        }
    } else {
        notation.push(piece_letter(kind).to_ascii_uppercase());
        if captured.is_some() {
            notation.push('x');
        }
    }
    notation.push_str(&HostSquare::from_index(to).unwrap().to_string());
    if let Some(promo) = promotion {
        notation.push('=');
        notation.push(piece_letter(promo).to_ascii_uppercase());
    }
    if check == CheckType::Check {
        notation.push('+');
    }

    let played = PlayedMove {
        piece_move: *piece_move,
        is_capture: u8::from(captured.is_some()),
        captured_piece: captured.map_or(Piece::default(), |(k, c)| Piece::new(k, c)),
        check_type: check as i32,
        offers_draw: 0,
        in_algebraic_notation: encode_text(&notation),
    };
    (next, played)
}

fn stage_of(position: &FakePosition) -> GameStage {
    let mut board = Board::zeroed();
    for (index, square) in position.board.iter().enumerate() {
        if let Some((kind, color)) = square {
            board.occupied[index] = 1;
            board.piece_at[index] = Piece::new(*kind, *color);
        }
    }
    let check = if king_attacked(position, position.active) { CheckType::Check } else { CheckType::None };

    GameStage {
        board,
        active_color: position.active.to_raw(),
        castling_rights: position.castling,
        half_moves_since_last_capture_or_pawn_advance: position.half_moves,
        full_moves: position.full_moves,
        has_en_passant_target: u8::from(position.en_passant.is_some()),
        en_passant_target: position.en_passant.map_or(Square::default(), abi_square),
        check_status: check as i32,
        fen: encode_text(&to_fen(position)),
    }
}

// ---------------------------------------------------------------------------
// Helpers for tests
// ---------------------------------------------------------------------------

pub fn sq(text: &str) -> HostSquare {
    text.parse().unwrap()
}

pub fn pawn(color: Color) -> HostPiece {
    HostPiece::new(PieceType::Pawn, color)
}

pub fn mv(kind: PieceType, color: Color, from: &str, to: &str) -> Move {
    Move::new(HostPiece::new(kind, color), sq(from), sq(to))
}
