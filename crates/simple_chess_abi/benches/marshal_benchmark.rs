//! # Marshaling Benchmark
//!
//! Cost of copying the borrowed views out of a `Game` record.
//! A busy middlegame has ~40 legal moves; a long game ~300 history entries.
//!
//! Run with: `cargo bench --package simple_chess_abi`

#![allow(missing_docs)]
#![allow(unsafe_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use simple_chess_abi::{
    decode_text, encode_text, materialize, Color, GameHistoryEntry, Piece, PieceMove, PieceType,
    PlayedMove, Square, FEN_CAPACITY,
};

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn sample_move(i: usize) -> PieceMove {
    let file = b'a' + u8::try_from(i % 8).unwrap_or(0);
    PieceMove::new(
        Piece::new(PieceType::Pawn, Color::White),
        Square::new(2, file),
        Square::new(3, file),
        None,
    )
}

fn sample_entry(i: usize) -> GameHistoryEntry {
    GameHistoryEntry {
        fen: encode_text(START_FEN),
        played_move: PlayedMove {
            piece_move: sample_move(i),
            is_capture: 0,
            captured_piece: Piece::default(),
            check_type: 0,
            offers_draw: 0,
            in_algebraic_notation: encode_text("a3"),
        },
    }
}

fn bench_materialize_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize_moves");

    for count in [20usize, 40, 218] {
        let moves: Vec<PieceMove> = (0..count).map(sample_move).collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &moves, |b, moves| {
            b.iter(|| unsafe { materialize(black_box(moves.as_ptr()), moves.len()) });
        });
    }

    group.finish();
}

fn bench_materialize_history(c: &mut Criterion) {
    let history: Vec<GameHistoryEntry> = (0..300).map(sample_entry).collect();

    c.bench_function("materialize_history_300", |b| {
        b.iter(|| {
            let entries = unsafe { materialize(black_box(history.as_ptr()), history.len()) };
            entries.iter().map(GameHistoryEntry::fen_text).count()
        });
    });
}

fn bench_decode_fen(c: &mut Criterion) {
    let fen: [u8; FEN_CAPACITY] = encode_text(START_FEN);

    c.bench_function("decode_fen", |b| {
        b.iter(|| decode_text(black_box(&fen)));
    });
}

criterion_group!(
    benches,
    bench_materialize_moves,
    bench_materialize_history,
    bench_decode_fen,
);
criterion_main!(benches);
