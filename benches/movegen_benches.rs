use std::hint::black_box;

use castellan::{
    KIWIPETE, MoveBuffer, Position, generate_legal_moves,
    move_gen::{AllMoves, CapturesOnly, generate_moves},
    perft,
};
use criterion::{Criterion, criterion_group, criterion_main};

/// Full legal generation, including the king-safety filter
fn bench_legal_generation(c: &mut Criterion) {
    let position = Position::from_fen(KIWIPETE).unwrap();
    let mut buffer = MoveBuffer::new();

    c.bench_function("generate_legal_moves", |b| {
        b.iter(|| {
            generate_legal_moves(black_box(&position), &mut buffer);
            black_box(&buffer);
        })
    });

    c.bench_function("generate_captures", |b| {
        b.iter(|| {
            generate_moves::<CapturesOnly>(black_box(&position), &mut buffer);
            black_box(&buffer);
        })
    });
}

fn make_unmake_move_cycle(c: &mut Criterion) {
    let mut position = Position::from_fen(KIWIPETE).unwrap();
    let mut moves = MoveBuffer::new();
    generate_moves::<AllMoves>(&position, &mut moves);

    c.bench_function("make_unmake_all_moves", |b| {
        b.iter(|| {
            for &mv in &moves {
                position.make_move(mv);
                position.unmake_move();
            }
            black_box(&position);
        })
    });
}

fn bench_perft(c: &mut Criterion) {
    let mut position = Position::new();
    c.bench_function("perft_start_depth_3", |b| {
        b.iter(|| black_box(perft(&mut position, black_box(3), false).nodes))
    });
}

criterion_group!(
    benches,
    bench_legal_generation,
    make_unmake_move_cycle,
    bench_perft
);
criterion_main!(benches);
