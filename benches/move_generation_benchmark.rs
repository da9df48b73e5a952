use chess_rules_engine::{standard_start_position, Square};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn criterion_standard_start_move_generation(c: &mut Criterion)
{
    let state = standard_start_position();
    let mut group = c.benchmark_group("valid_moves over the standard start position");
    for file in 0..8u8
    {
        let square = Square::new(6, file);
        group.bench_with_input(BenchmarkId::from_parameter(square), &square, |b, &square| {
            b.iter(|| state.valid_moves(square))
        });
    }
    group.finish();
}

fn criterion_is_checkmate(c: &mut Criterion)
{
    let state = standard_start_position();
    c.bench_function("is_checkmate on the standard start position", |b| b.iter(|| state.is_checkmate()));
}

criterion_group!(move_generation_benches, criterion_standard_start_move_generation, criterion_is_checkmate);
criterion_main!(move_generation_benches);
