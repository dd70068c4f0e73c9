use criterion::{criterion_group, criterion_main, Criterion};
use oust_engine::game_state::game_state::GameState;
use oust_engine::game_state::game_types::{Geometry, Placement};
use oust_engine::search::alpha_beta::SearchEngine;
use oust_engine::search::cancellation::CancellationToken;
use oust_engine::search::turn_generator::TurnGenerator;
use std::hint::black_box;

fn midgame_hex() -> GameState {
    let mut state = GameState::new(Geometry::Hex, 4).expect("board");
    for placement in [
        Placement::new(3, 3),
        Placement::new(0, 0),
        Placement::new(6, 6),
        Placement::new(2, 4),
        Placement::new(4, 1),
        Placement::new(5, 3),
    ] {
        if state.is_legal(placement) {
            state.apply_placement(placement).expect("legal placement");
        }
    }
    state
}

fn bench_turn_generation(c: &mut Criterion) {
    let state = midgame_hex();
    let generator = TurnGenerator::default();
    c.bench_function("turn_generation_hex4", |b| {
        b.iter(|| black_box(generator.generate(black_box(&state))))
    });
}

fn bench_fixed_depth_search(c: &mut Criterion) {
    let state = midgame_hex();
    let cancel = CancellationToken::new();
    let mut group = c.benchmark_group("fixed_depth_search_hex4");
    group.sample_size(10);
    for depth in [1_u8, 2, 3] {
        group.bench_function(format!("depth_{depth}"), |b| {
            b.iter(|| {
                let mut search = SearchEngine::with_defaults();
                black_box(search.search_root(black_box(&state), depth, &cancel))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_turn_generation, bench_fixed_depth_search);
criterion_main!(benches);
