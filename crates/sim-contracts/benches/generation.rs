use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sim_contracts::ContractSystem;
use sim_core::catalog::COLORS;
use sim_core::{ColorId, GameState, Grid};

fn late_game_state() -> GameState {
    let mut doc = GameState::new().to_document();
    doc.completed_contracts = 500;
    doc.grid_level = 9;
    doc.grid = Grid::new(32, 32).map(|g| g.to_data()).unwrap_or(doc.grid);
    doc.unlocked_colors = COLORS.iter().map(|c| ColorId::from(c.id)).collect();
    let mut state = GameState::new();
    let _ = state.load_document(doc);
    state
}

fn bench_generation(c: &mut Criterion) {
    let fresh = GameState::new();
    let late = late_game_state();
    let mut system = ContractSystem::new(42);

    c.bench_function("rank 1 contract on 4x4", |b| {
        b.iter(|| black_box(system.generate_contract(&fresh, None)))
    });
    c.bench_function("rank 8 contract on 32x32", |b| {
        b.iter(|| black_box(system.generate_contract(&late, Some(8))))
    });
}

criterion_group!(benches, bench_generation);
criterion_main!(benches);
