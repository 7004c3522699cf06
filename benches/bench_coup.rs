use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use rand::{thread_rng, Rng};
use coup_engine::ai::simulate;
use coup_engine::config::VARIANTS;
use coup_engine::{Coup, GameConfig, RecordingHost};

const NAMES: [&str; 6] = ["Alice", "Bob", "Charles", "Dora", "Edith", "Fred"];

fn complete_game(num_players: usize) {
    let mut rng = thread_rng();
    let variant = VARIANTS[rng.gen_range(0..VARIANTS.len())];
    let config = GameConfig::default().with_variant(variant).with_seed(rng.gen());
    let names = NAMES[..num_players].iter().map(|name| name.to_string()).collect();

    let mut coup = black_box(Coup::new(RecordingHost::new(), names, config).unwrap());

    simulate(&mut coup, &mut rng, 10_000);
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete_game");
    for num_players in 2..=6usize {
        group.bench_with_input(BenchmarkId::from_parameter(num_players), &num_players, |b, &num_players| {
            b.iter(|| complete_game(num_players))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
