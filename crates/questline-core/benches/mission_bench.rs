use criterion::{black_box, criterion_group, criterion_main, Criterion};
use luck::{CritConfig, SeededRolls};
use questline_core::{AutoPilot, Character, CharacterClass, Difficulty, MissionRunner, RulesConfig};

fn bench_seeded_mission(c: &mut Criterion) {
    let rules = RulesConfig::default();

    c.bench_function("seeded_mission_hard", |b| {
        b.iter(|| {
            let mut rolls = SeededRolls::new(black_box(42));
            let mut pilot = AutoPilot::default();
            let mut hero = Character::new("Bench", CharacterClass::Warrior);
            let mut runner = MissionRunner::new(&rules, &mut pilot, &mut rolls);
            let mission = runner.generate_mission("Keep", Difficulty::Hard);
            black_box(runner.run(&mission, &mut hero))
        })
    });
}

fn bench_campaign(c: &mut Criterion) {
    let rules = RulesConfig::default();

    // Ten back-to-back missions so level-ups and loot are in the loop
    c.bench_function("seeded_campaign_10", |b| {
        b.iter(|| {
            let mut rolls = SeededRolls::new(black_box(7));
            let mut pilot = AutoPilot::default();
            let mut hero = Character::new("Bench", CharacterClass::Archer);
            let mut runner = MissionRunner::new(&rules, &mut pilot, &mut rolls);
            for index in 0..10 {
                let mission = runner.generate_mission(format!("Mission {index}"), Difficulty::Medium);
                let _ = black_box(runner.run(&mission, &mut hero));
            }
            hero
        })
    });
}

fn bench_crit_resolve(c: &mut Criterion) {
    let config = CritConfig::default();
    let mut rolls = SeededRolls::new(1);

    c.bench_function("crit_resolve", |b| {
        b.iter(|| black_box(luck::resolve(black_box(20), &config, &mut rolls)))
    });
}

criterion_group!(benches, bench_seeded_mission, bench_campaign, bench_crit_resolve);
criterion_main!(benches);
