use criterion::{criterion_group, criterion_main, Bencher, Criterion};

use cardgate::adapters::outbound::card_store::postgres::composer::{compose_cards, compose_sets};
use cardgate::domain::{CardFilter, RefFilter, SetFilter};

fn bench(c: &mut Criterion) {
    let narrow = CardFilter {
        name: Some(String::from("Goblin")),
        ..CardFilter::default()
    };
    let wide = CardFilter {
        name: Some(String::from("Goblin")),
        types: Some(vec![
            String::from("Legendary"),
            String::from("Creature"),
            String::from("Goblin"),
        ]),
        costs: Some(vec![String::from("R"), String::from("R"), String::from("1")]),
        number_cost: Some(3.0),
        set: Some(RefFilter {
            id: None,
            name: Some(String::from("Set Mock")),
            alias: Some(String::from("stm")),
        }),
        rarity: Some(RefFilter {
            id: None,
            name: None,
            alias: Some(String::from("M")),
        }),
    };
    let sets = SetFilter {
        name: Some(String::from("Set")),
        alias: None,
    };

    c.bench_function("Compose narrow card filter", |b: &mut Bencher| {
        b.iter(|| compose_cards(&narrow))
    });

    c.bench_function("Compose wide card filter", |b: &mut Bencher| {
        b.iter(|| compose_cards(&wide))
    });

    c.bench_function("Compose set filter", |b: &mut Bencher| {
        b.iter(|| compose_sets(&sets))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets = bench
}

criterion_main!(benches);
