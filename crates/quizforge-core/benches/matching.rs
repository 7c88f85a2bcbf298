use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizforge_core::matching::matches;
use quizforge_core::model::{Choice, Interaction, InteractionStyle};

fn interaction(style: InteractionStyle, choices: usize, multiple_select: bool) -> Interaction {
    Interaction {
        id: "i1".into(),
        style,
        multiple_select,
        choices: (0..choices)
            .map(|i| Choice {
                value: format!("c{i}"),
                color: None,
                body: format!("Choice {i}"),
            })
            .collect(),
        hotspots: vec![],
        image: None,
        labels: vec![],
        size: None,
        notation: None,
        case_sensitive: None,
        override_value: None,
    }
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching");

    let single = interaction(InteractionStyle::MultipleChoice, 4, false);
    let multi = interaction(InteractionStyle::MultipleChoice, 20, true);
    let ordering = interaction(InteractionStyle::Ordering, 20, false);
    let numeric = interaction(InteractionStyle::Numeric, 0, false);
    let text = interaction(InteractionStyle::Text, 0, false);

    let all: Vec<String> = (0..20).map(|i| format!("c{i}")).collect();
    let forward = all.join(",");
    let reversed = all.iter().rev().cloned().collect::<Vec<_>>().join(",");

    group.bench_function("single_choice", |b| {
        b.iter(|| matches(&single, black_box(Some("c2")), black_box("c2")))
    });

    group.bench_function("multi_select_20", |b| {
        b.iter(|| matches(&multi, black_box(Some(forward.as_str())), black_box(&reversed)))
    });

    group.bench_function("ordering_20", |b| {
        b.iter(|| matches(&ordering, black_box(Some(forward.as_str())), black_box(&forward)))
    });

    group.bench_function("numeric_interval", |b| {
        b.iter(|| matches(&numeric, black_box(Some("[1.5,2.5)")), black_box("2.25")))
    });

    group.bench_function("text_encoded", |b| {
        b.iter(|| {
            matches(
                &text,
                black_box(Some("The Mitochondria")),
                black_box("the+mitochondria%20"),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_matching);
criterion_main!(benches);
