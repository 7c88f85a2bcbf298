use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizforge_core::ids::SequentialIds;
use quizforge_core::model::{
    AssessmentDocument, Choice, Criteria, Feedback, Interaction, InteractionStyle, Node, Outcome,
    Page, Part, Question, ResourceRef, ResponseCondition, SubmittedResponse,
};
use quizforge_core::traits::{RenderContext, Renderer};
use quizforge_core::{DeliveryAssembler, DeliveryConfig, DeliveryMode, RenderError, ResponseEvaluator};

struct Identity;

impl Renderer for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    fn render(&self, _ctx: &RenderContext<'_>, raw: &str) -> Result<String, RenderError> {
        Ok(raw.to_string())
    }
}

/// A document of `pages` pages with `per_page` four-choice questions each.
fn make_document(pages: usize, per_page: usize) -> AssessmentDocument {
    let pages = (0..pages)
        .map(|p| Page {
            id: format!("page-{p}"),
            title: format!("Page {p}"),
            nodes: (0..per_page)
                .map(|q| {
                    let id = format!("q{p:02}x{q:02}");
                    Node::Question(Question {
                        id: id.clone(),
                        title: None,
                        body: format!("<p>Question {id}</p>"),
                        interactions: vec![Interaction {
                            id: "i1".into(),
                            style: InteractionStyle::MultipleChoice,
                            multiple_select: false,
                            choices: ["a", "b", "c", "d"]
                                .iter()
                                .map(|v| Choice {
                                    value: v.to_string(),
                                    color: None,
                                    body: v.to_uppercase(),
                                })
                                .collect(),
                            hotspots: vec![],
                            image: None,
                            labels: vec![],
                            size: None,
                            notation: None,
                            case_sensitive: None,
                            override_value: None,
                        }],
                        parts: vec![Part {
                            id: "p1".into(),
                            response_conditions: ["a", "b", "c", "d"]
                                .iter()
                                .enumerate()
                                .map(|(i, v)| ResponseCondition {
                                    criteria: Criteria {
                                        interaction_id: "i1".into(),
                                        pattern: Some(v.to_string()),
                                    },
                                    outcome: Outcome {
                                        score: if i == 2 { 1.0 } else { 0.0 },
                                        feedbacks: vec![Feedback {
                                            body: format!("feedback {v}"),
                                            lang: None,
                                        }],
                                    },
                                })
                                .collect(),
                            hints: vec![],
                            explanation: None,
                        }],
                    })
                })
                .collect(),
        })
        .collect();

    AssessmentDocument::new(
        ResourceRef {
            id: "bench".into(),
            title: "Benchmark".into(),
        },
        pages,
    )
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let evaluator = ResponseEvaluator::new(Arc::new(Identity), DeliveryConfig::default());

    let small = make_document(1, 5);
    let large = make_document(20, 50);
    let responses = [SubmittedResponse::new("i1", "c")];

    group.bench_function("5_questions", |b| {
        b.iter(|| evaluator.evaluate(&small, black_box("q00x03_abc"), 1, black_box(&responses)))
    });

    group.bench_function("1000_questions_last", |b| {
        b.iter(|| evaluator.evaluate(&large, black_box("q19x49_abc"), 1, black_box(&responses)))
    });

    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");
    let assembler = DeliveryAssembler::new(
        Arc::new(Identity),
        Arc::new(SequentialIds::new()),
        DeliveryConfig::default(),
    );
    let document = make_document(20, 50);

    group.bench_function("page_of_50", |b| {
        b.iter(|| assembler.assemble(&document, black_box(7), 1, DeliveryMode::Delivery))
    });

    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    c.bench_function("index_1000_questions", |b| {
        b.iter(|| make_document(black_box(20), black_box(50)))
    });
}

criterion_group!(benches, bench_evaluate, bench_assemble, bench_index_build);
criterion_main!(benches);
