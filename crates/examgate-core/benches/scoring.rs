use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examgate_core::model::{Question, QuestionAnalysis};
use examgate_core::scoring::{aggregate, bucket_marks, mcq_answer_matches};

fn bench_bucket(c: &mut Criterion) {
    c.bench_function("bucket_marks_sweep", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for step in 0..1000 {
                acc += bucket_marks(black_box(step as f64 / 1000.0));
            }
            acc
        })
    });
}

fn bench_mcq_match(c: &mut Criterion) {
    c.bench_function("mcq_answer_matches", |b| {
        b.iter(|| {
            mcq_answer_matches(
                black_box("  A. The borrow checker rejects the program "),
                black_box("a. the borrow checker rejects the program"),
            )
        })
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let questions: Vec<Question> = (1..=100)
        .map(|id| {
            if id % 2 == 0 {
                Question::Mcq {
                    id,
                    question_text: format!("question {id}"),
                    options: vec!["A. yes".into(), "B. no".into()],
                    correct_answer: Some("A. yes".into()),
                }
            } else {
                Question::Long {
                    id,
                    question_text: format!("question {id}"),
                    reference_answer: Some("reference".into()),
                }
            }
        })
        .collect();
    let analysis: BTreeMap<u32, QuestionAnalysis> = (1..=100)
        .map(|n| (n, QuestionAnalysis::new(0.9, "AI Similarity: 0.850")))
        .collect();

    c.bench_function("aggregate_100_questions", |b| {
        b.iter(|| aggregate(black_box(&questions), black_box(&analysis)))
    });
}

criterion_group!(benches, bench_bucket, bench_mcq_match, bench_aggregate);
criterion_main!(benches);
