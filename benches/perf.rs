use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use action_value::config::PipelineConfig;
use action_value::features::FeatureSchema;
use action_value::ingest::parse_json_actions;
use action_value::labels::labels_for_match;
use action_value::model::{BaseRateModel, ProbabilityModel, predict_probabilities};
use action_value::pipeline::build_dataset;
use action_value::synthetic::synthetic_table;
use action_value::valuation::value_actions;

fn bench_feature_extraction(c: &mut Criterion) {
    let cfg = PipelineConfig::default();
    let table = synthetic_table(1, 2000, 1, &cfg).unwrap();
    let schema = FeatureSchema::new(&cfg);
    let actions = &table.matches()[0].actions;
    c.bench_function("features_one_match", |b| {
        b.iter(|| {
            let rows = schema.extract_match(black_box(actions));
            black_box(rows.len());
        })
    });
}

fn bench_labels(c: &mut Criterion) {
    let cfg = PipelineConfig::default();
    let table = synthetic_table(1, 2000, 2, &cfg).unwrap();
    let actions = &table.matches()[0].actions;
    c.bench_function("labels_one_match", |b| {
        b.iter(|| {
            let labels = labels_for_match(black_box(actions), cfg.horizon);
            black_box(labels.len());
        })
    });
}

fn bench_build_dataset(c: &mut Criterion) {
    let cfg = PipelineConfig::default();
    let table = synthetic_table(16, 1500, 3, &cfg).unwrap();
    c.bench_function("build_dataset_16_matches", |b| {
        b.iter(|| {
            let ds = build_dataset(black_box(&table), &cfg).unwrap();
            black_box(ds.len());
        })
    });
}

fn bench_valuation(c: &mut Criterion) {
    let cfg = PipelineConfig::default();
    let table = synthetic_table(8, 1500, 4, &cfg).unwrap();
    let ds = build_dataset(&table, &cfg).unwrap();
    let mut scores = BaseRateModel::default();
    let mut concedes = BaseRateModel::default();
    scores.fit(&ds.features, &ds.labels.scores).unwrap();
    concedes.fit(&ds.features, &ds.labels.concedes).unwrap();
    let probs = predict_probabilities(&scores, &concedes, &ds).unwrap();
    c.bench_function("value_actions_8_matches", |b| {
        b.iter(|| {
            let values = value_actions(black_box(&table), black_box(&probs), &cfg).unwrap();
            black_box(values.len());
        })
    });
}

fn bench_json_ingest(c: &mut Criterion) {
    c.bench_function("json_actions_parse", |b| {
        b.iter(|| {
            let actions = parse_json_actions(black_box(ACTIONS_JSON)).unwrap();
            black_box(actions.len());
        })
    });
}

criterion_group!(
    perf,
    bench_feature_extraction,
    bench_labels,
    bench_build_dataset,
    bench_valuation,
    bench_json_ingest
);
criterion_main!(perf);

static ACTIONS_JSON: &str = include_str!("../tests/fixtures/actions.json");
