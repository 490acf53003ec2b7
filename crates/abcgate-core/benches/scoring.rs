use criterion::{black_box, criterion_group, criterion_main, Criterion};

use abcgate_core::engine::AnalysisEngine;
use abcgate_core::features::{LeapStats, RepetitionStats};
use abcgate_core::gate::check_quality_gate;
use abcgate_core::instruments::Coefficients;
use abcgate_core::scoring::playability_score;
use abcgate_core::statistics::{analyze_quality_trend, calculate_dynamic_threshold};

const ETUDE: &str = "X:1\nT:Etude\nM:4/4\nL:1/8\nQ:1/4=96\nK:C\nCDEC CDEC|EFG2 EFG2|GAGF EC2z|GAGF EC2z|CG,C2 CG,C2|]";

fn melody(len: usize) -> Vec<u8> {
    (0..len).map(|i| 60 + ((i * 7) % 13) as u8).collect()
}

fn bench_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("features");

    let short = melody(32);
    let long = melody(4096);

    group.bench_function("leaps_4096", |b| {
        b.iter(|| LeapStats::from_notes(black_box(&long)))
    });

    group.bench_function("repetition_32", |b| {
        b.iter(|| RepetitionStats::from_notes(black_box(&short)))
    });

    group.bench_function("repetition_4096", |b| {
        b.iter(|| RepetitionStats::from_notes(black_box(&long)))
    });

    group.finish();
}

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");

    let engine = AnalysisEngine::standard();
    let document = format!("# Etude\n\n```abc\n{ETUDE}\n```\n");
    let unit = Coefficients {
        tempo: 1.0,
        leap: 1.0,
    };

    group.bench_function("playability_rules", |b| {
        b.iter(|| {
            playability_score(
                black_box(true),
                black_box(4.2),
                black_box(0.3),
                black_box(132),
                black_box(unit),
            )
        })
    });

    group.bench_function("analyze_etude", |b| {
        b.iter(|| engine.analyze(black_box(ETUDE), black_box("violin")))
    });

    group.bench_function("gate_document", |b| {
        b.iter(|| check_quality_gate(&engine, black_box(&document), "piano", 6.0))
    });

    group.finish();
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    let scores: Vec<f64> = (0..1000).map(|i| (i % 11) as f64 * 0.9).collect();

    group.bench_function("dynamic_threshold_1000", |b| {
        b.iter(|| calculate_dynamic_threshold(black_box(&scores), 6.0))
    });

    group.bench_function("quality_trend_1000", |b| {
        b.iter(|| analyze_quality_trend(black_box(&scores), 6.0))
    });

    group.finish();
}

criterion_group!(benches, bench_features, bench_scoring, bench_statistics);
criterion_main!(benches);
