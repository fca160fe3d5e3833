//! Response parser throughput, one input per recovery stage.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use whoiswrong::brain::verdict::{extract_json, parse_verdict};

const DIRECT: &str =
    r#"{"wrong":"left the dishes","right":"ignored a text","reason":"dishes pile up"}"#;

const WRAPPED: &str = "Sure, here's my verdict:\n```json\n{\"wrong\":\"left the dishes\",\"right\":\"ignored a text\",\"reason\":\"dishes pile up\"}\n```\nLet me know if you need more.";

const SINGLE_QUOTED: &str = "Verdict: {'wrong': 'left the dishes', 'right': 'ignored a text', 'reason': \"it's rude to leave a mess\"}";

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    group.bench_function("direct", |b| b.iter(|| extract_json(black_box(DIRECT))));
    group.bench_function("brace_extract", |b| {
        b.iter(|| extract_json(black_box(WRAPPED)))
    });
    group.bench_function("quote_normalized", |b| {
        b.iter(|| extract_json(black_box(SINGLE_QUOTED)))
    });
    group.bench_function("unparseable", |b| {
        b.iter(|| parse_verdict(black_box("No verdict today, sorry.")))
    });

    group.finish();
}

criterion_group!(benches, bench_parser);
criterion_main!(benches);
