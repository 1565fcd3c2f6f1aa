use criterion::{criterion_group, criterion_main, Criterion};
use jsonrt_core::{parse, parse_with_reviver, stringify, Node, Replacer, Space, Value};
use std::hint::black_box;

/// A calendar-style document with nesting, escapes and mixed numbers.
fn sample_document(events: usize) -> String {
    let items: Vec<String> = (0..events)
        .map(|i| {
            format!(
                r#"{{"id":"evt_{i}","summary":"Standup \"daily\" #{i}","start":{{"dateTime":"2026-02-17T09:00:00-08:00"}},"attendees":[{{"email":"a{i}@example.com","ok":true}},{{"email":"b{i}@example.com","ok":false}}],"weight":{w},"notes":null}}"#,
                w = i as f64 * 0.25
            )
        })
        .collect();
    format!(r#"{{"kind":"calendar#events","items":[{}]}}"#, items.join(","))
}

fn bench_parse(c: &mut Criterion) {
    let text = sample_document(200);

    c.bench_function("parse::plain", |b| {
        b.iter(|| black_box(parse(black_box(&text)).unwrap()));
    });

    c.bench_function("parse::identity_reviver", |b| {
        b.iter(|| {
            let value = parse_with_reviver(black_box(&text), |_holder, _key, v| v).unwrap();
            black_box(value);
        });
    });
}

fn bench_stringify(c: &mut Criterion) {
    let value: Value = parse(&sample_document(200)).unwrap();
    let node = Node::from(&value);
    let space = Space::Count(2);

    c.bench_function("stringify::compact", |b| {
        b.iter(|| black_box(stringify(black_box(&node), None, None)));
    });

    c.bench_function("stringify::indented", |b| {
        b.iter(|| black_box(stringify(black_box(&node), None, Some(&space))));
    });

    c.bench_function("stringify::allow_list", |b| {
        let mut replacer = Replacer::allow_list(["kind", "items", "id", "summary"]);
        b.iter(|| black_box(stringify(black_box(&node), Some(&mut replacer), None)));
    });
}

criterion_group!(benches, bench_parse, bench_stringify);
criterion_main!(benches);
