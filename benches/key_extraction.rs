use std::fmt::Write as _;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use shape_probe::keys::get_keys;
use shape_probe::tables::compute_table_defs;

fn generate_orders(documents: usize) -> String {
    let mut json = String::new();
    for i in 0..documents {
        let status = match i % 3 {
            0 => "shipped",
            1 => "pending",
            _ => "processing",
        };
        writeln!(
            json,
            r#"{{"id": {i}, "status": "{status}", "customer": {{"name": "c{i}", "tier_{tier}": true}}, "items": [{{"sku": "s{i}", "qty": {qty}, "options": [{{"k": "gift"}}]}}], "tags": ["a", "b"]}}"#,
            tier = i % 7,
            qty = i % 5 + 1,
        )
        .expect("write document");
    }
    json
}

fn bench_key_extraction(c: &mut Criterion) {
    let stream = generate_orders(2_000);
    let keys = get_keys(stream.as_bytes()).expect("keys");

    let mut group = c.benchmark_group("json_shape");
    group.bench_function("get_keys", |b| {
        b.iter_batched(
            || stream.as_bytes(),
            |bytes| get_keys(bytes).expect("keys"),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("compute_table_defs", |b| {
        b.iter(|| compute_table_defs("orders", &keys));
    });
    group.finish();
}

criterion_group!(benches, bench_key_extraction);
criterion_main!(benches);
