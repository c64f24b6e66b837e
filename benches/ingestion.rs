use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dataset_ingest::ingestion::csv::decode_csv;
use dataset_ingest::ingestion::json::decode_json;
use dataset_ingest::ingestion::{ingest, IngestionOptions, UploadedFile};

fn csv_input(rows: usize) -> String {
    let mut s = String::from("id,name,score,active\n");
    for i in 0..rows {
        s.push_str(&format!("{i},user{i},{}.5,{}\n", i % 100, i % 2 == 0));
    }
    s
}

fn json_input(rows: usize) -> String {
    let items: Vec<String> = (0..rows)
        .map(|i| format!(r#"{{"id":{i},"name":"user{i}","score":{}.5,"active":{}}}"#, i % 100, i % 2 == 0))
        .collect();
    format!("[{}]", items.join(","))
}

fn bench_decoders(c: &mut Criterion) {
    let csv = csv_input(10_000);
    let json = json_input(10_000);

    c.bench_function("decode_csv_10k_rows", |b| {
        b.iter(|| decode_csv(black_box(csv.as_bytes()), b',', &mut Vec::new()).unwrap())
    });
    c.bench_function("decode_json_10k_items", |b| {
        b.iter(|| decode_json(black_box(json.as_bytes())).unwrap())
    });
}

fn bench_ingest(c: &mut Criterion) {
    let file = UploadedFile::new("bench.csv", csv_input(10_000));
    let opts = IngestionOptions::default();

    c.bench_function("ingest_csv_upload_10k_rows", |b| {
        b.iter(|| ingest(black_box(&file), &opts).unwrap())
    });
}

criterion_group!(benches, bench_decoders, bench_ingest);
criterion_main!(benches);
