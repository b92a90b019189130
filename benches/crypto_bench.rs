use coffer::core::crypto::{
    decrypt_document, derive_key, encrypt_document, generate_salt, SALT_LEN,
};
use coffer::core::types::Document;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use std::time::Duration;

/// Build a document with a payload field of the given size.
fn generate_document(size: usize) -> Document {
    json!({"payload": "x".repeat(size)})
        .as_object()
        .cloned()
        .unwrap()
}

/// Benchmark encrypt/decrypt roundtrip with varying payload sizes.
fn bench_encrypt_decrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("encrypt_decrypt");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let salt = generate_salt(SALT_LEN).unwrap();
    let key = derive_key("bench-pass", &salt, 1_000).unwrap();
    let sizes = [32, 256, 1024, 4096, 16384];

    for size in sizes {
        let doc = generate_document(size);

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(
            BenchmarkId::new("roundtrip", format!("{}B", size)),
            &doc,
            |b, doc| {
                b.iter(|| {
                    let encrypted = encrypt_document(black_box(doc), black_box(&key)).unwrap();
                    let decrypted =
                        decrypt_document(black_box(&encrypted), black_box(&key)).unwrap();
                    black_box(decrypted);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark encryption only.
fn bench_encrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("encrypt");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let salt = generate_salt(SALT_LEN).unwrap();
    let key = derive_key("bench-pass", &salt, 1_000).unwrap();
    let sizes = [32, 256, 1024, 4096, 16384];

    for size in sizes {
        let doc = generate_document(size);

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(
            BenchmarkId::new("aes_gcm", format!("{}B", size)),
            &doc,
            |b, doc| {
                b.iter(|| {
                    let encrypted = encrypt_document(black_box(doc), black_box(&key)).unwrap();
                    black_box(encrypted);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark decryption only with pre-encrypted data.
fn bench_decrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("decrypt");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let salt = generate_salt(SALT_LEN).unwrap();
    let key = derive_key("bench-pass", &salt, 1_000).unwrap();
    let sizes = [32, 256, 1024, 4096, 16384];

    for size in sizes {
        let doc = generate_document(size);
        let encrypted = encrypt_document(&doc, &key).unwrap();

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(
            BenchmarkId::new("aes_gcm", format!("{}B", size)),
            &encrypted,
            |b, encrypted| {
                b.iter(|| {
                    let decrypted =
                        decrypt_document(black_box(encrypted), black_box(&key)).unwrap();
                    black_box(decrypted);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark key derivation cost over iteration counts.
fn bench_key_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_derivation");
    group.sample_size(10);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));

    let salt = generate_salt(SALT_LEN).unwrap();
    let iteration_counts = [1_000, 10_000, 100_000, 600_000];

    for iterations in iteration_counts {
        group.bench_with_input(
            BenchmarkId::new("pbkdf2", format!("{}_iters", iterations)),
            &iterations,
            |b, &iterations| {
                b.iter(|| {
                    let key =
                        derive_key(black_box("bench-pass"), black_box(&salt), iterations).unwrap();
                    black_box(key);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encrypt_decrypt,
    bench_encrypt,
    bench_decrypt,
    bench_key_derivation,
);
criterion_main!(benches);
