use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn hmac_sign_bench(c: &mut Criterion) {
    let body = vec![0x7Bu8; 2048];

    c.bench_function("hmac_sha256_sign_2KB", |b| {
        b.iter(|| idv_crypto::sign_hex(black_box(&body), "webhook-secret"))
    });
}

fn hmac_verify_bench(c: &mut Criterion) {
    let body = vec![0x7Bu8; 2048];
    let sig = idv_crypto::sign_hex(&body, "webhook-secret");

    c.bench_function("hmac_sha256_verify_2KB", |b| {
        b.iter(|| idv_crypto::verify_signature(black_box(&body), &sig, "webhook-secret"))
    });
}

criterion_group!(benches, hmac_sign_bench, hmac_verify_bench);
criterion_main!(benches);
