//! Handshake hot-path benchmarks.
//!
//! Measures the work done per inbound message and per frame show:
//! - Inbound message parsing and origin filtering
//! - Frame URL composition for short and long tokens
//! - Cookie blob lookup with a crowded jar
//!
//! Run with: cargo bench --bench handshake
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;

use portal_bridge::{
    CookieJar, CookieTokenStore, Host, HostConfig, InboundMessage, MemoryCookieJar,
    MemoryFrames, MemoryTokenStore, MessageEvent, TokenStore, compose_frame_url,
};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const TOKEN_LENGTHS: &[usize] = &[32, 512, 4096];
const COOKIE_COUNTS: &[usize] = &[1, 20, 100];

// ============================================================================
// Benchmark: Message Handling
// ============================================================================

fn bench_message_handling(c: &mut Criterion) {
    let config = HostConfig::builder()
        .patient_url("https://portal.example/patient")
        .staff_url("https://portal.example/staff")
        .build()
        .expect("config");
    let host = Host::new(
        config,
        Arc::new(MemoryTokenStore::new()),
        Arc::new(MemoryFrames::new()),
    );

    let close = MessageEvent::new(
        "https://portal.example",
        json!({ "type": "CLOSE_PATIENT_IFRAME" }),
    );
    let foreign = MessageEvent::new(
        "https://evil.example",
        json!({ "type": "CLOSE_PATIENT_IFRAME" }),
    );
    let noise = MessageEvent::new("https://portal.example", json!("webpackHotUpdate"));

    let mut group = c.benchmark_group("message");
    group.bench_function("parse", |b| {
        b.iter(|| InboundMessage::parse(black_box(&close.data)))
    });
    group.bench_function("close", |b| {
        b.iter(|| host.handle_message(black_box(&close)))
    });
    group.bench_function("foreign_origin", |b| {
        b.iter(|| host.handle_message(black_box(&foreign)))
    });
    group.bench_function("noise", |b| {
        b.iter(|| host.handle_message(black_box(&noise)))
    });
    group.finish();
}

// ============================================================================
// Benchmark: URL Composition
// ============================================================================

fn bench_compose_url(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose_url");

    for &len in TOKEN_LENGTHS {
        let token: String = "ab c;=".chars().cycle().take(len).collect();
        group.bench_with_input(BenchmarkId::new("token_len", len), &token, |b, token| {
            b.iter(|| compose_frame_url("https://portal.example/patient", Some(black_box(token))))
        });
    }
    group.finish();
}

// ============================================================================
// Benchmark: Cookie Lookup
// ============================================================================

fn bench_cookie_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("cookie_get");

    for &count in COOKIE_COUNTS {
        let jar = Arc::new(MemoryCookieJar::new());
        for i in 0..count {
            jar.write(&format!("pref{i}=value{i}; path=/"));
        }
        let store = CookieTokenStore::new(jar);
        store.set("bench-token");

        group.bench_with_input(BenchmarkId::new("cookies", count), &store, |b, store| {
            b.iter(|| store.get())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_message_handling,
    bench_compose_url,
    bench_cookie_lookup
);
criterion_main!(benches);
