//! # Parcel-Relay Benchmarks
//!
//! Hot paths of a publish request that run before any network I/O:
//!
//! | Stage | Work |
//! |-------|------|
//! | Chain decode | bracket-indexed form fields → `AuthChain` |
//! | Chain verify | EIP-191 hash + secp256k1 recovery |
//! | Authorize | snapshot lookup for every claimed parcel |
//! | Snapshot build | full table rebuild on refresh |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pr_01_permissions::{AuthorizationRecord, ParcelAuthorizer, PermissionSnapshot};
use pr_02_auth_chain::{AuthChainCodec, RelaySigner};
use shared_types::EntityId;
use std::collections::BTreeMap;

const USER_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const ENTITY: &str = "bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku";

fn bench_auth_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("pr-02-auth-chain");

    let signer = RelaySigner::from_hex(USER_KEY).unwrap();
    let entity = EntityId::new(ENTITY);
    let (chain, _) = signer.sign(&entity).unwrap();
    let codec = AuthChainCodec::new();
    let fields = codec.encode_form_fields(&chain);

    group.bench_function("decode_form_fields", |b| {
        b.iter(|| black_box(codec.decode_form_fields(black_box(&fields)).unwrap()))
    });
    group.bench_function("verify", |b| {
        b.iter(|| black_box(codec.verify(black_box(&chain), &entity).unwrap()))
    });
    group.bench_function("relay_sign", |b| {
        b.iter(|| black_box(signer.sign(black_box(&entity)).unwrap()))
    });

    group.finish();
}

fn records(identities: usize, plots_each: usize) -> Vec<AuthorizationRecord> {
    (0..identities)
        .map(|i| AuthorizationRecord {
            name: format!("grant-{i}"),
            desc: String::new(),
            start_date: None,
            end_date: None,
            contact_info: BTreeMap::new(),
            addresses: vec![format!("0x{:040x}", i + 1)],
            plots: (0..plots_each)
                .map(|p| format!("{},{}", (p % 300) as i32 - 150, (i % 300) as i32 - 150))
                .collect(),
        })
        .collect()
}

fn bench_permissions(c: &mut Criterion) {
    let mut group = c.benchmark_group("pr-01-permissions");

    for identities in [10usize, 100, 1000] {
        let recs = records(identities, 50);
        group.throughput(Throughput::Elements(identities as u64));
        group.bench_with_input(
            BenchmarkId::new("snapshot_build", identities),
            &recs,
            |b, recs| b.iter(|| black_box(PermissionSnapshot::build(recs, chrono_now(), 1))),
        );
    }

    let snapshot = PermissionSnapshot::build(&records(1000, 50), chrono_now(), 1);
    let authorizer = ParcelAuthorizer::new();
    let identity = format!("0x{:040x}", 500);
    for claimed in [1usize, 10, 50] {
        let pointers: Vec<String> = (0..claimed)
            .map(|p| format!("{},{}", (p % 300) as i32 - 150, (499 % 300) as i32 - 150))
            .collect();
        group.bench_with_input(
            BenchmarkId::new("authorize", claimed),
            &pointers,
            |b, pointers| {
                b.iter(|| black_box(authorizer.authorize(&snapshot, &identity, pointers.as_slice())))
            },
        );
    }

    group.finish();
}

fn chrono_now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}

criterion_group!(benches, bench_auth_chain, bench_permissions);
criterion_main!(benches);
