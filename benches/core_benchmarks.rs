//! Benchmarks for calltrack-core timeline and leaderboard functions

use calltrack_core::activity::{build_timeline, merge_activity};
use calltrack_core::leaderboard::rank_salespeople;
use calltrack_core::types::{AppointmentRecord, CallRecord, Profile};
use calltrack_core::utils::format_relative_time;
use chrono::{Duration, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use uuid::Uuid;

fn sample_calls(n: usize, users: &[Uuid]) -> Vec<CallRecord> {
    let now = Utc::now();
    (0..n)
        .map(|i| CallRecord {
            id: Uuid::new_v4(),
            user_id: users[i % users.len()],
            organization_id: None,
            customer_name: Some(format!("Customer {i}")),
            duration_seconds: Some(u32::try_from(i % 900).unwrap_or(0)),
            created_at: now - Duration::minutes(i64::try_from(i * 7).unwrap_or(0)),
        })
        .collect()
}

fn sample_appointments(n: usize) -> Vec<AppointmentRecord> {
    let now = Utc::now();
    (0..n)
        .map(|i| AppointmentRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            customer_name: format!("Prospect {i}"),
            appointment_date: now + Duration::days(i64::try_from(i % 14).unwrap_or(0)),
            created_at: now - Duration::minutes(i64::try_from(i * 11).unwrap_or(0)),
        })
        .collect()
}

/// Merge and filter at typical page sizes
fn bench_timeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeline");
    let users = vec![Uuid::new_v4()];

    for size in [50usize, 500, 5_000] {
        let calls = sample_calls(size, &users);
        let appointments = sample_appointments(size / 2);

        group.throughput(Throughput::Elements((size + size / 2) as u64));
        group.bench_with_input(BenchmarkId::new("merge", size), &size, |b, _| {
            b.iter(|| merge_activity(black_box(&calls), black_box(&appointments)));
        });
        group.bench_with_input(BenchmarkId::new("merge_and_filter", size), &size, |b, _| {
            b.iter(|| build_timeline(black_box(&calls), black_box(&appointments), Some("cust")));
        });
    }

    group.finish();
}

/// Rank an organization of salespeople
fn bench_leaderboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("leaderboard");

    for people in [10usize, 100, 1_000] {
        let profiles: Vec<Profile> = (0..people)
            .map(|i| Profile {
                user_id: Uuid::new_v4(),
                full_name: Some(format!("Rep {i}")),
                email: None,
                organization_id: None,
            })
            .collect();
        let users: Vec<Uuid> = profiles.iter().map(|p| p.user_id).collect();
        let calls = sample_calls(people * 20, &users);

        group.bench_with_input(BenchmarkId::new("rank", people), &people, |b, _| {
            b.iter(|| rank_salespeople(black_box(&profiles), black_box(&calls)));
        });
    }

    group.finish();
}

fn bench_relative_time(c: &mut Criterion) {
    let now = Utc::now();
    let stamps: Vec<_> = (0..1_000)
        .map(|i| now - Duration::minutes(i * 37))
        .collect();

    c.bench_function("format_relative_time", |b| {
        b.iter(|| {
            stamps
                .iter()
                .map(|ts| format_relative_time(ts, &now))
                .collect::<Vec<_>>()
        });
    });
}

criterion_group!(benches, bench_timeline, bench_leaderboard, bench_relative_time);
criterion_main!(benches);
