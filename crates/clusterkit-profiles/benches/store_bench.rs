//! Performance benchmarks for profile store operations

use clusterkit_profiles::{ClusterConfig, FixedRoot, ProfileManager, StoreConfig};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tempfile::TempDir;

fn create_manager(temp_dir: &TempDir) -> ProfileManager<FixedRoot> {
    // fsync dominates otherwise
    ProfileManager::with_store_config(
        FixedRoot::new(temp_dir.path()),
        StoreConfig::default().with_fsync(false),
    )
}

fn bench_create_profile(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("temp dir");
    let manager = create_manager(&temp_dir);
    let config = ClusterConfig::new("kvm2", "v1.18.0");

    c.bench_function("create_profile_new", |b| {
        b.iter(|| {
            manager.delete("bench_new", None).expect("delete");
            manager
                .create("bench_new", black_box(&config), None)
                .expect("create");
        });
    });

    manager.create("bench_replace", &config, None).expect("create");
    c.bench_function("create_profile_replace", |b| {
        b.iter(|| {
            manager
                .create("bench_replace", black_box(&config), None)
                .expect("create");
        });
    });
}

fn bench_load_profile(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("temp dir");
    let manager = create_manager(&temp_dir);
    manager
        .create("bench_load", &ClusterConfig::new("docker", "v1.20.0"), None)
        .expect("create");

    c.bench_function("load_profile", |b| {
        b.iter(|| black_box(manager.load("bench_load", None).expect("load")));
    });
}

fn bench_list_profiles(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_profiles");
    for count in [10, 50, 100].iter() {
        let temp_dir = TempDir::new().expect("temp dir");
        let manager = create_manager(&temp_dir);
        for i in 0..*count {
            let config = if i % 5 == 0 {
                ClusterConfig::default()
            } else {
                ClusterConfig::new("kvm2", "v1.18.0")
            };
            manager
                .create(&format!("list_{i}"), &config, None)
                .expect("create");
        }

        group.bench_with_input(BenchmarkId::new("count", count), count, |b, _| {
            b.iter(|| black_box(manager.list(None).expect("list")));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_create_profile,
    bench_load_profile,
    bench_list_profiles
);
criterion_main!(benches);
