use criterion::{criterion_group, criterion_main, Criterion};
use moji::search::{matching_keywords, normalize_query};
use moji::{Dataset, DatasetProvider, SearchConfig, SearchController};

/// Bundled table padded out with synthetic keywords for realistic scan sizes
fn large_dataset(size: usize) -> Dataset {
    let bundled = Dataset::bundled().expect("Failed to load bundled dataset");
    let mut pairs: Vec<(String, String)> = bundled
        .all_keywords()
        .iter()
        .map(|k| (k.clone(), bundled.get(k).unwrap_or_default().to_string()))
        .collect();
    for i in pairs.len()..size {
        pairs.push((format!("synthetic-{i}"), format!("({i})")));
    }
    Dataset::from_pairs(pairs).expect("Failed to build synthetic dataset")
}

fn bench_scan(c: &mut Criterion) {
    let dataset = large_dataset(100_000);
    let keywords = dataset.all_keywords();

    let queries = vec![
        ("empty", ""),
        ("short_2char", "fl"),
        ("medium_word", "tableflip"),
        ("trailing_space", "flip "),
        ("no_match", "zzzzzz"),
    ];

    let mut group = c.benchmark_group("scan");
    for (name, query) in queries {
        let needle = normalize_query(query);
        group.bench_function(format!("{name}_sequential"), |b| {
            b.iter(|| matching_keywords(keywords, &needle, usize::MAX))
        });
        group.bench_function(format!("{name}_parallel"), |b| {
            b.iter(|| matching_keywords(keywords, &needle, 1))
        });
    }
    group.finish();
}

fn bench_controller(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let controller = rt.block_on(async {
        let controller =
            SearchController::with_dataset(large_dataset(10_000), SearchConfig::default()).unwrap();
        controller.initialize().unwrap();
        controller
    });
    let mut states = controller.subscribe();

    let mut group = c.benchmark_group("controller");
    group.sample_size(20);
    group.bench_function("submit_and_settle", |b| {
        b.iter(|| {
            rt.block_on(async {
                controller.submit_query("flip".to_string()).unwrap();
                states.wait_for(|s| !s.is_loading).await.unwrap().results.len()
            })
        });
    });
    group.finish();
}

criterion_group!(benches, bench_scan, bench_controller);
criterion_main!(benches);
