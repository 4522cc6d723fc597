//! Graph HDS pipeline benchmarks.
//!
//! Measures the level build, label combination, deduplication, and the
//! full run over planted-partition graphs of increasing size. Each stage
//! is fed the output of the previous one, prepared outside the timed loop.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use graphhds_benches::{
    error::BenchSetupError,
    params::PipelineBenchParams,
    source::{PlantedPartition, PlantedPartitionConfig},
};
use graphhds_core::{
    ClusterDeduper, ClusterPolicy, CombinedHierarchy, GraphHdsBuilder, LevelConfig,
    StabilityMeasure, build_levels,
};

/// Seed used for all synthetic graphs in this benchmark.
const SEED: u64 = 42;

/// Nodes per planted community.
const COMMUNITY_SIZE: usize = 25;

/// Community counts to benchmark.
const COMMUNITY_COUNTS: &[usize] = &[4, 16, 40];

const MIN_FLOW: f64 = 2.0;
const SHAVE_RATE: f64 = 0.05;
const MIN_SHAVE: f64 = 0.3;

fn planted(communities: usize) -> Result<(PipelineBenchParams, PlantedPartition), BenchSetupError> {
    let planted = PlantedPartition::generate(&PlantedPartitionConfig::new(
        communities,
        COMMUNITY_SIZE,
        SEED,
    ))?;
    let params = PipelineBenchParams {
        communities,
        community_size: COMMUNITY_SIZE,
    };
    Ok((params, planted))
}

fn pipeline_stages_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let config = LevelConfig::new(MIN_FLOW, SHAVE_RATE, MIN_SHAVE, ClusterPolicy::Node);
    let mut levels_group = c.benchmark_group("build_levels");
    levels_group.sample_size(20);
    let mut prepared = Vec::new();
    for &communities in COMMUNITY_COUNTS {
        let (params, planted) = planted(communities)?;
        levels_group.bench_with_input(
            BenchmarkId::from_parameter(&params),
            planted.graph(),
            |b, graph| {
                b.iter(|| build_levels(graph, &config));
            },
        );
        let levels = build_levels(planted.graph(), &config)?;
        prepared.push((params, planted, levels));
    }
    levels_group.finish();

    let mut combine_group = c.benchmark_group("combine");
    for (params, _, levels) in &prepared {
        combine_group.bench_with_input(
            BenchmarkId::from_parameter(params),
            levels.matrix(),
            |b, matrix| {
                b.iter(|| CombinedHierarchy::combine(matrix));
            },
        );
    }
    combine_group.finish();

    let mut dedupe_group = c.benchmark_group("dedupe");
    for (params, planted, levels) in &prepared {
        let hierarchy = CombinedHierarchy::combine(levels.matrix());
        let clusters = hierarchy.clusters();
        let stabilities = hierarchy.stability(StabilityMeasure::Flow, planted.graph());
        let deduper = ClusterDeduper::new(&clusters, &stabilities)?;
        dedupe_group.bench_with_input(
            BenchmarkId::from_parameter(params),
            &deduper,
            |b, deduper| {
                b.iter(|| deduper.dedupe(0.0));
            },
        );
    }
    dedupe_group.finish();
    Ok(())
}

fn full_run_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("full_run");
    group.sample_size(10);
    for policy in [ClusterPolicy::Node, ClusterPolicy::Edge] {
        let hds = GraphHdsBuilder::new()
            .with_min_flow(MIN_FLOW)
            .with_shave_rate(SHAVE_RATE)
            .with_min_shave(MIN_SHAVE)
            .with_policy(policy)
            .build()?;
        for &communities in COMMUNITY_COUNTS {
            let (params, planted) = planted(communities)?;
            group.bench_with_input(
                BenchmarkId::new(policy.as_str(), &params),
                planted.graph(),
                |b, graph| {
                    b.iter(|| hds.run(graph));
                },
            );
        }
    }
    group.finish();
    Ok(())
}

fn pipeline_stages(c: &mut Criterion) {
    if let Err(err) = pipeline_stages_impl(c) {
        panic!("pipeline stage benchmark setup failed: {err}");
    }
}

fn full_run(c: &mut Criterion) {
    if let Err(err) = full_run_impl(c) {
        panic!("full run benchmark setup failed: {err}");
    }
}

criterion_group!(benches, pipeline_stages, full_run);
criterion_main!(benches);
