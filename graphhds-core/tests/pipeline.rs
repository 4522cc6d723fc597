//! End-to-end runs of the graph HDS pipeline.

mod common;

use std::collections::BTreeSet;

use graphhds_core::{
    ClusterId, ClusterPolicy, GraphHdsBuilder, GraphHdsErrorCode, LevelOutcome, StabilityMeasure,
};
use graphhds_test_support::trace::CaptureLayer;
use rstest::rstest;

use common::{bridged_triangles, triangle_with_pair};

#[rstest]
#[case(ClusterPolicy::Node)]
#[case(ClusterPolicy::Edge)]
fn triangle_forms_the_only_cluster(#[case] policy: ClusterPolicy) {
    let graph = triangle_with_pair();
    let hds = GraphHdsBuilder::new()
        .with_min_flow(0.5)
        .with_shave_rate(0.5)
        .with_min_shave(0.0)
        .with_policy(policy)
        .build()
        .expect("configuration is valid");

    let result = hds.run(&graph).expect("run must succeed");

    let clusters: Vec<&BTreeSet<usize>> = result.partition().clusters().values().collect();
    assert_eq!(clusters, vec![&BTreeSet::from([0, 1, 2])]);
    assert!(result.partition().excluded().is_empty());
    for row in result.hierarchy().labels().iter_rows() {
        assert_eq!(row[3], 0);
        assert_eq!(row[4], 0);
    }
    assert_eq!(
        result
            .levels()
            .iter()
            .map(|level| level.outcome)
            .collect::<Vec<_>>(),
        vec![LevelOutcome::Retained, LevelOutcome::Redundant]
    );
}

#[test]
fn synthetic_root_shrinks_into_the_single_dense_cluster() {
    let graph = triangle_with_pair();
    let result = GraphHdsBuilder::new()
        .with_min_flow(0.5)
        .with_shave_rate(0.5)
        .build()
        .expect("configuration is valid")
        .run(&graph)
        .expect("run must succeed");

    let labels = result.hierarchy().labels();
    assert_eq!(result.retained_levels(), 2);
    assert_eq!(labels.row(0), &[1, 1, 1, 1, 1]);
    assert_eq!(labels.row(1), &[1, 1, 1, 0, 0]);
    assert_eq!(result.hierarchy().cluster_count(), 1);
}

#[test]
fn split_hierarchy_keeps_the_most_stable_branches() {
    let graph = bridged_triangles();
    let result = GraphHdsBuilder::new()
        .with_min_flow(0.5)
        .with_shave_rate(0.5)
        .build()
        .expect("configuration is valid")
        .run(&graph)
        .expect("run must succeed");

    let labels = result.hierarchy().labels();
    assert_eq!(labels.row(0), &[1, 1, 1, 1, 1, 1]);
    assert_eq!(labels.row(1), &[2, 2, 2, 3, 3, 3]);
    assert_eq!(labels.row(2), &[2, 2, 2, 0, 0, 0]);

    let (root, left, right) = (ClusterId::new(1), ClusterId::new(2), ClusterId::new(3));
    assert_eq!(result.stabilities().get(&left), Some(&2.0));
    assert_eq!(
        result.partition().clusters().keys().copied().collect::<Vec<_>>(),
        vec![left, right]
    );
    assert_eq!(result.partition().excluded(), &BTreeSet::from([root]));
    assert_eq!(
        result.assignments(),
        vec![Some(left), Some(left), Some(left), Some(right), Some(right), Some(right)]
    );
}

#[test]
fn high_min_stability_empties_the_partition() {
    let graph = bridged_triangles();
    let result = GraphHdsBuilder::new()
        .with_min_flow(0.5)
        .with_shave_rate(0.5)
        .with_stability_measure(StabilityMeasure::Flow)
        .with_min_stability(1.0e9)
        .build()
        .expect("configuration is valid")
        .run(&graph)
        .expect("run must succeed");

    assert!(result.partition().is_empty());
    assert_eq!(result.partition().excluded().len(), 3);
    assert!(result.assignments().iter().all(Option::is_none));
}

#[rstest]
#[case(GraphHdsBuilder::new().with_min_flow(-0.1), GraphHdsErrorCode::InvalidMinFlow)]
#[case(GraphHdsBuilder::new().with_min_flow(f64::INFINITY), GraphHdsErrorCode::InvalidMinFlow)]
#[case(GraphHdsBuilder::new().with_shave_rate(0.0), GraphHdsErrorCode::InvalidShaveRate)]
#[case(GraphHdsBuilder::new().with_shave_rate(1.5), GraphHdsErrorCode::InvalidShaveRate)]
#[case(GraphHdsBuilder::new().with_min_shave(1.0), GraphHdsErrorCode::InvalidMinShave)]
#[case(GraphHdsBuilder::new().with_min_shave(-0.2), GraphHdsErrorCode::InvalidMinShave)]
#[case(
    GraphHdsBuilder::new().with_min_stability(f64::NAN),
    GraphHdsErrorCode::InvalidMinStability,
)]
fn builder_rejects_out_of_range_parameters(
    #[case] builder: GraphHdsBuilder,
    #[case] expected: GraphHdsErrorCode,
) {
    let err = builder.build().expect_err("configuration must be rejected");
    assert_eq!(err.code(), expected);
}

#[test]
fn builder_accepts_boundary_values() {
    let hds = GraphHdsBuilder::new()
        .with_min_flow(0.0)
        .with_shave_rate(1.0)
        .with_min_shave(0.0)
        .with_min_stability(f64::NEG_INFINITY)
        .build()
        .expect("boundaries are inclusive where documented");
    assert_eq!(hds.shave_rate(), 1.0);
    assert_eq!(hds.level_config().min_shave(), 0.0);
}

#[test]
fn run_emits_pipeline_spans() {
    let graph = triangle_with_pair();
    let hds = GraphHdsBuilder::new()
        .with_min_flow(0.5)
        .with_shave_rate(0.5)
        .build()
        .expect("configuration is valid");

    let capture = CaptureLayer::default();
    capture.run(|| hds.run(&graph)).expect("run must succeed");

    let span = capture.span("core.run").expect("run span must be recorded");
    assert_eq!(span.field("graph"), Some("triangle-with-pair"));
    assert_eq!(span.field("measure"), Some("levels"));
    let names = capture.span_names();
    for stage in ["core.build_levels", "core.combine", "core.dedupe"] {
        assert!(names.iter().any(|name| name == stage), "missing span {stage}");
    }
    assert!(capture.saw_message("graph HDS run complete"));
}
