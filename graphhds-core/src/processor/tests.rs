//! Unit and property tests for hierarchy combination and scoring.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use rstest::rstest;

use super::*;
use crate::{
    hierarchy::{LevelConfig, build_levels},
    level::ClusterPolicy,
    test_utils::{graph_from_edges, graph_strategy, proptest_config, triangle_with_pair},
};

fn matrix(rows: Vec<Vec<u32>>) -> LabelMatrix {
    LabelMatrix::from_rows(rows).expect("fixture rows align")
}

fn id(raw: u32) -> ClusterId {
    ClusterId::new(raw)
}

fn unit_path() -> SimilarityGraph {
    graph_from_edges(
        "path",
        &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0)],
    )
}

fn all_members(graph: &SimilarityGraph) -> BTreeSet<usize> {
    (0..graph.node_count()).collect()
}

#[test]
fn split_children_get_new_ids_and_shrinks_keep_theirs() {
    let hierarchy = CombinedHierarchy::combine(&matrix(vec![
        vec![1, 1, 1, 1],
        vec![4, 4, 9, 9],
        vec![2, 2, 0, 0],
    ]));

    assert_eq!(hierarchy.cluster_count(), 3);
    assert_eq!(
        hierarchy.births(),
        &BTreeMap::from([
            (1, BTreeSet::from([id(1)])),
            (2, BTreeSet::from([id(2), id(3)])),
        ])
    );
    assert_eq!(hierarchy.branch_row(id(3)), Some(1));
    assert_eq!(hierarchy.born_at(2), BTreeSet::new());
    assert_eq!(
        hierarchy.stabilities(),
        BTreeMap::from([(id(1), 1.0), (id(2), 2.0), (id(3), 1.0)])
    );
}

#[test]
fn child_overlapping_background_is_new() {
    let hierarchy = CombinedHierarchy::combine(&matrix(vec![vec![1, 1, 0], vec![1, 1, 1]]));

    assert_eq!(hierarchy.labels().row(0), &[1, 1, 0]);
    assert_eq!(hierarchy.labels().row(1), &[2, 2, 2]);
    assert_eq!(hierarchy.depth_of(id(2)), Some(2));
}

#[test]
fn labels_are_unique_across_rows_before_combining() {
    let relabeled = combine::initial_relabel(&matrix(vec![vec![5, 5, 0], vec![1, 2, 0]]));
    assert_eq!(relabeled.row(0), &[1, 1, 0]);
    assert_eq!(relabeled.row(1), &[2, 3, 0]);
}

#[test]
fn sort_order_groups_nodes_by_cluster_path() {
    let hierarchy = CombinedHierarchy::combine(&matrix(vec![vec![1, 1, 1, 1], vec![2, 1, 1, 2]]));

    assert_eq!(hierarchy.labels().row(1), &[3, 2, 2, 3]);
    assert_eq!(hierarchy.sort_order(), vec![1, 2, 0, 3]);
}

#[test]
fn clusters_omit_singletons_but_stabilities_keep_them() {
    let hierarchy = CombinedHierarchy::combine(&matrix(vec![vec![1, 1, 2]]));

    let clusters = hierarchy.clusters();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[&id(1)], BTreeSet::from([0, 1]));
    assert!(hierarchy.stabilities().contains_key(&id(2)));
}

#[rstest]
#[case(1, 3.24)]
#[case(2, 0.02)]
fn flow_stability_normalizes_by_pair_count(#[case] cluster: u32, #[case] expected: f64) {
    let graph = triangle_with_pair();
    let hierarchy = CombinedHierarchy::combine(&matrix(vec![vec![1, 1, 1, 2, 2]]));

    let scores = hierarchy.stability(StabilityMeasure::Flow, &graph);
    assert!((scores[&id(cluster)] - expected).abs() < 1e-9);
}

#[test]
fn measure_names_match_the_command_line() {
    assert_eq!(StabilityMeasure::default().as_str(), "levels");
    assert_eq!(StabilityMeasure::Flow.as_str(), "flow");
}

#[test]
fn empty_matrix_has_no_clusters() {
    let hierarchy = CombinedHierarchy::combine(&LabelMatrix::zeroed(0, 4));
    assert_eq!(hierarchy.cluster_count(), 0);
    assert!(hierarchy.clusters().is_empty());
    assert_eq!(hierarchy.sort_order(), vec![0, 1, 2, 3]);
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn combining_is_idempotent(
        graph in graph_strategy(),
        min_flow in 0.0_f64..2.0,
        rate in 0.1_f64..=0.6,
    ) {
        let config = LevelConfig::new(min_flow, rate, 0.2, ClusterPolicy::Node);
        let levels = build_levels(&graph, &config).expect("shaving must succeed");
        let once = CombinedHierarchy::combine(levels.matrix());
        let twice = CombinedHierarchy::combine(once.labels());
        prop_assert_eq!(&once, &twice);
    }

    #[test]
    fn every_nonzero_cell_is_a_known_cluster(
        graph in graph_strategy(),
        min_flow in 0.0_f64..2.0,
    ) {
        let config = LevelConfig::new(min_flow, 0.3, 0.1, ClusterPolicy::Edge);
        let levels = build_levels(&graph, &config).expect("shaving must succeed");
        let hierarchy = CombinedHierarchy::combine(levels.matrix());
        for row in hierarchy.labels().iter_rows() {
            for &label in row.iter().filter(|&&label| label != 0) {
                prop_assert!(hierarchy.depth_of(ClusterId::new(label)).is_some());
            }
        }
    }
}

#[rstest]
#[case(ShavingOrder::Flow)]
#[case(ShavingOrder::Incremental)]
fn star_hub_reaches_nobody_in_two_hops(#[case] order: ShavingOrder) {
    let star = graph_from_edges(
        "star",
        &[(0, 1, 1.0), (0, 2, 1.0), (0, 3, 1.0), (0, 4, 1.0)],
    );
    assert_eq!(
        density_sorted(&star, &all_members(&star), order),
        vec![0, 1, 2, 3, 4]
    );
}

#[rstest]
#[case(ShavingOrder::Flow)]
#[case(ShavingOrder::Incremental)]
fn weak_pendant_is_shaved_before_the_triangle(#[case] order: ShavingOrder) {
    let graph = graph_from_edges(
        "pendant",
        &[(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0), (0, 3, 0.5)],
    );
    assert_eq!(
        density_sorted(&graph, &all_members(&graph), order),
        vec![3, 0, 1, 2]
    );
}

#[rstest]
#[case(ShavingOrder::Flow, vec![0, 1, 3, 4, 2])]
#[case(ShavingOrder::Incremental, vec![0, 1, 3, 2, 4])]
fn shaving_orders_differ_on_a_path(#[case] order: ShavingOrder, #[case] expected: Vec<usize>) {
    let path = unit_path();
    assert_eq!(density_sorted(&path, &all_members(&path), order), expected);
}

#[test]
fn shaving_ignores_edges_leaving_the_cluster() {
    let path = unit_path();
    let members = BTreeSet::from([0, 1, 2]);
    assert_eq!(
        density_sorted(&path, &members, ShavingOrder::Flow),
        vec![1, 0, 2]
    );
}
