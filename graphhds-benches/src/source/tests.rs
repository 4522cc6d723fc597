//! Tests for the planted-partition generator.

use rstest::rstest;

use super::*;

#[rstest]
#[case::no_communities(PlantedPartitionConfig::new(0, 5, 1))]
#[case::singleton_communities(PlantedPartitionConfig::new(3, 1, 1))]
#[case::probability_above_one(PlantedPartitionConfig { intra_probability: 1.5, ..PlantedPartitionConfig::new(2, 4, 1) })]
#[case::nan_probability(PlantedPartitionConfig { inter_probability: f64::NAN, ..PlantedPartitionConfig::new(2, 4, 1) })]
fn rejects_invalid_configs(#[case] config: PlantedPartitionConfig) {
    assert!(PlantedPartition::generate(&config).is_err());
}

#[test]
fn same_seed_gives_same_graph() {
    let config = PlantedPartitionConfig::new(4, 12, 99);
    let first = PlantedPartition::generate(&config).expect("generation must succeed");
    let second = PlantedPartition::generate(&config).expect("generation must succeed");
    assert_eq!(first.graph().edges(), second.graph().edges());
}

#[test]
fn certain_links_stay_inside_communities() {
    let config = PlantedPartitionConfig {
        intra_probability: 1.0,
        inter_probability: 0.0,
        ..PlantedPartitionConfig::new(3, 4, 5)
    };
    let planted = PlantedPartition::generate(&config).expect("generation must succeed");
    let graph = planted.graph();
    assert_eq!(graph.node_count(), 12);
    // Three complete graphs on four nodes.
    assert_eq!(graph.edge_count(), 18);
}

#[test]
fn community_lookup_is_bounded() {
    let planted = PlantedPartition::generate(&PlantedPartitionConfig::new(2, 5, 3))
        .expect("generation must succeed");
    assert_eq!(planted.community_of(0), Some(0));
    assert_eq!(planted.community_of(9), Some(1));
    assert_eq!(planted.community_of(10), None);
}
