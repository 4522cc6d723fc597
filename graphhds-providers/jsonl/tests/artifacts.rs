//! Loading JSONL input and writing the viewer artifacts end to end.

use std::{fs, path::Path};

use graphhds_core::{GraphHdsBuilder, WeightScale};
use graphhds_providers_jsonl::{
    ArtifactWriter, ClusterLabels, GraphLoader, JsonlProviderError, load_cluster_labels,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

const GRAPH: &str = r#"{"id": 10, "connections": [[11, 0.9], [12, 0.9]]}
{"id": 11, "connections": [[12, 0.9]]}

{"id": 13, "connections": [[14, 0.8], [15, 0.8], [12, 0.1]]}
{"id": 14, "connections": [[15, 0.8]]}
"#;

const MAPPING: &str = "10\tn10\t1.0\n11\tn11\t1.0\n12\tn12\t1.0\n13\tn13\t1.0\n14\tn14\t1.0\n15\tn15\t1.0\n";

struct Staged {
    dir: TempDir,
}

impl Staged {
    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("artifact must be readable")
    }
}

#[fixture]
fn staged() -> Staged {
    let dir = tempfile::tempdir().expect("temp dir must be created");
    fs::write(dir.path().join("graph.jsonl"), GRAPH).expect("graph must be written");
    fs::write(dir.path().join("graph.mapping.tsv"), MAPPING).expect("mapping must be written");
    Staged { dir }
}

fn run_and_write(staged: &Staged, mapping: Option<&Path>) -> Vec<std::path::PathBuf> {
    run_and_write_labelled(staged, mapping, ClusterLabels::new())
}

fn run_and_write_labelled(
    staged: &Staged,
    mapping: Option<&Path>,
    labels: ClusterLabels,
) -> Vec<std::path::PathBuf> {
    let graph = GraphLoader::new("bridged")
        .load_graph(&staged.path("graph.jsonl"), mapping)
        .expect("graph must load");
    let result = GraphHdsBuilder::new()
        .with_min_flow(0.5)
        .with_shave_rate(0.5)
        .build()
        .expect("configuration is valid")
        .run(&graph)
        .expect("run must succeed");
    ArtifactWriter::new(&graph, &result)
        .with_cluster_labels(labels)
        .write_all(&staged.path("out"))
        .expect("artifacts must be written")
}

#[rstest]
fn writes_every_viewer_artifact(staged: Staged) {
    let mapping = staged.path("graph.mapping.tsv");
    let written = run_and_write(&staged, Some(&mapping));
    assert_eq!(written.len(), 8);
    assert!(written.iter().all(|path| path.exists()));

    assert_eq!(
        staged.read("out/graph.hds"),
        "1 2 2\n1 2 2\n1 2 2\n1 3 0\n1 3 0\n1 3 0\n"
    );
    assert_eq!(staged.read("out/graph_sorted.idx"), "1\n2\n3\n4\n5\n6\n");
    assert_eq!(
        staged.read("out/graph.dsc"),
        "n10\nn11\nn12\nn13\nn14\nn15\n"
    );
    assert_eq!(staged.read("out/graph.txt"), "");
    assert_eq!(
        staged.read("out/graph.stabilities.jsonl"),
        "{\"label\":1,\"stability\":1.0}\n{\"label\":2,\"stability\":2.0}\n{\"label\":3,\"stability\":1.0}\n"
    );
}

#[rstest]
fn label_matrix_and_clusters_use_external_ids(staged: Staged) {
    run_and_write(&staged, None);

    let matrix = staged.read("out/full_label_matrix.jsonl");
    assert_eq!(matrix.lines().count(), 18);
    assert_eq!(
        matrix.lines().next(),
        Some("{\"level\":0,\"id\":10,\"label\":1}")
    );
    assert_eq!(
        matrix.lines().last(),
        Some("{\"level\":2,\"id\":15,\"label\":0}")
    );

    let clusters: Vec<String> = staged
        .read("out/graph.clusters.jsonl")
        .lines()
        .map(str::to_owned)
        .collect();
    assert_eq!(clusters.len(), 12);
    assert_eq!(clusters[0], "{\"level\":1,\"id\":10,\"label\":1}");
    assert_eq!(clusters[6], "{\"level\":2,\"id\":10,\"label\":2}");
    assert_eq!(clusters[11], "{\"level\":2,\"id\":15,\"label\":3}");

    assert_eq!(
        staged.read("out/graph.deduped.jsonl").lines().collect::<Vec<_>>(),
        vec![
            "{\"id\":10,\"label\":2}",
            "{\"id\":11,\"label\":2}",
            "{\"id\":12,\"label\":2}",
            "{\"id\":13,\"label\":3}",
            "{\"id\":14,\"label\":3}",
            "{\"id\":15,\"label\":3}",
        ]
    );
    assert_eq!(staged.read("out/graph.dsc"), "10\n11\n12\n13\n14\n15\n");
}

#[rstest]
fn known_labels_follow_descriptions(staged: Staged) {
    let labels_path = staged.path("labels.clusters.jsonl");
    fs::write(
        &labels_path,
        "{\"id\": \"n10\", \"label\": 7}\n\n{\"id\": \"n13\", \"label\": \"kinase\"}\n",
    )
    .expect("labels must be written");
    let labels = load_cluster_labels(&labels_path).expect("labels must parse");

    let mapping = staged.path("graph.mapping.tsv");
    let written = run_and_write_labelled(&staged, Some(&mapping), labels);
    assert_eq!(written.len(), 9);
    assert_eq!(
        staged.read("out/graph_cluster_labels.txt"),
        "n10,7\nn11,0\nn12,0\nn13,kinase\nn14,0\nn15,0\n"
    );
}

#[rstest]
fn numeric_label_ids_match_external_ids(staged: Staged) {
    let labels = ClusterLabels::from([("12".to_owned(), "3".to_owned())]);
    run_and_write_labelled(&staged, None, labels);
    assert_eq!(
        staged.read("out/graph_cluster_labels.txt"),
        "10,0\n11,0\n12,3\n13,0\n14,0\n15,0\n"
    );
}

#[rstest]
fn labels_file_is_skipped_without_labels(staged: Staged) {
    let written = run_and_write(&staged, None);
    assert_eq!(written.len(), 8);
    assert!(!staged.path("out/graph_cluster_labels.txt").exists());
}

#[rstest]
fn malformed_label_line_reports_its_number(staged: Staged) {
    let labels_path = staged.path("broken.clusters.jsonl");
    fs::write(&labels_path, "{\"id\": 1, \"label\": 2}\n{\"id\": 1}\n")
        .expect("labels must be written");
    let err = load_cluster_labels(&labels_path).expect_err("missing label must fail");
    assert!(matches!(err, JsonlProviderError::Record { line: 2, .. }));
}

#[rstest]
fn missing_mapping_entry_is_a_core_error(staged: Staged) {
    let partial = staged.path("partial.tsv");
    fs::write(&partial, "10\tn10\t1.0\n").expect("mapping must be written");

    let err = GraphLoader::new("bridged")
        .load_graph(&staged.path("graph.jsonl"), Some(&partial))
        .expect_err("nodes without weights must be rejected");
    let core = err.core_error().expect("failure comes from the core");
    assert_eq!(
        core.graph_code(),
        Some(graphhds_core::GraphErrorCode::MissingNodeWeight)
    );
}

#[rstest]
fn uniform_scale_ignores_mapping_weights(staged: Staged) {
    let mapping = staged.path("skewed.tsv");
    fs::write(&mapping, "10\ta\t5.0\n11\tb\t0.0\n").expect("mapping must be written");

    let graph = GraphLoader::new("bridged")
        .with_weight_scale(WeightScale::Uniform)
        .load_graph(&staged.path("graph.jsonl"), Some(&mapping))
        .expect("uniform weights need no entry per node");
    assert!(graph.weights().iter().all(|&weight| weight == 1.0));
    assert_eq!(graph.description(0).as_deref(), Some("a"));
}

#[rstest]
fn missing_graph_file_names_the_path(staged: Staged) {
    let absent = staged.path("absent.jsonl");
    let err = GraphLoader::new("absent")
        .load_graph(&absent, None)
        .expect_err("missing file must fail");
    assert!(matches!(err, JsonlProviderError::Open { ref path, .. } if path == &absent));
}
