use lineage_protocol::{LineageEdge, LineageRequest, LineageVertex, Scope, View};
use lineage_query::{
    InMemoryLineageStore, LineageDocument, LineageError, LineageQueryEngine, QueryConfig,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

const TABLE: &str = "table_data_flow";
const COLUMN: &str = "column_data_flow";

fn vertex(id: &str, name: &str) -> LineageVertex {
    LineageVertex {
        id: id.to_string(),
        display_name: name.to_string(),
        type_label: "RelationalTable".to_string(),
        is_process: false,
        properties: Default::default(),
    }
}

fn process(id: &str, name: &str) -> LineageVertex {
    LineageVertex {
        type_label: "Process".to_string(),
        is_process: true,
        ..vertex(id, name)
    }
}

fn edge(source: &str, destination: &str, label: &str) -> LineageEdge {
    LineageEdge {
        id: format!("{source}-{label}-{destination}"),
        source: source.to_string(),
        destination: destination.to_string(),
        label: label.to_string(),
    }
}

fn store(vertices: Vec<LineageVertex>, edges: Vec<LineageEdge>) -> InMemoryLineageStore {
    InMemoryLineageStore::from_document(LineageDocument { vertices, edges })
        .expect("valid lineage document")
}

fn ids<'a>(items: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    items.map(str::to_string).collect()
}

/// a -> x, b -> x, x -> c, plus a far upstream vertex behind `a`
fn fan_in() -> InMemoryLineageStore {
    store(
        vec![
            vertex("far", "far"),
            vertex("a", "a"),
            vertex("b", "b"),
            vertex("x", "x"),
            vertex("c", "c"),
        ],
        vec![
            edge("far", "a", TABLE),
            edge("a", "x", TABLE),
            edge("b", "x", TABLE),
            edge("x", "c", TABLE),
        ],
    )
}

#[test]
fn source_and_destination_returns_direct_neighbours() {
    let store = fan_in();
    let result = LineageQueryEngine::new(&store)
        .lineage(Scope::SourceAndDestination, View::TableLevel, "x", "", true)
        .unwrap();

    assert_eq!(result.edge_count(), 3);
    assert_eq!(result.vertex_count(), 4);
    assert_eq!(
        ids(result.vertices().map(|v| v.id.as_str())),
        ids(["a", "b", "c", "x"].into_iter())
    );
}

#[test]
fn end_to_end_reaches_everything_connected() {
    let store = fan_in();
    let result = LineageQueryEngine::new(&store)
        .lineage(Scope::EndToEnd, View::TableLevel, "x", "", true)
        .unwrap();

    assert_eq!(result.vertex_count(), 5);
    assert_eq!(result.edge_count(), 4);
    assert!(result.terminals().is_empty());
}

#[test]
fn ultimate_source_reports_chain_start() {
    let store = store(
        vec![vertex("a", "a"), vertex("b", "b"), vertex("c", "c"), vertex("d", "d")],
        vec![edge("a", "b", TABLE), edge("b", "c", TABLE), edge("c", "d", TABLE)],
    );
    let result = LineageQueryEngine::new(&store)
        .lineage(Scope::UltimateSource, View::TableLevel, "d", "", true)
        .unwrap();

    assert_eq!(
        result.terminals().iter().cloned().collect::<Vec<_>>(),
        vec!["a".to_string()]
    );
    assert_eq!(result.vertex_count(), 4);
    assert_eq!(result.edge_count(), 3);
}

#[test]
fn ultimate_destination_reports_every_sink() {
    // far -> a -> x -> c, x -> y -> d, b -> x
    let store = store(
        vec![
            vertex("far", "far"),
            vertex("a", "a"),
            vertex("b", "b"),
            vertex("x", "x"),
            vertex("y", "y"),
            vertex("c", "c"),
            vertex("d", "d"),
        ],
        vec![
            edge("far", "a", TABLE),
            edge("a", "x", TABLE),
            edge("b", "x", TABLE),
            edge("x", "c", TABLE),
            edge("x", "y", TABLE),
            edge("y", "d", TABLE),
        ],
    );
    let result = LineageQueryEngine::new(&store)
        .lineage(Scope::UltimateDestination, View::TableLevel, "far", "", true)
        .unwrap();

    assert_eq!(
        result.terminals().iter().cloned().collect::<Vec<_>>(),
        vec!["c".to_string(), "d".to_string()]
    );
    assert!(result.contains_vertex("y"));
    assert!(!result.contains_vertex("b"));
}

#[test]
fn view_selects_column_edges() {
    let store = store(
        vec![vertex("t1", "t1"), vertex("t2", "t2"), vertex("c1", "c1"), vertex("c2", "c2")],
        vec![edge("t1", "t2", TABLE), edge("c1", "c2", COLUMN), edge("t1", "c1", COLUMN)],
    );
    let engine = LineageQueryEngine::new(&store);

    let columns = engine
        .lineage(Scope::EndToEnd, View::ColumnLevel, "t1", "", true)
        .unwrap();
    assert_eq!(
        ids(columns.vertices().map(|v| v.id.as_str())),
        ids(["c1", "c2", "t1"].into_iter())
    );

    let tables = engine
        .lineage(Scope::EndToEnd, View::TableLevel, "t1", "", true)
        .unwrap();
    assert_eq!(
        ids(tables.vertices().map(|v| v.id.as_str())),
        ids(["t1", "t2"].into_iter())
    );
}

#[test]
fn excluding_processes_drops_their_edges() {
    let store = store(
        vec![vertex("src", "src"), process("job", "nightly job"), vertex("dst", "dst")],
        vec![edge("src", "job", TABLE), edge("job", "dst", TABLE)],
    );
    let result = LineageQueryEngine::new(&store)
        .lineage(Scope::EndToEnd, View::TableLevel, "src", "", false)
        .unwrap();

    assert!(result.vertices().all(|v| !v.is_process));
    assert_eq!(result.edge_count(), 0);
    for e in result.edges() {
        assert!(result.contains_vertex(&e.source));
        assert!(result.contains_vertex(&e.destination));
    }
}

#[test]
fn display_name_filter_keeps_matching_vertices() {
    let store = store(
        vec![
            vertex("o", "Orders_2024"),
            vertex("c", "Customers"),
            vertex("r", "orders_report"),
        ],
        vec![edge("o", "c", TABLE), edge("o", "r", TABLE)],
    );
    let result = LineageQueryEngine::new(&store)
        .lineage(Scope::EndToEnd, View::TableLevel, "o", "orders", true)
        .unwrap();

    assert!(result.contains_vertex("o"));
    assert!(result.contains_vertex("r"));
    assert!(!result.contains_vertex("c"));
    assert_eq!(result.edge_count(), 1);
}

#[test]
fn case_sensitive_display_name_filter_is_configurable() {
    let store = store(
        vec![vertex("o", "Orders_2024"), vertex("r", "orders_report")],
        vec![edge("o", "r", TABLE)],
    );
    let config = QueryConfig {
        display_name_case_sensitive: true,
        ..QueryConfig::default()
    };
    let result = LineageQueryEngine::new(&store)
        .with_config(config)
        .lineage(Scope::EndToEnd, View::TableLevel, "o", "orders", true)
        .unwrap();

    assert!(!result.contains_vertex("o"));
    assert!(result.contains_vertex("r"));
}

#[test]
fn glossary_follows_semantic_links_only() {
    let store = store(
        vec![
            vertex("col", "customer_id"),
            vertex("term", "Customer Identifier"),
            vertex("related", "Customer"),
            vertex("down", "downstream"),
        ],
        vec![
            edge("col", "term", "semantic_assignment"),
            edge("term", "related", "related_term"),
            edge("col", "down", COLUMN),
        ],
    );
    let result = LineageQueryEngine::new(&store)
        .lineage(Scope::Glossary, View::ColumnLevel, "col", "", true)
        .unwrap();

    assert_eq!(
        ids(result.vertices().map(|v| v.id.as_str())),
        ids(["col", "related", "term"].into_iter())
    );
}

#[test]
fn unknown_node_is_not_found() {
    let store = fan_in();
    let err = LineageQueryEngine::new(&store)
        .lineage(Scope::EndToEnd, View::TableLevel, "nope", "", true)
        .unwrap_err();
    assert!(matches!(err, LineageError::NodeNotFound(_)));
    assert_eq!(err.code(), "node_not_found");
}

#[test]
fn blank_guid_is_invalid() {
    let store = fan_in();
    let err = LineageQueryEngine::new(&store)
        .lineage(Scope::EndToEnd, View::TableLevel, "  ", "", true)
        .unwrap_err();
    assert!(matches!(err, LineageError::InvalidParameter(_)));
}

#[test]
fn node_without_lineage_is_empty() {
    let store = store(vec![vertex("solo", "solo")], vec![]);
    for scope in Scope::ALL {
        let result = LineageQueryEngine::new(&store)
            .lineage(scope, View::TableLevel, "solo", "", true)
            .unwrap();
        assert!(result.is_empty(), "{} should be empty", scope.as_str());
    }
}

#[test]
fn request_round_trip_through_execute() {
    let store = fan_in();
    let request: LineageRequest = serde_json::from_str(
        r#"{"scope":"source_and_destination","guid":"x","include_processes":true}"#,
    )
    .unwrap();
    let response = LineageQueryEngine::new(&store)
        .execute(&request)
        .unwrap()
        .into_sorted_response();

    let edge_ids: Vec<_> = response.edges.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        edge_ids,
        vec![
            "a-table_data_flow-x",
            "b-table_data_flow-x",
            "x-table_data_flow-c"
        ]
    );
}
