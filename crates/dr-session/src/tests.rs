//! Unit tests for dr-session.

#[cfg(test)]
mod helpers {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use dr_source::{Fetcher, SourceConfig, SourceError, SourceKind, SourceResult};

    use crate::{Session, SessionBuilder};

    /// Nodes 1:(0,0) 2:(0,1) 3:(1,1) and 4 without coordinates, as (x, y).
    pub const NODES: &str = r#"[
        {"id":1,"x":0.0,"y":0.0},
        {"id":2,"x":0.0,"y":1.0},
        {"id":3,"x":1.0,"y":1.0},
        {"id":4}
    ]"#;

    /// 1→2→3 at cost 1 each, plus 1→4.  No 1→3 shortcut, no reverse arcs.
    pub const EDGES: &str = r#"[
        {"origen":1,"destino":2,"costo_total":1,"tiempo":4,"distancia":110},
        {"origen":2,"destino":3,"costo_total":1,"tiempo":4,"distancia":110},
        {"origen":1,"destino":4,"costo_total":9,"tiempo":1,"distancia":10}
    ]"#;

    pub struct MemoryFetcher {
        files: HashMap<String, String>,
        pub fetches: AtomicUsize,
    }

    impl MemoryFetcher {
        pub fn new(nodes: &str, edges: &str) -> Self {
            let files = HashMap::from([
                ("mem/nodos_1.json".to_owned(), nodes.to_owned()),
                ("mem/aristas_1.json".to_owned(), edges.to_owned()),
            ]);
            Self { files, fetches: AtomicUsize::new(0) }
        }

        pub fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl Fetcher for MemoryFetcher {
        fn fetch(&self, location: &str) -> SourceResult<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.files
                .get(location)
                .map(|s| s.as_bytes().to_vec())
                .ok_or_else(|| SourceError::Fetch { location: location.to_owned(), reason: "absent".into() })
        }
    }

    pub fn config() -> SourceConfig {
        SourceConfig::with_source(SourceKind::Sharded { base: "mem/".into(), node_count: 1, edge_count: 1 })
    }

    pub fn session_with(nodes: &str, edges: &str) -> Session<MemoryFetcher> {
        SessionBuilder::new(config())
            .fetcher(MemoryFetcher::new(nodes, edges))
            .build()
            .unwrap()
    }

    pub fn session() -> Session<MemoryFetcher> {
        session_with(NODES, EDGES)
    }
}

// ── Routing scenarios ─────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use dr_core::{Criterion, NodeKey};
    use dr_graph::GraphError;

    use super::helpers::session;
    use crate::{SessionError, compute_route};

    #[test]
    fn chain_route_by_cost() {
        let mut session = session();
        let graph = session.load_graph().unwrap();

        let path = compute_route(&graph, &NodeKey::Int(1), &NodeKey::Int(3), Criterion::Cost).unwrap();
        let keys: Vec<_> = path.keys(&graph).into_iter().cloned().collect();
        assert_eq!(keys, [NodeKey::Int(1), NodeKey::Int(2), NodeKey::Int(3)]);
        assert_eq!(path.total_weight, 2.0);
    }

    #[test]
    fn reverse_direction_has_no_path() {
        let mut session = session();
        let err = session.route(&NodeKey::Int(3), &NodeKey::Int(1), Criterion::Cost).unwrap_err();

        assert!(matches!(err, SessionError::Graph(GraphError::NoPathExists { .. })));
        assert!(err.is_recoverable());
        assert!(err.user_message().contains("no path from 3 to 1"));
    }

    #[test]
    fn unknown_node_is_recoverable() {
        let mut session = session();
        let err = session.route(&NodeKey::Int(1), &NodeKey::Int(42), Criterion::Time).unwrap_err();

        assert!(matches!(err, SessionError::Graph(GraphError::NodeNotFound(NodeKey::Int(42)))));
        assert!(err.is_recoverable());
    }

    #[test]
    fn self_route_is_trivial() {
        let mut session = session();
        let (_, path) = session.route(&NodeKey::Int(2), &NodeKey::Int(2), Criterion::Distance).unwrap();
        assert!(path.is_trivial());
        assert_eq!(path.total_weight, 0.0);
    }

    #[test]
    fn summary_scores_every_criterion() {
        let mut session = session();
        let summary = session.route_summary(&NodeKey::Int(1), &NodeKey::Int(3), Criterion::Time).unwrap();

        assert_eq!(summary.hops(), 2);
        assert_eq!(summary.origin, NodeKey::Int(1));
        assert_eq!(summary.destination, NodeKey::Int(3));
        assert_eq!((summary.cost, summary.time, summary.distance), (2.0, 8.0, 220.0));
        assert_eq!(summary.total(), 8.0);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["criterion"], "time");
        assert_eq!(json["nodes"], serde_json::json!([1, 2, 3]));
    }
}

// ── Map projection ────────────────────────────────────────────────────────────

#[cfg(test)]
mod projection {
    use dr_core::{Criterion, GeoPoint, NodeKey};
    use dr_graph::GeometryError;

    use super::helpers::session;
    use crate::{SessionError, compute_route, project_to_map_points};

    #[test]
    fn located_route_projects_as_lat_lon() {
        let mut session = session();
        let graph = session.load_graph().unwrap();
        let path = compute_route(&graph, &NodeKey::Int(1), &NodeKey::Int(3), Criterion::Cost).unwrap();

        let projection = project_to_map_points(&graph, &path).unwrap();
        assert_eq!(projection.lat_lon(), [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        assert_eq!(projection.start(), GeoPoint::new(0.0, 0.0));
        assert_eq!(projection.end(), GeoPoint::new(1.0, 1.0));
        assert!(projection.skipped.is_empty());
    }

    #[test]
    fn node_without_coordinates_leaves_single_point() {
        let mut session = session();
        let graph = session.load_graph().unwrap();
        let path = compute_route(&graph, &NodeKey::Int(1), &NodeKey::Int(4), Criterion::Cost).unwrap();

        let err = project_to_map_points(&graph, &path).unwrap_err();
        match &err {
            SessionError::Geometry(GeometryError::SingleNodeGeometry { point, skipped }) => {
                assert_eq!(*point, GeoPoint::new(0.0, 0.0));
                assert_eq!(skipped, &[NodeKey::Int(4)]);
            }
            other => panic!("expected single-node geometry, got {other:?}"),
        }
        assert!(err.is_recoverable());
        assert!(err.user_message().contains("only one"));
    }

    #[test]
    fn geometry_messages_differ() {
        let single = SessionError::from(GeometryError::SingleNodeGeometry {
            point:   GeoPoint::new(0.0, 0.0),
            skipped: vec![],
        });
        let none = SessionError::from(GeometryError::InsufficientGeometry { skipped: vec![NodeKey::Int(4)] });
        assert_ne!(single.user_message(), none.user_message());
    }
}

// ── Session lifecycle ─────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use std::sync::Arc;

    use dr_core::NodeKey;
    use dr_source::{SourceConfig, SourceError};

    use super::helpers::{EDGES, MemoryFetcher, NODES, config, session, session_with};
    use crate::{SessionBuilder, SessionError, connectivity_report, nearest_node};

    #[test]
    fn graph_loaded_once_and_shared() {
        let mut session = session();
        assert!(!session.is_loaded());

        let a = session.load_graph().unwrap();
        let b = session.load_graph().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(session.is_loaded());
        assert_eq!(session.fetcher.fetches(), 2);
    }

    #[test]
    fn reload_fetches_again() {
        let mut session = session();
        let a = session.load_graph().unwrap();
        let b = session.reload().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(session.fetcher.fetches(), 4);
        assert_eq!(a.node_count(), b.node_count());
    }

    #[test]
    fn invalid_config_rejected_at_build() {
        let config = SourceConfig { edge_prefix: "nodos_".into(), ..config() };
        let result = SessionBuilder::new(config).fetcher(MemoryFetcher::new(NODES, EDGES)).build();
        assert!(matches!(result, Err(SessionError::Source(SourceError::Config(_)))));
    }

    #[test]
    fn fetch_failure_is_not_recoverable() {
        let mut session = SessionBuilder::new(SourceConfig {
            source: dr_source::SourceKind::Sharded { base: "elsewhere/".into(), node_count: 1, edge_count: 1 },
            ..config()
        })
        .fetcher(MemoryFetcher::new(NODES, EDGES))
        .build()
        .unwrap();

        let err = session.load_graph().unwrap_err();
        assert!(!err.is_recoverable());
        assert!(err.user_message().starts_with("The road data could not be downloaded"));
        assert!(!session.is_loaded());
    }

    #[test]
    fn bad_data_is_not_recoverable() {
        let mut session = session_with(NODES, r#"[{"origen":1,"destino":77}]"#);
        let err = session.load_graph().unwrap_err();
        assert!(!err.is_recoverable());
        assert!(err.user_message().starts_with("The road data could not be loaded"));
    }

    #[test]
    fn connectivity_of_loaded_graph() {
        let mut session = session();
        let report = session.connectivity().unwrap();
        assert!(report.weakly_connected);
        assert_eq!(report.component_count, 1);
        assert_eq!(report.largest_components, [4]);

        let split = session_with(NODES, r#"[{"origen":1,"destino":2}]"#)
            .load_graph()
            .map(|g| connectivity_report(&g))
            .unwrap();
        assert!(!split.weakly_connected);
        assert_eq!(split.component_count, 3);
        assert_eq!(split.largest_components, [2, 1, 1]);
    }

    #[test]
    fn nearest_node_snaps_to_located_nodes() {
        let mut session = session();
        let graph = session.load_graph().unwrap();
        assert_eq!(nearest_node(&graph, 0.9, 1.1), Some(&NodeKey::Int(3)));
        assert_eq!(nearest_node(&graph, -0.1, 0.0), Some(&NodeKey::Int(1)));
    }
}
