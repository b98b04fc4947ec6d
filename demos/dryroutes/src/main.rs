//! dryroutes — flood-aware routing from the command line.
//!
//! ```text
//! dryroutes summary
//! dryroutes route --from 1 --to 3 --criterion time
//! dryroutes route --from-coord 39.47,-0.37 --to-coord 39.48,-0.39 --json
//! dryroutes --archive graph.zip nearest --lat 39.47 --lon -0.37
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dr_core::{Criterion, GeoPoint, NodeKey};
use dr_graph::RiskGraph;
use dr_session::{
    RouteSummary, Session, SessionBuilder, SessionError, connectivity_report, project_to_map_points,
};
use dr_source::{SourceConfig, SourceKind};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "dryroutes", version, about = "Safe routes under flood risk")]
struct Cli {
    /// TOML file describing the data source.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Load sharded fragments from this base URL or directory prefix.
    #[arg(long, global = true, conflicts_with_all = ["archive", "dir"])]
    base_url: Option<String>,

    /// Load every fragment from one zip archive (URL or path).
    #[arg(long, global = true, conflicts_with = "dir")]
    archive: Option<String>,

    /// Scan a local directory for fragment files.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the graph and report its size and connectivity.
    Summary,

    /// Compute the safest route between two nodes.
    Route {
        /// Origin node key.
        #[arg(long, required_unless_present = "from_coord", conflicts_with = "from_coord")]
        from: Option<String>,

        /// Destination node key.
        #[arg(long, required_unless_present = "to_coord", conflicts_with = "to_coord")]
        to: Option<String>,

        /// Snap the origin to the node nearest "lat,lon".
        #[arg(long, value_parser = parse_coord)]
        from_coord: Option<GeoPoint>,

        /// Snap the destination to the node nearest "lat,lon".
        #[arg(long, value_parser = parse_coord)]
        to_coord: Option<GeoPoint>,

        /// What to minimise: cost, time, or distance.
        #[arg(long, default_value = "cost")]
        criterion: Criterion,

        /// Print the route and its map points as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Find the nodes closest to a coordinate.
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// How many nodes to list.
        #[arg(long, default_value = "1")]
        count: usize,
    },
}

fn parse_coord(text: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = text
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got {text:?}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude {lat:?}: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("longitude {lon:?}: {e}"))?;
    Ok(GeoPoint::new(lat, lon))
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    match run(cli, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            match err.downcast_ref::<SessionError>() {
                Some(session_err) => eprintln!("{}", session_err.user_message()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

/// Execute one command.  Results go to `out`; progress and diagnostics go
/// to the log (stderr), so `route --json` output is JSON and nothing else.
fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = source_config(&cli)?;
    let mut session = SessionBuilder::new(config).build()?;

    match cli.command {
        Commands::Summary => summary(&mut session, out),
        Commands::Route { from, to, from_coord, to_coord, criterion, json } => {
            let graph = load(&mut session)?;
            let origin      = endpoint(&graph, from.as_deref(), from_coord)?;
            let destination = endpoint(&graph, to.as_deref(), to_coord)?;
            route(&mut session, &origin, &destination, criterion, json, out)
        }
        Commands::Nearest { lat, lon, count } => {
            nearest(&mut session, GeoPoint::new(lat, lon), count, out)
        }
    }
}

/// `--config` file (or defaults) with any source flag applied on top.
fn source_config(cli: &Cli) -> Result<SourceConfig> {
    let mut config = match &cli.config {
        Some(path) => SourceConfig::from_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => SourceConfig::default(),
    };

    if let Some(base) = &cli.base_url {
        let (node_count, edge_count) = match &config.source {
            SourceKind::Sharded { node_count, edge_count, .. } => (*node_count, *edge_count),
            _ => (dr_source::config::DEFAULT_NODE_SHARDS, dr_source::config::DEFAULT_EDGE_SHARDS),
        };
        config.source = SourceKind::Sharded { base: base.clone(), node_count, edge_count };
    } else if let Some(location) = &cli.archive {
        config.source = SourceKind::Archive { location: location.clone() };
    } else if let Some(path) = &cli.dir {
        config.source = SourceKind::Directory { path: path.clone() };
    }
    Ok(config)
}

fn load(session: &mut Session) -> Result<Arc<RiskGraph>> {
    let t0 = Instant::now();
    let graph = session.load_graph()?;
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        elapsed = ?t0.elapsed(),
        "graph ready"
    );
    Ok(graph)
}

/// A node key given as text, or the node nearest a coordinate.
fn endpoint(graph: &RiskGraph, key: Option<&str>, coord: Option<GeoPoint>) -> Result<NodeKey> {
    if let Some(text) = key {
        let node = graph.resolve_str(text).map_err(SessionError::from)?;
        return Ok(graph.node_key(node).clone());
    }
    let point = coord.context("an endpoint needs a node key or a coordinate")?;
    let node = graph
        .snap_to_node(point)
        .with_context(|| format!("no node with coordinates to snap {point} to"))?;
    let key = graph.node_key(node).clone();
    tracing::info!(%point, node = %key, "snapped coordinate to nearest node");
    Ok(key)
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn summary(session: &mut Session, out: &mut impl Write) -> Result<()> {
    let graph  = load(session)?;
    let report = connectivity_report(&graph);
    let located = graph.node_pos.iter().filter(|p| p.is_some()).count();

    writeln!(out, "Graph with {} nodes and {} edges", graph.node_count(), graph.edge_count())?;
    writeln!(out, "  nodes with coordinates: {located} / {}", graph.node_count())?;
    if report.weakly_connected {
        writeln!(out, "  the graph is weakly connected")?;
    } else {
        writeln!(
            out,
            "  the graph is NOT weakly connected: {} components, largest {:?}",
            report.component_count, report.largest_components
        )?;
    }
    Ok(())
}

fn route(
    session:     &mut Session,
    origin:      &NodeKey,
    destination: &NodeKey,
    criterion:   Criterion,
    json:        bool,
    out:         &mut impl Write,
) -> Result<()> {
    let (graph, path) = session.route(origin, destination, criterion)?;
    let summary = RouteSummary::new(&graph, &path);

    // A route that cannot be drawn is still a route.
    let projection = match project_to_map_points(&graph, &path) {
        Ok(p) => Some(p),
        Err(e) => {
            tracing::warn!("{}", e.user_message());
            None
        }
    };

    if json {
        let doc = serde_json::json!({
            "route":   summary,
            "points":  projection.as_ref().map(|p| p.lat_lon()),
            "skipped": projection.as_ref().map(|p| &p.skipped),
        });
        serde_json::to_writer_pretty(&mut *out, &doc)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Route found: {} → {} minimising {criterion}", summary.origin, summary.destination)?;
    writeln!(out, "  hops     : {}", summary.hops())?;
    writeln!(out, "  cost     : {:.3}", summary.cost)?;
    writeln!(out, "  time     : {:.3}", summary.time)?;
    writeln!(out, "  distance : {:.3}", summary.distance)?;
    let keys: Vec<String> = summary.nodes.iter().map(ToString::to_string).collect();
    writeln!(out, "  path     : {}", keys.join(" → "))?;

    if let Some(projection) = projection {
        writeln!(out, "  start    : {}", projection.start())?;
        writeln!(out, "  end      : {}", projection.end())?;
        if !projection.skipped.is_empty() {
            writeln!(out, "  {} node(s) without coordinates left off the map", projection.skipped.len())?;
        }
    }
    Ok(())
}

fn nearest(session: &mut Session, point: GeoPoint, count: usize, out: &mut impl Write) -> Result<()> {
    let graph = load(session)?;
    let nodes = graph.k_nearest_nodes(point, count.max(1));
    if nodes.is_empty() {
        anyhow::bail!("no node in the graph has coordinates");
    }
    for node in nodes {
        // Every node returned by the spatial index has a position.
        let Some(pos) = graph.node_pos(node) else { continue };
        writeln!(
            out,
            "  {:<12} {pos}  {:>8.1} m",
            graph.node_key(node).to_string(),
            point.distance_m(pos)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, run};

    /// Fragment directory with nodes 1:(0,0), 2:(0,1), 3 (no coordinates)
    /// and edges 1→2, 2→3.
    fn data_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("nodos_1.json"),
            r#"[{"id":1,"x":0.0,"y":0.0},{"id":2,"x":0.0,"y":1.0},{"id":3}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("aristas_1.json"),
            r#"[{"origen":1,"destino":2,"costo_total":1,"tiempo":2,"distancia":3},
                {"origen":2,"destino":3,"costo_total":1,"tiempo":2,"distancia":3}]"#,
        )
        .unwrap();
        dir
    }

    fn run_args(args: &[&str]) -> anyhow::Result<String> {
        let cli = Cli::try_parse_from(args.iter().copied())?;
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn route_json_output_is_a_single_json_document() {
        let dir = data_dir();
        let dir = dir.path().to_str().unwrap();
        let out = run_args(&["dryroutes", "--dir", dir, "route", "--from", "1", "--to", "2", "--json"]).unwrap();

        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["route"]["nodes"], serde_json::json!([1, 2]));
        assert_eq!(doc["route"]["criterion"], "cost");
        assert_eq!(doc["points"], serde_json::json!([[0.0, 0.0], [1.0, 0.0]]));
    }

    #[test]
    fn route_json_without_geometry_still_parses() {
        let dir = data_dir();
        let dir = dir.path().to_str().unwrap();
        let out = run_args(&["dryroutes", "--dir", dir, "route", "--from", "2", "--to", "3", "--json"]).unwrap();

        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["route"]["nodes"], serde_json::json!([2, 3]));
        assert!(doc["points"].is_null());
    }

    #[test]
    fn route_snaps_coordinates() {
        let dir = data_dir();
        let dir = dir.path().to_str().unwrap();
        let out = run_args(&[
            "dryroutes", "--dir", dir, "route", "--from-coord", "0.1,0.0", "--to-coord", "0.9,0.1", "--json",
        ])
        .unwrap();

        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["route"]["origin"], 1);
        assert_eq!(doc["route"]["destination"], 2);
    }

    #[test]
    fn summary_reports_size() {
        let dir = data_dir();
        let dir = dir.path().to_str().unwrap();
        let out = run_args(&["dryroutes", "--dir", dir, "summary"]).unwrap();
        assert!(out.starts_with("Graph with 3 nodes and 2 edges"));
        assert!(out.contains("weakly connected"));
    }
}
