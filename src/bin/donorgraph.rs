//! Donorgraph CLI: merge campaign-finance sources into a graph snapshot.
//!
//! Usage:
//!   donorgraph fec [--api-key K] [--state CO] [--cycle 2024] [--graph path]
//!   donorgraph tracer [--contributions file.csv] [--graph path]
//!   donorgraph import <records.jsonl> [--graph path]
//!   donorgraph stats [--graph path]

use clap::{Parser, Subcommand};
use donorgraph::config::{
    current_cycle, FEC_API_BASE, FEC_DEMO_KEY, FEC_MAX_PER_PAGE, TRACER_DOWNLOAD_URL,
};
use donorgraph::{
    EdgeType, FecConfig, FecSource, IngestPipeline, JsonLinesSource, JsonSnapshotStore,
    MergeEngine, NodeType, OpenStore, RecordSource, SnapshotStore, TracerConfig, TracerSource,
};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "donorgraph",
    version,
    about = "Merge FEC and TRACER campaign-finance data into a deduplicated graph"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the graph snapshot (JSON)
    #[arg(long, global = true, env = "DONORGRAPH_GRAPH", default_value = "graph.json")]
    graph: PathBuf,

    /// Keep edges whose endpoint is not yet known and store them once it appears
    #[arg(long, global = true)]
    defer_edges: bool,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch candidates, committees and receipts from the FEC API
    Fec {
        /// FEC API key (falls back to DEMO_KEY)
        #[arg(long, env = "FEC_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Two-letter state filter
        #[arg(long, env = "DONORGRAPH_STATE", default_value = "CO")]
        state: String,
        /// Two-year election cycle (defaults to the current one)
        #[arg(long)]
        cycle: Option<i32>,
        /// Results per page (max 100)
        #[arg(long, default_value_t = FEC_MAX_PER_PAGE)]
        per_page: u32,
        /// Stop each phase after this many pages
        #[arg(long)]
        max_pages: Option<u32>,
        #[arg(long)]
        skip_candidates: bool,
        #[arg(long)]
        skip_committees: bool,
        /// API base URL
        #[arg(long, default_value = FEC_API_BASE)]
        base_url: String,
    },
    /// Read TRACER bulk exports, downloading any not given as files
    Tracer {
        #[arg(long)]
        candidates: Option<PathBuf>,
        #[arg(long)]
        committees: Option<PathBuf>,
        #[arg(long)]
        contributions: Option<PathBuf>,
        /// Where downloaded exports are cached
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Download endpoint
        #[arg(long, default_value = TRACER_DOWNLOAD_URL)]
        base_url: String,
    },
    /// Merge raw records from a JSON-lines file
    Import {
        /// One {"kind", "source", "fields"} object per line
        file: PathBuf,
    },
    /// Print node and edge counts of the snapshot
    Stats,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

/// Load the snapshot, run one source over it, and save only if the source succeeded.
fn cmd_ingest(graph: PathBuf, defer_edges: bool, source: &mut dyn RecordSource) -> i32 {
    let store = match JsonSnapshotStore::open(&graph) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: cannot open '{}': {}", graph.display(), e);
            return 1;
        }
    };
    let engine = if defer_edges {
        MergeEngine::new().with_deferred_edges()
    } else {
        MergeEngine::new()
    };

    let mut pipeline = IngestPipeline::open(store, engine);
    if let Err(e) = pipeline.run(source) {
        eprintln!("Error: {}", e);
        return 1;
    }
    let stats = *pipeline.stats();
    match pipeline.commit() {
        Ok(saved) => {
            println!(
                "{}: {} records, {} nodes added, {} edges added, {} skipped, {} edges dropped",
                source.id(),
                stats.records,
                stats.nodes_added,
                stats.edges_added,
                stats.skipped,
                stats.edges_dropped
            );
            println!(
                "Saved {} nodes and {} edges to {}",
                saved.nodes.len(),
                saved.edges.len(),
                graph.display()
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_stats(graph: PathBuf) -> i32 {
    let store = match JsonSnapshotStore::open(&graph) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: cannot open '{}': {}", graph.display(), e);
            return 1;
        }
    };
    let snapshot = match store.read() {
        Ok(Some(g)) => g,
        Ok(None) => {
            println!("No snapshot at {}", graph.display());
            return 0;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let individuals = snapshot
        .nodes
        .iter()
        .filter(|n| n.node_type == NodeType::Individual)
        .count();
    let contributions = snapshot
        .edges
        .iter()
        .filter(|e| e.edge_type == EdgeType::Contribution)
        .count();

    println!("{:<14}  {:>9}", "KIND", "COUNT");
    println!("{}", "-".repeat(25));
    println!("{:<14}  {:>9}", "Individual", individuals);
    println!("{:<14}  {:>9}", "Campaign", snapshot.nodes.len() - individuals);
    println!("{:<14}  {:>9}", "Contribution", contributions);
    println!("{:<14}  {:>9}", "Support", snapshot.edges.len() - contributions);
    0
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Commands::Fec {
            api_key,
            state,
            cycle,
            per_page,
            max_pages,
            skip_candidates,
            skip_committees,
            base_url,
        } => {
            let api_key = api_key.unwrap_or_else(|| {
                warn!("FEC_API_KEY not set, using {} (heavily rate limited)", FEC_DEMO_KEY);
                FEC_DEMO_KEY.to_string()
            });
            let state = state.trim().to_uppercase();
            let config = FecConfig {
                state: (!state.is_empty()).then_some(state),
                cycle: cycle.unwrap_or_else(current_cycle),
                per_page,
                max_pages,
                include_candidates: !skip_candidates,
                include_committees: !skip_committees,
                ..FecConfig::default()
            }
            .with_api_key(api_key)
            .with_base_url(base_url);

            match FecSource::new(config) {
                Ok(mut source) => cmd_ingest(cli.graph, cli.defer_edges, &mut source),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    1
                }
            }
        }
        Commands::Tracer {
            candidates,
            committees,
            contributions,
            data_dir,
            base_url,
        } => {
            let defaults = TracerConfig::default();
            let mut source = TracerSource::new(TracerConfig {
                base_url,
                data_dir: data_dir.unwrap_or(defaults.data_dir),
                candidates,
                committees,
                contributions,
            });
            cmd_ingest(cli.graph, cli.defer_edges, &mut source)
        }
        Commands::Import { file } => {
            let mut source = JsonLinesSource::new(&file);
            cmd_ingest(cli.graph, cli.defer_edges, &mut source)
        }
        Commands::Stats => cmd_stats(cli.graph),
    };
    std::process::exit(code);
}
