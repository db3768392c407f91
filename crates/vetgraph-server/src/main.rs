//! VetGraph: veterinary drug knowledge graph server and CLI.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vetgraph_core::VetGraphConfig;
use vetgraph_ingest::{load_records, GraphIngestor};
use vetgraph_server::{build_router, report, AppState};
use vetgraph_store::SqliteStore;

fn resolve_data_dir() -> PathBuf {
    std::env::var("VETGRAPH_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn print_help() {
    println!("VetGraph - veterinary drug knowledge graph");
    println!();
    println!("Usage: vetgraph [command]");
    println!();
    println!("Commands:");
    println!("  (none)              Start the HTTP server");
    println!("  import [file]       Rebuild the graph from drug records, then detect communities");
    println!("  ingest [file]       Upsert drug records into the existing graph");
    println!("  communities         Run community detection");
    println!("  report [path]       Write graph statistics as JSON");
    println!("  ask <question>      Answer one question");
    println!("  help                Show this help message");
}

fn input_path(args: &[String], config: &VetGraphConfig) -> PathBuf {
    args.get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_paths.drug_data.clone())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str);

    if matches!(command, Some("--help" | "-h" | "help")) {
        print_help();
        return Ok(());
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());
    let config = VetGraphConfig::from_env(&data_dir)?;

    let store = SqliteStore::open(&config.data_paths.graph_db)
        .map_err(|e| anyhow::anyhow!("Failed to open graph store: {}", e))?;

    match command {
        None => {}
        Some("import") => {
            let path = input_path(&args, &config);
            let records = load_records(&path)?;
            let batch = GraphIngestor::new(&store).reimport(&records)?;
            let state = AppState::new(config, store)?;
            let communities = state.detect_communities()?;
            println!(
                "Imported {} drugs ({} failed), {} nodes in communities",
                batch.succeeded(),
                batch.failed(),
                communities.len()
            );
            return Ok(());
        }
        Some("ingest") => {
            let path = input_path(&args, &config);
            let records = load_records(&path)?;
            let batch = GraphIngestor::new(&store).ingest_batch(&records);
            for outcome in &batch.outcomes {
                println!("{}", serde_json::to_string(outcome)?);
            }
            if batch.failed() > 0 {
                warn!("{} of {} records failed", batch.failed(), batch.outcomes.len());
            }
            return Ok(());
        }
        Some("communities") => {
            let state = AppState::new(config, store)?;
            let communities = state.detect_communities()?;
            let count = communities.values().max().map_or(0, |&c| c + 1);
            println!("{} communities over {} nodes", count, communities.len());
            return Ok(());
        }
        Some("report") => {
            let path = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| config.data_paths.default_report());
            let snapshot = report::write_report(&store, &path)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            return Ok(());
        }
        Some("ask") => {
            if args.len() < 3 {
                eprintln!("Usage: vetgraph ask <question>");
                std::process::exit(1);
            }
            let question = args[2..].join(" ");
            let state = AppState::new(config, store)?;
            let answer = match state.answer(&question) {
                Ok(answer) => answer.response,
                Err(e) => {
                    warn!("Error processing query: {}", e);
                    vetgraph_query::APOLOGY.to_string()
                }
            };
            println!("{}", answer);
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'vetgraph help' for usage.", other);
            std::process::exit(1);
        }
    }

    let port = config.port;
    let state = Arc::new(AppState::new(config, store)?);
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("VetGraph server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
