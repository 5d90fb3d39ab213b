//! CLI entry point for the bimgraph ingestion pipeline.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use bimgraph_graph::{GraphClient, GraphConfig};
use bimgraph_ingest::{IngestConfig, IngestError, Ingestor, Record};

#[derive(Parser)]
#[command(name = "bimgraph")]
#[command(about = "Ingest building-model exchange documents into a property graph")]
struct Cli {
    /// Exchange document to ingest (JSON array of records).
    #[arg(short, long)]
    file: PathBuf,

    /// Skip records with unknown kind tags instead of aborting.
    #[arg(long)]
    skip_unknown: bool,

    /// Write the commit plan as JSON to this path.
    #[arg(long)]
    plan_out: Option<PathBuf>,

    /// Apply the commit plan to Neo4j.
    #[arg(long)]
    apply: bool,

    /// Config file prefix (default: bimgraph).
    #[arg(short, long, default_value = "bimgraph")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();

    let mut ingest_config = load_ingest_config(&cli.config)?;
    if cli.skip_unknown {
        ingest_config.skip_unknown_kinds = true;
    }

    let raw = std::fs::read_to_string(&cli.file)?;
    let records: Vec<Record> = serde_json::from_str(&raw)?;
    tracing::info!(file = %cli.file.display(), records = records.len(), "Document loaded");

    let mut ingestor = Ingestor::new(ingest_config);
    let plan = match ingestor.ingest(&records) {
        Ok(plan) => plan,
        Err(IngestError::Validation { violations }) => {
            for v in &violations {
                tracing::error!(violation = %v, "Validation violation");
            }
            anyhow::bail!("Document rejected with {} violation(s)", violations.len());
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(path) = &cli.plan_out {
        std::fs::write(path, serde_json::to_string_pretty(&plan)?)?;
        tracing::info!(path = %path.display(), "Commit plan written");
    }

    if cli.apply {
        let graph_config = load_graph_config(&cli.config);
        let graph = GraphClient::connect(&graph_config).await?;
        graph.apply_plan(&plan).await?;
    }

    Ok(())
}

fn load_ingest_config(file_prefix: &str) -> anyhow::Result<IngestConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("BIMGRAPH_INGEST")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    match cfg.get::<IngestConfig>("ingest") {
        Ok(c) => Ok(c),
        Err(_) => Ok(IngestConfig::default()),
    }
}

fn load_graph_config(file_prefix: &str) -> GraphConfig {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("BIMGRAPH")
                .separator("__")
                .try_parsing(true),
        )
        .build();

    match cfg {
        Ok(c) => GraphConfig {
            uri: c
                .get_string("neo4j.uri")
                .unwrap_or_else(|_| "bolt://localhost:7687".to_string()),
            user: c
                .get_string("neo4j.user")
                .unwrap_or_else(|_| "neo4j".to_string()),
            password: c
                .get_string("neo4j.password")
                .unwrap_or_else(|_| "bimgraph-dev".to_string()),
            ..Default::default()
        },
        Err(_) => GraphConfig::default(),
    }
}
