//! Command-line front end for building learning graphs from record files.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trailmap::config::TrailmapConfig;
use trailmap::core::category_stats;
use trailmap::gemini::{GeminiClassifier, GeminiClient, GeminiEmbedder};
use trailmap::protocol::ConfirmedRecord;
use trailmap::{EmbeddingCache, GraphPipeline, LayoutMode};

/// Command-line options.
#[derive(Parser)]
#[command(name = "trailmap", version, about = "Build learning graphs from confirmed records")]
struct Cli {
    /// Optional path to a trailmap.json5 config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Ontology JSON5 file replacing the built-in vocabulary
    #[arg(long, global = true)]
    ontology: Option<PathBuf>,
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build nodes and edges with positions
    Graph {
        /// Records JSON file, or "-" for stdin
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = LayoutArg::Grid)]
        layout: LayoutArg,
        /// Center category for the polar layout
        #[arg(long)]
        center: Option<String>,
        /// Use Gemini for embeddings and classification
        #[arg(long)]
        remote: bool,
    },
    /// Per-category counts and minutes
    Categories {
        /// Records JSON file, or "-" for stdin
        input: PathBuf,
    },
    /// Records most similar to one record
    Similar {
        /// Records JSON file, or "-" for stdin
        input: PathBuf,
        /// Record id to query
        id: String,
        #[arg(short, long, default_value_t = 5)]
        k: usize,
        /// Use Gemini embeddings
        #[arg(long)]
        remote: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    Grid,
    Polar,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    trailmap::init_logging();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(path) = cli.ontology.clone() {
        config.ontology.path = Some(path);
    }

    match cli.command {
        Command::Graph {
            input,
            layout,
            center,
            remote,
        } => {
            let records = read_records(&input)?;
            if remote {
                config.abstraction.refine_with_classifier = true;
            }
            let pipeline = build_pipeline(config, remote)?;
            let mode = match layout {
                LayoutArg::Grid => LayoutMode::Grid,
                LayoutArg::Polar => LayoutMode::Polar { center },
            };
            let mut cache = EmbeddingCache::new();
            let graph = pipeline
                .build(&records, &mode, &mut cache)
                .await
                .context("failed to build learning graph")?;
            write_json(&graph, cli.pretty)
        }
        Command::Categories { input } => {
            let records = read_records(&input)?;
            let pipeline = build_pipeline(config, false)?;
            write_json(&category_stats(pipeline.ontology(), &records), cli.pretty)
        }
        Command::Similar {
            input,
            id,
            k,
            remote,
        } => {
            let records = read_records(&input)?;
            let pipeline = build_pipeline(config, remote)?;
            let mut cache = EmbeddingCache::new();
            let neighbours = pipeline
                .similar(&records, &id, k, &mut cache)
                .await
                .with_context(|| format!("failed to rank neighbours of {id}"))?;
            write_json(&neighbours, cli.pretty)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TrailmapConfig> {
    match path {
        Some(path) => {
            TrailmapConfig::load_from_path(path).context("failed to load config")
        }
        None => {
            let cwd = std::env::current_dir().context("cwd")?;
            info!("loading layered config from cwd: {}", cwd.display());
            let layered =
                TrailmapConfig::load_layered(&cwd).context("failed to load layered config")?;
            debug!("layered config loaded (layers={})", layered.layers.len());
            Ok(layered.config)
        }
    }
}

fn build_pipeline(config: TrailmapConfig, remote: bool) -> anyhow::Result<GraphPipeline> {
    let gemini = config.providers.gemini.clone();
    let pipeline = GraphPipeline::from_config(config).context("failed to prepare pipeline")?;
    if !remote {
        return Ok(pipeline);
    }
    let client = GeminiClient::from_env(gemini).context("failed to build Gemini client")?;
    if !client.has_api_key() {
        bail!(
            "{} is required for --remote",
            client.config().api_key_env
        );
    }
    let classifier = GeminiClassifier::new(client.clone(), pipeline.ontology());
    info!("remote capabilities enabled");
    Ok(pipeline
        .with_classifier(Arc::new(classifier))
        .with_embedder(Arc::new(GeminiEmbedder::new(client))))
}

/// Records in their JSON array form.
fn read_records(path: &Path) -> anyhow::Result<Vec<ConfirmedRecord>> {
    let contents = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read records from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    let records: Vec<ConfirmedRecord> =
        serde_json::from_str(&contents).context("failed to parse records")?;
    info!("records loaded (count={})", records.len());
    Ok(records)
}

fn write_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to encode output")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_polar_graph_command() {
        let cli = Cli::try_parse_from([
            "trailmap",
            "graph",
            "records.json",
            "--layout",
            "polar",
            "--center",
            "Backend",
            "--pretty",
        ])
        .expect("parse");
        assert!(cli.pretty);
        match cli.command {
            Command::Graph {
                layout,
                center,
                remote,
                ..
            } => {
                assert_eq!(layout, LayoutArg::Polar);
                assert_eq!(center.as_deref(), Some("Backend"));
                assert!(!remote);
            }
            _ => panic!("expected graph command"),
        }
    }

    #[test]
    fn similar_defaults_to_five_neighbours() {
        let cli = Cli::try_parse_from(["trailmap", "similar", "-", "rec-1"]).expect("parse");
        match cli.command {
            Command::Similar { id, k, .. } => {
                assert_eq!(id, "rec-1");
                assert_eq!(k, 5);
            }
            _ => panic!("expected similar command"),
        }
    }

    #[test]
    fn reads_camel_case_record_files() {
        let file = tempfile::NamedTempFile::new().expect("tmp");
        std::fs::write(
            file.path(),
            r#"[{
                "id": "r1",
                "session": {
                    "title": "React入門",
                    "url": "https://react.dev/learn",
                    "startTime": "2024-05-01T09:00:00Z",
                    "endTime": "2024-05-01T09:10:00Z",
                    "duration": 600000
                },
                "transactionHash": "TX",
                "blockHeight": 3
            }]"#,
        )
        .expect("write");
        let records = read_records(file.path()).expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].session.title, "React入門");
    }
}
