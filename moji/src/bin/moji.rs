//! Command-line asciimoji picker
//!
//! Runs queries through the same SearchController the app uses.
//!
//! Run with: cargo run --bin moji -- shrug
//! Copy with: cargo run --bin moji -- --first tableflip | pbcopy

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use moji::{perform_selection, Dataset, MojiError, SearchConfig, SearchController, SearchState};
use moji::{SelectionAction, SelectionSink};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Search the asciimoji table", long_about = None)]
struct Args {
    /// Query to search for; empty lists every entry
    #[arg(default_value = "")]
    query: String,

    /// Print only the first match's text (for piping into a clipboard tool)
    #[arg(long)]
    first: bool,

    /// Read queries from stdin, one per line
    #[arg(short, long, conflicts_with = "first")]
    interactive: bool,

    /// JSON object of "keyword": "text" to search instead of the bundled table
    #[arg(short, long, env = "MOJI_DATASET")]
    dataset: Option<PathBuf>,

    /// Additional config file(s), applied after ./moji.toml
    #[arg(short, long)]
    config: Vec<PathBuf>,
}

/// "Copy" for a terminal: the text goes to stdout for the shell to redirect
struct StdoutSink;

impl SelectionSink for StdoutSink {
    fn paste(&self, _text: String) -> Result<(), MojiError> {
        Err(MojiError::SelectionFailed(
            "pasting needs a host application".to_string(),
        ))
    }

    fn copy(&self, text: String) -> Result<(), MojiError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}").map_err(|e| MojiError::SelectionFailed(e.to_string()))
    }
}

fn print_results(state: &SearchState) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    for entry in &state.results {
        writeln!(stdout, "{}\t{}", entry.rendered_text, entry.keyword)?;
    }
    stdout.flush()?;
    Ok(())
}

/// Wait until the latest submission has resolved
async fn settled(states: &mut watch::Receiver<SearchState>) -> Result<SearchState> {
    let state = states
        .wait_for(|state| !state.is_loading)
        .await
        .context("search controller went away")?;
    Ok(state.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = SearchConfig::load(&args.config).context("Failed to load config")?;
    let dataset = match &args.dataset {
        Some(path) => Dataset::from_json_file(path)
            .with_context(|| format!("Failed to load dataset from {}", path.display()))?,
        None => Dataset::bundled().context("Failed to load bundled dataset")?,
    };
    tracing::debug!(entries = dataset.len(), ?config, "starting");

    let controller = SearchController::with_dataset(dataset, config)?;
    let mut states = controller.subscribe();
    controller.initialize()?;

    if args.interactive {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            controller.submit_query(line)?;
            print_results(&settled(&mut states).await?)?;
        }
    } else {
        controller.submit_query(args.query.clone())?;
        let state = settled(&mut states).await?;
        if args.first {
            let entry = state
                .results
                .first()
                .ok_or_else(|| anyhow!("no asciimoji matches {:?}", args.query))?;
            perform_selection(entry, SelectionAction::Copy, &StdoutSink)?;
        } else {
            print_results(&state)?;
        }
    }

    controller.teardown();
    Ok(())
}
