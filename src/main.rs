use anyhow::Context;
use clap::{Parser, Subcommand};
use docsearch::{
    config::Config,
    search::{
        index_stats, BatchIndexer, JsonDocumentMapper, OpenMode, PageRequest, PaginatedSearcher,
    },
    AppError,
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docsearch")]
#[command(about = "Batch indexing and paginated full-text search", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(short, long, env = "DOCSEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Index location, overriding the configuration
    #[arg(short, long)]
    index: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a JSON Lines file, one record per line
    Index {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Add to the existing index instead of replacing it
        #[arg(short, long)]
        append: bool,
    },

    /// Search one field and print a page of hits as JSON
    Search {
        #[arg(value_name = "TEXT")]
        text: String,

        #[arg(short, long, default_value = "desc")]
        field: String,

        #[arg(short, long, default_value = "1")]
        page: i64,

        /// Hits per page; the configured default when omitted
        #[arg(short, long, default_value = "0")]
        size: i64,

        /// Exact field to sort by instead of relevance
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Highlight fields, overriding the configuration
        #[arg(long = "highlight", value_name = "FIELD")]
        highlight: Vec<String>,
    },

    /// Delete documents by id
    Delete {
        #[arg(value_name = "ID", required = true)]
        ids: Vec<String>,
    },

    /// Print index statistics as JSON
    Stats,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        let code = e.downcast_ref::<AppError>().map_or(1, AppError::exit_code);
        std::process::exit(code);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(&path.to_string_lossy()),
        None => Config::load(),
    }
    .map_err(AppError::from)?;
    if let Some(index) = cli.index {
        config.search.index_path = index;
    }

    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        index_path = %config.search.index_path.display(),
        "Starting docsearch v{}",
        env!("CARGO_PKG_VERSION")
    );

    match cli.command {
        Commands::Index { file, append } => {
            if append {
                config.search.open_mode = OpenMode::CreateOrAppend;
            }
            let records = read_records(&file)?;
            let mapper = JsonDocumentMapper::new(config.schema.clone());
            let indexer = BatchIndexer::new(config.search.clone(), mapper).map_err(AppError::from)?;
            let report = indexer
                .index_multi_with_progress(&records, |commit| {
                    tracing::info!(
                        chunk = commit.chunk,
                        committed = commit.committed,
                        total = records.len(),
                        "Indexed chunk"
                    );
                })
                .map_err(AppError::from)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Search {
            text,
            field,
            page,
            size,
            sort,
            desc,
            highlight,
        } => {
            let mut searcher = PaginatedSearcher::new(config.search.clone(), config.schema.clone())
                .map_err(AppError::from)?;
            if !highlight.is_empty() {
                searcher = searcher.with_highlight_fields(highlight);
            }
            let mut request = PageRequest::new(page, size);
            if let Some(sort) = sort {
                request = request.sorted_by(sort, !desc);
            }
            let result = searcher
                .search_text(&text, &field, &request)
                .map_err(AppError::from)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Delete { ids } => {
            config.search.open_mode = OpenMode::Append;
            let mapper = JsonDocumentMapper::new(config.schema.clone());
            let indexer: BatchIndexer<serde_json::Value, _> =
                BatchIndexer::new(config.search.clone(), mapper).map_err(AppError::from)?;
            let deleted = indexer.delete_by_ids(&ids).map_err(AppError::from)?;
            println!("{}", serde_json::json!({ "deleted": deleted }));
        }
        Commands::Stats => {
            let stats = index_stats(&config.search).map_err(AppError::from)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("docsearch={}", config.observability.log_level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.observability.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Read JSON Lines, skipping blank lines
fn read_records(path: &Path) -> anyhow::Result<Vec<serde_json::Value>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut records = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(AppError::from)?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str::<serde_json::Value>(&line)
            .map_err(AppError::from)
            .with_context(|| format!("invalid JSON on line {}", number + 1))?;
        records.push(record);
    }
    Ok(records)
}
