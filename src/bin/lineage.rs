//! Lineage CLI: import entity-graph snapshots and crawl them.
//!
//! Usage:
//!   lineage import <file.nt> [--db path]
//!   lineage crawl <query> [--db path] [--config file.yml] [--path IRI]
//!                 [--start IRI] [--end IRI] [--interactive] [--json]

use clap::{Parser, Subcommand};
use lineage::graph::local_name;
use lineage::query::BranchRecord;
use lineage::resolve::{BranchResolver, DateResolver, PathResolver};
use lineage::{
    CancellationToken, Candidate, CrawlConfig, CrawlOutcome, CrawlTask, DataTree, DateChoice, DateValue, FirstCandidate, FixedDates,
    FixedPredicate, InitialSearchResult, NodeId, OpenStore, SqliteSource, ThreadedResolver, Triple,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "lineage", version, about = "Crawl an entity graph along one relation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import an N-Triples file into the snapshot database
    Import {
        /// N-Triples file to load
        file: PathBuf,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Crawl from a named entity
    Crawl {
        /// Resource URI, or a name appended to the configured base URL
        query: String,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
        /// YAML crawl configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path predicate IRI to follow
        #[arg(long)]
        path: Option<String>,
        /// Start date predicate IRI
        #[arg(long)]
        start: Option<String>,
        /// End date predicate IRI (defaults to --start)
        #[arg(long)]
        end: Option<String>,
        /// Ask on stdin whenever a choice is needed
        #[arg(long)]
        interactive: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Get the default database path (~/.local/share/lineage/graph.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir().unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let lineage_dir = data_dir.join("lineage");
    std::fs::create_dir_all(&lineage_dir).ok();
    lineage_dir.join("graph.db")
}

fn open_store(db: Option<PathBuf>) -> Result<SqliteSource, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    SqliteSource::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))
}

fn cmd_import(file: &Path, db: Option<PathBuf>) -> i32 {
    let store = match open_store(db) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let reader = match File::open(file) {
        Ok(f) => BufReader::new(f),
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", file.display(), e);
            return 1;
        }
    };
    match store.import_ntriples(reader) {
        Ok(inserted) => {
            info!(file = %file.display(), inserted, "import finished");
            println!("Imported {} new triples from {}", inserted, file.display());
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Print numbered options to stderr and read one index from stdin
fn prompt(header: &str, options: &[String]) -> Option<usize> {
    let mut err = std::io::stderr().lock();
    writeln!(err, "{}", header).ok()?;
    for (i, option) in options.iter().enumerate() {
        writeln!(err, "  [{}] {}", i + 1, option).ok()?;
    }
    write!(err, "choice (empty to skip): ").ok()?;
    err.flush().ok()?;
    drop(err);

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line).ok()?;
    let index = line.trim().parse::<usize>().ok()?;
    (1..=options.len()).contains(&index).then(|| index - 1)
}

fn describe_triple(triple: &Triple) -> String {
    format!("{} -> {}", local_name(&triple.predicate), triple.object)
}

fn interactive_dates(cancel: &CancellationToken) -> DateResolver {
    Arc::new(ThreadedResolver::new(|candidates: Vec<Triple>| {
        let options: Vec<String> = candidates.iter().map(describe_triple).collect();
        let pick = |header: &str| prompt(header, &options).map(|i| candidates[i].predicate.clone());
        let start = pick("Start date:");
        let end = pick("End date:");
        vec![DateChoice { start, end }]
    })
    .with_cancellation(cancel.clone()))
}

fn interactive_path(cancel: &CancellationToken) -> PathResolver {
    Arc::new(ThreadedResolver::new(|candidates: Vec<Triple>| {
        let options: Vec<String> = candidates.iter().map(describe_triple).collect();
        prompt("Relation to follow:", &options)
            .map(|i| candidates[i].predicate.clone())
            .into_iter()
            .collect()
    })
    .with_cancellation(cancel.clone()))
}

fn interactive_branches(cancel: &CancellationToken) -> BranchResolver {
    Arc::new(ThreadedResolver::new(|candidates: Vec<Candidate>| {
        let options: Vec<String> = candidates.iter().map(|c| format!("{} ({})", c.name, c.term)).collect();
        prompt("Several successors found, continue with:", &options)
            .map(|i| candidates[i].node)
            .into_iter()
            .collect::<Vec<NodeId>>()
    })
    .with_cancellation(cancel.clone()))
}

fn build_task(
    config: CrawlConfig,
    path: Option<String>,
    start: Option<String>,
    end: Option<String>,
    interactive: bool,
) -> CrawlTask {
    let cancel = CancellationToken::new();
    let dates: DateResolver = match start {
        Some(start) => {
            let end = end.unwrap_or_else(|| start.clone());
            Arc::new(FixedDates::new(start, end))
        }
        None if interactive => interactive_dates(&cancel),
        None => Arc::new(FirstCandidate),
    };
    let path: PathResolver = match path {
        Some(iri) => Arc::new(FixedPredicate::new(iri)),
        None if interactive => interactive_path(&cancel),
        None => Arc::new(FirstCandidate),
    };
    let branches: BranchResolver = if interactive {
        interactive_branches(&cancel)
    } else {
        Arc::new(FirstCandidate)
    };
    CrawlTask::new(config)
        .with_date_resolver(dates)
        .with_path_resolver(path)
        .with_branch_resolver(branches)
        .with_cancellation(cancel)
}

fn format_date(date: &DateValue) -> String {
    match date {
        DateValue::DateTime(dt) => dt.to_rfc3339(),
        DateValue::LocalDateTime(dt) => dt.to_string(),
        DateValue::Date(d) => d.to_string(),
        DateValue::Year(y) => y.to_string(),
        DateValue::Raw(s) => s.clone(),
    }
}

fn print_tree(tree: &DataTree, branches: &[BranchRecord]) {
    tree.walk(|node, depth| {
        if node.is_root() {
            return;
        }
        let indent = "  ".repeat(depth - 1);
        let dates = match (&node.start_date, &node.end_date) {
            (Some(s), Some(e)) if s == e => format!(" [{}]", format_date(s)),
            (Some(s), Some(e)) => format!(" [{} .. {}]", format_date(s), format_date(e)),
            (Some(s), None) => format!(" [{}]", format_date(s)),
            _ => String::new(),
        };
        let marker = if branches.iter().any(|b| b.parent == node.id) {
            " *"
        } else {
            ""
        };
        println!("{}{}{}{}", indent, node.display_name(), dates, marker);
    });
}

#[derive(Serialize)]
struct JsonReport<'a> {
    crawl_id: Uuid,
    result: InitialSearchResult,
    cancelled: bool,
    tree: &'a DataTree,
    branches: &'a [BranchRecord],
}

fn report(outcome: &CrawlOutcome, json: bool) -> i32 {
    if json {
        let report = JsonReport {
            crawl_id: outcome.crawl_id,
            result: outcome.result,
            cancelled: outcome.cancelled,
            tree: &outcome.tree,
            branches: &outcome.branches,
        };
        return match serde_json::to_string_pretty(&report) {
            Ok(s) => {
                println!("{}", s);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        };
    }

    if !outcome.result.is_ok() {
        eprintln!("Invalid query: {}", outcome.result);
        return 2;
    }
    print_tree(&outcome.tree, &outcome.branches);
    if outcome.cancelled {
        eprintln!("(cancelled, tree is partial)");
    }
    0
}

#[allow(clippy::too_many_arguments)]
async fn cmd_crawl(
    query: String,
    db: Option<PathBuf>,
    config: Option<PathBuf>,
    path: Option<String>,
    start: Option<String>,
    end: Option<String>,
    interactive: bool,
    json: bool,
) -> i32 {
    let config = match config {
        Some(file) => match CrawlConfig::from_yaml_file(&file) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}: {}", file.display(), e);
                return 1;
            }
        },
        None => CrawlConfig::default(),
    };
    let store = match open_store(db) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let task = build_task(config, path, start, end, interactive);
    let cancel = task.cancellation().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling crawl");
            cancel.cancel();
        }
    });

    let outcome = tokio::task::spawn_blocking(move || task.run(&query, store)).await;
    match outcome {
        Ok(Ok(outcome)) => report(&outcome, json),
        Ok(Err(e)) => {
            eprintln!("Error: {}", e);
            1
        }
        Err(e) => {
            eprintln!("Error: crawl worker failed: {}", e);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "lineage=info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Import { file, db } => cmd_import(&file, db),
        Commands::Crawl {
            query,
            db,
            config,
            path,
            start,
            end,
            interactive,
            json,
        } => cmd_crawl(query, db, config, path, start, end, interactive, json).await,
    };
    std::process::exit(code);
}
