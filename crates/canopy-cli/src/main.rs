//! CLI entry point for the canopy tree engine.
//!
//! A headless host: it opens a source on a directory, prints the rendered
//! rows, and in `watch` mode turns on-disk writes into buffer-written events
//! so only changed rows are repainted.
//!
//! # Usage
//!
//! ```bash
//! # Print the top level of a directory
//! canopy tree --path ./my-project
//!
//! # Expand down to a file and print as JSON
//! canopy tree --path ./my-project --reveal src/main.rs --format json
//!
//! # Keep the tree live and print repainted rows
//! canopy watch --path ./my-project
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use canopy_core::{Config, NodeId};
use canopy_notify::{BufferLookup, BufferTable, FileEvent, FsWatcher, HostEvent, SkipDirsFilter};
use canopy_source::{ChannelSink, ColumnRegistry, RecordingSink, RenderSink, RenderedRow, Source};
use canopy_vcs::GitTracker;
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{WrapErr, eyre};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// File tree engine with incremental VCS status annotation.
#[derive(Parser)]
#[command(name = "canopy", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Root directory of the tree.
    ///
    /// Defaults to the current directory.
    #[arg(short, long, global = true, env = "CANOPY_PATH")]
    path: Option<Utf8PathBuf>,

    /// JSON configuration file.
    #[arg(short, long, global = true, env = "CANOPY_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Columns to draw, in order (overrides the configuration).
    #[arg(long, global = true, env = "CANOPY_COLUMNS", value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// List entries whose name starts with a dot.
    #[arg(long, global = true, env = "CANOPY_SHOW_HIDDEN")]
    show_hidden: bool,

    /// Git executable to query.
    #[arg(long, global = true, env = "CANOPY_GIT")]
    git: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Render the tree once and print it.
    Tree {
        /// Expand directories down to this path (relative to the root).
        #[arg(short, long)]
        reveal: Option<Utf8PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Keep the tree live and print repainted rows as files change.
    Watch {
        /// Expand directories down to this path (relative to the root).
        #[arg(short, long)]
        reveal: Option<Utf8PathBuf>,
    },
}

/// Row output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One line per row.
    Text,
    /// A JSON array of rows.
    Json,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects `RUST_LOG` if set. Otherwise uses `debug` with `--verbose` and
/// `info` by default. Logs go to stderr so row output stays clean.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},mio=warn,notify=warn"))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the optional file and CLI overrides.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be read or the result
/// fails validation.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load configuration from {path}"))?,
        None => Config::default(),
    };

    if let Some(columns) = &cli.columns {
        config.columns.clone_from(columns);
    }
    if cli.show_hidden {
        config.tree.show_hidden = true;
    }
    if let Some(git) = &cli.git {
        config.git.command.clone_from(git);
    }

    config.validate()?;
    Ok(config)
}

/// Resolves the root directory to a canonical path.
///
/// # Errors
///
/// Returns an error if the path does not exist or is not a directory.
fn resolve_root(path: Option<&Utf8Path>) -> color_eyre::Result<Utf8PathBuf> {
    let path = path.unwrap_or_else(|| Utf8Path::new("."));

    if !path.exists() {
        return Err(eyre!("Path does not exist: {path}"));
    }
    if !path.is_dir() {
        return Err(eyre!("Path is not a directory: {path}"));
    }

    path.canonicalize_utf8()
        .wrap_err_with(|| format!("Failed to resolve {path}"))
}

/// Opens and initializes a source.
async fn open_source(
    root: &Utf8Path,
    config: &Arc<Config>,
    lookup: Arc<dyn BufferLookup>,
    sink: Arc<dyn RenderSink>,
) -> color_eyre::Result<Source> {
    let tracker = Arc::new(GitTracker::new(&config.git));
    let source = Source::open(
        root,
        Arc::clone(config),
        tracker,
        &ColumnRegistry::with_builtin(),
        lookup,
        sink,
    )
    .await?;
    source.init().await;
    Ok(source)
}

/// Loads the root and optionally reveals a path below it.
async fn populate(
    source: &Source,
    root: &Utf8Path,
    reveal: Option<&Utf8Path>,
) -> color_eyre::Result<()> {
    source.load(source.root()).await?;

    if let Some(target) = reveal {
        let target = root.join(target);
        if source.reveal(&target).await?.is_none() {
            warn!(path = %target, "Cannot reveal path");
        }
    }
    Ok(())
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Renders the tree once.
///
/// # Errors
///
/// Returns an error if the source cannot be opened or output fails.
async fn run_tree(
    root: &Utf8Path,
    config: Config,
    reveal: Option<&Utf8Path>,
    format: OutputFormat,
) -> color_eyre::Result<()> {
    info!(root = %root, "Rendering tree");

    let config = Arc::new(config);
    let sink = Arc::new(RecordingSink::new());
    let source = open_source(
        root,
        &config,
        Arc::new(BufferTable::new()),
        Arc::clone(&sink) as Arc<dyn RenderSink>,
    )
    .await?;

    populate(&source, root, reveal).await?;
    source.shutdown().await?;

    let rows = sink.last().unwrap_or_default();
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match format {
        OutputFormat::Text => write_rows(&mut handle, &rows)?,
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows)
                .wrap_err("Failed to serialize rows")?;
            writeln!(handle, "{json}")?;
        }
    }
    Ok(())
}

/// Keeps a source live until interrupted.
///
/// # Errors
///
/// Returns an error if the source or the filesystem watcher fails.
async fn run_watch(
    root: &Utf8Path,
    config: Config,
    reveal: Option<&Utf8Path>,
) -> color_eyre::Result<()> {
    info!(root = %root, "Starting watch");

    let config = Arc::new(config);
    let table = Arc::new(BufferTable::new());
    let (sink, mut painted) = ChannelSink::channel(64);
    let source = open_source(
        root,
        &config,
        Arc::clone(&table) as Arc<dyn BufferLookup>,
        Arc::new(sink),
    )
    .await?;

    let printer = tokio::spawn(async move {
        let stdout = std::io::stdout();
        while let Some(rows) = painted.recv().await {
            let mut handle = stdout.lock();
            if write_rows(&mut handle, &rows).is_err() || writeln!(handle).is_err() {
                break;
            }
        }
    });

    populate(&source, root, reveal).await?;

    let mut watcher = FsWatcher::new(root, &config.watch, SkipDirsFilter::default()).await?;

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    loop {
        #[cfg(unix)]
        let terminate = sigterm.recv();
        #[cfg(not(unix))]
        let terminate = std::future::pending::<Option<()>>();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down");
                break;
            }
            event = watcher.recv() => {
                let Some(event) = event else {
                    warn!("File watcher stopped");
                    break;
                };
                handle_file_event(&source, &table, event).await?;
            }
        }
    }

    watcher.shutdown().await?;
    source.shutdown().await?;
    drop(source);
    printer.abort();
    Ok(())
}

/// Turns one on-disk change into tree and status updates.
///
/// Entries that appeared or vanished refresh their parent listing; every
/// change is published as a buffer write so the git column can repaint.
async fn handle_file_event(
    source: &Source,
    table: &BufferTable,
    event: FileEvent,
) -> color_eyre::Result<()> {
    let path = event.path;
    let exists = tokio::fs::symlink_metadata(&path).await.is_ok();
    let known = source.tree().find_by_path(&path).is_some();

    if exists != known {
        if let Some(parent) = loaded_parent(source, &path) {
            debug!(path = %path, exists, "Listing changed, reloading parent");
            source.load(parent).await?;
        }
    }

    let buffer = table.open(path);
    if !source.publish(HostEvent::BufferWritten(buffer)) {
        debug!(%buffer, "No column listens for writes");
    }
    Ok(())
}

fn loaded_parent(source: &Source, path: &Utf8Path) -> Option<NodeId> {
    let parent = source.tree().find_by_path(path.parent()?)?;
    source.tree().is_loaded(parent.uid).then_some(parent.uid)
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn write_rows(out: &mut impl Write, rows: &[RenderedRow]) -> std::io::Result<()> {
    for row in rows {
        writeln!(out, "{}", row.row)?;
    }
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.no_color);

    let config = build_config(&cli)?;
    let root = resolve_root(cli.path.as_deref())?;

    match &cli.command {
        Commands::Tree { reveal, format } => {
            run_tree(&root, config, reveal.as_deref(), *format).await
        }
        Commands::Watch { reveal } => run_watch(&root, config, reveal.as_deref()).await,
    }
}
