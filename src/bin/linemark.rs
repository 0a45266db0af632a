//! Linemark CLI Binary
//!
//! Terminal front end for the bookmark collection: every subcommand is thin
//! glue over the controller's public operations.

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};
use dialoguer::Confirm;
use linemark::collection::Collection;
use linemark::config::{ConfigLoader, LinemarkConfig};
use linemark::controller::{Controller, ToggleOutcome};
use linemark::item::{FileStatus, Item};
use linemark::logging;
use linemark::paths::WorkspaceRoots;
use linemark::probe::FsLineProbe;
use linemark::store::{BookmarkStore, JsonFileStore};
use linemark::watch::WatchService;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Linemark - line bookmarks with folders
#[derive(Parser)]
#[command(name = "linemark")]
#[command(about = "Line bookmarks with folders, kept in sync with your files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all bookmarks and folders as a tree
    List,
    /// Toggle a bookmark at FILE:LINE
    Toggle {
        file: PathBuf,
        line: u32,
        /// Folder to place a newly added bookmark in
        #[arg(long)]
        folder: Option<String>,
        /// Label for a newly added bookmark
        #[arg(long)]
        label: Option<String>,
    },
    /// Create a folder
    Folder {
        name: String,
        /// Parent folder
        #[arg(long)]
        parent: Option<String>,
    },
    /// Rename an item by key (bookmark label or folder name)
    Rename { key: String, label: String },
    /// Delete an item by key; folders take their contents with them
    Delete { key: String },
    /// Move an item before another in the list order
    Move {
        source: String,
        #[arg(long)]
        before: String,
    },
    /// Move items into a folder, or to top level when none is given
    SetParent {
        keys: Vec<String>,
        #[arg(long)]
        folder: Option<String>,
    },
    /// Remove every bookmark and folder
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Re-check every bookmark against the filesystem
    Refresh,
    /// Watch workspace roots and reconcile bookmarks as files change
    Watch,
    /// Write a default .linemark.toml into the workspace
    Init,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ConfigLoader::load(&cli.workspace).context("loading configuration")?,
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    if matches!(cli.command, Commands::Init) {
        let path = LinemarkConfig::default()
            .write_workspace_file(&cli.workspace)
            .context("writing workspace config")?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let mut roots = config.roots.clone();
    if roots.is_empty() {
        roots.push(
            dunce::canonicalize(&cli.workspace).unwrap_or_else(|_| cli.workspace.clone()),
        );
    }

    let store_path = match &config.store_path {
        Some(path) => path.clone(),
        None => JsonFileStore::default_path().context("resolving store path")?,
    };
    let store: Arc<dyn BookmarkStore> = Arc::new(JsonFileStore::new(store_path));

    let controller = Arc::new(Controller::new(
        WorkspaceRoots::new(roots.clone()),
        store,
        Arc::new(FsLineProbe::new()),
        Duration::from_millis(config.save_debounce_ms),
    ));
    controller.load();

    match cli.command {
        Commands::List => {
            controller.refresh_status().await;
            print_tree(&controller.read());
        }
        Commands::Toggle {
            file,
            line,
            folder,
            label,
        } => {
            let file = absolute(&file)?;
            match controller.toggle(&file, line, folder.as_deref()) {
                ToggleOutcome::Added(key) => {
                    if let Some(label) = label {
                        controller.rename(&key, &label)?;
                    }
                    println!("Added {}", key);
                }
                ToggleOutcome::Removed(key) => println!("Removed {}", key),
            }
        }
        Commands::Folder { name, parent } => {
            controller.add_folder(&name, parent.as_deref())?;
            println!("Created folder [{}]", name);
        }
        Commands::Rename { key, label } => {
            controller.rename(&key, &label)?;
            println!("Renamed {}", key);
        }
        Commands::Delete { key } => {
            if controller.delete(&key) {
                println!("Deleted {}", key);
            } else {
                bail!("no item with key [{}]", key);
            }
        }
        Commands::Move { source, before } => {
            if controller.move_before(&source, &before) {
                println!("Moved {} before {}", source, before);
            } else {
                bail!("move was a no-op; check both keys exist");
            }
        }
        Commands::SetParent { keys, folder } => {
            controller.set_parent(&keys, folder.as_deref())?;
            println!("Moved {} item(s)", keys.len());
        }
        Commands::Clear { yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt("Remove every bookmark and folder?")
                    .default(false)
                    .interact()
                    .unwrap_or(false);
            if confirmed {
                controller.clear_all();
                println!("Cleared");
            } else {
                println!("Aborted");
            }
        }
        Commands::Refresh => {
            let changed = controller.refresh_status().await;
            println!("Refreshed; {} item(s) changed status", changed.len());
        }
        Commands::Watch => {
            let service = WatchService::new(Arc::clone(&controller), config.watch.clone());
            println!("Watching {} root(s); Ctrl-C to stop", roots.len());
            let stop = service.stop_handle();
            tokio::spawn(async move {
                let _ = tokio::signal::ctrl_c().await;
                stop.store(false, std::sync::atomic::Ordering::SeqCst);
            });
            service.run(&roots).await?;
        }
        Commands::Init => unreachable!("handled above"),
    }

    controller.flush_pending_save();
    Ok(())
}

/// Resolve a user-supplied path against the current directory, canonicalizing
/// when the file exists so it lines up with the configured roots.
fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("resolving current directory")?
            .join(path)
    };
    Ok(dunce::canonicalize(&joined).unwrap_or(joined))
}

fn print_tree(collection: &Collection) {
    if collection.is_empty() {
        println!("No bookmarks");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["", "Item", "Location", "Key"]);
    add_rows(collection, &mut table, None, 0);
    println!("{table}");
}

fn add_rows(collection: &Collection, table: &mut Table, parent: Option<&Item>, depth: usize) {
    for child in collection.view_children(parent) {
        let indent = "  ".repeat(depth);
        let marker = match child.status() {
            None => "▸".blue().to_string(),
            Some(FileStatus::LineExist) => "●".green().to_string(),
            Some(FileStatus::LineNotExist) => "○".yellow().to_string(),
            Some(FileStatus::FileNotExist) => "✗".red().to_string(),
        };
        table.add_row(vec![
            Cell::new(marker),
            Cell::new(format!("{}{}", indent, child.display_label())),
            Cell::new(child.description()),
            Cell::new(child.key()),
        ]);
        if child.is_folder() {
            add_rows(collection, table, Some(child), depth + 1);
        }
    }
}
