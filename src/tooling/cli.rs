//! CLI Tooling
//!
//! Command-line interface for organizing a vault's attachment folder. Every
//! command is vault-scoped and safe to rerun.

use crate::config::{ConfigLoader, VaultSortConfig};
use crate::directory::PruneReport;
use crate::error::{ApiError, OrganizeError};
use crate::logging::LoggingConfig;
use crate::observer::{ObserverSet, TracingObserver};
use crate::organizer::{BatchReport, FileOrganizer, Placement, Plan};
use crate::paths;
use crate::placement::PlacementConfig;
use crate::storage::{DiskVault, VaultEntry, VaultStorage};
use crate::tooling::notices::ConsoleNotifier;
use crate::types::checksum_hex;
use crate::watch::{WatchConfig, WatchDaemon, WatchSummary};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Vaultsort CLI - content-addressed attachment placement
#[derive(Parser, Debug)]
#[command(name = "vaultsort")]
#[command(about = "Move vault attachments into folders derived from their SHA-256 checksum")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault root directory
    #[arg(long, default_value = ".")]
    pub vault: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Logging configuration with command-line overrides applied on top of `base`.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Organize every file under the attachment folder
    Organize {
        /// Show where files would go without moving anything
        #[arg(long)]
        dry_run: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Organize a single file
    File {
        /// Vault-relative path of the file
        path: String,
    },
    /// Remove empty directories under the attachment folder
    Prune {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print a file's checksum and target directory
    Checksum {
        /// Vault-relative path of the file
        path: String,
    },
    /// Organize automatically whenever files are created
    Watch {
        /// Quiet period after the last creation, in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,
        /// Run even when auto_organize is disabled in configuration
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Config,
}

/// CLI context for a single vault
pub struct CliContext {
    vault: Arc<DiskVault>,
    config: VaultSortConfig,
    organizer: FileOrganizer,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(vault_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(cfg_path) = &config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&vault_root)?
        };

        let vault = Arc::new(DiskVault::open(&vault_root)?);
        let observer = ObserverSet::new()
            .with(Arc::new(TracingObserver))
            .with(Arc::new(ConsoleNotifier::new()));
        let storage: Arc<dyn VaultStorage> = vault.clone();
        let organizer = FileOrganizer::new(storage, Arc::new(observer));

        Ok(Self {
            vault,
            config,
            organizer,
        })
    }

    pub fn config(&self) -> &VaultSortConfig {
        &self.config
    }

    pub fn organizer(&self) -> &FileOrganizer {
        &self.organizer
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Organize { dry_run, format } => {
                let placement = self.placement()?;
                if *dry_run {
                    let plan = self.organizer.plan_attachments(&placement).await;
                    render(format, &plan, format_plan_text)
                } else {
                    let report = self.organizer.organize_attachments(&placement).await;
                    render(format, &report, format_batch_report_text)
                }
            }
            Commands::File { path } => {
                let placement = self.placement()?;
                match self.organizer.organize_path(path, &placement).await? {
                    Placement::Moved { from, to } => Ok(format!("Moved {} -> {}", from, to)),
                    Placement::Unchanged { path } => {
                        Ok(format!("{} is already in place", path))
                    }
                }
            }
            Commands::Prune { format } => {
                let placement = self.placement()?;
                let report = self
                    .organizer
                    .directories()
                    .clean_empty_directories(&placement.root_path, placement.prune_scope)
                    .await;
                render(format, &report, format_prune_report_text)
            }
            Commands::Checksum { path } => {
                let placement = self.placement()?;
                let normalized = paths::normalize(path).map_err(|_| {
                    ApiError::ConfigError(format!("Invalid vault path: {}", path))
                })?;
                let file = match self.vault.resolve(&normalized).await? {
                    Some(VaultEntry::File(file)) => file,
                    _ => {
                        return Err(OrganizeError::NotFound { path: normalized }.into());
                    }
                };
                let checksum = self
                    .organizer
                    .compute_checksum(&file, placement.chunk_size)
                    .await?;
                Ok(format!(
                    "{}  {}",
                    checksum_hex(&checksum),
                    FileOrganizer::derive_path(&checksum, &placement)
                ))
            }
            Commands::Watch { debounce_ms, force } => {
                if !self.config.organizer.auto_organize && !force {
                    return Err(ApiError::ConfigError(
                        "auto_organize is disabled; set organizer.auto_organize = true or pass --force"
                            .to_string(),
                    ));
                }
                let placement = self.placement()?;
                let watch_config = WatchConfig {
                    debounce_ms: debounce_ms.unwrap_or(self.config.watch.debounce_ms),
                    ..WatchConfig::default()
                };
                let daemon = WatchDaemon::new(
                    self.organizer.clone(),
                    Arc::clone(&self.vault),
                    placement,
                    watch_config,
                );

                eprintln!(
                    "Watching {} (Ctrl-C to stop)",
                    self.vault.root().display()
                );
                let summary = watch_until(&daemon, async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                })
                .await?;
                Ok(format_watch_summary_text(&summary))
            }
            Commands::Config => toml::to_string_pretty(&self.config).map_err(|e| {
                ApiError::ConfigError(format!("Failed to serialize configuration: {}", e))
            }),
        }
    }

    fn placement(&self) -> Result<PlacementConfig, ApiError> {
        self.config.organizer.placement()
    }
}

/// Run the daemon until it ends on its own or `shutdown` resolves. On shutdown
/// the daemon is asked to stop and awaited, so a pass in flight completes.
async fn watch_until<F>(daemon: &WatchDaemon, shutdown: F) -> Result<WatchSummary, ApiError>
where
    F: std::future::Future<Output = ()>,
{
    let run = daemon.run();
    tokio::pin!(run);
    tokio::select! {
        result = &mut run => result,
        _ = shutdown => {
            info!("Interrupted, stopping watch");
            daemon.stop();
            run.await
        }
    }
}

fn format_watch_summary_text(summary: &WatchSummary) -> String {
    let mut out = format!(
        "Watch stopped after {} organize pass(es), {} file(s) moved",
        summary.passes, summary.moved
    );
    if summary.failed > 0 {
        out.push_str(&format!(", {} failure(s)", summary.failed));
    }
    out
}

fn render<T: Serialize>(
    format: &str,
    value: &T,
    text: fn(&T) -> String,
) -> Result<String, ApiError> {
    match format {
        "json" => serde_json::to_string_pretty(value).map_err(|e| {
            ApiError::ConfigError(format!("Failed to serialize output: {}", e))
        }),
        "text" => Ok(text(value)),
        other => Err(ApiError::ConfigError(format!(
            "Invalid output format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

fn display_root(root: &str) -> &str {
    if root.is_empty() {
        "/"
    } else {
        root
    }
}

/// Format an organize run as text.
pub fn format_batch_report_text(report: &BatchReport) -> String {
    if !report.root_found {
        return format!(
            "Attachment folder not found: {}",
            display_root(&report.root_path)
        );
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format!("Organized {}", display_root(&report.root_path)).bold()
    ));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Outcome", "Count"]);
    table.add_row(vec!["Moved".to_string(), report.moved.len().to_string()]);
    table.add_row(vec!["Already in place".to_string(), report.unchanged.to_string()]);
    table.add_row(vec!["Failed".to_string(), report.failures.len().to_string()]);
    if let Some(prune) = &report.prune {
        table.add_row(vec![
            "Folders removed".to_string(),
            prune.removed_count().to_string(),
        ]);
    }
    out.push_str(&format!("{}\n", table));

    if !report.failures.is_empty() {
        out.push_str("\nFailures:\n");
        for failure in &report.failures {
            out.push_str(&format!("  - {}: {}\n", failure.path, failure.error));
        }
    }
    let elapsed = report.finished_at - report.started_at;
    out.push_str(&format!("\nCompleted in {} ms", elapsed.num_milliseconds()));
    out
}

/// Format a dry run as text.
pub fn format_plan_text(plan: &Plan) -> String {
    if !plan.root_found {
        return format!(
            "Attachment folder not found: {}",
            display_root(&plan.root_path)
        );
    }
    if plan.moves.is_empty() && plan.failures.is_empty() {
        return format!(
            "All {} file(s) already in place. Nothing to do.",
            plan.unchanged
        );
    }

    let mut out = String::new();
    if !plan.moves.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["From", "To"]);
        for planned in &plan.moves {
            table.add_row(vec![planned.from.clone(), planned.to.clone()]);
        }
        out.push_str(&format!("{}\n\n", table));
    }
    for failure in &plan.failures {
        out.push_str(&format!("Cannot place {}: {}\n", failure.path, failure.error));
    }
    out.push_str(&format!(
        "Would move {} file(s); {} already in place. Run without --dry-run to apply.",
        plan.moves.len(),
        plan.unchanged
    ));
    out
}

/// Format a prune run as text.
pub fn format_prune_report_text(report: &PruneReport) -> String {
    let mut out = String::new();
    if report.removed.is_empty() {
        out.push_str("No empty folders found.");
    } else {
        out.push_str(&format!("Removed {} empty folder(s):\n", report.removed_count()));
        for path in &report.removed {
            out.push_str(&format!("  - {}\n", path));
        }
    }
    if !report.kept.is_empty() {
        out.push_str(&format!(
            "\nKept {} folder(s) holding hidden files.",
            report.kept.len()
        ));
    }
    for failure in &report.failures {
        out.push_str(&format!("\nCould not remove {}: {}", failure.path, failure.error));
    }
    out.trim_end().to_string()
}
