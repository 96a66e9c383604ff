//! CLI for the agate asset-ingestion pipeline.

mod commands;

use agate_core::config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_hash, run_ingest, run_ls, run_preview, run_rm, run_scan, run_sniff};

/// Top-level CLI for the agate ingestion pipeline.
#[derive(Debug, Parser)]
#[command(name = "agate")]
#[command(about = "agate: hardened ingestion for untrusted creative assets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Extract a ZIP through the full policy pipeline (sniff, scan, store).
    Ingest {
        /// Path to the archive.
        path: PathBuf,

        /// Password for encrypted entries.
        #[arg(long)]
        password: Option<String>,

        /// Skip the malware scan even when enabled in config.
        #[arg(long)]
        no_scan: bool,

        /// Keep archive order instead of sorting HTML first.
        #[arg(long)]
        keep_order: bool,

        /// Print the extraction report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List an archive's entries from its central directory (no extraction).
    Preview {
        /// Path to the archive.
        path: PathBuf,

        /// Maximum entries to list (default from config).
        #[arg(long, value_name = "N")]
        max_entries: Option<usize>,
    },

    /// Detect a file's content type from its bytes.
    Sniff {
        /// Path to the file.
        path: PathBuf,
    },

    /// Compute SHA-256 of a file.
    Hash {
        /// Path to the file.
        path: PathBuf,
    },

    /// Scan a file against the configured clamd daemon.
    Scan {
        /// Path to the file (not needed with --ping).
        path: Option<PathBuf>,

        /// Only check daemon reachability (PING/PONG).
        #[arg(long)]
        ping: bool,
    },

    /// List stored asset ids.
    Ls,

    /// Delete stored asset trees by id.
    Rm {
        /// Asset ids to delete.
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Ingest {
                path,
                password,
                no_scan,
                keep_order,
                json,
            } => {
                run_ingest(&cfg, &path, password.as_deref(), no_scan, keep_order, json).await?;
            }
            CliCommand::Preview { path, max_entries } => run_preview(&cfg, &path, max_entries)?,
            CliCommand::Sniff { path } => run_sniff(&path)?,
            CliCommand::Hash { path } => run_hash(&path)?,
            CliCommand::Scan { path, ping } => run_scan(&cfg, path.as_deref(), ping).await?,
            CliCommand::Ls => run_ls(&cfg)?,
            CliCommand::Rm { ids } => run_rm(&cfg, &ids)?,
        }

        Ok(())
    }
}
