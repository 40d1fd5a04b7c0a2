//! CLI for the urlvet reputation lookup tool.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use urlvet_core::config;

use commands::{run_cache_prune, run_cache_stats, run_scan};

/// Top-level CLI for urlvet.
#[derive(Debug, Parser)]
#[command(name = "urlvet")]
#[command(about = "urlvet: bulk URL reputation lookups with a persistent verdict cache", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve a list of URLs against the reputation service and mark threats.
    Scan {
        /// Path to a newline-separated list of URLs or domains.
        list: PathBuf,

        /// Cache file to use instead of the default XDG location.
        #[arg(long, value_name = "FILE")]
        cache: Option<PathBuf>,

        /// Override the configured cache TTL in days.
        #[arg(long, value_name = "DAYS")]
        ttl_days: Option<u64>,

        /// Write the full verdict mapping to FILE as pretty JSON.
        #[arg(long, value_name = "FILE")]
        json_export: Option<PathBuf>,
    },

    /// Show cache entry counts (total / fresh / stale).
    CacheStats {
        /// Cache file to inspect instead of the default XDG location.
        #[arg(long, value_name = "FILE")]
        cache: Option<PathBuf>,

        /// Override the configured cache TTL in days.
        #[arg(long, value_name = "DAYS")]
        ttl_days: Option<u64>,
    },

    /// Drop stale cache entries and rewrite the cache file.
    CachePrune {
        /// Cache file to prune instead of the default XDG location.
        #[arg(long, value_name = "FILE")]
        cache: Option<PathBuf>,

        /// Override the configured cache TTL in days.
        #[arg(long, value_name = "DAYS")]
        ttl_days: Option<u64>,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Scan {
                list,
                cache,
                ttl_days,
                json_export,
            } => run_scan(&cfg, &list, cache, ttl_days, json_export),
            CliCommand::CacheStats { cache, ttl_days } => run_cache_stats(&cfg, cache, ttl_days),
            CliCommand::CachePrune { cache, ttl_days } => run_cache_prune(&cfg, cache, ttl_days),
        }
    }
}

#[cfg(test)]
mod tests;
