//! CLI command definitions and handlers

mod classify;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Dealscout - deal assessment for used-vehicle listings
///
/// Scores scraped listings against their batch's market baseline and a
/// held-out quantile price prediction, then routes the best candidates
/// into two notification tiers.
#[derive(Parser, Debug)]
#[command(name = "dealscout")]
#[command(
    version,
    about = "Assess used-vehicle listings — classify, price, score, and route the best deals",
    after_help = "\
Examples:
  dealscout run listings.jsonl                    Assess a scrape dump with built-in campaigns
  dealscout run listings.jsonl --format json      JSON output for scripting
  dealscout run listings.jsonl --csv results.csv  Also write the archival CSV
  dealscout classify \"トヨタ ハリアー 2019年式\"   Debug one title

Webhook delivery reads DISCORD_WEBHOOK_URL_MAIN / DISCORD_WEBHOOK_URL_MAYBE;
set DISCORD_DRY_RUN=1 to print instead of sending."
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assess a listing dump and route notification tiers
    Run(run::RunArgs),
    /// Classify a single listing title (debug helper)
    Classify(classify::ClassifyArgs),
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run::execute(args),
        Commands::Classify(args) => classify::execute(args),
    }
}
