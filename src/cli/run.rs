//! `run` command: assess a listing dump end to end
//!
//! Reads raw listing records from a JSON Lines file, assesses each
//! campaign's subset, prints the report, optionally writes the archival
//! CSV, and delivers the cross-campaign notification tiers.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use dealscout::catalog::VehicleCatalog;
use dealscout::config::{self, CampaignConfig, NotifyConfig};
use dealscout::models::{Listing, RawListing};
use dealscout::pipeline::AssessmentPipeline;
use dealscout::reporters::{self, DiscordNotifier, OutputFormat};
use dealscout::router::RouterConfig;

use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON Lines file of raw listings (one record per line)
    pub input: PathBuf,

    /// Campaign TOML file (default: user config, then built-ins)
    #[arg(long)]
    pub campaigns: Option<PathBuf>,

    /// Restrict to a single named campaign
    #[arg(long)]
    pub campaign: Option<String>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Write the scored batch to an archival CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print notifications instead of delivering them
    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute(args: RunArgs) -> Result<()> {
    let format = OutputFormat::from_str(&args.format)?;
    let records = read_records(&args.input)?;
    let campaigns = load_campaigns(&args)?;

    let catalog = Arc::new(VehicleCatalog::japan_suv());
    let pipeline =
        AssessmentPipeline::new(catalog).with_router_config(RouterConfig::from_env());

    let mut assessments = Vec::new();
    for campaign in &campaigns {
        let subset: Vec<RawListing> = records
            .iter()
            .filter(|r| campaign.site.is_empty() || r.site == campaign.site)
            .cloned()
            .collect();
        if subset.is_empty() {
            info!(campaign = %campaign.name, "no records for campaign");
            continue;
        }
        assessments.push(pipeline.assess(subset, campaign));
    }

    print!("{}", reporters::report(&assessments, format)?);

    // Archival output covers the full scored batch, not just the tiers.
    let mut all: Vec<Listing> = assessments
        .iter()
        .flat_map(|a| a.listings.iter().cloned())
        .collect();
    all.sort_by(|a, b| {
        b.urgency
            .cmp(&a.urgency)
            .then_with(|| b.score.total_cmp(&a.score))
    });

    if let Some(path) = &args.csv {
        reporters::write_csv(path, &all, reporters::CSV_DEFAULT_LIMIT)?;
        info!("archival CSV written to {}", path.display());
    }

    // Notification routes the cross-campaign aggregate.
    let (immediate, maybe) = pipeline.route_aggregate(&all);
    let mut notify_config = NotifyConfig::from_env();
    notify_config.dry_run = notify_config.dry_run || args.dry_run;
    DiscordNotifier::new(notify_config).notify(&immediate, &maybe);

    Ok(())
}

fn load_campaigns(args: &RunArgs) -> Result<Vec<CampaignConfig>> {
    let mut campaigns = match &args.campaigns {
        Some(path) => config::load_campaigns(path)?,
        None => match config::user_campaign_path().filter(|p| p.exists()) {
            Some(path) => config::load_campaigns(&path)?,
            None => config::builtin_campaigns(),
        },
    };

    if let Some(name) = &args.campaign {
        campaigns.retain(|c| &c.name == name);
        if campaigns.is_empty() {
            anyhow::bail!("no campaign named '{name}'");
        }
    }
    Ok(campaigns)
}

/// Parse the JSONL dump; a bad line is skipped, never fatal.
fn read_records(path: &PathBuf) -> Result<Vec<RawListing>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut records = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawListing>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!("skipping malformed record at line {}: {e}", lineno + 1),
        }
    }
    info!("read {} records from {}", records.len(), path.display());
    Ok(records)
}
