//! Campaign and notification configuration
//!
//! Campaign targets load from a TOML file (`[[campaign]]` tables); a
//! built-in default set covers the common maker sweeps. Notification
//! settings come from environment variables layered over defaults, so a
//! cron deployment needs no config file at all.
//!
//! The restricted-class exclusion compiled into the catalog is always
//! active; campaign keyword lists cannot re-admit it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-source-target campaign settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub name: String,
    /// Site identifier listings are keyed by; empty = accept any site.
    #[serde(default)]
    pub site: String,
    /// Price ceiling in yen.
    #[serde(default = "default_price_max")]
    pub price_max: u64,
    /// Minimum model year.
    #[serde(default)]
    pub year_min: i32,
    /// Mileage ceiling in km.
    #[serde(default = "default_mileage_max")]
    pub mileage_max: u64,
    /// List pages the scrape layer walks; irrelevant to the engine.
    #[serde(default = "default_pages")]
    pub pages: u32,
    /// At least one must appear in the title when non-empty.
    #[serde(default)]
    pub include_keywords: Vec<String>,
    /// Any hit rejects the listing.
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            site: String::new(),
            price_max: default_price_max(),
            year_min: 0,
            mileage_max: default_mileage_max(),
            pages: default_pages(),
            include_keywords: Vec::new(),
            exclude_keywords: Vec::new(),
        }
    }
}

fn default_price_max() -> u64 {
    9_999_999
}

fn default_mileage_max() -> u64 {
    9_999_999
}

fn default_pages() -> u32 {
    1
}

#[derive(Debug, Default, Deserialize)]
struct CampaignFile {
    #[serde(default)]
    campaign: Vec<CampaignConfig>,
}

/// Load campaigns from a TOML file.
pub fn load_campaigns(path: &Path) -> Result<Vec<CampaignConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: CampaignFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    debug!("loaded {} campaigns from {}", file.campaign.len(), path.display());
    Ok(file.campaign)
}

/// The user-level campaign file location.
pub fn user_campaign_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("dealscout").join("campaigns.toml"))
}

/// Built-in default campaigns: the common maker sweeps.
pub fn builtin_campaigns() -> Vec<CampaignConfig> {
    vec![
        CampaignConfig {
            name: "トヨタSUV".into(),
            site: "carsensor".into(),
            price_max: 5_000_000,
            year_min: 2015,
            mileage_max: 100_000,
            pages: 2,
            ..Default::default()
        },
        CampaignConfig {
            name: "マツダSUV".into(),
            site: "carsensor".into(),
            price_max: 4_000_000,
            year_min: 2016,
            mileage_max: 80_000,
            pages: 2,
            ..Default::default()
        },
        CampaignConfig {
            name: "スバルSUV".into(),
            site: "carsensor".into(),
            price_max: 4_000_000,
            year_min: 2015,
            mileage_max: 90_000,
            pages: 2,
            ..Default::default()
        },
        CampaignConfig {
            name: "日産・ホンダSUV".into(),
            site: "carsensor".into(),
            price_max: 4_500_000,
            year_min: 2015,
            mileage_max: 100_000,
            pages: 2,
            ..Default::default()
        },
        CampaignConfig {
            name: "Goo-net SUV".into(),
            site: "goonet".into(),
            price_max: 5_000_000,
            year_min: 2015,
            mileage_max: 100_000,
            pages: 1,
            ..Default::default()
        },
    ]
}

/// Webhook delivery settings, read from the environment.
#[derive(Debug, Clone, Default)]
pub struct NotifyConfig {
    /// Webhook for the immediate tier.
    pub webhook_immediate: Option<String>,
    /// Webhook for the maybe tier.
    pub webhook_maybe: Option<String>,
    /// Print payloads instead of delivering them.
    pub dry_run: bool,
}

impl NotifyConfig {
    /// `DISCORD_WEBHOOK_URL_MAIN` (falling back to `DISCORD_WEBHOOK_URL`),
    /// `DISCORD_WEBHOOK_URL_MAYBE`, and `DISCORD_DRY_RUN=1`.
    pub fn from_env() -> Self {
        let webhook_immediate = std::env::var("DISCORD_WEBHOOK_URL_MAIN")
            .or_else(|_| std::env::var("DISCORD_WEBHOOK_URL"))
            .ok();
        let webhook_maybe = std::env::var("DISCORD_WEBHOOK_URL_MAYBE").ok();
        let dry_run = std::env::var("DISCORD_DRY_RUN").map(|v| v == "1").unwrap_or(false);
        Self {
            webhook_immediate,
            webhook_maybe,
            dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_campaigns_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[campaign]]
name = "トヨタSUV"
site = "carsensor"
price_max = 5000000
year_min = 2015
mileage_max = 100000
pages = 2
exclude_keywords = ["事故", "不動"]

[[campaign]]
name = "ミニマル"
"#
        )
        .unwrap();

        let campaigns = load_campaigns(file.path()).unwrap();
        assert_eq!(campaigns.len(), 2);
        assert_eq!(campaigns[0].name, "トヨタSUV");
        assert_eq!(campaigns[0].exclude_keywords.len(), 2);
        // Unspecified fields take defaults.
        assert_eq!(campaigns[1].price_max, 9_999_999);
        assert_eq!(campaigns[1].pages, 1);
    }

    #[test]
    fn test_load_campaigns_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not valid toml [[[").unwrap();
        assert!(load_campaigns(file.path()).is_err());
    }

    #[test]
    fn test_builtin_campaigns_are_well_formed() {
        let campaigns = builtin_campaigns();
        assert_eq!(campaigns.len(), 5);
        for campaign in campaigns {
            assert!(!campaign.name.is_empty());
            assert!(campaign.price_max > 0);
            assert!(campaign.year_min >= 2015);
        }
    }
}
