//! Output reporters for campaign assessments
//!
//! - `text` - terminal summary with colors
//! - `json` - machine-readable JSON
//! - `csv` - archival CSV of the scored batch
//! - `discord` - webhook notification for the two tiers

mod csv;
mod discord;
mod json;
mod text;

pub use csv::{write_csv, DEFAULT_LIMIT as CSV_DEFAULT_LIMIT};
pub use discord::DiscordNotifier;

use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::pipeline::CampaignAssessment;

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

/// Render assessments in the requested format.
pub fn report(assessments: &[CampaignAssessment], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render(assessments)),
        OutputFormat::Json => json::render(assessments),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Listing;
    use crate::stats::MarketStats;

    /// Minimal assessment for reporter tests.
    pub(crate) fn test_assessment() -> CampaignAssessment {
        let strong = Listing {
            title: "トヨタ ハリアー プレミアム".into(),
            url: "https://example.com/1".into(),
            site: "carsensor".into(),
            model_name: "ハリアー".into(),
            confidence: 0.85,
            price: 1_500_000,
            year: 2019,
            mileage: 32_000,
            price_ratio: Some(0.5),
            score: 98.0,
            urgency: 5,
            deal_gap: Some(600_000),
            predicted_p50: Some(2_100_000.0),
            ..Default::default()
        };
        let weak = Listing {
            title: "マツダ CX-5 XD".into(),
            url: "https://example.com/2".into(),
            site: "carsensor".into(),
            model_name: "CX-5".into(),
            confidence: 0.85,
            price: 2_400_000,
            year: 2017,
            mileage: 78_000,
            price_ratio: Some(0.8),
            score: 72.0,
            urgency: 3,
            ..Default::default()
        };
        CampaignAssessment {
            campaign: "トヨタSUV".into(),
            market: Some(MarketStats {
                median: 3_000_000.0,
                q25: 2_500_000.0,
                samples: 12,
            }),
            immediate: vec![strong.clone()],
            maybe: vec![weak.clone()],
            listings: vec![strong, weak],
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("yaml").is_err());
    }
}
