//! Discord webhook notification
//!
//! Formats the two routed tiers as embed payloads and delivers each to
//! its own webhook. Sync HTTP via ureq — no async runtime needed.
//! Delivery failure is logged and never aborts the run; dry-run mode
//! prints a preview instead of sending.

use std::time::Duration;

use chrono::Local;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::NotifyConfig;
use crate::models::Listing;

/// Embeds per message; Discord rejects more than 10, we send fewer.
const MAX_EMBEDS: usize = 5;

const COLOR_IMMEDIATE: u32 = 0xFF0000;
const COLOR_WATCH: u32 = 0xFFAA00;
const COLOR_INFO: u32 = 0x00AA00;

pub struct DiscordNotifier {
    agent: ureq::Agent,
    config: NotifyConfig,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // We handle status codes ourselves
        .timeout_global(Some(Duration::from_secs(10)))
        .build()
        .new_agent()
}

impl DiscordNotifier {
    pub fn new(config: NotifyConfig) -> Self {
        Self {
            agent: make_agent(),
            config,
        }
    }

    /// Deliver both tiers to their webhooks.
    pub fn notify(&self, immediate: &[Listing], maybe: &[Listing]) {
        self.send_tier(
            immediate,
            self.config.webhook_immediate.as_deref(),
            "🚀 即買いレベル SUV",
        );
        self.send_tier(
            maybe,
            self.config.webhook_maybe.as_deref(),
            "🤔 検討価値あり SUV",
        );
    }

    fn send_tier(&self, listings: &[Listing], webhook: Option<&str>, label: &str) {
        if listings.is_empty() {
            info!("{label}: 通知対象なし");
            return;
        }

        if self.config.dry_run {
            println!("[DRY-RUN] {label}:");
            for listing in listings.iter().take(3) {
                println!(
                    "  - {} Score:{} Price:{}円",
                    truncate(&listing.title, 50),
                    listing.score,
                    listing.price
                );
            }
            return;
        }

        let Some(url) = webhook else {
            warn!("{label}: webhook URL not configured");
            return;
        };

        let payload = build_payload(listings, label);
        match self
            .agent
            .post(url)
            .header("Content-Type", "application/json")
            .send_json(&payload)
        {
            Ok(response) if response.status().is_success() => {
                info!("{label}: {} 件通知完了", listings.len().min(MAX_EMBEDS));
            }
            Ok(response) => {
                warn!("{label}: webhook returned {}", response.status());
            }
            Err(e) => {
                // Degraded signal only; the assessment itself is done.
                warn!("{label}: delivery failed: {e}");
            }
        }
    }
}

/// Build the webhook payload: one embed per listing, capped.
pub fn build_payload(listings: &[Listing], label: &str) -> Value {
    let embeds: Vec<Value> = listings.iter().take(MAX_EMBEDS).map(embed).collect();
    json!({
        "content": format!("**{label}** - {}", Local::now().format("%Y/%m/%d %H:%M")),
        "embeds": embeds,
    })
}

fn embed(listing: &Listing) -> Value {
    let mut fields = vec![
        json!({"name": "価格", "value": format!("{}円", listing.price), "inline": true}),
        json!({"name": "年式", "value": format!("{}年", listing.year), "inline": true}),
        json!({"name": "走行距離", "value": format!("{}km", listing.mileage), "inline": true}),
        json!({"name": "スコア", "value": format!("{:.1}", listing.score), "inline": true}),
        json!({"name": "緊急度", "value": "🔥".repeat(listing.urgency.max(1) as usize), "inline": true}),
        json!({
            "name": "判定",
            "value": format!("{} ({:.0}%)", listing.model_name, listing.confidence * 100.0),
            "inline": true
        }),
    ];

    if let Some(ratio) = listing.price_ratio {
        fields.push(json!({"name": "相場比", "value": format!("{:.0}%", ratio * 100.0), "inline": true}));
    }
    if let Some(gap) = listing.deal_gap {
        if gap > 0 {
            fields.push(json!({"name": "予測差額", "value": format!("+{gap}円"), "inline": true}));
        }
    }

    json!({
        "title": truncate(&listing.title, 256),
        "url": listing.url,
        "color": embed_color(listing.urgency),
        "fields": fields,
        "footer": {"text": format!("{} | {}", listing.site, listing.grade)},
    })
}

fn embed_color(urgency: u8) -> u32 {
    if urgency >= 4 {
        COLOR_IMMEDIATE
    } else if urgency >= 3 {
        COLOR_WATCH
    } else {
        COLOR_INFO
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
