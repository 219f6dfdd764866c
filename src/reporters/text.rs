//! Text (terminal) reporter with colors and formatting

use crate::models::Listing;
use crate::pipeline::CampaignAssessment;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Urgency colors (ANSI escape codes)
fn urgency_color(urgency: u8) -> &'static str {
    match urgency {
        5 => "\x1b[31m", // Red
        4 => "\x1b[91m", // Light red
        3 => "\x1b[33m", // Yellow
        2 => "\x1b[34m", // Blue
        _ => "\x1b[90m", // Gray
    }
}

/// Render assessments as formatted terminal output
pub fn render(assessments: &[CampaignAssessment]) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{BOLD}Dealscout Assessment{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));

    for assessment in assessments {
        out.push_str(&format!("\n{BOLD}{}{RESET}\n", assessment.campaign));
        match &assessment.market {
            Some(stats) => out.push_str(&format!(
                "  相場: 中央値 {} / Q25 {}  ({}件)\n",
                format_yen(stats.median),
                format_yen(stats.q25),
                stats.samples
            )),
            None => out.push_str("  相場: ベースラインなし (有効価格4件未満)\n"),
        }
        out.push_str(&format!(
            "  取得 {}件 / 即買い {}件 / 検討 {}件\n",
            assessment.listings.len(),
            assessment.immediate.len(),
            assessment.maybe.len()
        ));

        if !assessment.immediate.is_empty() {
            out.push_str(&format!("\n  {BOLD}即買いレベル{RESET}\n"));
            for listing in &assessment.immediate {
                out.push_str(&render_listing(listing));
            }
        }
        if !assessment.maybe.is_empty() {
            out.push_str(&format!("\n  {BOLD}検討価値あり{RESET}\n"));
            for listing in &assessment.maybe {
                out.push_str(&render_listing(listing));
            }
        }
    }

    out.push('\n');
    out
}

fn render_listing(listing: &Listing) -> String {
    let color = urgency_color(listing.urgency);
    let mut line = format!(
        "    {color}[{}]{RESET} {:5.1}  {}  {}",
        listing.urgency,
        listing.score,
        listing.model_name,
        truncate(&listing.title, 40),
    );
    if listing.price > 0 {
        line.push_str(&format!("  {}", format_yen(listing.price as f64)));
    }
    if let Some(gap) = listing.deal_gap {
        if gap > 0 {
            line.push_str(&format!("  {DIM}(予測差額 +{}円){RESET}", thousands(gap as u64)));
        }
    }
    line.push_str(&format!("\n      {DIM}{}{RESET}\n", listing.url));
    line
}

fn format_yen(value: f64) -> String {
    format!("{}円", thousands(value.round() as u64))
}

fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}…")
    }
}
