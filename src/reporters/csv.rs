//! Archival CSV writer
//!
//! Writes the top-N scored listings to a CSV file with a UTF-8 BOM so
//! spreadsheet apps pick up the Japanese headers correctly.

use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Listing;

/// Rows written by default.
pub const DEFAULT_LIMIT: usize = 30;

const HEADERS: &[&str] = &[
    "タイトル",
    "URL",
    "サイト",
    "モデル",
    "信頼度",
    "価格",
    "年式",
    "走行距離",
    "スコア",
    "緊急度",
    "相場比",
    "予測差額",
    "修復歴",
];

/// Write the top `limit` listings (already sorted by the caller).
pub fn write_csv(path: &Path, listings: &[Listing], limit: usize) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    // UTF-8 BOM for spreadsheet compatibility.
    out.write_all("\u{feff}".as_bytes())?;
    writeln!(out, "{}", HEADERS.join(","))?;

    for listing in listings.iter().take(limit) {
        let row = [
            escape(&listing.title),
            escape(&listing.url),
            escape(&listing.site),
            escape(&listing.model_name),
            format!("{:.0}%", listing.confidence * 100.0),
            listing.price.to_string(),
            listing.year.to_string(),
            listing.mileage.to_string(),
            format!("{:.1}", listing.score),
            listing.urgency.to_string(),
            listing
                .price_ratio
                .map(|r| format!("{:.0}%", r * 100.0))
                .unwrap_or_default(),
            listing
                .deal_gap
                .map(|g| g.to_string())
                .unwrap_or_default(),
            if listing.has_repair { "あり" } else { "" }.to_string(),
        ];
        writeln!(out, "{}", row.join(","))?;
    }

    out.flush()?;
    Ok(())
}

/// Quote a field when it contains a delimiter, quote, or newline;
/// embedded quotes double up.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_assessment;

    #[test]
    fn test_write_csv_with_bom_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let assessment = test_assessment();

        write_csv(&path, &assessment.listings, DEFAULT_LIMIT).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);

        let content = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 listings
        assert!(lines[0].contains("タイトル"));
        assert!(lines[1].contains("https://example.com/1"));
        assert!(lines[1].contains("98.0"));
    }

    #[test]
    fn test_limit_truncates_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let assessment = test_assessment();

        write_csv(&path, &assessment.listings, 1).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_escape_quotes_and_commas() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
