//! Listing field extraction
//!
//! Thin string-to-number mapping over locale-specific numeric patterns:
//! prices in yen and man-yen (×10,000), years as Gregorian or era-offset
//! forms (平成 H+1988, 令和 R+2018), mileage in km and man-km.
//!
//! Each extractor is deterministic first-match: patterns are tried in a
//! fixed priority order and the first hit wins; there is no aggregation
//! across multiple matches in the same text. 0 means "no parseable
//! value" and must be treated as unknown downstream.

use regex::Regex;

/// Heisei era offset: H<n>年 = 1988 + n.
const HEISEI_OFFSET: i32 = 1988;
/// Reiwa era offset: R<n>年 = 2018 + n.
const REIWA_OFFSET: i32 = 2018;

/// Plain 4-digit years outside this range are noise (phone numbers,
/// prices), not model years.
const YEAR_MIN: i32 = 2000;
const YEAR_MAX: i32 = 2030;

/// Repair-history / accident / flood indicators. Deliberately not the
/// bare 修復歴, which also appears in 修復歴なし.
const REPAIR_INDICATORS: &[&str] = &["修復歴あり", "修復歴有", "事故車", "事故歴あり", "冠水"];

/// Precompiled extraction patterns.
pub struct FieldExtractor {
    price_man_yen: Regex,
    price_yen_symbol: Regex,
    price_yen: Regex,
    year_heisei: Regex,
    year_reiwa: Regex,
    year_shiki: Regex,
    year_plain: Regex,
    mileage_man_km: Regex,
    mileage_km: Regex,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            price_man_yen: Regex::new(r"([0-9,]+(?:\.[0-9]+)?)\s*万円").expect("valid regex"),
            price_yen_symbol: Regex::new(r"￥([0-9,]+)").expect("valid regex"),
            price_yen: Regex::new(r"([0-9,]+)円").expect("valid regex"),
            year_heisei: Regex::new(r"H(\d{2})年").expect("valid regex"),
            year_reiwa: Regex::new(r"R(\d{1,2})年").expect("valid regex"),
            year_shiki: Regex::new(r"(\d{4})年式").expect("valid regex"),
            year_plain: Regex::new(r"(\d{4})年").expect("valid regex"),
            mileage_man_km: Regex::new(r"(?i)([0-9.]+)\s*万\s*km").expect("valid regex"),
            mileage_km: Regex::new(r"(?i)([0-9,]+)\s*km").expect("valid regex"),
        }
    }

    /// Price in yen; 0 on no match. 万円 amounts scale by 10,000.
    pub fn extract_price(&self, text: &str) -> u64 {
        if let Some(caps) = self.price_man_yen.captures(text) {
            return (parse_number(&caps[1]) * 10_000.0) as u64;
        }
        if let Some(caps) = self.price_yen_symbol.captures(text) {
            return parse_number(&caps[1]) as u64;
        }
        if let Some(caps) = self.price_yen.captures(text) {
            return parse_number(&caps[1]) as u64;
        }
        0
    }

    /// Model year; 0 on no match. Era-prefixed forms take priority over
    /// plain Gregorian years; plain years are gated to a sane range.
    pub fn extract_year(&self, text: &str) -> i32 {
        if let Some(caps) = self.year_heisei.captures(text) {
            return HEISEI_OFFSET + era_year(&caps[1]);
        }
        if let Some(caps) = self.year_reiwa.captures(text) {
            return REIWA_OFFSET + era_year(&caps[1]);
        }
        if let Some(caps) = self.year_shiki.captures(text) {
            return caps[1].parse().unwrap_or(0);
        }
        if let Some(caps) = self.year_plain.captures(text) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            if (YEAR_MIN..=YEAR_MAX).contains(&year) {
                return year;
            }
        }
        0
    }

    /// Mileage in km; 0 on no match. 万km amounts scale by 10,000.
    pub fn extract_mileage(&self, text: &str) -> u64 {
        if let Some(caps) = self.mileage_man_km.captures(text) {
            return (parse_number(&caps[1]) * 10_000.0) as u64;
        }
        if let Some(caps) = self.mileage_km.captures(text) {
            return parse_number(&caps[1]) as u64;
        }
        0
    }

    /// Whether the text carries a repair-history / accident / flood
    /// indicator.
    pub fn detect_repair(&self, text: &str) -> bool {
        REPAIR_INDICATORS.iter().any(|kw| text.contains(kw))
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number(digits: &str) -> f64 {
    digits.replace(',', "").parse().unwrap_or(0.0)
}

fn era_year(digits: &str) -> i32 {
    digits.parse().unwrap_or(0)
}
