//! Vehicle reference catalog
//!
//! Static lookup table of vehicle nameplates: maker, canonical name,
//! alias spellings (including non-native-script variants), and body-type
//! tags. Built once at startup and shared read-only into the classifier.
//!
//! Positive matchers are precompiled per entry as case-insensitive
//! alternations and iterated in insertion order — when a title matches
//! two entries' aliases, the earlier-registered entry wins. That
//! tie-break is deterministic but essentially arbitrary; callers must
//! not rely on it beyond determinism.
//!
//! Kei-class (660cc) nameplates carry `is_restricted` and never get a
//! positive matcher; the exclusion keyword list compiled here is always
//! active and cannot be overridden by campaign configuration.

use regex::{Regex, RegexBuilder};

use crate::classifier::normalize;

/// One reference nameplate.
#[derive(Debug, Clone)]
pub struct VehicleSpec {
    pub maker: String,
    /// Canonical model name; the classifier reports this on a hit.
    pub name: String,
    /// Alias spellings (romanized forms, katakana variants, short names).
    pub aliases: Vec<String>,
    /// Belongs to the hunted category.
    pub is_target: bool,
    /// Kei-class carve-out; never usable as a positive match.
    pub is_restricted: bool,
    /// Descriptive body-type tags, used for confidence corroboration.
    pub body_tags: Vec<String>,
}

/// Immutable catalog: entries in insertion order plus precompiled
/// matchers for the target (non-restricted) subset.
pub struct VehicleCatalog {
    entries: Vec<VehicleSpec>,
    /// (entry index, alternation over canonical name + aliases); target
    /// entries only, in insertion order.
    matchers: Vec<(usize, Regex)>,
    /// Folded exclusion keywords; always active.
    exclusion_keywords: Vec<String>,
    /// Display-variant alternation for the restricted class.
    exclusion_pattern: Regex,
}

/// Exclusion keywords for the restricted kei class. Checked as folded
/// substrings before any positive pattern.
const RESTRICTED_KEYWORDS: &[&str] = &[
    "ハスラー",
    "HUSTLER",
    "タフト",
    "TAFT",
    "スペーシアギア",
    "SPACIA GEAR",
    "テリオスキッド",
    "TERIOS KID",
    "キャスト",
    "CAST",
    "アクティバ",
    "ACTIVA",
    "ウェイク",
    "WAKE",
    "軽自動車",
    "軽SUV",
    "K-CAR",
    "660cc",
];

impl VehicleCatalog {
    /// Build a catalog from reference entries. Matchers are compiled for
    /// target entries only; restricted entries contribute nothing to the
    /// positive pass.
    pub fn new(entries: Vec<VehicleSpec>) -> Self {
        let mut matchers = Vec::new();
        for (idx, spec) in entries.iter().enumerate() {
            if !spec.is_target || spec.is_restricted {
                continue;
            }
            let alternation = std::iter::once(spec.name.as_str())
                .chain(spec.aliases.iter().map(String::as_str))
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join("|");
            let pattern = RegexBuilder::new(&alternation)
                .case_insensitive(true)
                .build()
                .expect("valid alias alternation");
            matchers.push((idx, pattern));
        }

        let exclusion_keywords = RESTRICTED_KEYWORDS
            .iter()
            .map(|kw| normalize::fold(kw))
            .collect();
        let exclusion_pattern = RegexBuilder::new(r"軽自動車|軽SUV|660CC|K-?CAR")
            .case_insensitive(true)
            .build()
            .expect("valid exclusion pattern");

        Self {
            entries,
            matchers,
            exclusion_keywords,
            exclusion_pattern,
        }
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[VehicleSpec] {
        &self.entries
    }

    /// Look up an entry by canonical name.
    pub fn get(&self, name: &str) -> Option<&VehicleSpec> {
        self.entries.iter().find(|spec| spec.name == name)
    }

    /// Positive matchers paired with their entries, in insertion order.
    pub fn matchers(&self) -> impl Iterator<Item = (&VehicleSpec, &Regex)> {
        self.matchers
            .iter()
            .map(move |(idx, pattern)| (&self.entries[*idx], pattern))
    }

    /// Whether folded text hits the restricted-class exclusion list.
    /// Evaluated before any positive pattern; always wins.
    pub fn is_excluded(&self, folded: &str) -> bool {
        self.exclusion_keywords.iter().any(|kw| folded.contains(kw))
            || self.exclusion_pattern.is_match(folded)
    }

    /// The built-in Japanese SUV catalog.
    pub fn japan_suv() -> Self {
        let mut entries = Vec::new();

        // トヨタ
        entry(&mut entries, "トヨタ", "ハリアー", &["HARRIER"], true, false, &["SUV", "クロスオーバーSUV"]);
        entry(&mut entries, "トヨタ", "RAV4", &["ラヴフォー", "ラブフォー"], true, false, &["SUV", "クロスオーバーSUV"]);
        entry(&mut entries, "トヨタ", "ランドクルーザー", &["LANDCRUISER", "ランクル", "LC"], true, false, &["SUV", "クロカン"]);
        entry(&mut entries, "トヨタ", "ランドクルーザープラド", &["PRADO", "ランクルプラド", "プラド"], true, false, &["SUV", "クロカン"]);
        entry(&mut entries, "トヨタ", "C-HR", &["CHR"], true, false, &["SUV", "コンパクトSUV"]);
        entry(&mut entries, "トヨタ", "カローラクロス", &["COROLLA CROSS"], true, false, &["SUV"]);
        entry(&mut entries, "トヨタ", "ヤリスクロス", &["YARIS CROSS"], true, false, &["SUV", "コンパクトSUV"]);
        entry(&mut entries, "トヨタ", "ライズ", &["RAIZE"], true, false, &["SUV", "コンパクトSUV"]);
        entry(&mut entries, "トヨタ", "ハイラックス", &["HILUX"], true, false, &["ピックアップトラック", "SUV"]);

        // 日産
        entry(&mut entries, "日産", "エクストレイル", &["X-TRAIL", "XTRAIL"], true, false, &["SUV"]);
        entry(&mut entries, "日産", "キックス", &["KICKS", "e-POWER"], true, false, &["SUV", "コンパクトSUV"]);
        entry(&mut entries, "日産", "ジューク", &["JUKE"], true, false, &["SUV", "コンパクトSUV"]);
        entry(&mut entries, "日産", "ムラーノ", &["MURANO"], true, false, &["SUV"]);
        entry(&mut entries, "日産", "テラノ", &["TERRANO"], true, false, &["SUV", "クロカン"]);
        entry(&mut entries, "日産", "アリア", &["ARIYA"], true, false, &["SUV", "電気自動車"]);

        // ホンダ
        entry(&mut entries, "ホンダ", "ヴェゼル", &["VEZEL", "ベゼル"], true, false, &["SUV", "コンパクトSUV"]);
        entry(&mut entries, "ホンダ", "CR-V", &["CRV", "シーアールブイ"], true, false, &["SUV"]);
        entry(&mut entries, "ホンダ", "ZR-V", &["ZRV"], true, false, &["SUV"]);

        // マツダ
        entry(&mut entries, "マツダ", "CX-3", &["シーエックススリー"], true, false, &["SUV", "コンパクトSUV"]);
        entry(&mut entries, "マツダ", "CX-30", &["シーエックスサーティー"], true, false, &["SUV"]);
        entry(&mut entries, "マツダ", "CX-5", &["シーエックスファイブ"], true, false, &["SUV"]);
        entry(&mut entries, "マツダ", "CX-8", &["シーエックスエイト"], true, false, &["SUV", "3列シート"]);
        entry(&mut entries, "マツダ", "CX-60", &[], true, false, &["SUV"]);
        entry(&mut entries, "マツダ", "MX-30", &[], true, false, &["SUV", "電動"]);

        // スバル
        entry(&mut entries, "スバル", "フォレスター", &["FORESTER"], true, false, &["SUV"]);
        entry(&mut entries, "スバル", "XV", &["CROSSTREK", "クロストレック"], true, false, &["SUV", "クロスオーバー"]);
        entry(&mut entries, "スバル", "レガシィアウトバック", &["OUTBACK", "アウトバック", "レガシィ"], true, false, &["SUV", "クロスオーバー"]);
        entry(&mut entries, "スバル", "アセント", &["ASCENT"], true, false, &["SUV", "3列シート"]);

        // 三菱
        entry(&mut entries, "三菱", "アウトランダー", &["OUTLANDER", "PHEV"], true, false, &["SUV"]);
        entry(&mut entries, "三菱", "エクリプスクロス", &["ECLIPSE CROSS"], true, false, &["SUV"]);
        entry(&mut entries, "三菱", "RVR", &["アールブイアール"], true, false, &["SUV", "コンパクトSUV"]);
        entry(&mut entries, "三菱", "パジェロ", &["PAJERO"], true, false, &["SUV", "クロカン"]);

        // スズキ (kei nameplates restricted)
        entry(&mut entries, "スズキ", "ジムニー", &["JIMNY"], true, true, &["軽自動車", "クロカン"]);
        entry(&mut entries, "スズキ", "ジムニーシエラ", &["JIMNY SIERRA"], true, false, &["SUV", "クロカン"]);
        entry(&mut entries, "スズキ", "エスクード", &["ESCUDO"], true, false, &["SUV"]);
        entry(&mut entries, "スズキ", "クロスビー", &["XBEE", "CROSSBEE"], true, false, &["SUV", "コンパクトSUV"]);
        entry(&mut entries, "スズキ", "ハスラー", &["HUSTLER"], false, true, &["軽自動車", "軽SUV"]);
        entry(&mut entries, "スズキ", "スペーシアギア", &["SPACIA GEAR"], false, true, &["軽自動車"]);

        // ダイハツ
        entry(&mut entries, "ダイハツ", "タフト", &["TAFT"], false, true, &["軽自動車", "軽SUV"]);
        entry(&mut entries, "ダイハツ", "ロッキー", &["ROCKY"], true, false, &["SUV", "コンパクトSUV"]);
        entry(&mut entries, "ダイハツ", "テリオスキッド", &["TERIOS KID"], false, true, &["軽自動車"]);

        Self::new(entries)
    }
}

fn entry(
    entries: &mut Vec<VehicleSpec>,
    maker: &str,
    name: &str,
    aliases: &[&str],
    is_target: bool,
    is_restricted: bool,
    body_tags: &[&str],
) {
    entries.push(VehicleSpec {
        maker: maker.to_string(),
        name: name.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        is_target,
        is_restricted,
        body_tags: body_tags.iter().map(|t| t.to_string()).collect(),
    });
}
