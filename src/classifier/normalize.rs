//! Text canonicalization for alias matching
//!
//! Listing titles mix full-width and half-width forms of the same
//! characters (ＳＵＶ vs SUV, ６６０ vs 660) and arbitrary casing.
//! Folding everything to one representation lets call sites do plain
//! substring matching instead of re-deriving equivalence each time.

use unicode_normalization::UnicodeNormalization;

/// Fold text to its canonical matching form: NFKC (full-width → half-width,
/// compatibility forms composed) then uppercase. Pure and total — never
/// fails, for any input.
pub fn fold(text: &str) -> String {
    text.nfkc().collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fullwidth_folds_to_halfwidth() {
        assert_eq!(fold("ＳＵＶ"), "SUV");
        assert_eq!(fold("６６０ｃｃ"), "660CC");
    }

    #[test]
    fn test_case_folds_upward() {
        assert_eq!(fold("Harrier"), "HARRIER");
        assert_eq!(fold("k-car"), "K-CAR");
    }

    #[test]
    fn test_japanese_text_passes_through() {
        assert_eq!(fold("ハリアー 軽自動車"), "ハリアー 軽自動車");
    }

    #[test]
    fn test_fold_is_idempotent() {
        let once = fold("ＴＯＹＯＴＡ Ｈａｒｒｉｅｒ ６６０ｃｃ");
        assert_eq!(fold(&once), once);
    }
}
