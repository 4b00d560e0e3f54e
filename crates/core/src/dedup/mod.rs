//! Duplicate detection for incoming invoices.
//!
//! Runs once at ingestion time, before a draft is persisted; edits to an
//! existing invoice are never re-checked. The check is skip-safe rather
//! than fail-safe: when the candidate carries no usable signal it passes,
//! because false-positive blocking costs more than a rare duplicate.

use rust_decimal::Decimal;
use serde::Serialize;

/// Normalizes an IČO to its digit content.
///
/// Vendors write the same registration number as `"123 45 678"`,
/// `"CZ12345678"` or `"12345678"`; only the digits identify them.
#[must_use]
pub fn normalize_ico(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalizes a variable symbol by stripping all whitespace.
#[must_use]
pub fn normalize_variable_symbol(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// How confidently a candidate matched an existing invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrength {
    /// Same vendor and same variable symbol.
    Strong,
    /// Same vendor and same gross amount; no variable symbol available.
    Weak,
}

/// Dedup signals of an already-persisted invoice, as stored (normalized).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceKey {
    /// Normalized vendor IČO, if known.
    pub ico: Option<String>,
    /// Normalized variable symbol, if known.
    pub variable_symbol: Option<String>,
    /// Gross (with-VAT) amount, if known.
    pub amount_with_vat: Option<Decimal>,
}

/// Dedup signals of an incoming candidate document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateProbe {
    ico: String,
    variable_symbol: Option<String>,
    amount_with_vat: Option<Decimal>,
}

impl DuplicateProbe {
    /// Builds a probe from raw candidate fields, normalizing as it goes.
    #[must_use]
    pub fn new(
        ico: Option<&str>,
        variable_symbol: Option<&str>,
        amount_with_vat: Option<Decimal>,
    ) -> Self {
        let variable_symbol = variable_symbol
            .map(normalize_variable_symbol)
            .filter(|vs| !vs.is_empty());
        Self {
            ico: ico.map(normalize_ico).unwrap_or_default(),
            variable_symbol,
            amount_with_vat,
        }
    }

    /// Checks the candidate against existing invoices in the same project.
    ///
    /// Without a vendor identity (empty IČO) there is nothing to match
    /// on. With a variable symbol, only the `(ico, variable_symbol)`
    /// pair counts; the amount fallback applies only when the candidate
    /// has no variable symbol at all.
    #[must_use]
    pub fn find_match(&self, existing: &[InvoiceKey]) -> Option<MatchStrength> {
        if self.ico.is_empty() {
            return None;
        }

        let same_vendor = |key: &&InvoiceKey| key.ico.as_deref() == Some(self.ico.as_str());

        if let Some(vs) = &self.variable_symbol {
            return existing
                .iter()
                .filter(same_vendor)
                .any(|key| key.variable_symbol.as_deref() == Some(vs.as_str()))
                .then_some(MatchStrength::Strong);
        }

        if let Some(amount) = self.amount_with_vat {
            return existing
                .iter()
                .filter(same_vendor)
                .any(|key| key.amount_with_vat == Some(amount))
                .then_some(MatchStrength::Weak);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn existing(ico: &str, vs: Option<&str>, amount: Option<Decimal>) -> InvoiceKey {
        InvoiceKey {
            ico: Some(ico.to_string()),
            variable_symbol: vs.map(ToString::to_string),
            amount_with_vat: amount,
        }
    }

    #[test]
    fn test_normalize_ico_keeps_digits_only() {
        assert_eq!(normalize_ico("CZ 123 45 678"), "12345678");
        assert_eq!(normalize_ico("12345678"), "12345678");
        assert_eq!(normalize_ico("n/a"), "");
    }

    #[test]
    fn test_normalize_variable_symbol_strips_whitespace() {
        assert_eq!(normalize_variable_symbol(" 2024 0100 "), "20240100");
    }

    #[test]
    fn test_same_ico_and_vs_is_strong_match() {
        let keys = vec![existing("12345678", Some("100"), Some(dec!(5000)))];
        let probe = DuplicateProbe::new(Some("123 45 678"), Some(" 100"), None);
        assert_eq!(probe.find_match(&keys), Some(MatchStrength::Strong));
    }

    #[test]
    fn test_same_ico_different_vs_no_amount_is_clean() {
        let keys = vec![existing("12345678", Some("100"), Some(dec!(5000)))];
        let probe = DuplicateProbe::new(Some("12345678"), Some("200"), None);
        assert_eq!(probe.find_match(&keys), None);
    }

    #[test]
    fn test_amount_fallback_is_weak_match() {
        let keys = vec![existing("12345678", None, Some(dec!(5000)))];
        let probe = DuplicateProbe::new(Some("12345678"), None, Some(dec!(5000)));
        assert_eq!(probe.find_match(&keys), Some(MatchStrength::Weak));
    }

    #[test]
    fn test_vs_present_skips_amount_fallback() {
        // Same vendor and amount, but the candidate carries a VS that
        // matches nothing, so it is not a duplicate.
        let keys = vec![existing("12345678", Some("100"), Some(dec!(5000)))];
        let probe = DuplicateProbe::new(Some("12345678"), Some("999"), Some(dec!(5000)));
        assert_eq!(probe.find_match(&keys), None);
    }

    #[test]
    fn test_empty_ico_never_matches() {
        let keys = vec![existing("", Some("100"), Some(dec!(5000)))];
        let probe = DuplicateProbe::new(Some("n/a"), Some("100"), Some(dec!(5000)));
        assert_eq!(probe.find_match(&keys), None);
    }

    #[test]
    fn test_no_signals_is_clean() {
        let keys = vec![existing("12345678", Some("100"), Some(dec!(5000)))];
        let probe = DuplicateProbe::new(Some("12345678"), None, None);
        assert_eq!(probe.find_match(&keys), None);
    }
}
