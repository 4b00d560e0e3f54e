//! CSV budget definition parser.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::error::BudgetParseError;
use super::types::ParsedBudgetLine;

/// Stateless parser for uploaded budget definitions.
pub struct BudgetParser;

impl BudgetParser {
    /// Parses a raw budget CSV into budget lines.
    ///
    /// Header matching is case-insensitive. A row is usable only when it
    /// carries a non-empty account number, a non-empty category number,
    /// and a parseable amount; other rows (section headers, subtotals,
    /// blank padding) are skipped without failing the upload.
    ///
    /// # Errors
    ///
    /// Returns `BudgetParseError::MissingColumn` when a required column
    /// is absent, and `BudgetParseError::NoValidLines` when every data
    /// row was skipped.
    pub fn parse(raw: &str) -> Result<Vec<ParsedBudgetLine>, BudgetParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(raw.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| BudgetParseError::Malformed(e.to_string()))?
            .clone();

        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let account_number =
            column("account_number").ok_or(BudgetParseError::MissingColumn("account_number"))?;
        let category_number =
            column("category_number").ok_or(BudgetParseError::MissingColumn("category_number"))?;
        let amount = column("amount").ok_or(BudgetParseError::MissingColumn("amount"))?;
        // Descriptions are nice-to-have; exports from older accounting
        // tools omit them.
        let account_description = column("account_description");
        let category_description = column("category_description");

        let mut rows_seen = 0usize;
        let mut lines = Vec::new();

        for record in reader.records() {
            rows_seen += 1;
            let Ok(record) = record else {
                continue;
            };

            let cell = |idx: usize| record.get(idx).unwrap_or("").trim();
            let optional_cell =
                |idx: Option<usize>| idx.map(cell).unwrap_or_default().to_string();

            let account = cell(account_number);
            let category = cell(category_number);
            if account.is_empty() || category.is_empty() {
                continue;
            }
            let Some(amount) = parse_amount(cell(amount)) else {
                continue;
            };

            lines.push(ParsedBudgetLine {
                account_number: account.to_string(),
                account_description: optional_cell(account_description),
                category_number: category.to_string(),
                category_description: optional_cell(category_description),
                amount,
            });
        }

        if lines.is_empty() {
            return Err(BudgetParseError::NoValidLines { rows_seen });
        }
        Ok(lines)
    }
}

/// Parses a budget amount, tolerating Czech number formatting:
/// `1 234 567,89` (space thousands separators, decimal comma).
fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    const VALID_CSV: &str = "\
account_number,account_description,category_number,category_description,amount
1101,Director fee,11,Above the line,500000
1102,Casting,11,Above the line,75000.50
2201,Camera rental,22,Production,1200000";

    #[test]
    fn test_parses_all_valid_rows() {
        let lines = BudgetParser::parse(VALID_CSV).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].account_number, "1101");
        assert_eq!(lines[0].category_description, "Above the line");
        assert_eq!(lines[1].amount, dec!(75000.50));
    }

    #[test]
    fn test_headers_match_case_insensitively() {
        let csv = "\
Account_Number,ACCOUNT_DESCRIPTION,Category_Number,category_description,AMOUNT
1101,Director fee,11,Above the line,500000";
        let lines = BudgetParser::parse(csv).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_czech_number_formatting() {
        let csv = "\
account_number,category_number,amount
1101,11,\"1 234 567,89\"";
        let lines = BudgetParser::parse(csv).unwrap();
        assert_eq!(lines[0].amount, dec!(1234567.89));
        assert_eq!(lines[0].account_description, "");
    }

    #[test]
    fn test_skips_unusable_rows() {
        let csv = "\
account_number,account_description,category_number,category_description,amount
,Section header,,,
1101,Director fee,11,Above the line,500000
1102,Missing category,,Above the line,1000
1103,Bad amount,11,Above the line,abc
SUBTOTAL,,,,575000";
        let lines = BudgetParser::parse(csv).unwrap();
        // The subtotal row has an account number but no category.
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].account_number, "1101");
    }

    #[test]
    fn test_zero_valid_lines_rejects_upload() {
        let csv = "\
account_number,category_number,amount
,,
,11,100";
        let err = BudgetParser::parse(csv).unwrap_err();
        assert!(matches!(
            err,
            BudgetParseError::NoValidLines { rows_seen: 2 }
        ));
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "account,category_number,amount\n1101,11,100";
        let err = BudgetParser::parse(csv).unwrap_err();
        assert!(matches!(
            err,
            BudgetParseError::MissingColumn("account_number")
        ));
    }

    #[rstest]
    #[case("500000", dec!(500000))]
    #[case("75000.50", dec!(75000.50))]
    #[case("1 234 567,89", dec!(1234567.89))]
    #[case("-5 000,25", dec!(-5000.25))]
    fn test_parse_amount_formats(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount(raw), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("abc")]
    #[case("1.2.3")]
    fn test_parse_amount_rejects_garbage(#[case] raw: &str) {
        assert_eq!(parse_amount(raw), None);
    }

    #[test]
    fn test_negative_amounts_are_kept() {
        let csv = "\
account_number,category_number,amount
1101,11,\"-5 000,25\"";
        let lines = BudgetParser::parse(csv).unwrap();
        assert_eq!(lines[0].amount, dec!(-5000.25));
    }
}
