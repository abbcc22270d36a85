//! CSV rendering for conversion tables.

use crate::rates::ConversionRow;

/// Renders rows as CSV with a header line. No rows means no output at all,
/// not a lone header.
pub fn format_rows(rows: &[ConversionRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut out = String::from("From Currency,To Currency,Exchange Rate,Date\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{}\n",
            row.from.to_uppercase(),
            row.to.to_uppercase(),
            row.rate,
            row.date
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn row(from: &str, to: &str, rate: &str, date: &str) -> ConversionRow {
        ConversionRow {
            from: from.to_string(),
            to: to.to_string(),
            rate: rate.parse().unwrap(),
            date: date.to_string(),
        }
    }

    #[test]
    fn test_empty_rows_render_nothing() {
        assert_eq!(format_rows(&[]), "");
    }

    #[test]
    fn test_rows_render_with_header_and_uppercase_codes() {
        let rows = vec![
            row("usd", "eur", "0.92", "2024-03-06"),
            row("usd", "gbp", "0.79", "2024-03-06"),
        ];

        assert_eq!(
            format_rows(&rows),
            "From Currency,To Currency,Exchange Rate,Date\n\
             USD,EUR,0.92,2024-03-06\n\
             USD,GBP,0.79,2024-03-06\n"
        );
    }

    #[test]
    fn test_sentinel_row_renders_as_is() {
        let rows = vec![ConversionRow {
            from: "usd".to_string(),
            to: "xxx".to_string(),
            rate: Decimal::ZERO,
            date: "N/A".to_string(),
        }];

        assert_eq!(
            format_rows(&rows),
            "From Currency,To Currency,Exchange Rate,Date\nUSD,XXX,0,N/A\n"
        );
    }
}
