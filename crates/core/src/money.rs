//! Monetary value formatting for form fields.
//!
//! All amounts are counts of minor currency units (cents), which keeps
//! the tax arithmetic out of floating point. Inputs may still carry a
//! fractional part from upstream rate conversions; both functions
//! round before formatting and never let a carry show up as `100` in
//! the decimal slot.

/// Decimal and thousands separators for [`format_money`].
#[derive(Debug, Clone)]
pub struct Separators {
    pub decimal: String,
    pub thousand: String,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            decimal: ",".to_string(),
            thousand: " ".to_string(),
        }
    }
}

/// Format a minor-unit amount as a display string, e.g.
/// `format_money(199_99.0, "€", &Separators::default())` is
/// `"€ 199,99"`.
///
/// The amount is rounded up (ceiling) to the nearest minor unit, so a
/// partially-converted value never understates the tax due. The whole
/// part is grouped in threes from the right; the currency symbol and
/// one space are prefixed when the symbol is non-empty.
pub fn format_money(minor_units: f64, currency: &str, seps: &Separators) -> String {
    let cents = minor_units.ceil() as i64;
    let whole = cents / 100;
    let decimals = cents % 100;
    let grouped = group_thousands(whole, &seps.thousand);
    let prefix = if currency.is_empty() {
        String::new()
    } else {
        format!("{currency} ")
    };
    format!("{prefix}{grouped}{}{decimals:02}", seps.decimal)
}

/// Split a minor-unit amount for a form with one fixed 2-digit
/// decimal box followed by 3-digit whole-number boxes laid out right
/// to left.
///
/// The first element is always the 2-digit decimal string; the
/// remaining elements are whole-part groups, least significant first.
/// The sign is ignored and empty leading groups are never produced:
/// `split_money_value_for_form_field(123456.0)` is
/// `["56", "234", "1"]`, and an amount below one whole unit yields
/// only the decimal string.
pub fn split_money_value_for_form_field(minor_units: f64) -> Vec<String> {
    let value = minor_units.abs();
    let mut whole = (value / 100.0).floor() as i64;
    let mut decimals = (value - (whole as f64) * 100.0).round() as i64;
    if decimals >= 100 {
        decimals -= 100;
        whole += 1;
    }
    let mut parts = vec![format!("{decimals:02}")];
    let digits = whole.to_string();
    if whole > 0 {
        let bytes = digits.as_bytes();
        let mut end = bytes.len();
        while end > 0 {
            let start = end.saturating_sub(3);
            parts.push(digits[start..end].to_string());
            end = start;
        }
    }
    parts
}

fn group_thousands(value: i64, separator: &str) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(v: f64) -> String {
        format_money(v, "€", &Separators::default())
    }

    #[test]
    fn formats_exact_amounts() {
        assert_eq!(fmt(1_00.0), "€ 1,00");
        assert_eq!(fmt(1_01.0), "€ 1,01");
        assert_eq!(fmt(1_10.0), "€ 1,10");
        assert_eq!(fmt(199_99.0), "€ 199,99");
        assert_eq!(fmt(999_99.0), "€ 999,99");
    }

    #[test]
    fn rounds_up_and_carries() {
        assert_eq!(fmt(1_00.1), "€ 1,01");
        assert_eq!(fmt(1_99.99), "€ 2,00");
        assert_eq!(fmt(999_99.9), "€ 1 000,00");
    }

    #[test]
    fn separator_options() {
        let dot = Separators {
            decimal: ".".to_string(),
            thousand: ",".to_string(),
        };
        assert_eq!(format_money(1000_00.0, "$", &dot), "$ 1,000.00");
        assert_eq!(format_money(1_99.0, "", &dot), "1.99");
        let de = Separators {
            decimal: ",".to_string(),
            thousand: ".".to_string(),
        };
        assert_eq!(format_money(1000_00.0, "", &de), "1.000,00");
    }

    #[test]
    fn splits_into_boxes() {
        assert_eq!(split_money_value_for_form_field(0.0), vec!["00"]);
        assert_eq!(
            split_money_value_for_form_field(123456.0),
            vec!["56", "234", "1"]
        );
        assert_eq!(split_money_value_for_form_field(-50.0), vec!["50"]);
        assert_eq!(split_money_value_for_form_field(999.0), vec!["99", "9"]);
    }

    #[test]
    fn split_carries_rounded_decimals() {
        // the decimal part 99.9 rounds up into the next whole unit
        assert_eq!(split_money_value_for_form_field(1_99.9), vec!["00", "2"]);
    }
}
