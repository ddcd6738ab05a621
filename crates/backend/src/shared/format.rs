/// Placeholder shown for undefined values
pub const MISSING: &str = "—";

/// Formats a non-negative integer with comma thousands separators
///
/// # Examples
/// ```ignore
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    group_thousands(&n.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// `1234.5` with `decimals = 2` -> `"1,234.50"`; the sign is kept.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let mut out = String::new();
    // "-0" is not worth a sign
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Whole-dollar amount: `"$1,235"`.
pub fn format_money0(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| money(v, 0))
}

/// Dollar amount with cents: `"$12.35"`.
pub fn format_money2(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| money(v, 2))
}

fn money(v: f64, decimals: usize) -> String {
    let grouped = format_grouped(v, decimals);
    match grouped.strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${grouped}"),
    }
}

/// Plain decimal with two places: `"1.50"`.
pub fn format_ratio2(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format_grouped(v, 2))
}

/// Signed percent change: `"+12.3%"`, `"-4.0%"`.
pub fn format_signed_pct1(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{:+.1}%", v))
}

/// Share percentage: `"45.6%"`.
pub fn format_pct1(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{:.1}%", v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money0(Some(1234.6)), "$1,235");
        assert_eq!(format_money0(Some(0.0)), "$0");
        assert_eq!(format_money0(Some(-2500.0)), "-$2,500");
        assert_eq!(format_money0(None), MISSING);
        assert_eq!(format_money2(Some(12.346)), "$12.35");
        assert_eq!(format_money2(Some(1000000.0)), "$1,000,000.00");
    }

    #[test]
    fn test_format_ratios_and_percents() {
        assert_eq!(format_ratio2(Some(1.5)), "1.50");
        assert_eq!(format_ratio2(None), MISSING);
        assert_eq!(format_signed_pct1(Some(12.34)), "+12.3%");
        assert_eq!(format_signed_pct1(Some(-4.0)), "-4.0%");
        assert_eq!(format_signed_pct1(None), MISSING);
        assert_eq!(format_pct1(Some(45.61)), "45.6%");
    }

    #[test]
    fn test_format_grouped_drops_negative_zero() {
        assert_eq!(format_grouped(-0.001, 2), "0.00");
        assert_eq!(format_grouped(-1234.5, 1), "-1,234.5");
    }
}
