use crate::core::config::Price;

pub const DEFAULT_CURRENCY: &str = "¥";

/// Renders an amount for display, e.g. `¥1,200` or `¥12.5`.
///
/// Amounts are rounded to cents; a zero fractional part is left out.
pub fn format_money(amount: Price, symbol: &str) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let mut out = String::new();
    if amount < 0.0 && cents > 0 {
        out.push('-');
    }
    out.push_str(symbol);
    out.push_str(&group_thousands(whole));
    if fraction != 0 {
        let digits = format!("{:02}", fraction);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    return out;
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    return grouped;
}
