/// Compact dollar amount: `$1.23B`, `$4.56M`, `$7.89K`, `$12.34`.
pub fn format_market_cap(value: f64) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    if abs >= 1_000_000_000.0 {
        format!("{}${:.2}B", sign, abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{}${:.2}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{}${:.2}K", sign, abs / 1_000.0)
    } else {
        format!("{}${:.2}", sign, abs)
    }
}

/// `BONK` -> `$BONK`. Already-tagged and empty symbols are left alone.
pub fn symbol_tag(symbol: &str) -> String {
    let symbol = symbol.trim();
    if symbol.is_empty() || symbol.starts_with('$') {
        symbol.to_string()
    } else {
        format!("${}", symbol)
    }
}

pub fn format_multiple(multiple: f64) -> String {
    format!("{:.2}x", multiple)
}

pub fn format_percent(value: f64) -> String {
    format!("{:+.1}%", value)
}
