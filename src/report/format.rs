//! Number formatting for the newsletter

/// `1234567.891` with 2 decimals -> `1,234,567.89`
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(raw.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = raw.bytes().all(|b| b == b'0' || b == b'.');
    if value.is_sign_negative() && !is_zero {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// `$4.21B`, `$812.3M`, `$45.0K`, `$999.99`
pub fn fmt_usd(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("${:.2}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("${:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.1}K", value / 1_000.0)
    } else {
        format!("${:.2}", value)
    }
}

/// `27.41M ETH`, `950K ETH`, `812 ETH`
pub fn fmt_eth(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.2}M ETH", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.0}K ETH", value / 1_000.0)
    } else {
        format!("{} ETH", group_thousands(value, 0))
    }
}

/// Signed percentage with one decimal, `N/A` when there is none
pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.1}%", v),
        None => "N/A".to_string(),
    }
}

/// One decimal with an explicit `+` on gains only: `+12.5`, `-3.0`, `0.0`
pub fn fmt_change(value: f64) -> String {
    if value > 0.0 {
        format!("+{:.1}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0, 0), "0");
        assert_eq!(group_thousands(999.0, 0), "999");
        assert_eq!(group_thousands(1_000.0, 0), "1,000");
        assert_eq!(group_thousands(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(group_thousands(123_456.0, 0), "123,456");
        assert_eq!(group_thousands(-9_876.5, 1), "-9,876.5");
        assert_eq!(group_thousands(-0.001, 2), "0.00");
    }

    #[test]
    fn test_fmt_usd_tiers() {
        assert_eq!(fmt_usd(4_213_000_000.0), "$4.21B");
        assert_eq!(fmt_usd(812_340_000.0), "$812.3M");
        assert_eq!(fmt_usd(45_000.0), "$45.0K");
        assert_eq!(fmt_usd(999.994), "$999.99");
    }

    #[test]
    fn test_fmt_eth_tiers() {
        assert_eq!(fmt_eth(27_412_000.0), "27.41M ETH");
        assert_eq!(fmt_eth(950_200.0), "950K ETH");
        assert_eq!(fmt_eth(812.4), "812 ETH");
    }

    #[test]
    fn test_fmt_pct() {
        assert_eq!(fmt_pct(Some(12.345)), "+12.3%");
        assert_eq!(fmt_pct(Some(-4.0)), "-4.0%");
        assert_eq!(fmt_pct(None), "N/A");
    }

    #[test]
    fn test_fmt_change() {
        assert_eq!(fmt_change(12.54), "+12.5");
        assert_eq!(fmt_change(-3.0), "-3.0");
        assert_eq!(fmt_change(0.0), "0.0");
    }
}
