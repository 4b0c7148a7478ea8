//! Progress percentages.

/// Clamp a raw progress value to a whole percentage in `0..=100`. NaN counts as zero.
pub fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}

/// `"42%"`.
pub fn percent_label(value: f64) -> String {
    format!("{}%", clamp_percent(value))
}

/// Fixed-width text bar, e.g. `[#####-----]` for 50 % at width 10.
pub fn text_bar(value: f64, width: usize) -> String {
    let filled = width * usize::from(clamp_percent(value)) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(percent_label(-10.0), "0%");
        assert_eq!(percent_label(150.0), "100%");
        assert_eq!(percent_label(42.0), "42%");
        assert_eq!(clamp_percent(f64::NAN), 0);
        assert_eq!(clamp_percent(99.6), 100);
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(text_bar(50.0, 10), "[#####-----]");
        assert_eq!(text_bar(-3.0, 4), "[----]");
        assert_eq!(text_bar(400.0, 4), "[####]");
    }
}
