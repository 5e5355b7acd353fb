use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const BYTES_PER_MEBIBYTE: f64 = 1024.0 * 1024.0;

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

/// One fractional digit and a `%` suffix. Values are not clamped.
///
/// Rounding is Rust's: the exact binary value of the `f64` is rounded to the
/// nearest decimal, ties to even. `42.05` is stored as 42.04999… and renders
/// as `42.0%`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Byte count as mebibytes (divided by 1024²) with two fractional digits.
pub fn format_megabytes(bytes: f64) -> String {
    format!("{:.2} MB", bytes / BYTES_PER_MEBIBYTE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_has_one_fractional_digit() {
        assert_eq!(format_percent(100.0), "100.0%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(12.34), "12.3%");
        assert_eq!(format_percent(7.0), "7.0%");
    }

    #[test]
    fn percent_rounds_binary_value() {
        assert_eq!(format_percent(42.05), "42.0%");
        assert_eq!(format_percent(42.06), "42.1%");
        assert_eq!(format_percent(99.96), "100.0%");
    }

    #[test]
    fn percent_is_not_clamped() {
        assert_eq!(format_percent(250.0), "250.0%");
    }

    #[test]
    fn megabytes_divide_by_mebibyte() {
        assert_eq!(format_megabytes(0.0), "0.00 MB");
        assert_eq!(format_megabytes(1_048_576.0), "1.00 MB");
        assert_eq!(format_megabytes(5_242_880.0), "5.00 MB");
        assert_eq!(format_megabytes(1_572_864.0), "1.50 MB");
        assert_eq!(format_megabytes(512.0), "0.00 MB");
    }

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_unicode("firefox", 10), "firefox");
        assert_eq!(truncate_unicode("firefox-esr", 8), "firefox\u{2026}");
    }

    #[test]
    fn truncate_wide_chars() {
        assert_eq!(truncate_unicode("日本語", 4), "日\u{2026}");
    }
}
