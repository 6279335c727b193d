//! Shared utility functions for the Kasi crate.

/// Shown wherever a record has no image.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Resolve a stored media URL for display.
///
/// Absolute `http(s)` URLs pass through untouched. Relative paths are joined
/// to `file_server_base` with exactly one `/` between them. An empty URL
/// yields [`PLACEHOLDER_IMAGE`].
pub fn format_image_url(file_server_base: &str, url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return PLACEHOLDER_IMAGE.to_string();
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    format!(
        "{}/{}",
        file_server_base.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

/// Format an amount in the shop currency (FCFA, no decimals).
pub fn format_price(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{}{} FCFA", sign, grouped)
}
