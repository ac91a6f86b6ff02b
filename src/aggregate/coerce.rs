//! Best-effort numeric parsing for upstream fields.

/// Parse an upstream numeric field.
///
/// Thousands separators are stripped first (`"1,234.5"` -> `1234.5`).
/// Returns `None` for absent, blank, unparsable (`"N/A"`, `"null"`, `"."`) and
/// non-finite values; the caller skips the record.
pub fn coerce_number(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|&c| c != ',').collect();
    let v = cleaned.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Round half away from zero to `decimals` places.
///
/// Applied once, when building output records, never to intermediate sums.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
