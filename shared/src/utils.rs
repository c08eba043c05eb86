// Display helpers shared by export and preview. Values fed back into any
// computation must stay unrounded.

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Rounded value as text, without trailing zero padding.
pub fn format_rounded(value: f64, decimals: u32) -> String {
    let rounded = round_to(value, decimals);
    // Avoid printing "-0"
    if rounded == 0.0 {
        return "0".to_string();
    }
    rounded.to_string()
}
