//! Conversion arithmetic shared by both input directions

/// Number of decimal places kept in every conversion result
pub const RESULT_DECIMALS: i32 = 6;

/// Rounds to [`RESULT_DECIMALS`] places, half away from zero.
pub fn round_to_precision(value: f64) -> f64 {
    let factor = 10f64.powi(RESULT_DECIMALS);
    let scaled = value * factor;
    // Too large to carry six decimals anyway
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Converts `value` expressed in a unit with `from_rate` into a unit with `to_rate`.
///
/// Both directions of the widget use this with the rates swapped.
pub fn convert_rates(value: f64, from_rate: f64, to_rate: f64) -> f64 {
    round_to_precision(value * from_rate / to_rate)
}

/// Parses a text field value.
///
/// Returns `None` for blank or non-numeric input so the other field is
/// cleared instead of reporting an error while the user is still typing.
pub fn parse_input(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Formats a result for display without trailing zeros (`5.000000` -> `5`).
pub fn format_value(value: f64) -> String {
    let formatted = format!("{:.*}", RESULT_DECIMALS as usize, value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}
