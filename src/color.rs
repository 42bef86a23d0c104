//! Score-to-color mapping shared by the label and prediction columns.
//!
//! Both ground truth and model output go through [`color_for`] so the two
//! columns can be compared at a glance.

use egui::Color32;

/// Color used for scores at or below 0.0.
pub const NORMAL_COLOR: Color32 = Color32::from_rgb(46, 139, 87);
/// Color used for scores at or above 1.0.
pub const ANOMALY_COLOR: Color32 = Color32::from_rgb(214, 39, 40);
/// Color used when the score is not a number.
pub const UNSCORED_COLOR: Color32 = Color32::from_rgb(120, 124, 130);

/// Map an anomaly score in `[0, 1]` to a display color.
///
/// Out-of-range scores are clamped and `NaN` maps to [`UNSCORED_COLOR`], so the
/// function is total over `f64`.
pub fn color_for(score: f64) -> Color32 {
    if score.is_nan() {
        return UNSCORED_COLOR;
    }
    let t = score.clamp(0.0, 1.0) as f32;
    blend(NORMAL_COLOR, ANOMALY_COLOR, t)
}

/// Parse a JSON cell into a score, accepting numbers, numeric strings and booleans.
pub fn score_of(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse::<f64>().ok(),
        serde_json::Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn blend(from: Color32, to: Color32, t: f32) -> Color32 {
    let channel = |a: u8, b: u8| -> u8 {
        (a as f32 + (b as f32 - a as f32) * t)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Color32::from_rgb(
        channel(from.r(), to.r()),
        channel(from.g(), to.g()),
        channel(from.b(), to.b()),
    )
}
