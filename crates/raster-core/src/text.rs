//! Text placement utilities

use crate::Align;

/// Left edge of a line `text_width` wide inside `container_width`
pub fn calculate_x_offset(text_width: f64, container_width: f64, align: Align) -> f64 {
    match align {
        Align::Left => 0.0,
        Align::Center => (container_width - text_width) / 2.0,
        Align::Right => container_width - text_width,
    }
}

/// Baselines for `count` lines stacked `line_height` apart, centered on `center_y`
///
/// The first baseline sits at `center_y - (count - 1) * line_height / 2`.
pub fn baseline_positions(count: usize, center_y: f64, line_height: f64) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let total = (count - 1) as f64 * line_height;
    let start = center_y - total / 2.0;
    (0..count).map(|i| start + i as f64 * line_height).collect()
}
