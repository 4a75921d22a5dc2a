//! Four-quadrant test pattern for checking a surface end to end.

use mrh_core::{DataPoint, Viewport};

pub const PATTERN_VALUES: [f64; 4] = [-8.0, -3.0, 3.0, 8.0];

/// Split the viewport into quadrants valued -8 (upper left), -3 (upper right),
/// 3 (lower left) and 8 (lower right).
pub fn test_pattern(viewport: &Viewport) -> Vec<DataPoint> {
    let mid_x = viewport.start1 + viewport.width() / 2;
    let mid_y = viewport.start2 + viewport.height() / 2;
    let [ul, ur, ll, lr] = PATTERN_VALUES;
    vec![
        DataPoint::new(viewport.start1, viewport.start2, mid_x, mid_y, ul),
        DataPoint::new(mid_x, viewport.start2, viewport.stop1, mid_y, ur),
        DataPoint::new(viewport.start1, mid_y, mid_x, viewport.stop2, ll),
        DataPoint::new(mid_x, mid_y, viewport.stop1, viewport.stop2, lr),
    ]
}
