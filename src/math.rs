//! Circular-angle utilities for the smooth-compass library

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Degrees in a full turn
pub const FULL_CIRCLE: f32 = 360.0;

/// Proximity to the 0°/360° boundary within which wraparound is considered
const ZERO_POINT_THRESHOLD: f32 = 20.0;

/// Normalizes a heading into the `[0, 360]` range
///
/// Adds or subtracts full circles until the value lies in range. Values
/// already in `[0, 360]` are returned unchanged, so every heading in
/// `[0, 360)` is a fixed point.
///
/// # Example
/// ```
/// use smooth_compass::wrap_degrees;
///
/// assert_eq!(wrap_degrees(45.0), 45.0);
/// assert_eq!(wrap_degrees(-10.0), 350.0);
/// assert_eq!(wrap_degrees(725.0), 5.0);
/// ```
pub fn wrap_degrees(mut heading: f32) -> f32 {
    while heading < 0.0 {
        heading += FULL_CIRCLE;
    }
    while heading > FULL_CIRCLE {
        heading -= FULL_CIRCLE;
    }
    heading
}

/// Angular distance between two headings, aware of the 0°/360° boundary
///
/// A direct `|a - b|`, except when one heading lies within 20° of 0 and the
/// other within 20° of 360. In that case the near-360 operand is reflected
/// across the boundary before differencing, so headings that are physically
/// close but numerically far apart report a small error.
///
/// # Example
/// ```
/// use smooth_compass::circular_distance;
///
/// assert_eq!(circular_distance(90.0, 100.0), 10.0);
/// assert_eq!(circular_distance(359.0, 2.0), 3.0);
/// assert_eq!(circular_distance(350.0, 5.0), 15.0);
/// ```
pub fn circular_distance(a: f32, b: f32) -> f32 {
    if a > FULL_CIRCLE - ZERO_POINT_THRESHOLD && b < ZERO_POINT_THRESHOLD {
        ((a - FULL_CIRCLE) - b).abs()
    } else if b > FULL_CIRCLE - ZERO_POINT_THRESHOLD && a < ZERO_POINT_THRESHOLD {
        ((b - FULL_CIRCLE) - a).abs()
    } else {
        (a - b).abs()
    }
}

/// Whether `first` lies ahead of `second` going the short way around
///
/// Used to choose the direction of a nudge toward the compass reading.
pub fn is_after(first: f32, second: f32) -> bool {
    let mut diff = second - first;
    if diff < 0.0 {
        diff += FULL_CIRCLE;
    }
    diff > FULL_CIRCLE / 2.0
}
