//! Heading fusion engine for the smooth-compass library

use alloc::boxed::Box;
use alloc::vec::Vec;

use nalgebra::Vector3;

use crate::math::{FULL_CIRCLE, RAD_TO_DEG, circular_distance, is_after, wrap_degrees};
use crate::types::{FusionSettings, FusionStates, Heading, RotationAxis};

/// Fixed step in degrees applied per sample when nudging the integrated
/// heading toward the compass reading
const COMPASS_APPROACH_SPEED: f32 = 0.25;

/// Heading fusion engine
///
/// Fuses raw compass headings with gyroscope-integrated rotation: the
/// gyroscope path owns the output for moment-to-moment smoothness while the
/// compass continuously corrects accumulated drift. The correction policy
/// per gyroscope sample is:
///
/// - divergence at or above `too_much_error`: snap to the raw compass value
/// - divergence above `tolerated_error`: nudge 0.25° toward the compass
/// - otherwise: trust the integrated heading unmodified
///
/// The engine is a single-writer region. All entry points take `&mut self`;
/// a host delivering sensor callbacks from multiple threads must serialize
/// them (one lock around all three, or one processing queue). No operation
/// blocks.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use smooth_compass::HeadingFusion;
///
/// let mut fusion = HeadingFusion::new(true);
///
/// // First compass fix anchors the output
/// let reading = fusion.compass_changed(120.0);
/// assert_eq!(reading.smooth_value, 120.0);
///
/// // Accelerometer selects the dominant axis, gyroscope drives the output
/// fusion.accelerometer_changed(Vector3::new(0.1, 0.9, 0.4));
/// fusion.gyroscope_changed(Vector3::new(0.5, 0.0, 0.0));
/// ```
pub struct HeadingFusion {
    /// Algorithm settings
    settings: FusionSettings,
    /// Whether gyroscope and accelerometer collaborators exist; false puts
    /// the engine in compass-only passthrough mode for its lifetime
    motion_sensors_available: bool,
    /// Dominant gyroscope axis, switched on accelerometer samples
    rotation_axis: RotationAxis,
    /// Latest raw compass heading; `None` until the first fix
    latest_compass_heading: Option<f32>,
    /// Heading baseline at the last reset
    reference_heading: f32,
    /// Signed cumulative integrated rotation since the last reset
    accumulated_rotation: f32,
    /// Current smoothed output heading
    smooth_heading: f32,
    /// Last computed divergence between raw and smoothed heading
    current_error: f32,
    /// Subscribers notified, in registration order, after each accepted sample
    subscribers: Vec<Box<dyn FnMut(Heading)>>,
}

impl HeadingFusion {
    /// Create a new fusion engine with default settings
    ///
    /// `motion_sensors_available` is supplied by the caller after probing
    /// the gyroscope and accelerometer collaborators and is immutable for
    /// the engine's lifetime. When false, every compass sample passes
    /// through unmodified and motion samples are ignored.
    pub fn new(motion_sensors_available: bool) -> Self {
        Self::with_settings(motion_sensors_available, FusionSettings::default())
    }

    /// Create a new fusion engine with specified settings
    pub fn with_settings(motion_sensors_available: bool, settings: FusionSettings) -> Self {
        HeadingFusion {
            settings,
            motion_sensors_available,
            rotation_axis: RotationAxis::None,
            latest_compass_heading: None,
            reference_heading: 0.0,
            accumulated_rotation: 0.0,
            smooth_heading: 0.0,
            current_error: 0.0,
            subscribers: Vec::new(),
        }
    }

    /// Update algorithm settings
    pub fn set_settings(&mut self, settings: FusionSettings) {
        self.settings = settings;
    }

    /// Get current algorithm settings
    pub fn settings(&self) -> FusionSettings {
        self.settings
    }

    /// Process a raw compass sample
    ///
    /// The first sample ever received anchors the smoothed output directly.
    /// Afterwards, when motion sensors exist, the gyroscope path owns the
    /// output and this call only refreshes the raw value and the divergence
    /// diagnostic.
    ///
    /// # Arguments
    /// * `heading` - Raw compass heading in degrees, `[0, 360)`
    pub fn compass_changed(&mut self, heading: f32) -> Heading {
        let first_time = self.latest_compass_heading.is_none();
        self.latest_compass_heading = Some(heading);

        if first_time || !self.motion_sensors_available {
            self.smooth_heading = heading;
        }

        // No wraparound correction here, unlike the gyroscope path
        self.current_error = (heading - self.smooth_heading).abs();

        self.notify(heading)
    }

    /// Process an accelerometer sample
    ///
    /// Selects the dominant rotation axis from the gravity vector. When the
    /// selection changes, the rotation integral accumulated under the old
    /// axis is invalid, so the engine re-anchors to the last compass value
    /// and emits the re-anchored reading.
    ///
    /// # Arguments
    /// * `vector` - Linear acceleration in the sensor's native units
    pub fn accelerometer_changed(&mut self, vector: Vector3<f32>) -> Option<Heading> {
        // Ties resolve X, then Y, then Z
        let new_axis = if vector.x <= vector.y && vector.x <= vector.z {
            RotationAxis::X
        } else if vector.y <= vector.z {
            RotationAxis::Y
        } else {
            RotationAxis::Z
        };

        if new_axis == self.rotation_axis {
            return None;
        }

        self.rotation_axis = new_axis;
        self.reset()
    }

    /// Process a gyroscope sample
    ///
    /// Ignored entirely until a compass fix exists. Otherwise integrates the
    /// per-sample rotation delta, measures divergence from the raw compass
    /// heading, applies the snap/nudge/accept correction policy, and emits.
    ///
    /// # Arguments
    /// * `vector` - Angular rate in radians per second, per axis
    pub fn gyroscope_changed(&mut self, vector: Vector3<f32>) -> Option<Heading> {
        let latest = self.latest_compass_heading?;

        let delta = self.rotation_delta(vector);

        let mut new_heading =
            wrap_degrees(self.reference_heading + self.accumulated_rotation - delta);
        let error = circular_distance(latest, new_heading);

        // The integrator always advances, even when the output snaps
        self.accumulated_rotation -= delta;

        if error >= self.settings.too_much_error {
            // Gyroscope has diverged too far; trust the compass completely
            new_heading = latest;
        } else if error > self.settings.tolerated_error {
            // Pull toward the compass reading, and remember the pull in the
            // integrator so it is not fought on the next sample
            if is_after(new_heading, latest) {
                new_heading -= COMPASS_APPROACH_SPEED;
                self.accumulated_rotation -= COMPASS_APPROACH_SPEED;
            } else {
                new_heading += COMPASS_APPROACH_SPEED;
                self.accumulated_rotation += COMPASS_APPROACH_SPEED;
            }

            new_heading = new_heading.clamp(0.0, FULL_CIRCLE);
        }

        self.smooth_heading = new_heading;
        self.current_error = error;

        Some(self.notify(latest))
    }

    /// Subscribe to heading readings
    ///
    /// The callback runs after every accepted sample, after the engine's
    /// state has been updated. Subscribers are invoked in registration
    /// order; emission order is FIFO relative to accepted samples.
    pub fn subscribe(&mut self, subscriber: impl FnMut(Heading) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Drop all subscribers
    ///
    /// Idempotent. State keeps updating on subsequent samples; readings are
    /// simply no longer delivered anywhere.
    pub fn clear_subscribers(&mut self) {
        self.subscribers.clear();
    }

    /// Current smoothed heading, or `None` before the first compass fix
    pub fn smooth_heading(&self) -> Option<f32> {
        self.latest_compass_heading.map(|_| self.smooth_heading)
    }

    /// Get a diagnostic snapshot of the engine's internal state
    pub fn states(&self) -> FusionStates {
        FusionStates {
            has_compass_fix: self.latest_compass_heading.is_some(),
            rotation_axis: self.rotation_axis,
            reference_heading: self.reference_heading,
            accumulated_rotation: self.accumulated_rotation,
            current_error: self.current_error,
        }
    }

    /// Extract the per-sample rotation delta in degrees from an angular rate
    ///
    /// Zero when no axis is selected or the rate is inside the dead zone.
    fn rotation_delta(&self, vector: Vector3<f32>) -> f32 {
        let rate = match self.rotation_axis {
            RotationAxis::X => vector.x,
            RotationAxis::Y => vector.y,
            RotationAxis::Z => vector.z,
            RotationAxis::None => return 0.0,
        };

        if rate.abs() < self.settings.gyroscope_change_sensitivity {
            return 0.0;
        }

        rate * self.settings.sample_interval_ms * 0.001 * RAD_TO_DEG
    }

    /// Re-anchor to the latest compass value after an axis change
    ///
    /// No-op before the first compass fix.
    fn reset(&mut self) -> Option<Heading> {
        let latest = self.latest_compass_heading?;

        self.reference_heading = latest;
        self.smooth_heading = latest;
        self.accumulated_rotation = 0.0;
        self.current_error = 0.0;

        Some(self.notify(latest))
    }

    /// Broadcast a reading to all subscribers and return it
    fn notify(&mut self, actual_compass: f32) -> Heading {
        let reading = Heading {
            actual_compass,
            smooth_value: self.smooth_heading,
        };

        for subscriber in &mut self.subscribers {
            subscriber(reading);
        }

        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_compass_fix_is_passthrough() {
        let mut fusion = HeadingFusion::new(true);
        let reading = fusion.compass_changed(217.5);

        assert_eq!(reading.actual_compass, 217.5);
        assert_eq!(reading.smooth_value, 217.5);
        assert_eq!(fusion.smooth_heading(), Some(217.5));
        assert_eq!(fusion.states().current_error, 0.0);
    }

    #[test]
    fn test_gyroscope_ignored_before_fix() {
        let mut fusion = HeadingFusion::new(true);
        fusion.accelerometer_changed(Vector3::new(0.1, 0.5, 0.9));

        let reading = fusion.gyroscope_changed(Vector3::new(2.0, 0.0, 0.0));
        assert!(reading.is_none());
        assert_eq!(fusion.states().accumulated_rotation, 0.0);
        assert_eq!(fusion.smooth_heading(), None);
    }

    #[test]
    fn test_compass_only_passthrough_mode() {
        let mut fusion = HeadingFusion::new(false);
        fusion.compass_changed(10.0);

        let reading = fusion.compass_changed(200.0);
        assert_eq!(reading.smooth_value, 200.0);

        let reading = fusion.compass_changed(355.5);
        assert_eq!(reading.smooth_value, 355.5);
    }

    #[test]
    fn test_compass_error_has_no_wraparound_correction() {
        let mut fusion = HeadingFusion::new(true);
        fusion.compass_changed(1.0); // smooth anchors at 1

        fusion.compass_changed(359.0);
        // Plain |359 - 1|, not the boundary-aware 2
        assert_eq!(fusion.states().current_error, 358.0);
    }

    #[test]
    fn test_axis_selection_tie_break() {
        let mut fusion = HeadingFusion::new(true);
        fusion.compass_changed(50.0);

        // Exact three-way tie prefers X
        fusion.accelerometer_changed(Vector3::new(0.5, 0.5, 0.5));
        assert_eq!(fusion.states().rotation_axis, RotationAxis::X);

        // Y/Z tie with X larger prefers Y
        fusion.accelerometer_changed(Vector3::new(0.9, 0.2, 0.2));
        assert_eq!(fusion.states().rotation_axis, RotationAxis::Y);

        fusion.accelerometer_changed(Vector3::new(0.9, 0.8, 0.2));
        assert_eq!(fusion.states().rotation_axis, RotationAxis::Z);
    }

    #[test]
    fn test_axis_switch_reanchors() {
        let mut fusion = HeadingFusion::new(true);
        fusion.compass_changed(80.0);
        fusion.accelerometer_changed(Vector3::new(0.1, 0.5, 0.9));

        // Drift the integrator away from the anchor
        for _ in 0..5 {
            fusion.gyroscope_changed(Vector3::new(1.0, 0.0, 0.0));
        }
        assert!(fusion.states().accumulated_rotation != 0.0);

        let reading = fusion
            .accelerometer_changed(Vector3::new(0.9, 0.1, 0.9))
            .unwrap();

        assert_eq!(reading.actual_compass, 80.0);
        assert_eq!(reading.smooth_value, 80.0);
        let states = fusion.states();
        assert_eq!(states.reference_heading, 80.0);
        assert_eq!(states.accumulated_rotation, 0.0);
        assert_eq!(states.current_error, 0.0);
    }

    #[test]
    fn test_axis_unchanged_is_noop() {
        let mut fusion = HeadingFusion::new(true);
        fusion.compass_changed(80.0);
        fusion.accelerometer_changed(Vector3::new(0.1, 0.5, 0.9));
        fusion.gyroscope_changed(Vector3::new(1.0, 0.0, 0.0));

        let accumulated = fusion.states().accumulated_rotation;
        let repeat = fusion.accelerometer_changed(Vector3::new(0.05, 0.6, 0.8));
        assert!(repeat.is_none());
        assert_eq!(fusion.states().accumulated_rotation, accumulated);
    }

    #[test]
    fn test_dead_zone_suppresses_jitter() {
        let mut fusion = HeadingFusion::new(true);
        fusion.compass_changed(80.0);
        fusion.accelerometer_changed(Vector3::new(0.1, 0.5, 0.9));

        let reading = fusion
            .gyroscope_changed(Vector3::new(0.04, 0.0, 0.0))
            .unwrap();

        assert_eq!(reading.smooth_value, 80.0);
        assert_eq!(fusion.states().accumulated_rotation, 0.0);
    }

    #[test]
    fn test_snap_on_excessive_error() {
        let settings = FusionSettings {
            sample_interval_ms: 1000.0, // big per-sample deltas
            ..Default::default()
        };
        let mut fusion = HeadingFusion::with_settings(true, settings);
        fusion.compass_changed(100.0);
        fusion.accelerometer_changed(Vector3::new(0.1, 0.5, 0.9));

        // One radian over a full second integrates ~57° away from the fix
        let reading = fusion
            .gyroscope_changed(Vector3::new(1.0, 0.0, 0.0))
            .unwrap();

        assert_eq!(reading.smooth_value, 100.0);
        assert!(fusion.states().current_error >= 20.0);
    }

    #[test]
    fn test_subscribers_receive_fifo_readings() {
        let readings = alloc::rc::Rc::new(core::cell::RefCell::new(alloc::vec::Vec::new()));

        let mut fusion = HeadingFusion::new(false);
        let sink = readings.clone();
        fusion.subscribe(move |reading: Heading| sink.borrow_mut().push(reading.smooth_value));

        fusion.compass_changed(10.0);
        fusion.compass_changed(20.0);
        fusion.compass_changed(30.0);

        assert_eq!(readings.borrow().as_slice(), &[10.0, 20.0, 30.0]);

        fusion.clear_subscribers();
        fusion.clear_subscribers(); // idempotent
        fusion.compass_changed(40.0);
        assert_eq!(readings.borrow().len(), 3);
    }
}
