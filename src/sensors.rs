//! Sensor collaborator traits and lifecycle adapter
//!
//! The fusion engine itself knows nothing about sensor services. This module
//! defines the capability traits the hosting platform implements and a thin
//! adapter that owns the start/stop bookkeeping: each sensor is started only
//! if it was not already active, and disposal stops only the sensors this
//! instance started.

use nalgebra::Vector3;

use crate::fusion::HeadingFusion;
use crate::types::{FusionSettings, Heading};

/// Magnetic compass service
///
/// Delivers heading samples in degrees `[0, 360)`. Sample delivery itself is
/// the platform's concern; the host forwards each sample to
/// [`SmoothCompass::compass_changed`].
pub trait Compass {
    /// Whether the service is currently delivering samples
    fn is_active(&self) -> bool;
    /// Begin delivering samples
    fn start(&mut self);
    /// Stop delivering samples
    fn stop(&mut self);
}

/// Motion sensor service (gyroscope or accelerometer)
///
/// Delivers 3-axis vector samples: angular rate in radians per second for a
/// gyroscope, linear acceleration in native units for an accelerometer. The
/// two share a shape and differ only in what the host forwards the samples
/// to.
pub trait MotionSensor {
    /// Whether the sensor exists on this device at all
    fn is_available(&self) -> bool;
    /// Whether the sensor is currently delivering samples
    fn is_active(&self) -> bool;
    /// Begin delivering samples
    ///
    /// The delivery interval must match
    /// [`FusionSettings::sample_interval_ms`].
    fn start(&mut self);
    /// Stop delivering samples
    fn stop(&mut self);
}

/// Smoothed compass bound to three sensor collaborators
///
/// Probes the motion sensors at construction: when either the gyroscope or
/// the accelerometer is unavailable, the fusion engine runs in compass-only
/// passthrough mode and motion samples are never wired in. Sensors already
/// active at construction are left alone; the rest are started here and
/// stopped again on [`dispose`](SmoothCompass::dispose).
///
/// # Example
/// ```
/// use smooth_compass::{Compass, MotionSensor, SmoothCompass};
///
/// # struct Stub(bool);
/// # impl Compass for Stub {
/// #     fn is_active(&self) -> bool { self.0 }
/// #     fn start(&mut self) { self.0 = true; }
/// #     fn stop(&mut self) { self.0 = false; }
/// # }
/// # impl MotionSensor for Stub {
/// #     fn is_available(&self) -> bool { true }
/// #     fn is_active(&self) -> bool { self.0 }
/// #     fn start(&mut self) { self.0 = true; }
/// #     fn stop(&mut self) { self.0 = false; }
/// # }
/// let mut compass = SmoothCompass::new(Stub(false), Stub(false), Stub(false));
/// compass.subscribe(|reading| {
///     // drive the UI indicator from reading.smooth_value
///     let _ = reading.smooth_value;
/// });
/// compass.compass_changed(45.0);
/// ```
pub struct SmoothCompass<C: Compass, G: MotionSensor, A: MotionSensor> {
    fusion: HeadingFusion,
    compass: C,
    gyroscope: G,
    accelerometer: A,
    motion_sensors_available: bool,
    started_compass: bool,
    started_gyroscope: bool,
    started_accelerometer: bool,
    disposed: bool,
}

impl<C: Compass, G: MotionSensor, A: MotionSensor> SmoothCompass<C, G, A> {
    /// Create a smoothed compass with default fusion settings
    pub fn new(compass: C, gyroscope: G, accelerometer: A) -> Self {
        Self::with_settings(compass, gyroscope, accelerometer, FusionSettings::default())
    }

    /// Create a smoothed compass with specified fusion settings
    pub fn with_settings(
        mut compass: C,
        mut gyroscope: G,
        mut accelerometer: A,
        settings: FusionSettings,
    ) -> Self {
        let motion_sensors_available = gyroscope.is_available() && accelerometer.is_available();

        let mut started_compass = false;
        if !compass.is_active() {
            started_compass = true;
            compass.start();
        }

        let mut started_gyroscope = false;
        let mut started_accelerometer = false;
        if motion_sensors_available {
            if !gyroscope.is_active() {
                started_gyroscope = true;
                gyroscope.start();
            }
            if !accelerometer.is_active() {
                started_accelerometer = true;
                accelerometer.start();
            }
        }

        SmoothCompass {
            fusion: HeadingFusion::with_settings(motion_sensors_available, settings),
            compass,
            gyroscope,
            accelerometer,
            motion_sensors_available,
            started_compass,
            started_gyroscope,
            started_accelerometer,
            disposed: false,
        }
    }

    /// Forward a raw compass sample to the fusion engine
    pub fn compass_changed(&mut self, heading: f32) -> Heading {
        self.fusion.compass_changed(heading)
    }

    /// Forward a gyroscope sample to the fusion engine
    ///
    /// Dropped when motion sensors are unavailable or the sample arrives
    /// before the first compass fix.
    pub fn gyroscope_changed(&mut self, vector: Vector3<f32>) -> Option<Heading> {
        if !self.motion_sensors_available {
            return None;
        }
        self.fusion.gyroscope_changed(vector)
    }

    /// Forward an accelerometer sample to the fusion engine
    ///
    /// Dropped when motion sensors are unavailable. Returns a reading only
    /// when the sample switched the dominant axis and re-anchored the
    /// output.
    pub fn accelerometer_changed(&mut self, vector: Vector3<f32>) -> Option<Heading> {
        if !self.motion_sensors_available {
            return None;
        }
        self.fusion.accelerometer_changed(vector)
    }

    /// Subscribe to heading readings
    pub fn subscribe(&mut self, subscriber: impl FnMut(Heading) + 'static) {
        self.fusion.subscribe(subscriber);
    }

    /// Access the fusion engine, e.g. for diagnostics or settings updates
    pub fn fusion(&self) -> &HeadingFusion {
        &self.fusion
    }

    /// Mutable access to the fusion engine
    pub fn fusion_mut(&mut self) -> &mut HeadingFusion {
        &mut self.fusion
    }

    /// Release subscribers and stop the sensors this instance started
    ///
    /// Idempotent; also invoked on drop. Sensors that were already active at
    /// construction are left running.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.fusion.clear_subscribers();

        if self.started_compass {
            self.compass.stop();
        }
        if self.started_gyroscope {
            self.gyroscope.stop();
        }
        if self.started_accelerometer {
            self.accelerometer.stop();
        }
    }
}

impl<C: Compass, G: MotionSensor, A: MotionSensor> Drop for SmoothCompass<C, G, A> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    #[derive(Clone, Default)]
    struct FakeSensor {
        available: bool,
        active: Rc<Cell<bool>>,
        starts: Rc<Cell<u32>>,
        stops: Rc<Cell<u32>>,
    }

    impl FakeSensor {
        fn available() -> Self {
            FakeSensor {
                available: true,
                ..Default::default()
            }
        }

        fn already_active() -> Self {
            let sensor = Self::available();
            sensor.active.set(true);
            sensor
        }

        fn missing() -> Self {
            FakeSensor::default()
        }
    }

    impl Compass for FakeSensor {
        fn is_active(&self) -> bool {
            self.active.get()
        }
        fn start(&mut self) {
            self.active.set(true);
            self.starts.set(self.starts.get() + 1);
        }
        fn stop(&mut self) {
            self.active.set(false);
            self.stops.set(self.stops.get() + 1);
        }
    }

    impl MotionSensor for FakeSensor {
        fn is_available(&self) -> bool {
            self.available
        }
        fn is_active(&self) -> bool {
            self.active.get()
        }
        fn start(&mut self) {
            Compass::start(self);
        }
        fn stop(&mut self) {
            Compass::stop(self);
        }
    }

    #[test]
    fn test_starts_inactive_sensors_only() {
        let compass = FakeSensor::already_active();
        let gyroscope = FakeSensor::available();
        let accelerometer = FakeSensor::available();

        let compass_starts = compass.starts.clone();
        let gyroscope_starts = gyroscope.starts.clone();
        let accelerometer_starts = accelerometer.starts.clone();

        let _smooth = SmoothCompass::new(compass, gyroscope, accelerometer);

        assert_eq!(compass_starts.get(), 0);
        assert_eq!(gyroscope_starts.get(), 1);
        assert_eq!(accelerometer_starts.get(), 1);
    }

    #[test]
    fn test_missing_motion_sensor_forces_passthrough() {
        let gyroscope = FakeSensor::missing();
        let gyroscope_starts = gyroscope.starts.clone();

        let mut smooth =
            SmoothCompass::new(FakeSensor::available(), gyroscope, FakeSensor::available());

        // Neither motion sensor is started when one is missing
        assert_eq!(gyroscope_starts.get(), 0);

        smooth.compass_changed(10.0);
        let reading = smooth.compass_changed(250.0);
        assert_eq!(reading.smooth_value, 250.0);

        // Motion samples are never wired in
        assert!(smooth.gyroscope_changed(Vector3::new(1.0, 1.0, 1.0)).is_none());
        assert!(
            smooth
                .accelerometer_changed(Vector3::new(0.1, 0.5, 0.9))
                .is_none()
        );
        assert_eq!(smooth.fusion().smooth_heading(), Some(250.0));
    }

    #[test]
    fn test_dispose_stops_only_started_sensors() {
        let compass = FakeSensor::already_active();
        let gyroscope = FakeSensor::available();
        let accelerometer = FakeSensor::available();

        let compass_stops = compass.stops.clone();
        let gyroscope_stops = gyroscope.stops.clone();
        let accelerometer_stops = accelerometer.stops.clone();

        let mut smooth = SmoothCompass::new(compass, gyroscope, accelerometer);
        smooth.dispose();
        smooth.dispose(); // idempotent

        assert_eq!(compass_stops.get(), 0);
        assert_eq!(gyroscope_stops.get(), 1);
        assert_eq!(accelerometer_stops.get(), 1);
    }

    #[test]
    fn test_drop_disposes() {
        let compass = FakeSensor::available();
        let compass_stops = compass.stops.clone();

        {
            let _smooth =
                SmoothCompass::new(compass, FakeSensor::available(), FakeSensor::available());
        }

        assert_eq!(compass_stops.get(), 1);
    }

    #[test]
    fn test_forwards_samples_to_fusion() {
        let mut smooth = SmoothCompass::new(
            FakeSensor::available(),
            FakeSensor::available(),
            FakeSensor::available(),
        );

        smooth.compass_changed(90.0);
        smooth.accelerometer_changed(Vector3::new(0.1, 0.5, 0.9));

        let reading = smooth
            .gyroscope_changed(Vector3::new(0.5, 0.0, 0.0))
            .unwrap();
        assert_eq!(reading.actual_compass, 90.0);
        assert!(reading.smooth_value < 90.0);
    }
}
