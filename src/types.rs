//! Core types and settings for the smooth-compass library

/// Gyroscope axis currently interpreted as rotation about the device's vertical
///
/// The dominant axis is selected from accelerometer data and switches when
/// the device orientation changes enough to invalidate the previous choice.
/// Until the first accelerometer sample arrives the axis is `None` and
/// gyroscope samples contribute no rotation.
///
/// # Example
/// ```
/// use smooth_compass::{HeadingFusion, RotationAxis};
///
/// let fusion = HeadingFusion::new(true);
/// assert_eq!(fusion.states().rotation_axis, RotationAxis::None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationAxis {
    /// No axis selected yet; gyroscope samples integrate zero rotation
    #[default]
    None,
    /// Device X axis
    X,
    /// Device Y axis
    Y,
    /// Device Z axis
    Z,
}

/// A single heading reading emitted after each accepted sensor sample
///
/// Pairs the raw compass value with the fused output so consumers can show
/// both, or gauge how far the smoothed estimate currently diverges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heading {
    /// Latest raw compass heading in degrees, `[0, 360)`
    pub actual_compass: f32,
    /// Smoothed heading in degrees, `[0, 360]`
    pub smooth_value: f32,
}

/// Fusion algorithm settings
///
/// All fields may be changed at runtime through
/// [`HeadingFusion::set_settings`](crate::HeadingFusion::set_settings).
/// No validation is applied beyond the natural numeric ranges.
///
/// # Example
/// ```
/// use smooth_compass::{FusionSettings, HeadingFusion};
///
/// let settings = FusionSettings {
///     tolerated_error: 4.0, // pull toward the compass sooner
///     ..Default::default()
/// };
/// let fusion = HeadingFusion::with_settings(true, settings);
/// assert_eq!(fusion.settings().tolerated_error, 4.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FusionSettings {
    /// Gyroscope dead zone in the sensor's native angular-rate units
    ///
    /// Rates below this magnitude are treated as exactly zero for the
    /// sample, suppressing jitter while the device is at rest.
    pub gyroscope_change_sensitivity: f32,
    /// Divergence in degrees below which the integrated heading is fully
    /// trusted and left unmodified
    pub tolerated_error: f32,
    /// Divergence in degrees at which the integrated heading is discarded
    /// and the output snaps to the raw compass value
    pub too_much_error: f32,
    /// Gyroscope delivery period in milliseconds
    ///
    /// Used to convert angular rate to a per-sample rotation delta. Must
    /// match the interval the gyroscope service was actually started with.
    pub sample_interval_ms: f32,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            gyroscope_change_sensitivity: 0.05,
            tolerated_error: 6.0,
            too_much_error: 20.0,
            sample_interval_ms: 20.0, // platform "game" delivery rate
        }
    }
}

/// Snapshot of the fusion engine's internal state
///
/// Diagnostic information useful for telemetry and debugging. The values
/// reflect the state after the most recently processed sample.
///
/// # Example
/// ```
/// use smooth_compass::HeadingFusion;
///
/// let mut fusion = HeadingFusion::new(true);
/// fusion.compass_changed(90.0);
///
/// let states = fusion.states();
/// assert!(states.has_compass_fix);
/// assert_eq!(states.current_error, 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FusionStates {
    /// Whether a compass sample has ever been received
    ///
    /// False until the first compass fix; gyroscope samples are ignored
    /// entirely while this is false.
    pub has_compass_fix: bool,
    /// Currently selected dominant gyroscope axis
    pub rotation_axis: RotationAxis,
    /// Heading baseline at the last reset, in degrees
    pub reference_heading: f32,
    /// Signed cumulative gyroscope-integrated rotation since the last
    /// reset, in degrees
    pub accumulated_rotation: f32,
    /// Last computed divergence between the raw and smoothed heading,
    /// in degrees
    pub current_error: f32,
}
