#![no_std]

//! Smooth Compass - sensor fusion for a jump-free heading indicator
//!
//! Raw compass readings are accurate but noisy and arrive slowly and
//! irregularly; gyroscope integration is smooth and low-latency but drifts
//! over time. This library blends the two: gyroscope-integrated rotation
//! provides moment-to-moment smoothness while the raw compass continuously
//! pulls the result back to correct drift, without visible jumps.
//!
//! # Features
//!
//! - Dominant-axis selection from accelerometer orientation
//! - Gyroscope dead zone to suppress jitter at rest
//! - Wraparound-aware error measurement at the 0°/360° boundary
//! - Snap / nudge / accept correction policy against compass divergence
//! - Compass-only passthrough mode when motion sensors are unavailable
//! - `#![no_std]` compatible (requires `alloc`)
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use smooth_compass::HeadingFusion;
//!
//! let mut fusion = HeadingFusion::new(true);
//! fusion.subscribe(|reading| {
//!     // reading.actual_compass is the raw value,
//!     // reading.smooth_value drives the indicator
//!     let _ = reading.smooth_value;
//! });
//!
//! // Sensor callbacks push samples as they arrive
//! fusion.compass_changed(210.0);                              // degrees
//! fusion.accelerometer_changed(Vector3::new(0.1, 0.6, 0.8));  // native units
//! fusion.gyroscope_changed(Vector3::new(0.3, 0.0, 0.0));      // rad/s
//! ```
//!
//! To bind the engine to platform sensor services, implement the
//! [`Compass`] and [`MotionSensor`] traits and use [`SmoothCompass`], which
//! owns sensor start/stop bookkeeping and disposal.

extern crate alloc;

mod fusion;
mod math;
pub mod sensors;
mod types;

// Re-export all public types and functions
pub use fusion::HeadingFusion;
pub use math::{DEG_TO_RAD, FULL_CIRCLE, RAD_TO_DEG, circular_distance, is_after, wrap_degrees};
pub use sensors::{Compass, MotionSensor, SmoothCompass};
pub use types::{FusionSettings, FusionStates, Heading, RotationAxis};
