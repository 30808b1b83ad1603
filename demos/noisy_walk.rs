//! Noisy walk demonstration
//!
//! Simulates a device turning back and forth while its compass delivers
//! slow, noisy fixes and its gyroscope delivers fast, slightly biased rates.
//! The raw and smoothed headings are plotted side by side so the effect of
//! the snap/nudge/accept policy is visible.
//!
//! Run with: `cargo run --example noisy_walk`

use nalgebra::Vector3;
use plotters::prelude::*;
use rand::prelude::*;
use smooth_compass::{DEG_TO_RAD, HeadingFusion};
use std::error::Error;
use std::f32::consts::PI;

const SAMPLE_INTERVAL_S: f32 = 0.02; // 50 Hz gyroscope stream
const DURATION_S: f32 = 60.0;
const COMPASS_EVERY: usize = 25; // one compass fix per 0.5 s

fn main() -> Result<(), Box<dyn Error>> {
    println!("Noisy walk demo - compass fixes vs gyroscope-smoothed heading");

    let mut rng = rand::rng();
    let mut fusion = HeadingFusion::new(true);

    let sample_count = (DURATION_S / SAMPLE_INTERVAL_S) as usize;
    let mut raw_points = Vec::new();
    let mut smooth_points = Vec::new();

    for i in 0..sample_count {
        let time = i as f32 * SAMPLE_INTERVAL_S;

        // True heading sweeps back and forth across 120°
        let true_heading = 180.0 + 60.0 * (time * 0.05 * 2.0 * PI).sin();
        let true_rate_deg = 60.0 * 0.05 * 2.0 * PI * (time * 0.05 * 2.0 * PI).cos();

        // Device held upright with a little shake
        let accelerometer = Vector3::new(
            0.1 + rng.random_range(-0.02..0.02),
            0.5 + rng.random_range(-0.02..0.02),
            0.9 + rng.random_range(-0.02..0.02),
        );
        fusion.accelerometer_changed(accelerometer);

        // Noisy, slow compass fixes
        if i % COMPASS_EVERY == 0 {
            let raw = (true_heading + rng.random_range(-6.0..6.0)).rem_euclid(360.0);
            let reading = fusion.compass_changed(raw);
            raw_points.push((time, reading.actual_compass));
        }

        // Gyroscope rate about X with noise and a small constant bias,
        // negated because a positive extracted rate integrates downward
        let rate = -(true_rate_deg + 0.8 + rng.random_range(-2.0..2.0)) * DEG_TO_RAD;
        if let Some(reading) = fusion.gyroscope_changed(Vector3::new(rate, 0.0, 0.0)) {
            smooth_points.push((time, reading.smooth_value));
        }

        if i % 500 == 0 {
            let states = fusion.states();
            println!(
                "t={:.1}s true={:.1}° smooth={:.1}° error={:.2}° accumulated={:.1}°",
                time,
                true_heading,
                fusion.smooth_heading().unwrap_or(0.0),
                states.current_error,
                states.accumulated_rotation,
            );
        }
    }

    println!("Plotting {} smoothed samples...", smooth_points.len());
    create_plot(&raw_points, &smooth_points)?;

    println!("✓ Plot saved to noisy_walk.png");
    Ok(())
}

/// Plot raw compass fixes against the smoothed output
fn create_plot(
    raw_points: &[(f32, f32)],
    smooth_points: &[(f32, f32)],
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new("noisy_walk.png", (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Raw compass vs smoothed heading", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0f32..DURATION_S, 90f32..270f32)?;

    chart
        .configure_mesh()
        .x_desc("Seconds")
        .y_desc("Degrees")
        .draw()?;

    chart
        .draw_series(
            raw_points
                .iter()
                .map(|&(t, h)| Circle::new((t, h), 2, RED.filled())),
        )?
        .label("Raw compass")
        .legend(|(x, y)| Circle::new((x + 5, y), 3, RED.filled()));

    chart
        .draw_series(LineSeries::new(smooth_points.iter().copied(), &BLUE))?
        .label("Smoothed")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], BLUE));

    chart.configure_series_labels().draw()?;
    root.present()?;

    Ok(())
}
