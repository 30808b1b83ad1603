use nalgebra::Vector3;
use smooth_compass::HeadingFusion;

fn main() {
    let mut fusion = HeadingFusion::new(true);

    // First compass fix anchors the output; the accelerometer selects the
    // dominant rotation axis (device held upright, gravity mostly on Z)
    fusion.compass_changed(270.0); // replace this with actual compass data in degrees
    fusion.accelerometer_changed(Vector3::new(0.1, 0.5, 0.9));

    for _ in 0..10 {
        // this loop should repeat each time new gyroscope data is available
        let gyroscope = Vector3::new(0.4, 0.0, 0.0); // replace this with actual gyroscope data in rad/s

        if let Some(reading) = fusion.gyroscope_changed(gyroscope) {
            println!(
                "Raw: {:.2}, Smooth: {:.2}",
                reading.actual_compass, reading.smooth_value
            );
        }
    }
}
