use glam::DVec2;
use std::f64::consts::{PI, TAU};

/// Ring (distance from the rotation axis) and tube radius of the torus profile.
pub const RING_RADIUS: f64 = 0.65;
pub const TUBE_RADIUS: f64 = 0.35;

const SPIKE_BASE: f64 = 0.2;
const SPIKE_AMPLITUDE: f64 = 0.3;
const SPIKE_FREQUENCY: f64 = 9.0;

/// Open profile from the bottom pole to the top pole. Revolved around the
/// vertical axis it produces a unit sphere.
pub fn half_circle(t: f64) -> DVec2 {
    let a = PI * t;
    DVec2::new(a.sin(), -a.cos())
}

/// Closed circular profile offset from the rotation axis: a torus.
pub fn circle(t: f64) -> DVec2 {
    let a = TAU * t;
    DVec2::new(
        RING_RADIUS + TUBE_RADIUS * a.cos(),
        TUBE_RADIUS * a.sin(),
    )
}

/// The circle profile with its tube radius modulated by a sharpened
/// periodic bump. Revolved it gives a spiked torus; through the polar
/// variant, a free-standing spiked blob.
pub fn spikes(t: f64) -> DVec2 {
    let a = TAU * t;
    let bump = (SPIKE_FREQUENCY * a).sin().powi(8);
    let r = SPIKE_BASE + SPIKE_AMPLITUDE * bump;
    DVec2::new(RING_RADIUS + r * a.cos(), r * a.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_circle_runs_pole_to_pole() {
        let bottom = half_circle(0.0);
        let top = half_circle(1.0);
        assert!(bottom.x.abs() < 1e-9);
        assert!((bottom.y + 1.0).abs() < 1e-9);
        assert!(top.x.abs() < 1e-9);
        assert!((top.y - 1.0).abs() < 1e-9);
        // equator halfway
        let mid = half_circle(0.5);
        assert!((mid.x - 1.0).abs() < 1e-9);
        assert!(mid.y.abs() < 1e-9);
    }

    #[test]
    fn circle_is_closed_and_off_axis() {
        assert!(circle(0.0).distance(circle(1.0)) < 1e-9);
        for i in 0..64 {
            let p = circle(i as f64 / 64.0);
            assert!(p.x >= RING_RADIUS - TUBE_RADIUS - 1e-9);
        }
    }

    #[test]
    fn spikes_is_closed_and_stays_off_axis() {
        assert!(spikes(0.0).distance(spikes(1.0)) < 1e-9);
        for i in 0..256 {
            let p = spikes(i as f64 / 256.0);
            assert!(p.x > 0.0, "spike profile crossed the rotation axis at sample {i}");
        }
    }
}
