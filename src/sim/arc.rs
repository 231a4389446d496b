//! Ring geometry: a circular wall with one rotating gap
//!
//! In polar coordinates around the ring center:
//! - radius: wall radius
//! - angle: center of the gap, advances as the ring spins
//! - gap_width: angular extent of the opening

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::normalize_angle;

/// The containing ring and its gap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ring {
    /// Wall radius from the ring center
    pub radius: f32,
    /// Gap center angle (radians, kept in [0, 2π))
    pub angle: f32,
    /// Angular width of the gap (radians)
    pub gap_width: f32,
}

impl Ring {
    pub fn new(radius: f32, gap_width: f32) -> Self {
        Self {
            radius,
            angle: 0.0,
            gap_width,
        }
    }

    /// Spin the ring by `delta` radians
    pub fn rotate(&mut self, delta: f32) {
        self.angle = (self.angle + delta).rem_euclid(TAU);
    }

    /// Gap start angle (normalized to [-π, π))
    pub fn gap_start(&self) -> f32 {
        normalize_angle(self.angle - self.gap_width / 2.0)
    }

    /// Gap end angle (normalized to [-π, π))
    pub fn gap_end(&self) -> f32 {
        normalize_angle(self.angle + self.gap_width / 2.0)
    }

    /// Check if an angle falls inside the gap
    pub fn gap_contains(&self, theta: f32) -> bool {
        let theta = normalize_angle(theta);
        let start = self.gap_start();
        let end = self.gap_end();

        if start <= end {
            theta >= start && theta <= end
        } else {
            // Gap straddles ±π
            theta >= start || theta <= end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_gap_contains_no_wrap() {
        let mut ring = Ring::new(100.0, PI / 4.0);
        ring.rotate(PI / 2.0);
        assert!(ring.gap_contains(PI / 2.0));
        assert!(ring.gap_contains(PI / 2.0 + 0.1));
        assert!(!ring.gap_contains(0.0));
        assert!(!ring.gap_contains(-PI / 2.0));
    }

    #[test]
    fn test_gap_contains_wraparound() {
        let mut ring = Ring::new(100.0, 20.0_f32.to_radians());
        ring.rotate(PI);
        assert!(ring.gap_contains(PI - 0.01));
        assert!(ring.gap_contains(-PI + 0.01));
        assert!(!ring.gap_contains(0.0));
    }

    #[test]
    fn test_rotation_wraps() {
        let mut ring = Ring::new(100.0, 0.3);
        ring.rotate(7.0);
        assert!(ring.angle >= 0.0 && ring.angle < TAU);
        assert!((ring.angle - (7.0 - TAU)).abs() < 1e-5);
    }
}
