//! Follower Reveal - deterministic core for follower-growth art projects
//!
//! Core modules:
//! - `reveal`: Seeded pixel selection (which pixels a day reveals)
//! - `sim`: Escape-room orb simulation (physics, collisions, purge)
//! - `settings`: Difficulty presets and engine tuning
//! - `audio`: Sound triggers for the simulation's audio events
//! - `web`: Browser bindings (wasm32 only)

pub mod audio;
pub mod error;
pub mod reveal;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::RevealError;
pub use reveal::{Mulberry32, RevealLedger, RevealMode, RevealPolicy, RevealRequest, select_revealed_pixels};
pub use settings::{Difficulty, EngineConfig, QualityPreset, Settings};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Canvas edge length the escape room is laid out for
    pub const CANVAS_SIZE: f32 = 1000.0;

    /// Ring radius (canvas half-width minus a 20px margin)
    pub const RING_RADIUS: f32 = CANVAS_SIZE / 2.0 - 20.0;
    /// Angular width of the ring's gap (radians, ~22.5 degrees)
    pub const GAP_WIDTH: f32 = std::f32::consts::PI / 8.0;
    /// How far past the ring radius an orb must travel through the gap to count as escaped
    pub const ESCAPE_CLEARANCE: f32 = 10.0;

    /// Orb defaults
    pub const ORB_RADIUS: f32 = 5.0;
    pub const ORB_SPAWN_SPEED_MIN: f32 = 50.0;
    pub const ORB_SPAWN_SPEED_MAX: f32 = 150.0;
    /// Lifespan range before an active orb freezes (seconds)
    pub const ORB_LIFESPAN_MIN: f32 = 3.0;
    pub const ORB_LIFESPAN_MAX: f32 = 5.0;
    /// Maximum concurrently active orbs (collision is O(n^2))
    pub const MAX_ACTIVE_ORBS: usize = 200;

    /// Restitution for active/active orb collisions
    pub const RESTITUTION: f32 = 0.8;
    /// Speed an active orb leaves a frozen orb with
    pub const WALL_JUMP_SPEED: f32 = 220.0;
    /// Duration of the "jumping" visual state (seconds)
    pub const JUMP_DURATION: f32 = 0.25;

    /// Frozen orbs start fading after this many seconds
    pub const FROZEN_MAX_LIFE: f32 = 10.0;
    /// Opacity lost per second once fading
    pub const FROZEN_FADE_RATE: f32 = 0.5;

    /// Purge cooldown (seconds the "PURGING" status is held)
    pub const PURGE_COOLDOWN: f32 = 2.0;
    /// Ring spin multiplier while purging
    pub const PURGE_RING_SPEEDUP: f32 = 6.0;

    /// Particle bursts
    pub const ESCAPE_BURST: usize = 150;
    pub const FROZEN_BURST: usize = 50;
    pub const PARTICLE_SPEED_MIN: f32 = 50.0;
    pub const PARTICLE_SPEED_MAX: f32 = 250.0;
    /// Downward pull on particles (pixels/s²)
    pub const PARTICLE_GRAVITY: f32 = 200.0;

    /// Largest frame delta the web driver feeds into a tick
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Cap a frame delta at `MAX_FRAME_DT` (tab switches, debugger pauses).
/// Non-finite deltas pass through untouched so `tick` can reject them.
#[inline]
pub fn clamp_frame_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.min(consts::MAX_FRAME_DT) } else { dt }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EngineConfig;
    use crate::sim::{SimState, TickInput, tick};

    #[test]
    fn test_clamp_frame_dt() {
        assert_eq!(clamp_frame_dt(0.016), 0.016);
        assert_eq!(clamp_frame_dt(3.0), consts::MAX_FRAME_DT);
        assert!(clamp_frame_dt(f32::NAN).is_nan());
        assert_eq!(clamp_frame_dt(f32::INFINITY), f32::INFINITY);
    }

    #[test]
    fn test_nan_frame_does_not_advance() {
        let mut state = SimState::new(1, EngineConfig::default());
        let events = tick(&mut state, &TickInput::default(), clamp_frame_dt(f32::NAN));
        assert!(events.is_empty());
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.time, 0.0);
    }
}
