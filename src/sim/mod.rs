//! Escape-room simulation module
//!
//! Each new follower becomes an orb bouncing inside a rotating ring with a
//! gap. This module must stay deterministic for a given seed and frame deltas:
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod arc;
pub mod collision;
pub mod followers;
pub mod state;
pub mod tick;

pub use arc::Ring;
pub use collision::{CollisionResult, ContactOutcome, ContactParams, resolve_orb_contact, ring_wall_collision};
pub use followers::FollowerTracker;
pub use state::{
    Counters, FollowerEvent, FrameSnapshot, Orb, OrbState, OrbView, Particle, ParticleColor, ParticleView, SimEvent,
    SimPhase, SimState,
};
pub use tick::{TickInput, tick};
