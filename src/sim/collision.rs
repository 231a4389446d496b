//! Collision detection and response
//!
//! Orb/orb contacts use equal masses. Frozen orbs act as immovable walls: an
//! active orb touching one takes the whole positional correction and jumps
//! off at a fixed speed.

use glam::Vec2;

use super::state::Orb;
use crate::{cartesian_to_polar, polar_to_cartesian};

/// Centers closer than this have no usable contact normal
const MIN_SEPARATION: f32 = 1e-6;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at collision (pointing toward the orb center, for reflection)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Response parameters for orb/orb contacts
#[derive(Debug, Clone, Copy)]
pub struct ContactParams {
    pub restitution: f32,
    pub wall_jump_speed: f32,
    pub jump_duration: f32,
}

/// What an orb/orb contact did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Not touching, both frozen, or a degenerate overlap
    None,
    /// Two active orbs separated (velocities exchanged if approaching)
    Elastic,
    /// The active orb with this id bounced off a frozen one
    WallJump { id: u32 },
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Resolve a contact between two orbs, if they overlap
pub fn resolve_orb_contact(a: &mut Orb, b: &mut Orb, params: &ContactParams) -> ContactOutcome {
    if a.is_frozen() && b.is_frozen() {
        return ContactOutcome::None;
    }

    let delta = a.pos - b.pos;
    let dist = delta.length();
    let min_dist = a.radius + b.radius;
    if dist >= min_dist || dist <= MIN_SEPARATION {
        return ContactOutcome::None;
    }

    // Points from b toward a
    let normal = delta / dist;
    let overlap = min_dist - dist;

    match (a.is_active(), b.is_active()) {
        (true, true) => {
            a.pos += normal * (overlap / 2.0);
            b.pos -= normal * (overlap / 2.0);

            let approach = (a.vel - b.vel).dot(normal);
            if approach <= 0.0 {
                // Equal-mass impulse along the normal; tangential parts untouched
                let impulse = -(1.0 + params.restitution) * approach / 2.0;
                a.vel += normal * impulse;
                b.vel -= normal * impulse;
            }
            ContactOutcome::Elastic
        }
        (true, false) => wall_jump(a, normal, overlap, params),
        (false, true) => wall_jump(b, -normal, overlap, params),
        (false, false) => ContactOutcome::None,
    }
}

/// Push an active orb out of a frozen one and launch it away at jump speed
fn wall_jump(orb: &mut Orb, normal: Vec2, overlap: f32, params: &ContactParams) -> ContactOutcome {
    orb.pos += normal * overlap;

    let outgoing = if orb.vel.dot(normal) < 0.0 {
        reflect_velocity(orb.vel, normal)
    } else {
        orb.vel
    };
    let dir = outgoing.try_normalize().unwrap_or(normal);
    orb.vel = dir * params.wall_jump_speed;
    orb.jump_timer = params.jump_duration;

    ContactOutcome::WallJump { id: orb.id }
}

/// Check an orb against the inside of the ring wall
pub fn ring_wall_collision(pos: Vec2, radius: f32, ring_radius: f32) -> CollisionResult {
    let (r, theta) = cartesian_to_polar(pos);

    if r + radius > ring_radius {
        let normal = -polar_to_cartesian(1.0, theta); // Point inward
        return CollisionResult {
            hit: true,
            normal,
            penetration: r + radius - ring_radius,
        };
    }

    CollisionResult::miss()
}

/// Check if an orb has cleared the ring by at least `clearance`
#[inline]
pub fn beyond_ring(pos: Vec2, ring_radius: f32, clearance: f32) -> bool {
    pos.length() > ring_radius + clearance
}
