//! Variable timestep simulation tick
//!
//! One call per frame. The caller owns scheduling; `tick` only needs the
//! elapsed time since the previous frame.

use glam::Vec2;

use super::collision::{ContactOutcome, ContactParams, beyond_ring, reflect_velocity, resolve_orb_contact, ring_wall_collision};
use super::state::{OrbState, ParticleColor, SimEvent, SimPhase, SimState};
use crate::audio::SoundEffect;
use crate::cartesian_to_polar;
use crate::settings::Difficulty;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pause toggle
    pub pause: bool,
    /// Switch difficulty preset
    pub difficulty: Option<Difficulty>,
}

/// Advance the simulation by `dt` seconds and report what happened
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) -> Vec<SimEvent> {
    let mut events = Vec::new();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            SimPhase::Running => {
                state.phase = SimPhase::Paused;
                events.push(SimEvent::Paused);
                log::info!("Simulation paused");
            }
            SimPhase::Paused => {
                state.phase = SimPhase::Running;
                events.push(SimEvent::Resumed);
                log::info!("Simulation resumed");
            }
        }
    }

    if let Some(difficulty) = input.difficulty {
        if difficulty != state.config.difficulty {
            state.config.apply_difficulty(difficulty);
            events.push(SimEvent::DifficultyChanged { difficulty });
            log::info!("Difficulty set to {}", difficulty.as_str());
        }
    }

    // Paused frames do no work and bank no time
    if state.phase == SimPhase::Paused || !dt.is_finite() || dt <= 0.0 {
        return events;
    }

    state.time += dt;
    state.time_ticks += 1;

    update_purge_timer(state, dt, &mut events);
    spawn_pending(state, &mut events);

    // Ring spins faster while purging
    let speedup = if state.is_purging() { state.config.purge_ring_speedup } else { 1.0 };
    state.ring.rotate(state.config.ring_speed * speedup * dt);

    resolve_collisions(state, &mut events);
    let escapes = integrate_orbs(state, dt, &mut events);
    decay_frozen(state, dt, &mut events);

    for pos in escapes {
        trigger_purge(state, pos, &mut events);
    }

    update_particles(state, dt);

    events
}

fn update_purge_timer(state: &mut SimState, dt: f32, events: &mut Vec<SimEvent>) {
    if let Some(remaining) = state.purge_timer {
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            state.purge_timer = None;
            events.push(SimEvent::PurgeEnded);
            log::info!("Purge finished");
        } else {
            state.purge_timer = Some(remaining);
        }
    }
}

/// Move queued orbs into play, up to the active cap
fn spawn_pending(state: &mut SimState, events: &mut Vec<SimEvent>) {
    if state.is_purging() {
        return;
    }

    let room = state.config.max_active_orbs.saturating_sub(state.active_count()) as u64;
    let batch = state.pending_orbs.min(room);
    for _ in 0..batch {
        let id = state.spawn_orb();
        events.push(SimEvent::Spawned { id });
    }
    state.pending_orbs -= batch;

    // Keep the room alive when nothing is left to watch
    if state.orbs.is_empty() && state.pending_orbs == 0 {
        let id = state.spawn_orb();
        events.push(SimEvent::Spawned { id });
        log::debug!("Room empty, spawned idle orb {}", id);
    }
}

/// Pairwise orb contacts over the whole population
fn resolve_collisions(state: &mut SimState, events: &mut Vec<SimEvent>) {
    let params = ContactParams {
        restitution: state.config.restitution,
        wall_jump_speed: state.config.wall_jump_speed,
        jump_duration: state.config.jump_duration,
    };

    for i in 0..state.orbs.len() {
        let (head, tail) = state.orbs.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if let ContactOutcome::WallJump { id } = resolve_orb_contact(a, b, &params) {
                events.push(SimEvent::WallJump { id });
                events.push(SimEvent::Bounce { id });
                events.push(SimEvent::Sound {
                    effect: SoundEffect::Bounce,
                });
            }
        }
    }
}

/// Physics, ring boundary and freezing for active orbs.
///
/// Escaped orbs are removed here; their positions are returned so the caller
/// can start a purge.
fn integrate_orbs(state: &mut SimState, dt: f32, events: &mut Vec<SimEvent>) -> Vec<Vec2> {
    let config = &state.config;
    let ring = &state.ring;
    let now = state.time;
    let mut escaped: Vec<(u32, Vec2)> = Vec::new();

    for orb in state.orbs.iter_mut().filter(|o| o.is_active()) {
        orb.vel.y += config.gravity * dt;
        orb.vel *= 1.0 - config.friction;
        orb.pos += orb.vel * dt;
        orb.life_clock -= dt;
        orb.jump_timer = (orb.jump_timer - dt).max(0.0);

        let (dist, theta) = cartesian_to_polar(orb.pos);
        if ring.gap_contains(theta) {
            // Inside the opening: free to pass, escapes once clear of the wall
            if beyond_ring(orb.pos, ring.radius, config.escape_clearance) {
                escaped.push((orb.id, orb.pos));
                continue;
            }
        } else {
            let hit = ring_wall_collision(orb.pos, orb.radius, ring.radius);
            if hit.hit {
                if orb.vel.dot(hit.normal) < 0.0 {
                    orb.vel = reflect_velocity(orb.vel, hit.normal);
                }
                let outward = if dist > 0.0 { orb.pos / dist } else { -hit.normal };
                orb.pos -= outward * hit.penetration;
                events.push(SimEvent::Bounce { id: orb.id });
                events.push(SimEvent::Sound {
                    effect: SoundEffect::Bounce,
                });
            }
        }

        if orb.life_clock <= 0.0 {
            orb.freeze(now);
            events.push(SimEvent::Frozen { id: orb.id });
            events.push(SimEvent::Sound {
                effect: SoundEffect::Freeze,
            });
        }
    }

    if escaped.is_empty() {
        return Vec::new();
    }

    state.orbs.retain(|o| !escaped.iter().any(|(id, _)| *id == o.id));
    escaped
        .into_iter()
        .map(|(id, pos)| {
            events.push(SimEvent::Escaped { id, pos });
            log::info!("Orb {} escaped", id);
            pos
        })
        .collect()
}

/// Age frozen orbs; old ones fade out and vanish
fn decay_frozen(state: &mut SimState, dt: f32, events: &mut Vec<SimEvent>) {
    let max_life = state.config.frozen_max_life;
    let fade_rate = state.config.frozen_fade_rate;
    let now = state.time;

    for orb in state.orbs.iter_mut() {
        if let OrbState::Frozen { frozen_at, ref mut age } = orb.state {
            // Frozen this tick: age starts counting next tick
            if frozen_at == now {
                continue;
            }
            *age += dt;
            if *age > max_life {
                orb.opacity = (orb.opacity - fade_rate * dt).max(0.0);
            }
        }
    }

    state.orbs.retain(|orb| {
        if orb.is_frozen() && orb.opacity <= 0.0 {
            events.push(SimEvent::Vanished { id: orb.id });
            events.push(SimEvent::Sound {
                effect: SoundEffect::Vanish,
            });
            false
        } else {
            true
        }
    });
}

/// Burst, clear every orb, and hold the purge status for the cooldown
fn trigger_purge(state: &mut SimState, escape_pos: Vec2, events: &mut Vec<SimEvent>) {
    if state.is_purging() {
        log::debug!("Purge already running, ignoring escape at {:?}", escape_pos);
        return;
    }

    state.burst(escape_pos, state.config.escape_burst, ParticleColor::Escape);
    let frozen_positions: Vec<Vec2> = state.orbs.iter().filter(|o| o.is_frozen()).map(|o| o.pos).collect();
    for pos in frozen_positions {
        state.burst(pos, state.config.frozen_burst, ParticleColor::Frozen);
    }

    let cleared = state.orbs.len();
    state.orbs.clear();
    state.purge_timer = Some(state.config.purge_cooldown);

    events.push(SimEvent::PurgeStarted { cleared });
    events.push(SimEvent::Sound {
        effect: SoundEffect::Purge,
    });
    log::info!("Purge! Cleared {} orbs", cleared);
}

fn update_particles(state: &mut SimState, dt: f32) {
    let gravity = state.config.particle_gravity;
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.vel.y += gravity * dt;
        particle.life -= particle.decay * dt;
    }
    state.particles.retain(|p| p.life > 0.0);
}
