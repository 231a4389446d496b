//! Simulation state and core entity types
//!
//! Everything the escape room needs between ticks lives in `SimState`. The
//! renderer and UI only see it through `snapshot()` and the counters.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arc::Ring;
use crate::audio::SoundEffect;
use crate::settings::{Difficulty, EngineConfig};

/// Whether the simulation advances on tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    Running,
    Paused,
}

/// Orb lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrbState {
    /// Moving, colliding, counting down its life clock
    Active,
    /// Stuck in place. `age` is seconds since freezing
    Frozen { frozen_at: f32, age: f32 },
}

/// An orb (one per new follower)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orb {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub state: OrbState,
    /// Seconds left before freezing (counts down while active)
    pub life_clock: f32,
    /// Life clock the orb was spawned with
    pub lifespan: f32,
    /// 1.0 until a frozen orb outlives `frozen_max_life`, then fades to 0
    pub opacity: f32,
    /// Remaining time of the "jumping" state after bouncing off a frozen orb
    pub jump_timer: f32,
    /// Display hue in degrees
    pub hue: f32,
}

impl Orb {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32, lifespan: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            state: OrbState::Active,
            life_clock: lifespan,
            lifespan,
            opacity: 1.0,
            jump_timer: 0.0,
            hue: 0.0,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == OrbState::Active
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        matches!(self.state, OrbState::Frozen { .. })
    }

    #[inline]
    pub fn is_jumping(&self) -> bool {
        self.jump_timer > 0.0
    }

    /// Freeze in place at simulation time `now`
    pub fn freeze(&mut self, now: f32) {
        self.vel = Vec2::ZERO;
        self.jump_timer = 0.0;
        self.life_clock = 0.0;
        self.state = OrbState::Frozen {
            frozen_at: now,
            age: 0.0,
        };
    }

    /// Remaining life as a fraction of the spawn lifespan
    pub fn life_ratio(&self) -> f32 {
        if self.lifespan > 0.0 {
            (self.life_clock / self.lifespan).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Which burst a particle came from (drives its color)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleColor {
    Escape,
    Frozen,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: ParticleColor,
    /// 0-1, decreases over time
    pub life: f32,
    /// Life lost per second
    pub decay: f32,
    pub size: f32,
}

/// A day's follower growth, as pushed in by the UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerEvent {
    pub delta: i64,
    /// Milliseconds since the epoch (only ordering matters)
    pub timestamp: f64,
}

/// Things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SimEvent {
    Spawned { id: u32 },
    Bounce { id: u32 },
    WallJump { id: u32 },
    Frozen { id: u32 },
    Vanished { id: u32 },
    Escaped { id: u32, pos: Vec2 },
    PurgeStarted { cleared: usize },
    PurgeEnded,
    DifficultyChanged { difficulty: Difficulty },
    Paused,
    Resumed,
    /// Audio trigger for the sound layer
    Sound { effect: SoundEffect },
}

/// Display counters for the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub active: usize,
    pub frozen: usize,
    pub pending: u64,
    pub status: String,
}

/// Render-ready orb
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: [u8; 3],
    pub opacity: f32,
    pub frozen: bool,
    pub jumping: bool,
    /// Countdown ring fraction for active orbs
    pub life_ratio: f32,
}

/// Render-ready particle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: [u8; 3],
    pub opacity: f32,
}

/// Everything a renderer needs for one frame (ring centered at origin)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub ring_radius: f32,
    pub ring_angle: f32,
    pub gap_width: f32,
    pub orbs: Vec<OrbView>,
    pub particles: Vec<ParticleView>,
    pub counters: Counters,
}

const FROZEN_RGB: [u8; 3] = [170, 220, 255];
const JUMPING_RGB: [u8; 3] = [255, 255, 255];
const ESCAPE_PARTICLE_RGB: [u8; 3] = [255, 210, 90];

/// Fully saturated, mid-lightness hue to RGB
fn hue_to_rgb(hue: f32) -> [u8; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    pub seed: u64,
    pub config: EngineConfig,
    pub phase: SimPhase,
    pub ring: Ring,
    /// All orbs, active and frozen, in spawn order
    pub orbs: Vec<Orb>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Orbs waiting to be spawned
    pub pending_orbs: u64,
    /// Seconds left in the current purge, if one is running
    pub purge_timer: Option<f32>,
    /// Simulation time in seconds
    pub time: f32,
    pub time_ticks: u64,
    last_follower_event: Option<f64>,
    rng: Pcg32,
    next_id: u32,
}

impl SimState {
    /// Create an empty escape room with the given seed
    pub fn new(seed: u64, config: EngineConfig) -> Self {
        let ring = Ring::new(config.ring_radius, config.gap_width);
        Self {
            seed,
            config,
            phase: SimPhase::Running,
            ring,
            orbs: Vec::new(),
            particles: Vec::new(),
            pending_orbs: 0,
            purge_timer: None,
            time: 0.0,
            time_ticks: 0,
            last_follower_event: None,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Uniform sample in [min, max]
    pub fn random_between(&mut self, min: f32, max: f32) -> f32 {
        let t: f32 = self.rng.random();
        min + (max - min) * t
    }

    /// Queue orbs for a day's follower growth.
    ///
    /// Returns false when the event is ignored: negative growth, a non-finite
    /// timestamp, or one not newer than the last accepted event.
    pub fn ingest_followers(&mut self, event: FollowerEvent) -> bool {
        if !event.timestamp.is_finite() {
            log::warn!("Ignoring follower event with bad timestamp {}", event.timestamp);
            return false;
        }
        if let Some(last) = self.last_follower_event {
            if event.timestamp <= last {
                log::debug!("Ignoring stale follower event at {}", event.timestamp);
                return false;
            }
        }
        if event.delta < 0 {
            log::warn!("Ignoring follower decrease of {}", event.delta);
            return false;
        }

        self.last_follower_event = Some(event.timestamp);
        let orbs = (event.delta as u64).saturating_mul(self.config.orbs_per_follower);
        self.pending_orbs = self.pending_orbs.saturating_add(orbs);
        log::info!("{} new followers queued {} orbs", event.delta, orbs);
        true
    }

    /// Spawn an active orb at the ring center with a random heading
    pub fn spawn_orb(&mut self) -> u32 {
        let id = self.next_entity_id();
        let angle = self.random_between(0.0, std::f32::consts::TAU);
        let speed = self.random_between(self.config.spawn_speed_min, self.config.spawn_speed_max);
        let lifespan = self.random_between(self.config.lifespan_min, self.config.lifespan_max);
        let hue = self.random_between(0.0, 360.0);

        let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
        let mut orb = Orb::new(id, Vec2::ZERO, vel, self.config.orb_radius, lifespan);
        orb.hue = hue;
        self.orbs.push(orb);
        id
    }

    /// Emit up to `count` particles at `pos`, within the particle budget
    pub fn burst(&mut self, pos: Vec2, count: usize, color: ParticleColor) {
        let budget = self.config.max_particles.saturating_sub(self.particles.len());
        for _ in 0..count.min(budget) {
            let angle = self.random_between(0.0, std::f32::consts::TAU);
            let speed = self.random_between(crate::consts::PARTICLE_SPEED_MIN, crate::consts::PARTICLE_SPEED_MAX);
            let decay = self.random_between(0.6, 1.4);
            let size = self.random_between(1.0, 4.0);
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color,
                life: 1.0,
                decay,
                size,
            });
        }
    }

    pub fn is_purging(&self) -> bool {
        self.purge_timer.is_some()
    }

    pub fn active_count(&self) -> usize {
        self.orbs.iter().filter(|o| o.is_active()).count()
    }

    pub fn frozen_count(&self) -> usize {
        self.orbs.iter().filter(|o| o.is_frozen()).count()
    }

    /// Human-readable status line
    pub fn status(&self) -> String {
        if self.is_purging() {
            "PURGING".to_string()
        } else if self.phase == SimPhase::Paused {
            "PAUSED".to_string()
        } else {
            self.config.difficulty.as_str().to_string()
        }
    }

    pub fn counters(&self) -> Counters {
        Counters {
            active: self.active_count(),
            frozen: self.frozen_count(),
            pending: self.pending_orbs,
            status: self.status(),
        }
    }

    /// Render-ready view of the current frame
    pub fn snapshot(&self) -> FrameSnapshot {
        let orbs = self
            .orbs
            .iter()
            .map(|orb| {
                let color = if orb.is_frozen() {
                    FROZEN_RGB
                } else if orb.is_jumping() {
                    JUMPING_RGB
                } else {
                    hue_to_rgb(orb.hue)
                };
                OrbView {
                    id: orb.id,
                    x: orb.pos.x,
                    y: orb.pos.y,
                    radius: orb.radius,
                    color,
                    opacity: orb.opacity,
                    frozen: orb.is_frozen(),
                    jumping: orb.is_jumping(),
                    life_ratio: orb.life_ratio(),
                }
            })
            .collect();

        let particles = self
            .particles
            .iter()
            .map(|p| ParticleView {
                x: p.pos.x,
                y: p.pos.y,
                size: p.size,
                color: match p.color {
                    ParticleColor::Escape => ESCAPE_PARTICLE_RGB,
                    ParticleColor::Frozen => FROZEN_RGB,
                },
                opacity: p.life.clamp(0.0, 1.0),
            })
            .collect();

        FrameSnapshot {
            ring_radius: self.ring.radius,
            ring_angle: self.ring.angle,
            gap_width: self.ring.gap_width,
            orbs,
            particles,
            counters: self.counters(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_rejects_decrease_and_stale_events() {
        let mut state = SimState::new(1, EngineConfig::default());
        assert!(state.ingest_followers(FollowerEvent { delta: 5, timestamp: 10.0 }));
        assert_eq!(state.pending_orbs, 5);

        assert!(!state.ingest_followers(FollowerEvent { delta: 3, timestamp: 10.0 }));
        assert!(!state.ingest_followers(FollowerEvent { delta: -2, timestamp: 11.0 }));
        assert_eq!(state.pending_orbs, 5);

        // A rejected decrease doesn't consume the timestamp
        assert!(state.ingest_followers(FollowerEvent { delta: 1, timestamp: 11.0 }));
        assert_eq!(state.pending_orbs, 6);
    }

    #[test]
    fn test_ingest_rejects_non_finite_timestamp() {
        let mut state = SimState::new(1, EngineConfig::default());
        assert!(!state.ingest_followers(FollowerEvent { delta: 1, timestamp: f64::NAN }));
        assert!(!state.ingest_followers(FollowerEvent { delta: 1, timestamp: f64::INFINITY }));
        assert!(state.ingest_followers(FollowerEvent { delta: 2, timestamp: 5.0 }));

        // Ordering still holds after the rejected events
        assert!(!state.ingest_followers(FollowerEvent { delta: 5, timestamp: -1.0 }));
        assert_eq!(state.pending_orbs, 2);
    }

    #[test]
    fn test_entity_ids_wrap() {
        let mut state = SimState::new(1, EngineConfig::default());
        state.next_id = u32::MAX;
        assert_eq!(state.next_entity_id(), u32::MAX);
        assert_eq!(state.next_entity_id(), 0);
    }

    #[test]
    fn test_orbs_per_follower_multiplies() {
        let mut config = EngineConfig::default();
        config.orbs_per_follower = 3;
        let mut state = SimState::new(1, config);
        state.ingest_followers(FollowerEvent { delta: 4, timestamp: 0.0 });
        assert_eq!(state.pending_orbs, 12);
    }

    #[test]
    fn test_spawned_orbs_respect_config_ranges() {
        let config = EngineConfig::default();
        let mut state = SimState::new(42, config.clone());
        for _ in 0..50 {
            state.spawn_orb();
        }
        for orb in &state.orbs {
            let speed = orb.vel.length();
            assert!(speed >= config.spawn_speed_min - 1e-3 && speed <= config.spawn_speed_max + 1e-3);
            assert!(orb.lifespan >= config.lifespan_min && orb.lifespan <= config.lifespan_max);
            assert_eq!(orb.pos, Vec2::ZERO);
        }
        let mut ids: Vec<u32> = state.orbs.iter().map(|o| o.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_burst_respects_particle_budget() {
        let mut config = EngineConfig::default();
        config.max_particles = 30;
        let mut state = SimState::new(7, config);
        state.burst(Vec2::ZERO, 20, ParticleColor::Escape);
        state.burst(Vec2::ZERO, 20, ParticleColor::Frozen);
        assert_eq!(state.particles.len(), 30);
    }

    #[test]
    fn test_freeze_zeroes_velocity() {
        let mut orb = Orb::new(1, Vec2::new(3.0, 4.0), Vec2::new(10.0, -5.0), 5.0, 4.0);
        orb.jump_timer = 0.2;
        orb.freeze(12.5);
        assert!(orb.is_frozen());
        assert_eq!(orb.vel, Vec2::ZERO);
        assert!(!orb.is_jumping());
        assert_eq!(orb.state, OrbState::Frozen { frozen_at: 12.5, age: 0.0 });
    }

    #[test]
    fn test_snapshot_counters_and_status() {
        let mut state = SimState::new(3, EngineConfig::for_difficulty(Difficulty::Hard));
        state.spawn_orb();
        state.spawn_orb();
        state.orbs[1].freeze(0.0);
        state.pending_orbs = 9;

        let snapshot = state.snapshot();
        assert_eq!(snapshot.orbs.len(), 2);
        assert_eq!(
            snapshot.counters,
            Counters {
                active: 1,
                frozen: 1,
                pending: 9,
                status: "Hard".to_string()
            }
        );
        assert_eq!(snapshot.orbs[1].color, FROZEN_RGB);

        state.purge_timer = Some(1.0);
        assert_eq!(state.status(), "PURGING");
    }

    #[test]
    fn test_hue_to_rgb_primaries() {
        assert_eq!(hue_to_rgb(0.0), [255, 0, 0]);
        assert_eq!(hue_to_rgb(120.0), [0, 255, 0]);
        assert_eq!(hue_to_rgb(240.0), [0, 0, 255]);
    }
}
