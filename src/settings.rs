//! Engine settings and difficulty presets
//!
//! Persisted in LocalStorage on the web; defaults everywhere else.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Named difficulty presets for the escape room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Impossible,
}

/// The three scalars a difficulty preset controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyParams {
    /// Downward acceleration on active orbs (pixels/s²)
    pub gravity: f32,
    /// Ring rotation speed (radians/s)
    pub ring_speed: f32,
    /// Fraction of velocity lost per step
    pub friction: f32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Impossible,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Impossible => "Impossible",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "impossible" => Some(Difficulty::Impossible),
            _ => None,
        }
    }

    pub fn params(&self) -> DifficultyParams {
        match self {
            Difficulty::Easy => DifficultyParams {
                gravity: 0.0,
                ring_speed: 0.3,
                friction: 0.0,
            },
            Difficulty::Normal => DifficultyParams {
                gravity: 40.0,
                ring_speed: 0.5,
                friction: 0.001,
            },
            Difficulty::Hard => DifficultyParams {
                gravity: 120.0,
                ring_speed: 0.9,
                friction: 0.003,
            },
            Difficulty::Impossible => DifficultyParams {
                gravity: 300.0,
                ring_speed: 1.6,
                friction: 0.006,
            },
        }
    }
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 500,
            QualityPreset::Medium => 2000,
            QualityPreset::High => 6000,
        }
    }
}

/// Tunables for the escape simulation.
///
/// `gravity`, `ring_speed` and `friction` come from the difficulty preset;
/// everything else is fixed engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub difficulty: Difficulty,
    pub gravity: f32,
    pub ring_speed: f32,
    pub friction: f32,

    // === Arena ===
    pub ring_radius: f32,
    pub gap_width: f32,
    pub escape_clearance: f32,

    // === Orbs ===
    /// Orbs queued per new follower
    pub orbs_per_follower: u64,
    pub orb_radius: f32,
    pub spawn_speed_min: f32,
    pub spawn_speed_max: f32,
    pub lifespan_min: f32,
    pub lifespan_max: f32,
    pub max_active_orbs: usize,
    pub restitution: f32,
    pub wall_jump_speed: f32,
    pub jump_duration: f32,
    pub frozen_max_life: f32,
    pub frozen_fade_rate: f32,

    // === Purge ===
    pub purge_cooldown: f32,
    pub purge_ring_speedup: f32,
    pub escape_burst: usize,
    pub frozen_burst: usize,

    // === Particles ===
    pub max_particles: usize,
    pub particle_gravity: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::default())
    }
}

impl EngineConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let params = difficulty.params();
        Self {
            difficulty,
            gravity: params.gravity,
            ring_speed: params.ring_speed,
            friction: params.friction,

            ring_radius: RING_RADIUS,
            gap_width: GAP_WIDTH,
            escape_clearance: ESCAPE_CLEARANCE,

            orbs_per_follower: 1,
            orb_radius: ORB_RADIUS,
            spawn_speed_min: ORB_SPAWN_SPEED_MIN,
            spawn_speed_max: ORB_SPAWN_SPEED_MAX,
            lifespan_min: ORB_LIFESPAN_MIN,
            lifespan_max: ORB_LIFESPAN_MAX,
            max_active_orbs: MAX_ACTIVE_ORBS,
            restitution: RESTITUTION,
            wall_jump_speed: WALL_JUMP_SPEED,
            jump_duration: JUMP_DURATION,
            frozen_max_life: FROZEN_MAX_LIFE,
            frozen_fade_rate: FROZEN_FADE_RATE,

            purge_cooldown: PURGE_COOLDOWN,
            purge_ring_speedup: PURGE_RING_SPEEDUP,
            escape_burst: ESCAPE_BURST,
            frozen_burst: FROZEN_BURST,

            max_particles: QualityPreset::default().max_particles(),
            particle_gravity: PARTICLE_GRAVITY,
        }
    }

    /// Swap the difficulty scalars, leaving all other tuning untouched
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        let params = difficulty.params();
        self.difficulty = difficulty;
        self.gravity = params.gravity;
        self.ring_speed = params.ring_speed;
        self.friction = params.friction;
    }
}

/// User-facing settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset (particle budget)
    pub quality: QualityPreset,
    /// Particle effects on purge
    pub particles: bool,
    pub difficulty: Difficulty,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            difficulty: Difficulty::Normal,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Engine configuration these settings select
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::for_difficulty(self.difficulty);
        config.max_particles = self.max_particles();
        config
    }

    /// Parse settings JSON, falling back to defaults for missing fields
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("Ignoring malformed settings: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "follower_reveal_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Some(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
