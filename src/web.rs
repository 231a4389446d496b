//! Browser bindings
//!
//! JavaScript owns the `requestAnimationFrame` loop and the canvas; it calls
//! `EscapeEngine::frame` once per frame and draws the returned snapshot.

use wasm_bindgen::prelude::*;

use crate::audio::{AudioManager, route_sounds};
use crate::clamp_frame_dt;
use crate::reveal::RevealRequest;
use crate::settings::{Difficulty, QualityPreset, Settings};
use crate::sim::{FollowerEvent, FollowerTracker, SimPhase, SimState, TickInput, tick};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("follower-reveal loaded");
}

/// Pixels revealed for a day, in reveal order (0-based, row-major)
#[wasm_bindgen(js_name = selectRevealedPixels)]
pub fn select_revealed_pixels(
    image_width: u32,
    image_height: u32,
    pixels_to_reveal: i64,
    seed: i64,
    day_index: u32,
) -> Result<Vec<u32>, JsError> {
    let request = RevealRequest {
        image_width,
        image_height,
        pixels_to_reveal,
        seed,
        day_index,
    };
    Ok(crate::reveal::select_revealed_pixels(&request)?)
}

/// The escape room, driven frame by frame from JavaScript
#[wasm_bindgen]
pub struct EscapeEngine {
    state: SimState,
    settings: Settings,
    audio: AudioManager,
    followers: FollowerTracker,
    input: TickInput,
}

#[wasm_bindgen]
impl EscapeEngine {
    /// New engine. `difficulty` overrides the stored preference when it names a preset.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, difficulty: Option<String>) -> EscapeEngine {
        let mut settings = Settings::load();
        if let Some(difficulty) = difficulty.as_deref().and_then(Difficulty::from_str) {
            settings.difficulty = difficulty;
        }
        log::info!("Escape room seeded with {} ({})", seed, settings.difficulty.as_str());

        EscapeEngine {
            state: SimState::new(seed, settings.engine_config()),
            audio: AudioManager::from_settings(&settings),
            settings,
            followers: FollowerTracker::new(),
            input: TickInput::default(),
        }
    }

    /// Queue orbs for follower growth. Returns false if the event was ignored.
    #[wasm_bindgen(js_name = pushFollowers)]
    pub fn push_followers(&mut self, delta: i64, timestamp: f64) -> bool {
        self.state.ingest_followers(FollowerEvent { delta, timestamp })
    }

    /// Queue orbs from an absolute daily follower count
    #[wasm_bindgen(js_name = pushFollowerCount)]
    pub fn push_follower_count(&mut self, count: u64, timestamp: f64) -> Result<bool, JsError> {
        let event = self.followers.record(count, timestamp)?;
        Ok(self.state.ingest_followers(event))
    }

    #[wasm_bindgen(js_name = setPaused)]
    pub fn set_paused(&mut self, paused: bool) {
        let is_paused = self.state.phase == SimPhase::Paused;
        // Pause is a toggle; only request it when the state differs
        self.input.pause = paused != is_paused;
    }

    /// Switch difficulty by name. Returns false for an unknown preset.
    #[wasm_bindgen(js_name = setDifficulty)]
    pub fn set_difficulty(&mut self, name: &str) -> bool {
        let Some(difficulty) = Difficulty::from_str(name) else {
            log::warn!("Unknown difficulty: {}", name);
            return false;
        };
        self.input.difficulty = Some(difficulty);
        self.settings.difficulty = difficulty;
        self.settings.save();
        true
    }

    /// Switch the particle quality preset by name. Returns false for an unknown preset.
    #[wasm_bindgen(js_name = setQuality)]
    pub fn set_quality(&mut self, name: &str) -> bool {
        let Some(quality) = QualityPreset::from_str(name) else {
            log::warn!("Unknown quality preset: {}", name);
            return false;
        };
        self.settings.quality = quality;
        self.state.config.max_particles = self.settings.max_particles();
        self.settings.save();
        log::info!("Quality set to {}", quality.as_str());
        true
    }

    /// Resume audio (call from a user gesture)
    #[wasm_bindgen(js_name = resumeAudio)]
    pub fn resume_audio(&self) {
        self.audio.resume();
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
        self.settings.muted = muted;
        self.settings.save();
    }

    /// Advance by `dt` seconds and return the frame snapshot as JSON
    pub fn frame(&mut self, dt: f32) -> Result<String, JsError> {
        let dt = clamp_frame_dt(dt);
        let events = tick(&mut self.state, &self.input, dt);

        // Clear one-shot inputs after processing
        self.input = TickInput::default();

        route_sounds(&events, &self.audio);
        Ok(serde_json::to_string(&self.state.snapshot())?)
    }

    /// Display counters as JSON
    pub fn counters(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.state.counters())?)
    }
}
