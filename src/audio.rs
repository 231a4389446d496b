//! Audio triggers for the escape room
//!
//! The simulation only emits `SoundEffect`s. On the web they are synthesized
//! procedurally with the Web Audio API - no external files needed.

use serde::{Deserialize, Serialize};

use crate::sim::SimEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundEffect {
    /// Orb bounces off the ring or a frozen orb
    Bounce,
    /// Orb runs out of life and freezes
    Freeze,
    /// An orb escaped and the room is cleared
    Purge,
    /// A frozen orb finished fading out
    Vanish,
}

/// Anything that can play sound effects. Fire-and-forget.
pub trait AudioSink {
    fn play(&self, effect: SoundEffect);
}

/// Sink that drops every sound
#[derive(Debug, Clone, Copy, Default)]
pub struct MutedAudio;

impl AudioSink for MutedAudio {
    fn play(&self, _effect: SoundEffect) {}
}

/// Play the sound triggers out of a tick's events. Returns how many were played.
pub fn route_sounds(events: &[SimEvent], sink: &dyn AudioSink) -> usize {
    let mut played = 0;
    for event in events {
        if let SimEvent::Sound { effect } = event {
            sink.play(*effect);
            played += 1;
        }
    }
    played
}

#[cfg(target_arch = "wasm32")]
pub use web_audio::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web_audio {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect};
    use crate::settings::Settings;

    /// Web Audio backed sink
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Fails outside a secure context or without audio hardware
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
            }
        }

        /// Manager with the volume preferences from `settings`
        pub fn from_settings(settings: &Settings) -> Self {
            let mut manager = Self::new();
            manager.set_master_volume(settings.master_volume);
            manager.set_sfx_volume(settings.sfx_volume);
            manager.set_muted(settings.muted);
            manager
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Set master volume (0.0 - 1.0)
        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
        }

        /// Set SFX volume (0.0 - 1.0)
        pub fn set_sfx_volume(&mut self, vol: f32) {
            self.sfx_volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Oscillator routed through a gain node to the speakers
        fn create_osc(&self, ctx: &AudioContext, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Bounce - short soft ping
        fn play_bounce(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 520.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.06).ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.08).ok();
        }

        /// Freeze - glassy downward chime
        fn play_freeze(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 1400.0, OscillatorType::Triangle) {
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.3).ok();
                osc.frequency().set_value_at_time(1400.0, t).ok();
                osc.frequency().exponential_ramp_to_value_at_time(700.0, t + 0.25).ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.35).ok();
            }

            // Faint shimmer an octave up
            if let Some((osc, gain)) = self.create_osc(ctx, 2800.0, OscillatorType::Sine) {
                gain.gain().set_value_at_time(vol * 0.08, t).ok();
                gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.2).ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.25).ok();
            }
        }

        /// Purge - falling boom with a crack on top
        fn play_purge(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol * 0.5, t).ok();
                gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.6).ok();
                osc.frequency().set_value_at_time(120.0, t).ok();
                osc.frequency().exponential_ramp_to_value_at_time(30.0, t + 0.6).ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.7).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.1).ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.15).ok();
            }
        }

        /// Vanish - quiet fade-in/fade-out whoosh
        fn play_vanish(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 600.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(0.01, t).ok();
            gain.gain().linear_ramp_to_value_at_time(vol * 0.12, t + 0.08).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.3).ok();
            osc.frequency().set_value_at_time(600.0, t).ok();
            osc.frequency().exponential_ramp_to_value_at_time(200.0, t + 0.3).ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.35).ok();
        }
    }

    impl AudioSink for AudioManager {
        fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Bounce => self.play_bounce(ctx, vol),
                SoundEffect::Freeze => self.play_freeze(ctx, vol),
                SoundEffect::Purge => self.play_purge(ctx, vol),
                SoundEffect::Vanish => self.play_vanish(ctx, vol),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        played: RefCell<Vec<SoundEffect>>,
    }

    impl AudioSink for RecordingSink {
        fn play(&self, effect: SoundEffect) {
            self.played.borrow_mut().push(effect);
        }
    }

    #[test]
    fn test_route_sounds_in_order() {
        let events = vec![
            SimEvent::Spawned { id: 1 },
            SimEvent::Sound {
                effect: SoundEffect::Bounce,
            },
            SimEvent::Frozen { id: 1 },
            SimEvent::Sound {
                effect: SoundEffect::Freeze,
            },
            SimEvent::PurgeStarted { cleared: 3 },
            SimEvent::Sound {
                effect: SoundEffect::Purge,
            },
        ];
        let sink = RecordingSink::default();
        assert_eq!(route_sounds(&events, &sink), 3);
        assert_eq!(
            *sink.played.borrow(),
            vec![SoundEffect::Bounce, SoundEffect::Freeze, SoundEffect::Purge]
        );
    }

    #[test]
    fn test_muted_sink_accepts_everything() {
        let events = vec![SimEvent::Sound {
            effect: SoundEffect::Vanish,
        }];
        assert_eq!(route_sounds(&events, &MutedAudio), 1);
    }

    #[test]
    fn test_sound_event_json() {
        let json = serde_json::to_string(&SimEvent::Sound {
            effect: SoundEffect::Purge,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"sound","effect":"purge"}"#);
    }
}
