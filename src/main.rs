//! Follower Reveal headless demo
//!
//! The browser build is driven from JavaScript through `follower_reveal::web`.
//! Natively this runs a short synthetic project: a week of follower counts
//! through the reveal ledger and the escape room.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Follower Reveal (native) starting...");

    let counts = [120_u64, 180, 260, 255, 400, 520, 700];
    run_reveal(&counts);
    run_escape_room(&counts);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn run_reveal(counts: &[u64]) {
    use follower_reveal::reveal::project_shuffle;
    use follower_reveal::{RevealLedger, RevealMode, RevealPolicy};

    let (width, height) = (1000, 1000);
    let seed = 20_240_611;
    let policy = RevealPolicy::for_image(RevealMode::Delta, 50, width, height);
    let mut ledger = RevealLedger::new(policy, seed, width, height);

    match project_shuffle(width, height, seed) {
        Ok(order) => log::info!("Project order starts {:?}", &order[..5]),
        Err(e) => log::warn!("Could not shuffle project: {}", e),
    }

    for &count in counts {
        match ledger.record_day(count) {
            Ok(reveal) => {
                let preview: Vec<u32> = reveal.pixels.iter().take(5).copied().collect();
                log::info!(
                    "Day {}: {:.2}% revealed, first pixels {:?}",
                    reveal.day.day_index,
                    ledger.reveal_fraction() * 100.0,
                    preview
                );
            }
            Err(e) => log::warn!("Day skipped: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run_escape_room(counts: &[u64]) {
    use follower_reveal::Settings;
    use follower_reveal::audio::{MutedAudio, route_sounds};
    use follower_reveal::sim::{FollowerTracker, SimEvent, SimState, TickInput, tick};

    const FRAME_DT: f32 = 1.0 / 60.0;
    const FRAMES_PER_DAY: u32 = 600;

    let settings = Settings::load();
    let mut state = SimState::new(7, settings.engine_config());
    let mut tracker = FollowerTracker::new();
    let input = TickInput::default();
    let mut purges = 0;
    let mut sounds = 0;

    for (day, &count) in counts.iter().enumerate() {
        match tracker.record(count, day as f64) {
            Ok(event) => {
                state.ingest_followers(event);
            }
            Err(e) => log::warn!("{}", e),
        }

        for _ in 0..FRAMES_PER_DAY {
            let events = tick(&mut state, &input, FRAME_DT);
            purges += events.iter().filter(|e| matches!(e, SimEvent::PurgeStarted { .. })).count();
            sounds += route_sounds(&events, &MutedAudio);
        }

        let counters = state.counters();
        log::info!(
            "Day {}: {} active, {} frozen, {} pending [{}]",
            day + 1,
            counters.active,
            counters.frozen,
            counters.pending,
            counters.status
        );
    }

    log::info!("Escape room finished: {} purges, {} sounds", purges, sounds);
}
