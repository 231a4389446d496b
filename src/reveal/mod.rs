//! Deterministic pixel reveal
//!
//! Every pixel of the image is shuffled once per (seed, day) with Mulberry32 and
//! a Fisher-Yates pass; a day's reveal is a prefix of that shuffle. Growing the
//! reveal count therefore only ever appends pixels for the same day.

pub mod mulberry;

pub use mulberry::Mulberry32;

use serde::{Deserialize, Serialize};

use crate::error::RevealError;

/// Inputs for a single reveal selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealRequest {
    pub image_width: u32,
    pub image_height: u32,
    /// Number of pixels to reveal (clamped to the pixel count)
    pub pixels_to_reveal: i64,
    pub seed: i64,
    pub day_index: u32,
}

impl RevealRequest {
    /// Total pixel count, validated to fit the u32 index space
    pub fn total_pixels(&self) -> Result<u32, RevealError> {
        let (width, height) = (self.image_width, self.image_height);
        if width == 0 || height == 0 {
            return Err(RevealError::InvalidDimensions { width, height });
        }
        width
            .checked_mul(height)
            .ok_or(RevealError::ImageTooLarge { width, height })
    }
}

/// Select which pixels are revealed, in reveal order.
///
/// Indices are 0-based and row-major. The same request always yields the same
/// sequence, and a larger `pixels_to_reveal` extends a smaller one.
pub fn select_revealed_pixels(request: &RevealRequest) -> Result<Vec<u32>, RevealError> {
    let total = request.total_pixels()?;
    if request.pixels_to_reveal < 0 {
        return Err(RevealError::NegativeRevealCount(request.pixels_to_reveal));
    }

    let count = (request.pixels_to_reveal as u64).min(u64::from(total)) as usize;
    if count == 0 {
        return Ok(Vec::new());
    }

    let mut rng = Mulberry32::for_day(request.seed, request.day_index);
    let mut indices = shuffled_indices(total, &mut rng);
    indices.truncate(count);

    log::debug!(
        "Revealed {} of {} pixels (seed {}, day {})",
        count,
        total,
        request.seed,
        request.day_index
    );
    Ok(indices)
}

/// Full seed-only shuffle of an image's pixels (no day offset).
///
/// This is the ordering a project precomputes once when it is created.
pub fn project_shuffle(image_width: u32, image_height: u32, seed: i64) -> Result<Vec<u32>, RevealError> {
    let request = RevealRequest {
        image_width,
        image_height,
        pixels_to_reveal: 0,
        seed,
        day_index: 0,
    };
    let total = request.total_pixels()?;
    let mut rng = Mulberry32::new(seed as u32);
    Ok(shuffled_indices(total, &mut rng))
}

/// Identity sequence [0, total) shuffled in place, last index down to 1
fn shuffled_indices(total: u32, rng: &mut Mulberry32) -> Vec<u32> {
    let mut indices: Vec<u32> = (0..total).collect();
    for i in (1..indices.len()).rev() {
        let j = rng.next_index(i + 1);
        indices.swap(i, j);
    }
    indices
}

/// How follower counts translate into a reveal count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealMode {
    /// Reveal is proportional to the current total follower count
    #[default]
    Total,
    /// Each day adds pixels for the followers gained since the previous day
    Delta,
}

impl RevealMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevealMode::Total => "total",
            RevealMode::Delta => "delta",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "total" => Some(RevealMode::Total),
            "delta" => Some(RevealMode::Delta),
            _ => None,
        }
    }
}

/// Reveal-count policy for a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealPolicy {
    pub mode: RevealMode,
    pub pixels_per_follower: u64,
    pub max_pixels_cap: u64,
}

impl RevealPolicy {
    pub fn new(mode: RevealMode, pixels_per_follower: u64, max_pixels_cap: u64) -> Self {
        Self {
            mode,
            pixels_per_follower,
            max_pixels_cap,
        }
    }

    /// Policy capped at the full pixel count of an image
    pub fn for_image(mode: RevealMode, pixels_per_follower: u64, image_width: u32, image_height: u32) -> Self {
        let cap = u64::from(image_width) * u64::from(image_height);
        Self::new(mode, pixels_per_follower, cap)
    }

    /// Pixels to reveal for today's follower count.
    ///
    /// Delta mode works on an explicit delta against the previous day's
    /// follower count and builds on the previous day's reveal.
    pub fn pixels_to_reveal(&self, follower_count: u64, previous: Option<&Day>) -> Result<u64, RevealError> {
        let uncapped = match self.mode {
            RevealMode::Total => follower_count.saturating_mul(self.pixels_per_follower),
            RevealMode::Delta => {
                let (prev_followers, prev_revealed) = previous
                    .map(|d| (d.follower_count, d.pixels_revealed))
                    .unwrap_or((0, 0));
                if follower_count < prev_followers {
                    return Err(RevealError::FollowerCountDecreased {
                        previous: prev_followers,
                        current: follower_count,
                    });
                }
                let gained = follower_count - prev_followers;
                prev_revealed.saturating_add(gained.saturating_mul(self.pixels_per_follower))
            }
        };
        Ok(uncapped.min(self.max_pixels_cap))
    }
}

/// One recorded day of a reveal project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub day_index: u32,
    pub follower_count: u64,
    pub pixels_revealed: u64,
}

/// A recorded day plus the pixels it reveals
#[derive(Debug, Clone)]
pub struct DayReveal {
    pub day: Day,
    pub pixels: Vec<u32>,
}

/// Day-by-day reveal history for one project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealLedger {
    pub policy: RevealPolicy,
    pub seed: i64,
    pub image_width: u32,
    pub image_height: u32,
    days: Vec<Day>,
}

impl RevealLedger {
    pub fn new(policy: RevealPolicy, seed: i64, image_width: u32, image_height: u32) -> Self {
        Self {
            policy,
            seed,
            image_width,
            image_height,
            days: Vec::new(),
        }
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn last_day(&self) -> Option<&Day> {
        self.days.last()
    }

    /// Index the next recorded day will get (first day is 1)
    pub fn next_day_index(&self) -> u32 {
        self.last_day().map(|d| d.day_index + 1).unwrap_or(1)
    }

    /// Record today's follower count and compute its reveal
    pub fn record_day(&mut self, follower_count: u64) -> Result<DayReveal, RevealError> {
        let day_index = self.next_day_index();
        let count = self.policy.pixels_to_reveal(follower_count, self.last_day())?;

        let request = RevealRequest {
            image_width: self.image_width,
            image_height: self.image_height,
            pixels_to_reveal: i64::try_from(count).unwrap_or(i64::MAX),
            seed: self.seed,
            day_index,
        };
        let pixels = select_revealed_pixels(&request)?;

        let day = Day {
            day_index,
            follower_count,
            pixels_revealed: pixels.len() as u64,
        };
        self.days.push(day);
        log::info!(
            "Day {}: {} followers, {} pixels revealed ({} mode)",
            day_index,
            follower_count,
            day.pixels_revealed,
            self.policy.mode.as_str()
        );

        Ok(DayReveal { day, pixels })
    }

    /// Fraction of the cap revealed by the latest day, in [0, 1]
    pub fn reveal_fraction(&self) -> f64 {
        match self.last_day() {
            Some(day) if self.policy.max_pixels_cap > 0 => {
                day.pixels_revealed as f64 / self.policy.max_pixels_cap as f64
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn request(w: u32, h: u32, k: i64, seed: i64, day: u32) -> RevealRequest {
        RevealRequest {
            image_width: w,
            image_height: h,
            pixels_to_reveal: k,
            seed,
            day_index: day,
        }
    }

    #[test]
    fn test_two_by_two_permutation() {
        let req = request(2, 2, 4, 42, 1);
        let first = select_revealed_pixels(&req).unwrap();
        assert_eq!(first, vec![2, 1, 0, 3]);

        let again = select_revealed_pixels(&req).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_reference_shuffle_ten() {
        let pixels = select_revealed_pixels(&request(5, 2, 10, 42, 1)).unwrap();
        assert_eq!(pixels, vec![8, 1, 7, 5, 3, 6, 0, 4, 2, 9]);
    }

    #[test]
    fn test_zero_reveal_is_empty() {
        let pixels = select_revealed_pixels(&request(10, 10, 0, 7, 3)).unwrap();
        assert!(pixels.is_empty());
    }

    #[test]
    fn test_over_large_request_clamps() {
        let pixels = select_revealed_pixels(&request(3, 3, 1_000, 7, 3)).unwrap();
        assert_eq!(pixels.len(), 9);
    }

    #[test]
    fn test_invalid_arguments() {
        assert_eq!(
            select_revealed_pixels(&request(0, 10, 5, 1, 1)),
            Err(RevealError::InvalidDimensions { width: 0, height: 10 })
        );
        assert_eq!(
            select_revealed_pixels(&request(10, 10, -1, 1, 1)),
            Err(RevealError::NegativeRevealCount(-1))
        );
        assert_eq!(
            select_revealed_pixels(&request(u32::MAX, 2, 1, 1, 1)),
            Err(RevealError::ImageTooLarge { width: u32::MAX, height: 2 })
        );
    }

    #[test]
    fn test_day_changes_shuffle() {
        let day1 = select_revealed_pixels(&request(32, 32, 1024, 99, 1)).unwrap();
        let day2 = select_revealed_pixels(&request(32, 32, 1024, 99, 2)).unwrap();
        assert_ne!(day1, day2);
    }

    #[test]
    fn test_project_shuffle_ignores_day() {
        let full = project_shuffle(4, 4, 12345).unwrap();
        assert_eq!(full.len(), 16);
        assert_eq!(&full[..8], &[9, 1, 8, 12, 14, 2, 5, 7]);
    }

    #[test]
    fn test_total_policy_caps() {
        let policy = RevealPolicy::new(RevealMode::Total, 10, 500);
        assert_eq!(policy.pixels_to_reveal(20, None), Ok(200));
        assert_eq!(policy.pixels_to_reveal(80, None), Ok(500));
    }

    #[test]
    fn test_delta_policy_builds_on_previous_day() {
        let policy = RevealPolicy::new(RevealMode::Delta, 3, 1_000);
        let previous = Day {
            day_index: 1,
            follower_count: 100,
            pixels_revealed: 300,
        };
        assert_eq!(policy.pixels_to_reveal(150, Some(&previous)), Ok(450));
        assert_eq!(policy.pixels_to_reveal(1_000, Some(&previous)), Ok(1_000));
        assert_eq!(
            policy.pixels_to_reveal(90, Some(&previous)),
            Err(RevealError::FollowerCountDecreased {
                previous: 100,
                current: 90
            })
        );
    }

    #[test]
    fn test_ledger_records_days() {
        let policy = RevealPolicy::for_image(RevealMode::Delta, 2, 10, 10);
        let mut ledger = RevealLedger::new(policy, 5, 10, 10);
        assert_eq!(ledger.next_day_index(), 1);

        let first = ledger.record_day(10).unwrap();
        assert_eq!(first.day.day_index, 1);
        assert_eq!(first.pixels.len(), 20);

        let second = ledger.record_day(25).unwrap();
        assert_eq!(second.day.day_index, 2);
        assert_eq!(second.day.pixels_revealed, 50);
        assert!((ledger.reveal_fraction() - 0.5).abs() < 1e-9);

        assert!(ledger.record_day(5).is_err());
        assert_eq!(ledger.days().len(), 2);
    }

    #[test]
    fn test_reveal_mode_names() {
        assert_eq!(RevealMode::from_str("DELTA"), Some(RevealMode::Delta));
        assert_eq!(RevealMode::from_str(RevealMode::Total.as_str()), Some(RevealMode::Total));
        assert_eq!(RevealMode::from_str("escape"), None);
    }

    proptest! {
        #[test]
        fn prop_unique_and_in_range(w in 1u32..24, h in 1u32..24, seed in any::<i64>(), day in 1u32..1000, k in 0i64..600) {
            let pixels = select_revealed_pixels(&request(w, h, k, seed, day)).unwrap();
            let total = w * h;
            prop_assert_eq!(pixels.len() as i64, k.min(i64::from(total)));
            let unique: HashSet<u32> = pixels.iter().copied().collect();
            prop_assert_eq!(unique.len(), pixels.len());
            prop_assert!(pixels.iter().all(|&p| p < total));
        }

        #[test]
        fn prop_prefix_extension(w in 1u32..24, h in 1u32..24, seed in any::<i64>(), day in 1u32..1000, a in 0i64..600, b in 0i64..600) {
            let (k1, k2) = if a <= b { (a, b) } else { (b, a) };
            let small = select_revealed_pixels(&request(w, h, k1, seed, day)).unwrap();
            let large = select_revealed_pixels(&request(w, h, k2, seed, day)).unwrap();
            prop_assert!(large.starts_with(&small));
        }

        #[test]
        fn prop_deterministic(w in 1u32..24, h in 1u32..24, seed in any::<i64>(), day in 1u32..1000, k in 0i64..600) {
            let req = request(w, h, k, seed, day);
            prop_assert_eq!(select_revealed_pixels(&req).unwrap(), select_revealed_pixels(&req).unwrap());

            let mut a = Mulberry32::for_day(seed, day);
            let mut b = Mulberry32::for_day(seed, day);
            for _ in 0..32 {
                prop_assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
            }
        }
    }
}
