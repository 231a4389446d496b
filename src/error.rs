//! Error types for the reveal selector and day ledger.

use thiserror::Error;

/// Errors raised when a reveal request or a recorded day is invalid.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RevealError {
    #[error("image dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("pixels to reveal must not be negative, got {0}")]
    NegativeRevealCount(i64),
    #[error("image of {width}x{height} pixels exceeds the addressable index range")]
    ImageTooLarge { width: u32, height: u32 },
    #[error("follower count decreased from {previous} to {current}")]
    FollowerCountDecreased { previous: u64, current: u64 },
}
