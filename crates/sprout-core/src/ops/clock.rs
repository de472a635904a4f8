use std::time::{SystemTime, UNIX_EPOCH};

///
/// ClockOps
///

pub struct ClockOps;

impl ClockOps {
    /// Seconds since the Unix epoch; a clock set before 1970 reads as zero.
    #[must_use]
    pub fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}
