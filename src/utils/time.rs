use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the UNIX epoch, used to timestamp orders and
/// snapshots.
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
