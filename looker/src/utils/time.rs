use rand::Rng;
use std::time::Duration;

/// Sleeps for `base_ms` plus a uniformly random extra of up to `jitter_ms`.
pub async fn sleep_with_jitter(base_ms: u64, jitter_ms: u64) {
    tokio::time::sleep(jittered_delay(base_ms, jitter_ms)).await;
}

/// `base_ms` plus up to `jitter_ms`, saturating at `u64::MAX` milliseconds.
fn jittered_delay(base_ms: u64, jitter_ms: u64) -> Duration {
    let extra = if jitter_ms == 0 {
        0
    } else {
        rand::rng().random_range(0..=jitter_ms)
    };
    Duration::from_millis(base_ms.saturating_add(extra))
}
