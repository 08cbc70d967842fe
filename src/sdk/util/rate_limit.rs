use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::thread;

pub type Limiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Hosted ORS free tier allows 40 directions requests per minute.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 40;

pub fn ors_limiter(requests_per_minute: u32) -> Limiter {
    let per_minute = NonZeroU32::new(requests_per_minute)
        .or(NonZeroU32::new(DEFAULT_REQUESTS_PER_MINUTE))
        .unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)))
}

/// Blocks the calling thread until the limiter grants a permit.
pub fn wait_for_permit(limiter: &Limiter) {
    let clock = DefaultClock::default();
    while let Err(not_until) = limiter.check() {
        let wait = not_until.wait_time_from(clock.now());
        log::debug!("ORS quota exhausted, waiting {:?}", wait);
        thread::sleep(wait);
    }
}
