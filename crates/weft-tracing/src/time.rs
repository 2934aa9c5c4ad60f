use std::time::Instant;

lazy_static::lazy_static! {
    // Shared by every thread so cross-thread skew is bounded by clock
    // precision rather than by differing epochs.
    static ref TRACE_EPOCH: Instant = Instant::now();
}

/// Monotonic microseconds since the first use of the tracer, truncated to 32
/// bits. Wraps roughly every 71 minutes; consumers reconstruct absolute time
/// externally.
#[inline]
pub fn now_micros() -> u32 {
    TRACE_EPOCH.elapsed().as_micros() as u32
}
