//! CPU-bound busy-wait
//!
//! Emulates transaction logic of a configurable cost. The executing thread
//! spins on arithmetic until the elapsed time reaches the target; it never
//! sleeps or yields, so the cost shows up as CPU time under whatever
//! scheduling policy the caller uses.

use std::hint::black_box;
use std::time::Duration;

/// Iterations of arithmetic between two time readings
const ROUND_ITERATIONS: u32 = 1000;

/// One round of throwaway arithmetic
#[inline]
fn spin_round() {
    for _ in 0..ROUND_ITERATIONS {
        let mut x = black_box(100u64);
        x += 2;
        x = x.wrapping_mul(x);
        black_box(x);
    }
}

/// Spin until `elapsed()` has advanced by at least `duration`
///
/// `elapsed` is a monotonic reading; the first call marks the start.
/// Returns the number of spin rounds executed. A zero duration returns
/// immediately without spinning.
pub fn busy_wait<F>(mut elapsed: F, duration: Duration) -> u64
where
    F: FnMut() -> Duration,
{
    let begin = elapsed();
    let mut rounds = 0;
    while elapsed().saturating_sub(begin) < duration {
        spin_round();
        rounds += 1;
    }
    rounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_zero_duration_does_not_spin() {
        let origin = Instant::now();
        assert_eq!(busy_wait(|| origin.elapsed(), Duration::ZERO), 0);
    }

    #[test]
    fn test_spins_until_duration_reached() {
        let origin = Instant::now();
        let target = Duration::from_millis(5);
        let rounds = busy_wait(|| origin.elapsed(), target);
        assert!(rounds > 0);
        assert!(origin.elapsed() >= target);
    }

    #[test]
    fn test_rounds_follow_readings() {
        // Readings 0, 1, 2, 3 ms: spins while elapsed < 3 ms
        let mut now = Duration::ZERO;
        let rounds = busy_wait(
            || {
                let reading = now;
                now += Duration::from_millis(1);
                reading
            },
            Duration::from_millis(3),
        );
        assert_eq!(rounds, 2);
    }
}
