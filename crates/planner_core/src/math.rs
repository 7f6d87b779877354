//! Fixed-point math utilities for deterministic gathering.
//!
//! Resource throughput is fractional (a worker earns well under one mineral
//! per frame), so income is computed in fixed point and floored back to
//! whole resources. Floating-point is reserved for search scoring, which
//! never feeds back into simulated state.

use fixed::types::I32F32;

/// Fixed-point number type for throughput math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Whole resources earned by `workers` gathering for `frames`, each worker
/// bringing back `per_trip` every `trip_frames`.
#[must_use]
pub fn income(workers: u32, frames: u32, per_trip: i32, trip_frames: u32) -> i32 {
    if trip_frames == 0 {
        return 0;
    }
    let yielded = u64::from(workers) * u64::from(frames) * u64::from(per_trip.unsigned_abs());
    let earned = Fixed::saturating_from_num(yielded) / Fixed::from_num(trip_frames);
    earned.to_num::<i32>()
}

/// Integer division rounding towards positive infinity.
#[must_use]
pub const fn ceil_div(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return u64::MAX;
    }
    numerator.div_ceil(denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_floors() {
        // One full trip yields exactly one load.
        assert_eq!(income(1, 176, 8, 176), 8);
        // Half a trip yields half a load.
        assert_eq!(income(1, 88, 8, 176), 4);
        // Just under one mineral floors to zero.
        assert_eq!(income(1, 21, 8, 176), 0);
        assert_eq!(income(4, 176, 8, 176), 32);
        assert_eq!(income(3, 37, 8, 110), 8);
    }

    #[test]
    fn test_income_without_workers() {
        assert_eq!(income(0, 1000, 8, 176), 0);
        assert_eq!(income(5, 0, 8, 176), 0);
    }

    #[test]
    fn test_ceil_div() {
        assert_eq!(ceil_div(10, 3), 4);
        assert_eq!(ceil_div(9, 3), 3);
        assert_eq!(ceil_div(0, 3), 0);
        assert_eq!(ceil_div(5, 0), u64::MAX);
    }
}
