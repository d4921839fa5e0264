//! Metered consumption per unit.

/// Volume consumed between two readings, never negative.
///
/// A current reading below the previous one yields 0. Input validation is
/// expected to reject such readings before a calculation runs; this layer
/// only makes sure a bad reading cannot produce a credit.
pub fn consumption(current: f64, previous: f64) -> f64 {
    let delta = current - previous;
    // Also maps NaN to zero.
    if delta > 0.0 {
        delta
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::consumption;

    #[test]
    fn difference_of_readings() {
        assert_eq!(consumption(30.0, 0.0), 30.0);
        assert_eq!(consumption(125.5, 120.0), 5.5);
    }

    #[test]
    fn never_negative() {
        assert_eq!(consumption(10.0, 12.0), 0.0);
        assert_eq!(consumption(f64::NAN, 1.0), 0.0);
        assert_eq!(consumption(-5.0, -5.0), 0.0);
        for (cur, prev) in [(0.0, 1e9), (-3.0, 2.0), (1e-9, 0.0), (f64::NEG_INFINITY, 0.0)] {
            assert!(consumption(cur, prev) >= 0.0);
        }
    }
}
