//! Speed unit conversion.
//!
//! The receiver reports speed in meters per second; everything displayed
//! and every threshold in [`SessionConfig`](crate::config::SessionConfig)
//! is in kilometers per hour.

/// Kilometers per hour in one meter per second.
pub const KMH_PER_MPS: f32 = 3.6;

/// Convert meters per second to kilometers per hour.
///
/// Accepts any value, including negatives; callers own domain validity.
pub fn meters_per_second_to_kmh(mps: f32) -> f32 {
    mps * KMH_PER_MPS
}

/// Convert kilometers per hour to meters per second.
pub fn kmh_to_meters_per_second(kmh: f32) -> f32 {
    kmh / KMH_PER_MPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mps_to_kmh_known_values() {
        assert!((meters_per_second_to_kmh(10.0) - 36.0).abs() < 0.01);
        assert!((meters_per_second_to_kmh(20.0) - 72.0).abs() < 0.01);
        assert_eq!(meters_per_second_to_kmh(0.0), 0.0);
    }

    #[test]
    fn test_kmh_to_mps_known_values() {
        assert!((kmh_to_meters_per_second(36.0) - 10.0).abs() < 0.01);
        assert_eq!(kmh_to_meters_per_second(0.0), 0.0);
    }

    #[test]
    fn test_negative_values_pass_through() {
        assert!((meters_per_second_to_kmh(-1.0) + 3.6).abs() < 0.01);
        assert!((kmh_to_meters_per_second(-3.6) + 1.0).abs() < 0.01);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_roundtrip_property(mps in 0.0..500.0_f32) {
                let back = kmh_to_meters_per_second(meters_per_second_to_kmh(mps));
                prop_assert!(
                    (back - mps).abs() < 0.01,
                    "Roundtrip failed: {} -> {} (diff: {})",
                    mps, back, (back - mps).abs()
                );
            }

            #[test]
            fn test_conversion_preserves_order(a in 0.0..500.0_f32, b in 0.0..500.0_f32) {
                if a <= b {
                    prop_assert!(meters_per_second_to_kmh(a) <= meters_per_second_to_kmh(b));
                }
            }
        }
    }
}
