//! Capacity evaluation
//!
//! Pure decision logic for where a new or reactivated registration lands.
//! No capacity means unlimited; otherwise a slot is free while the count of
//! REGISTERED rows is below the cap. Cancelled and waiting rows never count.

use crate::models::registration::RegistrationStatus;

/// Decide the status of a new or reactivated registration
pub fn decide(max_capacity: Option<i32>, registered_count: i64) -> RegistrationStatus {
    match max_capacity {
        None => RegistrationStatus::Registered,
        Some(cap) if registered_count < i64::from(cap) => RegistrationStatus::Registered,
        Some(_) => RegistrationStatus::WaitingList,
    }
}

/// Free slots under a capacity, never negative
pub fn available_slots(max_capacity: Option<i32>, registered_count: i64) -> i64 {
    match max_capacity {
        None => i64::MAX,
        Some(cap) => (i64::from(cap) - registered_count).max(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unlimited_always_registers() {
        assert_eq!(decide(None, 0), RegistrationStatus::Registered);
        assert_eq!(decide(None, 1_000_000), RegistrationStatus::Registered);
    }

    #[test]
    fn test_boundary() {
        assert_eq!(decide(Some(2), 1), RegistrationStatus::Registered);
        assert_eq!(decide(Some(2), 2), RegistrationStatus::WaitingList);
        assert_eq!(decide(Some(2), 3), RegistrationStatus::WaitingList);
    }

    #[test]
    fn test_purity() {
        // Identical inputs give identical results across calls
        for _ in 0..3 {
            assert_eq!(decide(Some(5), 4), RegistrationStatus::Registered);
            assert_eq!(decide(Some(5), 5), RegistrationStatus::WaitingList);
        }
    }

    #[test]
    fn test_available_slots() {
        assert_eq!(available_slots(Some(4), 2), 2);
        assert_eq!(available_slots(Some(4), 4), 0);
        assert_eq!(available_slots(Some(4), 6), 0);
        assert_eq!(available_slots(None, 100), i64::MAX);
    }

    proptest! {
        #[test]
        fn prop_never_registers_past_capacity(cap in 1i32..10_000, count in 0i64..20_000) {
            let status = decide(Some(cap), count);
            if count >= i64::from(cap) {
                prop_assert_eq!(status, RegistrationStatus::WaitingList);
            } else {
                prop_assert_eq!(status, RegistrationStatus::Registered);
            }
        }

        #[test]
        fn prop_slots_plus_count_never_exceed_capacity(cap in 1i32..10_000, count in 0i64..20_000) {
            let slots = available_slots(Some(cap), count);
            prop_assert!(slots + count.min(i64::from(cap)) <= i64::from(cap));
        }
    }
}
