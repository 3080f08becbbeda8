//! Property-based tests for conversation key derivation
//!
//! Uses proptest to generate ids and verify the derived key does not depend
//! on argument order.

use proptest::prelude::*;
use securechat::backend::chat::key::{derive, derive_for_users};
use uuid::Uuid;

/// A 36-character id over `0-9a-z` in 8-4-4-4-12 layout
fn base36_id() -> impl Strategy<Value = String> {
    "[0-9a-z]{8}-[0-9a-z]{4}-[0-9a-z]{4}-[0-9a-z]{4}-[0-9a-z]{12}"
}

proptest! {
    #[test]
    fn test_derive_is_commutative(a in base36_id(), b in base36_id()) {
        prop_assert_eq!(derive(&a, &b).unwrap(), derive(&b, &a).unwrap());
    }

    #[test]
    fn test_derive_keeps_layout(a in base36_id(), b in base36_id()) {
        let id = derive(&a, &b).unwrap();
        let groups: Vec<usize> = id.as_str().split('-').map(str::len).collect();
        prop_assert_eq!(groups, vec![8, 4, 4, 4, 12]);
    }

    #[test]
    fn test_derive_for_users_matches_text_form(a in any::<u128>(), b in any::<u128>()) {
        let (a, b) = (Uuid::from_u128(a), Uuid::from_u128(b));
        prop_assert_eq!(
            derive_for_users(a, b),
            derive(&a.to_string(), &b.to_string()).unwrap()
        );
        prop_assert_eq!(derive_for_users(a, b), derive_for_users(b, a));
    }

    #[test]
    fn test_short_ids_are_rejected(a in base36_id(), cut in 0usize..36) {
        prop_assert!(derive(&a[..cut], &a).is_err());
    }
}
