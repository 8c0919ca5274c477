//! Unit tests for the Identifiers module
//!
//! Tests cover identifier creation, parsing, conversion, and display formatting.

use core_kernel::{EmployeeId, ClaimId, DisputeId, RefundId, NotificationId, ConversationId};
use std::collections::HashSet;
use uuid::Uuid;

mod employee_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = EmployeeId::new();
        let id2 = EmployeeId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = EmployeeId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = EmployeeId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = EmployeeId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_display_and_parse() {
        let id = EmployeeId::new();
        let display = id.to_string();
        assert!(display.starts_with("EMP-"));
        let parsed: EmployeeId = display.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("EMP-nope".parse::<EmployeeId>().is_err());
    }
}

#[test]
fn test_prefixes() {
    assert_eq!(ClaimId::prefix(), "CLM");
    assert_eq!(DisputeId::prefix(), "DSP");
    assert_eq!(RefundId::prefix(), "RFD");
    assert_eq!(NotificationId::prefix(), "NTF");
    assert_eq!(ConversationId::prefix(), "CNV");
}

#[test]
fn test_ids_are_hashable() {
    let mut set = HashSet::new();
    let id = ClaimId::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}

#[test]
fn test_serde_is_transparent() {
    let uuid = Uuid::new_v4();
    let id = RefundId::from_uuid(uuid);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{}\"", uuid));
}

mod parsing_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_display_parses_back(bytes in any::<[u8; 16]>()) {
            let id = RefundId::from_uuid(Uuid::from_bytes(bytes));
            let parsed: RefundId = id.to_string().parse().unwrap();
            prop_assert_eq!(parsed, id);

            let bare: RefundId = id.as_uuid().to_string().parse().unwrap();
            prop_assert_eq!(bare, id);
        }
    }
}
