//! Tests for strongly-typed identifiers

use core_kernel::{BillId, BillSplitId, ExpenseId, GroupId, UserId};
use uuid::Uuid;

mod user_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let a = UserId::new();
        let b = UserId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_ids_are_time_ordered() {
        let first = UserId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = UserId::new();
        assert!(first < second);
    }

    #[test]
    fn test_display_format() {
        let uuid = Uuid::now_v7();
        let id = UserId::from_uuid(uuid);
        assert_eq!(id.to_string(), format!("USR-{}", uuid));
    }

    #[test]
    fn test_json_serializes_bare_uuid() {
        let uuid = Uuid::now_v7();
        let json = serde_json::to_string(&UserId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}

mod parsing_tests {
    use super::*;

    #[test]
    fn test_from_str_with_prefix() {
        let id = BillId::new();
        let parsed: BillId = format!("BIL-{}", id.as_uuid()).parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("BIL-not-a-uuid".parse::<BillId>().is_err());
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(UserId::prefix(), "USR");
        assert_eq!(GroupId::prefix(), "GRP");
        assert_eq!(BillId::prefix(), "BIL");
        assert_eq!(BillSplitId::prefix(), "SPL");
        assert_eq!(ExpenseId::prefix(), "EXP");
    }
}
