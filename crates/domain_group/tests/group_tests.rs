//! Tests for the group aggregate

use chrono::Utc;

use core_kernel::UserId;
use domain_group::group::{validate_description, validate_name};
use domain_group::{Group, GroupError, MemberSummary};

fn summary(name: &str) -> MemberSummary {
    MemberSummary {
        user_id: UserId::new(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        joined_at: Utc::now(),
    }
}

mod membership_tests {
    use super::*;

    #[test]
    fn test_admin_is_participant_but_not_member() {
        let admin = summary("Alice");
        let group = Group::new("Trip", None, admin.clone());

        assert!(group.is_admin(admin.user_id));
        assert!(group.is_participant(admin.user_id));
        assert!(!group.is_member(admin.user_id));
        assert!(!group.is_participant(UserId::new()));
    }

    #[test]
    fn test_billable_members_admin_first_then_join_order() {
        let admin = summary("Alice");
        let bob = summary("Bob");
        let carol = summary("Carol");
        let mut group = Group::new("Trip", None, admin.clone());
        group.add_member(bob.clone()).unwrap();
        group.add_member(carol.clone()).unwrap();

        assert_eq!(
            group.billable_members(),
            vec![admin.user_id, bob.user_id, carol.user_id]
        );
        assert_eq!(group.participant_count(), 3);
    }

    #[test]
    fn test_billable_members_deduplicates_admin_listed_as_member() {
        let admin = summary("Alice");
        let mut group = Group::new("Trip", None, admin.clone());
        // Rows loaded from storage may list the admin as a member as well
        group.members.push(admin.clone());

        assert_eq!(group.billable_members(), vec![admin.user_id]);
    }

    #[test]
    fn test_add_member_twice_conflicts() {
        let bob = summary("Bob");
        let mut group = Group::new("Trip", None, summary("Alice"));
        group.add_member(bob.clone()).unwrap();

        let err = group.add_member(bob).unwrap_err();
        assert!(matches!(err, GroupError::AlreadyMember { .. }));
        assert_eq!(group.members.len(), 1);
    }

    #[test]
    fn test_group_serializes_camel_case() {
        let group = Group::new("Trip", Some("Lisbon".into()), summary("Alice"));
        let json = serde_json::to_value(&group).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json["admin"].get("userId").is_some());
    }
}

mod validation_tests {
    use super::*;

    #[test]
    fn test_name_rules() {
        assert_eq!(validate_name("  Trip ").unwrap(), "Trip");
        assert!(validate_name("").is_err());
        assert!(validate_name(&"n".repeat(101)).is_err());
    }

    #[test]
    fn test_description_rules() {
        assert_eq!(validate_description(Some("  ".into())).unwrap(), None);
        assert_eq!(validate_description(None).unwrap(), None);
        assert!(validate_description(Some("d".repeat(501))).is_err());
    }
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_participants_are_unique_and_admin_first(n in 0usize..20) {
            let admin = summary("Admin");
            let mut group = Group::new("Trip", None, admin.clone());
            for i in 0..n {
                let member = summary(&format!("M{}", i));
                group.add_member(member.clone()).unwrap();
                prop_assert!(group.add_member(member).is_err());
            }

            let ids = group.billable_members();
            prop_assert_eq!(ids.len(), n + 1);
            prop_assert_eq!(ids[0], admin.user_id);
            prop_assert_eq!(group.participant_count(), n + 1);
        }
    }
}
