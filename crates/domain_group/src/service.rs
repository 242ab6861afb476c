//! Group application service

use std::sync::Arc;

use tracing::{info, instrument};

use core_kernel::{GroupId, UserId};
use domain_identity::{IdentityService, MemberRef, Principal};

use crate::error::GroupError;
use crate::group::{validate_description, validate_name, Group, MemberSummary};
use crate::ports::GroupPort;

/// Partial update of a group
#[derive(Debug, Clone, Default)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Group creation, membership and administration
#[derive(Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupPort>,
    identity: IdentityService,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupPort>, identity: IdentityService) -> Self {
        Self { groups, identity }
    }

    /// Creates a group administered by the principal
    #[instrument(skip(self, description), fields(principal = %principal.user_id))]
    pub async fn create_group(
        &self,
        principal: &Principal,
        name: &str,
        description: Option<String>,
    ) -> Result<Group, GroupError> {
        let name = validate_name(name)?;
        let description = validate_description(description)?;

        let admin = self.identity.get_user(principal.user_id).await?;
        let group = Group::new(name, description, MemberSummary::joining(&admin));
        let group = self.groups.create_group(&group).await?;

        info!(group_id = %group.id, "Group created");
        Ok(group)
    }

    /// Adds the named user to a group
    ///
    /// Only someone already in the group (or a platform admin) may add
    /// members.
    ///
    /// # Errors
    ///
    /// - `GroupNotFound` / `UserNotFound` when either side is missing
    /// - `Forbidden` when the principal is not a participant
    /// - `AlreadyMember` when the user is the admin or already listed
    #[instrument(skip(self), fields(principal = %principal.user_id, group_id = %group_id, member = %member))]
    pub async fn add_member(
        &self,
        principal: &Principal,
        group_id: GroupId,
        member: &MemberRef,
    ) -> Result<Group, GroupError> {
        let group = self.get_group(group_id).await?;
        ensure_participant(principal, &group)?;
        let user = self.identity.find_member(member).await?;

        if group.is_participant(user.id) {
            return Err(GroupError::AlreadyMember {
                group_id: group_id.to_string(),
                user_id: user.id.to_string(),
            });
        }

        let group = self
            .groups
            .add_member(group_id, MemberSummary::joining(&user))
            .await
            .map_err(|e| match e {
                e if e.is_conflict() => GroupError::AlreadyMember {
                    group_id: group_id.to_string(),
                    user_id: user.id.to_string(),
                },
                e => GroupError::from_lookup(e),
            })?;

        info!(user_id = %user.id, members = group.participant_count(), "Member added to group");
        Ok(group)
    }

    /// Retrieves a group with admin and members
    pub async fn get_group(&self, id: GroupId) -> Result<Group, GroupError> {
        self.groups.get_group(id).await.map_err(GroupError::from_lookup)
    }

    /// Lists the groups a user administers or belongs to
    pub async fn list_groups_for(&self, user_id: UserId) -> Result<Vec<Group>, GroupError> {
        Ok(self.groups.list_groups_for(user_id).await?)
    }

    /// Renames or re-describes a group (admin only)
    #[instrument(skip(self, update), fields(principal = %principal.user_id, group_id = %id))]
    pub async fn update_group(
        &self,
        principal: &Principal,
        id: GroupId,
        update: GroupUpdate,
    ) -> Result<Group, GroupError> {
        let mut group = self.get_group(id).await?;
        ensure_admin(principal, &group)?;

        if update.name.is_none() && update.description.is_none() {
            return Err(GroupError::Validation("Nothing to update".to_string()));
        }
        if let Some(name) = update.name {
            group.name = validate_name(&name)?;
        }
        if update.description.is_some() {
            group.description = validate_description(update.description)?;
        }

        Ok(self.groups.update_group(&group).await?)
    }

    /// Deletes a group (admin only)
    #[instrument(skip(self), fields(principal = %principal.user_id, group_id = %id))]
    pub async fn delete_group(&self, principal: &Principal, id: GroupId) -> Result<(), GroupError> {
        let group = self.get_group(id).await?;
        ensure_admin(principal, &group)?;

        self.groups.delete_group(id).await.map_err(GroupError::from_lookup)?;
        info!("Group deleted");
        Ok(())
    }
}

fn ensure_participant(principal: &Principal, group: &Group) -> Result<(), GroupError> {
    if principal.is_admin || group.is_participant(principal.user_id) {
        Ok(())
    } else {
        Err(GroupError::Forbidden(
            "only group members may add members".to_string(),
        ))
    }
}

fn ensure_admin(principal: &Principal, group: &Group) -> Result<(), GroupError> {
    if principal.is_admin || group.is_admin(principal.user_id) {
        Ok(())
    } else {
        Err(GroupError::Forbidden(
            "only the group admin may modify the group".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockGroupPort;
    use domain_identity::ports::mock::MockUserPort;
    use domain_identity::User;

    async fn setup() -> (GroupService, User, User, User) {
        let alice = User::new("Alice", "alice@example.com");
        let bob = User::new("Bob", "bob@example.com");
        let carol = User::new("Carol", "carol@example.com");
        let users = MockUserPort::with_users(vec![alice.clone(), bob.clone(), carol.clone()]).await;

        let service = GroupService::new(
            Arc::new(MockGroupPort::new()),
            IdentityService::new(Arc::new(users)),
        );
        (service, alice, bob, carol)
    }

    #[tokio::test]
    async fn test_create_group_makes_principal_admin() {
        let (svc, alice, _, _) = setup().await;
        let group = svc
            .create_group(&Principal::from(&alice), "  Flat 4B ", Some("rent".into()))
            .await
            .unwrap();

        assert_eq!(group.name, "Flat 4B");
        assert_eq!(group.admin.user_id, alice.id);
        assert!(group.members.is_empty());
        assert_eq!(group.billable_members(), vec![alice.id]);
    }

    #[tokio::test]
    async fn test_create_group_requires_name() {
        let (svc, alice, _, _) = setup().await;
        let err = svc
            .create_group(&Principal::from(&alice), "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_member_grows_by_exactly_one() {
        let (svc, alice, bob, _) = setup().await;
        let group = svc.create_group(&Principal::from(&alice), "Trip", None).await.unwrap();

        let updated = svc.add_member(&Principal::from(&alice), group.id, &MemberRef::Id(bob.id)).await.unwrap();
        assert_eq!(updated.members.len(), 1);
        assert_eq!(updated.participant_count(), 2);

        let err = svc.add_member(&Principal::from(&alice), group.id, &MemberRef::Id(bob.id)).await.unwrap_err();
        assert!(matches!(err, GroupError::AlreadyMember { .. }));
        assert_eq!(svc.get_group(group.id).await.unwrap().members.len(), 1);
    }

    #[tokio::test]
    async fn test_outsider_cannot_add_members() {
        let (svc, alice, bob, carol) = setup().await;
        let group = svc.create_group(&Principal::from(&alice), "Flat", None).await.unwrap();

        // Carol may not join on her own
        let err = svc
            .add_member(&Principal::from(&carol), group.id, &MemberRef::Id(carol.id))
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::Forbidden(_)));
        assert_eq!(svc.get_group(group.id).await.unwrap().participant_count(), 1);

        // Once Bob is in, he may invite Carol
        svc.add_member(&Principal::from(&alice), group.id, &MemberRef::Id(bob.id))
            .await
            .unwrap();
        let group = svc
            .add_member(&Principal::from(&bob), group.id, &MemberRef::Id(carol.id))
            .await
            .unwrap();
        assert_eq!(group.participant_count(), 3);
    }

    #[tokio::test]
    async fn test_platform_admin_may_add_members() {
        let (svc, alice, bob, carol) = setup().await;
        let group = svc.create_group(&Principal::from(&alice), "Flat", None).await.unwrap();

        let operator = Principal::admin(carol.id);
        let group = svc
            .add_member(&operator, group.id, &MemberRef::Id(bob.id))
            .await
            .unwrap();
        assert!(group.is_participant(bob.id));
        assert!(!group.is_participant(carol.id));
    }

    #[tokio::test]
    async fn test_add_admin_as_member_conflicts() {
        let (svc, alice, _, _) = setup().await;
        let group = svc.create_group(&Principal::from(&alice), "Trip", None).await.unwrap();

        let err = svc
            .add_member(&Principal::from(&alice), group.id, &MemberRef::Email("alice@example.com".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::AlreadyMember { .. }));
    }

    #[tokio::test]
    async fn test_add_member_not_found_cases() {
        let (svc, alice, bob, _) = setup().await;

        let err = svc.add_member(&Principal::from(&alice), GroupId::new(), &MemberRef::Id(bob.id)).await.unwrap_err();
        assert!(matches!(err, GroupError::GroupNotFound(_)));

        let group = svc.create_group(&Principal::from(&alice), "Trip", None).await.unwrap();
        let err = svc
            .add_member(&Principal::from(&alice), group.id, &MemberRef::Name("Nobody".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_groups_for_includes_admin_and_member_groups() {
        let (svc, alice, bob, carol) = setup().await;
        let by_alice = svc.create_group(&Principal::from(&alice), "A", None).await.unwrap();
        let by_bob = svc.create_group(&Principal::from(&bob), "B", None).await.unwrap();
        svc.add_member(&Principal::from(&bob), by_bob.id, &MemberRef::Id(alice.id)).await.unwrap();

        let ids: Vec<GroupId> = svc
            .list_groups_for(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&by_alice.id));
        assert!(ids.contains(&by_bob.id));
        assert!(svc.list_groups_for(carol.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_only_admin_updates_and_deletes() {
        let (svc, alice, bob, _) = setup().await;
        let group = svc.create_group(&Principal::from(&alice), "Trip", None).await.unwrap();
        svc.add_member(&Principal::from(&alice), group.id, &MemberRef::Id(bob.id)).await.unwrap();

        let update = GroupUpdate {
            name: Some("Renamed".into()),
            description: None,
        };
        let err = svc
            .update_group(&Principal::from(&bob), group.id, update.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::Forbidden(_)));

        let renamed = svc
            .update_group(&Principal::from(&alice), group.id, update)
            .await
            .unwrap();
        assert_eq!(renamed.name, "Renamed");

        assert!(matches!(
            svc.delete_group(&Principal::from(&bob), group.id).await,
            Err(GroupError::Forbidden(_))
        ));
        svc.delete_group(&Principal::from(&alice), group.id).await.unwrap();
        assert!(matches!(
            svc.get_group(group.id).await,
            Err(GroupError::GroupNotFound(_))
        ));
    }
}
