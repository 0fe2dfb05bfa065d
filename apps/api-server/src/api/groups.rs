//! Chat group API endpoints.

use std::collections::HashMap;

use api_protocol::{
    AddGroupMembersRequest, CreateGroupRequest, Group, GroupMemberDetail, GroupResponse,
    ListGroupsResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use contact_store::ContactStore;
use entities::{ChatGroup, NewChatGroup, NewGroupMember, User};

use crate::error::{ServerError, ServerResult};
use crate::middleware::CurrentUser;
use crate::state::SharedState;

fn group_to_wire(group: &ChatGroup) -> Group {
    Group {
        id: group.id,
        name: group.name.clone(),
        amount: group.amount,
        premium: group.premium,
        created_by: group.created_by,
        created_at: group.created_at,
    }
}

/// Resolves usernames to users, rejecting the request if any are unknown.
async fn resolve_members<S: ContactStore>(
    store: &S,
    usernames: &[String],
) -> ServerResult<Vec<User>> {
    let mut unique: Vec<String> = usernames.to_vec();
    unique.sort();
    unique.dedup();

    let users = store.users_by_usernames(&unique).await?;
    if users.len() != unique.len() {
        let found: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        let invalid: Vec<&str> = unique
            .iter()
            .map(String::as_str)
            .filter(|u| !found.contains(u))
            .collect();
        return Err(ServerError::InvalidRequest(format!(
            "Invalid usernames: {}",
            invalid.join(", ")
        )));
    }
    Ok(users)
}

async fn member_details<S: ContactStore>(
    store: &S,
    group_id: i64,
) -> ServerResult<Vec<GroupMemberDetail>> {
    let members = store.list_group_members(group_id).await?;
    let mut details = Vec::with_capacity(members.len());
    let mut cache: HashMap<i64, User> = HashMap::new();
    for member in members {
        let user = match cache.get(&member.user_id) {
            Some(user) => user.clone(),
            None => {
                let user = store.get_user(member.user_id).await?.ok_or_else(|| {
                    ServerError::Internal(format!("member user {} missing", member.user_id))
                })?;
                cache.insert(member.user_id, user.clone());
                user
            }
        };
        details.push(GroupMemberDetail {
            id: user.id,
            username: user.username,
            name: user.name,
            is_admin: member.is_admin,
        });
    }
    Ok(details)
}

/// Creates a chat group. The creator becomes its first admin member.
pub async fn create_group<S: ContactStore>(
    State(state): State<SharedState<S>>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateGroupRequest>,
) -> ServerResult<Json<GroupResponse>> {
    if request.name.is_empty() {
        return Err(ServerError::InvalidRequest(
            "group name must not be empty".to_string(),
        ));
    }
    let invited = resolve_members(&state.store, &request.users).await?;

    let mut group = NewChatGroup::new(request.name, current.user.id);
    if request.premium {
        group = group.premium(request.amount);
    }
    let group = state.store.create_group(group).await?;

    let mut members = vec![NewGroupMember::admin(group.id, current.user.id)];
    members.extend(
        invited
            .iter()
            .filter(|u| u.id != current.user.id)
            .map(|u| NewGroupMember::new(group.id, u.id)),
    );
    state.store.add_group_members(members).await?;

    tracing::info!(group_id = group.id, created_by = current.user.id, "group created");

    let members = member_details(&state.store, group.id).await?;
    Ok(Json(GroupResponse {
        group: group_to_wire(&group),
        members,
    }))
}

/// Lists the caller's groups.
pub async fn list_groups<S: ContactStore>(
    State(state): State<SharedState<S>>,
    Extension(current): Extension<CurrentUser>,
) -> ServerResult<Json<ListGroupsResponse>> {
    let groups = state.store.list_groups_for_user(current.user.id).await?;
    Ok(Json(ListGroupsResponse {
        groups: groups.iter().map(group_to_wire).collect(),
    }))
}

/// Gets a group with its member list. Only members may look.
pub async fn get_group<S: ContactStore>(
    State(state): State<SharedState<S>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ServerResult<Json<GroupResponse>> {
    let group = state
        .store
        .get_group(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Group not found".to_string()))?;

    let members = member_details(&state.store, group.id).await?;
    if !members.iter().any(|m| m.id == current.user.id) {
        return Err(ServerError::PermissionDenied(
            "not a member of this group".to_string(),
        ));
    }

    Ok(Json(GroupResponse {
        group: group_to_wire(&group),
        members,
    }))
}

/// Adds members to a group.
///
/// Any member may add to a free group; premium groups restrict addition to
/// admin members. Already-present users are ignored.
pub async fn add_members<S: ContactStore>(
    State(state): State<SharedState<S>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(request): Json<AddGroupMembersRequest>,
) -> ServerResult<Json<GroupResponse>> {
    let group = state
        .store
        .get_group(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Group not found".to_string()))?;

    let memberships = state.store.list_group_members(group.id).await?;
    let caller = memberships
        .iter()
        .find(|m| m.user_id == current.user.id)
        .ok_or_else(|| {
            ServerError::PermissionDenied("not a member of this group".to_string())
        })?;
    if group.premium && !caller.is_admin {
        return Err(ServerError::PermissionDenied(
            "only admins may add members to a premium group".to_string(),
        ));
    }

    let invited = resolve_members(&state.store, &request.users).await?;
    let additions: Vec<NewGroupMember> = invited
        .iter()
        .map(|u| NewGroupMember::new(group.id, u.id))
        .collect();
    let added = state.store.add_group_members(additions).await?;

    tracing::info!(
        group_id = group.id,
        added = added.len(),
        by = current.user.id,
        "group members added"
    );

    let members = member_details(&state.store, group.id).await?;
    Ok(Json(GroupResponse {
        group: group_to_wire(&group),
        members,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use contact_store::MemoryContactStore;
    use entities::NewUser;
    use sms_gateway::RecordingSmsGateway;

    use super::*;
    use crate::config::Config;
    use crate::state::create_shared_state;

    fn test_state() -> SharedState<MemoryContactStore> {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            max_contact_batch: None,
            log_level: "info".to_string(),
        };
        create_shared_state(
            config,
            MemoryContactStore::new(),
            Arc::new(RecordingSmsGateway::new()),
        )
    }

    async fn register(
        state: &SharedState<MemoryContactStore>,
        username: &str,
        mobile: &str,
    ) -> CurrentUser {
        let user = state
            .store
            .create_or_fetch_user(NewUser::new(username, "+39", mobile))
            .await
            .unwrap()
            .user;
        CurrentUser { user }
    }

    fn group_request(name: &str, premium: bool, users: &[&str]) -> CreateGroupRequest {
        CreateGroupRequest {
            name: name.to_string(),
            amount: if premium { 499 } else { 0 },
            premium,
            users: users.iter().map(|u| u.to_string()).collect(),
        }
    }

    fn add_request(users: &[&str]) -> AddGroupMembersRequest {
        AddGroupMembersRequest {
            users: users.iter().map(|u| u.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_creator_becomes_admin_member() {
        let state = test_state();
        let alice = register(&state, "alice99", "3330000001").await;
        register(&state, "bob1", "3330000002").await;

        let Json(response) = create_group(
            State(state),
            Extension(alice.clone()),
            Json(group_request("friends", false, &["bob1"])),
        )
        .await
        .unwrap();

        assert_eq!(response.members.len(), 2);
        let creator = response
            .members
            .iter()
            .find(|m| m.id == alice.user.id)
            .unwrap();
        assert!(creator.is_admin);
        let invited = response.members.iter().find(|m| m.username == "bob1").unwrap();
        assert!(!invited.is_admin);
    }

    #[tokio::test]
    async fn test_premium_group_restricts_addition_to_admins() {
        let state = test_state();
        let alice = register(&state, "alice99", "3330000001").await;
        let bob = register(&state, "bob1", "3330000002").await;
        register(&state, "carol7", "3330000003").await;

        let Json(created) = create_group(
            State(state.clone()),
            Extension(alice.clone()),
            Json(group_request("insiders", true, &["bob1"])),
        )
        .await
        .unwrap();

        // Bob is a regular member: his add is refused.
        let refused = add_members(
            State(state.clone()),
            Extension(bob),
            Path(created.group.id),
            Json(add_request(&["carol7"])),
        )
        .await;
        assert!(matches!(refused, Err(ServerError::PermissionDenied(_))));

        // Alice is the admin: hers succeeds.
        let Json(response) = add_members(
            State(state),
            Extension(alice),
            Path(created.group.id),
            Json(add_request(&["carol7"])),
        )
        .await
        .unwrap();
        assert!(response.members.iter().any(|m| m.username == "carol7"));
    }

    #[tokio::test]
    async fn test_free_group_lets_any_member_add() {
        let state = test_state();
        let alice = register(&state, "alice99", "3330000001").await;
        let bob = register(&state, "bob1", "3330000002").await;
        register(&state, "carol7", "3330000003").await;

        let Json(created) = create_group(
            State(state.clone()),
            Extension(alice),
            Json(group_request("friends", false, &["bob1"])),
        )
        .await
        .unwrap();

        let Json(response) = add_members(
            State(state),
            Extension(bob),
            Path(created.group.id),
            Json(add_request(&["carol7"])),
        )
        .await
        .unwrap();
        assert_eq!(response.members.len(), 3);
    }

    #[tokio::test]
    async fn test_non_members_cannot_add_or_look() {
        let state = test_state();
        let alice = register(&state, "alice99", "3330000001").await;
        let mallory = register(&state, "mallory5", "3330000004").await;
        register(&state, "carol7", "3330000003").await;

        let Json(created) = create_group(
            State(state.clone()),
            Extension(alice),
            Json(group_request("friends", false, &[])),
        )
        .await
        .unwrap();

        let add = add_members(
            State(state.clone()),
            Extension(mallory.clone()),
            Path(created.group.id),
            Json(add_request(&["carol7"])),
        )
        .await;
        assert!(matches!(add, Err(ServerError::PermissionDenied(_))));

        let look = get_group(State(state), Extension(mallory), Path(created.group.id)).await;
        assert!(matches!(look, Err(ServerError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_unknown_usernames_are_rejected() {
        let state = test_state();
        let alice = register(&state, "alice99", "3330000001").await;

        let result = create_group(
            State(state),
            Extension(alice),
            Json(group_request("friends", false, &["nobody0"])),
        )
        .await;
        assert!(matches!(result, Err(ServerError::InvalidRequest(_))));
    }
}
