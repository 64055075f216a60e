//! Friend requests and friendships.
//!
//! A friendship is one row stored in the direction the request travelled
//! (sender to recipient). Every lookup checks both directions.

use chrono::Utc;
use uuid::Uuid;

use super::account::normalize_email;
use crate::database::Store;
use crate::error::{AppError, Result};
use crate::models::{
    Friend, FriendEntry, FriendRequest, FriendStatus, Identity, IncomingRequest, Notification,
    NotificationType,
};

/// How the recipient of a friend request is addressed.
#[derive(Debug, Clone)]
pub enum FriendTarget {
    Id(Uuid),
    Email(String),
}

async fn resolve_target(store: &dyn Store, target: FriendTarget) -> Result<Uuid> {
    let user = match target {
        FriendTarget::Id(id) => store.find_user(id).await?,
        FriendTarget::Email(email) => store.find_user_by_email(&normalize_email(&email)).await?,
    };
    user.map(|u| u.id).ok_or(AppError::NotFound("user"))
}

pub async fn are_friends(store: &dyn Store, a: Uuid, b: Uuid) -> Result<bool> {
    Ok(store.find_friendship(a, b).await?.is_some())
}

pub async fn send_friend_request(
    store: &dyn Store,
    caller: &Identity,
    target: FriendTarget,
) -> Result<FriendRequest> {
    caller.ensure_active()?;
    let to = resolve_target(store, target).await?;
    if to == caller.id {
        return Err(AppError::InvalidArgument(
            "cannot send a friend request to yourself".into(),
        ));
    }

    if are_friends(store, caller.id, to).await? {
        return Err(AppError::Conflict("already friends".into()));
    }
    if store.find_pending_request(caller.id, to).await?.is_some() {
        return Err(AppError::Conflict("friend request already sent".into()));
    }
    if store.find_pending_request(to, caller.id).await?.is_some() {
        return Err(AppError::Conflict(
            "this user has already sent you a friend request".into(),
        ));
    }

    let request = FriendRequest {
        id: Uuid::new_v4(),
        from_user_id: caller.id,
        to_user_id: to,
        created_at: Utc::now(),
    };
    store.insert_friend_request(&request).await?;

    tracing::info!("Friend request {} sent from {} to {}", request.id, caller.id, to);
    Ok(request)
}

// Requests addressed to someone else are reported as missing.
async fn load_incoming(store: &dyn Store, caller: &Identity, request_id: Uuid) -> Result<FriendRequest> {
    store
        .find_friend_request(request_id)
        .await?
        .filter(|r| r.to_user_id == caller.id)
        .ok_or(AppError::NotFound("friend request"))
}

/// Creates the friendship, consumes the request and notifies the sender in
/// one transaction.
pub async fn accept_friend_request(
    store: &dyn Store,
    caller: &Identity,
    request_id: Uuid,
) -> Result<Friend> {
    caller.ensure_active()?;
    let request = load_incoming(store, caller, request_id).await?;

    let now = Utc::now();
    let friend = Friend {
        id: Uuid::new_v4(),
        user_id: request.from_user_id,
        friend_id: request.to_user_id,
        created_at: now,
    };
    let notification = Notification {
        id: Uuid::new_v4(),
        to_user_id: request.from_user_id,
        from_user_id: caller.id,
        notification_type: NotificationType::FriendAccepted,
        read: false,
        created_at: now,
    };
    store
        .accept_friend_request(&request, &friend, &notification)
        .await?;

    tracing::info!(
        "Friend request {} accepted: {} and {} are now friends",
        request.id,
        request.from_user_id,
        request.to_user_id
    );
    Ok(friend)
}

pub async fn decline_friend_request(
    store: &dyn Store,
    caller: &Identity,
    request_id: Uuid,
) -> Result<()> {
    caller.ensure_active()?;
    let request = load_incoming(store, caller, request_id).await?;
    store.delete_friend_request(request.id).await?;
    tracing::info!("Friend request {} declined", request.id);
    Ok(())
}

/// Removes the friendship whichever direction it was stored in.
pub async fn remove_friend(store: &dyn Store, caller: &Identity, other: Uuid) -> Result<()> {
    caller.ensure_active()?;
    let removed = store.delete_friendship(caller.id, other).await?;
    tracing::info!("User {} removed friend {} ({} rows)", caller.id, other, removed);
    Ok(())
}

pub async fn friend_status(store: &dyn Store, caller: &Identity, other: Uuid) -> Result<FriendStatus> {
    if are_friends(store, caller.id, other).await? {
        return Ok(FriendStatus::Friends);
    }
    if store.find_pending_request(caller.id, other).await?.is_some() {
        return Ok(FriendStatus::Sent);
    }
    if let Some(request) = store.find_pending_request(other, caller.id).await? {
        return Ok(FriendStatus::Received {
            request_id: request.id,
        });
    }
    Ok(FriendStatus::None)
}

pub async fn list_friends(store: &dyn Store, caller: &Identity) -> Result<Vec<FriendEntry>> {
    let mut friends = store.list_friends(caller.id).await?;
    let mut seen = std::collections::HashSet::new();
    friends.retain(|entry| seen.insert(entry.friend.id));
    Ok(friends)
}

pub async fn list_incoming_requests(
    store: &dyn Store,
    caller: &Identity,
) -> Result<Vec<IncomingRequest>> {
    store.list_incoming_requests(caller.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::operations::testing::member;

    async fn pair() -> (MemoryStore, Identity, Identity) {
        let store = MemoryStore::new();
        let a = member(&store, "a@example.com").await;
        let b = member(&store, "b@example.com").await;
        (store, a, b)
    }

    #[tokio::test]
    async fn accept_makes_friendship_symmetric() {
        let (store, a, b) = pair().await;
        let request = send_friend_request(&store, &a, FriendTarget::Id(b.id))
            .await
            .unwrap();
        assert_eq!(friend_status(&store, &a, b.id).await.unwrap(), FriendStatus::Sent);
        assert_eq!(
            friend_status(&store, &b, a.id).await.unwrap(),
            FriendStatus::Received {
                request_id: request.id
            }
        );

        let edge = accept_friend_request(&store, &b, request.id).await.unwrap();
        assert_eq!((edge.user_id, edge.friend_id), (a.id, b.id));

        assert!(are_friends(&store, a.id, b.id).await.unwrap());
        assert!(are_friends(&store, b.id, a.id).await.unwrap());
        assert_eq!(friend_status(&store, &b, a.id).await.unwrap(), FriendStatus::Friends);
        assert!(store.find_friend_request(request.id).await.unwrap().is_none());

        let a_friends = list_friends(&store, &a).await.unwrap();
        let b_friends = list_friends(&store, &b).await.unwrap();
        assert_eq!(a_friends.len(), 1);
        assert_eq!(b_friends.len(), 1);
        assert_eq!(a_friends[0].friend.id, b.id);
        assert_eq!(b_friends[0].friend.id, a.id);
        assert_eq!(a_friends[0].id, b_friends[0].id);

        let notifications = store.list_notifications(a.id, 50).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].from_user.id, b.id);
        assert_eq!(
            notifications[0].notification_type,
            NotificationType::FriendAccepted
        );

        // Either side may end it.
        let err = send_friend_request(&store, &b, FriendTarget::Id(a.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        remove_friend(&store, &b, a.id).await.unwrap();
        assert!(!are_friends(&store, a.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn decline_returns_to_none_and_allows_resend() {
        let (store, a, b) = pair().await;
        let request = send_friend_request(&store, &a, FriendTarget::Email("B@example.com".into()))
            .await
            .unwrap();
        decline_friend_request(&store, &b, request.id).await.unwrap();

        assert_eq!(friend_status(&store, &a, b.id).await.unwrap(), FriendStatus::None);
        assert!(!are_friends(&store, a.id, b.id).await.unwrap());
        assert!(store.list_notifications(a.id, 50).await.unwrap().is_empty());

        send_friend_request(&store, &a, FriendTarget::Id(b.id))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_and_crossing_requests_conflict() {
        let (store, a, b) = pair().await;
        send_friend_request(&store, &a, FriendTarget::Id(b.id))
            .await
            .unwrap();

        let err = send_friend_request(&store, &a, FriendTarget::Id(b.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = send_friend_request(&store, &b, FriendTarget::Id(a.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn invalid_targets() {
        let (store, a, _b) = pair().await;
        let err = send_friend_request(&store, &a, FriendTarget::Id(a.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let err = send_friend_request(&store, &a, FriendTarget::Email("ghost@example.com".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("user")));
    }

    #[tokio::test]
    async fn only_recipient_can_answer() {
        let (store, a, b) = pair().await;
        let c = member(&store, "c@example.com").await;
        let request = send_friend_request(&store, &a, FriendTarget::Id(b.id))
            .await
            .unwrap();

        for who in [&a, &c] {
            let err = accept_friend_request(&store, who, request.id)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
            let err = decline_friend_request(&store, who, request.id)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        }

        let incoming = list_incoming_requests(&store, &b).await.unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].from_user.id, a.id);
        assert!(list_incoming_requests(&store, &a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn crossing_inserts_keep_one_pending_request() {
        let (store, a, b) = pair().await;
        let request = |from: Uuid, to: Uuid| FriendRequest {
            id: Uuid::new_v4(),
            from_user_id: from,
            to_user_id: to,
            created_at: Utc::now(),
        };

        // Both senders passed their checks before either insert landed.
        let forward = request(a.id, b.id);
        store.insert_friend_request(&forward).await.unwrap();
        let err = store
            .insert_friend_request(&request(b.id, a.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        accept_friend_request(&store, &b, forward.id).await.unwrap();
        assert!(list_incoming_requests(&store, &a).await.unwrap().is_empty());
        assert!(list_incoming_requests(&store, &b).await.unwrap().is_empty());
        assert_eq!(friend_status(&store, &a, b.id).await.unwrap(), FriendStatus::Friends);
    }
}
