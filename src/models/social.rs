use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::UserBrief;

/// Friendship edge. Stored in one direction only, read in both.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Friend {
    pub id: Uuid,
    pub user_id: Uuid,
    pub friend_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Friend {
    pub fn connects(&self, a: Uuid, b: Uuid) -> bool {
        (self.user_id == a && self.friend_id == b) || (self.user_id == b && self.friend_id == a)
    }

    /// The side of the edge that is not `me`.
    pub fn other(&self, me: Uuid) -> Uuid {
        if self.user_id == me {
            self.friend_id
        } else {
            self.user_id
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FriendRequest {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl FriendRequest {
    /// True when the request runs between `a` and `b` in either direction.
    pub fn connects(&self, a: Uuid, b: Uuid) -> bool {
        (self.from_user_id == a && self.to_user_id == b)
            || (self.from_user_id == b && self.to_user_id == a)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendEntry {
    pub id: Uuid,
    pub friend: UserBrief,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncomingRequest {
    pub id: Uuid,
    pub from_user: UserBrief,
    pub created_at: DateTime<Utc>,
}

/// Relationship between the caller and another user, seen from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FriendStatus {
    Friends,
    Sent,
    Received { request_id: Uuid },
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub user: UserBrief,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminCommentView {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub user: UserBrief,
    pub recipe_id: Uuid,
    pub recipe_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeStatus {
    pub count: i64,
    pub liked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    FriendAccepted,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub to_user_id: Uuid,
    pub from_user_id: Uuid,
    pub notification_type: NotificationType,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub from_user: UserBrief,
}
