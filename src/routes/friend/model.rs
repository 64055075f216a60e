use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::operations::friend::FriendTarget;

/// Either field addresses the recipient; `user_id` wins when both are set.
#[derive(Debug, Deserialize)]
pub struct FriendRequestBody {
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
}

impl TryFrom<FriendRequestBody> for FriendTarget {
    type Error = AppError;

    fn try_from(body: FriendRequestBody) -> Result<Self, Self::Error> {
        match (body.user_id, body.email) {
            (Some(id), _) => Ok(FriendTarget::Id(id)),
            (None, Some(email)) if !email.trim().is_empty() => Ok(FriendTarget::Email(email)),
            _ => Err(AppError::InvalidArgument(
                "user_id or email is required".into(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub user_id: Uuid,
}
