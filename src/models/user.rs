use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub role: Role,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn brief(&self) -> UserBrief {
        UserBrief {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            role: self.role,
            disabled: self.disabled,
        }
    }
}

/// Public-facing slice of a user attached to recipes, comments and requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserBrief {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

/// Admin listing row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub recipe_count: i64,
}

/// The caller of an operation, resolved by the auth middleware from the
/// session token and the current user row. Operations never look it up
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
    pub disabled: bool,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn ensure_active(&self) -> Result<(), AppError> {
        if self.disabled {
            return Err(AppError::Forbidden("account is disabled".into()));
        }
        Ok(())
    }

    pub fn ensure_admin(&self) -> Result<(), AppError> {
        self.ensure_active()?;
        if !self.is_admin() {
            return Err(AppError::Forbidden("admin access required".into()));
        }
        Ok(())
    }
}
