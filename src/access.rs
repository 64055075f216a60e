//! Recipe access levels.
//!
//! Everything here is pure: the caller supplies the recipe's owner, its
//! public flag and the caller's own share grant (if any). Listings apply the
//! same rules inside their queries, see `database`.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Recipe, VisibleRecipe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    NoAccess,
    ViewOnly,
    ViewAndEdit,
    Owner,
}

impl AccessLevel {
    pub fn can_view(self) -> bool {
        self != AccessLevel::NoAccess
    }

    pub fn can_edit(self) -> bool {
        matches!(self, AccessLevel::ViewAndEdit | AccessLevel::Owner)
    }

    pub fn can_delete(self) -> bool {
        self == AccessLevel::Owner
    }
}

/// First matching rule wins: owner, edit grant, any grant, public, nothing.
pub fn evaluate_access(
    owner_id: Uuid,
    is_public: bool,
    share_can_edit: Option<bool>,
    caller_id: Uuid,
) -> AccessLevel {
    if caller_id == owner_id {
        return AccessLevel::Owner;
    }
    match share_can_edit {
        Some(true) => AccessLevel::ViewAndEdit,
        Some(false) => AccessLevel::ViewOnly,
        None if is_public => AccessLevel::ViewOnly,
        None => AccessLevel::NoAccess,
    }
}

pub fn recipe_access(recipe: &Recipe, share_can_edit: Option<bool>, caller_id: Uuid) -> AccessLevel {
    evaluate_access(recipe.user_id, recipe.is_public, share_can_edit, caller_id)
}

impl VisibleRecipe {
    pub fn access(&self, caller_id: Uuid) -> AccessLevel {
        recipe_access(&self.recipe, self.share_can_edit, caller_id)
    }

    pub fn ensure_editable(&self, caller_id: Uuid) -> Result<(), AppError> {
        if !self.access(caller_id).can_edit() {
            return Err(AppError::Forbidden(
                "you do not have permission to edit this recipe".into(),
            ));
        }
        Ok(())
    }

    pub fn ensure_owner(&self, caller_id: Uuid) -> Result<(), AppError> {
        if !self.access(caller_id).can_delete() {
            return Err(AppError::Forbidden(
                "only the owner can do this".into(),
            ));
        }
        Ok(())
    }
}
