//! Persistence port.
//!
//! Every listing and every single-recipe read applies the visibility rule
//! (owner, share grant, or public) inside the store, so callers never see a
//! row they are not allowed to see.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::Result;
use crate::models::{
    AdminCommentView, AdminRecipeSummary, Comment, CommentView, Friend, FriendEntry,
    FriendRequest, IncomingRequest, LikeStatus, Notification, NotificationView, Recipe,
    RecipePatch, RecipeSearchHit, RecipeShare, RecipeStatus, RecipeWithOwner, SearchFilter,
    ShareEntry, User, UserSummary, VisibleRecipe,
};

#[async_trait]
pub trait Store: Send + Sync {
    // Users

    /// Fails with `Conflict` when the email is taken.
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update_user_name(&self, id: Uuid, name: Option<String>) -> Result<Option<User>>;
    /// Returns false when the user does not exist.
    async fn set_user_disabled(&self, id: Uuid, disabled: bool) -> Result<bool>;
    /// Makes the user an enabled admin with the given password hash.
    async fn promote_to_admin(&self, id: Uuid, password_hash: &str) -> Result<()>;
    /// Removes the user and everything that references them.
    async fn delete_user(&self, id: Uuid) -> Result<bool>;
    async fn list_users(&self) -> Result<Vec<UserSummary>>;

    // Recipes

    async fn insert_recipe(&self, recipe: &Recipe) -> Result<()>;
    /// The recipe if `caller` owns it, holds a share for it, or it is public.
    async fn find_visible_recipe(&self, id: Uuid, caller: Uuid) -> Result<Option<VisibleRecipe>>;
    /// Unfiltered lookup, for administration only.
    async fn find_recipe(&self, id: Uuid) -> Result<Option<Recipe>>;
    /// Applies `patch` in one guarded write: only when `editor` owns the
    /// recipe or holds an edit grant at that moment. Columns the patch leaves
    /// out keep their stored values. `None` when the recipe is gone or no
    /// longer editable by `editor`.
    async fn update_recipe(
        &self,
        id: Uuid,
        editor: Uuid,
        patch: &RecipePatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Recipe>>;
    /// Deletes the recipe with its shares, comments, likes and favorites in
    /// one atomic step.
    async fn delete_recipe(&self, id: Uuid) -> Result<bool>;
    async fn list_owned_recipes(
        &self,
        owner: Uuid,
        status: Option<RecipeStatus>,
    ) -> Result<Vec<Recipe>>;
    async fn list_shared_recipes(
        &self,
        caller: Uuid,
        status: Option<RecipeStatus>,
    ) -> Result<Vec<RecipeWithOwner>>;
    /// Public recipes not owned by `caller`.
    async fn list_public_feed(
        &self,
        caller: Uuid,
        q: Option<&str>,
        cuisine: Option<&str>,
    ) -> Result<Vec<RecipeWithOwner>>;
    async fn search_recipes(
        &self,
        caller: Uuid,
        filter: &SearchFilter,
    ) -> Result<Vec<RecipeSearchHit>>;
    async fn list_public_by_user(&self, user_id: Uuid) -> Result<Vec<Recipe>>;
    async fn list_all_recipes(&self) -> Result<Vec<AdminRecipeSummary>>;

    // Shares

    /// Inserts the grant or updates `can_edit` of the existing one.
    async fn upsert_share(&self, share: &RecipeShare) -> Result<RecipeShare>;
    async fn delete_share(&self, recipe_id: Uuid, shared_with_id: Uuid) -> Result<()>;
    async fn list_shares(&self, recipe_id: Uuid) -> Result<Vec<ShareEntry>>;

    // Friends

    /// The friendship edge between `a` and `b`, stored in either direction.
    async fn find_friendship(&self, a: Uuid, b: Uuid) -> Result<Option<Friend>>;
    async fn find_pending_request(&self, from: Uuid, to: Uuid) -> Result<Option<FriendRequest>>;
    async fn find_friend_request(&self, id: Uuid) -> Result<Option<FriendRequest>>;
    /// Fails with `Conflict` when the pair already has a request in either direction.
    async fn insert_friend_request(&self, request: &FriendRequest) -> Result<()>;
    /// Atomically consumes the request, stores the friendship and the
    /// notification. Fails with `NotFound` if the request is already gone.
    async fn accept_friend_request(
        &self,
        request: &FriendRequest,
        friend: &Friend,
        notification: &Notification,
    ) -> Result<()>;
    async fn delete_friend_request(&self, id: Uuid) -> Result<bool>;
    /// Removes the edge in both directions; returns the number removed.
    async fn delete_friendship(&self, a: Uuid, b: Uuid) -> Result<u64>;
    async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>>;
    async fn list_incoming_requests(&self, user_id: Uuid) -> Result<Vec<IncomingRequest>>;

    // Likes and favorites, both idempotent

    async fn upsert_like(&self, recipe_id: Uuid, user_id: Uuid) -> Result<()>;
    async fn delete_like(&self, recipe_id: Uuid, user_id: Uuid) -> Result<()>;
    async fn like_status(&self, recipe_id: Uuid, user_id: Uuid) -> Result<LikeStatus>;
    async fn upsert_favorite(&self, recipe_id: Uuid, user_id: Uuid) -> Result<()>;
    async fn delete_favorite(&self, recipe_id: Uuid, user_id: Uuid) -> Result<()>;
    /// Favorited recipes that are still visible to the user.
    async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<RecipeWithOwner>>;

    // Comments

    async fn insert_comment(&self, comment: &Comment) -> Result<()>;
    /// Oldest first.
    async fn list_comments(&self, recipe_id: Uuid) -> Result<Vec<CommentView>>;
    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> Result<bool>;
    /// Newest first.
    async fn list_recent_comments(&self, limit: i64) -> Result<Vec<AdminCommentView>>;

    // Notifications

    /// Newest first.
    async fn list_notifications(&self, user_id: Uuid, limit: i64)
    -> Result<Vec<NotificationView>>;
    async fn find_notification(&self, id: Uuid) -> Result<Option<Notification>>;
    async fn mark_notification_read(&self, id: Uuid) -> Result<()>;
}

/// `%q%` for ILIKE with the pattern characters escaped.
pub(crate) fn like_pattern(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("tofu"), "%tofu%");
        assert_eq!(like_pattern("100%_"), "%100\\%\\_%");
    }
}
