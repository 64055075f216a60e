use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Store;
use crate::error::{AppError, Result};
use crate::models::{
    AdminCommentView, AdminRecipeSummary, Comment, CommentView, Friend, FriendEntry,
    FriendRequest, IncomingRequest, LikeStatus, Notification, NotificationView, Recipe,
    RecipePatch, RecipeSearchHit, RecipeShare, RecipeStatus, RecipeWithOwner, Role,
    SearchFilter, ShareEntry, User, UserBrief, UserSummary, VisibleRecipe, recipe_matches_text,
};

struct Engagement {
    recipe_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    recipes: Vec<Recipe>,
    shares: Vec<RecipeShare>,
    friends: Vec<Friend>,
    requests: Vec<FriendRequest>,
    likes: Vec<Engagement>,
    favorites: Vec<Engagement>,
    comments: Vec<Comment>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn brief(&self, id: Uuid) -> Result<UserBrief> {
        self.user(id)
            .map(User::brief)
            .ok_or_else(|| AppError::Internal(format!("dangling user reference {id}")))
    }

    fn share_for(&self, recipe_id: Uuid, user_id: Uuid) -> Option<&RecipeShare> {
        self.shares
            .iter()
            .find(|s| s.recipe_id == recipe_id && s.shared_with_id == user_id)
    }

    // Same predicate as the SQL: owner, share grant, or public.
    fn visible_to(&self, recipe: &Recipe, caller: Uuid) -> bool {
        recipe.user_id == caller
            || recipe.is_public
            || self.share_for(recipe.id, caller).is_some()
    }

    fn with_owner(&self, recipe: &Recipe) -> Result<RecipeWithOwner> {
        Ok(RecipeWithOwner {
            owner: self.brief(recipe.user_id)?,
            recipe: recipe.clone(),
        })
    }

    fn remove_recipe_rows(&mut self, recipe_id: Uuid) {
        self.shares.retain(|s| s.recipe_id != recipe_id);
        self.comments.retain(|c| c.recipe_id != recipe_id);
        self.likes.retain(|l| l.recipe_id != recipe_id);
        self.favorites.retain(|f| f.recipe_id != recipe_id);
    }
}

fn cuisine_matches(recipe: &Recipe, cuisine: &str) -> bool {
    let cuisine = cuisine.to_lowercase();
    recipe
        .cuisine_type
        .as_deref()
        .is_some_and(|c| c.to_lowercase().contains(&cuisine))
}

fn newest_updated_first(recipes: &mut [Recipe]) {
    recipes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Store kept in process memory. Used for tests and when no database is
/// configured; all data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut t = self.tables()?;
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("email is already registered".into()));
        }
        t.users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables()?.user(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let t = self.tables()?;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_user_name(&self, id: Uuid, name: Option<String>) -> Result<Option<User>> {
        let mut t = self.tables()?;
        Ok(t.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.name = name;
            u.clone()
        }))
    }

    async fn set_user_disabled(&self, id: Uuid, disabled: bool) -> Result<bool> {
        let mut t = self.tables()?;
        match t.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.disabled = disabled;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn promote_to_admin(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let mut t = self.tables()?;
        if let Some(user) = t.users.iter_mut().find(|u| u.id == id) {
            user.role = Role::Admin;
            user.disabled = false;
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let mut t = self.tables()?;
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        if t.users.len() == before {
            return Ok(false);
        }

        let owned: Vec<Uuid> = t
            .recipes
            .iter()
            .filter(|r| r.user_id == id)
            .map(|r| r.id)
            .collect();
        for recipe_id in owned {
            t.remove_recipe_rows(recipe_id);
        }
        t.recipes.retain(|r| r.user_id != id);
        t.shares.retain(|s| s.owner_id != id && s.shared_with_id != id);
        t.friends.retain(|f| f.user_id != id && f.friend_id != id);
        t.requests
            .retain(|r| r.from_user_id != id && r.to_user_id != id);
        t.likes.retain(|l| l.user_id != id);
        t.favorites.retain(|f| f.user_id != id);
        t.comments.retain(|c| c.user_id != id);
        t.notifications
            .retain(|n| n.to_user_id != id && n.from_user_id != id);
        Ok(true)
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>> {
        let t = self.tables()?;
        let mut users: Vec<UserSummary> = t
            .users
            .iter()
            .map(|u| UserSummary {
                id: u.id,
                email: u.email.clone(),
                name: u.name.clone(),
                role: u.role,
                disabled: u.disabled,
                created_at: u.created_at,
                recipe_count: t.recipes.iter().filter(|r| r.user_id == u.id).count() as i64,
            })
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn insert_recipe(&self, recipe: &Recipe) -> Result<()> {
        self.tables()?.recipes.push(recipe.clone());
        Ok(())
    }

    async fn find_visible_recipe(&self, id: Uuid, caller: Uuid) -> Result<Option<VisibleRecipe>> {
        let t = self.tables()?;
        Ok(t.recipes
            .iter()
            .find(|r| r.id == id)
            .filter(|r| t.visible_to(r, caller))
            .map(|r| VisibleRecipe {
                recipe: r.clone(),
                share_can_edit: t.share_for(id, caller).map(|s| s.can_edit),
            }))
    }

    async fn find_recipe(&self, id: Uuid) -> Result<Option<Recipe>> {
        let t = self.tables()?;
        Ok(t.recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn update_recipe(
        &self,
        id: Uuid,
        editor: Uuid,
        patch: &RecipePatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Recipe>> {
        let mut t = self.tables()?;
        let may_edit = t.recipes.iter().any(|r| {
            r.id == id
                && (r.user_id == editor || t.share_for(id, editor).is_some_and(|s| s.can_edit))
        });
        if !may_edit {
            return Ok(None);
        }
        let Some(stored) = t.recipes.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        patch.clone().apply(stored, now);
        Ok(Some(stored.clone()))
    }

    async fn delete_recipe(&self, id: Uuid) -> Result<bool> {
        let mut t = self.tables()?;
        let before = t.recipes.len();
        t.recipes.retain(|r| r.id != id);
        if t.recipes.len() == before {
            return Ok(false);
        }
        t.remove_recipe_rows(id);
        Ok(true)
    }

    async fn list_owned_recipes(
        &self,
        owner: Uuid,
        status: Option<RecipeStatus>,
    ) -> Result<Vec<Recipe>> {
        let t = self.tables()?;
        let mut recipes: Vec<Recipe> = t
            .recipes
            .iter()
            .filter(|r| r.user_id == owner && status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        newest_updated_first(&mut recipes);
        Ok(recipes)
    }

    async fn list_shared_recipes(
        &self,
        caller: Uuid,
        status: Option<RecipeStatus>,
    ) -> Result<Vec<RecipeWithOwner>> {
        let t = self.tables()?;
        let mut recipes: Vec<Recipe> = t
            .recipes
            .iter()
            .filter(|r| t.share_for(r.id, caller).is_some())
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        newest_updated_first(&mut recipes);
        recipes.iter().map(|r| t.with_owner(r)).collect()
    }

    async fn list_public_feed(
        &self,
        caller: Uuid,
        q: Option<&str>,
        cuisine: Option<&str>,
    ) -> Result<Vec<RecipeWithOwner>> {
        let t = self.tables()?;
        let mut recipes: Vec<Recipe> = t
            .recipes
            .iter()
            .filter(|r| r.is_public && r.user_id != caller)
            .filter(|r| q.is_none_or(|q| recipe_matches_text(r, q)))
            .filter(|r| cuisine.is_none_or(|c| cuisine_matches(r, c)))
            .cloned()
            .collect();
        newest_updated_first(&mut recipes);
        recipes.iter().map(|r| t.with_owner(r)).collect()
    }

    async fn search_recipes(
        &self,
        caller: Uuid,
        filter: &SearchFilter,
    ) -> Result<Vec<RecipeSearchHit>> {
        let t = self.tables()?;
        let mut recipes: Vec<Recipe> = t
            .recipes
            .iter()
            .filter(|r| {
                r.user_id == caller
                    || (filter.include_shared && t.share_for(r.id, caller).is_some())
                    || (filter.include_public && r.is_public)
            })
            .filter(|r| filter.q.as_deref().is_none_or(|q| recipe_matches_text(r, q)))
            .filter(|r| filter.cuisine.as_deref().is_none_or(|c| cuisine_matches(r, c)))
            .filter(|r| {
                filter
                    .prep_max
                    .is_none_or(|max| r.prep_time_minutes.is_some_and(|p| p <= max))
            })
            .cloned()
            .collect();
        newest_updated_first(&mut recipes);

        recipes
            .into_iter()
            .map(|recipe| {
                Ok(RecipeSearchHit {
                    owner: t.brief(recipe.user_id)?,
                    like_count: t.likes.iter().filter(|l| l.recipe_id == recipe.id).count() as i64,
                    favorite_count: t
                        .favorites
                        .iter()
                        .filter(|f| f.recipe_id == recipe.id)
                        .count() as i64,
                    recipe,
                })
            })
            .collect()
    }

    async fn list_public_by_user(&self, user_id: Uuid) -> Result<Vec<Recipe>> {
        let t = self.tables()?;
        let mut recipes: Vec<Recipe> = t
            .recipes
            .iter()
            .filter(|r| r.user_id == user_id && r.is_public)
            .cloned()
            .collect();
        newest_updated_first(&mut recipes);
        Ok(recipes)
    }

    async fn list_all_recipes(&self) -> Result<Vec<AdminRecipeSummary>> {
        let t = self.tables()?;
        let mut rows = t
            .recipes
            .iter()
            .map(|r| {
                Ok(AdminRecipeSummary {
                    id: r.id,
                    name: r.name.clone(),
                    is_public: r.is_public,
                    created_at: r.created_at,
                    owner: t.brief(r.user_id)?,
                    comment_count: t.comments.iter().filter(|c| c.recipe_id == r.id).count()
                        as i64,
                    like_count: t.likes.iter().filter(|l| l.recipe_id == r.id).count() as i64,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn upsert_share(&self, share: &RecipeShare) -> Result<RecipeShare> {
        let mut t = self.tables()?;
        if let Some(existing) = t
            .shares
            .iter_mut()
            .find(|s| s.recipe_id == share.recipe_id && s.shared_with_id == share.shared_with_id)
        {
            existing.can_edit = share.can_edit;
            return Ok(existing.clone());
        }
        t.shares.push(share.clone());
        Ok(share.clone())
    }

    async fn delete_share(&self, recipe_id: Uuid, shared_with_id: Uuid) -> Result<()> {
        self.tables()?
            .shares
            .retain(|s| !(s.recipe_id == recipe_id && s.shared_with_id == shared_with_id));
        Ok(())
    }

    async fn list_shares(&self, recipe_id: Uuid) -> Result<Vec<ShareEntry>> {
        let t = self.tables()?;
        t.shares
            .iter()
            .filter(|s| s.recipe_id == recipe_id)
            .map(|s| {
                let user = t.brief(s.shared_with_id)?;
                Ok(ShareEntry {
                    shared_with_id: s.shared_with_id,
                    email: user.email,
                    name: user.name,
                    can_edit: s.can_edit,
                    created_at: s.created_at,
                })
            })
            .collect()
    }

    async fn find_friendship(&self, a: Uuid, b: Uuid) -> Result<Option<Friend>> {
        let t = self.tables()?;
        Ok(t.friends.iter().find(|f| f.connects(a, b)).cloned())
    }

    async fn find_pending_request(&self, from: Uuid, to: Uuid) -> Result<Option<FriendRequest>> {
        let t = self.tables()?;
        Ok(t.requests
            .iter()
            .find(|r| r.from_user_id == from && r.to_user_id == to)
            .cloned())
    }

    async fn find_friend_request(&self, id: Uuid) -> Result<Option<FriendRequest>> {
        let t = self.tables()?;
        Ok(t.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn insert_friend_request(&self, request: &FriendRequest) -> Result<()> {
        let mut t = self.tables()?;
        if t
            .requests
            .iter()
            .any(|r| r.connects(request.from_user_id, request.to_user_id))
        {
            return Err(AppError::Conflict(
                "a friend request between these users is already pending".into(),
            ));
        }
        t.requests.push(request.clone());
        Ok(())
    }

    async fn accept_friend_request(
        &self,
        request: &FriendRequest,
        friend: &Friend,
        notification: &Notification,
    ) -> Result<()> {
        // One guard for the whole sequence: every check happens before the
        // first write.
        let mut t = self.tables()?;
        let position = t
            .requests
            .iter()
            .position(|r| r.id == request.id)
            .ok_or(AppError::NotFound("friend request"))?;
        if t.friends
            .iter()
            .any(|f| f.connects(friend.user_id, friend.friend_id))
        {
            return Err(AppError::Conflict("already friends".into()));
        }

        t.requests.remove(position);
        t.requests
            .retain(|r| !r.connects(request.from_user_id, request.to_user_id));
        t.friends.push(friend.clone());
        t.notifications.push(notification.clone());
        Ok(())
    }

    async fn delete_friend_request(&self, id: Uuid) -> Result<bool> {
        let mut t = self.tables()?;
        let before = t.requests.len();
        t.requests.retain(|r| r.id != id);
        Ok(t.requests.len() < before)
    }

    async fn delete_friendship(&self, a: Uuid, b: Uuid) -> Result<u64> {
        let mut t = self.tables()?;
        let before = t.friends.len();
        t.friends.retain(|f| !f.connects(a, b));
        Ok((before - t.friends.len()) as u64)
    }

    async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>> {
        let t = self.tables()?;
        let mut edges: Vec<&Friend> = t
            .friends
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id || f.friend_id == user_id)
            .collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        edges
            .into_iter()
            .map(|f| {
                Ok(FriendEntry {
                    id: f.id,
                    friend: t.brief(f.other(user_id))?,
                })
            })
            .collect()
    }

    async fn list_incoming_requests(&self, user_id: Uuid) -> Result<Vec<IncomingRequest>> {
        let t = self.tables()?;
        let mut requests: Vec<&FriendRequest> = t
            .requests
            .iter()
            .rev()
            .filter(|r| r.to_user_id == user_id)
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
            .into_iter()
            .map(|r| {
                Ok(IncomingRequest {
                    id: r.id,
                    from_user: t.brief(r.from_user_id)?,
                    created_at: r.created_at,
                })
            })
            .collect()
    }

    async fn upsert_like(&self, recipe_id: Uuid, user_id: Uuid) -> Result<()> {
        let mut t = self.tables()?;
        if !t
            .likes
            .iter()
            .any(|l| l.recipe_id == recipe_id && l.user_id == user_id)
        {
            t.likes.push(Engagement {
                recipe_id,
                user_id,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn delete_like(&self, recipe_id: Uuid, user_id: Uuid) -> Result<()> {
        self.tables()?
            .likes
            .retain(|l| !(l.recipe_id == recipe_id && l.user_id == user_id));
        Ok(())
    }

    async fn like_status(&self, recipe_id: Uuid, user_id: Uuid) -> Result<LikeStatus> {
        let t = self.tables()?;
        let likes: Vec<&Engagement> = t.likes.iter().filter(|l| l.recipe_id == recipe_id).collect();
        Ok(LikeStatus {
            count: likes.len() as i64,
            liked: likes.iter().any(|l| l.user_id == user_id),
        })
    }

    async fn upsert_favorite(&self, recipe_id: Uuid, user_id: Uuid) -> Result<()> {
        let mut t = self.tables()?;
        if !t
            .favorites
            .iter()
            .any(|f| f.recipe_id == recipe_id && f.user_id == user_id)
        {
            t.favorites.push(Engagement {
                recipe_id,
                user_id,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn delete_favorite(&self, recipe_id: Uuid, user_id: Uuid) -> Result<()> {
        self.tables()?
            .favorites
            .retain(|f| !(f.recipe_id == recipe_id && f.user_id == user_id));
        Ok(())
    }

    async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<RecipeWithOwner>> {
        let t = self.tables()?;
        let mut favorites: Vec<&Engagement> = t
            .favorites
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id)
            .collect();
        favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        favorites
            .into_iter()
            .filter_map(|f| t.recipes.iter().find(|r| r.id == f.recipe_id))
            .filter(|r| t.visible_to(r, user_id))
            .map(|r| t.with_owner(r))
            .collect()
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.tables()?.comments.push(comment.clone());
        Ok(())
    }

    async fn list_comments(&self, recipe_id: Uuid) -> Result<Vec<CommentView>> {
        let t = self.tables()?;
        let mut comments: Vec<&Comment> = t
            .comments
            .iter()
            .filter(|c| c.recipe_id == recipe_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        comments
            .into_iter()
            .map(|c| {
                Ok(CommentView {
                    id: c.id,
                    text: c.text.clone(),
                    created_at: c.created_at,
                    user: t.brief(c.user_id)?,
                })
            })
            .collect()
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let t = self.tables()?;
        Ok(t.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let mut t = self.tables()?;
        let before = t.comments.len();
        t.comments.retain(|c| c.id != id);
        Ok(t.comments.len() < before)
    }

    async fn list_recent_comments(&self, limit: i64) -> Result<Vec<AdminCommentView>> {
        let t = self.tables()?;
        let mut comments: Vec<&Comment> = t.comments.iter().rev().collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        comments
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|c| {
                let recipe_name = t
                    .recipes
                    .iter()
                    .find(|r| r.id == c.recipe_id)
                    .map(|r| r.name.clone())
                    .ok_or_else(|| AppError::Internal(format!("dangling recipe {}", c.recipe_id)))?;
                Ok(AdminCommentView {
                    id: c.id,
                    text: c.text.clone(),
                    created_at: c.created_at,
                    user: t.brief(c.user_id)?,
                    recipe_id: c.recipe_id,
                    recipe_name,
                })
            })
            .collect()
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<NotificationView>> {
        let t = self.tables()?;
        let mut notifications: Vec<&Notification> = t
            .notifications
            .iter()
            .rev()
            .filter(|n| n.to_user_id == user_id)
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|n| {
                Ok(NotificationView {
                    id: n.id,
                    notification_type: n.notification_type,
                    read: n.read,
                    created_at: n.created_at,
                    from_user: t.brief(n.from_user_id)?,
                })
            })
            .collect()
    }

    async fn find_notification(&self, id: Uuid) -> Result<Option<Notification>> {
        let t = self.tables()?;
        Ok(t.notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<()> {
        let mut t = self.tables()?;
        if let Some(n) = t.notifications.iter_mut().find(|n| n.id == id) {
            n.read = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewRecipe;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: "x".into(),
            name: None,
            image: None,
            role: Role::User,
            disabled: false,
            created_at: Utc::now(),
        }
    }

    fn recipe(owner: Uuid, is_public: bool) -> Recipe {
        NewRecipe {
            name: "Soup".into(),
            is_public: Some(is_public),
            ..Default::default()
        }
        .into_recipe(owner, Utc::now())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@x.io")).await.unwrap();
        let err = store.insert_user(&user("a@x.io")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn visibility_predicate_matches_sql() {
        let store = MemoryStore::new();
        let (owner, other) = (user("o@x.io"), user("v@x.io"));
        store.insert_user(&owner).await.unwrap();
        store.insert_user(&other).await.unwrap();
        let private = recipe(owner.id, false);
        store.insert_recipe(&private).await.unwrap();

        assert!(store.find_visible_recipe(private.id, owner.id).await.unwrap().is_some());
        assert!(store.find_visible_recipe(private.id, other.id).await.unwrap().is_none());
        assert!(store.find_recipe(private.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_user_cascades() {
        let store = MemoryStore::new();
        let (owner, other) = (user("o@x.io"), user("v@x.io"));
        store.insert_user(&owner).await.unwrap();
        store.insert_user(&other).await.unwrap();
        let r = recipe(owner.id, true);
        store.insert_recipe(&r).await.unwrap();
        store.upsert_like(r.id, other.id).await.unwrap();

        assert!(store.delete_user(owner.id).await.unwrap());
        assert!(store.find_recipe(r.id).await.unwrap().is_none());
        assert_eq!(store.like_status(r.id, other.id).await.unwrap().count, 0);
        assert!(!store.delete_user(owner.id).await.unwrap());
    }

    fn share(recipe: &Recipe, with: Uuid, can_edit: bool) -> RecipeShare {
        RecipeShare {
            id: Uuid::new_v4(),
            recipe_id: recipe.id,
            owner_id: recipe.user_id,
            shared_with_id: with,
            can_edit,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn update_touches_only_patched_columns() {
        let store = MemoryStore::new();
        let (owner, editor) = (user("o@x.io"), user("e@x.io"));
        store.insert_user(&owner).await.unwrap();
        store.insert_user(&editor).await.unwrap();
        let r = recipe(owner.id, false);
        store.insert_recipe(&r).await.unwrap();
        store.upsert_share(&share(&r, editor.id, true)).await.unwrap();

        // Both writers started from the same version; neither overwrites the
        // other's field.
        let rename = RecipePatch {
            name: Some("Chowder".into()),
            ..Default::default()
        };
        let rewrite = RecipePatch {
            instructions: Some("Simmer slowly.".into()),
            ..Default::default()
        };
        store.update_recipe(r.id, owner.id, &rename, Utc::now()).await.unwrap();
        let after = store
            .update_recipe(r.id, editor.id, &rewrite, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.name, "Chowder");
        assert_eq!(after.instructions, "Simmer slowly.");
        assert_eq!(after.user_id, owner.id);
    }

    #[tokio::test]
    async fn update_rechecks_edit_grant() {
        let store = MemoryStore::new();
        let (owner, editor, viewer) = (user("o@x.io"), user("e@x.io"), user("v@x.io"));
        for u in [&owner, &editor, &viewer] {
            store.insert_user(u).await.unwrap();
        }
        let r = recipe(owner.id, true);
        store.insert_recipe(&r).await.unwrap();
        store.upsert_share(&share(&r, editor.id, true)).await.unwrap();
        store.upsert_share(&share(&r, viewer.id, false)).await.unwrap();
        let rename = RecipePatch {
            name: Some("Stolen".into()),
            ..Default::default()
        };

        assert!(store.update_recipe(r.id, viewer.id, &rename, Utc::now()).await.unwrap().is_none());

        store.delete_share(r.id, editor.id).await.unwrap();
        assert!(store.update_recipe(r.id, editor.id, &rename, Utc::now()).await.unwrap().is_none());
        assert_eq!(store.find_recipe(r.id).await.unwrap().unwrap().name, "Soup");
    }
}
