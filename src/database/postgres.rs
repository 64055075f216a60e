use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, FromRow, PgPool};
use uuid::Uuid;

use super::{Store, like_pattern};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    AdminCommentView, AdminRecipeSummary, Comment, CommentView, Friend, FriendEntry,
    FriendRequest, IncomingRequest, LikeStatus, Notification, NotificationType, NotificationView,
    Recipe, RecipePatch, RecipeSearchHit, RecipeShare, RecipeStatus, RecipeWithOwner,
    SearchFilter, ShareEntry, User, UserBrief, UserSummary, VisibleRecipe,
};

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects, then applies pending migrations.
    pub async fn connect(config: &Config, database_url: &str) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET application_name = 'recipebook';").await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self::new(pool))
    }
}

fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

#[derive(FromRow)]
struct VisibleRow {
    #[sqlx(flatten)]
    recipe: Recipe,
    share_can_edit: Option<bool>,
}

#[derive(FromRow)]
struct OwnedRow {
    #[sqlx(flatten)]
    recipe: Recipe,
    owner_name: Option<String>,
    owner_email: String,
}

impl From<OwnedRow> for RecipeWithOwner {
    fn from(row: OwnedRow) -> Self {
        RecipeWithOwner {
            owner: UserBrief {
                id: row.recipe.user_id,
                name: row.owner_name,
                email: row.owner_email,
            },
            recipe: row.recipe,
        }
    }
}

#[derive(FromRow)]
struct SearchRow {
    #[sqlx(flatten)]
    recipe: Recipe,
    owner_name: Option<String>,
    owner_email: String,
    like_count: i64,
    favorite_count: i64,
}

#[derive(FromRow)]
struct AdminRecipeRow {
    recipe_id: Uuid,
    recipe_name: String,
    is_public: bool,
    created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    owner: UserBrief,
    comment_count: i64,
    like_count: i64,
}

#[derive(FromRow)]
struct FriendRow {
    edge_id: Uuid,
    #[sqlx(flatten)]
    friend: UserBrief,
}

#[derive(FromRow)]
struct IncomingRow {
    request_id: Uuid,
    created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    from_user: UserBrief,
}

#[derive(FromRow)]
struct CommentRow {
    comment_id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    user: UserBrief,
}

#[derive(FromRow)]
struct AdminCommentRow {
    comment_id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
    recipe_id: Uuid,
    recipe_name: String,
    #[sqlx(flatten)]
    user: UserBrief,
}

#[derive(FromRow)]
struct NotificationRow {
    notification_id: Uuid,
    notification_type: NotificationType,
    read: bool,
    created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    from_user: UserBrief,
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, name, image, role, disabled, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.image)
        .bind(user.role)
        .bind(user.disabled)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email is already registered"))?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user_name(&self, id: Uuid, name: Option<String>) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("UPDATE users SET name = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn set_user_disabled(&self, id: Uuid, disabled: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET disabled = $2 WHERE id = $1")
            .bind(id)
            .bind(disabled)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn promote_to_admin(&self, id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET role = 'ADMIN', disabled = FALSE, password_hash = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        // Everything referencing the user goes with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.email, u.name, u.role, u.disabled, u.created_at,
                   (SELECT COUNT(*) FROM recipes r WHERE r.user_id = u.id) AS recipe_count
            FROM users u
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn insert_recipe(&self, recipe: &Recipe) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recipes (
                id, user_id, name, ingredients, instructions, cuisine_type,
                prep_time_minutes, cook_time_minutes, status, is_public, image_urls,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(recipe.id)
        .bind(recipe.user_id)
        .bind(&recipe.name)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(&recipe.cuisine_type)
        .bind(recipe.prep_time_minutes)
        .bind(recipe.cook_time_minutes)
        .bind(recipe.status)
        .bind(recipe.is_public)
        .bind(&recipe.image_urls)
        .bind(recipe.created_at)
        .bind(recipe.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_visible_recipe(&self, id: Uuid, caller: Uuid) -> Result<Option<VisibleRecipe>> {
        let row = sqlx::query_as::<_, VisibleRow>(
            r#"
            SELECT r.*, s.can_edit AS share_can_edit
            FROM recipes r
            LEFT JOIN recipe_shares s ON s.recipe_id = r.id AND s.shared_with_id = $2
            WHERE r.id = $1
              AND (r.user_id = $2 OR s.id IS NOT NULL OR r.is_public)
            "#,
        )
        .bind(id)
        .bind(caller)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| VisibleRecipe {
            recipe: row.recipe,
            share_can_edit: row.share_can_edit,
        }))
    }

    async fn find_recipe(&self, id: Uuid) -> Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        id: Uuid,
        editor: Uuid,
        patch: &RecipePatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Recipe>> {
        // Nullable columns take a "present" flag so that `null` clears them
        // while an omitted field leaves them alone.
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes r
            SET name = COALESCE($3, r.name),
                ingredients = COALESCE($4, r.ingredients),
                instructions = COALESCE($5, r.instructions),
                cuisine_type = CASE WHEN $6 THEN $7 ELSE r.cuisine_type END,
                prep_time_minutes = CASE WHEN $8 THEN $9 ELSE r.prep_time_minutes END,
                cook_time_minutes = CASE WHEN $10 THEN $11 ELSE r.cook_time_minutes END,
                status = COALESCE($12, r.status),
                is_public = COALESCE($13, r.is_public),
                image_urls = COALESCE($14, r.image_urls),
                updated_at = $15
            WHERE r.id = $1
              AND (r.user_id = $2 OR EXISTS (
                  SELECT 1 FROM recipe_shares s
                  WHERE s.recipe_id = r.id AND s.shared_with_id = $2 AND s.can_edit
              ))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(editor)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(&patch.ingredients)
        .bind(&patch.instructions)
        .bind(patch.cuisine_type.is_some())
        .bind(patch.cuisine_type.clone().flatten())
        .bind(patch.prep_time_minutes.is_some())
        .bind(patch.prep_time_minutes.flatten())
        .bind(patch.cook_time_minutes.is_some())
        .bind(patch.cook_time_minutes.flatten())
        .bind(patch.status)
        .bind(patch.is_public)
        .bind(&patch.image_urls)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(recipe)
    }

    async fn delete_recipe(&self, id: Uuid) -> Result<bool> {
        // Shares, comments, likes and favorites cascade in the same statement.
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_owned_recipes(
        &self,
        owner: Uuid,
        status: Option<RecipeStatus>,
    ) -> Result<Vec<Recipe>> {
        let recipes = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT * FROM recipes
            WHERE user_id = $1 AND ($2::recipe_status IS NULL OR status = $2)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(owner)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(recipes)
    }

    async fn list_shared_recipes(
        &self,
        caller: Uuid,
        status: Option<RecipeStatus>,
    ) -> Result<Vec<RecipeWithOwner>> {
        let rows = sqlx::query_as::<_, OwnedRow>(
            r#"
            SELECT r.*, u.name AS owner_name, u.email AS owner_email
            FROM recipe_shares s
            JOIN recipes r ON r.id = s.recipe_id
            JOIN users u ON u.id = r.user_id
            WHERE s.shared_with_id = $1
              AND ($2::recipe_status IS NULL OR r.status = $2)
            ORDER BY r.updated_at DESC
            "#,
        )
        .bind(caller)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_public_feed(
        &self,
        caller: Uuid,
        q: Option<&str>,
        cuisine: Option<&str>,
    ) -> Result<Vec<RecipeWithOwner>> {
        let rows = sqlx::query_as::<_, OwnedRow>(
            r#"
            SELECT r.*, u.name AS owner_name, u.email AS owner_email
            FROM recipes r
            JOIN users u ON u.id = r.user_id
            WHERE r.is_public AND r.user_id <> $1
              AND ($2::text IS NULL
                   OR r.name ILIKE $2 OR r.instructions ILIKE $2 OR r.cuisine_type ILIKE $2
                   OR EXISTS (SELECT 1 FROM unnest(r.ingredients) AS i WHERE i ILIKE $2))
              AND ($3::text IS NULL OR r.cuisine_type ILIKE $3)
            ORDER BY r.updated_at DESC
            "#,
        )
        .bind(caller)
        .bind(q.map(like_pattern))
        .bind(cuisine.map(like_pattern))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search_recipes(
        &self,
        caller: Uuid,
        filter: &SearchFilter,
    ) -> Result<Vec<RecipeSearchHit>> {
        let rows = sqlx::query_as::<_, SearchRow>(
            r#"
            SELECT r.*, u.name AS owner_name, u.email AS owner_email,
                   (SELECT COUNT(*) FROM recipe_likes l WHERE l.recipe_id = r.id) AS like_count,
                   (SELECT COUNT(*) FROM recipe_favorites f WHERE f.recipe_id = r.id) AS favorite_count
            FROM recipes r
            JOIN users u ON u.id = r.user_id
            WHERE (r.user_id = $1
                   OR ($2 AND EXISTS (
                        SELECT 1 FROM recipe_shares s
                        WHERE s.recipe_id = r.id AND s.shared_with_id = $1))
                   OR ($3 AND r.is_public))
              AND ($4::text IS NULL
                   OR r.name ILIKE $4 OR r.instructions ILIKE $4 OR r.cuisine_type ILIKE $4
                   OR EXISTS (SELECT 1 FROM unnest(r.ingredients) AS i WHERE i ILIKE $4))
              AND ($5::text IS NULL OR r.cuisine_type ILIKE $5)
              AND ($6::int IS NULL OR r.prep_time_minutes <= $6)
            ORDER BY r.updated_at DESC
            "#,
        )
        .bind(caller)
        .bind(filter.include_shared)
        .bind(filter.include_public)
        .bind(filter.q.as_deref().map(like_pattern))
        .bind(filter.cuisine.as_deref().map(like_pattern))
        .bind(filter.prep_max)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| RecipeSearchHit {
                owner: UserBrief {
                    id: row.recipe.user_id,
                    name: row.owner_name,
                    email: row.owner_email,
                },
                recipe: row.recipe,
                like_count: row.like_count,
                favorite_count: row.favorite_count,
            })
            .collect())
    }

    async fn list_public_by_user(&self, user_id: Uuid) -> Result<Vec<Recipe>> {
        let recipes = sqlx::query_as::<_, Recipe>(
            "SELECT * FROM recipes WHERE user_id = $1 AND is_public ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(recipes)
    }

    async fn list_all_recipes(&self) -> Result<Vec<AdminRecipeSummary>> {
        let rows = sqlx::query_as::<_, AdminRecipeRow>(
            r#"
            SELECT r.id AS recipe_id, r.name AS recipe_name, r.is_public, r.created_at,
                   u.id, u.name, u.email,
                   (SELECT COUNT(*) FROM recipe_comments c WHERE c.recipe_id = r.id) AS comment_count,
                   (SELECT COUNT(*) FROM recipe_likes l WHERE l.recipe_id = r.id) AS like_count
            FROM recipes r
            JOIN users u ON u.id = r.user_id
            ORDER BY r.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| AdminRecipeSummary {
                id: row.recipe_id,
                name: row.recipe_name,
                is_public: row.is_public,
                created_at: row.created_at,
                owner: row.owner,
                comment_count: row.comment_count,
                like_count: row.like_count,
            })
            .collect())
    }

    async fn upsert_share(&self, share: &RecipeShare) -> Result<RecipeShare> {
        let share = sqlx::query_as::<_, RecipeShare>(
            r#"
            INSERT INTO recipe_shares (id, recipe_id, owner_id, shared_with_id, can_edit, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (recipe_id, shared_with_id) DO UPDATE SET can_edit = EXCLUDED.can_edit
            RETURNING *
            "#,
        )
        .bind(share.id)
        .bind(share.recipe_id)
        .bind(share.owner_id)
        .bind(share.shared_with_id)
        .bind(share.can_edit)
        .bind(share.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(share)
    }

    async fn delete_share(&self, recipe_id: Uuid, shared_with_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM recipe_shares WHERE recipe_id = $1 AND shared_with_id = $2")
            .bind(recipe_id)
            .bind(shared_with_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_shares(&self, recipe_id: Uuid) -> Result<Vec<ShareEntry>> {
        let shares = sqlx::query_as::<_, ShareEntry>(
            r#"
            SELECT s.shared_with_id, u.email, u.name, s.can_edit, s.created_at
            FROM recipe_shares s
            JOIN users u ON u.id = s.shared_with_id
            WHERE s.recipe_id = $1
            ORDER BY s.created_at ASC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(shares)
    }

    async fn find_friendship(&self, a: Uuid, b: Uuid) -> Result<Option<Friend>> {
        let friend = sqlx::query_as::<_, Friend>(
            r#"
            SELECT * FROM friends
            WHERE (user_id = $1 AND friend_id = $2) OR (user_id = $2 AND friend_id = $1)
            LIMIT 1
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;
        Ok(friend)
    }

    async fn find_pending_request(&self, from: Uuid, to: Uuid) -> Result<Option<FriendRequest>> {
        let request = sqlx::query_as::<_, FriendRequest>(
            "SELECT * FROM friend_requests WHERE from_user_id = $1 AND to_user_id = $2",
        )
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn find_friend_request(&self, id: Uuid) -> Result<Option<FriendRequest>> {
        let request =
            sqlx::query_as::<_, FriendRequest>("SELECT * FROM friend_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(request)
    }

    async fn insert_friend_request(&self, request: &FriendRequest) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO friend_requests (id, from_user_id, to_user_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(request.id)
        .bind(request.from_user_id)
        .bind(request.to_user_id)
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "a friend request between these users is already pending"))?;
        Ok(())
    }

    async fn accept_friend_request(
        &self,
        request: &FriendRequest,
        friend: &Friend,
        notification: &Notification,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let consumed = sqlx::query("DELETE FROM friend_requests WHERE id = $1")
            .bind(request.id)
            .execute(&mut *tx)
            .await?;
        if consumed.rows_affected() == 0 {
            return Err(AppError::NotFound("friend request"));
        }

        sqlx::query("DELETE FROM friend_requests WHERE from_user_id = $1 AND to_user_id = $2")
            .bind(request.to_user_id)
            .bind(request.from_user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO friends (id, user_id, friend_id, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(friend.id)
        .bind(friend.user_id)
        .bind(friend.friend_id)
        .bind(friend.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "already friends"))?;

        sqlx::query(
            r#"
            INSERT INTO notifications (id, to_user_id, from_user_id, notification_type, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(notification.id)
        .bind(notification.to_user_id)
        .bind(notification.from_user_id)
        .bind(notification.notification_type)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_friend_request(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM friend_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_friendship(&self, a: Uuid, b: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM friends
            WHERE (user_id = $1 AND friend_id = $2) OR (user_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(a)
        .bind(b)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>> {
        let rows = sqlx::query_as::<_, FriendRow>(
            r#"
            SELECT f.id AS edge_id, u.id, u.name, u.email
            FROM friends f
            JOIN users u
              ON u.id = CASE WHEN f.user_id = $1 THEN f.friend_id ELSE f.user_id END
            WHERE f.user_id = $1 OR f.friend_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| FriendEntry {
                id: row.edge_id,
                friend: row.friend,
            })
            .collect())
    }

    async fn list_incoming_requests(&self, user_id: Uuid) -> Result<Vec<IncomingRequest>> {
        let rows = sqlx::query_as::<_, IncomingRow>(
            r#"
            SELECT r.id AS request_id, r.created_at, u.id, u.name, u.email
            FROM friend_requests r
            JOIN users u ON u.id = r.from_user_id
            WHERE r.to_user_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| IncomingRequest {
                id: row.request_id,
                from_user: row.from_user,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn upsert_like(&self, recipe_id: Uuid, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recipe_likes (id, recipe_id, user_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (recipe_id, user_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(recipe_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_like(&self, recipe_id: Uuid, user_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM recipe_likes WHERE recipe_id = $1 AND user_id = $2")
            .bind(recipe_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn like_status(&self, recipe_id: Uuid, user_id: Uuid) -> Result<LikeStatus> {
        let (count, liked) = sqlx::query_as::<_, (i64, bool)>(
            r#"
            SELECT COUNT(*), COALESCE(BOOL_OR(user_id = $2), FALSE)
            FROM recipe_likes
            WHERE recipe_id = $1
            "#,
        )
        .bind(recipe_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(LikeStatus { count, liked })
    }

    async fn upsert_favorite(&self, recipe_id: Uuid, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recipe_favorites (id, recipe_id, user_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (recipe_id, user_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(recipe_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_favorite(&self, recipe_id: Uuid, user_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM recipe_favorites WHERE recipe_id = $1 AND user_id = $2")
            .bind(recipe_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<RecipeWithOwner>> {
        let rows = sqlx::query_as::<_, OwnedRow>(
            r#"
            SELECT r.*, u.name AS owner_name, u.email AS owner_email
            FROM recipe_favorites f
            JOIN recipes r ON r.id = f.recipe_id
            JOIN users u ON u.id = r.user_id
            WHERE f.user_id = $1
              AND (r.user_id = $1 OR r.is_public OR EXISTS (
                    SELECT 1 FROM recipe_shares s
                    WHERE s.recipe_id = r.id AND s.shared_with_id = $1))
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recipe_comments (id, recipe_id, user_id, text, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id)
        .bind(comment.recipe_id)
        .bind(comment.user_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_comments(&self, recipe_id: Uuid) -> Result<Vec<CommentView>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id AS comment_id, c.text, c.created_at, u.id, u.name, u.email
            FROM recipe_comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.recipe_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CommentView {
                id: row.comment_id,
                text: row.text,
                created_at: row.created_at,
                user: row.user,
            })
            .collect())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM recipe_comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipe_comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_recent_comments(&self, limit: i64) -> Result<Vec<AdminCommentView>> {
        let rows = sqlx::query_as::<_, AdminCommentRow>(
            r#"
            SELECT c.id AS comment_id, c.text, c.created_at,
                   c.recipe_id, r.name AS recipe_name,
                   u.id, u.name, u.email
            FROM recipe_comments c
            JOIN recipes r ON r.id = c.recipe_id
            JOIN users u ON u.id = c.user_id
            ORDER BY c.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| AdminCommentView {
                id: row.comment_id,
                text: row.text,
                created_at: row.created_at,
                user: row.user,
                recipe_id: row.recipe_id,
                recipe_name: row.recipe_name,
            })
            .collect())
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<NotificationView>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT n.id AS notification_id, n.notification_type, n.read, n.created_at,
                   u.id, u.name, u.email
            FROM notifications n
            JOIN users u ON u.id = n.from_user_id
            WHERE n.to_user_id = $1
            ORDER BY n.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| NotificationView {
                id: row.notification_id,
                notification_type: row.notification_type,
                read: row.read,
                created_at: row.created_at,
                from_user: row.from_user,
            })
            .collect())
    }

    async fn find_notification(&self, id: Uuid) -> Result<Option<Notification>> {
        let notification =
            sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(notification)
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
