//! Likes, favorites and comments. All of them require the caller to see the
//! recipe.

use chrono::Utc;
use uuid::Uuid;

use super::load_visible;
use crate::database::Store;
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentView, Identity, LikeStatus, RecipeWithOwner};

const MAX_COMMENT_CHARS: usize = 2000;

pub async fn like_status(store: &dyn Store, caller: &Identity, recipe_id: Uuid) -> Result<LikeStatus> {
    load_visible(store, caller, recipe_id).await?;
    store.like_status(recipe_id, caller.id).await
}

pub async fn like_recipe(store: &dyn Store, caller: &Identity, recipe_id: Uuid) -> Result<LikeStatus> {
    caller.ensure_active()?;
    let visible = load_visible(store, caller, recipe_id).await?;
    if visible.recipe.user_id == caller.id {
        return Err(AppError::InvalidArgument(
            "cannot like your own recipe".into(),
        ));
    }
    store.upsert_like(recipe_id, caller.id).await?;
    store.like_status(recipe_id, caller.id).await
}

pub async fn unlike_recipe(store: &dyn Store, caller: &Identity, recipe_id: Uuid) -> Result<LikeStatus> {
    caller.ensure_active()?;
    load_visible(store, caller, recipe_id).await?;
    store.delete_like(recipe_id, caller.id).await?;
    store.like_status(recipe_id, caller.id).await
}

pub async fn favorite_recipe(store: &dyn Store, caller: &Identity, recipe_id: Uuid) -> Result<()> {
    caller.ensure_active()?;
    load_visible(store, caller, recipe_id).await?;
    store.upsert_favorite(recipe_id, caller.id).await
}

pub async fn unfavorite_recipe(store: &dyn Store, caller: &Identity, recipe_id: Uuid) -> Result<()> {
    caller.ensure_active()?;
    load_visible(store, caller, recipe_id).await?;
    store.delete_favorite(recipe_id, caller.id).await
}

pub async fn list_favorites(store: &dyn Store, caller: &Identity) -> Result<Vec<RecipeWithOwner>> {
    store.list_favorites(caller.id).await
}

pub async fn list_comments(
    store: &dyn Store,
    caller: &Identity,
    recipe_id: Uuid,
) -> Result<Vec<CommentView>> {
    load_visible(store, caller, recipe_id).await?;
    store.list_comments(recipe_id).await
}

pub async fn add_comment(
    store: &dyn Store,
    caller: &Identity,
    recipe_id: Uuid,
    text: &str,
) -> Result<Comment> {
    caller.ensure_active()?;
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::InvalidArgument("comment text is required".into()));
    }
    if text.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::InvalidArgument(format!(
            "comment must be at most {MAX_COMMENT_CHARS} characters"
        )));
    }
    load_visible(store, caller, recipe_id).await?;

    let comment = Comment {
        id: Uuid::new_v4(),
        recipe_id,
        user_id: caller.id,
        text: text.to_string(),
        created_at: Utc::now(),
    };
    store.insert_comment(&comment).await?;
    tracing::debug!("Comment {} added to recipe {}", comment.id, recipe_id);
    Ok(comment)
}

/// Only the author may delete a comment here; admins use the admin route.
pub async fn delete_comment(
    store: &dyn Store,
    caller: &Identity,
    recipe_id: Uuid,
    comment_id: Uuid,
) -> Result<()> {
    caller.ensure_active()?;
    load_visible(store, caller, recipe_id).await?;

    let comment = store
        .find_comment(comment_id)
        .await?
        .filter(|c| c.recipe_id == recipe_id)
        .ok_or(AppError::NotFound("comment"))?;
    if comment.user_id != caller.id {
        return Err(AppError::Forbidden(
            "you can only delete your own comments".into(),
        ));
    }

    store.delete_comment(comment_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::{NewRecipe, Recipe, RecipePatch};
    use crate::operations::recipe::{create_recipe, update_recipe};
    use crate::operations::testing::member;

    async fn public_recipe(store: &MemoryStore, owner: &Identity) -> Recipe {
        create_recipe(
            store,
            owner,
            NewRecipe {
                name: "Ramen".into(),
                is_public: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn likes_are_idempotent() {
        let store = MemoryStore::new();
        let owner = member(&store, "o@example.com").await;
        let fan = member(&store, "f@example.com").await;
        let recipe = public_recipe(&store, &owner).await;

        like_recipe(&store, &fan, recipe.id).await.unwrap();
        let status = like_recipe(&store, &fan, recipe.id).await.unwrap();
        assert_eq!(status, LikeStatus { count: 1, liked: true });

        let seen_by_owner = like_status(&store, &owner, recipe.id).await.unwrap();
        assert_eq!(seen_by_owner, LikeStatus { count: 1, liked: false });

        unlike_recipe(&store, &fan, recipe.id).await.unwrap();
        let status = unlike_recipe(&store, &fan, recipe.id).await.unwrap();
        assert_eq!(status.count, 0);

        let err = like_recipe(&store, &owner, recipe.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn favorites_follow_visibility() {
        let store = MemoryStore::new();
        let owner = member(&store, "o@example.com").await;
        let fan = member(&store, "f@example.com").await;
        let recipe = public_recipe(&store, &owner).await;

        favorite_recipe(&store, &fan, recipe.id).await.unwrap();
        favorite_recipe(&store, &fan, recipe.id).await.unwrap();
        assert_eq!(list_favorites(&store, &fan).await.unwrap().len(), 1);

        update_recipe(
            &store,
            &owner,
            recipe.id,
            RecipePatch {
                is_public: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(list_favorites(&store, &fan).await.unwrap().is_empty());

        let err = favorite_recipe(&store, &fan, recipe.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn comment_rules() {
        let store = MemoryStore::new();
        let owner = member(&store, "o@example.com").await;
        let fan = member(&store, "f@example.com").await;
        let recipe = public_recipe(&store, &owner).await;

        let err = add_comment(&store, &fan, recipe.id, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        let too_long = "x".repeat(MAX_COMMENT_CHARS + 1);
        assert!(add_comment(&store, &fan, recipe.id, &too_long).await.is_err());

        let comment = add_comment(&store, &fan, recipe.id, "  Delicious!  ").await.unwrap();
        assert_eq!(comment.text, "Delicious!");

        let comments = list_comments(&store, &owner, recipe.id).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].user.id, fan.id);

        let err = delete_comment(&store, &owner, recipe.id, comment.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = delete_comment(&store, &fan, recipe.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("comment")));

        delete_comment(&store, &fan, recipe.id, comment.id).await.unwrap();
        assert!(list_comments(&store, &fan, recipe.id).await.unwrap().is_empty());
    }
}
