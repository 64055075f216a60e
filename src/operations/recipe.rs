use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::load_visible;
use crate::access::AccessLevel;
use crate::database::Store;
use crate::error::{AppError, Result};
use crate::models::{
    Identity, NewRecipe, Recipe, RecipePatch, RecipeSearchHit, RecipeStatus, RecipeWithOwner,
    SearchFilter, non_empty,
};

/// A recipe together with what the caller may do with it.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub can_edit: bool,
    pub is_owner: bool,
}

impl RecipeDetail {
    fn new(recipe: Recipe, access: AccessLevel) -> Self {
        Self {
            recipe,
            can_edit: access.can_edit(),
            is_owner: access == AccessLevel::Owner,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MyRecipes {
    pub owned: Vec<Recipe>,
    pub shared: Vec<RecipeWithOwner>,
}

pub async fn create_recipe(
    store: &dyn Store,
    caller: &Identity,
    fields: NewRecipe,
) -> Result<Recipe> {
    caller.ensure_active()?;
    fields.validate()?;

    let recipe = fields.into_recipe(caller.id, Utc::now());
    store.insert_recipe(&recipe).await?;

    tracing::info!("Recipe {} created by {}", recipe.id, caller.id);
    Ok(recipe)
}

pub async fn get_recipe(
    store: &dyn Store,
    caller: &Identity,
    recipe_id: Uuid,
) -> Result<RecipeDetail> {
    let visible = load_visible(store, caller, recipe_id).await?;
    let access = visible.access(caller.id);
    Ok(RecipeDetail::new(visible.recipe, access))
}

/// Owner or edit grant holder only. Invisible recipes are `NotFound`,
/// visible but read-only ones `Forbidden`.
pub async fn update_recipe(
    store: &dyn Store,
    caller: &Identity,
    recipe_id: Uuid,
    patch: RecipePatch,
) -> Result<RecipeDetail> {
    caller.ensure_active()?;
    patch.validate()?;

    let visible = load_visible(store, caller, recipe_id).await?;
    if let Err(e) = visible.ensure_editable(caller.id) {
        tracing::warn!("User {} denied edit on recipe {}", caller.id, recipe_id);
        return Err(e);
    }
    let access = visible.access(caller.id);

    // The grant is checked again by the write itself; losing it in between
    // leaves the recipe untouched.
    let Some(recipe) = store
        .update_recipe(recipe_id, caller.id, &patch, Utc::now())
        .await?
    else {
        tracing::warn!("User {} lost edit access to recipe {} mid-update", caller.id, recipe_id);
        return Err(match store.find_visible_recipe(recipe_id, caller.id).await? {
            Some(_) => AppError::Forbidden("you do not have permission to edit this recipe".into()),
            None => AppError::NotFound("recipe"),
        });
    };

    tracing::info!("Recipe {} updated by {}", recipe.id, caller.id);
    Ok(RecipeDetail::new(recipe, access))
}

/// Owner only; edit grants do not allow deletion.
pub async fn delete_recipe(store: &dyn Store, caller: &Identity, recipe_id: Uuid) -> Result<()> {
    caller.ensure_active()?;

    let visible = load_visible(store, caller, recipe_id).await?;
    if let Err(e) = visible.ensure_owner(caller.id) {
        tracing::warn!("User {} denied delete on recipe {}", caller.id, recipe_id);
        return Err(e);
    }

    store.delete_recipe(recipe_id).await?;
    tracing::info!("Recipe {} deleted by {}", recipe_id, caller.id);
    Ok(())
}

pub async fn list_my_recipes(
    store: &dyn Store,
    caller: &Identity,
    status: Option<RecipeStatus>,
    include_shared: bool,
) -> Result<MyRecipes> {
    let owned = store.list_owned_recipes(caller.id, status).await?;
    let shared = if include_shared {
        store.list_shared_recipes(caller.id, status).await?
    } else {
        Vec::new()
    };
    tracing::debug!(
        "User {} has {} owned and {} shared recipes",
        caller.id,
        owned.len(),
        shared.len()
    );
    Ok(MyRecipes { owned, shared })
}

pub async fn list_public_feed(
    store: &dyn Store,
    caller: &Identity,
    q: Option<String>,
    cuisine: Option<String>,
) -> Result<Vec<RecipeWithOwner>> {
    let q = non_empty(q);
    let cuisine = non_empty(cuisine);
    store
        .list_public_feed(caller.id, q.as_deref(), cuisine.as_deref())
        .await
}

pub async fn search_recipes(
    store: &dyn Store,
    caller: &Identity,
    filter: SearchFilter,
) -> Result<Vec<RecipeSearchHit>> {
    let filter = filter.normalized();
    store.search_recipes(caller.id, &filter).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::operations::sharing::grant_share;
    use crate::operations::testing::member;

    fn fields(name: &str) -> NewRecipe {
        NewRecipe {
            name: name.into(),
            ingredients: vec!["tomato".into(), "basil".into()],
            instructions: "Chop and mix.".into(),
            cuisine_type: Some("Italian".into()),
            prep_time_minutes: Some(15),
            ..Default::default()
        }
    }

    fn rename(name: &str) -> RecipePatch {
        RecipePatch {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn private_recipe_share_and_upgrade_scenario() {
        let store = MemoryStore::new();
        let owner = member(&store, "owner@example.com").await;
        let viewer = member(&store, "viewer@example.com").await;

        let recipe = create_recipe(&store, &owner, fields("Bruschetta")).await.unwrap();
        assert!(!recipe.is_public);
        assert_eq!(recipe.status, RecipeStatus::ToTry);

        let err = get_recipe(&store, &viewer, recipe.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        grant_share(&store, &owner, recipe.id, "viewer@example.com", false)
            .await
            .unwrap();
        let seen = get_recipe(&store, &viewer, recipe.id).await.unwrap();
        assert_eq!(seen.recipe, recipe);
        assert!(!seen.can_edit);

        let err = update_recipe(&store, &viewer, recipe.id, rename("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        grant_share(&store, &owner, recipe.id, "viewer@example.com", true)
            .await
            .unwrap();
        let updated = update_recipe(&store, &viewer, recipe.id, rename("x"))
            .await
            .unwrap();
        assert_eq!(updated.recipe.name, "x");
        assert_eq!(updated.recipe.user_id, owner.id);
        assert_eq!(updated.recipe.ingredients, recipe.ingredients);

        // Editors still cannot delete.
        let err = delete_recipe(&store, &viewer, recipe.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn public_recipe_is_readable_but_not_editable() {
        let store = MemoryStore::new();
        let owner = member(&store, "owner@example.com").await;
        let stranger = member(&store, "w@example.com").await;

        let recipe = create_recipe(&store, &owner, fields("Caprese")).await.unwrap();
        update_recipe(
            &store,
            &owner,
            recipe.id,
            RecipePatch {
                is_public: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let seen = get_recipe(&store, &stranger, recipe.id).await.unwrap();
        assert!(seen.recipe.is_public);
        assert!(!seen.is_owner);

        let err = update_recipe(&store, &stranger, recipe.id, rename("mine"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn delete_cascades_and_hides_recipe() {
        let store = MemoryStore::new();
        let owner = member(&store, "owner@example.com").await;
        let friend = member(&store, "friend@example.com").await;

        let recipe = create_recipe(&store, &owner, fields("Risotto")).await.unwrap();
        grant_share(&store, &owner, recipe.id, "friend@example.com", true)
            .await
            .unwrap();
        store.upsert_like(recipe.id, friend.id).await.unwrap();
        store.upsert_favorite(recipe.id, friend.id).await.unwrap();

        delete_recipe(&store, &owner, recipe.id).await.unwrap();

        for who in [&owner, &friend] {
            let err = get_recipe(&store, who, recipe.id).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        }
        assert!(store.list_shares(recipe.id).await.unwrap().is_empty());
        assert_eq!(store.like_status(recipe.id, friend.id).await.unwrap().count, 0);
        assert!(store.list_favorites(friend.id).await.unwrap().is_empty());
        assert!(store.list_comments(recipe.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invisible_recipe_cannot_be_deleted_or_updated() {
        let store = MemoryStore::new();
        let owner = member(&store, "owner@example.com").await;
        let stranger = member(&store, "w@example.com").await;
        let recipe = create_recipe(&store, &owner, fields("Gnocchi")).await.unwrap();

        let err = delete_recipe(&store, &stranger, recipe.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = update_recipe(&store, &stranger, recipe.id, rename("y"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn disabled_caller_cannot_create() {
        let store = MemoryStore::new();
        let mut caller = member(&store, "owner@example.com").await;
        caller.disabled = true;
        let err = create_recipe(&store, &caller, fields("Tiramisu"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn listings_only_contain_visible_recipes() {
        let store = MemoryStore::new();
        let alice = member(&store, "alice@example.com").await;
        let bob = member(&store, "bob@example.com").await;
        let carol = member(&store, "carol@example.com").await;

        let private = create_recipe(&store, &alice, fields("Private pesto")).await.unwrap();
        let shared = create_recipe(&store, &alice, fields("Shared lasagna")).await.unwrap();
        let public = create_recipe(
            &store,
            &alice,
            NewRecipe {
                is_public: Some(true),
                ..fields("Public pizza")
            },
        )
        .await
        .unwrap();
        grant_share(&store, &alice, shared.id, "bob@example.com", false)
            .await
            .unwrap();

        let mine = list_my_recipes(&store, &bob, None, true).await.unwrap();
        assert!(mine.owned.is_empty());
        assert_eq!(mine.shared.len(), 1);
        assert_eq!(mine.shared[0].recipe.id, shared.id);
        assert_eq!(mine.shared[0].owner.id, alice.id);

        let feed = list_public_feed(&store, &carol, None, None).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].recipe.id, public.id);
        assert!(list_public_feed(&store, &alice, None, None).await.unwrap().is_empty());

        let hits = search_recipes(&store, &bob, SearchFilter::default()).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = search_recipes(
            &store,
            &bob,
            SearchFilter {
                include_public: true,
                q: Some("  ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let ids: Vec<Uuid> = hits.iter().map(|h| h.recipe.id).collect();
        assert!(ids.contains(&shared.id));
        assert!(ids.contains(&public.id));
        assert!(!ids.contains(&private.id));

        let hits = search_recipes(
            &store,
            &carol,
            SearchFilter {
                include_public: true,
                q: Some("pizza".into()),
                prep_max: Some(20),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].recipe.id, public.id);
    }
}
