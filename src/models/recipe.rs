use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::UserBrief;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "recipe_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeStatus {
    Favorite,
    #[default]
    ToTry,
    MadeBefore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    /// Owner. Never changes after creation.
    pub user_id: Uuid,
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub cuisine_type: Option<String>,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    pub status: RecipeStatus,
    pub is_public: bool,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a recipe.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    pub cuisine_type: Option<String>,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    pub status: Option<RecipeStatus>,
    pub is_public: Option<bool>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl NewRecipe {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidArgument("name is required".into()));
        }
        validate_minutes("prep_time_minutes", self.prep_time_minutes)?;
        validate_minutes("cook_time_minutes", self.cook_time_minutes)
    }

    pub fn into_recipe(self, owner_id: Uuid, now: DateTime<Utc>) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            user_id: owner_id,
            name: self.name.trim().to_string(),
            ingredients: self.ingredients,
            instructions: self.instructions,
            cuisine_type: self.cuisine_type,
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            status: self.status.unwrap_or_default(),
            is_public: self.is_public.unwrap_or(false),
            image_urls: self.image_urls,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. Absent fields keep their value; the nullable ones use a
/// nested `Option` so `null` clears them while omission leaves them alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub cuisine_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub prep_time_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub cook_time_minutes: Option<Option<i32>>,
    pub status: Option<RecipeStatus>,
    pub is_public: Option<bool>,
    pub image_urls: Option<Vec<String>>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_minutes(field: &str, value: Option<i32>) -> Result<(), AppError> {
    match value {
        Some(v) if v < 0 => Err(AppError::InvalidArgument(format!(
            "{field} must not be negative"
        ))),
        _ => Ok(()),
    }
}

impl RecipePatch {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::InvalidArgument("name must not be empty".into()));
            }
        }
        validate_minutes("prep_time_minutes", self.prep_time_minutes.flatten())?;
        validate_minutes("cook_time_minutes", self.cook_time_minutes.flatten())
    }

    pub fn apply(self, recipe: &mut Recipe, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            recipe.name = name.trim().to_string();
        }
        if let Some(ingredients) = self.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(instructions) = self.instructions {
            recipe.instructions = instructions;
        }
        if let Some(cuisine_type) = self.cuisine_type {
            recipe.cuisine_type = cuisine_type;
        }
        if let Some(prep) = self.prep_time_minutes {
            recipe.prep_time_minutes = prep;
        }
        if let Some(cook) = self.cook_time_minutes {
            recipe.cook_time_minutes = cook;
        }
        if let Some(status) = self.status {
            recipe.status = status;
        }
        if let Some(is_public) = self.is_public {
            recipe.is_public = is_public;
        }
        if let Some(image_urls) = self.image_urls {
            recipe.image_urls = image_urls;
        }
        recipe.updated_at = now;
    }
}

/// A recipe the caller is allowed to see, with the caller's share grant if
/// one exists.
#[derive(Debug, Clone)]
pub struct VisibleRecipe {
    pub recipe: Recipe,
    pub share_can_edit: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeWithOwner {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub owner: UserBrief,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeSearchHit {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub owner: UserBrief,
    pub like_count: i64,
    pub favorite_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminRecipeSummary {
    pub id: Uuid,
    pub name: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub owner: UserBrief,
    pub comment_count: i64,
    pub like_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipeShare {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub owner_id: Uuid,
    pub shared_with_id: Uuid,
    pub can_edit: bool,
    pub created_at: DateTime<Utc>,
}

/// A share grant as shown to the recipe owner.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShareEntry {
    pub shared_with_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub can_edit: bool,
    pub created_at: DateTime<Utc>,
}

/// Filters for the combined search listing. Each flag only ever narrows the
/// visibility predicate, it never widens it past owned/shared/public.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    pub q: Option<String>,
    pub cuisine: Option<String>,
    pub prep_max: Option<i32>,
    pub include_shared: bool,
    pub include_public: bool,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            q: None,
            cuisine: None,
            prep_max: None,
            include_shared: true,
            include_public: false,
        }
    }
}

impl SearchFilter {
    /// Trims text filters and drops empty ones.
    pub fn normalized(mut self) -> Self {
        self.q = non_empty(self.q);
        self.cuisine = non_empty(self.cuisine);
        self
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Case-insensitive text match used by the in-memory listings. Mirrors the
/// `ILIKE` predicate of the Postgres queries.
pub(crate) fn recipe_matches_text(recipe: &Recipe, q: &str) -> bool {
    let q = q.to_lowercase();
    let contains = |s: &str| s.to_lowercase().contains(&q);
    contains(&recipe.name)
        || contains(&recipe.instructions)
        || recipe.cuisine_type.as_deref().is_some_and(contains)
        || recipe.ingredients.iter().any(|i| contains(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recipe {
        NewRecipe {
            name: "  Pad Thai ".into(),
            ingredients: vec!["rice noodles".into(), "tamarind".into()],
            instructions: "Soak, fry, toss.".into(),
            cuisine_type: Some("Thai".into()),
            prep_time_minutes: Some(20),
            cook_time_minutes: Some(10),
            ..Default::default()
        }
        .into_recipe(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn new_recipe_defaults() {
        let recipe = sample();
        assert_eq!(recipe.name, "Pad Thai");
        assert_eq!(recipe.status, RecipeStatus::ToTry);
        assert!(!recipe.is_public);
        assert_eq!(recipe.created_at, recipe.updated_at);
    }

    #[test]
    fn blank_name_is_rejected() {
        let fields = NewRecipe {
            name: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(fields.validate(), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn negative_minutes_are_rejected() {
        let fields = NewRecipe {
            name: "Soup".into(),
            cook_time_minutes: Some(-5),
            ..Default::default()
        };
        assert!(fields.validate().is_err());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut recipe = sample();
        let owner = recipe.user_id;
        let patch: RecipePatch = serde_json::from_str(r#"{"name":"Pad See Ew"}"#).unwrap();
        patch.apply(&mut recipe, Utc::now());

        assert_eq!(recipe.name, "Pad See Ew");
        assert_eq!(recipe.cuisine_type.as_deref(), Some("Thai"));
        assert_eq!(recipe.prep_time_minutes, Some(20));
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.user_id, owner);
    }

    #[test]
    fn patch_null_clears_nullable_fields() {
        let mut recipe = sample();
        let patch: RecipePatch =
            serde_json::from_str(r#"{"cuisine_type":null,"prep_time_minutes":null}"#).unwrap();
        assert_eq!(patch.cuisine_type, Some(None));
        patch.apply(&mut recipe, Utc::now());

        assert_eq!(recipe.cuisine_type, None);
        assert_eq!(recipe.prep_time_minutes, None);
        assert_eq!(recipe.cook_time_minutes, Some(10));
    }

    #[test]
    fn text_match_covers_ingredients_and_cuisine() {
        let recipe = sample();
        assert!(recipe_matches_text(&recipe, "TAMARIND"));
        assert!(recipe_matches_text(&recipe, "thai"));
        assert!(!recipe_matches_text(&recipe, "lasagna"));
    }
}
