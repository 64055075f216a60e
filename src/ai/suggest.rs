use serde::Serialize;
use uuid::Uuid;

use super::LlmProvider;
use super::parse::parse_recipe_names;
use crate::database::Store;
use crate::error::Result;
use crate::models::{Identity, Recipe, non_empty};

const SYSTEM_PROMPT: &str = "Output only recipe or dish names, one per line. \
No numbers, no bullets, no explanations. Just the names.";
const MAX_MATCHES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Ai,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeMatch {
    pub id: Uuid,
    pub name: String,
    pub match_score: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Suggestions {
    pub suggestions: Vec<String>,
    pub source: SuggestionSource,
    /// Only filled for local matches.
    pub matches: Vec<RecipeMatch>,
}

fn build_prompt(ingredients: &[String], cuisine: Option<&str>) -> String {
    let list = ingredients.join(", ");
    match cuisine {
        Some(cuisine) => format!(
            "Ingredients: {list}. Cuisine: {cuisine}. List 3 dish or recipe names that use these ingredients. One name per line, no numbering."
        ),
        None => format!(
            "Ingredients: {list}. List 3 dish or recipe names that use these ingredients. One name per line, no numbering."
        ),
    }
}

/// +1 per ingredient found in the recipe's ingredient list, +2 when the
/// cuisine matches.
fn score(recipe: &Recipe, ingredients: &[String], cuisine: Option<&str>) -> u32 {
    let haystack = recipe.ingredients.join(" ").to_lowercase();
    let mut score = ingredients
        .iter()
        .filter(|i| haystack.contains(&i.to_lowercase()))
        .count() as u32;
    if let Some(cuisine) = cuisine {
        if recipe
            .cuisine_type
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(&cuisine.to_lowercase()))
        {
            score += 2;
        }
    }
    score
}

fn rank_local(recipes: Vec<Recipe>, ingredients: &[String], cuisine: Option<&str>) -> Vec<RecipeMatch> {
    let mut matches: Vec<RecipeMatch> = recipes
        .into_iter()
        .map(|r| RecipeMatch {
            match_score: score(&r, ingredients, cuisine),
            id: r.id,
            name: r.name,
        })
        .filter(|m| m.match_score > 0)
        .collect();
    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    matches.truncate(MAX_MATCHES);
    matches
}

/// Asks the model for dish names when one is configured; otherwise, or when
/// the model says nothing useful, ranks the caller's own and shared recipes.
pub async fn suggest_recipes(
    store: &dyn Store,
    provider: Option<&dyn LlmProvider>,
    caller: &Identity,
    ingredients: Vec<String>,
    cuisine: Option<String>,
) -> Result<Suggestions> {
    let ingredients: Vec<String> = ingredients
        .into_iter()
        .filter_map(|i| non_empty(Some(i)))
        .collect();
    let cuisine = non_empty(cuisine);

    if let Some(provider) = provider.filter(|_| !ingredients.is_empty()) {
        let prompt = build_prompt(&ingredients, cuisine.as_deref());
        match provider.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => {
                let names = parse_recipe_names(&reply);
                if !names.is_empty() {
                    return Ok(Suggestions {
                        suggestions: names,
                        source: SuggestionSource::Ai,
                        matches: Vec::new(),
                    });
                }
            }
            Err(e) => tracing::warn!("Suggestion request failed, using local matches: {}", e),
        }
    }

    let mut recipes = store.list_owned_recipes(caller.id, None).await?;
    recipes.extend(
        store
            .list_shared_recipes(caller.id, None)
            .await?
            .into_iter()
            .map(|shared| shared.recipe),
    );

    let matches = rank_local(recipes, &ingredients, cuisine.as_deref());
    Ok(Suggestions {
        suggestions: matches.iter().map(|m| m.name.clone()).collect(),
        source: SuggestionSource::Local,
        matches,
    })
}
