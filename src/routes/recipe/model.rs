use serde::Deserialize;
use uuid::Uuid;

use crate::models::{RecipeStatus, SearchFilter};

#[derive(Debug, Deserialize)]
pub struct ListRecipesQuery {
    pub status: Option<RecipeStatus>,
    #[serde(default)]
    pub shared: bool,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub q: Option<String>,
    pub cuisine: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub cuisine: Option<String>,
    pub prep_max: Option<i32>,
    pub shared: Option<bool>,
    pub public: Option<bool>,
}

impl From<SearchQuery> for SearchFilter {
    fn from(query: SearchQuery) -> Self {
        let defaults = SearchFilter::default();
        SearchFilter {
            q: query.q,
            cuisine: query.cuisine,
            prep_max: query.prep_max,
            include_shared: query.shared.unwrap_or(defaults.include_shared),
            include_public: query.public.unwrap_or(defaults.include_public),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub shared_with_email: String,
    #[serde(default)]
    pub can_edit: bool,
}

#[derive(Debug, Deserialize)]
pub struct UnshareQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}
