use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

/// Ingredients arrive either as a JSON array or as one comma separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IngredientList {
    List(Vec<String>),
    Text(String),
}

impl IngredientList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            IngredientList::List(items) => items,
            IngredientList::Text(text) => text.split(',').map(|s| s.trim().to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub ingredients: IngredientList,
    pub cuisine: Option<String>,
}
