use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::generate::GeneratedRecipe;

const DEFAULT_NAME: &str = "Generated Recipe";
const MAX_SUGGESTIONS: usize = 5;

static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*").expect("Invalid code fence regex"));

// "1." / "2)" numbering or a bullet. Bare leading digits belong to the name.
static LIST_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+[.)]|[•\-*])\s*").expect("Invalid list marker regex")
});

static INGREDIENTS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"ingredients"\s*:\s*\[(.*?)\]"#).expect("Invalid ingredients regex")
});

static QUOTED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("Invalid quoted string regex"));

static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| string_value_regex("name"));
static INSTRUCTIONS_REGEX: LazyLock<Regex> = LazyLock::new(|| string_value_regex("instructions"));
static CUISINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| string_value_regex("cuisineType|cuisine_type"));
static PREP_TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| number_value_regex("prepTimeMinutes|prep_time_minutes"));
static COOK_TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| number_value_regex("cookTimeMinutes|cook_time_minutes"));

fn string_value_regex(keys: &str) -> Regex {
    Regex::new(&format!(r#""(?:{keys})"\s*:\s*"((?:[^"\\]|\\.)*)""#))
        .expect("Invalid string field regex")
}

fn number_value_regex(keys: &str) -> Regex {
    Regex::new(&format!(r#""(?:{keys})"\s*:\s*(\d+)"#)).expect("Invalid number field regex")
}

/// Lines containing any of these are chatter, not dish names.
const NOT_A_NAME: &[&str] = &[
    "try more",
    "try adding",
    "sorry",
    "i cannot",
    "i can't",
    "i'm unable",
    "here are",
    "suggestions:",
    "recipe names",
    "you could",
    "for example",
    "ingredients",
    "need more",
    "please provide",
    "unable to",
];

fn strip_code_fences(text: &str) -> String {
    CODE_FENCE_REGEX.replace_all(text, "").trim().to_string()
}

fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn minutes_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<i32> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_f64))
        .filter(|m| m.is_finite() && *m >= 0.0)
        .map(|m| m.round() as i32)
}

fn from_object(obj: &Map<String, Value>) -> GeneratedRecipe {
    let ingredients = obj
        .get("ingredients")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    GeneratedRecipe {
        name: string_field(obj, &["name"]).unwrap_or_else(|| DEFAULT_NAME.to_string()),
        ingredients,
        instructions: string_field(obj, &["instructions"]).unwrap_or_default(),
        cuisine_type: string_field(obj, &["cuisineType", "cuisine_type"]),
        prep_time_minutes: minutes_field(obj, &["prepTimeMinutes", "prep_time_minutes"]),
        cook_time_minutes: minutes_field(obj, &["cookTimeMinutes", "cook_time_minutes"]),
    }
}

fn parse_object(text: &str) -> Option<GeneratedRecipe> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(obj)) => Some(from_object(&obj)),
        _ => None,
    }
}

fn unescape(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_string())
}

fn salvage_string(text: &str, re: &Regex) -> Option<String> {
    re.captures(text)
        .map(|c| unescape(&c[1]).trim().to_string())
        .filter(|s| !s.is_empty())
}

fn salvage_number(text: &str, re: &Regex) -> Option<i32> {
    re.captures(text).and_then(|c| c[1].parse().ok())
}

// Field-by-field recovery for replies that are almost JSON (trailing
// commas, cut off mid-object, prose around the braces).
fn salvage(text: &str) -> Option<GeneratedRecipe> {
    let name = salvage_string(text, &NAME_REGEX);
    let instructions = salvage_string(text, &INSTRUCTIONS_REGEX);
    let ingredients: Vec<String> = INGREDIENTS_REGEX
        .captures(text)
        .map(|c| {
            QUOTED_REGEX
                .captures_iter(&c[1])
                .map(|q| unescape(&q[1]))
                .collect()
        })
        .unwrap_or_default();

    if name.is_none() && instructions.is_none() && ingredients.is_empty() {
        return None;
    }

    Some(GeneratedRecipe {
        name: name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
        ingredients,
        instructions: instructions.unwrap_or_default(),
        cuisine_type: salvage_string(text, &CUISINE_REGEX),
        prep_time_minutes: salvage_number(text, &PREP_TIME_REGEX),
        cook_time_minutes: salvage_number(text, &COOK_TIME_REGEX),
    })
}

/// Reads a recipe out of a model reply. `None` when nothing usable is in it.
pub fn parse_generated_recipe(text: &str) -> Option<GeneratedRecipe> {
    let cleaned = strip_code_fences(text);
    if let Some(recipe) = parse_object(&cleaned) {
        return Some(recipe);
    }

    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
        if start < end {
            if let Some(recipe) = parse_object(&cleaned[start..=end]) {
                return Some(recipe);
            }
        }
    }

    salvage(&cleaned)
}

fn is_recipe_name_like(line: &str) -> bool {
    let lower = line.to_lowercase();
    if NOT_A_NAME.iter().any(|s| lower.contains(s)) {
        return false;
    }
    (2..=120).contains(&line.chars().count())
}

/// Up to five dish names, one per line, with list markers removed.
pub fn parse_recipe_names(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| LIST_MARKER_REGEX.replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .filter(|line| is_recipe_name_like(line))
        .take(MAX_SUGGESTIONS)
        .collect()
}
