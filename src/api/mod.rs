//! Access to the recipe collection.
//!
//! Every call is a single request/response pair: no retries and no caching here.
//! Caching and request de-duplication live in [`crate::query`].

use std::collections::BTreeSet;

use thiserror::Error;

mod http;
mod memory;
pub mod model;

pub use http::HttpRecipeClient;
pub use memory::{ApiCall, MemoryRecipeApi};
pub use model::{
    Difficulty, Recipe, RecipeFields, RecipePatch, RecipeResponse, SaveKind, SaveRequest,
};

/// How many recipes are sampled when deriving the tag list. Tags that only appear on recipes
/// beyond this window never show up in the sidebar.
pub const TAG_SAMPLE_SIZE: u32 = 50;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("recipe #{0} not found")]
    NotFound(u64),

    #[error("invalid base url '{0}'")]
    InvalidBaseUrl(String),
}

pub trait RecipeApi: Send + Sync {
    fn get_recipes(&self, limit: u32, skip: u32) -> Result<RecipeResponse, ApiError>;

    fn search_recipes(&self, query: &str) -> Result<RecipeResponse, ApiError>;

    fn get_recipe(&self, id: u64) -> Result<Recipe, ApiError>;

    fn get_recipes_by_tag(&self, tag: &str) -> Result<RecipeResponse, ApiError>;

    fn create_recipe(&self, fields: &RecipeFields) -> Result<Recipe, ApiError>;

    fn update_recipe(&self, id: u64, patch: &RecipePatch) -> Result<Recipe, ApiError>;

    /// Derived from the first [`TAG_SAMPLE_SIZE`] recipes rather than a dedicated endpoint.
    fn get_tags(&self) -> Result<Vec<String>, ApiError> {
        let page = self.get_recipes(TAG_SAMPLE_SIZE, 0)?;
        Ok(collect_tags(&page.recipes))
    }

    fn save(&self, request: &SaveRequest) -> Result<Recipe, ApiError> {
        match request {
            SaveRequest::Create(fields) => self.create_recipe(fields),
            SaveRequest::Update { id, fields } => {
                self.update_recipe(*id, &RecipePatch::from(fields.clone()))
            }
        }
    }
}

/// Flattens every recipe's tags into a sorted list without duplicates.
pub fn collect_tags(recipes: &[Recipe]) -> Vec<String> {
    recipes
        .iter()
        .flat_map(|recipe| recipe.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(tags: &[&str]) -> Recipe {
        Recipe {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Recipe::default()
        }
    }

    #[test]
    fn collect_tags_dedups_and_sorts() {
        let recipes = vec![tagged(&["a", "b"]), tagged(&["b", "c"]), tagged(&["a"])];
        assert_eq!(collect_tags(&recipes), vec!["a", "b", "c"]);
    }

    #[test]
    fn collect_tags_is_case_sensitive() {
        let recipes = vec![tagged(&["Pasta", "pasta"])];
        assert_eq!(collect_tags(&recipes), vec!["Pasta", "pasta"]);
    }
}
