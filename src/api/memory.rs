use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::Deserialize;

use super::{ApiError, Recipe, RecipeApi, RecipeFields, RecipePatch, RecipeResponse};

/// A request served by [`MemoryRecipeApi`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    List { limit: u32, skip: u32 },
    Search(String),
    Get(u64),
    ByTag(String),
    Create(RecipeFields),
    Update { id: u64, patch: RecipePatch },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FixtureFile {
    Page(RecipeResponse),
    Bare(Vec<Recipe>),
}

/// In-process stand-in for the remote service, backed by a fixed recipe list.
///
/// Writes behave like the real service: they echo a plausible recipe and change nothing.
/// Instances built with [`MemoryRecipeApi::new`] keep a log of every request; fixture-backed
/// instances from [`MemoryRecipeApi::from_path`] serve long sessions and keep none.
#[derive(Debug, Default)]
pub struct MemoryRecipeApi {
    recipes: Vec<Recipe>,
    calls: Mutex<Vec<ApiCall>>,
    recording: bool,
}

impl MemoryRecipeApi {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes,
            calls: Mutex::new(Vec::new()),
            recording: true,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading recipe fixture {}", path.display()))?;
        let parsed: FixtureFile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing recipe fixture {}", path.display()))?;
        let recipes = match parsed {
            FixtureFile::Page(page) => page.recipes,
            FixtureFile::Bare(recipes) => recipes,
        };
        tracing::info!(count = recipes.len(), "loaded offline recipe fixture");
        Ok(Self {
            recording: false,
            ..Self::new(recipes)
        })
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, call: ApiCall) {
        if self.recording {
            self.calls.lock().push(call);
        }
    }

    fn matching<F>(&self, predicate: F) -> RecipeResponse
    where
        F: Fn(&Recipe) -> bool,
    {
        let recipes: Vec<Recipe> = self.recipes.iter().filter(|r| predicate(r)).cloned().collect();
        let count = recipes.len() as u64;
        RecipeResponse {
            recipes,
            total: count,
            skip: 0,
            limit: count,
        }
    }

    fn find(&self, id: u64) -> Result<&Recipe, ApiError> {
        self.recipes
            .iter()
            .find(|recipe| recipe.id == id)
            .ok_or(ApiError::NotFound(id))
    }
}

impl RecipeApi for MemoryRecipeApi {
    fn get_recipes(&self, limit: u32, skip: u32) -> Result<RecipeResponse, ApiError> {
        self.record(ApiCall::List { limit, skip });
        let recipes: Vec<Recipe> = self
            .recipes
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(RecipeResponse {
            total: self.recipes.len() as u64,
            skip: u64::from(skip),
            limit: recipes.len() as u64,
            recipes,
        })
    }

    fn search_recipes(&self, query: &str) -> Result<RecipeResponse, ApiError> {
        self.record(ApiCall::Search(query.to_string()));
        let needle = query.trim().to_lowercase();
        Ok(self.matching(|recipe| {
            recipe.name.to_lowercase().contains(&needle)
                || recipe.cuisine.to_lowercase().contains(&needle)
                || recipe
                    .tags
                    .iter()
                    .chain(recipe.ingredients.iter())
                    .any(|text| text.to_lowercase().contains(&needle))
        }))
    }

    fn get_recipe(&self, id: u64) -> Result<Recipe, ApiError> {
        self.record(ApiCall::Get(id));
        self.find(id).cloned()
    }

    fn get_recipes_by_tag(&self, tag: &str) -> Result<RecipeResponse, ApiError> {
        self.record(ApiCall::ByTag(tag.to_string()));
        Ok(self.matching(|recipe| recipe.has_tag(tag)))
    }

    fn create_recipe(&self, fields: &RecipeFields) -> Result<Recipe, ApiError> {
        self.record(ApiCall::Create(fields.clone()));
        let next_id = self.recipes.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Ok(Recipe::from_fields(next_id, fields.clone()))
    }

    fn update_recipe(&self, id: u64, patch: &RecipePatch) -> Result<Recipe, ApiError> {
        self.record(ApiCall::Update {
            id,
            patch: patch.clone(),
        });
        let mut echoed = self.find(id)?.clone();
        patch.apply_to(&mut echoed);
        Ok(echoed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn sample(count: u64) -> Vec<Recipe> {
        (1..=count)
            .map(|id| Recipe {
                id,
                name: format!("Recipe {id}"),
                cuisine: if id % 2 == 0 { "Italian" } else { "Thai" }.into(),
                tags: vec![format!("tag-{}", id % 3)],
                ..Recipe::default()
            })
            .collect()
    }

    #[test]
    fn pages_through_the_collection() -> Result<()> {
        let api = MemoryRecipeApi::new(sample(100));
        let page = api.get_recipes(12, 96)?;
        assert_eq!(page.total, 100);
        assert_eq!(page.recipes.len(), 4);
        assert_eq!(page.recipes[0].id, 97);
        Ok(())
    }

    #[test]
    fn tags_come_from_first_fifty_only() -> Result<()> {
        let mut recipes = sample(60);
        recipes[55].tags = vec!["late-only".into()];
        let api = MemoryRecipeApi::new(recipes);
        let tags = api.get_tags()?;
        assert_eq!(tags, vec!["tag-0", "tag-1", "tag-2"]);
        assert_eq!(api.calls(), vec![ApiCall::List { limit: 50, skip: 0 }]);
        Ok(())
    }

    #[test]
    fn search_is_case_insensitive() -> Result<()> {
        let api = MemoryRecipeApi::new(sample(4));
        let found = api.search_recipes("ITALIAN")?;
        assert_eq!(found.total, 2);
        Ok(())
    }

    #[test]
    fn writes_do_not_persist() -> Result<()> {
        let api = MemoryRecipeApi::new(sample(3));
        let created = api.create_recipe(&RecipeFields {
            name: "New".into(),
            ..RecipeFields::default()
        })?;
        assert_eq!(created.id, 4);
        let updated = api.update_recipe(
            2,
            &RecipePatch {
                name: Some("Changed".into()),
                ..RecipePatch::default()
            },
        )?;
        assert_eq!(updated.name, "Changed");
        assert_eq!(api.get_recipe(2)?.name, "Recipe 2");
        assert_eq!(api.get_recipes(50, 0)?.total, 3);
        Ok(())
    }

    #[test]
    fn unknown_id_is_not_found() {
        let api = MemoryRecipeApi::new(sample(1));
        assert_matches!(api.get_recipe(9), Err(ApiError::NotFound(9)));
    }

    #[test]
    fn loads_envelope_and_bare_fixtures() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let envelope = dir.path().join("page.json");
        fs::File::create(&envelope)?
            .write_all(br#"{"recipes":[{"id":1,"name":"A"}],"total":1,"skip":0,"limit":1}"#)?;
        let bare = dir.path().join("bare.json");
        fs::File::create(&bare)?.write_all(br#"[{"id":2,"name":"B"},{"id":3,"name":"C"}]"#)?;

        assert_eq!(MemoryRecipeApi::from_path(&envelope)?.get_recipes(10, 0)?.total, 1);
        assert_eq!(MemoryRecipeApi::from_path(&bare)?.get_recipes(10, 0)?.total, 2);
        Ok(())
    }

    #[test]
    fn fixture_sessions_keep_no_request_log() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("recipes.json");
        fs::File::create(&path)?.write_all(br#"[{"id":1,"name":"A","tags":["Soup"]}]"#)?;

        let api = MemoryRecipeApi::from_path(&path)?;
        for _ in 0..3 {
            api.get_recipes(12, 0)?;
            api.get_recipes_by_tag("Soup")?;
        }
        assert_eq!(api.call_count(), 0);

        let recorded = MemoryRecipeApi::new(api.get_recipes(12, 0)?.recipes);
        recorded.get_recipes(12, 0)?;
        assert_eq!(recorded.calls(), vec![ApiCall::List { limit: 12, skip: 0 }]);
        Ok(())
    }
}
