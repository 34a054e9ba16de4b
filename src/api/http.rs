use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::{ApiError, Recipe, RecipeApi, RecipeFields, RecipePatch, RecipeResponse};
use crate::config::ApiOptions;

/// Blocking client for the DummyJSON recipes endpoints. Cheap to share between worker threads.
#[derive(Debug, Clone)]
pub struct HttpRecipeClient {
    client: Client,
    base: Url,
}

impl HttpRecipeClient {
    pub fn new(options: &ApiOptions) -> Result<Self, ApiError> {
        let base = Url::parse(&options.base_url)
            .map_err(|_| ApiError::InvalidBaseUrl(options.base_url.clone()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(options.base_url.clone()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(options.user_agent.as_str())
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().map_err(ApiError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        response.json::<T>().map_err(ApiError::Decode)
    }
}

impl RecipeApi for HttpRecipeClient {
    fn get_recipes(&self, limit: u32, skip: u32) -> Result<RecipeResponse, ApiError> {
        let mut url = self.endpoint(&[]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("skip", &skip.to_string());
        tracing::debug!(%url, "listing recipes");
        self.execute(self.client.get(url))
    }

    fn search_recipes(&self, query: &str) -> Result<RecipeResponse, ApiError> {
        let mut url = self.endpoint(&["search"]);
        url.query_pairs_mut().append_pair("q", query);
        tracing::debug!(%url, "searching recipes");
        self.execute(self.client.get(url))
    }

    fn get_recipe(&self, id: u64) -> Result<Recipe, ApiError> {
        let url = self.endpoint(&[&id.to_string()]);
        match self.execute(self.client.get(url)) {
            Err(ApiError::Status { status: 404, .. }) => Err(ApiError::NotFound(id)),
            other => other,
        }
    }

    fn get_recipes_by_tag(&self, tag: &str) -> Result<RecipeResponse, ApiError> {
        let url = self.endpoint(&["tag", tag]);
        tracing::debug!(%url, "filtering recipes by tag");
        self.execute(self.client.get(url))
    }

    fn create_recipe(&self, fields: &RecipeFields) -> Result<Recipe, ApiError> {
        let url = self.endpoint(&["add"]);
        tracing::debug!(%url, name = %fields.name, "creating recipe");
        self.execute(self.client.post(url).json(fields))
    }

    fn update_recipe(&self, id: u64, patch: &RecipePatch) -> Result<Recipe, ApiError> {
        let url = self.endpoint(&[&id.to_string()]);
        tracing::debug!(%url, "updating recipe");
        self.execute(self.client.put(url).json(patch))
    }
}
