pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod highlight;
pub mod query;
pub mod ui;

pub use api::{HttpRecipeClient, MemoryRecipeApi, RecipeApi};
pub use config::{AppConfig, ConfigLoader, ConfigPaths};
