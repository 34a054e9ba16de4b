use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::api::{HttpRecipeClient, MemoryRecipeApi, RecipeApi};
use crate::app::App;
use crate::config::{AppConfig, ConfigLoader};

pub mod commands;

use self::commands::{CreateArgs, ListArgs, SearchArgs, ShowArgs, TagArgs, UpdateArgs};

#[derive(Parser, Debug)]
#[command(
    name = "recipes",
    version,
    about = "Browse, search and edit recipes from the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over RECIPES_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the recipe service base URL from the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Serve recipes from a local JSON fixture instead of the network
    #[arg(long, global = true, value_name = "FIXTURE")]
    pub offline: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Launch the interactive TUI (default)
    Tui,
    /// Print one page of the unfiltered listing
    List(ListArgs),
    /// Full-text search across recipes
    Search(SearchArgs),
    /// Print a single recipe with ingredients and steps
    Show(ShowArgs),
    /// Print the tag list the sidebar offers
    Tags,
    /// Print recipes carrying a tag
    Tag(TagArgs),
    /// Create a recipe from JSON (file or stdin)
    Create(CreateArgs),
    /// Change selected fields of an existing recipe
    Update(UpdateArgs),
}

enum LogTarget {
    Stderr,
    File(PathBuf),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var("RECIPES_CONFIG", path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    let command = cli.command.clone().unwrap_or(Commands::Tui);
    let target = match command {
        Commands::Tui => LogTarget::File(loader.paths().log_dir.join("recipes.log")),
        _ => LogTarget::Stderr,
    };
    init_tracing(&cli.log_level, target)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;

    let mut config = loader.load_or_init()?;
    if let Some(url) = &cli.base_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    let api = build_api(&config, cli.offline.as_deref())?;
    let config = Arc::new(config);

    let output = match command {
        Commands::Tui => {
            let mut app = App::new(config, api);
            return app.run();
        }
        Commands::List(args) => commands::list_recipes(api.as_ref(), &args)?,
        Commands::Search(args) => commands::search_recipes(api.as_ref(), &args)?,
        Commands::Show(args) => commands::show_recipe(api.as_ref(), &args)?,
        Commands::Tags => commands::list_tags(api.as_ref())?,
        Commands::Tag(args) => commands::recipes_by_tag(api.as_ref(), &args)?,
        Commands::Create(args) => commands::create_recipe(api.as_ref(), &args)?,
        Commands::Update(args) => commands::update_recipe(api.as_ref(), &args)?,
    };
    print!("{output}");
    Ok(())
}

/// Picks the fixture-backed API when `offline` is given, the HTTP client otherwise.
pub fn build_api(config: &AppConfig, offline: Option<&Path>) -> Result<Arc<dyn RecipeApi>> {
    match offline {
        Some(path) => Ok(Arc::new(MemoryRecipeApi::from_path(path)?)),
        None => {
            let client = HttpRecipeClient::new(&config.api)
                .with_context(|| format!("configuring client for {}", config.api.base_url))?;
            tracing::debug!(base_url = %client.base_url(), "using remote recipe service");
            Ok(Arc::new(client))
        }
    }
}

fn init_tracing(level: &str, target: LogTarget) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        match target {
            LogTarget::Stderr => fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init(),
            LogTarget::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("opening log file {}", path.display()))?;
                fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
            }
        }
        Ok::<(), anyhow::Error>(())
    })
    .map(|_| ())
}
