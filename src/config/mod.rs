use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use strum::EnumString;

pub mod themes;

const APP_DOMAIN: &str = "io";
const APP_ORG: &str = "RecipeTui";
const APP_NAME: &str = "recipes";

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com/recipes";

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    pub fn with_paths(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let mut default_cfg = AppConfig::default();
            default_cfg.post_load();
            self.write_default_config(&default_cfg)?;
            return Ok(default_cfg);
        }

        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let mut cfg: AppConfig = toml::from_str(&raw).context("parsing config toml")?;
        cfg.post_load();
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub state_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl ConfigPaths {
    pub fn discover() -> Result<Self> {
        let override_config = env::var("RECIPES_CONFIG").ok().map(PathBuf::from);

        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;

        let config_dir = override_config
            .clone()
            .map(|p| {
                if p.is_dir() {
                    p
                } else {
                    p.parent().map(Path::to_path_buf).unwrap_or(p)
                }
            })
            .unwrap_or_else(|| project_dirs.config_dir().to_path_buf());

        let config_file = override_config
            .filter(|p| p.is_file() || p.extension().is_some())
            .unwrap_or_else(|| config_dir.join("config.toml"));

        let state_dir = project_dirs
            .state_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| project_dirs.data_dir().join("state"));
        let log_dir = state_dir.join("logs");

        Ok(Self {
            config_dir,
            config_file,
            state_dir,
            log_dir,
        })
    }

    /// Lays every path out beneath `root`; handy for tests and portable installs.
    pub fn rooted_at(root: &Path) -> Self {
        let config_dir = root.join("config");
        let state_dir = root.join("state");
        Self {
            config_file: config_dir.join("config.toml"),
            config_dir,
            log_dir: state_dir.join("logs"),
            state_dir,
        }
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.log_dir, &self.state_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating application directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme: ThemeName,
    pub api: ApiOptions,
    pub ui: UiOptions,
    pub query: QueryOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::Dark,
            api: ApiOptions::default(),
            ui: UiOptions::default(),
            query: QueryOptions::default(),
        }
    }
}

impl AppConfig {
    fn post_load(&mut self) {
        if self.query.cache_capacity == 0 {
            tracing::warn!("query.cache_capacity must be at least 1, using 1");
            self.query.cache_capacity = 1;
        }
        let trimmed = self.api.base_url.trim_end_matches('/').to_string();
        self.api.base_url = trimmed;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiOptions {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 15,
            user_agent: format!("recipe-tui/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiOptions {
    /// Terminals narrower than this many columns show the tag sidebar as an overlay.
    pub sidebar_breakpoint: u16,
    pub toast_seconds: u64,
    pub tick_ms: u64,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            sidebar_breakpoint: 100,
            toast_seconds: 4,
            tick_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    pub cache_capacity: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { cache_capacity: 32 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, EnumString, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
    HighContrast,
    Solarized,
}
