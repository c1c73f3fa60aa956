//! Application configuration for blogdraft.
//!
//! User config lives at `~/.blogdraft/blogdraft.toml`.
//! Secrets never live in the file: it only names the environment variables
//! that hold them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BlogDraftError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "blogdraft.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".blogdraft";

// ---------------------------------------------------------------------------
// Config structs (matching blogdraft.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Notion row store settings.
    #[serde(default)]
    pub notion: NotionConfig,

    /// Chat-completion provider settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Pipeline pacing and chunking.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Blog search scraper settings.
    #[serde(default)]
    pub search: SearchConfig,
}

/// `[notion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Name of the env var holding the integration token.
    #[serde(default = "default_notion_key_env")]
    pub api_key_env: String,

    /// Name of the env var holding the database id.
    #[serde(default = "default_database_id_env")]
    pub database_id_env: String,

    /// API root, overridable for tests.
    #[serde(default = "default_notion_base_url")]
    pub base_url: String,

    /// Column names in the database.
    #[serde(default)]
    pub columns: ColumnsConfig,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_notion_key_env(),
            database_id_env: default_database_id_env(),
            base_url: default_notion_base_url(),
            columns: ColumnsConfig::default(),
        }
    }
}

fn default_notion_key_env() -> String {
    "NOTION_KEY".into()
}
fn default_database_id_env() -> String {
    "NOTION_DB_ID".into()
}
fn default_notion_base_url() -> String {
    "https://api.notion.com/v1".into()
}

/// `[notion.columns]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    /// Title column holding the restaurant name.
    pub title: String,
    pub menu: String,
    pub visit_time: String,
    pub location: String,
    pub category: String,
    pub hours: String,
    pub break_time: String,
    pub holiday: String,
    /// Multi-select column with the keywords the post must contain.
    pub keywords: String,
    /// Checkbox column marking a row as written.
    pub written: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            title: "음식점 이름".into(),
            menu: "메뉴".into(),
            visit_time: "방문시간".into(),
            location: "가게 위치".into(),
            category: "카테고리".into(),
            hours: "영업시간".into(),
            break_time: "브레이크타임".into(),
            holiday: "휴무정보".into(),
            keywords: "키워드".into(),
            written: "작성됨".into(),
        }
    }
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key.
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,

    /// Model used for drafting.
    #[serde(default = "default_model")]
    pub model: String,

    /// API root of any chat-completions compatible endpoint.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_openai_key_env(),
            model: default_model(),
            base_url: default_openai_base_url(),
        }
    }
}

fn default_openai_key_env() -> String {
    "OPENAI_KEY".into()
}
fn default_model() -> String {
    "gpt-4".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pause between a successful generation and the write-back, in ms.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Maximum characters per appended paragraph block.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl PipelineConfig {
    /// The configured inter-request delay.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

fn default_delay_ms() -> u64 {
    1000
}
fn default_chunk_size() -> usize {
    2000
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search results page; the query is appended as URL parameters.
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
        }
    }
}

fn default_search_base_url() -> String {
    "https://search.naver.com/search.naver".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.blogdraft/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BlogDraftError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.blogdraft/blogdraft.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BlogDraftError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| BlogDraftError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    init_config_at(&path)?;
    Ok(path)
}

/// Write a default config file to `path`, replacing whatever is there.
pub fn init_config_at(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| BlogDraftError::io(dir, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BlogDraftError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| BlogDraftError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}

/// Read a secret from the named environment variable.
///
/// Surrounding whitespace is stripped. Fails when the variable is unset or
/// blank.
pub fn resolve_secret(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
        _ => Err(BlogDraftError::config(format!(
            "{var_name} is not set. Export it or point the config at another variable."
        ))),
    }
}
