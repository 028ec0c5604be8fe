//! Application configuration for contentgate.
//!
//! User config lives at `~/.contentgate/contentgate.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ContentGateError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "contentgate.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".contentgate";

/// Desktop browser user agent sent to target sites.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching contentgate.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fetch strategy settings.
    #[serde(default)]
    pub extractor: ExtractorSection,

    /// Quality rubric inputs.
    #[serde(default)]
    pub quality: QualityConfig,
}

/// `[extractor]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorSection {
    /// Default batch worker width.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Base URL of the remote render/extraction service.
    #[serde(default = "default_render_endpoint")]
    pub render_endpoint: String,

    /// Name of the env var holding the render-service key (never store the key itself).
    #[serde(default = "default_render_api_key_env")]
    pub render_api_key_env: String,

    /// Timeout for the remote-render tier.
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout_secs: u64,

    /// Timeout for the direct structured-fetch tier.
    #[serde(default = "default_direct_timeout")]
    pub direct_timeout_secs: u64,

    /// Timeout for the aggressive fallback tier.
    #[serde(default = "default_fallback_timeout")]
    pub fallback_timeout_secs: u64,

    /// User-Agent header for every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header for every request.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for ExtractorSection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            render_endpoint: default_render_endpoint(),
            render_api_key_env: default_render_api_key_env(),
            remote_timeout_secs: default_remote_timeout(),
            direct_timeout_secs: default_direct_timeout(),
            fallback_timeout_secs: default_fallback_timeout(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

fn default_concurrency() -> usize {
    5
}
fn default_render_endpoint() -> String {
    "https://r.jina.ai".into()
}
fn default_render_api_key_env() -> String {
    "JINA_API_KEY".into()
}
fn default_remote_timeout() -> u64 {
    30
}
fn default_direct_timeout() -> u64 {
    20
}
fn default_fallback_timeout() -> u64 {
    15
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_accept_language() -> String {
    "pt-BR,pt;q=0.9,en;q=0.8".into()
}

/// `[quality]` section. Used directly at runtime by the validator.
///
/// Score thresholds live in the rubric tables; this only carries the
/// inputs that vary by deployment (domain lists, keywords, validity gate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Minimum character count for a report to be `valid`.
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Minimum total score for a report to be `valid`.
    #[serde(default = "default_min_valid_score")]
    pub min_valid_score: u32,

    /// Official/government/education/nonprofit domain fragments.
    #[serde(default = "default_trusted_domains")]
    pub trusted_domains: Vec<String>,

    /// Known journalistic domain fragments.
    #[serde(default = "default_news_domains")]
    pub news_domains: Vec<String>,

    /// Generic national-TLD suffix.
    #[serde(default = "default_national_suffix")]
    pub national_suffix: String,

    /// Topical relevance keywords, matched against lowercased text.
    #[serde(default = "default_relevance_keywords")]
    pub relevance_keywords: Vec<String>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_content_length: default_min_content_length(),
            min_valid_score: default_min_valid_score(),
            trusted_domains: default_trusted_domains(),
            news_domains: default_news_domains(),
            national_suffix: default_national_suffix(),
            relevance_keywords: default_relevance_keywords(),
        }
    }
}

fn default_min_content_length() -> usize {
    100
}
fn default_min_valid_score() -> u32 {
    30
}
fn default_trusted_domains() -> Vec<String> {
    ["gov.br", "edu.br", "org.br", "ibge.gov.br", "sebrae.com.br"]
        .map(String::from)
        .to_vec()
}
fn default_news_domains() -> Vec<String> {
    ["g1.globo.com", "exame.com", "valor.globo.com", "estadao.com.br"]
        .map(String::from)
        .to_vec()
}
fn default_national_suffix() -> String {
    ".com.br".into()
}
fn default_relevance_keywords() -> Vec<String> {
    [
        "mercado",
        "negócio",
        "empresa",
        "crescimento",
        "oportunidade",
        "tendência",
        "análise",
        "dados",
        "pesquisa",
        "estudo",
        "market",
        "business",
        "growth",
        "opportunity",
        "trend",
        "analysis",
        "data",
        "research",
        "study",
    ]
    .map(String::from)
    .to_vec()
}

// ---------------------------------------------------------------------------
// Extractor config (runtime, merged from config + env + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime extractor configuration — config file values with the render key resolved.
#[derive(Clone)]
pub struct ExtractorConfig {
    /// Default batch worker width.
    pub concurrency: usize,
    /// Base URL of the remote render/extraction service.
    pub render_endpoint: String,
    /// Render-service bearer key; `None` disables the remote-render tier.
    pub render_api_key: Option<String>,
    /// Timeout for the remote-render tier.
    pub remote_timeout: Duration,
    /// Timeout for the direct structured-fetch tier.
    pub direct_timeout: Duration,
    /// Timeout for the aggressive fallback tier.
    pub fallback_timeout: Duration,
    /// User-Agent header.
    pub user_agent: String,
    /// Accept-Language header.
    pub accept_language: String,
}

impl ExtractorConfig {
    /// Whether the remote-render tier will be attempted.
    pub fn remote_render_enabled(&self) -> bool {
        self.render_api_key.is_some()
    }

    /// Build a runtime config from a file section and an explicit key.
    pub fn from_section(section: &ExtractorSection, render_api_key: Option<String>) -> Self {
        Self {
            concurrency: section.concurrency.max(1),
            render_endpoint: section.render_endpoint.clone(),
            render_api_key: render_api_key.filter(|k| !k.is_empty()),
            remote_timeout: Duration::from_secs(section.remote_timeout_secs),
            direct_timeout: Duration::from_secs(section.direct_timeout_secs),
            fallback_timeout: Duration::from_secs(section.fallback_timeout_secs),
            user_agent: section.user_agent.clone(),
            accept_language: section.accept_language.clone(),
        }
    }

    /// Check that the render endpoint is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let endpoint = url::Url::parse(&self.render_endpoint).map_err(|e| {
            ContentGateError::config(format!(
                "render_endpoint '{}' is not a valid URL: {e}",
                self.render_endpoint
            ))
        })?;
        match endpoint.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ContentGateError::config(format!(
                "render_endpoint must use http or https, got '{other}'"
            ))),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::from_section(&ExtractorSection::default(), None)
    }
}

impl From<&AppConfig> for ExtractorConfig {
    fn from(config: &AppConfig) -> Self {
        let key = std::env::var(&config.extractor.render_api_key_env).ok();
        Self::from_section(&config.extractor, key)
    }
}

// The key must never reach logs.
impl std::fmt::Debug for ExtractorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorConfig")
            .field("concurrency", &self.concurrency)
            .field("render_endpoint", &self.render_endpoint)
            .field(
                "render_api_key",
                &self.render_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("remote_timeout", &self.remote_timeout)
            .field("direct_timeout", &self.direct_timeout)
            .field("fallback_timeout", &self.fallback_timeout)
            .field("user_agent", &self.user_agent)
            .field("accept_language", &self.accept_language)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.contentgate/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ContentGateError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.contentgate/contentgate.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| ContentGateError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ContentGateError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ContentGateError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ContentGateError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ContentGateError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("render_endpoint"));
        assert!(toml_str.contains("JINA_API_KEY"));
        assert!(toml_str.contains("relevance_keywords"));
    }

    #[test]
    fn default_keywords_cover_both_languages() {
        let keywords = QualityConfig::default().relevance_keywords;
        for term in [
            "mercado", "negócio", "crescimento", "oportunidade", "tendência", "análise", "dados",
            "pesquisa", "estudo", "market", "business", "growth", "opportunity", "trend",
            "analysis", "data", "research", "study",
        ] {
            assert!(keywords.iter().any(|k| k == term), "missing keyword {term}");
        }
    }

    #[test]
    fn partial_file_fills_defaults() {
        let toml_str = r#"
[extractor]
concurrency = 8

[quality]
trusted_domains = ["gov.uk"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.extractor.concurrency, 8);
        assert_eq!(config.extractor.direct_timeout_secs, 20);
        assert_eq!(config.quality.trusted_domains, vec!["gov.uk".to_string()]);
        assert_eq!(config.quality.min_content_length, 100);
        assert_eq!(config.quality.national_suffix, ".com.br");
    }

    #[test]
    fn extractor_config_from_section() {
        let section = ExtractorSection::default();
        let config = ExtractorConfig::from_section(&section, Some("secret".into()));
        assert!(config.remote_render_enabled());
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.remote_timeout, Duration::from_secs(30));
        assert_eq!(config.direct_timeout, Duration::from_secs(20));
        assert_eq!(config.fallback_timeout, Duration::from_secs(15));
    }

    #[test]
    fn empty_key_disables_remote_render() {
        let config = ExtractorConfig::from_section(&ExtractorSection::default(), Some(String::new()));
        assert!(!config.remote_render_enabled());
    }

    #[test]
    fn unset_env_var_disables_remote_render() {
        let mut app = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        app.extractor.render_api_key_env = "CG_TEST_NONEXISTENT_KEY_12345".into();
        let config = ExtractorConfig::from(&app);
        assert!(!config.remote_render_enabled());
    }

    #[test]
    fn debug_redacts_key() {
        let config =
            ExtractorConfig::from_section(&ExtractorSection::default(), Some("hunter2".into()));
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn validate_rejects_bad_endpoint() {
        let mut config = ExtractorConfig::default();
        assert!(config.validate().is_ok());

        config.render_endpoint = "ftp://render.example".into();
        assert!(config.validate().is_err());

        config.render_endpoint = "not a url".into();
        assert!(config.validate().is_err());
    }
}
