use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://pathofexile.gamepedia.com/api.php";
pub const DEFAULT_USER_AGENT: &str = "poescrape/0.1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CONFIG_FILENAME: &str = "poescrape.toml";
pub const WIKI_MAIN_PAGE: &str = "Path_of_Exile_Wiki";

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ScrapeConfig {
    #[serde(default)]
    pub wiki: WikiSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub uniques: UniquesSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct WikiSection {
    pub api_url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct OutputSection {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct UniquesSection {
    /// JSON file replacing the embedded style variant table.
    pub style_variants: Option<PathBuf>,
}

impl ScrapeConfig {
    /// Resolve the wiki API URL: env WIKI_API_URL > config > DEFAULT_API_URL.
    pub fn api_url(&self) -> String {
        env_override("WIKI_API_URL")
            .or_else(|| self.wiki.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Resolve user agent: env WIKI_USER_AGENT > config > DEFAULT_USER_AGENT.
    pub fn user_agent(&self) -> String {
        env_override("WIKI_USER_AGENT")
            .or_else(|| self.wiki.user_agent.clone())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    pub fn timeout_ms(&self) -> u64 {
        env_override("WIKI_HTTP_TIMEOUT_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .or(self.wiki.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    /// Human facing page the data came from, for the output file header.
    pub fn source_url(&self) -> String {
        let api_url = self.api_url();
        match derive_wiki_url(&api_url) {
            Some(base) => format!("{base}/{WIKI_MAIN_PAGE}"),
            None => api_url,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn style_variants_path(&self) -> Option<&Path> {
        self.uniques.style_variants.as_deref()
    }

    /// Paths in a config file are relative to the file, not the working directory.
    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [&mut self.output.dir, &mut self.uniques.style_variants]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Load and parse a ScrapeConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<ScrapeConfig> {
    if !config_path.exists() {
        return Ok(ScrapeConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let mut parsed: ScrapeConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    parsed.resolve_relative_to(config_path.parent().unwrap_or(Path::new(".")));
    Ok(parsed)
}

/// Derive wiki base URL from an API URL by stripping `/api.php` or `/w/api.php`.
pub fn derive_wiki_url(api_url: &str) -> Option<String> {
    let trimmed = api_url.trim();
    let stripped = trimmed
        .strip_suffix("/w/api.php")
        .or_else(|| trimmed.strip_suffix("/api.php"))?;
    let result = stripped.trim_end_matches('/').to_string();
    if result.is_empty() {
        None
    } else {
        Some(result)
    }
}

fn env_override(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_has_no_overrides() {
        let config = ScrapeConfig::default();
        assert!(config.wiki.api_url.is_none());
        assert!(config.output.dir.is_none());
        assert!(config.style_variants_path().is_none());
    }

    #[test]
    fn load_config_returns_default_for_missing_file() {
        let config = load_config(Path::new("/nonexistent/poescrape.toml")).expect("load config");
        assert_eq!(config, ScrapeConfig::default());
    }

    #[test]
    fn load_config_parses_sections_and_resolves_paths() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("poescrape.toml");
        fs::write(
            &config_path,
            r#"
[wiki]
api_url = "https://poewiki.example/w/api.php"
user_agent = "test-agent/1.0"
timeout_ms = 5000

[output]
dir = "out"

[uniques]
style_variants = "/abs/variants.json"
"#,
        )
        .expect("write config");

        let config = load_config(&config_path).expect("load config");
        assert_eq!(
            config.wiki.api_url.as_deref(),
            Some("https://poewiki.example/w/api.php")
        );
        assert_eq!(config.wiki.user_agent.as_deref(), Some("test-agent/1.0"));
        assert_eq!(config.wiki.timeout_ms, Some(5000));
        assert_eq!(config.output.dir, Some(temp.path().join("out")));
        assert_eq!(
            config.style_variants_path(),
            Some(Path::new("/abs/variants.json"))
        );
    }

    #[test]
    fn load_config_returns_error_for_invalid_toml() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("poescrape.toml");
        fs::write(&config_path, "[wiki\napi_url = \"oops\"").expect("write config");
        let error = load_config(&config_path).expect_err("must fail");
        assert!(error.to_string().contains("failed to parse"));
    }

    #[test]
    fn derive_wiki_url_strips_api_php() {
        assert_eq!(
            derive_wiki_url("https://pathofexile.gamepedia.com/api.php"),
            Some("https://pathofexile.gamepedia.com".to_string())
        );
        assert_eq!(
            derive_wiki_url("https://poewiki.example/w/api.php"),
            Some("https://poewiki.example".to_string())
        );
        assert_eq!(derive_wiki_url("https://poewiki.example/query"), None);
    }

    #[test]
    fn output_dir_defaults_to_working_directory() {
        assert_eq!(ScrapeConfig::default().output_dir(), PathBuf::from("."));
    }
}
