use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::info;
use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::ScrapeConfig;

pub const QUERY_LIMIT: usize = 500;

/// The two wiki queries the pipelines need. Payloads are returned untouched so the
/// pipelines own the response shape.
pub trait WikiQueryApi {
    /// Cargo query for every card of `category`.
    fn fetch_card_results(&mut self, category: &str) -> Result<Value>;
    /// Semantic MediaWiki ask query for the unique items of one item class.
    fn fetch_unique_results(&mut self, item_class: &str) -> Result<Value>;
    fn request_count(&self) -> usize;
}

#[derive(Debug, Clone)]
pub struct WikiClientConfig {
    pub api_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl WikiClientConfig {
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self {
            api_url: config.api_url(),
            user_agent: config.user_agent(),
            timeout_ms: config.timeout_ms(),
        }
    }
}

pub struct WikiClient {
    client: Client,
    config: WikiClientConfig,
    request_count: usize,
}

impl WikiClient {
    pub fn new(config: WikiClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("failed to build wiki HTTP client")?;

        Ok(Self {
            client,
            config,
            request_count: 0,
        })
    }

    fn request_json_get(&mut self, params: &[(&str, String)]) -> Result<Value> {
        let base_url = Url::parse(&self.config.api_url)
            .with_context(|| format!("invalid WIKI_API_URL: {}", self.config.api_url))?;

        self.request_count += 1;
        let response = self
            .client
            .get(base_url)
            .header("User-Agent", self.config.user_agent.clone())
            .query(params)
            .send()
            .context("failed to call wiki API")?;

        let status = response.status();
        if !status.is_success() {
            bail!("wiki API request failed with HTTP {status}");
        }

        let payload: Value = response
            .json()
            .context("failed to decode wiki API JSON response")?;
        if let Some(error) = payload.get("error") {
            let code = error
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            let info = error
                .get("info")
                .and_then(Value::as_str)
                .unwrap_or("unknown info");
            bail!("wiki API error [{code}]: {info}");
        }
        Ok(payload)
    }
}

impl WikiQueryApi for WikiClient {
    fn fetch_card_results(&mut self, category: &str) -> Result<Value> {
        info!("Getting data for {category}");
        self.request_json_get(&card_query_params(category))
            .with_context(|| format!("failed to query cards for {category}"))
    }

    fn fetch_unique_results(&mut self, item_class: &str) -> Result<Value> {
        info!("Getting data for {item_class}");
        self.request_json_get(&unique_query_params(item_class))
            .with_context(|| format!("failed to query uniques for {item_class}"))
    }

    fn request_count(&self) -> usize {
        self.request_count
    }
}

pub fn card_query_params(category: &str) -> Vec<(&'static str, String)> {
    vec![
        ("action", "cargoquery".to_string()),
        ("format", "json".to_string()),
        ("formatversion", "1".to_string()),
        ("limit", QUERY_LIMIT.to_string()),
        ("tables", "items".to_string()),
        ("fields", "name,drop_areas_html,drop_text".to_string()),
        ("where", format!("class=\"{category}\"")),
        ("group_by", "items._pageName".to_string()),
    ]
}

pub fn unique_query_params(item_class: &str) -> Vec<(&'static str, String)> {
    vec![
        ("action", "askargs".to_string()),
        ("format", "json".to_string()),
        ("parameters", format!("limit={QUERY_LIMIT}")),
        (
            "conditions",
            format!("Has item class::{item_class}|Has rarity::Unique"),
        ),
        (
            "printouts",
            "Has implicit stat text|Has explicit stat text".to_string(),
        ),
    ]
}
