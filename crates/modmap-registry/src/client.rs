//! HTTP registry client.

use async_trait::async_trait;
use modmap_core::{Candidate, RegistryClient, RegistryError};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;

/// Applications requested per page.
pub const PAGE_SIZE: usize = 100;

/// Hard ceiling on pages fetched by one listing.
pub const MAX_PAGES: usize = 1_000;

const MAX_ERROR_BODY: usize = 500;

/// Candidates decoded from one response page.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Page {
    pub candidates: Vec<Candidate>,
    /// Records on the page, including ones skipped as incomplete.
    pub records: usize,
    /// Total reported by the server, when present.
    pub total: Option<usize>,
}

fn field_str(app: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match app.get(*k) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Decode one application record. Records without an id or a name are dropped.
pub fn parse_candidate(app: &Value) -> Option<Candidate> {
    let app = app.as_object()?;
    let id = field_str(app, &["app_id", "application_id", "id"])?;
    let name = ["name", "application_name"].iter().find_map(|k| {
        app.get(*k)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })?;
    let language = app
        .get("language")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(Candidate { id, name, language })
}

/// Decode a response body: `{"applications": [...], "count": n}`, a bare
/// array, or a single application object.
pub fn parse_page(body: &Value) -> Page {
    let (records, total): (Vec<&Value>, Option<usize>) = match body {
        Value::Array(items) => (items.iter().collect(), None),
        Value::Object(obj) => match obj.get("applications") {
            Some(Value::Array(items)) => (
                items.iter().collect(),
                obj.get("count").and_then(Value::as_u64).map(|c| c as usize),
            ),
            _ => (vec![body], None),
        },
        _ => (Vec::new(), None),
    };
    Page {
        candidates: records.iter().filter_map(|r| parse_candidate(r)).collect(),
        records: records.len(),
        total,
    }
}

/// Registry client over the organisation's application filter endpoint.
pub struct HttpRegistry {
    config: RegistryConfig,
    http: reqwest::Client,
    page_size: usize,
}

impl HttpRegistry {
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("modmap-registry/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            http,
            page_size: PAGE_SIZE,
        })
    }

    pub fn from_env() -> Result<Self, RegistryError> {
        Self::new(RegistryConfig::from_env()?)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    async fn fetch_page(&self, filter: &str, offset: usize) -> Result<Page, RegistryError> {
        let url = format!("{}/applications/filter", self.config.api_root());
        debug!(%url, offset, filter, "requesting application page");

        let response = self
            .http
            .post(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("limit", self.page_size.to_string()),
                ("expand", "skip_links".to_string()),
            ])
            .header("API-Key", &self.config.api_key)
            .header("Authorization", self.config.authorization())
            .header("Accept", "application/json")
            .json(&json!({ "quickFilter": "ALL", "filterText": filter }))
            .send()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Http {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RegistryError::Decode(e.to_string()))?;
        Ok(parse_page(&body))
    }
}

#[async_trait]
impl RegistryClient for HttpRegistry {
    async fn list_candidates(&self) -> Result<Vec<Candidate>, RegistryError> {
        let mut all = Vec::new();
        let mut offset = 0;
        let mut previous: Vec<String> = Vec::new();
        for page_no in 0..MAX_PAGES {
            let page = self.fetch_page("", offset).await?;
            if page.records == 0 {
                break;
            }
            let ids: Vec<String> = page.candidates.iter().map(|c| c.id.clone()).collect();
            if !ids.is_empty() && ids == previous {
                warn!(offset, "registry repeated the previous page, stopping");
                break;
            }
            offset += page.records;
            all.extend(page.candidates);
            let reached_total = page.total.is_some_and(|total| offset >= total);
            if reached_total || page.records < self.page_size {
                break;
            }
            if page_no + 1 == MAX_PAGES {
                warn!(pages = MAX_PAGES, "registry listing hit the page ceiling");
            }
            previous = ids;
        }
        info!(count = all.len(), "fetched registry applications");
        Ok(all)
    }

    async fn search(&self, filter: &str) -> Result<Vec<Candidate>, RegistryError> {
        Ok(self.fetch_page(filter, 0).await?.candidates)
    }
}
