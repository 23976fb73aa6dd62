//! GitHub repository search, the collector's fallback code-link source.

use serde_json::Value;

use crate::client::{HttpClient, NetError};

pub const GITHUB_SEARCH_URL: &str = "https://api.github.com/search/repositories";

/// Most-starred repository matching the free-text `query`, if any.
pub fn search_repository(client: &HttpClient, query: &str) -> Result<Option<String>, NetError> {
    let params = [("q", query), ("sort", "stars"), ("order", "desc")];
    let resp = client.get_with_retries(GITHUB_SEARCH_URL, &params)?;
    let value: Value = resp.json().map_err(|err| NetError::Malformed {
        url: GITHUB_SEARCH_URL.to_string(),
        detail: err.to_string(),
    })?;
    Ok(first_repo_url(&value))
}

fn first_repo_url(value: &Value) -> Option<String> {
    if value.get("total_count")?.as_u64()? == 0 {
        return None;
    }
    value
        .get("items")?
        .get(0)?
        .get("html_url")?
        .as_str()
        .map(str::to_string)
}
