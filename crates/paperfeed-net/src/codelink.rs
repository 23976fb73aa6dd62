//! Code-link lookup against the paperswithcode arXiv index.

use paperfeed_core::reconcile::CodeLinkResolver;
use serde_json::Value;

use crate::client::{HttpClient, NetError};

pub const PAPERS_WITH_CODE_URL: &str = "https://arxiv.paperswithcode.com/api/v0/papers/";

/// Keyed lookup: paper id in, optional official repository URL out.
#[derive(Debug)]
pub struct PapersWithCode<'a> {
    client: &'a HttpClient,
}

impl<'a> PapersWithCode<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Repository URL from the `official` field of the keyed record, if
    /// the service knows one.
    pub fn official_repo(&self, paper_id: &str) -> Result<Option<String>, NetError> {
        let url = format!("{PAPERS_WITH_CODE_URL}{paper_id}");
        let value = self.client.get_json_with_retries(&url)?;
        Ok(official_url(&value))
    }
}

impl CodeLinkResolver for PapersWithCode<'_> {
    fn resolve(&self, paper_id: &str) -> Result<Option<String>, String> {
        self.official_repo(paper_id).map_err(|err| err.to_string())
    }
}

fn official_url(value: &Value) -> Option<String> {
    value.get("official")?.get("url")?.as_str().map(str::to_string)
}
