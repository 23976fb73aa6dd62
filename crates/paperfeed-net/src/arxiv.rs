//! arXiv literature search over the Atom API.

use chrono::NaiveDate;
use feed_rs::model::{Entry, Feed};
use log::warn;

use crate::client::{HttpClient, NetError};

pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";
pub const ARXIV_BASE_URL: &str = "http://arxiv.org/";

/// One search result, reduced to the fields the collector needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArxivEntry {
    /// Short id as published, possibly version-suffixed (`2508.17739v1`).
    pub short_id: String,
    pub title: String,
    pub first_author: String,
    pub published: Option<NaiveDate>,
}

impl ArxivEntry {
    /// Version-stripped stable paper key: `2508.17739v1` -> `2508.17739`.
    pub fn key(&self) -> String {
        match self.short_id.find('v') {
            Some(pos) => self.short_id[..pos].to_string(),
            None => self.short_id.clone(),
        }
    }

    /// Abstract page URL for the version-stripped key.
    pub fn abs_url(&self) -> String {
        format!("{ARXIV_BASE_URL}abs/{}", self.key())
    }
}

/// Query the Atom API, newest submissions first.
pub fn search(
    client: &HttpClient,
    query: &str,
    max_results: u32,
) -> Result<Vec<ArxivEntry>, NetError> {
    let max = max_results.to_string();
    let params = [
        ("search_query", query),
        ("start", "0"),
        ("max_results", max.as_str()),
        ("sortBy", "submittedDate"),
        ("sortOrder", "descending"),
    ];
    let resp = client.get_with_retries(ARXIV_API_URL, &params)?;
    let bytes = resp.bytes().map_err(NetError::Transport)?;
    let feed = feed_rs::parser::parse(bytes.as_ref()).map_err(|err| NetError::Malformed {
        url: ARXIV_API_URL.to_string(),
        detail: err.to_string(),
    })?;
    if feed.entries.is_empty() {
        warn!("arxiv returned an empty page for query {query:?}");
    }
    Ok(entries_from_feed(feed))
}

fn entries_from_feed(feed: Feed) -> Vec<ArxivEntry> {
    feed.entries.into_iter().filter_map(entry_to_paper).collect()
}

fn entry_to_paper(entry: Entry) -> Option<ArxivEntry> {
    let short_id = short_id_from_entry_id(&entry.id)?;
    let title = normalize_ws(&entry.title.map(|t| t.content).unwrap_or_default());
    let first_author = entry
        .authors
        .first()
        .map(|person| person.name.clone())
        .unwrap_or_default();
    Some(ArxivEntry {
        short_id,
        title,
        first_author,
        published: entry.published.map(|dt| dt.date_naive()),
    })
}

/// Extract the short id from an Atom entry id such as
/// `http://arxiv.org/abs/2508.17739v1`.
fn short_id_from_entry_id(entry_id: &str) -> Option<String> {
    let pos = entry_id.rfind("/abs/")?;
    let tail = entry_id[pos + "/abs/".len()..].trim_matches('/').trim();
    (!tail.is_empty()).then(|| tail.to_string())
}

/// Atom titles may wrap across lines; collapse runs of whitespace.
fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
