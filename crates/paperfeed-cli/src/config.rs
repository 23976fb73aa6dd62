//! YAML configuration surface.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

/// Search filters for one topic.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicKeywords {
    pub filters: Vec<String>,
}

/// Full run configuration. Topic order in the YAML mapping is preserved
/// and drives report section order.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub max_results: u32,
    #[serde(default)]
    pub publish_readme: bool,
    #[serde(default)]
    pub publish_gitpage: bool,
    #[serde(default)]
    pub publish_wechat: bool,
    #[serde(default)]
    pub show_badge: bool,
    #[serde(default)]
    pub summarize_pdfs: bool,
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: String,
    pub json_readme_path: String,
    pub md_readme_path: String,
    pub json_gitpage_path: String,
    pub md_gitpage_path: String,
    pub json_wechat_path: String,
    pub md_wechat_path: String,
    pub keywords: IndexMap<String, TopicKeywords>,
}

fn default_pdf_dir() -> String {
    "papers".to_string()
}

impl Config {
    /// Topic -> assembled search query, in configuration order.
    pub fn topic_queries(&self) -> Vec<(String, String)> {
        self.keywords
            .iter()
            .map(|(topic, keywords)| (topic.clone(), build_query(&keywords.filters)))
            .collect()
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("read config {}: {err}", path.display()))?;
    serde_yaml::from_str(&raw).map_err(|err| format!("parse config {}: {err}", path.display()))
}

/// Join filters with ` OR `, wrapping multi-word filters in escaped
/// quotes so the search API treats them as phrases.
pub fn build_query(filters: &[String]) -> String {
    filters
        .iter()
        .map(|filter| {
            if filter.split_whitespace().count() > 1 {
                format!("\"{filter}\"")
            } else {
                filter.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" OR ")
}
