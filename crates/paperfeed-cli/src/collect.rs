//! Per-topic collection: literature search plus per-paper enrichment.

use std::path::PathBuf;

use chrono::NaiveDate;
use log::{info, warn};
use paperfeed_core::row::PaperRecord;
use paperfeed_core::store::TopicBatch;
use paperfeed_net::arxiv::{self, ArxivEntry};
use paperfeed_net::codelink::PapersWithCode;
use paperfeed_net::github;
use paperfeed_net::pdf;
use paperfeed_net::summarize::Summarizer;
use paperfeed_net::HttpClient;

/// Rows and digest lines collected for one topic.
#[derive(Debug, Default)]
pub struct CollectedTopic {
    pub table: TopicBatch,
    pub digest: TopicBatch,
}

pub struct Collector<'a> {
    client: &'a HttpClient,
    summarizer: Option<Summarizer<'a>>,
    pdf_dir: PathBuf,
}

impl<'a> Collector<'a> {
    pub fn new(client: &'a HttpClient, summarize_pdfs: bool, pdf_dir: PathBuf) -> Self {
        let summarizer = if summarize_pdfs {
            Summarizer::from_env(client)
        } else {
            None
        };
        Self {
            client,
            summarizer,
            pdf_dir,
        }
    }

    /// Search one topic and build its batches from papers published
    /// `today`. Results arrive newest first, so the scan stops at the
    /// first older entry. Enrichment failures degrade to missing fields
    /// for that paper and never abort the topic.
    pub fn collect_topic(
        &self,
        topic: &str,
        query: &str,
        max_results: u32,
        today: NaiveDate,
    ) -> CollectedTopic {
        let mut collected = CollectedTopic {
            table: TopicBatch {
                topic: topic.to_string(),
                ..Default::default()
            },
            digest: TopicBatch {
                topic: topic.to_string(),
                ..Default::default()
            },
        };
        let entries = match arxiv::search(self.client, query, max_results) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("arxiv search failed for topic {topic}: {err}");
                return collected;
            }
        };
        for entry in entries {
            let Some(published) = entry.published else {
                continue;
            };
            if published != today {
                break;
            }
            info!(
                "time = {published} title = {} author = {}",
                entry.title, entry.first_author
            );
            let record = self.build_record(&entry, published);
            collected
                .table
                .papers
                .insert(record.id.clone(), record.encode());
            collected
                .digest
                .papers
                .insert(record.id.clone(), record.web_digest_line());
        }
        collected
    }

    fn build_record(&self, entry: &ArxivEntry, published: NaiveDate) -> PaperRecord {
        let key = entry.key();
        let summary = self.summarize(&key);
        let repo_url = self.find_code_link(&key, &entry.title);
        PaperRecord {
            published,
            title: escape_pipes(&entry.title),
            first_author: escape_pipes(&entry.first_author),
            abs_url: entry.abs_url(),
            id: key,
            repo_url,
            summary: summary.map(|text| escape_pipes(&text)),
        }
    }

    fn summarize(&self, paper_key: &str) -> Option<String> {
        let summarizer = self.summarizer.as_ref()?;
        let pdf_path = match pdf::download_pdf(self.client, paper_key, &self.pdf_dir) {
            Ok(path) => path,
            Err(err) => {
                warn!("pdf download failed for {paper_key}: {err}");
                return None;
            }
        };
        match summarizer.summarize_pdf(&pdf_path) {
            Ok(summary) => Some(summary),
            Err(err) => {
                warn!("summarization failed for {paper_key}: {err}");
                None
            }
        }
    }

    /// paperswithcode first; GitHub repository search as fallback, by
    /// title and then by id.
    fn find_code_link(&self, paper_key: &str, title: &str) -> Option<String> {
        match PapersWithCode::new(self.client).official_repo(paper_key) {
            Ok(Some(url)) => return Some(url),
            Ok(None) => {}
            Err(err) => warn!("code link lookup failed for {paper_key}: {err}"),
        }
        for query in [title, paper_key] {
            match github::search_repository(self.client, query) {
                Ok(Some(url)) => return Some(url),
                Ok(None) => {}
                Err(err) => warn!("github search failed for {query:?}: {err}"),
            }
        }
        None
    }
}

/// Rows are split on raw pipes, so swap any pipe in free text for the
/// HTML entity before it can reach a cell.
fn escape_pipes(text: &str) -> String {
    text.replace('|', "&#124;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipes_in_free_text_are_replaced_with_entity() {
        assert_eq!(escape_pipes("a|b"), "a&#124;b");
        assert_eq!(escape_pipes("no pipes"), "no pipes");
    }
}
