//! Serialized paper row codec.
//!
//! A stored row is one pipe-delimited Markdown table line:
//!
//! ```text
//! |<date>|<title_cell>|<author_cell>|[<id>](<abs_url>)|<code_cell>|\n
//! ```
//!
//! where `title_cell` is `**title**` (optionally followed by
//! `<br><br>summary`), `author_cell` is `first_author et.al.`, and
//! `code_cell` is either `**[link](repo_url)**` or the literal token
//! `null`. Rows are parsed by fixed field position, so title text must not
//! contain a raw `|` (callers sanitize upstream).

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

/// Literal code-cell token meaning "no repository link known yet".
pub const NULL_TOKEN: &str = "null";

/// Sentinel substring marking a row whose code link is still missing.
pub const NULL_SENTINEL: &str = "|null|";

/// Minimum number of `|`-delimited segments a well-formed row splits into
/// (leading/trailing empty segments included).
pub const MIN_SEGMENTS: usize = 6;

#[derive(Debug, Error)]
pub enum RowError {
    #[error("malformed row: expected at least {MIN_SEGMENTS} pipe-delimited segments, got {segments}")]
    Malformed { segments: usize },
}

/// One collected paper, before serialization. The id is already
/// version-stripped by the producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRecord {
    pub published: NaiveDate,
    pub title: String,
    pub first_author: String,
    pub id: String,
    pub abs_url: String,
    pub repo_url: Option<String>,
    pub summary: Option<String>,
}

impl PaperRecord {
    fn title_cell(&self) -> String {
        match &self.summary {
            Some(summary) => format!("**{}**<br><br>{}", self.title, summary),
            None => format!("**{}**", self.title),
        }
    }

    fn code_cell(&self) -> String {
        match &self.repo_url {
            Some(url) => format!("**[link]({url})**"),
            None => NULL_TOKEN.to_string(),
        }
    }

    /// Serialize to the pipe-delimited table row, newline-terminated.
    pub fn encode(&self) -> String {
        format!(
            "|{}|{}|{} et.al.|[{}]({})|{}|\n",
            self.published,
            self.title_cell(),
            self.first_author,
            self.id,
            self.abs_url,
            self.code_cell(),
        )
    }

    /// Serialize to the bullet-list flavor used by the messaging digest,
    /// newline-terminated.
    pub fn web_digest_line(&self) -> String {
        let mut line = format!(
            "- {}, **{}**, {} et.al., Paper: [{}]({})",
            self.published, self.title, self.first_author, self.abs_url, self.abs_url,
        );
        if let Some(url) = &self.repo_url {
            line.push_str(&format!(", Code: **[{url}]({url})**"));
        }
        line.push('\n');
        line
    }
}

/// The five logical cells of a decoded row, in field order. The id cell is
/// normalized (version suffix stripped) during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFields {
    pub date: String,
    pub title: String,
    pub authors: String,
    pub id_cell: String,
    pub code_cell: String,
}

impl RowFields {
    /// Re-serialize the cells into a row. `decode` followed by `to_row`
    /// normalizes a row and is the identity on already-normalized input.
    pub fn to_row(&self) -> String {
        format!(
            "|{}|{}|{}|{}|{}|\n",
            self.date, self.title, self.authors, self.id_cell, self.code_cell,
        )
    }
}

/// Parse a serialized row into its five cells by fixed position.
pub fn decode(row: &str) -> Result<RowFields, RowError> {
    let parts: Vec<&str> = row.split('|').collect();
    if parts.len() < MIN_SEGMENTS {
        return Err(RowError::Malformed {
            segments: parts.len(),
        });
    }
    Ok(RowFields {
        date: parts[1].trim().to_string(),
        title: parts[2].trim().to_string(),
        authors: parts[3].trim().to_string(),
        id_cell: strip_version(parts[4].trim()),
        code_cell: parts[5].trim().to_string(),
    })
}

fn version_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"v\d+").ok()).as_ref()
}

/// Remove every `v<digits>` run from a cell, e.g. `2108.09112v1` ->
/// `2108.09112`.
pub fn strip_version(cell: &str) -> String {
    match version_re() {
        Some(re) => re.replace_all(cell, "").into_owned(),
        None => cell.to_string(),
    }
}
