//! Report renderer: deterministic Markdown views over a record store.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::store::RecordStore;

/// GitHub slug used by the shields badge block.
pub const BADGE_REPO: &str = "paperfeed/paperfeed";

/// Per-output rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub to_web: bool,
    pub use_title: bool,
    pub use_toc: bool,
    pub show_badge: bool,
    pub back_to_top: bool,
}

impl RenderOptions {
    /// Preset for the main readme view.
    pub fn readme() -> Self {
        Self {
            to_web: false,
            use_title: true,
            use_toc: true,
            show_badge: true,
            back_to_top: true,
        }
    }

    /// Preset for the website (gitpage) view.
    pub fn gitpage() -> Self {
        Self {
            to_web: true,
            use_title: true,
            use_toc: false,
            show_badge: true,
            back_to_top: false,
        }
    }

    /// Preset for the messaging-app digest view.
    pub fn wechat() -> Self {
        Self {
            to_web: false,
            use_title: false,
            use_toc: true,
            show_badge: true,
            back_to_top: true,
        }
    }
}

/// Render the store into one Markdown document. Output is fully
/// determined by store content, options, and `today`.
pub fn render(store: &RecordStore, opts: &RenderOptions, today: NaiveDate) -> String {
    let date_now = today.to_string().replace('-', ".");
    let mut out = String::new();

    if opts.use_title && opts.to_web {
        out.push_str("---\nlayout: default\n---\n\n");
    }

    if opts.show_badge {
        out.push_str("[![Contributors][contributors-shield]][contributors-url]\n");
        out.push_str("[![Forks][forks-shield]][forks-url]\n");
        out.push_str("[![Stargazers][stars-shield]][stars-url]\n");
        out.push_str("[![Issues][issues-shield]][issues-url]\n\n");
    }

    if opts.use_title {
        out.push_str(&format!("## Updated on {date_now}\n"));
    } else {
        out.push_str(&format!("> Updated on {date_now}\n"));
    }
    out.push_str("> Usage instructions: [here](./docs/README.md#usage)\n\n");

    if opts.use_toc {
        out.push_str("<details>\n  <summary>Table of Contents</summary>\n  <ol>\n");
        for (topic, papers) in &store.topics {
            if papers.is_empty() {
                continue;
            }
            let anchor = topic.replace(' ', "-").to_lowercase();
            out.push_str(&format!("    <li><a href=#{anchor}>{topic}</a></li>\n"));
        }
        out.push_str("  </ol>\n</details>\n\n");
    }

    for (topic, papers) in &store.topics {
        if papers.is_empty() {
            continue;
        }
        out.push_str(&format!("## {topic}\n\n"));

        if opts.use_title {
            if opts.to_web {
                out.push_str("| Publish Date | Title | Authors | PDF | Code |\n");
                out.push_str("|:---------|:-----------------------|:---------|:------|:------|\n");
            } else {
                out.push_str("|Publish Date|Title|Authors|PDF|Code|\n");
                out.push_str("|---|---|---|---|---|\n");
            }
        }

        // Ids sort lexicographically descending, approximating reverse
        // chronological order for this id scheme.
        let mut ids: Vec<&String> = papers.keys().collect();
        ids.sort_by(|a, b| b.cmp(a));
        for id in ids {
            if let Some(row) = papers.get(id) {
                out.push_str(&pretty_math(row));
            }
        }
        out.push('\n');

        if opts.back_to_top {
            let anchor = format!("#Updated on {date_now}")
                .replace(' ', "-")
                .replace('.', "")
                .to_lowercase();
            out.push_str(&format!(
                "<p align=right>(<a href={anchor}>back to top</a>)</p>\n\n"
            ));
        }
    }

    if opts.show_badge {
        out.push_str(&format!(
            "[contributors-shield]: https://img.shields.io/github/contributors/{BADGE_REPO}.svg?style=for-the-badge\n"
        ));
        out.push_str(&format!(
            "[contributors-url]: https://github.com/{BADGE_REPO}/graphs/contributors\n"
        ));
        out.push_str(&format!(
            "[forks-shield]: https://img.shields.io/github/forks/{BADGE_REPO}.svg?style=for-the-badge\n"
        ));
        out.push_str(&format!(
            "[forks-url]: https://github.com/{BADGE_REPO}/network/members\n"
        ));
        out.push_str(&format!(
            "[stars-shield]: https://img.shields.io/github/stars/{BADGE_REPO}.svg?style=for-the-badge\n"
        ));
        out.push_str(&format!(
            "[stars-url]: https://github.com/{BADGE_REPO}/stargazers\n"
        ));
        out.push_str(&format!(
            "[issues-shield]: https://img.shields.io/github/issues/{BADGE_REPO}.svg?style=for-the-badge\n"
        ));
        out.push_str(&format!(
            "[issues-url]: https://github.com/{BADGE_REPO}/issues\n\n"
        ));
    }

    out
}

/// Write a rendered document, truncating any previous content.
pub fn write_markdown(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content.as_bytes())
}

fn math_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$.*\$").ok()).as_ref()
}

/// Tidy the math span of a row: trim whitespace just inside the dollar
/// signs and pad the span with one space on each side unless the adjacent
/// character is already a space or `*`. Rows without a span pass through
/// unchanged.
pub fn pretty_math(row: &str) -> String {
    let Some(re) = math_re() else {
        return row.to_string();
    };
    let Some(m) = re.find(row) else {
        return row.to_string();
    };
    let before = &row[..m.start()];
    let after = &row[m.end()..];
    let span = m.as_str();
    let inner = span[1..span.len() - 1].trim();

    let lead = match before.chars().last() {
        Some(' ') | Some('*') | None => "",
        Some(_) => " ",
    };
    let trail = match after.chars().next() {
        Some(' ') | Some('*') | None => "",
        Some(_) => " ",
    };
    format!("{before}{lead}${inner}${trail}{after}")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use crate::store::TopicBatch;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 25).unwrap()
    }

    fn store(batches: &[TopicBatch]) -> RecordStore {
        let mut store = RecordStore::new();
        store.merge_batches(batches);
        store
    }

    fn batch(topic: &str, papers: &[(&str, &str)]) -> TopicBatch {
        TopicBatch {
            topic: topic.to_string(),
            papers: papers
                .iter()
                .map(|(id, row)| (id.to_string(), row.to_string()))
                .collect(),
        }
    }

    #[test]
    fn pretty_math_pads_tight_span() {
        assert_eq!(pretty_math("text$x^2$more"), "text $x^2$ more");
    }

    #[test]
    fn pretty_math_trims_inner_whitespace_without_double_padding() {
        assert_eq!(pretty_math("a $ x $ b"), "a $x$ b");
    }

    #[test]
    fn pretty_math_skips_rows_without_span() {
        assert_eq!(pretty_math("|plain|row|"), "|plain|row|");
    }

    #[test]
    fn pretty_math_does_not_pad_after_asterisk() {
        assert_eq!(pretty_math("**$x$**"), "**$x$**");
    }

    #[test]
    fn empty_topics_are_skipped_entirely() {
        let store = store(&[
            batch("slam", &[]),
            batch(
                "nerf",
                &[(
                    "2508.00001",
                    "|2025-08-25|**T**|A et.al.|[2508.00001](http://arxiv.org/abs/2508.00001)|null|\n",
                )],
            ),
        ]);
        let doc = render(&store, &RenderOptions::readme(), today());
        assert!(!doc.contains("## slam"));
        assert!(!doc.contains("<a href=#slam>"));
        assert!(doc.contains("## nerf"));
        assert!(doc.contains("<a href=#nerf>nerf</a>"));
    }

    #[test]
    fn rows_sort_by_paper_id_descending() {
        let store = store(&[batch(
            "slam",
            &[
                ("2508.00001", "|2025-08-25|**first**|A et.al.|[x](y)|null|\n"),
                ("2508.00009", "|2025-08-25|**second**|A et.al.|[x](y)|null|\n"),
            ],
        )]);
        let doc = render(&store, &RenderOptions::readme(), today());
        let first = doc.find("**second**").expect("row present");
        let second = doc.find("**first**").expect("row present");
        assert!(first < second, "higher id must render first");
    }

    #[test]
    fn toc_anchor_replaces_spaces_with_hyphens() {
        let store = store(&[batch(
            "Visual Odometry",
            &[("2508.00001", "|2025-08-25|**T**|A et.al.|[x](y)|null|\n")],
        )]);
        let doc = render(&store, &RenderOptions::readme(), today());
        assert!(doc.contains("<a href=#visual-odometry>Visual Odometry</a>"));
    }

    #[test]
    fn readme_layout_has_header_table_and_footer() {
        let store = store(&[batch(
            "slam",
            &[("2508.00001", "|2025-08-25|**T**|A et.al.|[x](y)|null|\n")],
        )]);
        let doc = render(&store, &RenderOptions::readme(), today());
        assert!(doc.starts_with("[![Contributors]"));
        assert!(doc.contains("## Updated on 2025.08.25\n"));
        assert!(doc.contains("|Publish Date|Title|Authors|PDF|Code|\n|---|---|---|---|---|\n"));
        assert!(doc.contains("<a href=#updated-on-20250825>back to top</a>"));
        assert!(doc.contains("[issues-url]: https://github.com/"));
    }

    #[test]
    fn gitpage_layout_has_front_matter_and_padded_table() {
        let store = store(&[batch(
            "slam",
            &[("2508.00001", "|2025-08-25|**T**|A et.al.|[x](y)|null|\n")],
        )]);
        let doc = render(&store, &RenderOptions::gitpage(), today());
        assert!(doc.starts_with("---\nlayout: default\n---\n\n"));
        assert!(doc.contains("| Publish Date | Title | Authors | PDF | Code |\n"));
        assert!(!doc.contains("<summary>Table of Contents</summary>"));
        assert!(!doc.contains("back to top"));
    }

    #[test]
    fn digest_layout_uses_blockquote_header_and_no_table() {
        let store = store(&[batch(
            "slam",
            &[("2508.00001", "- 2025-08-25, **T**, A et.al., Paper: [x](x)\n")],
        )]);
        let mut opts = RenderOptions::wechat();
        opts.show_badge = false;
        let doc = render(&store, &opts, today());
        assert!(doc.starts_with("> Updated on 2025.08.25\n"));
        assert!(!doc.contains("|Publish Date|"));
        assert!(!doc.contains("[![Contributors]"));
    }
}
