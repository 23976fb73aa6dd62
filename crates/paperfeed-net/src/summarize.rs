//! PDF summarization via the DashScope OpenAI-compatible API.

use std::env;
use std::path::Path;

use log::{info, warn};
use serde_json::{json, Value};

use crate::client::{HttpClient, NetError};

pub const DASHSCOPE_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const SUMMARY_MODEL: &str = "qwen-long";
pub const API_KEY_ENV: &str = "DASHSCOPE_API_KEY";

/// The summary must come back as a single line (the row format cannot
/// hold newlines), hence the explicit output-format instruction.
const SUMMARY_PROMPT: &str = "你是论文的作者，请用中文总结这篇论文的主要内容，并给出论文的结论。最终的输出格式为：'**论文主要内容**：[论文主要内容] <br><br> **论文结论**：[论文结论]'。你只需要填写[]里的内容，保留<br>，输出结果不要有任何换行行为。";

pub struct Summarizer<'a> {
    client: &'a HttpClient,
    api_key: String,
}

impl<'a> Summarizer<'a> {
    /// Build a summarizer from the environment, or `None` (with a logged
    /// warning) when no API key is configured.
    pub fn from_env(client: &'a HttpClient) -> Option<Self> {
        match env::var(API_KEY_ENV) {
            Ok(api_key) if !api_key.trim().is_empty() => Some(Self { client, api_key }),
            _ => {
                warn!("{API_KEY_ENV} not set; skipping summarization");
                None
            }
        }
    }

    /// Upload the PDF for extraction, then ask the model for a one-line
    /// summary of it.
    pub fn summarize_pdf(&self, pdf_path: &Path) -> Result<String, NetError> {
        let file_id = self.upload_for_extract(pdf_path)?;
        let summary = self.chat_completion(&file_id)?;
        info!("summarization complete for {}", pdf_path.display());
        Ok(summary)
    }

    fn upload_for_extract(&self, pdf_path: &Path) -> Result<String, NetError> {
        let url = format!("{DASHSCOPE_BASE_URL}/files");
        let form = reqwest::blocking::multipart::Form::new()
            .text("purpose", "file-extract")
            .file("file", pdf_path)
            .map_err(|err| NetError::Io {
                path: pdf_path.to_path_buf(),
                source: err,
            })?;
        let resp = self
            .client
            .inner()
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .map_err(NetError::Transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NetError::Status { status, url });
        }
        let value: Value = resp.json().map_err(|err| NetError::Malformed {
            url: url.clone(),
            detail: err.to_string(),
        })?;
        file_id(&value).ok_or(NetError::Malformed {
            url,
            detail: "missing file id".to_string(),
        })
    }

    fn chat_completion(&self, file_id: &str) -> Result<String, NetError> {
        let url = format!("{DASHSCOPE_BASE_URL}/chat/completions");
        let body = json!({
            "model": SUMMARY_MODEL,
            "messages": [
                {"role": "system", "content": format!("fileid://{file_id}")},
                {"role": "user", "content": SUMMARY_PROMPT},
            ],
        });
        let resp = self
            .client
            .inner()
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(NetError::Transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NetError::Status { status, url });
        }
        let value: Value = resp.json().map_err(|err| NetError::Malformed {
            url: url.clone(),
            detail: err.to_string(),
        })?;
        completion_text(&value).ok_or(NetError::Malformed {
            url,
            detail: "empty completion content".to_string(),
        })
    }
}

fn file_id(value: &Value) -> Option<String> {
    value.get("id")?.as_str().map(str::to_string)
}

fn completion_text(value: &Value) -> Option<String> {
    let text = value
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()?;
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_text_reads_first_choice() {
        let value = json!({
            "choices": [{"message": {"content": "**论文主要内容**：x <br><br> **论文结论**：y"}}],
        });
        assert_eq!(
            completion_text(&value),
            Some("**论文主要内容**：x <br><br> **论文结论**：y".to_string())
        );
    }

    #[test]
    fn empty_or_missing_content_yields_none() {
        assert_eq!(completion_text(&json!({"choices": []})), None);
        assert_eq!(
            completion_text(&json!({"choices": [{"message": {"content": ""}}]})),
            None
        );
    }

    #[test]
    fn file_id_reads_top_level_id() {
        assert_eq!(
            file_id(&json!({"id": "file-abc123"})),
            Some("file-abc123".to_string())
        );
        assert_eq!(file_id(&json!({})), None);
    }
}
