//! arXiv PDF download.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::client::{HttpClient, NetError, DOWNLOAD_TIMEOUT};

pub const ARXIV_PDF_URL: &str = "https://arxiv.org/pdf/";

/// Fetch the PDF for `paper_key` into `dest_dir`, returning the local
/// path. Uses the longer download timeout.
pub fn download_pdf(
    client: &HttpClient,
    paper_key: &str,
    dest_dir: &Path,
) -> Result<PathBuf, NetError> {
    fs::create_dir_all(dest_dir).map_err(|err| NetError::Io {
        path: dest_dir.to_path_buf(),
        source: err,
    })?;
    let url = format!("{ARXIV_PDF_URL}{paper_key}.pdf");
    let resp = client
        .inner()
        .get(&url)
        .timeout(DOWNLOAD_TIMEOUT)
        .send()
        .map_err(NetError::Transport)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(NetError::Status { status, url });
    }
    let bytes = resp.bytes().map_err(NetError::Transport)?;
    let local = dest_dir.join(format!("{}.pdf", sanitize_filename(paper_key)));
    fs::write(&local, &bytes).map_err(|err| NetError::Io {
        path: local.clone(),
        source: err,
    })?;
    info!("downloaded pdf for {paper_key} -> {}", local.display());
    Ok(local)
}

/// Restrict a filename to `[A-Za-z0-9._-]`, mapping everything else to `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_id_characters() {
        assert_eq!(sanitize_filename("2508.17739"), "2508.17739");
        assert_eq!(sanitize_filename("cs/9901001v1"), "cs_9901001v1");
        assert_eq!(sanitize_filename("a b?c"), "a_b_c");
    }
}
