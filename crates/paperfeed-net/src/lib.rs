//! paperfeed-net: blocking HTTP collaborators for the pipeline.
//!
//! Thin wrappers with no internal state machine: literature search,
//! code-link lookup, repository search, PDF download, and summarization.
//! One [`HttpClient`] is constructed at process start and passed by
//! reference to every caller.

pub mod arxiv;
pub mod client;
pub mod codelink;
pub mod github;
pub mod pdf;
pub mod summarize;

pub use client::{HttpClient, NetError};
