//! paperfeed-core: the record reconciliation core.
//!
//! Row codec, persisted record store, reconciler (collect and link-update
//! modes), and the Markdown report renderer. No network I/O lives here;
//! the code-link lookup enters through the [`reconcile::CodeLinkResolver`]
//! trait.

pub mod reconcile;
pub mod render;
pub mod row;
pub mod store;
