//! `llms-full.txt`: every document of the default locale as plain markdown.
//!
//! ```text
//! # SudoBotz (/en)
//!
//! <body>
//!
//! # Ticket system (/en/tickets)
//!
//! <body>
//! ```

use crate::content::{ContentDocument, ContentLoader};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const LLMS_FILE: &str = "llms-full.txt";

#[derive(Error, Debug)]
pub enum LlmsError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One `# title (url)` block.
pub fn document_block(doc: &ContentDocument, url: &str) -> String {
    format!("# {} ({})\n\n{}", doc.title, url, doc.body)
}

/// All slugs in order, loaded in the default locale with fallback.
pub fn llms_blocks(loader: &ContentLoader) -> Vec<String> {
    let locale = loader.locales().default_locale();
    loader
        .all_slugs()
        .iter()
        .map(|slug| {
            let doc = loader.load(slug, locale);
            document_block(&doc, &slug.url(locale))
        })
        .collect()
}

/// Write `<output>/llms-full.txt`, returning the number of documents.
pub fn write_llms(loader: &ContentLoader, output_dir: &Path) -> Result<usize, LlmsError> {
    let blocks = llms_blocks(loader);
    let path = output_dir.join(LLMS_FILE);
    fs::create_dir_all(output_dir)
        .and_then(|()| fs::write(&path, blocks.join("\n\n")))
        .map_err(|source| LlmsError::Io { path, source })?;
    Ok(blocks.len())
}
