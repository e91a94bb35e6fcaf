//! Shared test utilities.
//!
//! Builds isolated content trees from `fixtures/content/` and offers small
//! helpers for adding documents and looking things up.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_content();
//! write_doc(tmp.path(), "fa", "extra.mdx", "---\ntitle: X\n---\n");
//! let loader = loader_for(tmp.path());
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::config::{self, SiteConfig};
use crate::content::ContentLoader;
use crate::search::SearchRecord;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_content() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a document under `<root>/docs/<locale>/<relative>`, creating
/// parent directories.
pub fn write_doc(root: &Path, locale: &str, relative: &str, contents: &str) {
    let path = root.join("docs").join(locale).join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Load the config of a content tree. Panics on invalid config.
pub fn config_for(root: &Path) -> SiteConfig {
    config::load_config(root).unwrap()
}

pub fn loader_for(root: &Path) -> ContentLoader {
    ContentLoader::new(root, &config_for(root))
}

// =========================================================================
// Lookups (panic with a clear message on miss)
// =========================================================================

/// Find a search record by url. Panics if not found.
pub fn find_record<'a>(records: &'a [SearchRecord], url: &str) -> &'a SearchRecord {
    records.iter().find(|r| r.url == url).unwrap_or_else(|| {
        let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
        panic!("record '{url}' not found. Available: {urls:?}")
    })
}

/// A record with the given fields and an empty body.
pub fn record(title: &str, description: &str, content: &str, locale: &str) -> SearchRecord {
    let slug = title.to_lowercase().replace(' ', "-");
    SearchRecord {
        title: title.to_string(),
        description: description.to_string(),
        content: content.to_string(),
        url: format!("/{locale}/{slug}"),
        locale: locale.to_string(),
        slug,
    }
}
