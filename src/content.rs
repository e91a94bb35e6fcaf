//! Locale-aware content loading.
//!
//! Documents live in one directory per locale:
//!
//! ```text
//! content/
//! └── docs/
//!     ├── en/
//!     │   ├── index.mdx            # slug []
//!     │   ├── welcome.mdx          # slug [welcome]
//!     │   └── tickets/
//!     │       ├── index.mdx        # slug [tickets]
//!     │       └── setup.mdx        # slug [tickets, setup]
//!     └── fa/
//!         └── index.mdx
//! ```
//!
//! ## Fallback chain
//!
//! [`ContentLoader::load`] never fails. A slug missing in the requested
//! locale is retried once in the default locale; a slug missing there too
//! yields the sentinel [`ContentDocument::not_found`] with `exists: false`.
//! That is at most two locale attempts per call.

use crate::config::SiteConfig;
use crate::frontmatter::{self, FrontMatterError};
use crate::locale::LocaleSet;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const NOT_FOUND_TITLE: &str = "Page Not Found";
pub const NOT_FOUND_DESCRIPTION: &str = "Content not found";
pub const NOT_FOUND_BODY: &str =
    "# Page Not Found\n\nThis content is not available in the selected language.";
pub const UNTITLED: &str = "Untitled";

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Front-matter error in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: FrontMatterError,
    },
    #[error("No document for slug '{slug}' in locale '{locale}'")]
    NotFound { slug: String, locale: String },
    #[error("Invalid slug: '{0}'")]
    InvalidSlug(String),
    #[error("Locale directory does not exist: {0}")]
    MissingLocaleDir(PathBuf),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// An ordered sequence of URL path segments identifying a document.
///
/// The empty slug is the locale's index page.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(Vec<String>);

impl Slug {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a `/`-separated path. Empty segments are dropped, so `""`,
    /// `"/"` and `"a//b/"` are all accepted.
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('/').filter(|s| !s.is_empty()))
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every segment is a plain name that cannot escape the
    /// locale directory.
    pub fn is_safe(&self) -> bool {
        self.0.iter().all(|s| {
            !s.is_empty() && s != "." && s != ".." && !s.contains(['/', '\\', '\0'])
        })
    }

    /// Derive a slug from a document path relative to a locale directory.
    ///
    /// The extension is dropped and a trailing `index` segment is stripped:
    /// `tickets/index.mdx` → `tickets`, `index.mdx` → root.
    pub fn from_relative_path(relative: &Path) -> Self {
        let mut segments: Vec<String> = relative
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if segments.last().is_some_and(|s| s == "index") {
            segments.pop();
        }
        Self(segments)
    }

    /// Page URL for this slug in a locale: `/fa/tickets/setup`, or `/fa`.
    pub fn url(&self, locale: &str) -> String {
        if self.is_root() {
            format!("/{locale}")
        } else {
            format!("/{locale}/{self}")
        }
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// A loaded document. `locale` is the locale whose file was served, which
/// differs from the requested one after a fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentDocument {
    pub title: String,
    pub description: String,
    #[serde(rename = "content")]
    pub body: String,
    pub locale: String,
    pub slug: Slug,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ContentDocument {
    /// The sentinel returned when a slug exists in no locale.
    pub fn not_found(slug: &Slug, locale: &str) -> Self {
        Self {
            title: NOT_FOUND_TITLE.to_string(),
            description: NOT_FOUND_DESCRIPTION.to_string(),
            body: NOT_FOUND_BODY.to_string(),
            locale: locale.to_string(),
            slug: slug.clone(),
            exists: false,
            icon: None,
        }
    }
}

/// A document file discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub slug: Slug,
    pub path: PathBuf,
}

/// Reads documents for `(slug, locale)` pairs with default-locale fallback.
#[derive(Debug, Clone)]
pub struct ContentLoader {
    docs_root: PathBuf,
    extensions: Vec<String>,
    locales: LocaleSet,
}

impl ContentLoader {
    pub fn new(content_root: &Path, config: &SiteConfig) -> Self {
        Self {
            docs_root: content_root.join(&config.content.docs_dir),
            extensions: config.content.extensions.clone(),
            locales: LocaleSet::from_config(&config.locales),
        }
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    pub fn locale_dir(&self, locale: &str) -> PathBuf {
        self.docs_root.join(locale)
    }

    /// Load a document, falling back to the default locale, then to the
    /// not-found sentinel. Unsupported locales are treated as the default.
    pub fn load(&self, slug: &Slug, locale: &str) -> ContentDocument {
        let locale = self.locales.or_default(locale);
        match self.try_load(slug, locale) {
            Ok(doc) => doc,
            Err(e) => {
                let default = self.locales.default_locale();
                if locale != default {
                    log::debug!("{e}; falling back to '{default}'");
                    return self.load(slug, default);
                }
                log::debug!("{e}; serving not-found page");
                ContentDocument::not_found(slug, default)
            }
        }
    }

    /// Load a document from exactly one locale, without fallback.
    pub fn try_load(&self, slug: &Slug, locale: &str) -> Result<ContentDocument, ContentError> {
        if !slug.is_safe() {
            return Err(ContentError::InvalidSlug(slug.to_string()));
        }
        let path = self
            .find_file(slug, locale)
            .ok_or_else(|| ContentError::NotFound {
                slug: slug.to_string(),
                locale: locale.to_string(),
            })?;
        let parsed = read_document(&path)?;
        let fm = parsed.front_matter;
        let title = document_title(fm.title, &parsed.body);

        Ok(ContentDocument {
            title,
            description: fm.description.unwrap_or_default(),
            body: parsed.body,
            locale: locale.to_string(),
            slug: slug.clone(),
            exists: true,
            icon: fm.icon,
        })
    }

    /// Locate the file for a slug in one locale.
    ///
    /// Tries `<slug>.<ext>` for each extension, then `<slug>/index.<ext>`.
    /// The root slug maps to `index.<ext>`.
    pub fn find_file(&self, slug: &Slug, locale: &str) -> Option<PathBuf> {
        let dir = self.locale_dir(locale);
        let base = slug
            .segments()
            .iter()
            .fold(dir.clone(), |path, segment| path.join(segment));

        let mut candidates = Vec::new();
        if slug.is_root() {
            for ext in &self.extensions {
                candidates.push(dir.join(format!("index.{ext}")));
            }
        } else {
            // Appended, not substituted: `v1.2` must become `v1.2.mdx`
            for ext in &self.extensions {
                let mut name = base.clone().into_os_string();
                name.push(format!(".{ext}"));
                candidates.push(PathBuf::from(name));
            }
            for ext in &self.extensions {
                candidates.push(base.join(format!("index.{ext}")));
            }
        }
        candidates.into_iter().find(|p| p.is_file())
    }

    /// All documents of one locale, sorted by path.
    ///
    /// When two files map to the same slug (`a.mdx` and `a/index.mdx`) the
    /// first in sort order wins.
    pub fn documents(&self, locale: &str) -> Result<Vec<DocumentEntry>, ContentError> {
        let dir = self.locale_dir(locale);
        if !dir.is_dir() {
            return Err(ContentError::MissingLocaleDir(dir));
        }

        let mut seen = BTreeSet::new();
        let mut entries = Vec::new();
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !self.is_document(path) {
                continue;
            }
            let Ok(relative) = path.strip_prefix(&dir) else {
                continue;
            };
            let slug = Slug::from_relative_path(relative);
            if seen.insert(slug.clone()) {
                entries.push(DocumentEntry {
                    slug,
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(entries)
    }

    /// Union of slugs across all supported locales, sorted.
    ///
    /// Locales whose directory is missing contribute nothing.
    pub fn all_slugs(&self) -> Vec<Slug> {
        let mut slugs = BTreeSet::new();
        for locale in self.locales.supported() {
            match self.documents(locale) {
                Ok(entries) => slugs.extend(entries.into_iter().map(|e| e.slug)),
                Err(e) => log::warn!("{e}"),
            }
        }
        slugs.into_iter().collect()
    }

    fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
    }
}

/// Title for a document: front-matter, then the first `# ` heading, then
/// [`UNTITLED`].
pub fn document_title(front_matter_title: Option<String>, body: &str) -> String {
    front_matter_title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| frontmatter::first_heading(body))
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Read and split one document file.
pub fn read_document(path: &Path) -> Result<frontmatter::ParsedDocument, ContentError> {
    let source = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    frontmatter::parse(&source).map_err(|source| ContentError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })
}
