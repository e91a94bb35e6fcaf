//! # Polydoc
//!
//! A static site generator for multilingual documentation. Markdown/MDX
//! files under `docs/<locale>/` become HTML pages in every supported locale,
//! with a client-side search index, Open Graph cards, and an
//! `llms-full.txt` dump for language models.
//!
//! # Pipeline
//!
//! ```text
//! config.toml ─► icons::validate_documents       (fail fast on unknown icons)
//!             ─► search::build_index             → dist/search-index.json
//!             ─► og::generate_og_images          → dist/og-images/*.png
//!             ─► generate::generate              → dist/<locale>/<slug>/index.html
//!             ─► llms::write_llms                → dist/llms-full.txt
//! ```
//!
//! Each stage reads the content tree through one [`content::ContentLoader`]
//! and can run on its own from the CLI.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, stock defaults, validation |
//! | [`locale`] | Supported locale set; path, query and `Accept-Language` resolution |
//! | [`frontmatter`] | YAML front-matter split and parse |
//! | [`content`] | Slugs, document loading with default-locale fallback, enumeration |
//! | [`toc`] | Heading extraction with unique anchors |
//! | [`search`] | Index builder, weighted query, lazily loaded index cache |
//! | [`og`] | 1200×630 PNG cards, rendered in parallel |
//! | [`i18n`] | Per-locale UI strings with English fallback |
//! | [`icons`] | Named inline SVG icons for the sidebar |
//! | [`generate`] | HTML pages via Maud |
//! | [`llms`] | `llms-full.txt` writer |
//! | [`serve`] | Local preview server with search and content endpoints |
//! | [`output`] | CLI output formatting |
//!
//! # Fallback
//!
//! A document missing in a locale is shown from the default locale, and the
//! page says which locale it came from. A slug present in no locale yields a
//! "Page Not Found" document instead of an error. The same rule backs the
//! pages, the `/api/content` endpoint, and `llms-full.txt`.

pub mod config;
pub mod content;
pub mod frontmatter;
pub mod generate;
pub mod i18n;
pub mod icons;
pub mod llms;
pub mod locale;
pub mod og;
pub mod output;
pub mod search;
pub mod serve;
pub mod toc;

#[cfg(test)]
pub(crate) mod test_helpers;
