//! Sidebar icons.
//!
//! Documents name an icon in front-matter (`icon: Ticket`). Names resolve
//! through a fixed registry of inline SVG bodies; an unknown name is a build
//! error reported by [`validate_documents`] before anything is rendered.

use crate::content::{self, ContentLoader};
use maud::{Markup, PreEscaped, html};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IconError {
    #[error("Unknown icon '{icon}' in {path}. Known icons: {known}")]
    Unknown {
        icon: String,
        path: PathBuf,
        known: String,
    },
}

/// 24×24 stroke icons, path data only.
const BUILTIN: &[(&str, &str)] = &[
    (
        "BookOpen",
        r#"<path d="M2 3h6a4 4 0 0 1 4 4v14a3 3 0 0 0-3-3H2z"/><path d="M22 3h-6a4 4 0 0 0-4 4v14a3 3 0 0 1 3-3h7z"/>"#,
    ),
    (
        "Ticket",
        r#"<path d="M2 9a3 3 0 0 1 0 6v2a2 2 0 0 0 2 2h16a2 2 0 0 0 2-2v-2a3 3 0 0 1 0-6V7a2 2 0 0 0-2-2H4a2 2 0 0 0-2 2Z"/><path d="M13 5v2"/><path d="M13 17v2"/><path d="M13 11v2"/>"#,
    ),
    (
        "Hand",
        r#"<path d="M18 11V6a2 2 0 0 0-4 0v5"/><path d="M14 10V4a2 2 0 0 0-4 0v6"/><path d="M10 10.5V6a2 2 0 0 0-4 0v8"/><path d="M18 8a2 2 0 1 1 4 0v6a8 8 0 0 1-8 8h-2c-2.8 0-4.5-.86-5.99-2.34l-3.6-3.6a2 2 0 0 1 2.83-2.82L7 15"/>"#,
    ),
    (
        "House",
        r#"<path d="M15 21v-8a1 1 0 0 0-1-1h-4a1 1 0 0 0-1 1v8"/><path d="M3 10a2 2 0 0 1 .71-1.53l7-6a2 2 0 0 1 2.58 0l7 6A2 2 0 0 1 21 10v9a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2z"/>"#,
    ),
    (
        "Settings",
        r#"<circle cx="12" cy="12" r="3"/><path d="M19.4 15a1.65 1.65 0 0 0 .33 1.82l.06.06a2 2 0 1 1-2.83 2.83l-.06-.06a1.65 1.65 0 0 0-2.82 1.17V21a2 2 0 0 1-4 0v-.09A1.65 1.65 0 0 0 9 19.4a1.65 1.65 0 0 0-1.82.33l-.06.06a2 2 0 1 1-2.83-2.83l.06-.06A1.65 1.65 0 0 0 3.2 14H3a2 2 0 0 1 0-4h.09A1.65 1.65 0 0 0 4.6 9a1.65 1.65 0 0 0-.33-1.82l-.06-.06a2 2 0 1 1 2.83-2.83l.06.06A1.65 1.65 0 0 0 9 4.6V3a2 2 0 0 1 4 0v.09a1.65 1.65 0 0 0 2.82 1.17l.06-.06a2 2 0 1 1 2.83 2.83l-.06.06A1.65 1.65 0 0 0 20.8 10H21a2 2 0 0 1 0 4h-.09a1.65 1.65 0 0 0-1.51 1z"/>"#,
    ),
    (
        "Shield",
        r#"<path d="M20 13c0 5-3.5 7.5-7.66 8.95a1 1 0 0 1-.67-.01C7.5 20.5 4 18 4 13V6a1 1 0 0 1 1-1c2 0 4.5-1.2 6.24-2.72a1.17 1.17 0 0 1 1.52 0C14.51 3.81 17 5 19 5a1 1 0 0 1 1 1z"/>"#,
    ),
    (
        "MessageSquare",
        r#"<path d="M21 15a2 2 0 0 1-2 2H7l-4 4V5a2 2 0 0 1 2-2h14a2 2 0 0 1 2 2z"/>"#,
    ),
    (
        "Rocket",
        r#"<path d="M4.5 16.5c-1.5 1.26-2 5-2 5s3.74-.5 5-2c.71-.84.7-2.13-.09-2.91a2.18 2.18 0 0 0-2.91-.09z"/><path d="m12 15-3-3a22 22 0 0 1 2-3.95A12.88 12.88 0 0 1 22 2c0 2.72-.78 7.5-6 11a22.35 22.35 0 0 1-4 2z"/>"#,
    ),
    (
        "Terminal",
        r#"<polyline points="4 17 10 11 4 5"/><line x1="12" x2="20" y1="19" y2="19"/>"#,
    ),
    (
        "Info",
        r#"<circle cx="12" cy="12" r="10"/><path d="M12 16v-4"/><path d="M12 8h.01"/>"#,
    ),
    (
        "Users",
        r#"<path d="M16 21v-2a4 4 0 0 0-4-4H6a4 4 0 0 0-4 4v2"/><circle cx="9" cy="7" r="4"/><path d="M22 21v-2a4 4 0 0 0-3-3.87"/><path d="M16 3.13a4 4 0 0 1 0 7.75"/>"#,
    ),
    (
        "Bell",
        r#"<path d="M6 8a6 6 0 0 1 12 0c0 7 3 9 3 9H3s3-2 3-9"/><path d="M10.3 21a1.94 1.94 0 0 0 3.4 0"/>"#,
    ),
];

#[derive(Debug, Clone)]
pub struct IconRegistry {
    icons: BTreeMap<String, &'static str>,
}

impl Default for IconRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl IconRegistry {
    pub fn builtin() -> Self {
        Self {
            icons: BUILTIN
                .iter()
                .map(|(name, body)| (name.to_string(), *body))
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.icons.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.icons.keys().map(String::as_str)
    }

    /// Inline `<svg>` for a registered icon.
    pub fn render(&self, name: &str) -> Option<Markup> {
        let body = self.icons.get(name)?;
        Some(html! {
            svg.icon xmlns="http://www.w3.org/2000/svg" width="16" height="16"
                viewBox="0 0 24 24" fill="none" stroke="currentColor"
                stroke-width="2" stroke-linecap="round" stroke-linejoin="round"
                aria-hidden="true" {
                (PreEscaped(*body))
            }
        })
    }
}

/// Check every document's `icon` against the registry.
///
/// Returns the number of icon references checked, or the first unknown
/// icon found in locale then path order.
pub fn validate_documents(loader: &ContentLoader, registry: &IconRegistry) -> Result<usize, IconError> {
    let mut checked = 0;
    for locale in loader.locales().supported() {
        let Ok(entries) = loader.documents(locale) else {
            continue;
        };
        for entry in entries {
            let Ok(parsed) = content::read_document(&entry.path) else {
                continue;
            };
            let Some(icon) = parsed.front_matter.icon else {
                continue;
            };
            if !registry.contains(&icon) {
                return Err(IconError::Unknown {
                    icon,
                    path: entry.path,
                    known: registry.names().collect::<Vec<_>>().join(", "),
                });
            }
            checked += 1;
        }
    }
    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn fixture_icons_are_known() {
        let tmp = setup_content();
        let loader = loader_for(tmp.path());
        // BookOpen and Hand in both locales, Ticket in English only
        assert_eq!(validate_documents(&loader, &IconRegistry::builtin()).unwrap(), 5);
    }

    #[test]
    fn unknown_icon_is_error() {
        let tmp = setup_content();
        write_doc(tmp.path(), "fa", "odd.mdx", "---\ntitle: Odd\nicon: Unicorn\n---\n");
        let loader = loader_for(tmp.path());

        let err = validate_documents(&loader, &IconRegistry::builtin()).unwrap_err();
        let IconError::Unknown { icon, path, .. } = err;
        assert_eq!(icon, "Unicorn");
        assert!(path.ends_with("odd.mdx"));
    }

    #[test]
    fn names_are_case_sensitive() {
        let registry = IconRegistry::builtin();
        assert!(registry.contains("Ticket"));
        assert!(!registry.contains("ticket"));
    }

    #[test]
    fn render_wraps_in_svg() {
        let registry = IconRegistry::builtin();
        let svg = registry.render("Info").unwrap().into_string();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("class=\"icon\""));
        assert!(svg.contains("<circle cx=\"12\""));
        assert!(registry.render("Nope").is_none());
    }
}
