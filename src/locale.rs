//! Locale resolution.
//!
//! Maps a request path, a `?lang=` query, or an `Accept-Language` header to
//! one of the configured locale codes. Resolution never fails: anything that
//! does not name a supported locale falls through to the default.
//!
//! Precedence for [`LocaleSet::resolve`]:
//!
//! 1. First path segment (`/fa/tickets` → `fa`) if supported
//! 2. `Accept-Language`, highest quality first, exact tag then language-only
//!    (`fa-IR` → `fa`)
//! 3. The configured default

use crate::config::LocalesConfig;

/// The closed set of locales a site is built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSet {
    supported: Vec<String>,
    default: String,
    rtl: Vec<String>,
}

impl LocaleSet {
    /// Build a set from config. Config validation guarantees `default` is
    /// part of `supported`; if it is not, it is appended.
    pub fn from_config(config: &LocalesConfig) -> Self {
        let mut supported: Vec<String> = config
            .supported
            .iter()
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let default = config.default.to_ascii_lowercase();
        if !supported.contains(&default) {
            supported.push(default.clone());
        }
        Self {
            supported,
            default,
            rtl: config.rtl.iter().map(|c| c.to_ascii_lowercase()).collect(),
        }
    }

    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    pub fn default_locale(&self) -> &str {
        &self.default
    }

    /// Return the canonical (stored) spelling of `code` if it is supported.
    pub fn get(&self, code: &str) -> Option<&str> {
        self.supported
            .iter()
            .find(|s| s.eq_ignore_ascii_case(code))
            .map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Supported locale for `code`, or the default.
    pub fn or_default<'a>(&'a self, code: &str) -> &'a str {
        self.get(code).unwrap_or(&self.default)
    }

    pub fn is_rtl(&self, code: &str) -> bool {
        self.rtl.iter().any(|r| r.eq_ignore_ascii_case(code))
    }

    /// Locale named by the first path segment, if supported.
    pub fn from_path(&self, path: &str) -> Option<&str> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        path.split('/')
            .find(|segment| !segment.is_empty())
            .and_then(|segment| self.get(segment))
    }

    /// Locale named by a `lang` query parameter, if supported.
    ///
    /// Accepts a raw query string with or without the leading `?`. The first
    /// `lang` parameter wins.
    pub fn from_query(&self, query: &str) -> Option<&str> {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "lang")
            .and_then(|(_, value)| self.get(&value))
    }

    /// Best supported locale from an `Accept-Language` header value.
    pub fn from_accept_language(&self, header: &str) -> Option<&str> {
        for tag in parse_accept_language(header) {
            if let Some(code) = self.get(&tag) {
                return Some(code);
            }
            let language = tag.split('-').next().unwrap_or_default();
            if let Some(code) = self.get(language) {
                return Some(code);
            }
        }
        None
    }

    /// Pick a locale for a request. Always returns a supported code.
    pub fn resolve(&self, path: Option<&str>, accept_language: Option<&str>) -> &str {
        path.and_then(|p| self.from_path(p))
            .or_else(|| accept_language.and_then(|h| self.from_accept_language(h)))
            .unwrap_or(&self.default)
    }
}

/// Parse an `Accept-Language` value into lowercase tags ordered by quality.
///
/// Entries default to `q=1.0`. Entries with a zero or unparsable quality are
/// dropped. Ties keep header order.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut entries: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim().to_ascii_lowercase();
            if tag.is_empty() {
                return None;
            }
            let mut quality = 1.0f32;
            for param in parts {
                if let Some(q) = param.trim().strip_prefix("q=") {
                    quality = q.trim().parse().unwrap_or(0.0);
                }
            }
            (quality > 0.0 && quality.is_finite()).then_some((tag, quality))
        })
        .collect();

    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.into_iter().map(|(tag, _)| tag).collect()
}
