//! Table-of-contents extraction by line scanning.
//!
//! Headings of depth 2 to 6 become TOC entries with unique anchors. Headings
//! inside `<Tabs>`/`<Tab>` blocks and fenced code blocks are skipped: the
//! former are per-tab titles, the latter are not headings at all.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Headings whose text contains every one of these words are left out of the
/// TOC. They are install-step titles repeated in each tab.
pub const SKIPPED_HEADING_WORDS: [&str; 2] = ["Install", "SudoBotz"];

const TAB_OPEN_MARKERS: [&str; 3] = ["<Tabs", "<Tab ", "<Tab>"];
const TAB_CLOSE_MARKERS: [&str; 2] = ["</Tabs>", "</Tab>"];

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{2,6})\s+(.+)$").expect("static regex"));
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s-]").expect("static regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static HYPHENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub depth: u8,
    /// `#anchor`, unique within one TOC.
    pub url: String,
    pub title: String,
    /// 0-based line index in the scanned body.
    pub line: usize,
}

impl Heading {
    /// The anchor without its leading `#`.
    pub fn id(&self) -> &str {
        self.url.trim_start_matches('#')
    }
}

/// Scan a markdown body for TOC headings.
pub fn extract_toc(body: &str) -> Vec<Heading> {
    let mut toc = Vec::new();
    let mut taken = HashSet::new();
    let mut tab_depth = 0usize;
    let mut fence: Option<&str> = None;

    for (index, line) in body.lines().enumerate() {
        let line = line.trim();

        if let Some(marker) = fence {
            if line.starts_with(marker) {
                fence = None;
            }
            continue;
        }
        if let Some(marker) = ["```", "~~~"].into_iter().find(|m| line.starts_with(m)) {
            fence = Some(marker);
            continue;
        }

        if TAB_OPEN_MARKERS.iter().any(|m| line.contains(m)) {
            tab_depth += 1;
        }
        if TAB_CLOSE_MARKERS.iter().any(|m| line.contains(m)) {
            tab_depth = tab_depth.saturating_sub(1);
        }
        if tab_depth > 0 {
            continue;
        }

        let Some(caps) = HEADING_RE.captures(line) else {
            continue;
        };
        let title = &caps[2];
        if SKIPPED_HEADING_WORDS.iter().all(|w| title.contains(w)) {
            continue;
        }

        let mut base = slugify(title);
        if base.is_empty() {
            base = format!("heading-{index}");
        }
        let anchor = unique_anchor(&base, &mut taken);
        toc.push(Heading {
            depth: caps[1].len() as u8,
            url: format!("#{anchor}"),
            title: title.to_string(),
            line: index,
        });
    }
    toc
}

/// First free anchor among `base`, `base-2`, `base-3`, ...
fn unique_anchor(base: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 1;
    while taken.contains(&candidate) {
        n += 1;
        candidate = format!("{base}-{n}");
    }
    taken.insert(candidate.clone());
    candidate
}

/// Turn heading text into an anchor.
///
/// Lowercases, strips combining diacritics after NFD decomposition, keeps
/// letters, numbers and hyphens, and joins words with single hyphens.
/// Non-Latin scripts survive: `"راه‌اندازی ربات"` → `"راهاندازی-ربات"`.
pub fn slugify(text: &str) -> String {
    let decomposed: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect();
    let kept = DISALLOWED_RE.replace_all(&decomposed, "");
    let joined = WHITESPACE_RE.replace_all(&kept, "-");
    let collapsed = HYPHENS_RE.replace_all(&joined, "-");
    collapsed.trim_matches('-').to_string()
}
