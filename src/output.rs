//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each entity (document, card, page, hit) leads with its positional index
//! and title. Paths and URLs follow as secondary context, either after an
//! arrow or on an indented line.
//!
//! # Output Format
//!
//! ## Search index
//!
//! ```text
//! en (4 documents)
//!     001 SudoBotz → /en
//!     002 Ticket system → /en/tickets
//! fa (2 documents)
//!     001 سودوبات → /fa
//!
//! Wrote dist/search-index.json
//! ```
//!
//! ## Generate
//!
//! ```text
//! en
//!     001 SudoBotz → /en (3 headings)
//! fa
//!     003 Ticket setup → /fa/tickets/setup (fallback: en)
//!
//! Generated 8 pages (2 fallbacks) in dist
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::generate::GenerateReport;
use crate::og::OgReport;
use crate::search::{SearchRecord, SearchResponse};
use crate::toc::Heading;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// search-index
// ============================================================================

/// Records grouped by locale, in index order.
pub fn format_index_output(records: &[SearchRecord], path: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let mut locales: Vec<&str> = Vec::new();
    for record in records {
        if !locales.contains(&record.locale.as_str()) {
            locales.push(&record.locale);
        }
    }

    for locale in locales {
        let group: Vec<&SearchRecord> = records.iter().filter(|r| r.locale == locale).collect();
        lines.push(format!("{} ({})", locale, plural(group.len(), "document", "documents")));
        for (i, record) in group.iter().enumerate() {
            lines.push(format!(
                "{}{} {} → {}",
                indent(1),
                format_index(i + 1),
                record.title,
                record.url
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!("Wrote {}", path.display()));
    lines
}

pub fn print_index_output(records: &[SearchRecord], path: &Path) {
    print_lines(format_index_output(records, path));
}

// ============================================================================
// og-images
// ============================================================================

pub fn format_og_output(report: &OgReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, card) in report.generated.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            card.title,
            card.filename
        ));
        lines.push(format!("{}{} · {}", indent(1), card.kind.label(), card.url));
    }
    if !report.failed.is_empty() {
        lines.push(String::new());
        lines.push("Failed".to_string());
        for (card, error) in &report.failed {
            lines.push(format!("{}{}: {}", indent(1), card.filename, error));
        }
    }
    if report.text_logo {
        lines.push(String::new());
        lines.push("Logo not found; cards use the text logo".to_string());
    }
    lines.push(String::new());
    lines.push(format!(
        "Generated {} in {}",
        plural(report.generated.len(), "image", "images"),
        report.output_dir.display()
    ));
    lines
}

pub fn print_og_output(report: &OgReport) {
    print_lines(format_og_output(report));
}

// ============================================================================
// generate
// ============================================================================

/// Pages grouped by locale. Fallback pages name the locale they show.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<&str> = None;
    let mut position = 0;

    for page in &report.pages {
        if current != Some(page.locale.as_str()) {
            current = Some(page.locale.as_str());
            position = 0;
            lines.push(page.locale.clone());
        }
        position += 1;

        let detail = if !page.exists {
            " (not found)".to_string()
        } else if page.source_locale != page.locale {
            format!(" (fallback: {})", page.source_locale)
        } else if page.headings > 0 {
            format!(" ({})", plural(page.headings, "heading", "headings"))
        } else {
            String::new()
        };
        lines.push(format!(
            "{}{} {} → {}{}",
            indent(1),
            format_index(position),
            page.title,
            page.url,
            detail
        ));
    }

    let fallbacks = report
        .pages
        .iter()
        .filter(|p| p.source_locale != p.locale)
        .count();
    lines.push(String::new());
    lines.push(format!(
        "Generated {} ({}) in {}",
        plural(report.pages.len(), "page", "pages"),
        plural(fallbacks, "fallback", "fallbacks"),
        report.output_dir.display()
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    print_lines(format_generate_output(report));
}

// ============================================================================
// llms
// ============================================================================

pub fn format_llms_output(count: usize, path: &Path) -> Vec<String> {
    vec![format!(
        "Wrote {} to {}",
        plural(count, "document", "documents"),
        path.display()
    )]
}

pub fn print_llms_output(count: usize, path: &Path) {
    print_lines(format_llms_output(count, path));
}

// ============================================================================
// search
// ============================================================================

pub fn format_search_results(query: &str, response: &SearchResponse) -> Vec<String> {
    if response.hits.is_empty() {
        return vec![format!("No results for \"{}\"", query)];
    }
    let mut lines = Vec::new();
    for (i, hit) in response.hits.iter().enumerate() {
        lines.push(format!(
            "{} {} [{}] → {}",
            format_index(i + 1),
            hit.record.title,
            hit.score,
            hit.record.url
        ));
        let desc = truncate_desc(hit.record.description.trim(), 60);
        if !desc.is_empty() {
            lines.push(format!("{}{}", indent(1), desc));
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "{} in {} ms",
        plural(response.count, "result", "results"),
        response.elapsed_ms
    ));
    lines
}

pub fn print_search_results(query: &str, response: &SearchResponse) {
    print_lines(format_search_results(query, response));
}

// ============================================================================
// toc
// ============================================================================

/// Headings indented by depth, `##` at the left margin.
pub fn format_toc(headings: &[Heading]) -> Vec<String> {
    if headings.is_empty() {
        return vec!["No headings".to_string()];
    }
    headings
        .iter()
        .map(|h| {
            format!(
                "{}{} {}",
                indent(h.depth.saturating_sub(2) as usize),
                h.title,
                h.url
            )
        })
        .collect()
}

pub fn print_toc(headings: &[Heading]) {
    print_lines(format_toc(headings));
}

// ============================================================================
// locale
// ============================================================================

pub fn format_locale(locale: &str, rtl: bool, path: Option<&str>, accept_language: Option<&str>) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", locale, if rtl { "rtl" } else { "ltr" })];
    if let Some(path) = path {
        lines.push(format!("{}Path: {}", indent(1), path));
    }
    if let Some(header) = accept_language {
        lines.push(format!("{}Accept-Language: {}", indent(1), header));
    }
    lines
}

pub fn print_locale(locale: &str, rtl: bool, path: Option<&str>, accept_language: Option<&str>) {
    print_lines(format_locale(locale, rtl, path, accept_language));
}

// ============================================================================
// check
// ============================================================================

/// Per-locale coverage of a content tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleCoverage {
    pub locale: String,
    pub documents: usize,
    /// Slugs shown through fallback in this locale.
    pub missing: Vec<String>,
}

pub fn format_check_output(coverage: &[LocaleCoverage], slugs: usize, icons: usize) -> Vec<String> {
    let mut lines = vec!["Locales".to_string()];
    for c in coverage {
        lines.push(format!(
            "{}{} ({} of {})",
            indent(1),
            c.locale,
            c.documents,
            plural(slugs, "document", "documents")
        ));
        for slug in &c.missing {
            let shown = if slug.is_empty() { "(index)" } else { slug.as_str() };
            lines.push(format!("{}Missing: {}", indent(2), shown));
        }
    }
    lines.push(String::new());
    lines.push(format!("Icons: {} checked, all known", icons));
    lines
}

pub fn print_check_output(coverage: &[LocaleCoverage], slugs: usize, icons: usize) {
    print_lines(format_check_output(coverage, slugs, icons));
}
