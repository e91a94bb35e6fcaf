//! Front-matter extraction.
//!
//! Documents may start with a `---` fenced block of YAML `key: value` lines:
//!
//! ```text
//! ---
//! title: Ticket system
//! description: Commands related to the ticket system
//! icon: ticket
//! ---
//!
//! ## Setup
//! ```
//!
//! Only `title`, `description`, and `icon` are read; other keys are ignored.
//! A document without a block has empty front-matter and its whole text is the
//! body.

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("Front-matter block is not closed")]
    Unterminated,
    #[error("Invalid front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrontMatter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A parsed document: metadata plus the markdown body that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Split and parse a document's front-matter block.
pub fn parse(source: &str) -> Result<ParsedDocument, FrontMatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some((yaml, body)) = split(source)? else {
        return Ok(ParsedDocument {
            front_matter: FrontMatter::default(),
            body: source.to_string(),
        });
    };

    let front_matter = if yaml.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    Ok(ParsedDocument {
        front_matter,
        body: body.to_string(),
    })
}

/// Return `(yaml, body)` when the source opens with a `---` line.
fn split(source: &str) -> Result<Option<(&str, &str)>, FrontMatterError> {
    let mut lines = source.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if first.trim_end() != "---" {
        return Ok(None);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == "---" {
            let yaml = &source[yaml_start..offset];
            let body = &source[offset + line.len()..];
            return Ok(Some((yaml, body.trim_start_matches(['\r', '\n']))));
        }
        offset += line.len();
    }
    Err(FrontMatterError::Unterminated)
}

/// First `# ` heading of a markdown body, used as a title fallback.
pub fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
        .filter(|title| !title.is_empty())
}
