//! Card geometry and word wrapping.
//!
//! ```text
//! ┌──────────────────────────────────────────── 1200 ─┐
//! │  ┌──────┐                                          │
//! │  │ logo │  (70,70) 140×140                         │
//! │  └──────┘                                          │
//! │  ┌──────────────── card (80,230) 1040×260 ──────┐  │ 630
//! │  │ Title, bold 56px, 70px lines                 │  │
//! │  │ Description, 28px, 36px lines                │  │
//! │  └──────────────────────────────────────────────┘  │
//! │  ────                                   [ BADGE ]  │
//! └────────────────────────────────────────────────────┘
//! ```

use super::text::{TextRenderer, TextStyle};

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 630;
pub const PADDING: f32 = 80.0;
pub const LOGO_SIZE: u32 = 120;

pub const LOGO_CONTAINER_INSET: f32 = 10.0;
pub const LOGO_CONTAINER_RADIUS: f32 = 20.0;

pub const CARD_X: f32 = PADDING;
pub const CARD_Y: f32 = PADDING + LOGO_SIZE as f32 + 30.0;
pub const CARD_WIDTH: f32 = WIDTH as f32 - PADDING * 2.0;
pub const CARD_HEIGHT: f32 = HEIGHT as f32 - CARD_Y - PADDING - 60.0;
pub const CARD_RADIUS: f32 = 24.0;

pub const TEXT_PADDING: f32 = 40.0;
pub const TEXT_X: f32 = CARD_X + TEXT_PADDING;
pub const TEXT_MAX_WIDTH: f32 = CARD_WIDTH - TEXT_PADDING * 2.0;

pub const TITLE_STYLE: TextStyle = TextStyle::bold(56.0);
pub const TITLE_BASELINE: f32 = CARD_Y + TEXT_PADDING + 60.0;
pub const TITLE_LINE_HEIGHT: f32 = 70.0;
pub const DESCRIPTION_STYLE: TextStyle = TextStyle::regular(28.0);
pub const DESCRIPTION_GAP: f32 = 30.0;
pub const DESCRIPTION_LINE_HEIGHT: f32 = 36.0;

pub const FALLBACK_LOGO_STYLE: TextStyle = TextStyle::bold(60.0);

pub const BADGE_STYLE: TextStyle = TextStyle::bold(18.0);
pub const BADGE_PADDING: f32 = 24.0;
pub const BADGE_HEIGHT: f32 = 50.0;
pub const BADGE_RADIUS: f32 = 25.0;
pub const BADGE_TEXT_OFFSET: f32 = 32.0;

pub const ACCENT_Y: f32 = HEIGHT as f32 - 20.0;
pub const ACCENT_LENGTH: f32 = 100.0;
pub const ACCENT_WIDTH: f32 = 4.0;

pub const SPECKLES: usize = 50;

/// Break `text` into lines no wider than `max_width`.
///
/// Words (split on single spaces) accumulate as `word + " "`; the line is
/// flushed when the measured candidate exceeds `max_width` and the word is
/// not the first of the text. A single over-long word therefore stays on
/// its own line rather than being split.
pub fn wrap_words(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut line = String::new();
    for (i, word) in text.split(' ').enumerate() {
        let candidate = format!("{line}{word} ");
        if measure(&candidate) > max_width && i > 0 {
            lines.push(line.trim_end().to_string());
            line = format!("{word} ");
        } else {
            line = candidate;
        }
    }
    lines.push(line.trim_end().to_string());
    lines
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub baseline: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub text_x: f32,
    pub baseline: f32,
}

/// Where every piece of text on a card goes.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    pub title: Vec<TextLine>,
    pub description: Vec<TextLine>,
    pub badge: Badge,
}

pub fn layout_card(
    title: &str,
    description: &str,
    badge_label: &str,
    renderer: &dyn TextRenderer,
) -> CardLayout {
    let mut y = TITLE_BASELINE;
    let mut title_lines = Vec::new();
    for (i, text) in wrap_words(title, TEXT_MAX_WIDTH, |s| renderer.measure(s, TITLE_STYLE))
        .into_iter()
        .enumerate()
    {
        if i > 0 {
            y += TITLE_LINE_HEIGHT;
        }
        title_lines.push(TextLine { text, baseline: y });
    }

    let mut description_lines = Vec::new();
    let wrapped = wrap_words(description, TEXT_MAX_WIDTH, |s| {
        renderer.measure(s, DESCRIPTION_STYLE)
    });
    if !wrapped.is_empty() {
        y += TITLE_LINE_HEIGHT + DESCRIPTION_GAP;
        for (i, text) in wrapped.into_iter().enumerate() {
            if i > 0 {
                y += DESCRIPTION_LINE_HEIGHT;
            }
            description_lines.push(TextLine { text, baseline: y });
        }
    }

    let text_width = renderer.measure(badge_label, BADGE_STYLE);
    let width = text_width + BADGE_PADDING * 2.0;
    let x = WIDTH as f32 - width - PADDING;
    let badge_y = HEIGHT as f32 - BADGE_HEIGHT - PADDING;
    CardLayout {
        title: title_lines,
        description: description_lines,
        badge: Badge {
            label: badge_label.to_string(),
            x,
            y: badge_y,
            width,
            text_x: x + BADGE_PADDING,
            baseline: badge_y + BADGE_TEXT_OFFSET,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::og::text::BlockRenderer;

    /// One unit per character.
    fn chars(s: &str) -> f32 {
        s.chars().count() as f32
    }

    #[test]
    fn geometry_constants() {
        assert_eq!(CARD_Y, 230.0);
        assert_eq!(CARD_HEIGHT, 260.0);
        assert_eq!(CARD_WIDTH, 1040.0);
        assert_eq!(TEXT_MAX_WIDTH, 960.0);
        assert_eq!(TITLE_BASELINE, 330.0);
    }

    #[test]
    fn wrap_flushes_when_candidate_overflows() {
        // "aaa bbb " is 8 wide, over the limit of 7
        assert_eq!(wrap_words("aaa bbb ccc", 7.0, chars), vec!["aaa", "bbb", "ccc"]);
        assert_eq!(wrap_words("aaa bbb ccc", 8.0, chars), vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn first_word_never_flushes() {
        assert_eq!(wrap_words("enormousword x", 3.0, chars), vec!["enormousword", "x"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_words("", 100.0, chars).is_empty());
        assert!(wrap_words("   ", 100.0, chars).is_empty());
    }

    #[test]
    fn short_title_single_line_and_description_offset() {
        let layout = layout_card("Welcome", "Say hi", "ARTICLE", &BlockRenderer);
        assert_eq!(layout.title.len(), 1);
        assert_eq!(layout.title[0].baseline, 330.0);
        assert_eq!(layout.description[0].baseline, 330.0 + 100.0);
    }

    #[test]
    fn long_title_wraps_and_pushes_description() {
        let title = "A very long documentation title that certainly will not fit on one line";
        let layout = layout_card(title, "desc", "ARTICLE", &BlockRenderer);
        let n = layout.title.len();
        assert!(n >= 2);
        assert_eq!(layout.title[1].baseline, 400.0);
        let last = layout.title[n - 1].baseline;
        assert_eq!(layout.description[0].baseline, last + 100.0);
    }

    #[test]
    fn no_description_no_lines() {
        let layout = layout_card("Title", "", "WEBSITE", &BlockRenderer);
        assert!(layout.description.is_empty());
    }

    #[test]
    fn badge_is_right_aligned() {
        let layout = layout_card("T", "", "ARTICLE", &BlockRenderer);
        let b = &layout.badge;
        assert!((b.x + b.width - 1120.0).abs() < 1e-3);
        assert_eq!(b.y, 500.0);
        assert_eq!(b.baseline, 532.0);
        assert_eq!(b.text_x, b.x + 24.0);
    }
}
