//! Parsing of free-text `Topic | Subtopic` answers.
//!
//! Language models do not format answers consistently, so several shapes
//! are accepted. Each shape is searched anywhere in the answer, in a fixed
//! order, and the first match wins:
//!
//! 1. `[Topic] | [Subtopic]`
//! 2. `"Topic" | "Subtopic"`
//! 3. `Topic | Subtopic` (first `|`, both sides trimmed)
//! 4. `Output: "Topic" | "Subtopic"` (marker case-insensitive)

use std::sync::LazyLock;

use regex::Regex;
use seo_types::TopicLabel;

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\[[^\]]+\])\s*\|\s*(\[[^\]]+\])").expect("valid bracketed label pattern")
});

static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"]+)"\s*\|\s*"([^"]+)""#).expect("valid quoted label pattern")
});

static PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^|]+)\s*\|\s*([^|]+)").expect("valid plain label pattern"));

static OUTPUT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)Output:\s*"([^"]+)"\s*\|\s*"([^"]+)""#).expect("valid output label pattern")
});

/// Parse a labeling answer into a [`TopicLabel`].
///
/// Returns `(None, None)` when no shape matches. A side that is blank
/// after trimming is `None`. Pure: equal input gives equal output.
pub fn parse_label(response: &str) -> TopicLabel {
    if let Some(caps) = BRACKETED.captures(response) {
        return label_from(strip_brackets(&caps[1]), strip_brackets(&caps[2]));
    }

    let shapes: [&LazyLock<Regex>; 3] = [&QUOTED, &PLAIN, &OUTPUT_MARKER];
    for shape in shapes {
        if let Some(caps) = shape.captures(response) {
            return label_from(&caps[1], &caps[2]);
        }
    }

    TopicLabel::none()
}

fn strip_brackets(side: &str) -> &str {
    side.trim_matches(|c| c == '[' || c == ']')
}

// Trims every shape, so padding inside brackets or quotes is dropped too.
fn label_from(topic: &str, subtopic: &str) -> TopicLabel {
    TopicLabel {
        topic: non_blank(topic),
        subtopic: non_blank(subtopic),
    }
}

fn non_blank(side: &str) -> Option<String> {
    let trimmed = side.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
