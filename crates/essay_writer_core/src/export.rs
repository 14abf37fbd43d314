//! crates/essay_writer_core/src/export.rs
//!
//! Plain-text rendering of an essay for download.

use crate::domain::EssayParagraph;
use regex::Regex;
use std::sync::LazyLock;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[^a-z0-9]").expect("static regex is valid"));

/// Heading, blank line, content; paragraphs separated by two blank lines.
pub fn format_essay_text(essay: &[EssayParagraph]) -> String {
    essay
        .iter()
        .map(|p| format!("{}\n\n{}", p.heading, p.content))
        .collect::<Vec<_>>()
        .join("\n\n\n")
}

/// `<sanitized topic>_essay.txt`, with every non-alphanumeric character replaced by `_`.
pub fn download_file_name(topic: &str) -> String {
    let safe_topic = UNSAFE_FILENAME_CHARS.replace_all(topic, "_").to_lowercase();
    format!("{safe_topic}_essay.txt")
}
