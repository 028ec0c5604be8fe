//! Plain-text normalization for extracted page content.
//!
//! Extracted text runs through a fixed sequence of passes, each a function
//! `&str -> String`: blank-line collapse, space collapse, short-line
//! (menu/navigation) removal, and a size cap. Normalization never fails;
//! empty or whitespace-only input yields an empty string.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

/// Size cap for text extracted from page markup.
pub const PAGE_BODY_LIMIT: usize = 12_000;

/// Size cap for remote-render service output.
pub const REMOTE_RENDER_LIMIT: usize = 15_000;

/// Lines with this many characters or fewer (after trimming) are dropped.
pub const MAX_NOISE_LINE_CHARS: usize = 10;

/// Appended when the cap cuts the text.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Normalize page-body text with the default [`PAGE_BODY_LIMIT`].
pub fn normalize(raw: &str) -> String {
    normalize_with_limit(raw, PAGE_BODY_LIMIT)
}

/// Normalize text, capping the result at `limit` characters plus the marker.
pub fn normalize_with_limit(raw: &str, limit: usize) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let mut result = collapse_blank_lines(raw);
    result = collapse_spaces(&result);
    result = drop_noise_lines(&result);
    result = truncate_chars(&result, limit);

    trace!(
        raw_chars = char_count(raw),
        cleaned_chars = char_count(&result),
        "normalized text"
    );

    result.trim().to_string()
}

/// Character (not byte) length, the unit every size rule is expressed in.
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

// ---------------------------------------------------------------------------
// Pass 1: Collapse blank-line runs
// ---------------------------------------------------------------------------

/// Collapse any run of blank (or whitespace-only) lines to a single blank line.
fn collapse_blank_lines(text: &str) -> String {
    static BLANK_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

    BLANK_RUN_RE.replace_all(text, "\n\n").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 2: Collapse space runs
// ---------------------------------------------------------------------------

fn collapse_spaces(text: &str) -> String {
    static SPACE_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r" +").expect("valid regex"));

    SPACE_RUN_RE.replace_all(text, " ").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 3: Drop navigation/menu noise
// ---------------------------------------------------------------------------

/// Keep only trimmed lines longer than [`MAX_NOISE_LINE_CHARS`].
fn drop_noise_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| char_count(line) > MAX_NOISE_LINE_CHARS)
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Pass 4: Size cap
// ---------------------------------------------------------------------------

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_idx]),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_yield_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t \n  "), "");
    }

    #[test]
    fn collapse_blank_lines_merges_runs() {
        let input = "Line one\n\n   \n\n\nLine two";
        assert_eq!(collapse_blank_lines(input), "Line one\n\nLine two");
    }

    #[test]
    fn collapse_spaces_merges_runs() {
        assert_eq!(collapse_spaces("a    b  c"), "a b c");
    }

    #[test]
    fn short_lines_are_dropped() {
        let input = "Home\nAbout us\nThis paragraph has real content.\n   Contact  \n";
        assert_eq!(drop_noise_lines(input), "This paragraph has real content.");
    }

    #[test]
    fn eleven_char_line_survives_ten_char_line_does_not() {
        let input = "0123456789\n0123456789A";
        assert_eq!(drop_noise_lines(input), "0123456789A");
    }

    #[test]
    fn normalize_removes_blank_lines_and_indentation() {
        let input = "\n\n   The first real sentence here.\n\n\n\n  Menu\n\tThe second    real sentence.   \n";
        assert_eq!(
            normalize(input),
            "The first real sentence here.\nThe second real sentence."
        );
    }

    #[test]
    fn normalize_caps_page_body() {
        let line = "x".repeat(99);
        let input = vec![line.as_str(); 200].join("\n");
        let result = normalize(&input);
        assert!(result.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            char_count(&result),
            PAGE_BODY_LIMIT + char_count(TRUNCATION_MARKER)
        );
    }

    #[test]
    fn remote_limit_is_larger() {
        let line = "y".repeat(99);
        let input = vec![line.as_str(); 140].join("\n");
        // 140 * 100 - 1 = 13_999 chars: over the page cap, under the remote cap.
        assert!(normalize(&input).ends_with(TRUNCATION_MARKER));
        assert!(!normalize_with_limit(&input, REMOTE_RENDER_LIMIT).ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let input = "ção".repeat(10);
        let result = truncate_chars(&input, 4);
        assert_eq!(result, format!("çãoç{TRUNCATION_MARKER}"));
    }

    #[test]
    fn under_limit_is_untouched() {
        assert_eq!(truncate_chars("short text", 100), "short text");
    }

    #[test]
    fn char_count_is_not_byte_len() {
        assert_eq!(char_count("análise"), 7);
        assert_eq!("análise".len(), 8);
    }
}
