use std::sync::LazyLock;

use regex::Regex;

static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^第[一二三四五六七八九十0-9]+[章节页]").unwrap());

/// Lines must be longer than this (in characters) to count as content.
const MIN_CHARS: usize = 10;
/// Strict mode drops anything this short before the content checks.
const PRE_FILTER_CHARS: usize = 5;
/// Strict mode drops paragraphs this long or longer.
const MAX_CHARS: usize = 200;
/// Strict mode keeps at most this many lines.
const MAX_LINES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Length check only.
    Simple,
    /// Length bounds, no page numbers or chapter headings, capped count.
    Strict,
}

/// Split raw text into trimmed candidate lines, in source order.
pub fn candidate_lines(raw: &str, mode: FilterMode) -> Vec<String> {
    let lines = raw.lines().map(str::trim);
    match mode {
        FilterMode::Simple => lines
            .filter(|l| char_len(l) > MIN_CHARS)
            .map(str::to_string)
            .collect(),
        FilterMode::Strict => lines
            .filter(|l| char_len(l) > PRE_FILTER_CHARS)
            .filter(|l| is_meaningful(l))
            .take(MAX_LINES)
            .map(str::to_string)
            .collect(),
    }
}

fn is_meaningful(line: &str) -> bool {
    let len = char_len(line);
    !NUMERIC_RE.is_match(line) && !HEADING_RE.is_match(line) && len > MIN_CHARS && len < MAX_CHARS
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
