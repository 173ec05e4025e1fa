//! Decides how a two-field name is broken into lines.
//!
//! The break between first and last name is always kept. Beyond that, a field
//! made of several long words may be split one word per line, and very short
//! names are set on a single line.

/// Names shorter than this (first + space + last) are set on one line.
const SINGLE_LINE_MAX_LEN: usize = 6;

/// Fields whose lengths differ by less than this are always set as two lines.
const BALANCE_TOLERANCE: usize = 3;

/// A field is only split if every word has at least this many characters.
const MIN_SPLIT_WORD_LEN: usize = 4;

pub const LINE_SEPARATOR: char = '\n';

/// The chosen arrangement of a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBreakResult {
    /// The lines joined by [`LINE_SEPARATOR`].
    pub text: String,

    /// Number of lines in `text`.
    pub line_count: usize,

    /// Whether the name deviates from the plain two-line layout and should be
    /// listed for manual review.
    pub is_exception: bool,
}

impl LineBreakResult {
    fn new(lines: Vec<&str>, is_exception: bool) -> LineBreakResult {
        let text = lines.join(&LINE_SEPARATOR.to_string());
        LineBreakResult {
            line_count: text.matches(LINE_SEPARATOR).count() + 1,
            text,
            is_exception,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split(LINE_SEPARATOR)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn words(field: &str) -> Vec<&str> {
    field.split(' ').collect()
}

fn splittable(words: &[&str]) -> bool {
    words.len() > 1 && words.iter().all(|w| char_len(w) >= MIN_SPLIT_WORD_LEN)
}

/// Picks the line arrangement for two normalized name fields.
pub fn break_name(line1: &str, line2: &str) -> LineBreakResult {
    let one_line = format!("{} {}", line1, line2);

    if char_len(&one_line) < SINGLE_LINE_MAX_LEN || line1.is_empty() || line2.is_empty() {
        return LineBreakResult::new(vec![one_line.trim()], true);
    }

    if char_len(line1).abs_diff(char_len(line2)) < BALANCE_TOLERANCE {
        return LineBreakResult::new(vec![line1, line2], false);
    }

    let line1_words = words(line1);
    let line2_words = words(line2);

    if splittable(&line1_words) {
        let mut lines = line1_words;
        if splittable(&line2_words) {
            lines.extend(line2_words);
        } else {
            lines.push(line2);
        }
        return LineBreakResult::new(lines, true);
    }

    if splittable(&line2_words) {
        let mut lines = vec![line1];
        lines.extend(line2_words);
        return LineBreakResult::new(lines, true);
    }

    LineBreakResult::new(vec![line1, line2], false)
}

/// Insertion-ordered set of exception names, reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExceptionLog {
    entries: Vec<String>,
}

impl ExceptionLog {
    pub fn new() -> ExceptionLog {
        ExceptionLog::default()
    }

    /// Records the result if it is an exception not seen before.
    pub fn record(&mut self, result: &LineBreakResult) {
        if result.is_exception && !self.entries.contains(&result.text) {
            self.entries.push(result.text.clone());
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
