//! Comment capture.
//!
//! The tokenizer drops comments, so they are recovered from the raw source
//! lines using token positions: full-line comments and blank lines between
//! two tokens belong to the entry that follows them, and an end-of-line
//! comment belongs to the node written on that line.
//!
//! Line numbers are 1-based, matching the tokenizer's markers.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    Comment,
    Content,
}

pub(crate) struct SourceLines<'a> {
    lines: Vec<&'a str>,
    /// Highest line already accounted for by a token or a block scalar.
    cursor: usize,
    inline_taken: HashSet<usize>,
}

impl<'a> SourceLines<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            lines: source
                .lines()
                .map(|l| l.strip_suffix('\r').unwrap_or(l))
                .collect(),
            cursor: 0,
            inline_taken: HashSet::new(),
        }
    }

    fn raw(&self, line: usize) -> Option<&'a str> {
        line.checked_sub(1).and_then(|i| self.lines.get(i)).copied()
    }

    fn kind(&self, line: usize) -> LineKind {
        match self.raw(line).map(str::trim_start) {
            None | Some("") => LineKind::Blank,
            Some(l) if l.starts_with('#') => LineKind::Comment,
            Some(_) => LineKind::Content,
        }
    }

    /// Indentation of `line`. For an entry that starts its line this is the
    /// column of its key or dash.
    pub(crate) fn indent(&self, line: usize) -> usize {
        self.raw(line).map_or(0, indent_of)
    }

    /// Mark `line` as consumed by a token.
    pub(crate) fn touch(&mut self, line: usize) {
        self.cursor = self.cursor.max(line);
    }

    /// Comment and blank lines directly above `line` that no earlier token
    /// has claimed, in source order. Consumes them.
    pub(crate) fn leading(&mut self, line: usize) -> Vec<String> {
        let mut collected = Vec::new();
        let mut current = line.saturating_sub(1);
        while current > self.cursor && self.kind(current) != LineKind::Content {
            collected.push(self.raw(current).unwrap_or("").trim_end().to_string());
            current -= 1;
        }
        collected.reverse();
        self.touch(line);
        collected
    }

    /// Comment and blank lines after the last token of the document.
    pub(crate) fn trailing(&mut self) -> Vec<String> {
        let mut lines = self.leading(self.lines.len() + 1);
        // A final blank line is the file's own trailing newline handling.
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines
    }

    /// End-of-line comment on `line`, including the whitespace before `#`.
    /// Each line's comment is handed out once.
    pub(crate) fn inline_comment(&mut self, line: usize) -> Option<String> {
        if self.inline_taken.contains(&line) {
            return None;
        }
        let raw = self.raw(line)?;
        let start = comment_start(raw)?;
        self.inline_taken.insert(line);
        Some(raw[start..].trim_end().to_string())
    }

    /// Claim the content lines of a block scalar whose header (`|` or `>`)
    /// sits on `header`, so comment-looking lines inside it stay content.
    pub(crate) fn skip_block_scalar(&mut self, header: usize) {
        let first = (header + 1..=self.lines.len()).find(|&l| self.kind(l) != LineKind::Blank);
        let Some(first) = first else {
            return;
        };
        let content_indent = indent_of(self.raw(first).unwrap_or(""));
        if content_indent <= indent_of(self.raw(header).unwrap_or("")) {
            // Empty block scalar: the next line already belongs to the parent.
            return;
        }

        let mut last = header;
        for line in first..=self.lines.len() {
            match self.kind(line) {
                LineKind::Blank => continue,
                _ if indent_of(self.raw(line).unwrap_or("")) >= content_indent => last = line,
                _ => break,
            }
        }
        self.touch(last);
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Byte offset where an end-of-line comment's leading whitespace begins.
///
/// A `#` starts a comment only when preceded by whitespace and outside
/// quotes. Quotes open only at the start of a scalar, so apostrophes inside
/// plain text are ignored.
fn comment_start(line: &str) -> Option<usize> {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    for (i, c) in line.char_indices() {
        if in_double {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_double = false;
            }
        } else if in_single {
            if c == '\'' {
                in_single = false;
            }
        } else {
            let opens = prev.is_none_or(|p| p.is_whitespace() || "[{,:-?".contains(p));
            match c {
                '#' if prev.is_some_and(char::is_whitespace) => {
                    let start = line[..i].trim_end_matches([' ', '\t']).len();
                    return Some(start);
                }
                '"' if opens => in_double = true,
                '\'' if opens => in_single = true,
                _ => {}
            }
        }
        prev = Some(c);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_start_plain() {
        assert_eq!(comment_start("key: value  # note"), Some(10));
        assert_eq!(comment_start("key: value"), None);
    }

    #[test]
    fn test_comment_start_ignores_hash_inside_quotes() {
        assert_eq!(comment_start(r#"key: "a # b""#), None);
        assert_eq!(comment_start("key: 'a # b' # real"), Some(12));
        assert_eq!(comment_start(r##"key: "say \"#\"" # c"##), Some(16));
    }

    #[test]
    fn test_comment_start_ignores_hash_without_space() {
        assert_eq!(comment_start("color: red#1"), None);
    }

    #[test]
    fn test_comment_start_apostrophe_in_plain_text() {
        assert_eq!(comment_start("name: don't # x"), Some(11));
    }

    #[test]
    fn test_leading_collects_comments_and_blank_lines() {
        let source = "a: 1\n\n# about b\nb: 2\n";
        let mut lines = SourceLines::new(source);
        lines.touch(1);
        assert_eq!(lines.leading(4), vec!["", "# about b"]);
        assert!(lines.leading(4).is_empty());
    }

    #[test]
    fn test_leading_stops_at_content() {
        let source = "a: one\n  two\n# c\nb: 2\n";
        let mut lines = SourceLines::new(source);
        lines.touch(1);
        assert_eq!(lines.leading(4), vec!["# c"]);
    }

    #[test]
    fn test_inline_comment_handed_out_once() {
        let mut lines = SourceLines::new("a: 1  # one\n");
        assert_eq!(lines.inline_comment(1).as_deref(), Some("  # one"));
        assert_eq!(lines.inline_comment(1), None);
    }

    #[test]
    fn test_block_scalar_lines_are_not_comments() {
        let source = "s: |\n  echo\n  # not a comment\n# real\nn: 1\n";
        let mut lines = SourceLines::new(source);
        lines.touch(1);
        lines.skip_block_scalar(1);
        assert_eq!(lines.leading(5), vec!["# real"]);
    }

    #[test]
    fn test_trailing_drops_final_blank_lines() {
        let mut lines = SourceLines::new("a: 1\n# end\n\n");
        lines.touch(1);
        assert_eq!(lines.trailing(), vec!["# end"]);
    }
}
