//! Serializer for the document tree.
//!
//! The layout is fixed: mappings indent by 2, sequences by 4 with the dash
//! offset by 2.
//!
//! ```yaml
//! modem:
//!   port: /dev/insteon
//! devices:
//!   - dimmer: aa.bb.cc
//!     name: hall
//! ```
//!
//! Scalar styles, anchors, tags, aliases and comments are written back as
//! they were loaded. A scalar that can no longer be written in its original
//! style (e.g. a plain scalar edited to contain `: `) falls back to double
//! quotes.

use super::Document;
use super::node::{Leading, Mapping, Node, Scalar, ScalarStyle, Sequence, Value};

const MAPPING_INDENT: usize = 2;
const SEQUENCE_INDENT: usize = 4;
const SEQUENCE_DASH_OFFSET: usize = 2;

pub(crate) fn emit(document: &Document) -> String {
    let mut emitter = Emitter::default();

    if document.explicit_start {
        for line in &document.header {
            emitter.out.push_str(line);
            emitter.out.push('\n');
        }
        emitter.out.push_str("---");
        if let Some(comment) = &document.start_comment {
            emitter.out.push_str(comment);
        }
        emitter.out.push('\n');
    }
    if let Some(root) = &document.root {
        emitter.root(root);
    }
    for line in &document.trailing {
        emitter.out.push_str(line);
        emitter.out.push('\n');
    }

    emitter.out
}

#[derive(Default)]
struct Emitter {
    out: String,
}

impl Emitter {
    fn root(&mut self, node: &Node) {
        if node.alias.is_some() || !node.is_block_collection() {
            self.inline(node, MAPPING_INDENT, "");
            return;
        }

        let props = properties(node);
        if !props.is_empty() || node.comment.is_some() {
            self.out.push_str(&props);
            self.comment(node);
            self.out.push('\n');
        }
        self.children(node, 0, SEQUENCE_DASH_OFFSET);
    }

    fn children(&mut self, node: &Node, mapping_indent: usize, dash: usize) {
        match &node.value {
            Value::Mapping(m) => self.mapping(m, mapping_indent, false),
            Value::Sequence(s) => self.sequence(s, dash, false),
            Value::Scalar(_) => {}
        }
    }

    fn mapping(&mut self, mapping: &Mapping, indent: usize, inline_first: bool) {
        for (i, entry) in mapping.entries.iter().enumerate() {
            if i > 0 || !inline_first {
                self.leading(&entry.leading, indent);
                self.pad(indent);
            }
            self.out.push_str(&key_text(&entry.key));
            self.out.push(':');
            self.mapping_value(&entry.value, indent);
        }
    }

    fn mapping_value(&mut self, node: &Node, indent: usize) {
        if node.alias.is_none() && node.is_block_collection() {
            self.block_header(node, " ");
            self.children(
                node,
                indent + MAPPING_INDENT,
                indent + SEQUENCE_DASH_OFFSET,
            );
        } else {
            self.inline(node, indent + MAPPING_INDENT, " ");
        }
    }

    fn sequence(&mut self, sequence: &Sequence, dash: usize, inline_first: bool) {
        for (i, item) in sequence.items.iter().enumerate() {
            if i > 0 || !inline_first {
                self.leading(&item.leading, dash);
                if compact(&item.node)
                    && let Some(first) = first_leading(&item.node)
                {
                    self.leading(first, dash);
                }
                self.pad(dash);
            }
            self.out.push('-');
            self.sequence_item(&item.node, dash);
        }
    }

    fn sequence_item(&mut self, node: &Node, dash: usize) {
        let content = dash + SEQUENCE_INDENT - SEQUENCE_DASH_OFFSET;

        if compact(node) {
            // `- key: value` / `- - item`: the first child shares the dash line.
            self.out.push(' ');
            match &node.value {
                Value::Mapping(m) => self.mapping(m, content, true),
                Value::Sequence(s) => self.sequence(s, content, true),
                Value::Scalar(_) => {}
            }
        } else if node.alias.is_none() && node.is_block_collection() {
            self.block_header(node, " ");
            self.children(node, content, content);
        } else {
            self.inline(node, content, " ");
        }
    }

    /// Rest of the line that introduces a block collection.
    fn block_header(&mut self, node: &Node, sep: &str) {
        let props = properties(node);
        if !props.is_empty() {
            self.out.push_str(sep);
            self.out.push_str(&props);
        }
        self.comment(node);
        self.out.push('\n');
    }

    /// A node that fits on the current line, or a block scalar whose body
    /// follows at `block_indent`.
    fn inline(&mut self, node: &Node, block_indent: usize, sep: &str) {
        let mut text = String::new();

        if let Some(alias) = &node.alias {
            text = format!("*{}", alias);
        } else {
            text.push_str(&properties(node));
            if let Value::Scalar(scalar) = &node.value
                && block_scalar_fits(scalar)
            {
                push_word(&mut text, &block_scalar_header(scalar));
                self.out.push_str(sep);
                self.out.push_str(&text);
                self.comment(node);
                self.out.push('\n');
                self.block_scalar_body(scalar, block_indent);
                return;
            }
            push_word(&mut text, &value_text(&node.value, false));
        }

        if !text.is_empty() {
            self.out.push_str(sep);
            self.out.push_str(&text);
        }
        self.comment(node);
        self.out.push('\n');
    }

    fn block_scalar_body(&mut self, scalar: &Scalar, indent: usize) {
        let body = scalar.text.trim_end_matches('\n');
        let trailing_newlines = scalar.text.len() - body.len();

        if !body.is_empty() {
            for (i, line) in body.split('\n').enumerate() {
                if scalar.style == ScalarStyle::Folded && i > 0 {
                    // A single line break survives folding only as an empty line.
                    self.out.push('\n');
                }
                if !line.is_empty() {
                    self.pad(indent);
                    self.out.push_str(line);
                }
                self.out.push('\n');
            }
        }
        for _ in 1..trailing_newlines {
            self.out.push('\n');
        }
    }

    fn leading(&mut self, leading: &Leading, indent: usize) {
        for line in &leading.lines {
            let text = line.trim_start();
            if text.is_empty() {
                self.out.push('\n');
                continue;
            }
            let original = line.len() - text.len();
            self.pad((original + indent).saturating_sub(leading.column));
            self.out.push_str(text);
            self.out.push('\n');
        }
    }

    fn comment(&mut self, node: &Node) {
        if let Some(comment) = &node.comment {
            self.out.push_str(comment);
        }
    }

    fn pad(&mut self, width: usize) {
        self.out.extend(std::iter::repeat_n(' ', width));
    }
}

/// A block collection that starts on its parent's dash line.
fn compact(node: &Node) -> bool {
    node.alias.is_none()
        && node.anchor.is_none()
        && node.tag.is_none()
        && node.comment.is_none()
        && node.is_block_collection()
}

/// Comments above the first child of a compact collection; they are written
/// above the dash instead.
fn first_leading(node: &Node) -> Option<&Leading> {
    match &node.value {
        Value::Mapping(m) => m.entries.first().map(|e| &e.leading),
        Value::Sequence(s) => s.items.first().map(|i| &i.leading),
        Value::Scalar(_) => None,
    }
}

fn properties(node: &Node) -> String {
    let mut text = String::new();
    if let Some(anchor) = &node.anchor {
        text.push('&');
        text.push_str(anchor);
    }
    if let Some(tag) = &node.tag {
        push_word(&mut text, tag);
    }
    text
}

fn push_word(buf: &mut String, word: &str) {
    if word.is_empty() {
        return;
    }
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(word);
}

fn key_text(key: &Node) -> String {
    if let Some(alias) = &key.alias {
        // `*a:` would read as an alias named `a:`.
        return format!("*{} ", alias);
    }
    let mut text = properties(key);
    let body = match &key.value {
        Value::Scalar(s) if s.style == ScalarStyle::Plain && s.text.is_empty() => "~".to_string(),
        value => value_text(value, false),
    };
    push_word(&mut text, &body);
    text
}

/// Single-line text of a value. Collections are written in flow style.
fn value_text(value: &Value, in_flow: bool) -> String {
    match value {
        Value::Scalar(s) => scalar_text(s, in_flow),
        Value::Sequence(seq) => {
            let items: Vec<String> = seq.iter().map(flow_item).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(m) => {
            let entries: Vec<String> = m
                .entries
                .iter()
                .map(|e| {
                    let key = flow_item(&e.key);
                    let value = flow_node(&e.value);
                    if value.is_empty() {
                        key
                    } else {
                        format!("{}: {}", key, value)
                    }
                })
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

fn flow_node(node: &Node) -> String {
    if let Some(alias) = &node.alias {
        return format!("*{}", alias);
    }
    let mut text = properties(node);
    push_word(&mut text, &value_text(&node.value, true));
    text
}

/// A flow node that must not be empty (an empty entry would read as a
/// missing one).
fn flow_item(node: &Node) -> String {
    let text = flow_node(node);
    if text.is_empty() { "~".to_string() } else { text }
}

fn scalar_text(scalar: &Scalar, in_flow: bool) -> String {
    let text = scalar.text.as_str();
    match scalar.style {
        ScalarStyle::Plain if text.is_empty() || is_plain_safe(text, in_flow) => text.to_string(),
        ScalarStyle::SingleQuoted if !text.chars().any(char::is_control) => {
            format!("'{}'", text.replace('\'', "''"))
        }
        _ => double_quoted(text),
    }
}

fn double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Whether `text` reads back unchanged as a plain scalar.
pub(crate) fn is_plain_safe(text: &str, in_flow: bool) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    if text.starts_with([' ', '\t']) || text.ends_with([' ', '\t']) {
        return false;
    }
    if text.chars().any(char::is_control) {
        return false;
    }
    if "#,[]{}&*!|>'\"%@`".contains(first) {
        return false;
    }
    if matches!(first, '-' | '?' | ':') && text[1..].chars().next().is_none_or(|c| c == ' ') {
        return false;
    }
    if text.starts_with("---") || text.starts_with("...") {
        return false;
    }
    if text.contains(": ") || text.contains(" #") || text.ends_with(':') {
        return false;
    }
    !(in_flow && text.contains([',', '[', ']', '{', '}']))
}

/// Whether a literal or folded scalar can be written back as a block.
fn block_scalar_fits(scalar: &Scalar) -> bool {
    if !scalar.style.is_block() {
        return false;
    }
    let body = scalar.text.trim_end_matches('\n');
    // A first line starting with a space would need an indentation indicator.
    if body
        .split('\n')
        .find(|l| !l.is_empty())
        .is_some_and(|l| l.starts_with([' ', '\t']))
    {
        return false;
    }
    if body.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        return false;
    }
    if scalar.style == ScalarStyle::Folded {
        // Only simple paragraphs round-trip through folding.
        return !body.contains("\n\n")
            && !body
                .split('\n')
                .any(|l| l.starts_with([' ', '\t']) || l.ends_with(' '));
    }
    true
}

fn block_scalar_header(scalar: &Scalar) -> String {
    let indicator = if scalar.style == ScalarStyle::Literal { '|' } else { '>' };
    let body = scalar.text.trim_end_matches('\n');
    let chomping = match scalar.text.len() - body.len() {
        0 => "-",
        1 if !body.is_empty() => "",
        _ => "+",
    };
    format!("{}{}", indicator, chomping)
}
