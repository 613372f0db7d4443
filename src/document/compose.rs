//! Builds the document tree from the tokenizer's token stream.
//!
//! Composition is a recursive descent over block and flow collections.
//! Anchors and aliases are resolved by name against the load session, not
//! per file, so an alias may refer to an anchor defined in any file loaded
//! earlier in the same session. `!include` nodes are resolved the moment
//! they are composed, which keeps anchor definitions in document order.

use super::Document;
use super::lines::SourceLines;
use super::node::{Entry, Item, Leading, Mapping, Node, ScalarStyle, Sequence};
use crate::error::{ConfigError, Result};
use crate::include::{self, Directive, INCLUDE_TAG, Session};
use std::path::Path;
use std::str::Chars;
use yaml_rust2::scanner::{Marker, Scanner, TScalarStyle, Token, TokenType};

/// Token kinds the composer branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    StreamStart,
    StreamEnd,
    Directive,
    DocumentStart,
    DocumentEnd,
    BlockSequenceStart,
    BlockMappingStart,
    BlockEnd,
    FlowSequenceStart,
    FlowSequenceEnd,
    FlowMappingStart,
    FlowMappingEnd,
    BlockEntry,
    FlowEntry,
    Key,
    Value,
    Alias,
    Anchor,
    Tag,
    Scalar,
    Other,
}

impl Kind {
    fn of(token: &TokenType) -> Self {
        match token {
            TokenType::StreamStart(_) => Kind::StreamStart,
            TokenType::StreamEnd => Kind::StreamEnd,
            TokenType::VersionDirective(..) | TokenType::TagDirective(..) => Kind::Directive,
            TokenType::DocumentStart => Kind::DocumentStart,
            TokenType::DocumentEnd => Kind::DocumentEnd,
            TokenType::BlockSequenceStart => Kind::BlockSequenceStart,
            TokenType::BlockMappingStart => Kind::BlockMappingStart,
            TokenType::BlockEnd => Kind::BlockEnd,
            TokenType::FlowSequenceStart => Kind::FlowSequenceStart,
            TokenType::FlowSequenceEnd => Kind::FlowSequenceEnd,
            TokenType::FlowMappingStart => Kind::FlowMappingStart,
            TokenType::FlowMappingEnd => Kind::FlowMappingEnd,
            TokenType::BlockEntry => Kind::BlockEntry,
            TokenType::FlowEntry => Kind::FlowEntry,
            TokenType::Key => Kind::Key,
            TokenType::Value => Kind::Value,
            TokenType::Alias(_) => Kind::Alias,
            TokenType::Anchor(_) => Kind::Anchor,
            TokenType::Tag(..) => Kind::Tag,
            TokenType::Scalar(..) => Kind::Scalar,
            _ => Kind::Other,
        }
    }

    /// Tokens that can begin a node inside a flow collection.
    fn starts_flow_node(self) -> bool {
        matches!(
            self,
            Kind::Scalar
                | Kind::Alias
                | Kind::Anchor
                | Kind::Tag
                | Kind::FlowSequenceStart
                | Kind::FlowMappingStart
        )
    }
}

/// Where a node sits; decides whether it may own an end-of-line comment and
/// whether an indentless sequence may start here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Root,
    Key,
    MapValue,
    SeqItem,
    Flow,
}

impl Slot {
    fn takes_comment(self) -> bool {
        matches!(self, Slot::Root | Slot::MapValue | Slot::SeqItem)
    }
}

/// Compose the single document in `source`, read from `path`.
pub(crate) fn compose(source: &str, path: &Path, session: &mut Session) -> Result<Document> {
    Composer {
        scanner: Scanner::new(source.chars()),
        peeked: None,
        last: None,
        lines: SourceLines::new(source),
        path,
        session,
    }
    .document()
}

struct Composer<'a, 's> {
    scanner: Scanner<Chars<'a>>,
    peeked: Option<Token>,
    last: Option<Marker>,
    lines: SourceLines<'a>,
    path: &'a Path,
    session: &'s mut Session,
}

impl Composer<'_, '_> {
    fn document(mut self) -> Result<Document> {
        let mut document = Document::default();

        loop {
            match self.peek_kind()? {
                // StreamStart sits on line 1; claiming it would drop a header
                // comment there.
                Kind::StreamStart => {
                    self.next()?;
                }
                Kind::Directive => {
                    self.advance()?;
                }
                Kind::DocumentStart if !document.explicit_start => {
                    let mark = self.peek_mark()?;
                    document.header = self.lines.leading(mark.line());
                    self.advance()?;
                    document.explicit_start = true;
                    document.start_comment = self.lines.inline_comment(mark.line());
                }
                _ => break,
            }
        }

        document.root = match self.peek_kind()? {
            Kind::StreamEnd | Kind::DocumentStart | Kind::DocumentEnd => None,
            _ => Some(self.node(Slot::Root)?),
        };

        while self.peek_kind()? == Kind::DocumentEnd {
            self.advance()?;
        }
        if self.peek_kind()? != Kind::StreamEnd {
            let mark = self.peek_mark()?;
            return Err(self.error_at(
                mark,
                "expected a single document, found more content after its end",
            ));
        }

        document.trailing = self.lines.trailing();
        Ok(document)
    }

    fn node(&mut self, slot: Slot) -> Result<Node> {
        let start = self.peek_mark()?;
        let (anchor, tag) = self.properties()?;

        // Line an end-of-line comment would be on, when it is not the line of
        // the node's last token.
        let mut comment_line = None;

        let mut node = match self.peek_kind()? {
            Kind::Alias | Kind::Scalar => {
                // A block scalar token is marked on its first content line; its
                // `|`/`>` header shares the line of the token before it.
                let header = self.last.map_or(start.line(), |m| m.line());
                let Token(mark, token) = self.next()?;
                self.lines.touch(mark.line());
                match token {
                    TokenType::Alias(name) => {
                        if anchor.is_some() || tag.is_some() {
                            return Err(self.error_at(mark, "an alias cannot have an anchor or a tag"));
                        }
                        self.alias(name, mark)?
                    }
                    TokenType::Scalar(style, text) => {
                        let node = self.scalar(style, text, header);
                        if node.as_scalar().is_some_and(|s| s.style.is_block()) {
                            comment_line = Some(header);
                        }
                        node
                    }
                    _ => return Err(self.error_at(mark, "expected a scalar or an alias")),
                }
            }
            Kind::BlockMappingStart => self.block_mapping()?,
            Kind::BlockSequenceStart => self.block_sequence()?,
            Kind::BlockEntry if slot == Slot::MapValue => self.indentless_sequence()?,
            Kind::FlowSequenceStart => self.flow_sequence()?,
            Kind::FlowMappingStart => self.flow_mapping()?,
            // Empty node: `key:` with nothing after it, or bare properties.
            _ => Node::null(),
        };

        if slot.takes_comment() && !node.is_block_collection() && node.comment.is_none() {
            let line = comment_line.unwrap_or_else(|| self.last.map_or(start.line(), |m| m.line()));
            node.comment = self.lines.inline_comment(line);
        }

        if let Some(tag) = tag {
            if tag == INCLUDE_TAG {
                node = self.include(node, start)?;
            } else {
                node.tag = Some(tag);
            }
        }

        if let Some(anchor) = anchor {
            node.anchor = Some(anchor.clone());
            self.session.define_anchor(anchor, &node);
        }

        Ok(node)
    }

    /// Replace an `!include` node with the content it refers to.
    fn include(&mut self, directive: Node, start: Marker) -> Result<Node> {
        let parsed = Directive::from_node(&directive, self.path, start.line())?;
        let base_dir = self.path.parent().unwrap_or(Path::new(""));
        let mut resolved = include::resolve(parsed, base_dir, self.session)?;
        if resolved.comment.is_none() {
            resolved.comment = directive.comment;
        }
        Ok(resolved)
    }

    /// Anchor and tag, in either order.
    fn properties(&mut self) -> Result<(Option<String>, Option<String>)> {
        let mut anchor = None;
        let mut tag = None;
        loop {
            match self.peek_kind()? {
                Kind::Anchor if anchor.is_none() => {
                    if let Token(_, TokenType::Anchor(name)) = self.take()? {
                        anchor = Some(name);
                    }
                }
                Kind::Tag if tag.is_none() => {
                    if let Token(_, TokenType::Tag(handle, suffix)) = self.take()? {
                        tag = Some(tag_name(handle, suffix));
                    }
                }
                _ => return Ok((anchor, tag)),
            }
        }
    }

    fn alias(&self, name: String, mark: Marker) -> Result<Node> {
        match self.session.anchor(&name) {
            Some(target) => {
                let mut node = Node::new(target.value.clone());
                node.tag = target.tag.clone();
                node.alias = Some(name);
                Ok(node)
            }
            None => Err(self.error_at(mark, format!("found undefined alias '{}'", name))),
        }
    }

    /// `header` is the line holding the `|`/`>` indicator of a block scalar.
    fn scalar(&mut self, style: TScalarStyle, text: String, header: usize) -> Node {
        let style = match style {
            TScalarStyle::Plain => ScalarStyle::Plain,
            TScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
            TScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
            TScalarStyle::Literal => ScalarStyle::Literal,
            _ => ScalarStyle::Folded,
        };
        if style.is_block() {
            self.lines.skip_block_scalar(header);
        }
        Node::scalar(text, style)
    }

    fn block_mapping(&mut self) -> Result<Node> {
        // BlockMappingStart sits on the first key; leave its line unclaimed so
        // comments above that key still attach to it.
        self.next()?;
        let mut mapping = Mapping::new();

        loop {
            match self.peek_kind()? {
                Kind::Key => {
                    let Token(mark, _) = self.next()?;
                    let leading = self.leading(mark);
                    let key = self.node(Slot::Key)?;
                    let value = self.block_value(mark)?;
                    self.push_entry(&mut mapping, Entry { key, value, leading }, mark)?;
                }
                Kind::BlockEnd => {
                    self.next()?;
                    return Ok(Node::mapping(mapping));
                }
                _ => {
                    let mark = self.peek_mark()?;
                    return Err(self.error_at(mark, "expected a mapping key"));
                }
            }
        }
    }

    /// The value after `key:`; a block collection value picks up the comment
    /// written on the key's line.
    fn block_value(&mut self, key_mark: Marker) -> Result<Node> {
        if self.peek_kind()? != Kind::Value {
            return Ok(Node::null());
        }
        self.advance()?;
        let mut value = self.node(Slot::MapValue)?;
        if value.is_block_collection() && value.comment.is_none() {
            value.comment = self.lines.inline_comment(key_mark.line());
        }
        Ok(value)
    }

    fn block_sequence(&mut self) -> Result<Node> {
        self.next()?;
        let mut sequence = Sequence::new();

        loop {
            match self.peek_kind()? {
                Kind::BlockEntry => {
                    let item = self.sequence_item()?;
                    sequence.items.push(item);
                }
                Kind::BlockEnd => {
                    self.next()?;
                    return Ok(Node::sequence(sequence));
                }
                _ => {
                    let mark = self.peek_mark()?;
                    return Err(self.error_at(mark, "expected a sequence item"));
                }
            }
        }
    }

    /// A sequence written at the same indentation as its parent key.
    fn indentless_sequence(&mut self) -> Result<Node> {
        let mut sequence = Sequence::new();
        while self.peek_kind()? == Kind::BlockEntry {
            let item = self.sequence_item()?;
            sequence.items.push(item);
        }
        Ok(Node::sequence(sequence))
    }

    fn sequence_item(&mut self) -> Result<Item> {
        let Token(mark, _) = self.next()?;
        let leading = self.leading(mark);
        let mut node = self.node(Slot::SeqItem)?;
        if node.is_block_collection() && node.comment.is_none() {
            node.comment = self.lines.inline_comment(mark.line());
        }
        Ok(Item { node, leading })
    }

    fn flow_sequence(&mut self) -> Result<Node> {
        self.advance()?;
        let mut sequence = Sequence {
            flow: true,
            ..Sequence::default()
        };

        loop {
            match self.peek_kind()? {
                Kind::FlowSequenceEnd => {
                    self.advance()?;
                    return Ok(Node::sequence(sequence));
                }
                Kind::FlowEntry => {
                    self.advance()?;
                }
                // `[a: 1]` is a sequence holding a single-pair mapping.
                Kind::Key | Kind::Value => {
                    let mark = self.peek_mark()?;
                    let entry = self.flow_pair()?;
                    let mut pair = Mapping {
                        flow: true,
                        ..Mapping::default()
                    };
                    self.push_entry(&mut pair, entry, mark)?;
                    sequence.push(Node::mapping(pair));
                }
                kind if kind.starts_flow_node() => {
                    let node = self.node(Slot::Flow)?;
                    sequence.push(node);
                }
                _ => {
                    let mark = self.peek_mark()?;
                    return Err(self.error_at(mark, "expected ',' or ']' in flow sequence"));
                }
            }
        }
    }

    fn flow_mapping(&mut self) -> Result<Node> {
        self.advance()?;
        let mut mapping = Mapping {
            flow: true,
            ..Mapping::default()
        };

        loop {
            match self.peek_kind()? {
                Kind::FlowMappingEnd => {
                    self.advance()?;
                    return Ok(Node::mapping(mapping));
                }
                Kind::FlowEntry => {
                    self.advance()?;
                }
                kind if kind == Kind::Key || kind == Kind::Value || kind.starts_flow_node() => {
                    let mark = self.peek_mark()?;
                    let entry = self.flow_pair()?;
                    self.push_entry(&mut mapping, entry, mark)?;
                }
                _ => {
                    let mark = self.peek_mark()?;
                    return Err(self.error_at(mark, "expected ',' or '}' in flow mapping"));
                }
            }
        }
    }

    /// One `key: value` pair inside a flow collection; either side may be
    /// empty.
    fn flow_pair(&mut self) -> Result<Entry> {
        if self.peek_kind()? == Kind::Key {
            self.advance()?;
        }
        let key = self.node(Slot::Flow)?;
        let value = if self.peek_kind()? == Kind::Value {
            self.advance()?;
            self.node(Slot::Flow)?
        } else {
            Node::null()
        };
        Ok(Entry {
            key,
            value,
            leading: Leading::default(),
        })
    }

    /// Comment lines above the entry starting at `mark`.
    ///
    /// The column is taken from the source line: the `BlockEntry` marker sits
    /// after the `- `, not on the dash.
    fn leading(&mut self, mark: Marker) -> Leading {
        let lines = self.lines.leading(mark.line());
        Leading::new(lines, self.lines.indent(mark.line()))
    }

    fn push_entry(&self, mapping: &mut Mapping, entry: Entry, mark: Marker) -> Result<()> {
        if let Some(key) = entry.key.as_str()
            && mapping.contains_key(key)
        {
            return Err(self.error_at(mark, format!("found duplicate key '{}'", key)));
        }
        mapping.entries.push(entry);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Token stream
    // ------------------------------------------------------------------

    fn fetch(&mut self) -> Result<Token> {
        match self.scanner.next() {
            Some(token) => Ok(token),
            None => Err(match self.scanner.get_error() {
                Some(e) => ConfigError::Parse {
                    path: self.path.to_path_buf(),
                    line: e.marker().line(),
                    column: e.marker().col() + 1,
                    message: e.to_string(),
                },
                None => ConfigError::Parse {
                    path: self.path.to_path_buf(),
                    line: self.last.map_or(0, |m| m.line()),
                    column: self.last.map_or(0, |m| m.col() + 1),
                    message: "unexpected end of input".to_string(),
                },
            }),
        }
    }

    fn peek(&mut self) -> Result<&Token> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.fetch()?,
        };
        Ok(&*self.peeked.insert(token))
    }

    fn peek_kind(&mut self) -> Result<Kind> {
        Ok(Kind::of(&self.peek()?.1))
    }

    fn peek_mark(&mut self) -> Result<Marker> {
        Ok(self.peek()?.0)
    }

    /// Consume the next token without claiming its line.
    fn next(&mut self) -> Result<Token> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.fetch()?,
        };
        self.last = Some(token.0);
        Ok(token)
    }

    /// Consume the next token and claim its line.
    fn take(&mut self) -> Result<Token> {
        let token = self.next()?;
        self.lines.touch(token.0.line());
        Ok(token)
    }

    fn advance(&mut self) -> Result<Marker> {
        Ok(self.take()?.0)
    }

    fn error_at(&self, mark: Marker, message: impl Into<String>) -> ConfigError {
        ConfigError::Parse {
            path: self.path.to_path_buf(),
            line: mark.line(),
            column: mark.col() + 1,
            message: message.into(),
        }
    }
}

/// Tag as written: `!name`, `!!name`, `!<verbatim>` or the non-specific `!`.
fn tag_name(handle: String, suffix: String) -> String {
    if handle.is_empty() {
        if suffix == "!" {
            suffix
        } else {
            format!("!<{}>", suffix)
        }
    } else {
        handle + &suffix
    }
}
