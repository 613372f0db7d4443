//! Node types for the document tree.

/// How a scalar was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

impl ScalarStyle {
    /// Literal (`|`) and folded (`>`) block scalars.
    pub fn is_block(self) -> bool {
        matches!(self, ScalarStyle::Literal | ScalarStyle::Folded)
    }
}

/// A scalar value with its source style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub text: String,
    pub style: ScalarStyle,
}

/// Full-line comments and blank lines found above a mapping entry or a
/// sequence item.
///
/// Lines are kept verbatim together with the column the entry started at, so
/// re-emitting at the same indentation reproduces the source byte for byte
/// and re-emitting deeper (e.g. spliced include content) shifts them along.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Leading {
    pub(crate) lines: Vec<String>,
    pub(crate) column: usize,
}

impl Leading {
    pub(crate) fn new(lines: Vec<String>, column: usize) -> Self {
        Self { lines, column }
    }
}

/// One `key: value` pair of a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: Node,
    pub value: Node,
    pub(crate) leading: Leading,
}

impl Entry {
    /// Comment lines written above this entry, without indentation.
    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.leading
            .lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
    }
}

/// One element of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub node: Node,
    pub(crate) leading: Leading,
}

/// An insertion-ordered mapping with unique keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    pub(crate) entries: Vec<Entry>,
    pub(crate) flow: bool,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the mapping was written as `{...}`.
    pub fn is_flow(&self) -> bool {
        self.flow
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.position(key).map(|i| &self.entries[i].value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.position(key).map(|i| &mut self.entries[i].value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Set `key` to `value`.
    ///
    /// An existing entry keeps its position and comments and the previous
    /// value is returned; otherwise the entry is appended.
    pub fn insert(&mut self, key: &str, value: Node) -> Option<Node> {
        match self.position(key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].value, value)),
            None => {
                self.entries.push(Entry {
                    key: Node::string(key),
                    value,
                    leading: Leading::default(),
                });
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.position(key).map(|i| self.entries.remove(i).value)
    }

    /// Iterate `(key, value)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&Node, &Node)> {
        self.entries.iter().map(|e| (&e.key, &e.value))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Scalar keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| e.key.as_str())
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.key.as_str() == Some(key))
    }
}

/// An ordered sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    pub(crate) items: Vec<Item>,
    pub(crate) flow: bool,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the sequence was written as `[...]`.
    pub fn is_flow(&self) -> bool {
        self.flow
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index).map(|i| &i.node)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.items.get_mut(index).map(|i| &mut i.node)
    }

    pub fn push(&mut self, node: Node) {
        self.items.push(Item {
            node,
            leading: Leading::default(),
        });
    }

    /// Remove and return the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds, like `Vec::remove`.
    pub fn remove(&mut self, index: usize) -> Node {
        self.items.remove(index).node
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.items.iter().map(|i| &i.node)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Move every item of `other` (with its comments) to the end of `self`.
    pub(crate) fn append(&mut self, other: Sequence) {
        self.items.extend(other.items);
    }
}

/// The shape of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Sequence),
    Mapping(Mapping),
}

/// A node of the document tree.
///
/// Alias nodes (`*name`) carry a copy of the anchored node's value and
/// serialize back as the alias. Mutating an alias through [`Node::value_mut`]
/// detaches it into a standalone node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) value: Value,
    pub(crate) anchor: Option<String>,
    pub(crate) tag: Option<String>,
    pub(crate) alias: Option<String>,
    pub(crate) comment: Option<String>,
}

impl Node {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            anchor: None,
            tag: None,
            alias: None,
            comment: None,
        }
    }

    /// An empty (null) scalar, as produced by `key:` with no value.
    pub fn null() -> Self {
        Self::scalar("", ScalarStyle::Plain)
    }

    pub fn scalar(text: impl Into<String>, style: ScalarStyle) -> Self {
        Self::new(Value::Scalar(Scalar {
            text: text.into(),
            style,
        }))
    }

    /// A string scalar, quoted only when a plain scalar would read back as
    /// something else (a number, a bool, null) or would not parse.
    pub fn string(text: impl Into<String>) -> Self {
        let text = text.into();
        let style = if super::emit::is_plain_safe(&text, false)
            && super::value::is_plain_string(&text)
        {
            ScalarStyle::Plain
        } else {
            ScalarStyle::DoubleQuoted
        };
        Self::scalar(text, style)
    }

    pub fn mapping(mapping: Mapping) -> Self {
        Self::new(Value::Mapping(mapping))
    }

    pub fn sequence(sequence: Sequence) -> Self {
        Self::new(Value::Sequence(sequence))
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Mutable access to the value. Detaches alias nodes.
    pub fn value_mut(&mut self) -> &mut Value {
        self.alias = None;
        &mut self.value
    }

    pub fn set_value(&mut self, value: Value) {
        *self.value_mut() = value;
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn set_anchor(&mut self, anchor: Option<String>) {
        self.anchor = anchor;
    }

    /// Tag as written, e.g. `!secret` or `!!str`.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Name of the anchor this node refers to, if it was written as `*name`.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// End-of-line comment, including its leading whitespace and `#`.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.value {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Scalar text; `None` for collections.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().map(|s| s.text.as_str())
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match &self.value {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self.value_mut() {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match &self.value {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Sequence> {
        match self.value_mut() {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Empty plain scalar or `~`/`null`.
    pub fn is_null(&self) -> bool {
        match &self.value {
            Value::Scalar(s) => {
                s.style == ScalarStyle::Plain
                    && matches!(s.text.as_str(), "" | "~" | "null" | "Null" | "NULL")
            }
            _ => false,
        }
    }

    /// Mapping lookup; `None` when this node is not a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.as_mapping_mut().and_then(|m| m.get_mut(key))
    }

    /// Block collections that are written over several lines.
    pub(crate) fn is_block_collection(&self) -> bool {
        match &self.value {
            Value::Mapping(m) => !m.flow && !m.is_empty(),
            Value::Sequence(s) => !s.flow && !s.is_empty(),
            Value::Scalar(_) => false,
        }
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::string(text)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::string(text)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::scalar(if b { "true" } else { "false" }, ScalarStyle::Plain)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::scalar(n.to_string(), ScalarStyle::Plain)
    }
}

impl From<Mapping> for Node {
    fn from(m: Mapping) -> Self {
        Node::mapping(m)
    }
}

impl From<Sequence> for Node {
    fn from(s: Sequence) -> Self {
        Node::sequence(s)
    }
}
