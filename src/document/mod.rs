//! In-memory YAML document.
//!
//! A [`Document`] keeps what a round trip needs besides the data itself:
//! comments, blank lines, scalar quoting, flow/block collection style,
//! anchors, tags and aliases. Loading a file and saving it again without
//! edits reproduces the file as long as it already uses the fixed save
//! layout (see [`Document::to_yaml`]).
//!
//! Files are normally loaded through [`crate::include::load`], which also
//! resolves `!include` directives.

pub(crate) mod compose;
mod emit;
mod lines;
mod node;
mod value;


pub use node::{Entry, Item, Mapping, Node, Scalar, ScalarStyle, Sequence, Value};

use crate::error::Result;
use crate::include::Session;
use std::fmt;
use std::path::Path;

/// A parsed YAML document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub(crate) root: Option<Node>,
    /// Comment lines above an explicit `---`.
    pub(crate) header: Vec<String>,
    pub(crate) explicit_start: bool,
    pub(crate) start_comment: Option<String>,
    pub(crate) trailing: Vec<String>,
}

impl Document {
    pub fn new(root: Node) -> Self {
        Self {
            root: Some(root),
            ..Self::default()
        }
    }

    /// Parse a document from a string.
    ///
    /// `!include` paths are resolved against the working directory.
    pub fn parse(source: &str) -> Result<Self> {
        let mut session = Session::new();
        compose::compose(source, Path::new("<string>"), &mut session)
    }

    /// Root node; `None` for an empty document.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> Option<&mut Node> {
        self.root.as_mut()
    }

    pub fn set_root(&mut self, root: Option<Node>) {
        self.root = root;
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Top-level mapping lookup.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.root.as_ref().and_then(|r| r.get(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.root.as_mut().and_then(|r| r.get_mut(key))
    }

    /// Comment lines after the last node.
    pub fn trailing_comments(&self) -> &[String] {
        &self.trailing
    }

    /// Serialize with 2-space mapping indent, 4-space sequence indent and
    /// the dash offset by 2.
    pub fn to_yaml(&self) -> String {
        emit::emit(self)
    }

    /// The document as a plain `serde_yaml` value (`Null` when empty).
    ///
    /// Fails only on a `<<` merge key whose value cannot be merged.
    pub fn to_value(&self) -> std::result::Result<serde_yaml::Value, serde_yaml::Error> {
        self.root
            .as_ref()
            .map_or(Ok(serde_yaml::Value::Null), Node::to_value)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_yaml())
    }
}
