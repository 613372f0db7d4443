//! `!include` resolution.
//!
//! A node tagged `!include` is replaced by the content of the file(s) it
//! names while the including file is being composed:
//!
//! ```yaml
//! modem: !include modem.yaml          # the whole document of modem.yaml
//! devices: !include [lights.yaml, remotes.yaml]   # lists, concatenated
//! ```
//!
//! Paths are relative to the directory of the including file. Every file
//! loaded for one top-level [`load`] shares a [`Session`], so anchors defined
//! in one file can be aliased from any file composed after it.
//!
//! There is no way back: saving a loaded document writes the included
//! content into the root file.

use crate::document::compose::compose;
use crate::document::{Document, Node, Sequence, Value};
use crate::error::{ConfigError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tag marking an include directive.
pub const INCLUDE_TAG: &str = "!include";

/// State shared by every file composed during one top-level load.
#[derive(Debug, Default)]
pub(crate) struct Session {
    anchors: HashMap<String, Node>,
    /// Canonical paths of the files currently being composed, outermost first.
    stack: Vec<PathBuf>,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn anchor(&self, name: &str) -> Option<&Node> {
        self.anchors.get(name)
    }

    /// Record `node` under `name`; a later definition replaces an earlier one.
    pub(crate) fn define_anchor(&mut self, name: String, node: &Node) {
        self.anchors.insert(name, node.clone());
    }

    fn enter(&mut self, path: &Path) -> Result<()> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if self.stack.contains(&canonical) {
            return Err(ConfigError::IncludeCycle {
                path: path.to_path_buf(),
            });
        }
        self.stack.push(canonical);
        Ok(())
    }

    fn leave(&mut self) {
        self.stack.pop();
    }
}

/// The argument of an `!include` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive {
    /// `!include file.yaml`
    Single(String),
    /// `!include [a.yaml, b.yaml]`
    List(Vec<String>),
}

impl Directive {
    /// Read the directive from the tagged node found in `path` at `line`.
    pub(crate) fn from_node(node: &Node, path: &Path, line: usize) -> Result<Self> {
        let malformed = |found| ConfigError::MalformedDirective {
            path: path.to_path_buf(),
            line,
            found,
        };

        match node.value() {
            // An empty path names no file and fails when it is read.
            Value::Scalar(scalar) => Ok(Directive::Single(scalar.text.clone())),
            Value::Sequence(seq) => seq
                .iter()
                .map(|item| match item.value() {
                    Value::Scalar(s) => Ok(s.text.clone()),
                    Value::Mapping(_) => Err(malformed("a list containing a mapping")),
                    Value::Sequence(_) => Err(malformed("a list containing a list")),
                })
                .collect::<Result<Vec<_>>>()
                .map(Directive::List),
            Value::Mapping(_) => Err(malformed("a mapping")),
        }
    }
}

/// Load the configuration file at `path`, resolving every `!include`.
pub fn load(path: &Path) -> Result<Document> {
    let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut session = Session::new();
    session.enter(path)?;
    let document = compose(&source, path, &mut session)?;
    session.leave();

    Ok(document)
}

/// Produce the node that replaces a directive found in a file under
/// `base_dir`.
pub(crate) fn resolve(directive: Directive, base_dir: &Path, session: &mut Session) -> Result<Node> {
    match directive {
        Directive::Single(file) => {
            let document = load_included(&base_dir.join(file), session)?;
            Ok(document.root.unwrap_or_else(Node::null))
        }
        Directive::List(files) => {
            let mut combined = Sequence::new();
            for file in files {
                let path = base_dir.join(file);
                let document = load_included(&path, session)?;
                match document.root.map(|root| root.value) {
                    None => {}
                    Some(Value::Sequence(items)) => combined.append(items),
                    Some(_) => return Err(ConfigError::IncludeNotSequence { path }),
                }
            }
            Ok(Node::sequence(combined))
        }
    }
}

fn load_included(path: &Path, session: &mut Session) -> Result<Document> {
    let source = fs::read_to_string(path).map_err(|source| ConfigError::IncludeNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    session.enter(path)?;
    let document = compose(&source, path, session);
    session.leave();

    debug!(path = %path.display(), "resolved include");
    document
}
