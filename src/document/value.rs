//! Conversion of document nodes to plain `serde_yaml` values.
//!
//! Plain scalars are typed by `serde_yaml`'s own resolver and `<<` merge keys
//! are expanded with [`serde_yaml::Value::apply_merge`]. Quoted and block
//! scalars are always strings. Core tags (`!!int`, `!!str`, ...) force the
//! type when the text allows it; other tags are kept as
//! [`serde_yaml::Value::Tagged`].

use super::emit::is_plain_safe;
use super::node::{Mapping, Node, ScalarStyle, Value};
use serde_yaml::value::{Tag, TaggedValue};

const MERGE_KEY: &str = "<<";
const CORE_TAG_PREFIX: &str = "tag:yaml.org,2002:";

impl Node {
    /// Convert to a `serde_yaml::Value`, dropping comments and styles.
    ///
    /// Aliases convert to the value they refer to and `<<` merge keys are
    /// expanded, with explicit keys taking precedence over merged ones. A
    /// merge key whose value is not a mapping or a list of mappings is an
    /// error.
    pub fn to_value(&self) -> Result<serde_yaml::Value, serde_yaml::Error> {
        let core = self.tag.as_deref().and_then(core_tag);

        let value = match &self.value {
            Value::Scalar(scalar) => match core {
                Some("str") => serde_yaml::Value::String(scalar.text.clone()),
                Some(kind @ ("int" | "float" | "bool" | "null")) => {
                    let resolved = resolve_plain(&scalar.text);
                    if kind_of(&resolved) == kind {
                        resolved
                    } else {
                        serde_yaml::Value::String(scalar.text.clone())
                    }
                }
                _ if scalar.style == ScalarStyle::Plain => resolve_plain(&scalar.text),
                _ => serde_yaml::Value::String(scalar.text.clone()),
            },
            Value::Sequence(seq) => {
                serde_yaml::Value::Sequence(seq.iter().map(Node::to_value).collect::<Result<_, _>>()?)
            }
            Value::Mapping(m) => mapping_value(m)?,
        };

        Ok(match self.tag.as_deref() {
            Some(tag) if core.is_none() => {
                let name = tag.strip_prefix('!').unwrap_or(tag);
                if name.is_empty() {
                    value
                } else {
                    serde_yaml::Value::Tagged(Box::new(TaggedValue {
                        tag: Tag::new(name),
                        value,
                    }))
                }
            }
            _ => value,
        })
    }
}

fn mapping_value(mapping: &Mapping) -> Result<serde_yaml::Value, serde_yaml::Error> {
    let mut out = serde_yaml::Mapping::new();
    for (key, value) in mapping.iter() {
        out.insert(key.to_value()?, value.to_value()?);
    }

    let mut value = serde_yaml::Value::Mapping(out);
    // Children are already merged, so only this level can still hold `<<`.
    if value.get(MERGE_KEY).is_some() {
        value.apply_merge()?;
    }
    Ok(value)
}

/// `int` for `!!int` and `!<tag:yaml.org,2002:int>`.
fn core_tag(tag: &str) -> Option<&str> {
    tag.strip_prefix("!!").or_else(|| {
        tag.strip_prefix("!<")
            .and_then(|t| t.strip_suffix('>'))
            .and_then(|t| t.strip_prefix(CORE_TAG_PREFIX))
    })
}

fn kind_of(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "bool",
        serde_yaml::Value::Number(n) if n.is_f64() => "float",
        serde_yaml::Value::Number(_) => "int",
        _ => "str",
    }
}

/// Type a plain scalar the way `serde_yaml` reads it from a file.
fn resolve_plain(text: &str) -> serde_yaml::Value {
    if text.is_empty() {
        return serde_yaml::Value::Null;
    }
    if is_plain_safe(text, false)
        && let Ok(value) = serde_yaml::from_str::<serde_yaml::Value>(text)
        && matches!(
            value,
            serde_yaml::Value::Null
                | serde_yaml::Value::Bool(_)
                | serde_yaml::Value::Number(_)
                | serde_yaml::Value::String(_)
        )
    {
        return value;
    }
    serde_yaml::Value::String(text.to_string())
}

/// Whether `text`, written as a plain scalar, reads back as a string.
pub(crate) fn is_plain_string(text: &str) -> bool {
    matches!(resolve_plain(text), serde_yaml::Value::String(_))
}
