//! Position-aware YAML node tree.
//!
//! Every node keeps its source line/column and the block of `#` lines
//! directly above it, which is where the comment microformat lives.

mod load;

pub use load::{load, normalize_newlines};

use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

/// Resolved scalar tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarTag {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Scalar(ScalarTag),
    Sequence(Vec<Node>),
    Mapping(Vec<(Node, Node)>),
    /// Resolved copy of the anchored node.
    Alias(Box<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// Scalar text; empty for containers.
    pub value: String,
    pub head_comment: String,
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
}

impl Node {
    pub fn mapping(entries: Vec<(Node, Node)>) -> Self {
        Node {
            kind: NodeKind::Mapping(entries),
            value: String::new(),
            head_comment: String::new(),
            line: 0,
            column: 0,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Scalar(_) => "scalar",
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Mapping(_) => "mapping",
            NodeKind::Alias(_) => "alias",
        }
    }

    /// Follow aliases to the node they stand for.
    pub fn resolve(&self) -> &Node {
        match &self.kind {
            NodeKind::Alias(target) => target.resolve(),
            _ => self,
        }
    }

    pub fn entries(&self) -> Option<&[(Node, Node)]> {
        match &self.resolve().kind {
            NodeKind::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn scalar_tag(&self) -> Option<ScalarTag> {
        match self.resolve().kind {
            NodeKind::Scalar(tag) => Some(tag),
            _ => None,
        }
    }

    /// Look up a direct child of a mapping by key text.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries()?
            .iter()
            .find(|(k, _)| k.value == key)
            .map(|(_, v)| v)
    }

    /// Plain data view used for JSON default values. Map keys come out
    /// sorted.
    pub fn to_json(&self) -> JsonValue {
        match &self.kind {
            NodeKind::Mapping(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.value.clone(), v.to_json()))
                    .collect(),
            ),
            NodeKind::Sequence(items) => {
                JsonValue::Array(items.iter().map(Node::to_json).collect())
            }
            NodeKind::Alias(target) => target.to_json(),
            NodeKind::Scalar(tag) => match tag {
                ScalarTag::Null => JsonValue::Null,
                ScalarTag::Bool => JsonValue::Bool(parse_bool(&self.value)),
                ScalarTag::Int => match parse_int(&self.value) {
                    Some(i) => JsonValue::from(i),
                    None => float_json(&self.value),
                },
                ScalarTag::Float => float_json(&self.value),
                ScalarTag::Str | ScalarTag::Timestamp => JsonValue::String(self.value.clone()),
            },
        }
    }

    /// Ordered data view used for YAML marshalling.
    pub fn to_yaml(&self) -> YamlValue {
        match &self.kind {
            NodeKind::Mapping(entries) => YamlValue::Mapping(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_yaml(), v.to_yaml()))
                    .collect(),
            ),
            NodeKind::Sequence(items) => {
                YamlValue::Sequence(items.iter().map(Node::to_yaml).collect())
            }
            NodeKind::Alias(target) => target.to_yaml(),
            NodeKind::Scalar(tag) => match tag {
                ScalarTag::Null => YamlValue::Null,
                ScalarTag::Bool => YamlValue::Bool(parse_bool(&self.value)),
                ScalarTag::Int => match parse_int(&self.value) {
                    Some(i) => YamlValue::from(i),
                    None => YamlValue::String(self.value.clone()),
                },
                ScalarTag::Float => match parse_float(&self.value) {
                    Some(f) => YamlValue::from(f),
                    None => YamlValue::String(self.value.clone()),
                },
                ScalarTag::Str | ScalarTag::Timestamp => YamlValue::String(self.value.clone()),
            },
        }
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.to_yaml())
    }
}

/// Drop every node whose head-comment carries `@ignore`. In a mapping the
/// key and its value go together.
pub fn remove_ignored(node: &mut Node) {
    match &mut node.kind {
        NodeKind::Mapping(entries) => {
            entries.retain(|(k, v)| !is_ignored(k) && !is_ignored(v));
            for (_, v) in entries.iter_mut() {
                remove_ignored(v);
            }
        }
        NodeKind::Sequence(items) => {
            items.retain(|item| !is_ignored(item));
            for item in items.iter_mut() {
                remove_ignored(item);
            }
        }
        NodeKind::Alias(target) => remove_ignored(target),
        NodeKind::Scalar(_) => {}
    }
}

fn is_ignored(node: &Node) -> bool {
    node.head_comment.contains("@ignore")
}

fn parse_bool(text: &str) -> bool {
    text.eq_ignore_ascii_case("true")
}

pub(crate) fn parse_int(text: &str) -> Option<i64> {
    let cleaned = text.replace('_', "");
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = digits.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()?
    } else if let Some(bin) = digits.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

pub(crate) fn parse_float(text: &str) -> Option<f64> {
    let cleaned = text.replace('_', "");
    match cleaned.as_str() {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        other => other.parse::<f64>().ok(),
    }
}

/// JSON has no infinities or NaN; those keep their YAML spelling.
fn float_json(text: &str) -> JsonValue {
    parse_float(text)
        .and_then(serde_json::Number::from_f64)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(text.to_string()))
}
