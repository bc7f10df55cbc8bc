//! Build a [`Node`] tree from the `yaml-rust2` event stream.

use super::{Node, NodeKind, ScalarTag};
use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

// -- Core schema resolution ---------------------------------------------------

static RE_NULL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(~|null|Null|NULL)?$").unwrap());

static RE_BOOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(true|True|TRUE|false|False|FALSE)$").unwrap());

static RE_INT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([-+]?[0-9][0-9_]*|0x[0-9a-fA-F_]+|0o[0-7_]+|0b[01_]+)$").unwrap()
});

static RE_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^([-+]?(\.[0-9]+|[0-9][0-9_]*(\.[0-9_]*)?)([eE][-+]?[0-9]+)?",
        r"|[-+]?\.(inf|Inf|INF)|\.(nan|NaN|NAN))$"
    ))
    .unwrap()
});

static RE_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}",
        r"(([Tt]|[ \t]+)[0-9]{1,2}:[0-9]{2}:[0-9]{2}(\.[0-9]*)?",
        r"([ \t]*(Z|[-+][0-9]{1,2}(:[0-9]{2})?))?)?$"
    ))
    .unwrap()
});

fn resolve_plain(text: &str) -> ScalarTag {
    if RE_NULL.is_match(text) {
        ScalarTag::Null
    } else if RE_BOOL.is_match(text) {
        ScalarTag::Bool
    } else if RE_INT.is_match(text) {
        ScalarTag::Int
    } else if RE_FLOAT.is_match(text) {
        ScalarTag::Float
    } else if RE_TIMESTAMP.is_match(text) {
        ScalarTag::Timestamp
    } else {
        ScalarTag::Str
    }
}

fn resolve_explicit(tag: &Tag) -> Option<ScalarTag> {
    if tag.handle != "!!" && tag.handle != "tag:yaml.org,2002:" {
        return None;
    }
    match tag.suffix.as_str() {
        "null" => Some(ScalarTag::Null),
        "bool" => Some(ScalarTag::Bool),
        "int" => Some(ScalarTag::Int),
        "float" => Some(ScalarTag::Float),
        "str" | "binary" => Some(ScalarTag::Str),
        "timestamp" => Some(ScalarTag::Timestamp),
        _ => None,
    }
}

fn resolve_scalar(text: &str, style: TScalarStyle, tag: Option<&Tag>) -> ScalarTag {
    if let Some(explicit) = tag.and_then(resolve_explicit) {
        return explicit;
    }
    match style {
        TScalarStyle::Plain => resolve_plain(text),
        _ => ScalarTag::Str,
    }
}

// -- Tree builder -------------------------------------------------------------

enum Frame {
    Sequence {
        start: Node,
        anchor: usize,
        items: Vec<Node>,
    },
    Mapping {
        start: Node,
        anchor: usize,
        entries: Vec<(Node, Node)>,
        pending_key: Option<Node>,
    },
}

struct TreeBuilder<'a> {
    lines: Vec<&'a str>,
    stack: Vec<Frame>,
    /// Only completed nodes are registered, so an alias can never point
    /// into a node that is still open.
    anchors: HashMap<usize, Node>,
    root: Option<Node>,
    finished: bool,
    error: Option<String>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        TreeBuilder {
            lines: source.lines().collect(),
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
            finished: false,
            error: None,
        }
    }

    fn node_at(&self, kind: NodeKind, value: String, mark: Marker) -> Node {
        let line = mark.line();
        let column = mark.col() + 1;
        Node {
            kind,
            value,
            head_comment: self.head_comment(line, column),
            line,
            column,
        }
    }

    /// Comment lines directly above `line`, for nodes that start their line.
    fn head_comment(&self, line: usize, column: usize) -> String {
        let Some(current) = self.lines.get(line.saturating_sub(1)) else {
            return String::new();
        };
        let starts_line = current
            .chars()
            .take(column.saturating_sub(1))
            .all(|c| c.is_whitespace() || c == '-');
        if !starts_line {
            return String::new();
        }

        let mut block: Vec<&str> = Vec::new();
        let mut idx = line.saturating_sub(1);
        while idx > 0 {
            let candidate = self.lines[idx - 1].trim_start();
            if !candidate.starts_with('#') {
                break;
            }
            block.push(candidate);
            idx -= 1;
        }
        block.reverse();
        block.join("\n")
    }

    fn complete(&mut self, node: Node, anchor: usize) {
        if anchor > 0 {
            self.anchors.insert(anchor, node.clone());
        }
        match self.stack.last_mut() {
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => entries.push((key, node)),
                None => *pending_key = Some(node),
            },
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
        }
    }

    /// Position of the key awaiting a value, when it sits on an earlier
    /// line than `line`.
    fn parent_key_above(&self, line: usize) -> Option<(usize, usize)> {
        match self.stack.last() {
            Some(Frame::Mapping {
                pending_key: Some(key),
                ..
            }) if key.line < line => Some((key.line, key.column)),
            _ => None,
        }
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(message);
        }
        self.finished = true;
    }
}

impl MarkedEventReceiver for TreeBuilder<'_> {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        if self.finished {
            return;
        }
        match ev {
            Event::Scalar(value, style, anchor, tag) => {
                let tag = resolve_scalar(&value, style, tag.as_ref());
                let node = self.node_at(NodeKind::Scalar(tag), value, mark);
                self.complete(node, anchor);
            }
            Event::Alias(id) => match self.anchors.get(&id).cloned() {
                Some(target) => {
                    let node =
                        self.node_at(NodeKind::Alias(Box::new(target)), String::new(), mark);
                    self.complete(node, 0);
                }
                None => self.fail(format!(
                    "alias at line {} refers to an unknown or enclosing anchor",
                    mark.line()
                )),
            },
            Event::SequenceStart(anchor, _) => {
                let start = match self.parent_key_above(mark.line()) {
                    // a block sequence's mark sits on its first `-`, so the
                    // comment there belongs to the first item
                    Some((line, column)) => Node {
                        kind: NodeKind::Sequence(Vec::new()),
                        value: String::new(),
                        head_comment: String::new(),
                        line,
                        column,
                    },
                    None => self.node_at(NodeKind::Sequence(Vec::new()), String::new(), mark),
                };
                self.stack.push(Frame::Sequence {
                    start,
                    anchor,
                    items: Vec::new(),
                });
            }
            Event::MappingStart(anchor, _) => {
                let start = self.node_at(NodeKind::Mapping(Vec::new()), String::new(), mark);
                self.stack.push(Frame::Mapping {
                    start,
                    anchor,
                    entries: Vec::new(),
                    pending_key: None,
                });
            }
            Event::SequenceEnd => {
                if let Some(Frame::Sequence {
                    mut start,
                    anchor,
                    items,
                }) = self.stack.pop()
                {
                    start.kind = NodeKind::Sequence(items);
                    self.complete(start, anchor);
                }
            }
            Event::MappingEnd => {
                if let Some(Frame::Mapping {
                    mut start,
                    anchor,
                    mut entries,
                    ..
                }) = self.stack.pop()
                {
                    if matches!(self.stack.last(), Some(Frame::Sequence { .. })) {
                        adopt_first_key(&mut start, &mut entries);
                    }
                    start.kind = NodeKind::Mapping(entries);
                    self.complete(start, anchor);
                }
            }
            Event::DocumentEnd => {
                if self.root.is_some() {
                    self.finished = true;
                }
            }
            _ => {}
        }
    }
}

/// A block mapping's mark sits on its first key's `:`. As a sequence item
/// (`- name: x`) it takes the key's position, and the comment above the
/// `- ` moves from the key to the item.
fn adopt_first_key(item: &mut Node, entries: &mut [(Node, Node)]) {
    let Some((first_key, _)) = entries.first_mut() else {
        return;
    };
    if first_key.line != item.line {
        return;
    }
    item.column = first_key.column;
    let comment = std::mem::take(&mut first_key.head_comment);
    if item.head_comment.is_empty() {
        item.head_comment = comment;
    }
}

// -- Public API ---------------------------------------------------------------

pub fn normalize_newlines(source: &str) -> String {
    source.replace("\r\n", "\n")
}

/// Parse the first document of `source`. Returns `None` for an empty
/// document.
pub fn load(source: &str, config_path: &str) -> Result<Option<Node>> {
    let source = normalize_newlines(source);
    let mut builder = TreeBuilder::new(&source);
    let mut parser = Parser::new_from_str(&source);
    parser
        .load(&mut builder, false)
        .map_err(|e| Error::parse(config_path, e.to_string()))?;

    if let Some(message) = builder.error {
        return Err(Error::parse(config_path, message));
    }
    Ok(builder.root)
}
