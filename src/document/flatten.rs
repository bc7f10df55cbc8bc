//! Tree flattener: one [`ValueRow`] per documentable key.
//!
//! Walks the merged tree depth-first in document order. A described
//! container produces its own row and switches its subtree to
//! "described keys only". The flattener also carries the section seen
//! last, which becomes every row's `AutoSection`.

use crate::error::{Error, Result};
use crate::model::{Descriptions, ValueDescription, ValueRow};
use crate::parser::scan::auto_description;
use crate::yaml::{Node, NodeKind, ScalarTag};
use serde_json::Value as JsonValue;
use tracing::trace;

const BOOL_TYPE: &str = "bool";
const FLOAT_TYPE: &str = "float";
const INT_TYPE: &str = "int";
const LIST_TYPE: &str = "list";
const OBJECT_TYPE: &str = "object";
const STRING_TYPE: &str = "string";

const YAML_NOTATION: &str = "yaml";

const DEFAULT_SECTION: &str = "@default";

// -- Key paths ----------------------------------------------------------------

pub fn format_next_object_key(prefix: &str, key: &str) -> String {
    let escaped = if key.contains('.') || key.contains(' ') {
        format!("\"{key}\"")
    } else {
        key.to_string()
    };
    if prefix.is_empty() {
        escaped
    } else {
        format!("{prefix}.{escaped}")
    }
}

pub fn format_next_list_key(prefix: &str, index: usize) -> String {
    format!("{prefix}[{index}]")
}

// -- Row values ---------------------------------------------------------------

/// What a row documents, already reduced to the shape its default needs.
enum RowValue {
    Nil,
    Json(JsonValue),
    /// Rendered by the template according to the notation type.
    Notation(String),
}

fn inferred_type(node: &Node) -> &'static str {
    match &node.resolve().kind {
        NodeKind::Mapping(_) => OBJECT_TYPE,
        NodeKind::Sequence(_) => LIST_TYPE,
        NodeKind::Scalar(tag) => match tag {
            ScalarTag::Bool => BOOL_TYPE,
            ScalarTag::Int => INT_TYPE,
            ScalarTag::Float => FLOAT_TYPE,
            ScalarTag::Null | ScalarTag::Str | ScalarTag::Timestamp => STRING_TYPE,
        },
        NodeKind::Alias(_) => STRING_TYPE,
    }
}

/// JSON without a trailing newline; bare strings lose their quotes.
fn json_default(key: &str, value: &JsonValue) -> Result<String> {
    if let JsonValue::String(s) = value {
        return Ok(s.clone());
    }
    serde_json::to_string(value).map_err(|e| Error::Flatten {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn notation_value(key: &str, node: &Node, notation_type: &str) -> Result<String> {
    let node = node.resolve();
    if notation_type == YAML_NOTATION {
        return node.to_yaml_string().map_err(|e| Error::Flatten {
            key: key.to_string(),
            message: e.to_string(),
        });
    }
    Ok(node.value.clone())
}

fn first_non_empty(primary: &str, fallback: &str) -> String {
    if primary.is_empty() {
        fallback.to_string()
    } else {
        primary.to_string()
    }
}

// -- Flattener ----------------------------------------------------------------

/// Flattening state for one merged document.
pub struct Flattener<'a> {
    descriptions: &'a Descriptions,
    last_known_section: String,
    last_known_section_description: String,
}

impl<'a> Flattener<'a> {
    pub fn new(descriptions: &'a Descriptions) -> Self {
        Flattener {
            descriptions,
            last_known_section: String::new(),
            last_known_section_description: String::new(),
        }
    }

    /// Rows for `value` and everything below it. `key` is the node whose
    /// head-comment may carry an auto-description (the item itself for
    /// sequence elements, `None` at the root).
    pub fn flatten(
        &mut self,
        prefix: &str,
        key: Option<&Node>,
        value: &Node,
        document_leaf_nodes: bool,
    ) -> Result<Vec<ValueRow>> {
        match &value.kind {
            NodeKind::Mapping(entries) => {
                self.flatten_container(prefix, key, value, entries.len(), document_leaf_nodes)
            }
            NodeKind::Sequence(items) => {
                self.flatten_container(prefix, key, value, items.len(), document_leaf_nodes)
            }
            NodeKind::Alias(target) => self.flatten(prefix, key, target, document_leaf_nodes),
            NodeKind::Scalar(tag) => self.flatten_scalar(prefix, key, value, *tag, document_leaf_nodes),
        }
    }

    fn flatten_container(
        &mut self,
        prefix: &str,
        key: Option<&Node>,
        value: &Node,
        len: usize,
        mut document_leaf_nodes: bool,
    ) -> Result<Vec<ValueRow>> {
        let description = self.descriptions.get(prefix);
        let auto = auto_description(key);
        let described = description.is_some() || !auto.description.is_empty();

        if len == 0 {
            if prefix.is_empty() || !(document_leaf_nodes || described) {
                return Ok(Vec::new());
            }
            let empty = match value.kind {
                NodeKind::Sequence(_) => JsonValue::Array(Vec::new()),
                _ => JsonValue::Object(serde_json::Map::new()),
            };
            let row = self.row(prefix, key, value, RowValue::Json(empty), description, &auto, true)?;
            return Ok(vec![row]);
        }

        let mut rows = Vec::new();
        if described {
            let notation_type = resolved_notation_type(description, &auto);
            let row_value = if notation_type.is_empty() {
                RowValue::Json(value.to_json())
            } else {
                RowValue::Notation(notation_value(prefix, value, &notation_type)?)
            };
            rows.push(self.row(prefix, key, value, row_value, description, &auto, false)?);
            document_leaf_nodes = false;
        }

        match &value.kind {
            NodeKind::Mapping(entries) => {
                for (k, v) in entries {
                    let next = format_next_object_key(prefix, &k.value);
                    rows.extend(self.flatten(&next, Some(k), v, document_leaf_nodes)?);
                }
            }
            NodeKind::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    let next = format_next_list_key(prefix, i);
                    rows.extend(self.flatten(&next, Some(item), item, document_leaf_nodes)?);
                }
            }
            _ => {}
        }
        Ok(rows)
    }

    fn flatten_scalar(
        &mut self,
        prefix: &str,
        key: Option<&Node>,
        value: &Node,
        tag: ScalarTag,
        document_leaf_nodes: bool,
    ) -> Result<Vec<ValueRow>> {
        let description = self.descriptions.get(prefix);
        let auto = auto_description(key);
        if !(document_leaf_nodes || description.is_some() || !auto.description.is_empty()) {
            return Ok(Vec::new());
        }

        let notation_type = resolved_notation_type(description, &auto);
        let row_value = match tag {
            ScalarTag::Null => RowValue::Nil,
            ScalarTag::Str if !notation_type.is_empty() => {
                RowValue::Notation(notation_value(prefix, value, &notation_type)?)
            }
            _ => RowValue::Json(value.to_json()),
        };
        let row = self.row(prefix, key, value, row_value, description, &auto, false)?;
        Ok(vec![row])
    }

    #[allow(clippy::too_many_arguments)]
    fn row(
        &mut self,
        key: &str,
        key_node: Option<&Node>,
        value: &Node,
        row_value: RowValue,
        description: Option<&ValueDescription>,
        auto: &ValueDescription,
        empty_container: bool,
    ) -> Result<ValueRow> {
        let empty = ValueDescription::default();
        let description = description.unwrap_or(&empty);
        let notation_type = resolved_notation_type(Some(description), auto);
        let no_defaults = description.default.is_empty() && auto.default.is_empty();

        let inferred = match row_value {
            RowValue::Nil => STRING_TYPE,
            _ => inferred_type(value),
        };
        let kind = if !description.value_type.is_empty() {
            description.value_type.clone()
        } else if !auto.value_type.is_empty() {
            auto.value_type.clone()
        } else if !notation_type.is_empty() && !matches!(row_value, RowValue::Nil) {
            notation_type.clone()
        } else {
            inferred.to_string()
        };

        let mut default = description.default.clone();
        if no_defaults {
            default = match &row_value {
                RowValue::Nil => "`nil`".to_string(),
                RowValue::Json(json) if notation_type.is_empty() || empty_container => {
                    format!("`{}`", json_default(key, json)?)
                }
                RowValue::Json(_) => value.resolve().value.clone(),
                RowValue::Notation(text) => text.clone(),
            };
        }

        let (hidden, required, deprecated, experimental) = if !auto.description.is_empty() {
            (auto.hidden, auto.required, auto.deprecated, auto.experimental)
        } else {
            (
                description.hidden,
                description.required,
                description.deprecated,
                description.experimental,
            )
        };

        let section = first_non_empty(&description.section, &auto.section);
        let section_description =
            first_non_empty(&description.section_description, &auto.section_description);
        self.track_section(key, &section, &section_description);

        let (column, line_number) = key_node.map_or((0, 0), |n| (n.column, n.line));

        Ok(ValueRow {
            key: key.to_string(),
            kind,
            notation_type,
            default,
            auto_default: auto.default.clone(),
            description: description.description.clone(),
            auto_description: auto.description.clone(),
            section,
            section_description,
            auto_section: self.last_known_section.clone(),
            auto_section_description: self.last_known_section_description.clone(),
            example_name: first_non_empty(&description.example_name, &auto.example_name),
            example_description: first_non_empty(
                &description.example_description,
                &auto.example_description,
            ),
            example: first_non_empty(&description.example, &auto.example),
            column,
            line_number,
            hidden,
            required,
            deprecated,
            experimental,
        })
    }

    fn track_section(&mut self, key: &str, section: &str, section_description: &str) {
        if section.is_empty() {
            return;
        }
        if section == DEFAULT_SECTION {
            trace!("Key '{}' reset the lastKnownSection to: default", key);
            self.last_known_section.clear();
            self.last_known_section_description.clear();
        } else {
            trace!("Key '{}' updated the lastKnownSection to: {}", key, section);
            self.last_known_section = section.to_string();
            self.last_known_section_description = section_description.to_string();
        }
    }
}

fn resolved_notation_type(description: Option<&ValueDescription>, auto: &ValueDescription) -> String {
    first_non_empty(
        &auto.notation_type,
        description.map_or("", |d| d.notation_type.as_str()),
    )
}

/// Flatten a whole document. An absent document yields no rows; anything
/// but a mapping at the root is an error.
pub fn value_rows(root: Option<&Node>, descriptions: &Descriptions) -> Result<Vec<ValueRow>> {
    let Some(root) = root else {
        return Ok(Vec::new());
    };
    let resolved = root.resolve();
    if !matches!(resolved.kind, NodeKind::Mapping(_)) {
        return Err(Error::NotAMapping {
            kind: resolved.kind_name(),
        });
    }
    Flattener::new(descriptions).flatten("", None, resolved, true)
}
