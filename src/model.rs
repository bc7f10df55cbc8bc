//! Data model for parsed documentation: format-agnostic.

use crate::yaml::Node;
use serde::Serialize;
use std::collections::BTreeMap;

/// Metadata extracted from one comment block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValueDescription {
    pub description: String,
    /// @default
    pub default: String,
    /// @section
    pub section: String,
    /// @sectionDescription
    pub section_description: String,
    /// Leading `(type)` label in the header
    pub value_type: String,
    /// @notationType
    pub notation_type: String,
    pub example_name: String,
    pub example_description: String,
    /// Verbatim code block following @example
    pub example: String,
    pub hidden: bool,
    pub required: bool,
    pub deprecated: bool,
    pub experimental: bool,
}

/// Dotted path → description, ordered for deterministic output.
pub type Descriptions = BTreeMap<String, ValueDescription>;

/// Everything parsed from one config root.
#[derive(Debug, Clone, Default)]
pub struct DocumentationInfo {
    pub config_path: String,
    /// Root mapping of the merged YAML tree (`None` when nothing parsed).
    pub values: Option<Node>,
    pub values_descriptions: Descriptions,
}

/// A single output table entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValueRow {
    pub key: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub notation_type: String,
    pub default: String,
    pub auto_default: String,
    pub description: String,
    pub auto_description: String,
    pub section: String,
    pub section_description: String,
    pub auto_section: String,
    pub auto_section_description: String,
    pub example_name: String,
    pub example_description: String,
    pub example: String,
    pub column: usize,
    pub line_number: usize,
    pub hidden: bool,
    pub required: bool,
    pub deprecated: bool,
    pub experimental: bool,
}

impl ValueRow {
    pub fn has_description(&self) -> bool {
        !self.description.is_empty() || !self.auto_description.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sections {
    pub default_section: Section,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Section {
    pub section_name: String,
    pub description: String,
    pub section_items: Vec<ValueRow>,
    pub examples: Vec<Example>,
    pub section_break: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Example {
    pub example_name: String,
    pub description: String,
    pub code_block: String,
}
