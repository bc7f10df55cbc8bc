//! Strict mode: every mapping entry and sequence element must carry
//! documentation.

use crate::error::{Error, Result};
use crate::model::Descriptions;
use crate::yaml::{Node, NodeKind};
use regex::Regex;

/// Strict mode switch plus the allow-lists checked against undocumented
/// paths.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfig {
    pub strict_mode: bool,
    pub allowed_missing_value_paths: Vec<String>,
    pub allowed_missing_value_regexps: Vec<Regex>,
}

impl ParsingConfig {
    /// Compile the regex allow-list. Blank entries are skipped.
    pub fn new(strict_mode: bool, paths: &[String], patterns: &[String]) -> Result<Self> {
        let allowed_missing_value_regexps = patterns
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(|p| {
                Regex::new(p).map_err(|source| Error::InvalidRegex {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ParsingConfig {
            strict_mode,
            allowed_missing_value_paths: paths
                .iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            allowed_missing_value_regexps,
        })
    }

    fn is_allowed(&self, path: &str) -> bool {
        self.allowed_missing_value_paths.iter().any(|p| p == path)
            || self
                .allowed_missing_value_regexps
                .iter()
                .any(|re| re.is_match(path))
    }
}

/// Paths of mapping entries and sequence elements with no description, in
/// document order. Keys are joined raw with `.`; sequence elements add a
/// `[i]` segment.
pub fn undocumented_paths(root: &Node, descriptions: &Descriptions) -> Vec<String> {
    let mut missing = Vec::new();
    let mut path = Vec::new();
    collect(root, descriptions, &mut path, &mut missing);
    missing
}

fn collect(node: &Node, descriptions: &Descriptions, path: &mut Vec<String>, out: &mut Vec<String>) {
    match &node.resolve().kind {
        NodeKind::Mapping(entries) => {
            for (key, value) in entries {
                path.push(key.value.clone());
                let joined = path.join(".");
                if !descriptions.contains_key(&joined) {
                    out.push(joined);
                }
                collect(value, descriptions, path, out);
                path.pop();
            }
        }
        NodeKind::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                path.push(format!("[{i}]"));
                let joined = path.join(".");
                if !descriptions.contains_key(&joined) {
                    out.push(joined);
                }
                collect(item, descriptions, path, out);
                path.pop();
            }
        }
        NodeKind::Scalar(_) | NodeKind::Alias(_) => {}
    }
}

/// Fail with the full list of undocumented, non-allow-listed paths.
pub fn check_documentation(
    root: &Node,
    descriptions: &Descriptions,
    config: &ParsingConfig,
) -> Result<()> {
    let paths: Vec<String> = undocumented_paths(root, descriptions)
        .into_iter()
        .filter(|p| !config.is_allowed(p))
        .collect();
    if paths.is_empty() {
        return Ok(());
    }
    Err(Error::Undocumented { paths })
}
