//! File scanner: YAML tree pass plus comment collection pass.

use super::comment::{header_key, is_comment, parse_comment};
use crate::error::{Error, Result};
use crate::model::{Descriptions, ValueDescription};
use crate::yaml::{self, Node};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// One scanned file. `values` is `None` when the YAML was empty or did not
/// parse; its comments are still collected.
#[derive(Debug, Default)]
pub struct ScannedFile {
    pub values: Option<Node>,
    pub descriptions: Descriptions,
}

pub fn scan_file(path: &Path) -> Result<ScannedFile> {
    let bytes = fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let source = yaml::normalize_newlines(&String::from_utf8_lossy(&bytes));
    let config_path = path.display().to_string();

    let values = match parse_values(&source, &config_path) {
        Ok(values) => values,
        Err(e) => {
            warn!("Error parsing values from file {}: {}", config_path, e);
            None
        }
    };
    let descriptions = collect_descriptions(&source);
    debug!(
        file = %config_path,
        descriptions = descriptions.len(),
        "scanned configuration file"
    );

    Ok(ScannedFile {
        values,
        descriptions,
    })
}

/// Parse the YAML tree and prune `@ignore` nodes.
pub fn parse_values(source: &str, config_path: &str) -> Result<Option<Node>> {
    let mut root = yaml::load(source, config_path)?;
    if let Some(node) = root.as_mut() {
        yaml::remove_ignored(node);
    }
    Ok(root)
}

/// Linear scan for `# <key> -- <text>` blocks. A block runs from its header
/// to the first non-comment line.
pub fn collect_descriptions(source: &str) -> Descriptions {
    let mut descriptions = Descriptions::new();
    let mut block: Vec<&str> = Vec::new();

    for line in source.lines() {
        if block.is_empty() {
            if header_key(line).is_some_and(|k| !k.is_empty()) {
                block.push(line);
            }
            continue;
        }
        if is_comment(line) {
            block.push(line);
            continue;
        }
        record(&mut descriptions, &block);
        block.clear();
    }
    record(&mut descriptions, &block);

    descriptions
}

fn record(descriptions: &mut Descriptions, block: &[&str]) {
    if let Some((key, description)) = parse_comment(block) {
        if !key.is_empty() {
            descriptions.insert(key, description);
        }
    }
}

/// Description carried by a node's own head-comment (`# -- text`).
pub fn auto_description(node: Option<&Node>) -> ValueDescription {
    let Some(node) = node else {
        return ValueDescription::default();
    };
    if !node.head_comment.contains("--") {
        return ValueDescription::default();
    }
    let lines: Vec<&str> = node.head_comment.lines().collect();
    match parse_comment(&lines) {
        Some((key, description)) if key.is_empty() => description,
        _ => ValueDescription::default(),
    }
}
