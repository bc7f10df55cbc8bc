//! Merge: fold per-file YAML trees and description maps into one.

use crate::model::{Descriptions, DocumentationInfo};
use crate::yaml::{Node, NodeKind};
use std::collections::BTreeMap;

/// Structural union of two trees. Keys present on both sides recurse when
/// both values are mappings; otherwise `overlay` wins. Keys keep the order
/// in which they first appeared.
pub fn merge_nodes(base: Node, overlay: Node) -> Node {
    match (base, overlay) {
        (
            base @ Node {
                kind: NodeKind::Mapping(_),
                ..
            },
            Node {
                kind: NodeKind::Mapping(overlay_entries),
                ..
            },
        ) => union(base, overlay_entries),
        (_, overlay) => overlay,
    }
}

fn union(mut base: Node, overlay_entries: Vec<(Node, Node)>) -> Node {
    if let NodeKind::Mapping(entries) = &mut base.kind {
        for (key, value) in overlay_entries {
            match entries.iter().position(|(k, _)| k.value == key.value) {
                Some(i) => {
                    let previous =
                        std::mem::replace(&mut entries[i].1, Node::mapping(Vec::new()));
                    entries[i].1 = merge_nodes(previous, value);
                }
                None => entries.push((key, value)),
            }
        }
    }
    base
}

/// Merge a sequence of trees starting from an empty mapping.
pub fn merge_all(nodes: impl IntoIterator<Item = Node>) -> Node {
    nodes
        .into_iter()
        .fold(Node::mapping(Vec::new()), merge_nodes)
}

/// Later maps win on key collisions.
pub fn merge_descriptions<I>(maps: I) -> Descriptions
where
    I: IntoIterator<Item = Descriptions>,
{
    let mut merged = Descriptions::new();
    for map in maps {
        merged.extend(map);
    }
    merged
}

/// Combine per-root infos for single-file output. A single entry passes
/// through untouched.
pub fn combine_documentation_info(infos: BTreeMap<String, DocumentationInfo>) -> DocumentationInfo {
    if infos.len() == 1 {
        if let Some(info) = infos.into_values().next() {
            return info;
        }
        return DocumentationInfo::default();
    }

    let mut paths = Vec::with_capacity(infos.len());
    let mut values = Node::mapping(Vec::new());
    let mut descriptions = Vec::with_capacity(infos.len());
    for (path, info) in infos {
        paths.push(path);
        if let Some(tree) = info.values {
            values = merge_nodes(values, tree);
        }
        descriptions.push(info.values_descriptions);
    }

    DocumentationInfo {
        config_path: paths.join(", "),
        values: Some(values),
        values_descriptions: merge_descriptions(descriptions),
    }
}
