//! Parser module: config root in, `DocumentationInfo` out.

pub mod comment;
pub mod discover;
pub mod merge;
pub mod scan;
pub mod strict;

pub use strict::ParsingConfig;

use crate::error::Result;
use crate::model::DocumentationInfo;
use std::path::Path;
use tracing::{debug, warn};

/// Scan every YAML file under `config_path`, merge the trees and the
/// description maps, then audit the result when strict mode is on.
pub fn parse_config_path(
    config_path: &Path,
    config: &ParsingConfig,
    ignore_file: &str,
) -> Result<DocumentationInfo> {
    let files = discover::find_yaml_files(config_path, ignore_file)?;
    debug!(root = %config_path.display(), files = files.len(), "parsing config root");

    let mut trees = Vec::with_capacity(files.len());
    let mut descriptions = Vec::with_capacity(files.len());
    for file in &files {
        match scan::scan_file(file) {
            Ok(scanned) => {
                trees.extend(scanned.values);
                descriptions.push(scanned.descriptions);
            }
            Err(e) => warn!(
                "Error occurred in reading configuration file {}, skipping: {}",
                file.display(),
                e
            ),
        }
    }

    let values = merge::merge_all(trees);
    let values_descriptions = merge::merge_descriptions(descriptions);

    if config.strict_mode {
        strict::check_documentation(&values, &values_descriptions, config)?;
    }

    Ok(DocumentationInfo {
        config_path: config_path.display().to_string(),
        values: Some(values),
        values_descriptions,
    })
}
