//! Input discovery: every `.yaml` / `.yml` file under a config root.
//!
//! Ignore files are read from each traversed directory and from the
//! directories above the root, gitignore style.

use crate::error::{Error, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::warn;

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn walker(root: &Path, ignore_file: &str) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .parents(true)
        .add_custom_ignore_filename(ignore_file)
        .sort_by_file_name(|a, b| a.cmp(b));
    if let Ok(cwd) = std::env::current_dir() {
        let local = cwd.join(ignore_file);
        if local.is_file() {
            if let Some(e) = builder.add_ignore(&local) {
                warn!("could not read ignore file {}: {}", local.display(), e);
            }
        }
    }
    builder
}

/// YAML inputs of one config root. A file root is its own only input,
/// unless it is not YAML or its directory's ignore files exclude it.
pub fn find_yaml_files(config_path: &Path, ignore_file: &str) -> Result<Vec<PathBuf>> {
    let file_root = config_path.is_file();
    let builder = if file_root {
        let dir = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let name = config_path.file_name().map(|n| n.to_os_string());
        let mut builder = walker(dir, ignore_file);
        builder.max_depth(Some(1)).filter_entry(move |entry| {
            entry.depth() == 0 || Some(entry.file_name()) == name.as_deref()
        });
        builder
    } else {
        walker(config_path, ignore_file)
    };

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping entry under {}: {}", config_path.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) || !is_yaml(entry.path()) {
            continue;
        }
        // a file root is reported as given
        files.push(if file_root {
            config_path.to_path_buf()
        } else {
            entry.into_path()
        });
    }

    if files.is_empty() {
        return Err(Error::NoYamlFiles {
            config_path: config_path.display().to_string(),
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn collects_yaml_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "values.yaml", "x: 1\n");
        touch(dir.path(), "extra.yml", "y: 1\n");
        touch(dir.path(), "notes.txt", "nope\n");
        touch(dir.path(), "sub/more.yaml", "z: 1\n");
        let files = find_yaml_files(dir.path(), ".yamldocsignore").unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("extra.yml"),
                dir.path().join("sub/more.yaml"),
                dir.path().join("values.yaml"),
            ]
        );
    }

    #[test]
    fn ignore_file_excludes_inputs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "values.yaml", "x: 1\n");
        touch(dir.path(), "secret.yaml", "y: 1\n");
        touch(dir.path(), ".yamldocsignore", "secret.yaml\n");
        let files = find_yaml_files(dir.path(), ".yamldocsignore").unwrap();
        assert_eq!(files, vec![dir.path().join("values.yaml")]);
    }

    #[test]
    fn empty_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "readme.txt", "nothing\n");
        let err = find_yaml_files(dir.path(), ".yamldocsignore").unwrap_err();
        assert!(matches!(err, Error::NoYamlFiles { .. }));
    }

    #[test]
    fn file_root_is_its_own_input() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "conf.yaml", "x: 1\n");
        let file = dir.path().join("conf.yaml");
        assert_eq!(find_yaml_files(&file, ".yamldocsignore").unwrap(), vec![file]);
    }

    #[test]
    fn non_yaml_file_root_has_no_inputs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt", "x: 1\n");
        let err = find_yaml_files(&dir.path().join("notes.txt"), ".yamldocsignore").unwrap_err();
        assert!(matches!(err, Error::NoYamlFiles { .. }));
    }

    #[test]
    fn ignored_file_root_has_no_inputs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "secret.yaml", "x: 1\n");
        touch(dir.path(), "values.yaml", "y: 1\n");
        touch(dir.path(), ".yamldocsignore", "secret.yaml\n");
        let err = find_yaml_files(&dir.path().join("secret.yaml"), ".yamldocsignore").unwrap_err();
        assert!(matches!(err, Error::NoYamlFiles { .. }));
        let kept = dir.path().join("values.yaml");
        assert_eq!(find_yaml_files(&kept, ".yamldocsignore").unwrap(), vec![kept]);
    }
}
