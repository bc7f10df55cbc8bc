//! Read-only view over the files of a config root, for templates.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

fn normalize_path(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}

/// Files under one directory, keyed by normalised path. Contents are read
/// on first access and cached.
#[derive(Debug, Clone, Default)]
pub struct Files {
    base_dir: PathBuf,
    found: BTreeMap<String, PathBuf>,
    cache: Arc<Mutex<HashMap<String, Arc<Vec<u8>>>>>,
}

impl Files {
    pub fn from_dir(dir: &Path) -> Self {
        let mut found = BTreeMap::new();
        let walker = WalkBuilder::new(dir).standard_filters(false).build();
        for entry in walker.flatten() {
            if entry.file_type().is_some_and(|t| t.is_file()) {
                found.insert(normalize_path(entry.path()), entry.into_path());
            }
        }
        Files {
            base_dir: dir.to_path_buf(),
            found,
            cache: Arc::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    fn data(&self, key: &str) -> Arc<Vec<u8>> {
        if let Some(data) = self.cache.lock().get(key) {
            return Arc::clone(data);
        }
        let Some(path) = self.found.get(key) else {
            return Arc::default();
        };
        let data = match fs::read(path) {
            Ok(data) => Arc::new(data),
            Err(e) => {
                warn!("Error reading file contents for {}: {}", path.display(), e);
                Arc::default()
            }
        };
        self.cache.lock().insert(key.to_string(), Arc::clone(&data));
        data
    }

    fn key_for(&self, name: &str) -> String {
        normalize_path(&self.base_dir.join(name))
    }

    /// Contents of `name` relative to the root; empty when absent.
    pub fn get_bytes(&self, name: &str) -> Vec<u8> {
        self.data(&self.key_for(name)).as_ref().clone()
    }

    pub fn get(&self, name: &str) -> String {
        String::from_utf8_lossy(&self.data(&self.key_for(name))).into_owned()
    }

    /// Subset matching a glob relative to the root. `*` does not cross `/`.
    pub fn glob(&self, pattern: &str) -> Files {
        let mut subset = Files {
            base_dir: self.base_dir.clone(),
            found: BTreeMap::new(),
            cache: Arc::clone(&self.cache),
        };
        // only the caller's pattern is glob syntax, not the root's own path
        let base = Pattern::escape(&normalize_path(&self.base_dir));
        let full = format!("{}/{}", base.trim_end_matches('/'), pattern);
        let compiled = match Pattern::new(&full) {
            Ok(p) => p,
            Err(e) => {
                warn!("Error compiling Glob pattern {}: {}", full, e);
                return subset;
            }
        };
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };
        for (key, path) in &self.found {
            if compiled.matches_with(key, options) {
                subset.found.insert(key.clone(), path.clone());
            }
        }
        subset
    }

    /// Paths relative to the root, sorted.
    pub fn names(&self) -> Vec<String> {
        self.found
            .values()
            .map(|p| normalize_path(p.strip_prefix(&self.base_dir).unwrap_or(p)))
            .collect()
    }

    fn as_map<F>(&self, encode: F) -> String
    where
        F: Fn(&[u8]) -> String,
    {
        if self.found.is_empty() {
            return String::new();
        }
        let mut map = BTreeMap::new();
        for (key, path) in &self.found {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            map.insert(name, encode(&self.data(key)));
        }
        to_yaml(&map)
    }

    /// YAML map of base file name to contents.
    pub fn as_config(&self) -> String {
        self.as_map(|data| String::from_utf8_lossy(data).into_owned())
    }

    /// YAML map of base file name to base64 contents.
    pub fn as_secrets(&self) -> String {
        self.as_map(|data| STANDARD.encode(data))
    }

    pub fn lines(&self, name: &str) -> Vec<String> {
        let key = self.key_for(name);
        if !self.found.contains_key(&key) {
            return Vec::new();
        }
        String::from_utf8_lossy(&self.data(&key))
            .split('\n')
            .map(str::to_string)
            .collect()
    }
}

/// YAML without the trailing newline; errors render as empty text.
pub fn to_yaml<T: serde::Serialize + ?Sized>(value: &T) -> String {
    match serde_yaml::to_string(value) {
        Ok(s) => s.trim_end_matches('\n').to_string(),
        Err(_) => String::new(),
    }
}
