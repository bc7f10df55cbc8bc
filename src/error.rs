//! Error types shared by the parsing and rendering pipeline.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{message} - {config_path}")]
    Parse {
        config_path: String,
        message: String,
    },

    #[error("No YAML files were found in the path - {config_path}")]
    NoYamlFiles { config_path: String },

    #[error("values without documentation: \n{}", paths.join("\n"))]
    Undocumented { paths: Vec<String> },

    #[error("failed to marshal default value for {key}: {message}")]
    Flatten { key: String, message: String },

    #[error("values file must resolve to a map (was {kind})")]
    NotAMapping { kind: &'static str },

    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    #[error("template error: {}", describe_tera(.0))]
    Template(#[from] tera::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Tera keeps the useful detail in the source chain.
fn describe_tera(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

impl Error {
    pub fn parse(config_path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            config_path: config_path.into(),
            message: message.into(),
        }
    }

    /// Whether this failure must abort the whole run instead of skipping one input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Undocumented { .. } | Error::InvalidRegex { .. })
    }
}
