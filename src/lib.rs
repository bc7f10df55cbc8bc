//! Markdown reference documentation from annotated YAML configuration files.

pub mod document;
pub mod error;
pub mod model;
pub mod parallel;
pub mod parser;
pub mod yaml;

pub use error::{Error, Result};
