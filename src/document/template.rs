//! Tera-based documentation template with the built-in partials and the
//! file helpers registered.

use super::files::Files;
use super::filters;
use crate::error::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera, Value};
use tracing::debug;

const MAIN_TEMPLATE: &str = "yaml-docs.documentation";

const DEFAULT_DOCUMENTATION_TEMPLATE: &str = include_str!("../../templates/documentation.tera");

const PARTIALS: [(&str, &str); 9] = [
    ("config.macros", include_str!("../../templates/config.macros.tera")),
    ("config.pageBreak", include_str!("../../templates/config.pageBreak.tera")),
    ("config.sectionToc", include_str!("../../templates/config.sectionToc.tera")),
    (
        "config.examplesSection",
        include_str!("../../templates/config.examplesSection.tera"),
    ),
    ("config.valuesTable", include_str!("../../templates/config.valuesTable.tera")),
    ("config.valuesSection", include_str!("../../templates/config.valuesSection.tera")),
    (
        "config.valuesSectionHtml",
        include_str!("../../templates/config.valuesSectionHtml.tera"),
    ),
    (
        "yaml-docs.versionFooter",
        include_str!("../../templates/yaml-docs.versionFooter.tera"),
    ),
    ("yaml-docs.default", DEFAULT_DOCUMENTATION_TEMPLATE),
];

/// Concatenate the user's template files. The built-in template is
/// appended when any of them is missing or unreadable, or when none were
/// given.
pub fn documentation_template(template_files: &[PathBuf]) -> String {
    let mut contents = String::new();
    let mut fall_back = template_files.is_empty();

    for path in template_files {
        match fs::read_to_string(path) {
            Ok(text) => contents.push_str(&text),
            Err(e) => {
                debug!(
                    "Did not find template file {}, using default template: {}",
                    path.display(),
                    e
                );
                fall_back = true;
            }
        }
    }
    debug!("Using template files {:?}", template_files);

    if fall_back {
        contents.push_str(DEFAULT_DOCUMENTATION_TEMPLATE);
    }
    contents
}

fn str_arg<'a>(args: &'a HashMap<String, Value>, name: &str, function: &str) -> tera::Result<&'a str> {
    args.get(name).and_then(Value::as_str).ok_or_else(|| {
        tera::Error::msg(format!("{function} expects a string `{name}` argument"))
    })
}

/// Contents of `path` (relative to the working directory) without its final
/// newline. Missing files read as empty.
fn include_file(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let path = str_arg(args, "path", "include_file")?;
    if path.is_empty() {
        return Ok(Value::String(String::new()));
    }
    let content = fs::read_to_string(Path::new(path)).unwrap_or_default();
    Ok(Value::String(
        content.strip_suffix('\n').unwrap_or(&content).to_string(),
    ))
}

fn selected(files: &Files, args: &HashMap<String, Value>) -> Files {
    match args.get("pattern").and_then(Value::as_str) {
        Some(pattern) => files.glob(pattern),
        None => files.clone(),
    }
}

fn register_files(tera: &mut Tera, files: &Files) {
    let f = files.clone();
    tera.register_function(
        "files_get",
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            Ok(Value::String(f.get(str_arg(args, "name", "files_get")?)))
        },
    );

    let f = files.clone();
    tera.register_function(
        "files_get_bytes",
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let bytes = f.get_bytes(str_arg(args, "name", "files_get_bytes")?);
            Ok(Value::Array(bytes.into_iter().map(Value::from).collect()))
        },
    );

    let f = files.clone();
    tera.register_function(
        "files_glob",
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let names = f.glob(str_arg(args, "pattern", "files_glob")?).names();
            Ok(Value::Array(names.into_iter().map(Value::String).collect()))
        },
    );

    let f = files.clone();
    tera.register_function(
        "files_as_config",
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            Ok(Value::String(selected(&f, args).as_config()))
        },
    );

    let f = files.clone();
    tera.register_function(
        "files_as_secrets",
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            Ok(Value::String(selected(&f, args).as_secrets()))
        },
    );

    let f = files.clone();
    tera.register_function(
        "files_lines",
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let lines = f.lines(str_arg(args, "path", "files_lines")?);
            Ok(Value::Array(lines.into_iter().map(Value::String).collect()))
        },
    );
}

/// One compiled documentation template.
#[derive(Debug)]
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(template_files: &[PathBuf], files: &Files) -> Result<Self> {
        Self::from_source(&documentation_template(template_files), files)
    }

    pub fn from_source(source: &str, files: &Files) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());

        let mut templates: Vec<(&str, &str)> = PARTIALS.to_vec();
        templates.push((MAIN_TEMPLATE, source));
        tera.add_raw_templates(templates)?;

        tera.register_filter("to_yaml", filters::to_yaml);
        tera.register_filter("trim_lead", filters::trim_lead);
        tera.register_filter("to_yaml_code_block", filters::to_yaml_code_block);
        tera.register_filter("to_markdown_link", filters::to_markdown_link);
        tera.register_filter("to_pretty_json", filters::to_pretty_json);
        tera.register_function("include_file", include_file);
        register_files(&mut tera, files);

        Ok(TemplateEngine { tera })
    }

    pub fn render<T: Serialize>(&self, data: &T) -> Result<String> {
        let context = Context::from_serialize(data)?;
        Ok(self.tera.render(MAIN_TEMPLATE, &context)?)
    }
}
