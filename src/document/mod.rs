//! Document module: rows, sections and template data for one output.

pub mod files;
mod filters;
pub mod flatten;
pub mod organize;
pub mod template;
pub mod toc;

use crate::error::{Error, Result};
use crate::model::{Descriptions, DocumentationInfo, Sections, ValueRow};
use files::Files;
use organize::OrganizeOptions;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use template::TemplateEngine;
use tracing::info;

static RE_TRAILING_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +\n").unwrap());

static RE_BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Everything that shapes one rendered document.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub template_files: Vec<PathBuf>,
    pub output_file: String,
    pub output_file_prefix: String,
    pub multiple_output_files: bool,
    pub header_file: String,
    pub skip_version_footer: bool,
    pub skip_toc: bool,
    pub dry_run: bool,
    pub organize: OrganizeOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InfoView<'a> {
    pub config_path: &'a str,
    pub values_descriptions: &'a Descriptions,
}

/// The object templates render against.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateData<'a> {
    pub documentation_info: InfoView<'a>,
    pub config_path: &'a str,
    pub yaml_docs_version: &'a str,
    pub values: Vec<ValueRow>,
    pub sections: Sections,
    pub skip_version_footer: bool,
    pub document_header: &'a str,
    pub create_toc: bool,
}

pub fn template_data<'a>(
    info: &'a DocumentationInfo,
    options: &'a RenderOptions,
    version: &'a str,
) -> Result<TemplateData<'a>> {
    let rows = flatten::value_rows(info.values.as_ref(), &info.values_descriptions)?;
    let (values, sections) = organize::organize(rows, &options.organize);

    Ok(TemplateData {
        documentation_info: InfoView {
            config_path: &info.config_path,
            values_descriptions: &info.values_descriptions,
        },
        config_path: &info.config_path,
        yaml_docs_version: version,
        values,
        sections,
        skip_version_footer: options.skip_version_footer,
        document_header: &options.header_file,
        create_toc: !options.skip_toc,
    })
}

/// Strip trailing spaces and collapse runs of blank lines.
pub fn apply_markdown_format(output: &str) -> String {
    let trimmed = RE_TRAILING_SPACES.replace_all(output, "\n");
    RE_BLANK_RUNS.replace_all(&trimmed, "\n\n").into_owned()
}

fn base_filename(config_path: &str) -> String {
    Path::new(config_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| config_path.to_string())
}

/// Where the document for `config_path` goes.
pub fn output_path(config_path: &str, options: &RenderOptions) -> PathBuf {
    if options.multiple_output_files {
        PathBuf::from(
            options
                .output_file_prefix
                .replace("%s", &base_filename(config_path)),
        )
    } else {
        PathBuf::from(&options.output_file)
    }
}

/// Directory the `Files` helpers read from.
fn files_root(config_path: &str) -> Files {
    let path = Path::new(config_path);
    if path.is_dir() {
        return Files::from_dir(path);
    }
    match path.parent() {
        Some(parent) if path.is_file() => Files::from_dir(parent),
        _ => Files::default(),
    }
}

/// Render the document for `info` without writing it.
pub fn render_documentation(
    info: &DocumentationInfo,
    options: &RenderOptions,
    version: &str,
) -> Result<String> {
    let engine = TemplateEngine::new(&options.template_files, &files_root(&info.config_path))?;
    let data = template_data(info, options, version)?;
    let output = engine.render(&data)?;
    Ok(apply_markdown_format(&output))
}

/// Render and write (or print, on a dry run) the document for `info`.
pub fn print_documentation(
    info: &DocumentationInfo,
    options: &RenderOptions,
    version: &str,
) -> Result<()> {
    info!("Generating README Documentation for: {}", info.config_path);
    let output = render_documentation(info, options, version)?;

    if options.dry_run {
        let mut stdout = io::stdout().lock();
        return stdout
            .write_all(output.as_bytes())
            .map_err(|source| Error::Write {
                path: PathBuf::from("<stdout>"),
                source,
            });
    }

    let path = output_path(&info.config_path, options);
    fs::write(&path, output).map_err(|source| Error::Write { path, source })
}
