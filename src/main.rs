//! yaml-docs: generate markdown reference documentation from annotated
//! YAML configuration files.
//!
//! - **search mode**: `yaml-docs -c charts/app` documents every YAML file
//!   under the root as one tree
//! - **file mode**: `yaml-docs -f values.yaml,extra.yaml` treats each file as
//!   its own root

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::{self, PathBuf};
use tracing::{error, warn, Level};
use yaml_docs::document::organize::{OrganizeOptions, SortOrder};
use yaml_docs::document::{self, RenderOptions};
use yaml_docs::model::DocumentationInfo;
use yaml_docs::parser::{self, merge, ParsingConfig};
use yaml_docs::parallel;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(
    name = "yaml-docs",
    version,
    about = "Generate markdown documentation from annotated YAML configuration files"
)]
struct Cli {
    /// Directory searched recursively for YAML files. Exclusive with --config-file.
    #[arg(short = 'c', long, env = "YAML_DOCS_CONFIG_SEARCH_ROOT")]
    config_search_root: Option<PathBuf>,

    /// YAML file(s) to document, each as its own root
    #[arg(
        short = 'f',
        long,
        env = "YAML_DOCS_CONFIG_FILE",
        value_delimiter = ','
    )]
    config_file: Vec<PathBuf>,

    /// Template files, rendered in order. Missing files fall back to the
    /// built-in template.
    #[arg(
        short = 't',
        long,
        env = "YAML_DOCS_TEMPLATE_FILES",
        value_delimiter = ',',
        default_value = "README.md.tera"
    )]
    template_files: Vec<PathBuf>,

    /// Markdown file path the documentation is written to
    #[arg(short = 'o', long, env = "YAML_DOCS_OUTPUT_FILE", default_value = "README.md")]
    output_file: String,

    /// Output name format for --multiple-output-files; %s is the input's file name
    #[arg(
        short = 'p',
        long,
        env = "YAML_DOCS_OUTPUT_FILE_PREFIX",
        default_value = "README-%s.md"
    )]
    output_file_prefix: String,

    /// Render one document per --config-file input
    #[arg(long, env = "YAML_DOCS_MULTIPLE_OUTPUT_FILES")]
    multiple_output_files: bool,

    /// Markdown file prepended to the document, when present
    #[arg(
        short = 'H',
        long,
        env = "YAML_DOCS_HEADER_FILE",
        default_value = ".document-header.md"
    )]
    header_file: String,

    /// Per-directory ignore file name
    #[arg(
        short = 'i',
        long,
        env = "YAML_DOCS_IGNORE_FILE",
        default_value = ".yamldocsignore"
    )]
    ignore_file: String,

    /// Row order: alphanum or file
    #[arg(
        short = 's',
        long,
        env = "YAML_DOCS_SORT_VALUES_ORDER",
        default_value = "alphanum"
    )]
    sort_values_order: String,

    /// Fail when a value has no documentation
    #[arg(short = 'x', long, env = "YAML_DOCS_DOCUMENTATION_STRICT_MODE")]
    documentation_strict_mode: bool,

    /// Value paths allowed to be undocumented in strict mode
    #[arg(
        short = 'y',
        long,
        env = "YAML_DOCS_DOCUMENTATION_STRICT_IGNORE_ABSENT",
        value_delimiter = ',',
        default_values = ["service.type", "image.repository", "image.tag"]
    )]
    documentation_strict_ignore_absent: Vec<String>,

    /// Regexes of value paths allowed to be undocumented in strict mode
    #[arg(
        short = 'z',
        long,
        env = "YAML_DOCS_DOCUMENTATION_STRICT_IGNORE_ABSENT_REGEX",
        value_delimiter = ',',
        default_values = [r".*service\.type", r".*image\.repository", r".*image\.tag"]
    )]
    documentation_strict_ignore_absent_regex: Vec<String>,

    /// Leave out values that have no description
    #[arg(long, env = "YAML_DOCS_IGNORE_NON_DESCRIPTIONS")]
    ignore_non_descriptions: bool,

    /// Undocumented values do not inherit the section of the previous value
    #[arg(long, env = "YAML_DOCS_DISABLE_SECTION_INHERITANCE")]
    disable_section_inheritance: bool,

    /// Omit the version footer from the default template
    #[arg(long, env = "YAML_DOCS_SKIP_VERSION_FOOTER")]
    skip_version_footer: bool,

    /// Omit the table of contents
    #[arg(long, env = "YAML_DOCS_SKIP_TOC")]
    skip_toc: bool,

    /// Separate sections with rules instead of HTML page breaks
    #[arg(long, env = "YAML_DOCS_NO_SECTION_PAGE_BREAKS")]
    no_section_page_breaks: bool,

    /// Print the documentation to stdout instead of writing files
    #[arg(short = 'd', long, env = "YAML_DOCS_DRY_RUN")]
    dry_run: bool,

    /// panic, fatal, error, warn, info, debug or trace
    #[arg(short = 'l', long, env = "YAML_DOCS_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            template_files: self.template_files.clone(),
            output_file: self.output_file.clone(),
            output_file_prefix: self.output_file_prefix.clone(),
            multiple_output_files: self.multiple_output_files,
            header_file: self.header_file.clone(),
            skip_version_footer: self.skip_version_footer,
            skip_toc: self.skip_toc,
            dry_run: self.dry_run,
            organize: OrganizeOptions {
                sort_order: SortOrder::parse_or_default(&self.sort_values_order),
                ignore_non_descriptions: self.ignore_non_descriptions,
                disable_section_inheritance: self.disable_section_inheritance,
                no_section_page_breaks: self.no_section_page_breaks,
            },
        }
    }

    fn parsing_config(&self) -> Result<ParsingConfig> {
        ParsingConfig::new(
            self.documentation_strict_mode,
            &self.documentation_strict_ignore_absent,
            &self.documentation_strict_ignore_absent_regex,
        )
        .context("error parsing the strict mode configuration")
    }

    /// Absolute config roots, validated against the exclusive input flags.
    fn config_roots(&self) -> Result<Vec<PathBuf>> {
        let roots = match (&self.config_search_root, self.config_file.is_empty()) {
            (Some(_), false) => {
                bail!("--config-search-root and --config-file cannot be used together")
            }
            (None, true) => bail!("one of --config-search-root or --config-file is required"),
            (Some(root), true) => vec![root.clone()],
            (None, false) => self.config_file.clone(),
        };

        roots
            .iter()
            .map(|root| {
                let absolute = path::absolute(root)
                    .with_context(|| format!("failed to resolve {}", root.display()))?;
                if !absolute.exists() {
                    bail!("config path does not exist: {}", absolute.display());
                }
                Ok(absolute)
            })
            .collect()
    }
}

fn log_level(name: &str) -> Result<Level> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "panic" | "fatal" | "error" => Level::ERROR,
        "warn" | "warning" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        other => bail!("invalid log level: {other}"),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(&cli.log_level)?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let roots = cli.config_roots()?;
    let parsing = cli.parsing_config()?;
    let options = cli.render_options();
    let workers = parallel::worker_count(cli.dry_run);

    let infos = parse_roots(&roots, &parsing, &cli.ignore_file, workers)?;
    if infos.is_empty() {
        warn!("No YAML files were found, documentation will not be created.");
        return Ok(());
    }

    if options.multiple_output_files {
        let results = parallel::over_infos(&infos, workers, |info| {
            (
                info.config_path.clone(),
                document::print_documentation(info, &options, VERSION),
            )
        });
        for (config_path, result) in results {
            if let Err(e) = result {
                warn!("Error generating documentation for {}: {}", config_path, e);
            }
        }
    } else {
        let combined = merge::combine_documentation_info(infos);
        if let Err(e) = document::print_documentation(&combined, &options, VERSION) {
            warn!("Error generating documentation for {}: {}", combined.config_path, e);
        }
    }

    Ok(())
}

/// Parse every root on the worker pool. Soft failures skip their root;
/// strict-mode failures are all logged before the run aborts.
fn parse_roots(
    roots: &[PathBuf],
    parsing: &ParsingConfig,
    ignore_file: &str,
    workers: usize,
) -> Result<BTreeMap<String, DocumentationInfo>> {
    let results = parallel::over_paths(roots, workers, |root| {
        parser::parse_config_path(root, parsing, ignore_file)
    });

    let mut infos = BTreeMap::new();
    let mut fatal = 0;
    for (root, result) in roots.iter().zip(results) {
        match result {
            Ok(info) => {
                infos.insert(info.config_path.clone(), info);
            }
            Err(e) if e.is_fatal() => {
                error!("{}: {}", root.display(), e);
                fatal += 1;
            }
            Err(e) => warn!(
                "Error parsing information for config path {}, skipping: {}",
                root.display(),
                e
            ),
        }
    }

    if fatal > 0 {
        bail!("documentation check failed for {fatal} config path(s)");
    }
    Ok(infos)
}
