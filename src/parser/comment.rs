//! Comment microformat parser: one comment block in, one description out.
//!
//! ```text
//! # image.tag -- (string) @required image tag
//! # @default -- chart appVersion
//! # @section -- Image
//! ```

use crate::model::ValueDescription;
use regex::Regex;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

// Keys are dotted paths; quoted segments may contain whitespace.
static RE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*#\s*((?:[^\s"]|"[^"]*")*)\s+--\s*(.*)$"#).unwrap()
});

static RE_RAW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#\s*@raw\s*$").unwrap());

static RE_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*@default\s+--\s*(.*)$").unwrap());

static RE_NOTATION_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*@notationType\s+--\s*(.*)$").unwrap());

static RE_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*@section\s+--\s*(.*)$").unwrap());

static RE_SECTION_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\s*@sectionDescription(\s+@raw)?\s+--\s*(.*)$").unwrap()
});

static RE_EXAMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*@example\s+(.*?)\s*--\s*(.*)$").unwrap());

static RE_EXAMPLE_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\s*@exampleDescription(\s+@raw)?\s+--\s*(.*)$").unwrap()
});

static RE_CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s?(.*)$").unwrap());

static RE_HEADER_FLAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\(([^)]+)\)\s+)?((?:@\w+\s+)*)(.*)$").unwrap());

// -- Line classification ------------------------------------------------------

/// A header line and the key it documents. Directive lines
/// (`# @section -- ...`) share the shape and are excluded.
pub fn header_key(line: &str) -> Option<&str> {
    let caps = RE_HEADER.captures(line)?;
    let key = caps.get(1).map_or("", |m| m.as_str());
    if key.starts_with('@') {
        return None;
    }
    Some(key)
}

pub fn is_comment(line: &str) -> bool {
    RE_CONTINUATION.is_match(line)
}

/// Field receiving bare continuation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    Description,
    SectionDescription { raw: bool },
    Example,
    ExampleDescription { raw: bool },
}

fn append(field: &mut String, text: &str, raw: bool) {
    if field.is_empty() {
        field.push_str(text);
        return;
    }
    if raw {
        field.push('\n');
        field.push_str(text);
    } else if !text.is_empty() {
        field.push(' ');
        field.push_str(text);
    }
}

// -- Public API ---------------------------------------------------------------

/// Parse one comment block into `(key, description)`.
///
/// Returns `None` when the block has no header line. The key is empty for
/// the auto-description form `# -- text`. When several headers appear,
/// only the sub-block starting at the last one is parsed.
pub fn parse_comment<S: AsRef<str>>(lines: &[S]) -> Option<(String, ValueDescription)> {
    let start = lines
        .iter()
        .rposition(|l| header_key(l.as_ref()).is_some())?;
    let caps = RE_HEADER.captures(lines[start].as_ref())?;
    let key = caps[1].to_string();

    let mut d = ValueDescription::default();
    apply_header_flags(&mut d, &caps[2]);

    let mut open = Open::Description;
    let mut raw_description = false;

    for line in &lines[start + 1..] {
        let line = line.as_ref();

        if RE_RAW.is_match(line) {
            raw_description = true;
            open = Open::Description;
            continue;
        }
        if let Some(caps) = RE_DEFAULT.captures(line) {
            d.default = caps[1].to_string();
            open = Open::Description;
            continue;
        }
        if let Some(caps) = RE_NOTATION_TYPE.captures(line) {
            d.notation_type = caps[1].to_string();
            open = Open::Description;
            continue;
        }
        if let Some(caps) = RE_SECTION_DESCRIPTION.captures(line) {
            d.section_description = caps[2].to_string();
            open = Open::SectionDescription {
                raw: caps.get(1).is_some(),
            };
            continue;
        }
        if let Some(caps) = RE_SECTION.captures(line) {
            d.section = caps[1].to_string();
            open = Open::Description;
            continue;
        }
        if let Some(caps) = RE_EXAMPLE_DESCRIPTION.captures(line) {
            d.example_description = caps[2].to_string();
            open = Open::ExampleDescription {
                raw: caps.get(1).is_some(),
            };
            continue;
        }
        if let Some(caps) = RE_EXAMPLE.captures(line) {
            d.example_name = caps[1].to_string();
            d.example.clear();
            if d.example_description.is_empty() {
                d.example_description = caps[2].to_string();
            }
            open = Open::Example;
            continue;
        }

        let Some(caps) = RE_CONTINUATION.captures(line) else {
            continue;
        };
        let text = &caps[1];
        match open {
            Open::Description => append(&mut d.description, text, raw_description),
            Open::SectionDescription { raw } => append(&mut d.section_description, text, raw),
            Open::Example => append(&mut d.example, text, true),
            Open::ExampleDescription { raw } => append(&mut d.example_description, text, raw),
        }
    }

    Some((key, d))
}

/// Split `(type) @flag @flag text` into its parts.
fn apply_header_flags(d: &mut ValueDescription, text: &str) {
    let Some(caps) = RE_HEADER_FLAGS.captures(text) else {
        d.description = text.to_string();
        return;
    };
    if let Some(value_type) = caps.get(2) {
        d.value_type = value_type.as_str().to_string();
    }
    let flags = caps.get(3).map_or("", |m| m.as_str());
    for flag in flags.split_whitespace() {
        match flag {
            "@hidden" => d.hidden = true,
            "@required" => d.required = true,
            "@deprecated" => d.deprecated = true,
            "@experimental" => d.experimental = true,
            _ => {}
        }
    }
    d.description = caps[4].to_string();
}
