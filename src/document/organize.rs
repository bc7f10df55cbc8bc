//! Organizer: filter, sort and bucket rows into sections.

use crate::model::{Example, Section, Sections, ValueRow};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_SECTION_NAME: &str = "Other Values";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// By key, lexicographically
    #[default]
    AlphaNum,
    /// By source position of the key
    File,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alphanum" => Ok(SortOrder::AlphaNum),
            "file" => Ok(SortOrder::File),
            other => Err(format!("invalid sort order: {other}")),
        }
    }
}

impl SortOrder {
    /// Parse a user-supplied order, falling back to `alphanum` with a warning.
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            warn!("Invalid sort order provided {}, defaulting to alphanum", s);
            SortOrder::AlphaNum
        })
    }

    fn compare(self, a: &ValueRow, b: &ValueRow) -> Ordering {
        match self {
            SortOrder::AlphaNum => a.key.cmp(&b.key),
            SortOrder::File => (a.line_number, a.column).cmp(&(b.line_number, b.column)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrganizeOptions {
    pub sort_order: SortOrder,
    pub ignore_non_descriptions: bool,
    pub disable_section_inheritance: bool,
    pub no_section_page_breaks: bool,
}

pub fn remove_rows_without_description(rows: Vec<ValueRow>) -> Vec<ValueRow> {
    rows.into_iter().filter(ValueRow::has_description).collect()
}

/// Promote the inherited section onto every row.
pub fn apply_auto_sections(rows: &mut [ValueRow]) {
    for row in rows {
        row.section = row.auto_section.clone();
        row.section_description = row.auto_section_description.clone();
    }
}

/// Stable sort.
pub fn sort_rows(rows: &mut [ValueRow], order: SortOrder) {
    rows.sort_by(|a, b| order.compare(a, b));
}

fn example_of(row: &ValueRow) -> Option<Example> {
    if row.example.is_empty() {
        return None;
    }
    let example_name = if row.example_name.is_empty() {
        row.key.clone()
    } else {
        row.example_name.clone()
    };
    Some(Example {
        example_name,
        description: row.example_description.clone(),
        code_block: row.example.clone(),
    })
}

/// Bucket rows by `Section`, in first-seen order. Rows without a section
/// land in the `Other Values` pseudo-section.
pub fn bucket_rows(rows: &[ValueRow], section_break: bool) -> Sections {
    let mut sections = Sections {
        default_section: Section {
            section_name: DEFAULT_SECTION_NAME.to_string(),
            section_break,
            ..Default::default()
        },
        sections: Vec::new(),
    };

    for row in rows {
        let bucket = if row.section.is_empty() || row.section == "@default" {
            &mut sections.default_section
        } else if let Some(i) = sections
            .sections
            .iter()
            .position(|s| s.section_name == row.section)
        {
            &mut sections.sections[i]
        } else {
            sections.sections.push(Section {
                section_name: row.section.clone(),
                description: row.section_description.clone(),
                section_break,
                ..Default::default()
            });
            let last = sections.sections.len() - 1;
            &mut sections.sections[last]
        };

        bucket.section_items.push(row.clone());
        bucket.examples.extend(example_of(row));
    }

    sections
}

// -- Natural order ------------------------------------------------------------

enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut digits = None;
    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match digits {
            Some(prev) if prev != is_digit => {
                out.push(chunk(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        digits = Some(is_digit);
    }
    if let Some(prev) = digits {
        out.push(chunk(&s[start..], prev));
    }
    out
}

fn chunk(text: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(text)
    } else {
        Chunk::Text(text)
    }
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Natural ordering: digit runs compare numerically, other runs
/// lexicographically, whole-string comparison breaks ties.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (ca, cb) = (chunks(a), chunks(b));
    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = match (x, y) {
            (Chunk::Digits(x), Chunk::Digits(y)) => compare_digits(x, y),
            (Chunk::Digits(x), Chunk::Text(y)) | (Chunk::Text(x), Chunk::Digits(y)) => x.cmp(y),
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ca.len().cmp(&cb.len()).then_with(|| a.cmp(b))
}

/// Full organizer pipeline over flattened rows. Returns the rows as the
/// flat `Values` view together with the bucketed sections.
pub fn organize(mut rows: Vec<ValueRow>, options: &OrganizeOptions) -> (Vec<ValueRow>, Sections) {
    if options.ignore_non_descriptions {
        rows = remove_rows_without_description(rows);
    }
    if !options.disable_section_inheritance {
        apply_auto_sections(&mut rows);
    }
    sort_rows(&mut rows, options.sort_order);

    let mut sections = bucket_rows(&rows, !options.no_section_page_breaks);
    sort_rows(&mut sections.default_section.section_items, options.sort_order);
    for section in &mut sections.sections {
        sort_rows(&mut section.section_items, options.sort_order);
    }
    sections
        .sections
        .sort_by(|a, b| natural_cmp(&a.section_name, &b.section_name));

    (rows, sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, section: &str, line: usize) -> ValueRow {
        ValueRow {
            key: key.to_string(),
            section: section.to_string(),
            line_number: line,
            column: 1,
            ..Default::default()
        }
    }

    fn names(sections: &Sections) -> Vec<&str> {
        sections
            .sections
            .iter()
            .map(|s| s.section_name.as_str())
            .collect()
    }

    #[test]
    fn natural_order_of_sections() {
        let mut v = vec!["Section 10", "Section 2", "Section 1", "Alpha", "Section 2b"];
        v.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(v, vec!["Alpha", "Section 1", "Section 2", "Section 2b", "Section 10"]);
    }

    #[test]
    fn natural_order_is_total() {
        assert_eq!(natural_cmp("a01", "a1"), Ordering::Less);
        assert_eq!(natural_cmp("a1", "a01"), Ordering::Greater);
        assert_eq!(natural_cmp("same", "same"), Ordering::Equal);
        assert_eq!(natural_cmp("", "x"), Ordering::Less);
    }

    #[test]
    fn sort_orders() {
        let mut rows = vec![row("b", "", 1), row("a", "", 3), row("c", "", 2)];
        sort_rows(&mut rows, SortOrder::AlphaNum);
        assert_eq!(rows.iter().map(|r| r.key.as_str()).collect::<Vec<_>>(), ["a", "b", "c"]);
        sort_rows(&mut rows, SortOrder::File);
        assert_eq!(rows.iter().map(|r| r.key.as_str()).collect::<Vec<_>>(), ["b", "c", "a"]);
    }

    #[test]
    fn unknown_sort_order_falls_back() {
        assert_eq!(SortOrder::parse_or_default("bogus"), SortOrder::AlphaNum);
        assert_eq!(SortOrder::parse_or_default("file"), SortOrder::File);
    }

    #[test]
    fn buckets_merge_by_name() {
        let rows = vec![row("a", "S", 1), row("b", "", 2), row("c", "S", 3), row("d", "@default", 4)];
        let sections = bucket_rows(&rows, true);
        assert_eq!(sections.sections.len(), 1);
        assert_eq!(sections.sections[0].section_items.len(), 2);
        assert_eq!(sections.default_section.section_name, "Other Values");
        assert_eq!(sections.default_section.section_items.len(), 2);
        assert!(sections.sections[0].section_break);
    }

    #[test]
    fn examples_are_extracted() {
        let mut with_name = row("svc", "S", 1);
        with_name.example = "svc: {}".into();
        with_name.example_name = "Enable".into();
        let mut unnamed = row("other", "S", 2);
        unnamed.example = "other: 1".into();
        let sections = bucket_rows(&[with_name, unnamed], false);
        let examples = &sections.sections[0].examples;
        assert_eq!(examples[0].example_name, "Enable");
        assert_eq!(examples[1].example_name, "other");
        assert!(!sections.sections[0].section_break);
    }

    #[test]
    fn inheritance_promotes_auto_section() {
        let mut a = row("a", "S1", 1);
        a.auto_section = "S1".into();
        let mut b = row("b", "", 2);
        b.auto_section = "S1".into();
        b.auto_section_description = "first".into();

        let (_, sections) = organize(vec![a.clone(), b.clone()], &OrganizeOptions::default());
        assert_eq!(names(&sections), vec!["S1"]);
        assert_eq!(sections.sections[0].section_items.len(), 2);

        let options = OrganizeOptions {
            disable_section_inheritance: true,
            ..Default::default()
        };
        let (_, sections) = organize(vec![a, b], &options);
        assert_eq!(sections.sections[0].section_items.len(), 1);
        assert_eq!(sections.default_section.section_items[0].key, "b");
    }

    #[test]
    fn ignore_non_descriptions_drops_rows() {
        let mut described = row("a", "", 1);
        described.auto_description = "documented".into();
        let options = OrganizeOptions {
            ignore_non_descriptions: true,
            ..Default::default()
        };
        let (rows, _) = organize(vec![described, row("b", "", 2)], &options);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "a");
    }
}
