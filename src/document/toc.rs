//! GitHub-flavored markdown anchors for the section table of contents.

/// GitHub heading anchor slug.
///
/// - lowercase
/// - drop every char that isn't alphanumeric, space, underscore or hyphen
/// - replace spaces with hyphens
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// `[text](#slug)` pointing at the heading rendered for `text`.
pub fn markdown_link(text: &str) -> String {
    format!("[{}](#{})", text, github_slug(text))
}
