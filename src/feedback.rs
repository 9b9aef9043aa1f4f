//! Feedback grouping: classify tagged items into themes, then fold each
//! theme's items into one paragraph with the source tag moved to the end.

use std::sync::LazyLock;

use regex::Regex;

use crate::themes::{OTHER_THEME, ThemeGroup, ThemeTable};

/// Optional emphasis open, `[label]`, optional emphasis close, then the text.
static SOURCE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A(?:\*\*|__|<strong>)?\[([^\]]+)\](?:\*\*|__|</strong>)?\s*(?s:(.*))\z")
        .expect("source tag pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Label(String),
    Untagged,
}

/// Texts that share a source, in input order, with the tag removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceGroup {
    pub source: Source,
    pub texts: Vec<String>,
}

/// A classified theme with its reassembled paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeParagraph {
    pub theme: String,
    pub paragraph: String,
}

/// Prefix `text` with a bold `[label]` tag, the form [`reassemble`] expects.
pub fn tag_item(label: &str, text: &str) -> String {
    format!("**[{label}]** {text}")
}

/// Split a leading source tag off an item. A literal `[Other]` tag counts as
/// untagged.
pub fn split_source_tag(item: &str) -> (Source, String) {
    match SOURCE_TAG.captures(item) {
        Some(caps) => {
            let text = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
            let source = match &caps[1] {
                OTHER_THEME => Source::Untagged,
                label => Source::Label(label.to_string()),
            };
            (source, text)
        }
        None => (Source::Untagged, item.trim().to_string()),
    }
}

/// Group items by source label, preserving first-seen label order.
pub fn source_groups<S: AsRef<str>>(items: &[S]) -> Vec<SourceGroup> {
    let mut groups: Vec<SourceGroup> = Vec::new();
    for item in items {
        let (source, text) = split_source_tag(item.as_ref());
        match groups.iter_mut().find(|g| g.source == source) {
            Some(group) => group.texts.push(text),
            None => groups.push(SourceGroup {
                source,
                texts: vec![text],
            }),
        }
    }
    groups
}

/// Fold tagged items into a paragraph: `"a. b. [X] c. [Y]"`.
pub fn reassemble<S: AsRef<str>>(items: &[S]) -> String {
    source_groups(items)
        .iter()
        .map(combine_group)
        .collect::<Vec<_>>()
        .join(" ")
}

fn combine_group(group: &SourceGroup) -> String {
    let mut combined = group
        .texts
        .iter()
        .map(|t| t.strip_suffix('.').unwrap_or(t))
        .collect::<Vec<_>>()
        .join(". ");
    if !combined.ends_with('.') {
        combined.push('.');
    }
    match &group.source {
        Source::Label(label) => format!("{combined} [{label}]"),
        Source::Untagged => combined,
    }
}

/// Classify items into themes and reassemble each theme's items.
pub fn group_by_theme<S: AsRef<str>>(items: &[S], table: &ThemeTable) -> Vec<ThemeParagraph> {
    table
        .classify(items)
        .into_iter()
        .map(|ThemeGroup { name, items }| ThemeParagraph {
            paragraph: reassemble(&items),
            theme: name,
        })
        .collect()
}
