use serde::Deserialize;

use crate::error::{Error, Result};

/// Name of the implicit bucket for items that match no theme.
pub const OTHER_THEME: &str = "Other";

/// Built-in theme table. Declaration order is match precedence.
const STANDARD_THEMES: &[(&str, &[&str])] = &[
    (
        "AI Experience & Technical Knowledge",
        &[
            "ai",
            "ml",
            "machine learning",
            "technical",
            "hands-on",
            "coding",
            "engineering",
        ],
    ),
    (
        "Building in Public & Portfolio",
        &[
            "public",
            "github",
            "blog",
            "portfolio",
            "thought leadership",
            "linkedin",
            "speaking",
        ],
    ),
    (
        "Product Management Background",
        &[
            "product management",
            "pm experience",
            "product work",
            "0-to-1",
            "shipped",
        ],
    ),
    (
        "Strategic & Systems Thinking",
        &[
            "platform",
            "second-order",
            "paradigm shift",
            "strategic",
            "systems",
            "future-proof",
        ],
    ),
    (
        "Execution Speed & Velocity",
        &[
            "rapid",
            "hours",
            "days",
            "velocity",
            "prototyping",
            "shipping",
            "speed",
        ],
    ),
    (
        "Resume Quality & Creativity",
        &[
            "resume",
            "design",
            "creativity",
            "plain text",
            "visual",
            "product taste",
        ],
    ),
    (
        "Career Narrative & Trajectory",
        &[
            "career",
            "pivot",
            "narrative",
            "journey",
            "compelling story",
            "why ai",
        ],
    ),
];

/// Theme entry as written in the config file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    /// Lowercase substrings; any one of them matching assigns the item.
    pub keywords: Vec<String>,
}

impl Theme {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, item_lower: &str) -> bool {
        self.keywords.iter().any(|k| item_lower.contains(k.as_str()))
    }
}

/// Ordered theme table.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeTable {
    themes: Vec<Theme>,
}

/// A theme name with the items assigned to it, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeGroup {
    pub name: String,
    pub items: Vec<String>,
}

impl Default for ThemeTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ThemeTable {
    pub fn new(themes: Vec<Theme>) -> Self {
        Self { themes }
    }

    pub fn standard() -> Self {
        Self::new(
            STANDARD_THEMES
                .iter()
                .map(|(name, keywords)| Theme::new(*name, keywords))
                .collect(),
        )
    }

    /// Build a table from config entries. An empty list yields the standard table.
    pub fn from_config(entries: &[ThemeConfig]) -> Result<Self> {
        if entries.is_empty() {
            return Ok(Self::standard());
        }
        validate_config(entries)?;
        Ok(Self::new(
            entries
                .iter()
                .map(|e| Theme {
                    name: e.name.trim().to_string(),
                    keywords: e
                        .keywords
                        .iter()
                        .map(|k| k.trim().to_lowercase())
                        .filter(|k| !k.is_empty())
                        .collect(),
                })
                .collect(),
        ))
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    /// Assign every item to the first theme with a matching keyword, or to
    /// [`OTHER_THEME`]. Empty groups are dropped; "Other" comes last.
    pub fn classify<S: AsRef<str>>(&self, items: &[S]) -> Vec<ThemeGroup> {
        let mut buckets: Vec<Vec<String>> = vec![Vec::new(); self.themes.len()];
        let mut other = Vec::new();

        for item in items {
            let item = item.as_ref();
            let lower = item.to_lowercase();
            match self.themes.iter().position(|t| t.matches(&lower)) {
                Some(idx) => buckets[idx].push(item.to_string()),
                None => other.push(item.to_string()),
            }
        }

        let mut groups: Vec<ThemeGroup> = self
            .themes
            .iter()
            .zip(buckets)
            .filter(|(_, items)| !items.is_empty())
            .map(|(theme, items)| ThemeGroup {
                name: theme.name.clone(),
                items,
            })
            .collect();

        if !other.is_empty() {
            groups.push(ThemeGroup {
                name: OTHER_THEME.to_string(),
                items: other,
            });
        }
        groups
    }
}

/// Classify `items` against `table`. See [`ThemeTable::classify`].
pub fn classify<S: AsRef<str>>(items: &[S], table: &ThemeTable) -> Vec<ThemeGroup> {
    table.classify(items)
}

fn validate_config(entries: &[ThemeConfig]) -> Result<()> {
    let mut seen: Vec<&str> = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(Error::ConfigValidation(
                "theme name must not be empty".to_string(),
            ));
        }
        if name.eq_ignore_ascii_case(OTHER_THEME) {
            return Err(Error::ConfigValidation(format!(
                "theme name \"{name}\" is reserved"
            )));
        }
        if seen.contains(&name) {
            return Err(Error::ConfigValidation(format!(
                "duplicate theme name: {name}"
            )));
        }
        if entry.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(Error::ConfigValidation(format!(
                "theme \"{name}\" needs at least one keyword"
            )));
        }
        seen.push(name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(groups: &[ThemeGroup]) -> Vec<&str> {
        groups.iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn test_standard_table_order() {
        let table = ThemeTable::standard();
        assert_eq!(table.themes().len(), 7);
        assert_eq!(table.themes()[0].name, "AI Experience & Technical Knowledge");
        assert_eq!(table.themes()[6].name, "Career Narrative & Trajectory");
    }

    #[test]
    fn test_classify_empty() {
        let table = ThemeTable::standard();
        let items: Vec<String> = vec![];
        assert!(table.classify(&items).is_empty());
    }

    #[test]
    fn test_classify_standard_scenario() {
        let table = ThemeTable::standard();
        let groups = classify(
            &[
                "Built an AI agent from scratch",
                "Speaks at conferences about career pivot",
            ],
            &table,
        );
        assert_eq!(
            names(&groups),
            vec![
                "AI Experience & Technical Knowledge",
                "Career Narrative & Trajectory"
            ]
        );
        assert_eq!(groups[0].items, vec!["Built an AI agent from scratch"]);
        assert_eq!(
            groups[1].items,
            vec!["Speaks at conferences about career pivot"]
        );
    }

    #[test]
    fn test_first_match_wins() {
        let table = ThemeTable::new(vec![
            Theme::new("First", &["alpha"]),
            Theme::new("Second", &["beta"]),
        ]);
        let groups = table.classify(&["beta then alpha"]);
        assert_eq!(names(&groups), vec!["First"]);
    }

    #[test]
    fn test_output_follows_declaration_order_not_input_order() {
        let table = ThemeTable::new(vec![
            Theme::new("First", &["alpha"]),
            Theme::new("Second", &["beta"]),
        ]);
        let groups = table.classify(&["beta one", "alpha one", "beta two"]);
        assert_eq!(names(&groups), vec!["First", "Second"]);
        assert_eq!(groups[1].items, vec!["beta one", "beta two"]);
    }

    #[test]
    fn test_other_is_last_and_omitted_when_empty() {
        let table = ThemeTable::new(vec![Theme::new("Only", &["match"])]);
        let groups = table.classify(&["nothing here", "a match"]);
        assert_eq!(names(&groups), vec!["Only", OTHER_THEME]);
        assert_eq!(groups[1].items, vec!["nothing here"]);

        let groups = table.classify(&["a match"]);
        assert_eq!(names(&groups), vec!["Only"]);
    }

    #[test]
    fn test_matching_is_case_insensitive_and_includes_tag() {
        let table = ThemeTable::new(vec![
            Theme::new("Tagged", &["gpt"]),
            Theme::new("Upper", &["GitHub"]),
        ]);
        let groups = table.classify(&["**[GPT-5]** plain words", "Active on GITHUB"]);
        assert_eq!(names(&groups), vec!["Tagged", "Upper"]);
    }

    #[test]
    fn test_partition_keeps_every_item_once() {
        let table = ThemeTable::standard();
        let items = vec![
            "Shipped a 0-to-1 product",
            "Writes a blog",
            "Plain text resume",
            "Unrelated remark",
            "Fast prototyping in hours",
            "Great engineering depth",
            "Unclear narrative",
            "Deep systems view",
        ];
        let groups = table.classify(&items);
        let mut flattened: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.items.iter().map(String::as_str))
            .collect();
        flattened.sort_unstable();
        let mut expected = items.clone();
        expected.sort_unstable();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_non_ascii_text_is_accepted() {
        let table = ThemeTable::standard();
        let groups = table.classify(&["Écrit du code — très rapide ✅"]);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_from_config_lowercases_keywords() {
        let table = ThemeTable::from_config(&[ThemeConfig {
            name: " Tooling ".to_string(),
            keywords: vec!["Rust".to_string(), "  ".to_string()],
        }])
        .unwrap();
        assert_eq!(table.themes()[0].name, "Tooling");
        assert_eq!(table.themes()[0].keywords, vec!["rust"]);
    }

    #[test]
    fn test_from_config_empty_is_standard() {
        assert_eq!(ThemeTable::from_config(&[]).unwrap(), ThemeTable::standard());
    }

    #[test]
    fn test_from_config_rejects_reserved_name() {
        let err = ThemeTable::from_config(&[ThemeConfig {
            name: "other".to_string(),
            keywords: vec!["x".to_string()],
        }])
        .unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn test_from_config_rejects_duplicates() {
        let entry = ThemeConfig {
            name: "Dup".to_string(),
            keywords: vec!["x".to_string()],
        };
        let err = ThemeTable::from_config(&[entry.clone(), entry]).unwrap_err();
        assert!(err.to_string().contains("duplicate theme name"));
    }

    #[test]
    fn test_from_config_rejects_empty_keywords() {
        let err = ThemeTable::from_config(&[ThemeConfig {
            name: "Empty".to_string(),
            keywords: vec![],
        }])
        .unwrap_err();
        assert!(err.to_string().contains("at least one keyword"));
    }
}
