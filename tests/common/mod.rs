#![allow(dead_code)]

use std::path::PathBuf;

use scorecard::analysis::Analysis;
use scorecard::consensus::{Consensus, ProviderAnalysis};
use scorecard::themes::ThemeTable;

/// Fixed timestamp so rendered reports are comparable.
pub const GENERATED_AT: &str = "January 02, 2026 at 09:30:00";

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> Analysis {
    Analysis::load(&fixture_path(name)).unwrap()
}

/// Consensus over the `openai` and `claude` fixtures, in that order.
pub fn fixture_consensus() -> Consensus {
    Consensus::build(
        vec![
            ProviderAnalysis::new("openai", load_fixture("openai.json")),
            ProviderAnalysis::new("claude", load_fixture("claude.json")),
        ],
        &ThemeTable::standard(),
    )
    .unwrap()
}
