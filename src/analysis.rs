use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum Decision {
    #[serde(rename = "Strong Screen")]
    StrongScreen,
    Screen,
    Maybe,
    #[serde(rename = "No Screen")]
    NoScreen,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Decision {
    pub fn label(self) -> &'static str {
        match self {
            Decision::StrongScreen => "Strong Screen",
            Decision::Screen => "Screen",
            Decision::Maybe => "Maybe",
            Decision::NoScreen => "No Screen",
            Decision::Unknown => "Unknown",
        }
    }

    /// CSS class used by the HTML badge.
    pub fn css_class(self) -> &'static str {
        match self {
            Decision::StrongScreen => "strong-screen",
            Decision::Screen => "screen",
            Decision::NoScreen => "no-screen",
            Decision::Maybe | Decision::Unknown => "maybe",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Pillar {
    pub name: Option<String>,
    pub score: f64,
    pub level: Option<u8>,
    pub evidence: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
}

impl Pillar {
    pub fn level_name(&self) -> &'static str {
        match self.level {
            Some(1) => "Developing",
            Some(2) => "Functional",
            Some(3) => "Proficient",
            Some(4) => "Advanced",
            Some(5) => "Expert",
            _ => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MinimumThresholds {
    pub all_met: bool,
    pub personal_ai_projects: bool,
    pub building_in_public: bool,
    pub resume_creativity: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CriticalQuestions {
    pub paradigm_shift_examples: Vec<String>,
    pub future_proofing_examples: Vec<String>,
    pub magic_wand_examples: Vec<String>,
}

impl CriticalQuestions {
    pub fn is_empty(&self) -> bool {
        self.paradigm_shift_examples.is_empty()
            && self.future_proofing_examples.is_empty()
            && self.magic_wand_examples.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MustHaveSignals {
    pub all_present: bool,
    pub signals_found: Vec<String>,
    pub signals_missing: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DifferentiationSignals {
    pub count: u32,
    pub sufficient_for_strong_screen: bool,
    #[serde(alias = "signals")]
    pub signals_found: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DesignEvaluation {
    pub score: Option<f64>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub model_display_name: Option<String>,
}

/// One provider's evaluation of a candidate.
///
/// Every field is optional on the wire. Producers are inconsistent about a few
/// key names (`red_flags_found` vs `red_flags` and so on); both spellings are
/// accepted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub candidate_name: Option<String>,
    pub total_score: f64,
    pub weighted_score: f64,
    pub decision: Decision,
    pub decision_rationale: String,
    pub recommendation: String,
    pub pillars: BTreeMap<String, Pillar>,
    pub top_strengths: Vec<String>,
    pub top_concerns: Vec<String>,
    pub suitable_roles: Vec<String>,
    pub interview_focus_areas: Vec<String>,
    #[serde(rename = "minimum_thresholds_met", alias = "minimum_thresholds")]
    pub minimum_thresholds: Option<MinimumThresholds>,
    #[serde(rename = "red_flags_found", alias = "red_flags")]
    pub red_flags: Vec<String>,
    #[serde(rename = "yellow_flags_found", alias = "yellow_flags")]
    pub yellow_flags: Vec<String>,
    #[serde(rename = "critical_questions_analysis", alias = "critical_questions")]
    pub critical_questions: Option<CriticalQuestions>,
    pub must_have_signals: MustHaveSignals,
    pub differentiation_signals: DifferentiationSignals,
    pub design_evaluation: Option<DesignEvaluation>,
    #[serde(rename = "_metadata")]
    pub metadata: Metadata,
}

impl Analysis {
    /// Parse producer output, tolerating a surrounding markdown code fence.
    pub fn from_json(raw: &str) -> Result<Self> {
        let json = strip_markdown_fences(raw);
        serde_json::from_str(&json)
            .map_err(|e| Error::AnalysisShape(format!("failed to parse analysis JSON: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw).map_err(|e| match e {
            Error::AnalysisShape(msg) => Error::AnalysisShape(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn candidate(&self) -> &str {
        self.candidate_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Candidate")
    }

    pub fn model_display_name(&self) -> Option<&str> {
        self.metadata
            .model_display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
    }
}

/// Remove markdown code fences from a string, returning the inner content.
/// Handles ` ```json `, ` ``` `, and bare JSON.
fn strip_markdown_fences(input: &str) -> String {
    let trimmed = input.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Skip the optional language tag on the opening fence line
        let after_tag = match rest.find('\n') {
            Some(pos) => &rest[pos + 1..],
            None => return String::new(),
        };

        if let Some(pos) = after_tag.rfind("```") {
            return after_tag[..pos].trim().to_string();
        }
        return after_tag.trim().to_string();
    }

    trimmed.to_string()
}
