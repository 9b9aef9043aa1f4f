//! Serializable view models handed to the report templates.
//!
//! All formatting decisions (status strings, number formatting, escaping) are
//! made here so the templates only branch on booleans and loop over lists.

use serde::Serialize;

use crate::analysis::{Analysis, CriticalQuestions, MinimumThresholds, Pillar};
use crate::consensus::{Consensus, PillarConsensus, ProviderAnalysis, STANDARD_PILLARS};
use crate::feedback::ThemeParagraph;

/// Number of cells in a pillar score bar; pillar scores are out of 10.
const SCORE_BAR_CELLS: usize = 10;

/// How free text is written into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Markdown,
    Html,
}

impl Markup {
    fn text(self, s: &str) -> String {
        match self {
            Markup::Markdown => s.to_string(),
            Markup::Html => escape_html(s),
        }
    }

    /// Multi-line prose. HTML keeps the line breaks as `<br>`.
    fn block(self, s: &str) -> String {
        match self {
            Markup::Markdown => s.to_string(),
            Markup::Html => escape_html(s).replace('\n', "<br>"),
        }
    }

    fn list(self, items: &[String]) -> Vec<String> {
        items.iter().map(|s| self.text(s)).collect()
    }
}

/// Escape HTML special characters.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Scores print without a decimal when they are whole numbers.
pub fn format_score(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

pub fn score_bar(score: f64) -> String {
    let filled = (score.round().clamp(0.0, SCORE_BAR_CELLS as f64)) as usize;
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(SCORE_BAR_CELLS - filled)
    )
}

#[derive(Debug, Serialize)]
pub struct FrameworkView {
    pub thresholds: String,
    pub red_flags: String,
    pub must_have: String,
    pub differentiation: String,
}

impl FrameworkView {
    fn new(
        thresholds_met: bool,
        thresholds_label: &str,
        red_flag_count: usize,
        missing_count: usize,
        differentiation_count: u32,
        differentiation_sufficient: bool,
    ) -> Self {
        Self {
            thresholds: if thresholds_met {
                format!("✅ {thresholds_label}")
            } else {
                "❌ Failed".to_string()
            },
            red_flags: if red_flag_count > 0 {
                format!("❌ {red_flag_count} Found")
            } else {
                "✅ None".to_string()
            },
            must_have: if missing_count == 0 {
                "✅ All Present".to_string()
            } else {
                format!("⚠️ {missing_count} Missing")
            },
            differentiation: format!(
                "{differentiation_count}/8 ({})",
                if differentiation_sufficient {
                    "✅ Sufficient"
                } else {
                    "⚠️ Needs More"
                }
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckView {
    pub label: &'static str,
    pub met: bool,
}

fn threshold_checks(t: &MinimumThresholds) -> Vec<CheckView> {
    vec![
        CheckView {
            label: "Personal AI Projects",
            met: t.personal_ai_projects,
        },
        CheckView {
            label: "Building in Public",
            met: t.building_in_public,
        },
        CheckView {
            label: "Resume Creativity",
            met: t.resume_creativity,
        },
    ]
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub title: &'static str,
    pub examples: Vec<String>,
    pub has_examples: bool,
}

fn question_views(q: &CriticalQuestions, markup: Markup) -> Vec<QuestionView> {
    [
        (
            "1. Paradigm Shift (Car vs. Faster Horse)",
            &q.paradigm_shift_examples,
        ),
        (
            "2. Future-Proofing (Gets Better with AI Advances)",
            &q.future_proofing_examples,
        ),
        (
            "3. Magic Wand Test (Designed for Full Automation)",
            &q.magic_wand_examples,
        ),
    ]
    .into_iter()
    .map(|(title, examples)| QuestionView {
        title,
        examples: markup.list(examples),
        has_examples: !examples.is_empty(),
    })
    .collect()
}

#[derive(Debug, Serialize)]
pub struct NumberedView {
    pub number: usize,
    pub text: String,
}

fn numbered(items: &[String], limit: usize, markup: Markup) -> Vec<NumberedView> {
    items
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, text)| NumberedView {
            number: i + 1,
            text: markup.text(text),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct PillarView {
    pub name: String,
    pub score: String,
    pub level: String,
    pub level_name: &'static str,
    pub score_bar: String,
    pub score_percent: String,
    pub evidence: String,
    pub strengths: Vec<String>,
    pub has_strengths: bool,
    pub gaps: Vec<String>,
    pub has_gaps: bool,
}

impl PillarView {
    fn new(name: &str, pillar: &Pillar, markup: Markup) -> Self {
        Self {
            name: markup.text(name),
            score: format_score(pillar.score),
            level: pillar
                .level
                .map_or_else(|| "N/A".to_string(), |l| l.to_string()),
            level_name: pillar.level_name(),
            score_bar: score_bar(pillar.score),
            score_percent: format_score((pillar.score * 10.0).clamp(0.0, 100.0)),
            evidence: if pillar.evidence.trim().is_empty() {
                "No evidence provided".to_string()
            } else {
                markup.block(&pillar.evidence)
            },
            strengths: markup.list(&pillar.strengths),
            has_strengths: !pillar.strengths.is_empty(),
            gaps: markup.list(&pillar.gaps),
            has_gaps: !pillar.gaps.is_empty(),
        }
    }
}

/// View of a single provider's report.
#[derive(Debug, Serialize)]
pub struct SingleView {
    pub candidate: String,
    pub generated_at: String,
    pub model_name: String,
    pub total_score: String,
    pub weighted_score: String,
    pub decision: &'static str,
    pub decision_class: &'static str,
    pub recommendation: String,
    pub decision_rationale: String,
    pub has_rationale: bool,
    pub framework: FrameworkView,
    pub has_thresholds: bool,
    pub thresholds: Vec<CheckView>,
    pub red_flags: Vec<String>,
    pub has_red_flags: bool,
    pub yellow_flags: Vec<String>,
    pub has_yellow_flags: bool,
    pub has_critical_questions: bool,
    pub critical_questions: Vec<QuestionView>,
    pub has_design: bool,
    pub design_score: String,
    pub design_comments: String,
    pub must_have_found: Vec<String>,
    pub must_have_found_count: usize,
    pub must_have_missing: Vec<String>,
    pub must_have_missing_count: usize,
    pub has_must_have_missing: bool,
    pub differentiation_count: u32,
    pub differentiation_found: Vec<String>,
    pub top_strengths: Vec<NumberedView>,
    pub top_concerns: Vec<NumberedView>,
    pub pillars: Vec<PillarView>,
    pub suitable_roles: Vec<String>,
    pub has_roles: bool,
    pub interview_areas: Vec<String>,
    pub has_interview_areas: bool,
}

impl SingleView {
    pub fn new(analysis: &Analysis, generated_at: &str, markup: Markup) -> Self {
        let thresholds = analysis.minimum_thresholds.unwrap_or_default();
        let must_have = &analysis.must_have_signals;
        let diff = &analysis.differentiation_signals;
        let questions = analysis.critical_questions.clone().unwrap_or_default();
        let design = analysis.design_evaluation.clone().unwrap_or_default();

        Self {
            candidate: markup.text(analysis.candidate()),
            generated_at: markup.text(generated_at),
            model_name: markup.text(analysis.model_display_name().unwrap_or("Unknown Model")),
            total_score: format_score(analysis.total_score),
            weighted_score: format_score(analysis.weighted_score),
            decision: analysis.decision.label(),
            decision_class: analysis.decision.css_class(),
            recommendation: markup.block(&analysis.recommendation),
            decision_rationale: markup.block(&analysis.decision_rationale),
            has_rationale: !analysis.decision_rationale.trim().is_empty(),
            framework: FrameworkView::new(
                thresholds.all_met,
                "All Met",
                analysis.red_flags.len(),
                must_have.signals_missing.len(),
                diff.count,
                diff.sufficient_for_strong_screen,
            ),
            has_thresholds: analysis.minimum_thresholds.is_some(),
            thresholds: threshold_checks(&thresholds),
            red_flags: markup.list(&analysis.red_flags),
            has_red_flags: !analysis.red_flags.is_empty(),
            yellow_flags: markup.list(&analysis.yellow_flags),
            has_yellow_flags: !analysis.yellow_flags.is_empty(),
            has_critical_questions: analysis.critical_questions.is_some(),
            critical_questions: question_views(&questions, markup),
            has_design: analysis.design_evaluation.is_some(),
            design_score: design
                .score
                .map_or_else(|| "N/A".to_string(), format_score),
            design_comments: design.comments.as_deref().map_or_else(
                || "Visual analysis not available".to_string(),
                |c| markup.block(c),
            ),
            must_have_found: markup.list(&must_have.signals_found),
            must_have_found_count: must_have.signals_found.len(),
            must_have_missing: markup.list(&must_have.signals_missing),
            must_have_missing_count: must_have.signals_missing.len(),
            has_must_have_missing: !must_have.signals_missing.is_empty(),
            differentiation_count: diff.count,
            differentiation_found: markup.list(&diff.signals_found),
            top_strengths: numbered(&analysis.top_strengths, 3, markup),
            top_concerns: numbered(&analysis.top_concerns, 3, markup),
            pillars: analysis
                .pillars
                .iter()
                .map(|(key, pillar)| {
                    PillarView::new(pillar.name.as_deref().unwrap_or(key), pillar, markup)
                })
                .collect(),
            suitable_roles: markup.list(&analysis.suitable_roles),
            has_roles: !analysis.suitable_roles.is_empty(),
            interview_areas: markup.list(&analysis.interview_focus_areas),
            has_interview_areas: !analysis.interview_focus_areas.is_empty(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryView {
    pub name: String,
    pub recommendation: String,
}

#[derive(Debug, Serialize)]
pub struct PillarRowView {
    pub name: &'static str,
    pub average: String,
    pub min: String,
    pub max: String,
    pub scores: Vec<String>,
}

impl From<&PillarConsensus> for PillarRowView {
    fn from(p: &PillarConsensus) -> Self {
        Self {
            name: p.name,
            average: format!("{:.1}", p.average),
            min: format_score(p.min),
            max: format_score(p.max),
            scores: p.scores.iter().copied().map(format_score).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ThemeView {
    pub theme: String,
    pub paragraph: String,
}

fn theme_views(paragraphs: &[ThemeParagraph], markup: Markup) -> Vec<ThemeView> {
    paragraphs
        .iter()
        .map(|p| ThemeView {
            theme: markup.text(&p.theme),
            paragraph: markup.text(&p.paragraph),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct ProviderView {
    pub name: String,
    pub score: String,
    pub decision: &'static str,
    pub recommendation: String,
    pub pillars: Vec<PillarView>,
}

impl ProviderView {
    fn new(provider: &ProviderAnalysis, markup: Markup) -> Self {
        let analysis = &provider.analysis;
        Self {
            name: markup.text(&provider.display_name()),
            score: format_score(analysis.total_score),
            decision: analysis.decision.label(),
            recommendation: markup.block(&analysis.recommendation),
            pillars: STANDARD_PILLARS
                .iter()
                .map(|&(key, name)| {
                    let pillar = analysis.pillars.get(key).cloned().unwrap_or_default();
                    PillarView::new(name, &pillar, markup)
                })
                .collect(),
        }
    }
}

/// View of the multi-provider consensus report.
#[derive(Debug, Serialize)]
pub struct ConsensusView {
    pub candidate: String,
    pub generated_at: String,
    pub provider_names: String,
    pub provider_count: usize,
    pub average_total: String,
    pub decision: &'static str,
    pub decision_class: &'static str,
    pub summaries: Vec<SummaryView>,
    pub has_summaries: bool,
    pub framework: FrameworkView,
    pub thresholds: Vec<CheckView>,
    pub red_flags: Vec<String>,
    pub has_red_flags: bool,
    pub yellow_flags: Vec<String>,
    pub has_yellow_flags: bool,
    pub has_critical_questions: bool,
    pub critical_questions: Vec<QuestionView>,
    pub must_have_found: Vec<String>,
    pub must_have_found_count: usize,
    pub has_must_have_found: bool,
    pub must_have_missing: Vec<String>,
    pub must_have_missing_count: usize,
    pub has_must_have_missing: bool,
    pub differentiation_found: Vec<String>,
    pub differentiation_found_count: usize,
    pub has_differentiation_found: bool,
    pub providers: Vec<ProviderView>,
    pub pillar_rows: Vec<PillarRowView>,
    pub strengths: Vec<ThemeView>,
    pub concerns: Vec<ThemeView>,
    pub suitable_roles: Vec<String>,
    pub has_roles: bool,
    pub interview_areas: Vec<String>,
    pub has_interview_areas: bool,
}

impl ConsensusView {
    pub fn new(consensus: &Consensus, generated_at: &str, markup: Markup) -> Self {
        let summaries: Vec<SummaryView> = consensus
            .providers
            .iter()
            .filter(|p| !p.analysis.recommendation.trim().is_empty())
            .map(|p| SummaryView {
                name: markup.text(&p.display_name()),
                recommendation: markup.block(&p.analysis.recommendation),
            })
            .collect();

        Self {
            candidate: markup.text(&consensus.candidate),
            generated_at: markup.text(generated_at),
            provider_names: markup.text(&consensus.provider_names().join(", ")),
            provider_count: consensus.providers.len(),
            average_total: format!("{:.1}", consensus.average_total),
            decision: consensus.decision.label(),
            decision_class: consensus.decision.css_class(),
            has_summaries: !summaries.is_empty(),
            summaries,
            framework: FrameworkView::new(
                consensus.thresholds.all_met,
                "Some Met",
                consensus.red_flags.len(),
                consensus.must_have_missing.len(),
                consensus.average_differentiation,
                consensus.differentiation_sufficient(),
            ),
            thresholds: threshold_checks(&consensus.thresholds),
            red_flags: markup.list(&consensus.red_flags),
            has_red_flags: !consensus.red_flags.is_empty(),
            yellow_flags: markup.list(&consensus.yellow_flags),
            has_yellow_flags: !consensus.yellow_flags.is_empty(),
            has_critical_questions: !consensus.critical_questions.is_empty(),
            critical_questions: question_views(&consensus.critical_questions, markup),
            must_have_found: markup.list(&consensus.must_have_found),
            must_have_found_count: consensus.must_have_found.len(),
            has_must_have_found: !consensus.must_have_found.is_empty(),
            must_have_missing: markup.list(&consensus.must_have_missing),
            must_have_missing_count: consensus.must_have_missing.len(),
            has_must_have_missing: !consensus.must_have_missing.is_empty(),
            differentiation_found: markup.list(&consensus.differentiation_found),
            differentiation_found_count: consensus.differentiation_found.len(),
            has_differentiation_found: !consensus.differentiation_found.is_empty(),
            providers: consensus
                .providers
                .iter()
                .map(|p| ProviderView::new(p, markup))
                .collect(),
            pillar_rows: consensus.pillars.iter().map(PillarRowView::from).collect(),
            strengths: theme_views(&consensus.strengths, markup),
            concerns: theme_views(&consensus.concerns, markup),
            suitable_roles: markup.list(&consensus.suitable_roles),
            has_roles: !consensus.suitable_roles.is_empty(),
            interview_areas: markup.list(&consensus.interview_focus_areas),
            has_interview_areas: !consensus.interview_focus_areas.is_empty(),
        }
    }
}
