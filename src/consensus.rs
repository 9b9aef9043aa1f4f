use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::analysis::{Analysis, CriticalQuestions, Decision, MinimumThresholds};
use crate::error::{Error, Result};
use crate::feedback::{ThemeParagraph, group_by_theme, tag_item};
use crate::themes::ThemeTable;

/// Pillar keys compared across providers, with their consensus display names.
pub const STANDARD_PILLARS: &[(&str, &str)] = &[
    ("pillar_1", "Technical Skills"),
    ("pillar_2", "Product Thinking"),
    ("pillar_3", "AI/ML Knowledge"),
    ("pillar_4", "Communication"),
    ("pillar_5", "Strategic Thinking"),
    ("pillar_6", "Execution"),
];

/// Average differentiation count at which the consensus calls the signals sufficient.
pub const SUFFICIENT_DIFFERENTIATION: u32 = 4;

/// An analysis together with the key of the provider that produced it.
#[derive(Debug, Clone)]
pub struct ProviderAnalysis {
    pub key: String,
    pub analysis: Analysis,
}

impl ProviderAnalysis {
    pub fn new(key: impl Into<String>, analysis: Analysis) -> Self {
        Self {
            key: key.into(),
            analysis,
        }
    }

    /// Model display name, falling back to the upper-cased provider key.
    pub fn display_name(&self) -> String {
        self.analysis
            .model_display_name()
            .map(str::to_string)
            .unwrap_or_else(|| self.key.to_uppercase())
    }
}

/// Add `provider` to the list, replacing the analysis of an earlier provider
/// with the same key in place. Returns true if an earlier entry was replaced.
pub fn insert_provider(providers: &mut Vec<ProviderAnalysis>, provider: ProviderAnalysis) -> bool {
    match providers.iter_mut().find(|p| p.key == provider.key) {
        Some(existing) => {
            *existing = provider;
            true
        }
        None => {
            providers.push(provider);
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PillarConsensus {
    pub key: &'static str,
    pub name: &'static str,
    /// One score per provider, in provider order. Missing pillars count as 0.
    pub scores: Vec<f64>,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone)]
pub struct Consensus {
    pub candidate: String,
    pub providers: Vec<ProviderAnalysis>,
    pub pillars: Vec<PillarConsensus>,
    pub average_total: f64,
    pub decision: Decision,
    pub thresholds: MinimumThresholds,
    pub red_flags: Vec<String>,
    pub yellow_flags: Vec<String>,
    pub critical_questions: CriticalQuestions,
    pub must_have_found: Vec<String>,
    pub must_have_missing: Vec<String>,
    pub differentiation_found: Vec<String>,
    pub average_differentiation: u32,
    pub strengths: Vec<ThemeParagraph>,
    pub concerns: Vec<ThemeParagraph>,
    pub suitable_roles: Vec<String>,
    pub interview_focus_areas: Vec<String>,
}

impl Consensus {
    /// Combine provider analyses. Fails on an empty provider list.
    pub fn build(providers: Vec<ProviderAnalysis>, themes: &ThemeTable) -> Result<Self> {
        let Some(first) = providers.first() else {
            return Err(Error::AnalysisShape(
                "consensus needs at least one provider analysis".to_string(),
            ));
        };
        let candidate = first.analysis.candidate().to_string();
        let analyses: Vec<&Analysis> = providers.iter().map(|p| &p.analysis).collect();

        let pillars = STANDARD_PILLARS
            .iter()
            .map(|&(key, name)| pillar_consensus(key, name, &analyses))
            .collect();

        let average_total = round1(mean(analyses.iter().map(|a| a.total_score)));

        let thresholds = analyses
            .iter()
            .filter_map(|a| a.minimum_thresholds)
            .fold(MinimumThresholds::default(), |acc, t| MinimumThresholds {
                all_met: acc.all_met || t.all_met,
                personal_ai_projects: acc.personal_ai_projects || t.personal_ai_projects,
                building_in_public: acc.building_in_public || t.building_in_public,
                resume_creativity: acc.resume_creativity || t.resume_creativity,
            });

        let mut critical_questions = CriticalQuestions::default();
        for q in analyses.iter().filter_map(|a| a.critical_questions.as_ref()) {
            critical_questions
                .paradigm_shift_examples
                .extend(q.paradigm_shift_examples.iter().cloned());
            critical_questions
                .future_proofing_examples
                .extend(q.future_proofing_examples.iter().cloned());
            critical_questions
                .magic_wand_examples
                .extend(q.magic_wand_examples.iter().cloned());
        }

        let average_differentiation = mean(
            analyses
                .iter()
                .map(|a| f64::from(a.differentiation_signals.count)),
        )
        .round_ties_even() as u32;

        let mut strengths = Vec::new();
        let mut concerns = Vec::new();
        for provider in &providers {
            let label = provider.display_name();
            strengths.extend(
                provider
                    .analysis
                    .top_strengths
                    .iter()
                    .map(|s| tag_item(&label, s)),
            );
            concerns.extend(
                provider
                    .analysis
                    .top_concerns
                    .iter()
                    .map(|c| tag_item(&label, c)),
            );
        }
        let strengths = group_by_theme(&strengths, themes);
        let concerns = group_by_theme(&concerns, themes);

        let consensus = Self {
            candidate,
            pillars,
            average_total,
            decision: majority_decision(&analyses),
            thresholds,
            red_flags: dedup(analyses.iter().flat_map(|a| &a.red_flags)),
            yellow_flags: dedup(analyses.iter().flat_map(|a| &a.yellow_flags)),
            critical_questions,
            must_have_found: dedup(
                analyses
                    .iter()
                    .flat_map(|a| &a.must_have_signals.signals_found),
            ),
            must_have_missing: dedup(
                analyses
                    .iter()
                    .flat_map(|a| &a.must_have_signals.signals_missing),
            ),
            differentiation_found: dedup(
                analyses
                    .iter()
                    .flat_map(|a| &a.differentiation_signals.signals_found),
            ),
            average_differentiation,
            strengths,
            concerns,
            suitable_roles: sorted_unique(analyses.iter().flat_map(|a| &a.suitable_roles)),
            interview_focus_areas: sorted_unique(
                analyses.iter().flat_map(|a| &a.interview_focus_areas),
            ),
            providers,
        };

        debug!(
            providers = consensus.providers.len(),
            average_total = consensus.average_total,
            decision = %consensus.decision,
            strength_themes = consensus.strengths.len(),
            concern_themes = consensus.concerns.len(),
            "consensus built"
        );

        Ok(consensus)
    }

    pub fn differentiation_sufficient(&self) -> bool {
        self.average_differentiation >= SUFFICIENT_DIFFERENTIATION
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.display_name()).collect()
    }
}

fn pillar_consensus(
    key: &'static str,
    name: &'static str,
    analyses: &[&Analysis],
) -> PillarConsensus {
    let scores: Vec<f64> = analyses
        .iter()
        .map(|a| a.pillars.get(key).map_or(0.0, |p| p.score))
        .collect();
    PillarConsensus {
        key,
        name,
        average: round1(mean(scores.iter().copied())),
        min: scores.iter().copied().fold(f64::INFINITY, f64::min),
        max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        scores,
    }
}

/// Most frequent decision; ties go to whichever was seen first.
fn majority_decision(analyses: &[&Analysis]) -> Decision {
    let mut counts: Vec<(Decision, usize)> = Vec::new();
    for analysis in analyses {
        match counts.iter_mut().find(|(d, _)| *d == analysis.decision) {
            Some((_, n)) => *n += 1,
            None => counts.push((analysis.decision, 1)),
        }
    }
    let mut best: Option<(Decision, usize)> = None;
    for (decision, n) in counts {
        if best.is_none_or(|(_, top)| n > top) {
            best = Some((decision, n));
        }
    }
    best.map_or(Decision::Unknown, |(d, _)| d)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Union in first-seen order.
fn dedup<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .filter(|item| seen.insert(item.as_str()))
        .cloned()
        .collect()
}

fn sorted_unique<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    items.cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Pillar;
    use crate::themes::OTHER_THEME;

    fn analysis_with(decision: Decision, total: f64, display: Option<&str>) -> Analysis {
        let mut analysis = Analysis {
            candidate_name: Some("Grace Hopper".to_string()),
            total_score: total,
            decision,
            ..Default::default()
        };
        analysis.metadata.model_display_name = display.map(str::to_string);
        analysis
    }

    fn pillar(score: f64) -> Pillar {
        Pillar {
            score,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_rejects_empty() {
        let err = Consensus::build(vec![], &ThemeTable::standard()).unwrap_err();
        assert!(matches!(err, Error::AnalysisShape(_)));
    }

    #[test]
    fn test_display_name_falls_back_to_key() {
        let p = ProviderAnalysis::new("gemini", Analysis::default());
        assert_eq!(p.display_name(), "GEMINI");
        let p = ProviderAnalysis::new(
            "openai",
            analysis_with(Decision::Screen, 0.0, Some("GPT-5")),
        );
        assert_eq!(p.display_name(), "GPT-5");
    }

    #[test]
    fn test_pillar_stats_and_totals() {
        let mut a = analysis_with(Decision::Screen, 40.0, None);
        a.pillars.insert("pillar_1".into(), pillar(8.0));
        a.pillars.insert("pillar_2".into(), pillar(5.0));
        let mut b = analysis_with(Decision::Screen, 45.0, None);
        b.pillars.insert("pillar_1".into(), pillar(6.0));
        let mut c = analysis_with(Decision::Screen, 44.0, None);
        c.pillars.insert("pillar_1".into(), pillar(7.0));

        let consensus = Consensus::build(
            vec![
                ProviderAnalysis::new("a", a),
                ProviderAnalysis::new("b", b),
                ProviderAnalysis::new("c", c),
            ],
            &ThemeTable::standard(),
        )
        .unwrap();

        assert_eq!(consensus.candidate, "Grace Hopper");
        assert_eq!(consensus.average_total, 43.0);
        assert_eq!(consensus.pillars.len(), 6);

        let technical = &consensus.pillars[0];
        assert_eq!(technical.name, "Technical Skills");
        assert_eq!(technical.scores, vec![8.0, 6.0, 7.0]);
        assert_eq!(technical.average, 7.0);
        assert_eq!(technical.min, 6.0);
        assert_eq!(technical.max, 8.0);

        let product = &consensus.pillars[1];
        assert_eq!(product.scores, vec![5.0, 0.0, 0.0]);
        assert_eq!(product.average, 1.7);
    }

    #[test]
    fn test_majority_decision_and_tie_break() {
        let build = |decisions: &[Decision]| {
            let providers = decisions
                .iter()
                .enumerate()
                .map(|(i, d)| ProviderAnalysis::new(format!("p{i}"), analysis_with(*d, 0.0, None)))
                .collect();
            Consensus::build(providers, &ThemeTable::standard())
                .unwrap()
                .decision
        };
        assert_eq!(
            build(&[Decision::Maybe, Decision::Screen, Decision::Screen]),
            Decision::Screen
        );
        assert_eq!(
            build(&[Decision::NoScreen, Decision::Screen]),
            Decision::NoScreen
        );
    }

    #[test]
    fn test_flags_are_deduplicated_in_first_seen_order() {
        let mut a = analysis_with(Decision::Maybe, 0.0, None);
        a.red_flags = vec!["No projects".into(), "Vague".into()];
        a.must_have_signals.signals_missing = vec!["Shipping".into()];
        let mut b = analysis_with(Decision::Maybe, 0.0, None);
        b.red_flags = vec!["Generic resume".into(), "No projects".into()];
        b.must_have_signals.signals_missing = vec!["Shipping".into(), "Evals".into()];

        let consensus = Consensus::build(
            vec![ProviderAnalysis::new("a", a), ProviderAnalysis::new("b", b)],
            &ThemeTable::standard(),
        )
        .unwrap();
        assert_eq!(
            consensus.red_flags,
            vec!["No projects", "Vague", "Generic resume"]
        );
        assert_eq!(consensus.must_have_missing, vec!["Shipping", "Evals"]);
    }

    #[test]
    fn test_roles_are_sorted_unique() {
        let mut a = analysis_with(Decision::Maybe, 0.0, None);
        a.suitable_roles = vec!["TPM".into(), "Data PM".into()];
        let mut b = analysis_with(Decision::Maybe, 0.0, None);
        b.suitable_roles = vec!["Data PM".into(), "Growth PM".into()];

        let consensus = Consensus::build(
            vec![ProviderAnalysis::new("a", a), ProviderAnalysis::new("b", b)],
            &ThemeTable::standard(),
        )
        .unwrap();
        assert_eq!(consensus.suitable_roles, vec!["Data PM", "Growth PM", "TPM"]);
        assert!(consensus.interview_focus_areas.is_empty());
    }

    #[test]
    fn test_thresholds_met_if_any_provider_met() {
        let mut a = analysis_with(Decision::Maybe, 0.0, None);
        a.minimum_thresholds = Some(MinimumThresholds {
            personal_ai_projects: true,
            ..Default::default()
        });
        let mut b = analysis_with(Decision::Maybe, 0.0, None);
        b.minimum_thresholds = Some(MinimumThresholds {
            resume_creativity: true,
            ..Default::default()
        });
        let consensus = Consensus::build(
            vec![ProviderAnalysis::new("a", a), ProviderAnalysis::new("b", b)],
            &ThemeTable::standard(),
        )
        .unwrap();
        assert!(consensus.thresholds.personal_ai_projects);
        assert!(consensus.thresholds.resume_creativity);
        assert!(!consensus.thresholds.building_in_public);
        assert!(!consensus.thresholds.all_met);
    }

    #[test]
    fn test_differentiation_average_rounds() {
        let mut a = analysis_with(Decision::Maybe, 0.0, None);
        a.differentiation_signals.count = 3;
        let mut b = analysis_with(Decision::Maybe, 0.0, None);
        b.differentiation_signals.count = 6;
        let consensus = Consensus::build(
            vec![ProviderAnalysis::new("a", a), ProviderAnalysis::new("b", b)],
            &ThemeTable::standard(),
        )
        .unwrap();
        assert_eq!(consensus.average_differentiation, 4);
        assert!(consensus.differentiation_sufficient());
    }

    #[test]
    fn test_half_way_averages_round_to_even() {
        let providers = [(3, 7.0), (6, 7.5), (3, 7.0), (6, 7.5)]
            .into_iter()
            .enumerate()
            .map(|(i, (count, total))| {
                let mut a = analysis_with(Decision::Maybe, total, None);
                a.differentiation_signals.count = count;
                ProviderAnalysis::new(format!("p{i}"), a)
            })
            .collect();
        let consensus = Consensus::build(providers, &ThemeTable::standard()).unwrap();
        assert_eq!(consensus.average_differentiation, 4);
        assert_eq!(consensus.average_total, 7.2);
    }

    #[test]
    fn test_duplicate_key_replaces_earlier_analysis() {
        let mut providers = Vec::new();
        assert!(!insert_provider(
            &mut providers,
            ProviderAnalysis::new("openai", analysis_with(Decision::Screen, 30.0, None)),
        ));
        assert!(!insert_provider(
            &mut providers,
            ProviderAnalysis::new("claude", analysis_with(Decision::Maybe, 40.0, None)),
        ));
        assert!(insert_provider(
            &mut providers,
            ProviderAnalysis::new("openai", analysis_with(Decision::Screen, 50.0, None)),
        ));

        let keys: Vec<&str> = providers.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["openai", "claude"]);

        let consensus = Consensus::build(providers, &ThemeTable::standard()).unwrap();
        assert_eq!(consensus.average_total, 45.0);
    }

    #[test]
    fn test_round1_ties_go_to_even() {
        assert_eq!(round1(7.25), 7.2);
        assert_eq!(round1(1.0 / 3.0), 0.3);
    }

    #[test]
    fn test_critical_questions_are_concatenated() {
        let mut a = analysis_with(Decision::Maybe, 0.0, None);
        a.critical_questions = Some(CriticalQuestions {
            paradigm_shift_examples: vec!["x".into()],
            ..Default::default()
        });
        let mut b = analysis_with(Decision::Maybe, 0.0, None);
        b.critical_questions = Some(CriticalQuestions {
            paradigm_shift_examples: vec!["x".into()],
            magic_wand_examples: vec!["y".into()],
            ..Default::default()
        });
        let consensus = Consensus::build(
            vec![ProviderAnalysis::new("a", a), ProviderAnalysis::new("b", b)],
            &ThemeTable::standard(),
        )
        .unwrap();
        assert_eq!(
            consensus.critical_questions.paradigm_shift_examples,
            vec!["x", "x"]
        );
        assert_eq!(consensus.critical_questions.magic_wand_examples, vec!["y"]);
    }

    #[test]
    fn test_strengths_grouped_with_provider_tags() {
        let mut a = analysis_with(Decision::Screen, 0.0, Some("GPT-5"));
        a.top_strengths = vec!["Hands-on coding".into(), "Loves chess".into()];
        let mut b = analysis_with(Decision::Screen, 0.0, None);
        b.top_strengths = vec!["Strong engineering".into()];
        b.top_concerns = vec!["Thin portfolio".into()];

        let consensus = Consensus::build(
            vec![
                ProviderAnalysis::new("openai", a),
                ProviderAnalysis::new("claude", b),
            ],
            &ThemeTable::standard(),
        )
        .unwrap();

        assert_eq!(consensus.strengths.len(), 2);
        assert_eq!(
            consensus.strengths[0].paragraph,
            "Hands-on coding. [GPT-5] Strong engineering. [CLAUDE]"
        );
        assert_eq!(consensus.strengths[1].theme, OTHER_THEME);
        assert_eq!(consensus.strengths[1].paragraph, "Loves chess. [GPT-5]");
        assert_eq!(consensus.concerns[0].theme, "Building in Public & Portfolio");
        assert_eq!(consensus.provider_names(), vec!["GPT-5", "CLAUDE"]);
    }
}
