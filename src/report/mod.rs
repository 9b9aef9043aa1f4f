pub mod view;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::analysis::Analysis;
use crate::consensus::Consensus;
use crate::error::{Error, Result};
use view::{ConsensusView, Markup, SingleView};

/// Concrete document format of one rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    Markdown,
    Html,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Html => "html",
        }
    }

    fn markup(self) -> Markup {
        match self {
            ReportFormat::Markdown => Markup::Markdown,
            ReportFormat::Html => Markup::Html,
        }
    }
}

/// Format selection as configured: one format or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FormatSelection {
    Markdown,
    Html,
    #[default]
    Both,
}

impl FormatSelection {
    pub fn formats(self) -> &'static [ReportFormat] {
        match self {
            FormatSelection::Markdown => &[ReportFormat::Markdown],
            FormatSelection::Html => &[ReportFormat::Html],
            FormatSelection::Both => &[ReportFormat::Markdown, ReportFormat::Html],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Single,
    Consensus,
}

impl ReportKind {
    /// Suffix appended to the candidate slug for default output names.
    pub fn file_suffix(self) -> &'static str {
        match self {
            ReportKind::Single => "analysis",
            ReportKind::Consensus => "deep_analysis",
        }
    }

    /// File stem of the template, e.g. `consensus` for `consensus.html`.
    fn template_stem(self) -> &'static str {
        match self {
            ReportKind::Single => "report",
            ReportKind::Consensus => "consensus",
        }
    }
}

/// Embedded default template for every report kind and format.
const TEMPLATES: &[(ReportKind, ReportFormat, &str)] = &[
    (
        ReportKind::Single,
        ReportFormat::Markdown,
        include_str!("../default_templates/report.md"),
    ),
    (
        ReportKind::Single,
        ReportFormat::Html,
        include_str!("../default_templates/report.html"),
    ),
    (
        ReportKind::Consensus,
        ReportFormat::Markdown,
        include_str!("../default_templates/consensus.md"),
    ),
    (
        ReportKind::Consensus,
        ReportFormat::Html,
        include_str!("../default_templates/consensus.html"),
    ),
];

/// Template name and override file name: `report.md`, `consensus.html`, ...
fn template_name(kind: ReportKind, format: ReportFormat) -> String {
    format!("{}.{}", kind.template_stem(), format.extension())
}

/// Report template engine with embedded default templates and user overrides.
pub struct ReportEngine {
    engine: upon::Engine<'static>,
}

impl ReportEngine {
    /// Compile all report templates. Files in `override_dir` named like the
    /// defaults (`report.md`, `consensus.html`, ...) take precedence.
    pub fn new(override_dir: Option<&Path>) -> Result<Self> {
        let mut engine = upon::Engine::new();
        for &(kind, format, default) in TEMPLATES {
            let name = template_name(kind, format);
            let source = load_template(override_dir, &name, default)?;
            engine.add_template(name, source)?;
        }
        Ok(Self { engine })
    }

    pub fn render_single(
        &self,
        analysis: &Analysis,
        format: ReportFormat,
        generated_at: &str,
    ) -> Result<String> {
        let view = SingleView::new(analysis, generated_at, format.markup());
        self.render(ReportKind::Single, format, &view)
    }

    pub fn render_consensus(
        &self,
        consensus: &Consensus,
        format: ReportFormat,
        generated_at: &str,
    ) -> Result<String> {
        let view = ConsensusView::new(consensus, generated_at, format.markup());
        self.render(ReportKind::Consensus, format, &view)
    }

    fn render<V: serde::Serialize>(
        &self,
        kind: ReportKind,
        format: ReportFormat,
        view: &V,
    ) -> Result<String> {
        let name = template_name(kind, format);
        debug!(template = %name, "rendering report");
        Ok(self.engine.template(&name).render(view).to_string()?)
    }
}

fn load_template(override_dir: Option<&Path>, name: &str, default: &str) -> Result<String> {
    if let Some(dir) = override_dir {
        let path = dir.join(name);
        if path.exists() {
            debug!(path = %path.display(), "using template override");
            return std::fs::read_to_string(&path).map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to read override template {}: {e}", path.display()),
                ))
            });
        }
    }
    Ok(default.to_string())
}

/// File-name-safe slug: lowercase ASCII alphanumerics joined by `_`.
pub fn slug(name: &str) -> String {
    let slug = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    if slug.is_empty() {
        "candidate".to_string()
    } else {
        slug
    }
}

/// Output path for a report: `<dir>/<stem>.<ext>`, where the stem defaults to
/// `<candidate-slug>_<kind suffix>`.
pub fn output_path(
    dir: &Path,
    stem: Option<&str>,
    candidate: &str,
    kind: ReportKind,
    format: ReportFormat,
) -> PathBuf {
    let stem = match stem {
        Some(s) => s.to_string(),
        None => format!("{}_{}", slug(candidate), kind.file_suffix()),
    };
    dir.join(format!("{stem}.{}", format.extension()))
}

/// Write the full report text, creating missing parent directories.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
