use std::io::BufRead;
use std::path::Path;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scorecard::analysis::Analysis;
use scorecard::cli::{Cli, CliCommand, parse_provider_input};
use scorecard::config::Config;
use scorecard::consensus::{Consensus, ProviderAnalysis, insert_provider};
use scorecard::error::Result;
use scorecard::feedback::group_by_theme;
use scorecard::report::{ReportEngine, ReportKind, output_path, write_report};

/// Display format of the generation timestamp in reports.
const DATE_FORMAT: &str = "%B %d, %Y at %H:%M:%S";

fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli)?;
    info!(format = ?config.format, output_dir = %config.output_dir.display(), "config loaded");

    match cli.command {
        CliCommand::Render { analysis, output } => render(&config, &analysis, output.as_deref()),
        CliCommand::Consensus { inputs, output } => consensus(&config, &inputs, output.as_deref()),
        CliCommand::Themes { items } => themes(&config, items),
    }
}

fn generated_at() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}

fn render(config: &Config, path: &Path, stem: Option<&str>) -> Result<()> {
    let analysis = Analysis::load(path)?;
    info!(path = %path.display(), candidate = analysis.candidate(), "analysis loaded");

    let engine = ReportEngine::new(config.template_dir.as_deref())?;
    let generated_at = generated_at();
    for &format in config.format.formats() {
        let content = engine.render_single(&analysis, format, &generated_at)?;
        let out = output_path(
            &config.output_dir,
            stem,
            analysis.candidate(),
            ReportKind::Single,
            format,
        );
        write_report(&out, &content)?;
        info!(path = %out.display(), "report written");
        println!("{}", out.display());
    }
    Ok(())
}

fn consensus(config: &Config, inputs: &[String], stem: Option<&str>) -> Result<()> {
    let mut providers = Vec::with_capacity(inputs.len());
    for raw in inputs {
        let input = parse_provider_input(raw)?;
        let analysis = Analysis::load(&input.path)?;
        info!(provider = %input.key, path = %input.path.display(), "analysis loaded");
        let key = input.key.clone();
        if insert_provider(&mut providers, ProviderAnalysis::new(input.key, analysis)) {
            warn!(provider = %key, "duplicate provider key, replacing earlier analysis");
        }
    }

    let consensus = Consensus::build(providers, &config.themes)?;
    let engine = ReportEngine::new(config.template_dir.as_deref())?;
    let generated_at = generated_at();
    for &format in config.format.formats() {
        let content = engine.render_consensus(&consensus, format, &generated_at)?;
        let out = output_path(
            &config.output_dir,
            stem,
            &consensus.candidate,
            ReportKind::Consensus,
            format,
        );
        write_report(&out, &content)?;
        info!(path = %out.display(), providers = consensus.providers.len(), "consensus report written");
        println!("{}", out.display());
    }
    Ok(())
}

fn themes(config: &Config, items: Vec<String>) -> Result<()> {
    let items = if items.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect()
    } else {
        items
    };

    for group in group_by_theme(&items, &config.themes) {
        println!("### {}\n\n{}\n", group.theme, group.paragraph);
    }
    Ok(())
}
