//! Command-line surface for the conformance harness.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::{Artifact, GeneratorConfig};
use crate::document;
use crate::generator::{Generated, Generator, OutputKind};
use crate::jwt;
use crate::report::{self, render, ReportPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "vcr",
    version,
    about = "Conformance harness for the Verifiable Credentials data model"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Aggregate *-report.json files into the implementation report
    Report(ReportArgs),
    /// Invoke an implementation's generator for one fixture
    Generate(GenerateArgs),
    /// Generate a document and run structural shape checks on it
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Directory containing <implementation>-report.json files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Report policy file (section table + override lists); defaults to the
    /// built-in VCDM 1.0 policy
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// HTML page template containing the %%%REPORTS%%% placeholder
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Output HTML file
    #[arg(long, default_value = "index.html")]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Generator configuration (config.json)
    #[arg(long)]
    pub config: PathBuf,

    /// Directory holding input fixtures
    #[arg(long, default_value = "input")]
    pub input_dir: PathBuf,

    /// Fixture file name, resolved against the input directory
    pub fixture: String,

    /// Drive the presentation generator instead of the credential generator
    #[arg(long)]
    pub presentation: bool,

    /// Return the raw signed token instead of a parsed document
    #[arg(long)]
    pub token: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Generator configuration (config.json)
    #[arg(long)]
    pub config: PathBuf,

    /// Directory holding input fixtures
    #[arg(long, default_value = "input")]
    pub input_dir: PathBuf,

    /// Fixture file name, resolved against the input directory
    pub fixture: String,

    /// Check the presentation generator instead of the credential generator
    #[arg(long)]
    pub presentation: bool,
}

fn artifact_for(presentation: bool) -> Artifact {
    if presentation {
        Artifact::Presentation
    } else {
        Artifact::Credential
    }
}

pub async fn run_report(args: ReportArgs) -> Result<()> {
    let policy = match &args.policy {
        Some(path) => ReportPolicy::load(path)
            .with_context(|| format!("loading report policy {}", path.display()))?,
        None => ReportPolicy::vcdm_v1(),
    };

    let matrix = report::aggregate_dir(&args.dir, &policy)
        .with_context(|| format!("aggregating reports under {}", args.dir.display()))?;

    let tables = render::render_tables(&matrix, &policy.sections);
    let template = match &args.template {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading template {}", path.display()))?,
        None => render::default_template().to_string(),
    };
    let page = render::render_page(&template, &tables);

    std::fs::write(&args.out, page)
        .with_context(|| format!("writing report to {}", args.out.display()))?;
    info!(
        out = %args.out.display(),
        implementations = matrix.implementations().len(),
        "generated implementation report"
    );
    println!("Generated implementation report: {}", args.out.display());
    Ok(())
}

pub async fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = GeneratorConfig::load(&args.config)?;
    let output = if args.token {
        OutputKind::Token
    } else {
        OutputKind::Document
    };
    let generator = Generator::from_config(
        &config,
        artifact_for(args.presentation),
        output,
        &args.input_dir,
    )?;

    match generator.generate(&args.fixture).await? {
        Generated::Document(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
        Generated::Token(token) => {
            println!("{token}");
            // Best-effort decode so a human can eyeball the claims.
            if let Ok(decoded) = jwt::decode(&token) {
                eprintln!("header: {}", decoded.header);
            }
        }
    }
    Ok(())
}

pub async fn run_check(args: CheckArgs) -> Result<()> {
    let config = GeneratorConfig::load(&args.config)?;
    let generator = Generator::from_config(
        &config,
        artifact_for(args.presentation),
        OutputKind::Document,
        &args.input_dir,
    )?;

    let generated = generator.generate(&args.fixture).await?;
    let doc = generated
        .as_document()
        .context("generator returned a token, expected a document")?;

    document::check_context(doc)?;
    println!(
        "ok: {} has canonical @context {}",
        args.fixture,
        document::CANONICAL_CONTEXT
    );
    Ok(())
}
