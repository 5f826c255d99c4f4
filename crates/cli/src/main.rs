use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use codewiki_patterns::PatternDetector;
use codewiki_indexer::CodebaseScan;
use codewiki_semantic::SemanticIndexer;
use codewiki_wiki::{write_documents, WikiConfig, WikiGenerator};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the project root when `--config` is absent
const DEFAULT_CONFIG_FILE: &str = "codewiki.toml";

#[derive(Parser)]
#[command(name = "codewiki")]
#[command(about = "Generate a documentation wiki from TypeScript and JavaScript sources", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project and write its wiki
    Generate(GenerateArgs),

    /// Document a single source file
    File(FileArgs),

    /// Search chunks by similarity to a query (JSON output)
    Search(SearchArgs),

    /// List detected architectural patterns (JSON output)
    Patterns(PatternsArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Output directory (overrides the config file)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Include glob, relative to the project root (repeatable)
    #[arg(long = "include")]
    include: Vec<String>,

    /// Extra ignore glob or directory name (repeatable)
    #[arg(long = "ignore")]
    ignore: Vec<String>,

    /// TOML config file (defaults to <path>/codewiki.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render pages and list them without writing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct FileArgs {
    /// Source file to document
    path: PathBuf,

    /// Base directory for the relative path shown on the page
    #[arg(long)]
    base: Option<PathBuf>,

    /// Write the page under this directory instead of printing it
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct SearchArgs {
    /// Project directory
    path: PathBuf,

    /// Free-text query
    query: String,

    /// Maximum number of hits
    #[arg(short, long, default_value_t = 10)]
    limit: usize,

    /// TOML config file (defaults to <path>/codewiki.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct PatternsArgs {
    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// TOML config file (defaults to <path>/codewiki.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct GenerateReport {
    output: PathBuf,
    dry_run: bool,
    files: usize,
    skipped_files: usize,
    documents: Vec<String>,
    failed: Vec<FailedWrite>,
}

#[derive(Serialize)]
struct FailedWrite {
    path: String,
    error: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Generate(args) => run_generate(args).await?,
        Commands::File(args) => run_file(args).await?,
        Commands::Search(args) => run_search(args).await?,
        Commands::Patterns(args) => run_patterns(args).await?,
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>, project: &Path) -> Result<WikiConfig> {
    if let Some(path) = explicit {
        return WikiConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    let implicit = project.join(DEFAULT_CONFIG_FILE);
    if implicit.is_file() {
        log::info!("Using {}", implicit.display());
        return WikiConfig::from_file(&implicit)
            .with_context(|| format!("Failed to load config {}", implicit.display()));
    }
    Ok(WikiConfig::default())
}

async fn run_generate(args: GenerateArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref(), &args.path)?;
    if let Some(out) = args.out {
        config.output_dir = out;
    }
    if !args.include.is_empty() {
        config.include = args.include;
    }
    config.ignore.extend(args.ignore);

    let generator = WikiGenerator::new(config).context("Invalid configuration")?;
    let wiki = generator
        .generate(&args.path)
        .await
        .with_context(|| format!("Failed to analyze {}", args.path.display()))?;

    let documents: Vec<String> = wiki
        .documents
        .iter()
        .map(|d| d.path.to_string_lossy().replace('\\', "/"))
        .collect();

    let mut failed = Vec::new();
    if !args.dry_run {
        for outcome in generator.write(&wiki.documents).await {
            if let Err(e) = outcome.result {
                failed.push(FailedWrite {
                    path: outcome.path.to_string_lossy().into_owned(),
                    error: e.to_string(),
                });
            }
        }
    }

    let report = GenerateReport {
        output: generator.config().output_dir.clone(),
        dry_run: args.dry_run,
        files: wiki.analysis.files.len(),
        skipped_files: wiki.analysis.diagnostics.len(),
        documents,
        failed,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.failed.is_empty() {
        bail!("{} of {} documents failed to write", report.failed.len(), report.documents.len());
    }
    Ok(())
}

async fn run_file(args: FileArgs) -> Result<()> {
    let config = WikiConfig::default();
    let retries = config.write_retries;
    let generator = WikiGenerator::new(config)?;
    let document = generator
        .document_file(&args.path, args.base.as_deref())
        .with_context(|| format!("Failed to document {}", args.path.display()))?;

    match args.out {
        Some(out) => {
            let outcome = write_documents(&out, std::slice::from_ref(&document), retries)
                .await
                .into_iter()
                .next()
                .context("No write result")?;
            let written = outcome.result?;
            println!("{}", written.display());
        }
        None => print!("{}", document.render()?),
    }
    Ok(())
}

async fn scan_project(config: &WikiConfig, path: &Path) -> Result<CodebaseScan> {
    config
        .analyzer(path)?
        .analyze()
        .await
        .with_context(|| format!("Failed to analyze {}", path.display()))
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), &args.path)?;
    let scan = scan_project(&config, &args.path).await?;

    let mut indexer = SemanticIndexer::new(config.index).context("Invalid index configuration")?;
    indexer.build(&scan.files);
    let hits = indexer.search(&args.query, args.limit)?;
    println!("{}", serde_json::to_string_pretty(&hits)?);
    Ok(())
}

async fn run_patterns(args: PatternsArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), &args.path)?;
    let scan = scan_project(&config, &args.path).await?;

    let patterns = PatternDetector::new().detect(&scan.files);
    println!("{}", serde_json::to_string_pretty(&patterns)?);
    Ok(())
}
