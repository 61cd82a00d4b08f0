use clap::Parser;
use colored::Colorize;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing::info;

use shrinkres::discovery::FileStats;
use shrinkres::report::{ReportFormat, Reporter, UnusedResource};
use shrinkres::usage::{BuildStats, DirectiveKind, ParallelUsageBuilder, ShrinkMode, UsageBuilder};
use shrinkres::{Config, FileFinder, ResourceUsageModel, SourceFile, StringPool};

/// shrinkres - Find unused resources in Android projects
#[derive(Parser, Debug)]
#[command(name = "shrinkres")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project directory to analyze
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target directories to analyze (can be specified multiple times)
    #[arg(short, long)]
    target: Vec<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Keep directive, same syntax as tools:keep (e.g. "@layout/unused*")
    #[arg(short, long)]
    keep: Vec<String>,

    /// Discard directive, same syntax as tools:discard
    #[arg(short, long)]
    discard: Vec<String>,

    /// Use strict shrink mode
    #[arg(long)]
    strict: bool,

    /// Output format (defaults to the config file's report.format)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the resource graph dump to FILE
    #[arg(long, value_name = "FILE")]
    dump_graph: Option<PathBuf>,

    /// Write the per-resource action report to FILE
    #[arg(long, value_name = "FILE")]
    actions: Option<PathBuf>,

    /// Write the whitelisted resource names to FILE
    #[arg(long, value_name = "FILE")]
    whitelist: Option<PathBuf>,

    /// Read and parse files in parallel
    #[arg(long)]
    parallel: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("shrinkres v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    run_analysis(&config, &cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations(&cli.path)?
    };

    // Override with CLI arguments
    if !cli.target.is_empty() {
        config.targets = cli.target.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    config.keep.extend(cli.keep.clone());
    config.discard.extend(cli.discard.clone());
    if cli.strict {
        config.shrink_mode = Some(ShrinkMode::Strict.as_str().to_string());
    }

    Ok(config)
}

fn run_analysis(config: &Config, cli: &Cli) -> Result<()> {
    use std::time::Instant;

    let start_time = Instant::now();

    // Step 1: Discover files
    info!("Discovering files...");
    let finder = FileFinder::new(config);
    let files = finder.find_files(&cli.path)?;

    let file_stats = FileStats::from_files(&files);
    info!(
        "Found {} files to analyze ({} Kotlin, {} Java, {} manifests, {} resource files)",
        file_stats.total(),
        file_stats.kotlin_files,
        file_stats.java_files,
        file_stats.manifest_files,
        file_stats.resource_files
    );

    if files.is_empty() {
        if !cli.quiet {
            println!("{}", "No manifest, resource or source files found.".yellow());
        }
        return Ok(());
    }

    // Step 2: Record usages
    let mut model = ResourceUsageModel::new()
        .with_hook(StringPool::new())
        .with_ignore_tools_attributes(config.ignore_tools_attributes);
    if let Some(mode) = &config.shrink_mode {
        model.record_shrink_mode(mode);
    }

    let stats = build_model(&mut model, &files, cli)?;
    info!(
        "Recorded {} source files, {} manifests, {} XML documents, {} other resource files",
        stats.source_files, stats.manifests, stats.xml_documents, stats.binary_resources
    );

    // --strict wins over any tools:shrinkMode found in the project
    if cli.strict {
        model.record_shrink_mode(ShrinkMode::Strict.as_str());
    }

    // Step 3: Directives
    for keep in &config.keep {
        model.record_directive(DirectiveKind::Keep, keep);
    }
    for discard in &config.discard {
        model.record_directive(DirectiveKind::Discard, discard);
    }
    info!("Resolving {} directives...", model.directives().len());
    model.resolve_directives();

    // Step 4: Reachability
    info!("Running reachability analysis...");
    let unused: Vec<UnusedResource> = model
        .find_unused()
        .into_iter()
        .map(|id| UnusedResource::from_resource(model.resource(id)))
        .collect();

    info!(
        "Found {} unused resources out of {}",
        unused.len(),
        model.registry().len()
    );

    if model.shrink_mode() == ShrinkMode::Safe && !cli.quiet {
        println!(
            "{}",
            format!(
                "Safe mode: {} unresolved string literals may name resources dynamically",
                model.hook().len()
            )
            .dimmed()
        );
    }

    // Step 5: Dumps
    if let Some(path) = &cli.dump_graph {
        write_dump(path, &model.dump_resource_model())?;
    }
    if let Some(path) = &cli.actions {
        write_dump(path, &model.dump_actions())?;
    }
    if let Some(path) = &cli.whitelist {
        write_dump(path, &model.dump_whitelist())?;
    }

    // Step 6: Report results
    let format: ReportFormat = match &cli.format {
        Some(format) => format.clone().into(),
        None => ReportFormat::parse(&config.report.format)?,
    };
    let reporter = Reporter::new(format, cli.output.clone());
    reporter.report(&unused)?;

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

fn build_model(
    model: &mut ResourceUsageModel<StringPool>,
    files: &[SourceFile],
    cli: &Cli,
) -> Result<BuildStats> {
    use indicatif::{ProgressBar, ProgressStyle};

    if cli.parallel {
        if !cli.quiet {
            println!(
                "{}",
                format!("Parallel mode: loading {} files...", files.len()).cyan()
            );
        }
        return Ok(ParallelUsageBuilder::new().build(model, files));
    }

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(files.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .into_diagnostic()?
            .progress_chars("#>-"),
    );

    info!("Recording files...");
    let stats = UsageBuilder::new().build_with_progress(model, files, |_| pb.inc(1));
    pb.finish_and_clear();

    Ok(stats)
}

fn write_dump(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}
