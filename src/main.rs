use anyhow::{Context, Result};
use clap::Parser;
use depsight::cli::{init_logging, AnalyzeArgs, Cli, Commands};
use depsight::{analyze_project, load_config, load_config_from_path};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => handle_analyze_command(args),
    }
}

fn handle_analyze_command(args: AnalyzeArgs) -> Result<()> {
    init_logging(args.verbosity);

    let config = match &args.config {
        Some(path) => load_config_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => load_config(&args.path).context("Failed to load configuration")?,
    };
    let config = args.overrides().apply(config);

    let report = analyze_project(&args.path, &config)
        .with_context(|| format!("Failed to analyze {}", args.path.display()))?;

    let json = report
        .to_json(args.pretty)
        .context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}
