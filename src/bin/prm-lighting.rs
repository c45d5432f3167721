use clap::{Parser, Subcommand};
use prm_lighting::{run_pass, Model, OverrideTables, PassConfig, StandardsDataset};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "prm-lighting")]
#[command(about = "Interior lighting power density resolution CLI", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolves lighting power density and schedules for every space
    Apply {
        /// Building model (JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// Interior lighting standards dataset (JSON)
        #[arg(short, long)]
        standards: PathBuf,

        /// User override tables (JSON)
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Pass configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where to write the transformed model
        #[arg(long)]
        output_model: Option<PathBuf>,

        /// Report format
        #[arg(short, long, default_value = "markdown")]
        format: String,

        /// Report file path
        #[arg(short, long)]
        report_file: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match cli.command {
        Commands::Apply {
            model,
            standards,
            overrides,
            config,
            output_model,
            format,
            report_file,
        } => {
            let mut building = Model::from_path(&model)?;
            let dataset = StandardsDataset::from_path(&standards)?;
            let overrides = match overrides {
                Some(path) => OverrideTables::from_path(path)?,
                None => OverrideTables::new(),
            };
            let config = match config {
                Some(path) => PassConfig::from_path(path)?,
                None => PassConfig::default(),
            };
            info!(rows = dataset.len(), model = ?model, "loaded inputs");

            let report = run_pass(&mut building, &dataset, &overrides, &config);
            if report.has_failures() {
                warn!(failures = report.failures.len(), "some spaces could not be processed");
            }

            let output = match format.as_str() {
                "markdown" => report.to_markdown(),
                "csv" => report.to_csv(),
                "json" => report.to_json()?,
                _ => anyhow::bail!("Unsupported format: {}", format),
            };

            if let Some(path) = output_model {
                std::fs::write(&path, building.to_json()?)?;
                info!("Model saved to {:?}", path);
            }

            if let Some(path) = report_file {
                std::fs::write(&path, output)?;
                println!("Report saved to {:?}", path);
            } else {
                println!("{}", output);
            }
        }
    }

    Ok(())
}
