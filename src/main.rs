//! Command-line front end: JSON report input in, PDF out.
//!
//! ```bash
//! acs-report --input anadia.json
//! acs-report --input anadia.json --output relatorio.pdf --config config.json --logo-dir assets --validate
//! ```

use acs_report::{
    CliError, FilesystemAssetProvider, ReportConfig, ReportGenerator, ReportInput, default_file_name,
};
use chrono::Local;
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "acs-report")]
#[command(about = "Generates the municipal ACS dashboard report as a PDF")]
struct Cli {
    /// Report input (municipality, region, period records) as JSON
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the PDF. Defaults to Relatorio_ACS_<municipality>_<timestamp>.pdf
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report configuration as JSON; omitted fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory searched for the header logo
    #[arg(long, default_value = ".")]
    logo_dir: PathBuf,

    /// Print the layout validation report and fail when it finds problems
    #[arg(long)]
    validate: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => ReportConfig::from_json(&fs::read_to_string(path)?)?,
        None => ReportConfig::default(),
    };
    let input = ReportInput::from_json(&fs::read_to_string(&cli.input)?)?;

    let generator =
        ReportGenerator::new(config)?.with_assets(Arc::new(FilesystemAssetProvider::new(&cli.logo_dir)));
    let report = generator.generate(&input)?;

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(default_file_name(&input.municipality, Local::now().naive_local())));
    fs::write(&output, &report.bytes)?;
    info!(
        "Wrote {} ({} page(s), compliance {}: {:.1}%)",
        output.display(),
        report.pages,
        report.compliance.level,
        report.compliance.compliance_rate
    );
    for failure in &report.warnings {
        warn!("{} on page {} was degraded: {}", failure.phase, failure.page, failure.message);
    }

    if cli.validate {
        let validation = report.validate_layout(&generator.config().page);
        println!("{}", validation.to_json()?);
        if !validation.summary.validation_passed {
            return Err(CliError::LayoutInvalid(validation.summary.total_errors));
        }
    }
    Ok(())
}
