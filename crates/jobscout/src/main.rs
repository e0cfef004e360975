use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use jobscout::config::{default_config_path, load_config};
use jobscout::logging::{init_logging, LogFormat};
use jobscout::{JobscoutError, Pipeline, PipelineConfig, ResultWriter};

/// Searches a job portal and keeps the listings whose description matches.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Config file; defaults to the platform config directory.
    #[arg(short, long, env = "JOBSCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of jobs to collect, instead of the portal's result count.
    #[arg(short, long)]
    limit: Option<usize>,

    /// Console log format.
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Output path prefix for the results file.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run(config_path: PathBuf, args: Args) -> Result<PathBuf, JobscoutError> {
    let mut config = load_config(&config_path)?;
    if args.limit.is_some() {
        config.search.limit = args.limit;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }
    if let Some(output) = args.output {
        config.output.path = output;
    }

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("jobscout: {e}");
    }
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        portal = %config.portal,
        "starting jobscout"
    );

    let pipeline_config = PipelineConfig::from_config(&config)?;
    let writer = ResultWriter::new(&pipeline_config.output_path);
    let mut pipeline = Pipeline::from_config(pipeline_config)?;

    let report = pipeline.run()?;
    let path = writer.write_today(&report.qualified)?;
    info!(
        path = %path.display(),
        discovered = report.discovered,
        qualified = report.qualified.len(),
        "Results written"
    );
    Ok(path)
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let mut args = Args::parse();

    let Some(config_path) = args.config.take().or_else(default_config_path) else {
        eprintln!("jobscout: no config file given and no config directory found");
        return ExitCode::FAILURE;
    };

    match run(config_path, args) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("jobscout: {e}");
            ExitCode::FAILURE
        }
    }
}
