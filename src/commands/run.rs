use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::{load_config, Orchestrator, RunOutcome, RunSummary, TaucoderClient, TokioSleeper};
use crate::error::TaucoderError;
use crate::models::ConfigOverrides;

/// Run options
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Credential for the service
    pub apikey: Option<String>,
    /// Directory receiving the downloaded results
    pub output: Option<PathBuf>,
    /// Images to upload
    pub inputs: Vec<PathBuf>,
    /// Explicit config file
    pub config: Option<PathBuf>,
    /// CLI overrides for the config file values
    pub overrides: ConfigOverrides,
}

/// Arguments that passed pre-flight validation
#[derive(Debug)]
pub struct ValidatedArgs {
    pub apikey: String,
    pub output: PathBuf,
    pub inputs: Vec<PathBuf>,
}

/// Check arguments before any network call
pub fn validate_args(options: &RunOptions) -> Result<ValidatedArgs, TaucoderError> {
    let apikey = match options.apikey.as_deref() {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => return Err(TaucoderError::InvalidArgument("apikey is required".to_string())),
    };

    let output = match options.output.as_deref() {
        Some(dir) if dir.is_dir() => dir.to_path_buf(),
        _ => {
            return Err(TaucoderError::InvalidArgument(
                "output must be a directory".to_string(),
            ))
        }
    };

    if options.inputs.is_empty() {
        return Err(TaucoderError::InvalidArgument(
            "input files are required".to_string(),
        ));
    }

    if let Some(missing) = options.inputs.iter().find(|path| !path.is_file()) {
        return Err(TaucoderError::InvalidArgument(format!(
            "input file not found: {}",
            missing.display()
        )));
    }

    Ok(ValidatedArgs {
        apikey,
        output,
        inputs: options.inputs.clone(),
    })
}

/// Upload the inputs and wait for every job to finish
pub async fn run_images(working_dir: &Path, options: RunOptions) -> Result<(), TaucoderError> {
    let args = validate_args(&options)?;
    let config = load_config(working_dir, options.config.as_deref(), options.overrides)?;

    let client = TaucoderClient::new(&config.api, &args.apikey)?;
    let orchestrator = Orchestrator::new(client, TokioSleeper, &config);

    match orchestrator.run(&args.inputs, &args.output).await? {
        RunOutcome::CreateFailed { message, .. } => {
            println!("Error: {}", message);
        }
        RunOutcome::Completed(summary) => {
            info!("All jobs resolved after {} poll(s)", summary.polls);
            print_summary(&summary);
        }
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("\n=== Run Summary ===");
    println!("Submitted:  {}", summary.submitted);
    println!("Downloaded: {}", summary.downloaded.len());
    println!("Failed:     {}", summary.failed.len());
    if summary.poll_failures > 0 {
        println!("Status request failures: {}", summary.poll_failures);
    }

    if !summary.downloaded.is_empty() || !summary.failed.is_empty() {
        println!("\nResults:");
        for job in &summary.downloaded {
            println!("  {} [DONE] -> {}", job.job_id, job.path.display());
        }
        for job_id in &summary.failed {
            println!("  {} [FAILED]", job_id);
        }
    }
}
