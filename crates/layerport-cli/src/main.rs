//! Layerport CLI: convert PDFs to layered PSDs from the terminal.
//!
//! Set LAYERPORT_API_URL and LAYERPORT_AUTH_TOKEN (a `.env` file works too).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;

use layerport_api_client::ApiClient;
use layerport_cli::{
    download_path, finish_for, init_tracing, progress_line, ConsoleNotifier, Finish,
};
use layerport_core::presentation::{can_download, present_job};
use layerport_core::{ClientConfig, ErrorMetadata, Job, JobId};
use layerport_tracker::{ConversionTracker, PdfFile};

#[derive(Parser)]
#[command(name = "layerport", about = "Layerport PDF to PSD converter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a PDF, follow the conversion and download the PSD
    Convert {
        /// Path to the PDF file
        file: PathBuf,
        /// Directory to save the result in
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Only follow the conversion, do not download the result
        #[arg(long)]
        no_download: bool,
    },
    /// Show the current state of a job
    Status {
        /// Job ID returned by the upload
        job_id: String,
    },
    /// Download the result of a completed job
    Download {
        /// Job ID returned by the upload
        job_id: String,
        /// Directory to save the result in
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Show plan and remaining conversions
    Account,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn save_result(client: &ApiClient, job: &Job, out: &Path) -> anyhow::Result<PathBuf> {
    let Some(url) = job.download_url.as_deref().filter(|_| can_download(job)) else {
        bail!("Job {} has no result to download", job.job_id);
    };

    tokio::fs::create_dir_all(out)
        .await
        .with_context(|| format!("Create output directory {}", out.display()))?;
    let dest = download_path(out, job);
    let bytes = client
        .download(url, &dest)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .with_context(|| format!("Download {}", dest.display()))?;

    println!("Saved {} ({} bytes)", dest.display(), bytes);
    Ok(dest)
}

async fn convert(
    config: &ClientConfig,
    client: &ApiClient,
    file: &Path,
    out: &Path,
    no_download: bool,
) -> anyhow::Result<ExitCode> {
    let pdf = PdfFile::from_path(file)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .with_context(|| format!("Read {}", file.display()))?;

    let mut tracker = ConversionTracker::connect(config, ConsoleNotifier)?;

    if let Err(e) = tracker.submit(&pdf).await {
        // Already shown by the notifier.
        tracker.shutdown().await;
        tracing::debug!(code = e.error_code(), error = %e, "Submission failed");
        return Ok(ExitCode::FAILURE);
    }

    let terminal = tracker
        .track_until_terminal(|view| println!("{}", progress_line(view)))
        .await;
    tracker.shutdown().await;

    let Some(job) = terminal else {
        bail!("Push channel closed before the conversion finished");
    };

    let view = present_job(&job);
    if let Some(warning) = &view.warning {
        println!("Warning: {}", warning);
    }

    match finish_for(&view, !no_download) {
        Finish::Failed => Ok(ExitCode::FAILURE),
        Finish::Done => Ok(ExitCode::SUCCESS),
        Finish::Download => {
            save_result(client, &job, out).await?;
            Ok(ExitCode::SUCCESS)
        }
        Finish::MissingResult => bail!(
            "Job {} completed but the service provided no download URL",
            job.job_id
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let config = ClientConfig::from_env()
        .context("Failed to load configuration. Check LAYERPORT_API_URL and LAYERPORT_AUTH_TOKEN")?;
    let client = ApiClient::new(&config).context("Failed to create API client")?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            file,
            out,
            no_download,
        } => {
            return convert(&config, &client, &file, &out, no_download).await;
        }
        Commands::Status { job_id } => {
            let job = client
                .get_job_status(&JobId::new(job_id))
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print_json(&serde_json::json!({ "job": job, "view": present_job(&job) }))?;
        }
        Commands::Download { job_id, out } => {
            let job = client
                .get_job_status(&JobId::new(job_id))
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            save_result(&client, &job, &out).await?;
        }
        Commands::Account => {
            let account = client
                .get_account_info()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print_json(&account)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
