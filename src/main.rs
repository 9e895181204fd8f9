//! Main entry point for the easyshare CLI

use anyhow::{Context, Result};
use clap::Parser;
use easyshare::cli::{Args, Command, DownloadArgs, HistoryCommand, OutputFormatter, VerbosityLevel};
use easyshare::core::{DownloadState, Downloader, UpdateState};
use easyshare::history::HistoryStore;
use easyshare::tool::{ExternalTool, YtDlp};
use easyshare::utils::{file_uri, mime_from_path, reveal_in_file_manager};
use easyshare::{Config, ShareApp, ShareError};
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbosity_level());

    debug!("Starting easyshare with args: {:?}", args);

    let mut config = Config::load(args.config.as_deref()).context("failed to load configuration")?;
    args.apply_to(&mut config);

    let formatter = OutputFormatter::new(args.verbosity_level());

    match &args.command {
        Command::Download(download) => handle_download(&config, download, formatter).await,
        Command::Update => handle_update(&config, &formatter).await,
        Command::History(command) => handle_history(&config, command, &formatter),
        Command::Version => {
            let tool = YtDlp::new(&config.tool_path);
            let version = tool.version().await.ok();
            formatter.print_version(version.as_deref());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_app(config: &Config) -> Result<ShareApp> {
    let options = config.download_options()?;
    let tool = Arc::new(YtDlp::new(&config.tool_path));
    let downloader = Downloader::new(tool).with_options(options);

    let db_path = config.database_path();
    let history = HistoryStore::open(&db_path)
        .with_context(|| format!("failed to open history database {}", db_path.display()))?;

    Ok(ShareApp::new(downloader, Arc::new(history)).with_history_recording(config.record_history))
}

/// Handle single video download
async fn handle_download(config: &Config, args: &DownloadArgs, formatter: OutputFormatter) -> Result<ExitCode> {
    let app = build_app(config)?;
    let formatter = if args.no_progress {
        formatter.without_progress()
    } else {
        formatter
    };

    if args.update {
        let state = app.update_tool(&|state: UpdateState| formatter.render_update(&state)).await;
        if let UpdateState::Error(_) = state {
            warn!("Continuing with the installed yt-dlp");
        }
    }

    let cancel = app.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Cancellation requested");
            cancel.cancel();
        }
    });

    info!("Output folder: {}", app.downloader().options().output_dir.display());
    let state = app
        .download(&args.url, &|state: DownloadState| formatter.render_state(&state))
        .await?;

    Ok(match state {
        DownloadState::Success { .. } => ExitCode::SUCCESS,
        DownloadState::Cancelled => ExitCode::from(EXIT_CANCELLED),
        _ => ExitCode::FAILURE,
    })
}

async fn handle_update(config: &Config, formatter: &OutputFormatter) -> Result<ExitCode> {
    let app = build_app(config)?;
    let state = app.update_tool(&|state: UpdateState| formatter.render_update(&state)).await;

    Ok(match state {
        UpdateState::Success(_) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

fn handle_history(config: &Config, command: &HistoryCommand, formatter: &OutputFormatter) -> Result<ExitCode> {
    let db_path = config.database_path();
    let store = HistoryStore::open(&db_path)
        .with_context(|| format!("failed to open history database {}", db_path.display()))?;

    let find = |id: i64| -> Result<_> { store.get(id)?.ok_or_else(|| ShareError::NotFound(id).into()) };

    match command {
        HistoryCommand::List { json } => {
            let records = store.list()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                formatter.print_history(&records);
            }
        }
        HistoryCommand::Show { id } => {
            formatter.print_record(&find(*id)?);
        }
        HistoryCommand::Delete { id } => {
            if !store.delete(*id)? {
                return Err(ShareError::NotFound(*id).into());
            }
            formatter.success(&format!("Removed entry {} from history", id));
        }
        HistoryCommand::Clear => {
            let removed = store.clear()?;
            formatter.success(&format!("Removed {} entries from history", removed));
        }
        HistoryCommand::Open { id } => {
            let record = find(*id)?;
            if let Err(e) = reveal_in_file_manager(&record.file_path) {
                warn!("Could not open file manager: {}", e);
                println!("{}", record.file_path.display());
            }
        }
        HistoryCommand::Share { id } => {
            let record = find(*id)?;
            if !record.file_exists() {
                formatter.warning(&format!("File no longer exists: {}", record.file_path.display()));
            }
            let payload = json!({
                "title": record.title,
                "path": record.file_path,
                "uri": file_uri(&record.file_path),
                "mime_type": mime_from_path(&record.file_path),
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Initialize logging system
fn init_logging(verbosity: VerbosityLevel) {
    let default_level = match verbosity {
        VerbosityLevel::Quiet => "warn",
        VerbosityLevel::Normal => "info",
        VerbosityLevel::Verbose => "debug",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
