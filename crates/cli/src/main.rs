//! `banana` -- Nano Banana terminal client.
//!
//! # Environment variables
//!
//! | Variable                   | Default                     | Description                      |
//! |----------------------------|-----------------------------|----------------------------------|
//! | `BANANA_API_URL`           | `http://localhost:8000/api` | API base URL                     |
//! | `BANANA_API_TOKEN`         | --                          | Bearer token                     |
//! | `REQUEST_TIMEOUT_SECS`     | `30`                        | Per-request timeout              |
//! | `BANANA_POLL_INTERVAL_MS`  | `3000`                      | Delay between job status checks  |
//! | `BANANA_POLL_MAX_ATTEMPTS` | --                          | Status checks before giving up   |
//! | `RUST_LOG`                 | `banana=info,...`           | Log filter                       |

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use banana_cli::cli::{Cli, Command};
use banana_cli::edit::EDIT_PLACEHOLDER;
use banana_cli::generate::GENERATE_PLACEHOLDER;
use banana_cli::render::{render_gallery_item, render_plan, render_slot, render_user};
use banana_cli::{follow_slots, EditController, EditInput, FollowEnd, GenerateController};
use banana_client::{ApiClient, JobApi};
use banana_core::{AspectRatio, StylePreset};
use banana_jobs::{PollConfig, PollOutcome, Poller};
use clap::Parser;
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "banana=info,banana_cli=info,banana_jobs=info,banana_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.client_config()).context("failed to build HTTP client")?;
    let poll_config = cli.poll_config();

    tracing::debug!(api_url = client.api_url(), "Client ready");

    match cli.command {
        Command::Generate {
            prompt,
            style,
            aspect_ratio,
        } => run_generate(Arc::new(client), poll_config, &prompt, style, aspect_ratio).await,
        Command::Edit { image, prompt } => {
            run_edit(Arc::new(client), poll_config, &image, &prompt).await
        }
        Command::Job { id } => run_job(Arc::new(client), poll_config, id).await,
        Command::Gallery => {
            for item in client.gallery().await? {
                println!("{}", render_gallery_item(&item));
            }
            Ok(())
        }
        Command::Plans => {
            for plan in client.plans().await? {
                println!("{}\n", render_plan(&plan));
            }
            Ok(())
        }
        Command::Me => {
            println!("{}", render_user(&client.me().await?));
            Ok(())
        }
        Command::Login { email, password } => {
            let token = client.login(&email, &password).await?;
            println!("{}", token.token);
            eprintln!("Export it as BANANA_API_TOKEN to use it for later commands.");
            Ok(())
        }
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed it never
/// resolves, so the command runs to completion instead.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn run_generate(
    api: Arc<dyn JobApi>,
    poll_config: PollConfig,
    prompt: &str,
    style: StylePreset,
    aspect_ratio: AspectRatio,
) -> anyhow::Result<()> {
    let page = GenerateController::new(api, poll_config)
        .with_style(style)
        .with_aspect_ratio(aspect_ratio);
    let events = page.subscribe();

    page.generate(prompt).await?;
    for (index, slot) in page.slots().iter().enumerate() {
        println!("{}", render_slot(index, slot, GENERATE_PLACEHOLDER));
    }

    let end = follow_slots(page.orchestrator(), events, interrupted(), |index, slot| {
        if slot.is_terminal() {
            println!("{}", render_slot(index, slot, GENERATE_PLACEHOLDER));
        }
    })
    .await;

    if end == FollowEnd::Interrupted {
        eprintln!("Stopped. Jobs keep running on the server.");
    }
    Ok(())
}

async fn run_edit(
    api: Arc<dyn JobApi>,
    poll_config: PollConfig,
    image: &Path,
    prompt: &str,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read {}", image.display()))?;
    let file_name = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let mut page = EditController::new(api, poll_config);
    page.select_image(EditInput::from_bytes(file_name, bytes)?);
    let events = page.subscribe();

    page.apply_edit(prompt).await?;
    println!("{}", render_slot(0, &page.result(), EDIT_PLACEHOLDER));

    let end = follow_slots(page.orchestrator(), events, interrupted(), |index, slot| {
        if slot.is_terminal() {
            println!("{}", render_slot(index, slot, EDIT_PLACEHOLDER));
        }
    })
    .await;

    if end == FollowEnd::Interrupted {
        eprintln!("Stopped. The edit keeps running on the server.");
    }
    Ok(())
}

async fn run_job(api: Arc<dyn JobApi>, poll_config: PollConfig, job_id: String) -> anyhow::Result<()> {
    let poller = Poller::new(api, poll_config);
    let (tx, rx) = oneshot::channel();
    poller.start_polling(job_id.clone(), move |outcome| {
        let _ = tx.send(outcome);
    });

    tokio::select! {
        _ = interrupted() => {
            poller.stop_polling(&job_id);
            eprintln!("Stopped.");
            Ok(())
        }
        outcome = rx => match outcome.context("poll ended without an outcome")? {
            PollOutcome::Completed(asset) => {
                println!("{}", asset.url);
                Ok(())
            }
            PollOutcome::Failed(e) => Err(anyhow::anyhow!(e).context(format!("job {job_id}"))),
        },
    }
}
