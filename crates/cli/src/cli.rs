//! Command-line arguments for the `banana` binary.

use std::path::PathBuf;
use std::time::Duration;

use banana_client::ClientConfig;
use banana_core::{AspectRatio, StylePreset};
use banana_jobs::PollConfig;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "banana",
    version,
    about = "Nano Banana - generate and edit images from the terminal",
    after_help = "Examples:\n  \
    banana generate \"a red fox in the snow\" --style anime --aspect-ratio 16:9\n  \
    banana edit ./fox.png \"make it night time\"\n  \
    banana job 8f1c2d"
)]
pub struct Cli {
    /// API base URL
    #[arg(long, global = true, env = "BANANA_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token sent with every request except login
    #[arg(long, global = true, env = "BANANA_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Milliseconds between job status checks
    #[arg(long, global = true, env = "BANANA_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Give up on a job after this many status checks
    #[arg(long, global = true, env = "BANANA_POLL_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate four images from a prompt
    Generate {
        prompt: String,

        /// Photorealistic, Anime, 3D Render, Cinematic, Fantasy or Vector
        #[arg(long, default_value = "Photorealistic")]
        style: StylePreset,

        /// 1:1, 16:9, 9:16, 4:3 or 3:4
        #[arg(long, default_value = "1:1")]
        aspect_ratio: AspectRatio,
    },
    /// Apply a prompt edit to a local JPG, PNG or WEBP image
    Edit {
        image: PathBuf,
        prompt: String,
    },
    /// Poll an existing job until it finishes
    Job { id: String },
    /// List images saved to your library
    Gallery,
    /// List subscription plans
    Plans,
    /// Show the signed-in account
    Me,
    /// Exchange credentials for an API token
    Login { email: String, password: String },
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        config
    }

    pub fn poll_config(&self) -> PollConfig {
        let mut config = PollConfig::from_env();
        if let Some(ms) = self.poll_interval_ms {
            config = config.with_interval(Duration::from_millis(ms));
        }
        if let Some(max) = self.max_attempts.filter(|n| *n > 0) {
            config = config.with_max_attempts(max);
        }
        config
    }
}
