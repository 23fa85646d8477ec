//! Pawcase CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! pawcase-cli migrate
//!
//! # Grant or revoke admin rights
//! pawcase-cli admin promote -e owner@example.com
//! pawcase-cli admin demote -e owner@example.com
//!
//! # Shrink an image and print it as a data URL
//! pawcase-cli compress corgi.jpg --max-dimension 1500 --quality 80
//!
//! # Find the largest catalog payload the server accepts
//! pawcase-cli probe --url http://localhost:5000 --cookie "pawcase_session=..."
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pawcase_storefront::services::imaging::{CompressOptions, DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY};

mod commands;

#[derive(Parser)]
#[command(name = "pawcase-cli")]
#[command(author, version, about = "Pawcase CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Downscale an image and print it as a data URL
    Compress {
        /// Image file to compress
        file: PathBuf,

        /// Cap for the larger side, in pixels
        #[arg(long, default_value_t = DEFAULT_MAX_DIMENSION)]
        max_dimension: u32,

        /// JPEG quality (1-100)
        #[arg(long, default_value_t = DEFAULT_QUALITY)]
        quality: u8,
    },
    /// Probe the largest catalog payload the server accepts
    Probe {
        /// Storefront base URL
        #[arg(long, default_value = "http://localhost:5000")]
        url: String,

        /// Admin session cookie (`pawcase_session=...` or the bare value)
        #[arg(long)]
        cookie: String,

        /// First image payload size, in bytes
        #[arg(long, default_value_t = 256 * 1024)]
        start_bytes: usize,

        /// Largest image payload size to try, in bytes
        #[arg(long, default_value_t = 64 * 1024 * 1024)]
        max_bytes: usize,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant admin rights to an existing account
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke admin rights
    Demote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so `compress` output can be redirected
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pawcase_cli=info,pawcase_storefront=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Promote { email } => commands::admin::set_admin(&email, true).await?,
            AdminAction::Demote { email } => commands::admin::set_admin(&email, false).await?,
        },
        Commands::Compress {
            file,
            max_dimension,
            quality,
        } => commands::compress::run(
            &file,
            CompressOptions {
                max_dimension,
                quality,
            },
        )?,
        Commands::Probe {
            url,
            cookie,
            start_bytes,
            max_bytes,
        } => {
            let report = commands::probe::run(&url, &cookie, start_bytes, max_bytes).await?;
            #[allow(clippy::print_stdout)]
            {
                match report.largest_accepted {
                    Some(size) => println!("largest accepted: {size} bytes"),
                    None => println!("largest accepted: none"),
                }
                match report.first_rejected {
                    Some((size, status)) => println!("first rejected: {size} bytes ({status})"),
                    None => println!("first rejected: none up to {max_bytes} bytes"),
                }
                if !report.left_behind.is_empty() {
                    println!("not cleaned up: product ids {:?}", report.left_behind);
                }
            }
        }
    }
    Ok(())
}
