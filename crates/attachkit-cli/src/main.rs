//! attachkit: prepare files for sending the way the composer does.
//!
//! Configuration comes from `ATTACH_*` variables (and `.env`); see `AttachConfig::from_env`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use attachkit_cli::{build_batch, init_tracing, print_attachment_table};
use attachkit_core::{ensure_protocol, AttachConfig, AttachmentOptions};
use attachkit_processing::{
    prepare_attachments_to_send, AttachmentBuilder, FfmpegMediaProber, ImageTransformer,
    InMemoryPayloadStore,
};

#[derive(Parser)]
#[command(name = "attachkit", about = "Build attachment records for local files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe files and print the attachment records they produce
    Build {
        /// Files to attach
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Use the high-quality quick preview ceiling
        #[arg(long)]
        high_quality: bool,
        /// Normalize for sending, preferring compressed copies
        #[arg(long, conflicts_with = "send_original")]
        send_compressed: bool,
        /// Normalize for sending originals as files
        #[arg(long)]
        send_original: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// Override the mime type instead of inferring it from the extension
        #[arg(long, value_name = "TYPE")]
        mime: Option<String>,
    },
    /// Normalize a link before opening it
    Link {
        /// URL as typed or clicked
        url: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn build(
    files: Vec<PathBuf>,
    high_quality: bool,
    send_mode: Option<bool>,
    format: OutputFormat,
    mime: Option<String>,
) -> anyhow::Result<()> {
    let config = Arc::new(AttachConfig::from_env().context("Invalid attachment configuration")?);
    let prober = Arc::new(FfmpegMediaProber::from_config(&config)?);
    let transcoder = Arc::new(ImageTransformer::new(config.jpeg_quality));
    let store = Arc::new(InMemoryPayloadStore::new());
    let builder = Arc::new(AttachmentBuilder::new(config, prober, transcoder, store));

    let options = if high_quality {
        AttachmentOptions::high_quality()
    } else {
        AttachmentOptions::default()
    };

    let outcome = build_batch(builder, files, mime.as_deref(), &options).await?;
    for failure in &outcome.failures {
        eprintln!("{}: {}", failure.path.display(), failure.message);
    }
    let failures = outcome.failures.len();
    let mut attachments = outcome.attachments;

    if let Some(send_compressed) = send_mode {
        attachments = prepare_attachments_to_send(&attachments, send_compressed);
    }

    match format {
        OutputFormat::Json => print_json(&attachments)?,
        OutputFormat::Table => print_attachment_table(&attachments),
    }

    if failures > 0 {
        bail!("{} file(s) could not be attached", failures);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            files,
            high_quality,
            send_compressed,
            send_original,
            format,
            mime,
        } => {
            let send_mode = match (send_compressed, send_original) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            build(files, high_quality, send_mode, format, mime).await?;
        }
        Commands::Link { url } => match ensure_protocol(&url) {
            Some(url) => println!("{}", url),
            None => bail!("Empty link"),
        },
    }

    Ok(())
}
