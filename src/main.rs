//! tgsend CLI - main entry point
//!
//! Resolves credentials, builds one message request from the flags and
//! dispatches it. Exit code 0 on success, non-zero on any error.

use std::io::Read;
use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use tgsend::{config, Level, MessageKind, MessageRequest, ParseMode, Telegram};

#[derive(Parser)]
#[command(name = "tgsend")]
#[command(about = "Simple tool to send messages to a Telegram chat", long_about = None)]
#[command(version)]
#[command(group(ArgGroup::new("media").args([
    "photo", "doc", "audio", "video", "anim", "voice", "sticker"
])))]
struct Cli {
    /// The text to be sent; "-" reads from standard input
    text: Option<String>,

    /// Configuration file different from the default locations
    #[arg(short = 'l', long = "load", value_name = "PATH")]
    load: Option<PathBuf>,

    /// Bot configuration section to be loaded
    #[arg(short = 'c', long = "config", value_name = "SECTION", default_value = config::DEFAULT_SECTION)]
    config: String,

    /// Override the chat id from the loaded configuration
    #[arg(long, value_name = "CHAT_ID")]
    id: Option<String>,

    /// Title of the message
    #[arg(short, long, default_value = "")]
    title: String,

    /// Formatting used for the text
    #[arg(long = "format", value_name = "MODE", default_value = "none",
          value_parser = ["none", "markdown", "markdownV2", "html"])]
    format: String,

    /// Send message without notification
    #[arg(long)]
    silent: bool,

    /// Path to a picture to be sent
    #[arg(short = 'p', long)]
    photo: Option<PathBuf>,

    /// Path to a document to be sent
    #[arg(short = 'd', long)]
    doc: Option<PathBuf>,

    /// Path to an audio file to be sent
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Path to a video to be sent
    #[arg(long)]
    video: Option<PathBuf>,

    /// Path to an animation (gif or mp4) to be sent
    #[arg(long)]
    anim: Option<PathBuf>,

    /// Path to a voice message (.ogg encoded with OPUS) to be sent
    #[arg(long)]
    voice: Option<PathBuf>,

    /// Path to a sticker file in .webp or .tgs format
    #[arg(long)]
    sticker: Option<PathBuf>,

    /// Unicode icon placed beside the title of the message
    #[arg(long, default_value = "")]
    icon: String,

    /// Thumbnail image for document/audio/video/animation uploads
    #[arg(long, value_name = "PATH")]
    thumb: Option<PathBuf>,

    /// Log level of the message (icon overridden by --icon)
    #[arg(long = "lvl", value_name = "LEVEL", default_value = "no",
          value_parser = ["success", "info", "warn", "error", "alert", "no"])]
    level: String,

    /// Format message as fixed-width text
    #[arg(long)]
    fixed: bool,

    /// Disable link previews
    #[arg(long = "no-preview")]
    no_preview: bool,

    /// Always print the message id returned by Telegram
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tgsend=info".parse()?))
        .init();

    let cli = Cli::parse();

    let credentials = config::resolve(
        None,
        cli.id.as_deref(),
        &cli.config,
        cli.load.as_deref(),
    )?;

    let request = build_request(&cli)?;

    let telegram = Telegram::new(credentials)?;
    let dispatch = telegram.send(&request).await?;

    if cli.verbose {
        match dispatch.message_id {
            Some(id) => println!("Sent message {}", id),
            None => println!("Sent"),
        }
    }

    Ok(())
}

fn build_request(cli: &Cli) -> anyhow::Result<MessageRequest> {
    let kind = if let Some(path) = &cli.photo {
        MessageKind::Photo { path: path.clone() }
    } else if let Some(path) = &cli.doc {
        MessageKind::Document {
            path: path.clone(),
            thumb: cli.thumb.clone(),
        }
    } else if let Some(path) = &cli.audio {
        MessageKind::Audio {
            path: path.clone(),
            thumb: cli.thumb.clone(),
        }
    } else if let Some(path) = &cli.video {
        MessageKind::Video {
            path: path.clone(),
            thumb: cli.thumb.clone(),
        }
    } else if let Some(path) = &cli.anim {
        MessageKind::Animation {
            path: path.clone(),
            thumb: cli.thumb.clone(),
        }
    } else if let Some(path) = &cli.voice {
        MessageKind::Voice { path: path.clone() }
    } else if let Some(path) = &cli.sticker {
        MessageKind::Sticker { path: path.clone() }
    } else {
        MessageKind::Text {
            fixed: cli.fixed,
            disable_preview: cli.no_preview,
        }
    };

    let body = read_body(cli)?;
    if body.is_empty() && matches!(kind, MessageKind::Text { .. }) {
        return Err(tgsend::Error::InvalidArgument(
            "no message text given (pass it as an argument, or \"-\" to read stdin)".to_string(),
        )
        .into());
    }

    let parse_mode = ParseMode::parse(&cli.format).unwrap_or_default();
    let level = Level::parse(&cli.level).unwrap_or_default();

    let mut request = MessageRequest::new(kind, body);
    request.title = cli.title.clone();
    request.icon = cli.icon.clone();
    request.level = level;
    request.parse_mode = parse_mode;
    request.silent = cli.silent;
    Ok(request)
}

fn read_body(cli: &Cli) -> anyhow::Result<String> {
    match cli.text.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(text) => Ok(text.to_string()),
        None => Ok(String::new()),
    }
}
