//! Terminal chat client for an orflax server.
//!
//! Type a line to send it; an empty line asks for the greeting. Captions are
//! printed line by line as the avatar would reveal them. `/quit` or EOF ends
//! the session.

use anyhow::Context as _;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use clap::Parser;
use orflax::client::{CaptionTimer, ChatSession, DEFAULT_BASE_URL};
use orflax::config::CaptionConfig;
use orflax::message::Message;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orflax-chat", version, about)]
struct Cli {
    /// Server base URL.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Save each reply's audio into this directory.
    #[arg(long)]
    save_audio: Option<PathBuf>,

    /// Write the chat log here when the session ends.
    #[arg(long)]
    transcript: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orflax=warn")),
        )
        .init();

    let cli = Cli::parse();
    if let Some(dir) = &cli.save_audio {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut session = ChatSession::new(cli.url.clone());
    let mut captions = CaptionTimer::new(&CaptionConfig::default());
    let mut saved = 0usize;

    println!("Connected to {}. Type a message, /quit to leave.", cli.url);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "/quit" {
            break;
        }
        if let Err(e) = session.send(&line).await {
            eprintln!("{e}");
            continue;
        }

        while let Some(message) = session.current().cloned() {
            print_captions(&mut captions, &message);
            if let Some(dir) = &cli.save_audio {
                match save_audio(dir, saved, &message) {
                    Ok(Some(path)) => println!("  [audio saved to {}]", path.display()),
                    Ok(None) => {}
                    Err(e) => eprintln!("could not save audio: {e:#}"),
                }
                saved += 1;
            }
            session.message_played();
        }
    }

    if let Some(path) = &cli.transcript {
        match session.log().export_text() {
            Some(text) => {
                std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
                println!("Chat log written to {}", path.display());
            }
            None => println!("Nothing to export."),
        }
    }
    Ok(())
}

/// Print each caption line in reveal order, stepping the timer through its
/// deadlines instead of waiting in real time.
fn print_captions(timer: &mut CaptionTimer, message: &Message) {
    let mut now = Instant::now();
    timer.activate(&message.text, now);
    let mut last = None;
    loop {
        let state = timer.poll(now);
        if last != Some(state)
            && let Some(line) = timer.caption()
        {
            println!("AI: {line}");
        }
        last = Some(state);
        match timer.next_deadline() {
            Some(deadline) => now = deadline,
            None => break,
        }
    }
}

fn save_audio(dir: &Path, n: usize, message: &Message) -> anyhow::Result<Option<PathBuf>> {
    let Some(audio) = message.audio.as_deref() else {
        return Ok(None);
    };
    let bytes = STANDARD.decode(audio).context("audio is not valid base64")?;
    let ext = if bytes.starts_with(b"RIFF") { "wav" } else { "mp3" };
    let path = dir.join(format!("reply_{n}.{ext}"));
    std::fs::write(&path, bytes)?;
    Ok(Some(path))
}
