//! Line-oriented front-end: `:`-prefixed lines are commands, anything else
//! goes through the interaction router.

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use client_core::{
    ChallengeToggle, DocumentUpload, RoundStart, SessionController, SessionEvent, UploadError,
    UploadOutcome,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::TryRecvError},
};
use tracing::{info, warn};

use crate::render;

const HELP: &str = "\
Commands:
  :upload PATH   upload a .pdf or .txt document and start a new session
  :challenge     start a challenge round, or close the active one
  :close         close the active challenge round
  :stats         show document and challenge status
  :summary       show the document summary
  :history       show the full interaction history
  :json          dump the session as JSON
  :help          show this help
  :quit          exit
Any other line is a question, or the answer to the pending challenge.
Start a line with :: to send text that begins with a colon.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(Option<PathBuf>),
    Challenge,
    Close,
    Stats,
    Summary,
    History,
    Json,
    Help,
    Quit,
    Unknown(String),
    Submit(String),
}

pub fn parse_command(line: &str) -> Command {
    let Some(rest) = line.trim_start().strip_prefix(':') else {
        return Command::Submit(line.to_string());
    };
    if rest.starts_with(':') {
        return Command::Submit(rest.to_string());
    }
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest.trim(), ""),
    };
    match name {
        "upload" | "u" => Command::Upload((!arg.is_empty()).then(|| PathBuf::from(arg))),
        "challenge" | "c" => Command::Challenge,
        "close" => Command::Close,
        "stats" => Command::Stats,
        "summary" => Command::Summary,
        "history" | "h" => Command::History,
        "json" => Command::Json,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

pub async fn run(
    controller: Arc<SessionController>,
    initial_document: Option<PathBuf>,
) -> Result<()> {
    let mut events = controller.subscribe_events();
    println!("{HELP}");

    if let Some(path) = initial_document {
        upload(&controller, &path).await;
        flush_events(&mut events);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let pending = controller.pending_challenge().await;
        print!("{}", render::prompt(pending.as_deref()));
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };

        let keep_going = handle(&controller, parse_command(&line)).await?;
        flush_events(&mut events);
        if !keep_going {
            break;
        }
    }

    info!("assistant session ended");
    Ok(())
}

async fn handle(controller: &SessionController, command: Command) -> Result<bool> {
    match command {
        Command::Submit(input) => {
            // Successful exchanges are printed from the event stream.
            if let Err(err) = controller.submit(&input).await {
                println!("! {err}");
            }
        }
        Command::Upload(None) => println!("! {}", UploadError::NoFileSelected),
        Command::Upload(Some(path)) => upload(controller, &path).await,
        Command::Challenge => match controller.toggle_challenge().await {
            ChallengeToggle::Closed { dropped } => {
                println!("Challenge closed ({dropped} unanswered question(s) dropped).")
            }
            ChallengeToggle::Opened(RoundStart::Started(count)) => {
                println!("Challenge started with {count} question(s).")
            }
            ChallengeToggle::Opened(RoundStart::Failed(_) | RoundStart::Discarded) => {}
        },
        Command::Close => {
            let dropped = controller.close_challenge_round().await;
            println!("Challenge closed ({dropped} unanswered question(s) dropped).");
        }
        Command::Stats => println!("{}", render::status(&controller.snapshot().await)),
        Command::Summary => println!("{}", render::summary(&controller.summary().await)),
        Command::History => println!("{}", render::history(&controller.history().await)),
        Command::Json => {
            let snapshot = controller.snapshot().await;
            println!(
                "{}",
                serde_json::to_string_pretty(&snapshot).context("failed to encode session")?
            );
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => return Ok(false),
        Command::Unknown(name) => println!("! unknown command ':{name}', try :help"),
    }
    Ok(true)
}

async fn upload(controller: &SessionController, path: &Path) {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let probe = DocumentUpload::new(filename.clone(), Vec::new());
    if !probe.has_accepted_extension() {
        println!("! {}", UploadError::UnsupportedFileType { filename });
        return;
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path = %path.display(), "failed to read document: {err}");
            println!("! Could not read {}: {err}", path.display());
            return;
        }
    };

    match controller
        .upload_document(DocumentUpload::new(filename, bytes))
        .await
    {
        Ok(UploadOutcome::Loaded { .. }) => {
            println!("{}", render::summary(&controller.summary().await));
            println!("{}", render::status(&controller.snapshot().await));
        }
        Ok(UploadOutcome::Discarded) => {}
        Err(err) => println!("! {err}"),
    }
}

fn flush_events(events: &mut broadcast::Receiver<SessionEvent>) {
    loop {
        match events.try_recv() {
            Ok(SessionEvent::HistoryAppended(entry)) => println!("{}", render::entry(&entry)),
            Ok(SessionEvent::SessionReset { .. } | SessionEvent::ChallengeStateChanged { .. }) => {}
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "missed session events; use :history to resync")
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
