use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use clap::Parser;
use courtroom_core::{CourtSession, HttpCourtGateway, NoticeKind, SessionEvent, StagedDocument};
use shared::domain::Side;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

mod config;
mod render;

use config::{load_settings, prepare_server_url};

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the courtroom backend, e.g. http://localhost:8000.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    jurisdiction: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Plaintiff document to stage on startup; repeat for more than one.
    #[arg(long = "plaintiff", value_name = "FILE")]
    plaintiff_files: Vec<PathBuf>,
    /// Defendant document to stage on startup; repeat for more than one.
    #[arg(long = "defendant", value_name = "FILE")]
    defendant_files: Vec<PathBuf>,
}

const COMMANDS: &str = "Commands: file | p <text> | d <text> | verdict | status | show | reset | quit";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(jurisdiction) = args.jurisdiction {
        settings.jurisdiction = jurisdiction;
    }
    if let Some(category) = args.category {
        settings.category = category;
    }
    let server_url = prepare_server_url(&settings.server_url)?;

    let gateway = Arc::new(HttpCourtGateway::new(server_url.clone()));
    let session = CourtSession::with_gateway(gateway);

    let mut events = session.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            print_event(&event);
        }
    });

    for path in &args.plaintiff_files {
        stage_from_path(&session, Side::Plaintiff, path).await;
    }
    for path in &args.defendant_files {
        stage_from_path(&session, Side::Defendant, path).await;
    }

    println!("Connected to {server_url}.");
    println!("{COMMANDS}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(text) = line.strip_prefix("p ") {
            let _ = session.submit_argument(Side::Plaintiff, text).await;
            continue;
        }
        if let Some(text) = line.strip_prefix("d ") {
            let _ = session.submit_argument(Side::Defendant, text).await;
            continue;
        }
        match line {
            "file" => {
                let _ = session
                    .file_case(&settings.jurisdiction, &settings.category)
                    .await;
            }
            "verdict" => {
                let _ = session.request_verdict().await;
            }
            "status" => {
                if let Ok(recorded) = session.case_status().await {
                    let snapshot = session.snapshot().await;
                    println!(
                        "Rounds: {}/{} used locally, {recorded} recorded by the backend.",
                        snapshot.rounds_used, snapshot.max_rounds
                    );
                }
            }
            "show" => print!("{}", render::render_snapshot(&session.snapshot().await)),
            "reset" => session.reset_case().await,
            "quit" | "exit" => break,
            _ => println!("{COMMANDS}"),
        }
    }

    Ok(())
}

async fn stage_from_path(session: &CourtSession, side: Side, path: &Path) {
    match std::fs::read(path) {
        Ok(payload) => {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            session
                .stage_documents(side, vec![StagedDocument::new(name, payload)])
                .await;
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not read document");
        }
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::StagingUpdated {
            side, documents, ..
        } => {
            println!("[staging] {side}: {}", render::format_staged(documents));
        }
        SessionEvent::PhaseChanged(phase) => {
            println!("[phase] {}", render::phase_label(*phase));
        }
        SessionEvent::CaseFiled { case, receipt } => {
            println!(
                "[case] {} filed with {} plaintiff and {} defendant document(s)",
                case.case_id, receipt.plaintiff_file_count, receipt.defendant_file_count
            );
        }
        SessionEvent::VerdictUpdated(verdict) => {
            print!("{}", render::render_verdict(verdict));
        }
        SessionEvent::VerdictUnavailable { reason } => {
            println!("[verdict] unavailable: {reason}");
        }
        SessionEvent::ArgumentRecorded {
            argument,
            rounds_used,
            rounds_remaining,
        } => {
            println!(
                "[argument] {} round {rounds_used} recorded ({rounds_remaining} remaining)",
                argument.side
            );
        }
        SessionEvent::CaseReset => println!("[case] session reset"),
        SessionEvent::Notice(notice) => {
            let marker = match notice.kind {
                NoticeKind::Success => "ok",
                NoticeKind::Warning => "warn",
                NoticeKind::Error => "error",
            };
            println!("[{marker}] {}", notice.text);
        }
    }
}
