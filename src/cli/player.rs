use std::{io::Write, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    info,
    management::PlayerSession,
    success,
    types::{ApiOutcome, NowPlayingRow, PlaybackSnapshot},
    utils, warning,
};

/// Runs the interactive playback session.
///
/// Authenticates first, then reads commands from stdin until `quit` or EOF.
/// The loop keeps the last playback state it observed and hands it to
/// `play_pause`, so `toggle` acts on the freshest knowledge available
/// without an extra query.
pub async fn run() {
    let session = PlayerSession::new();

    info!("Connecting to Spotify...");
    match session.login().await {
        Ok(()) => success!("Authentication successful!"),
        Err(reason) => {
            warning!("Not connected: {}", reason);
            info!("If the browser redirect did not arrive, paste it here with: login <url>");
        }
    }

    print_help();

    let mut is_playing = false;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("spoctl> ");
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            _ => break,
        };
        let input = line.trim();
        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        match command {
            "" => {}
            "status" | "s" => {
                if let Some(snapshot) = show_status(&session).await {
                    is_playing = snapshot.is_playing;
                }
            }
            "next" | "n" => report(session.next().await, "Skipped to next track"),
            "prev" | "p" => report(session.previous().await, "Skipped to previous track"),
            "toggle" | "t" => {
                let action = if is_playing { "Paused" } else { "Resumed" };
                let outcome = session.play_pause(is_playing).await;
                if matches!(outcome, ApiOutcome::Success(())) {
                    is_playing = !is_playing;
                }
                report(outcome, action);
            }
            "login" => {
                let result = if rest.is_empty() {
                    session.login().await
                } else {
                    session.login_with_redirect(rest).await
                };
                match result {
                    Ok(()) => success!("Authentication successful!"),
                    Err(reason) => warning!("Login failed: {}", reason),
                }
            }
            "logout" => {
                session.logout();
                is_playing = false;
                success!("Logged out. Session credential discarded.");
            }
            "help" | "h" => print_help(),
            "quit" | "q" | "exit" => break,
            other => warning!("Unknown command '{}'. Type 'help' for the command list.", other),
        }
    }
}

async fn show_status(session: &PlayerSession) -> Option<PlaybackSnapshot> {
    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching playback state...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let outcome = session.fetch_now_playing().await;
    pb.finish_and_clear();

    match outcome {
        ApiOutcome::Success(snapshot) => {
            let row = NowPlayingRow {
                state: (if snapshot.is_playing { "▶" } else { "⏸" }).to_string(),
                track: snapshot.track_name.clone(),
                artists: snapshot.artist_line(),
                progress: utils::format_progress(snapshot.progress_ms, snapshot.duration_ms),
            };
            println!("{}", Table::new(vec![row]));
            Some(snapshot)
        }
        ApiOutcome::NoContent => {
            info!("Nothing is playing right now.");
            None
        }
        ApiOutcome::Unauthorized => {
            warning!("Not authenticated. Run 'login' first.");
            None
        }
        ApiOutcome::Failure(status) => {
            warning!("Spotify returned status {}.", status);
            None
        }
        ApiOutcome::TransportError => {
            warning!("Network error talking to Spotify.");
            None
        }
    }
}

fn report(outcome: ApiOutcome<()>, success_message: &str) {
    match outcome {
        ApiOutcome::Success(()) | ApiOutcome::NoContent => success!("{}", success_message),
        ApiOutcome::Unauthorized => warning!("Not authenticated. Run 'login' first."),
        ApiOutcome::Failure(status) => warning!("Spotify returned status {}.", status),
        ApiOutcome::TransportError => warning!("Network error talking to Spotify."),
    }
}

fn print_help() {
    info!("Commands: status (s), next (n), prev (p), toggle (t), login [url], logout, help, quit");
}
