// SPDX-License-Identifier: MIT OR Apache-2.0

//! Xionghan CLI - Command-line client for the Xionghan game service
//!
//! Plays against the service interactively, asks the engine for single
//! moves, or runs unattended self-play with both sides driven by the engine.

mod input;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use xionghan_core::ClickOutcome;
use xionghan_network::config::{self, ClientConfig};
use xionghan_network::{
    AiMoveResult, Algorithm, ApiError, ClientEvent, FileStore, FinishReason, GameClient, HttpGameApi,
    SelfPlay, SelfPlayConfig,
};

use input::Command as InputCommand;

type Client = GameClient<HttpGameApi, FileStore>;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(
    name = "xionghan-cli",
    about = "Xionghan game service command-line client",
    version
)]
struct Args {
    /// Base URL of the game service (overrides the config file)
    #[clap(long, global = true)]
    server: Option<String>,

    /// Config file to use instead of the platform default
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Session file holding the game id and move counter
    #[clap(long, global = true)]
    session_file: Option<PathBuf>,

    /// Enable debug logging
    #[clap(long, global = true)]
    debug: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resume or start a game and play it from stdin
    Play,
    /// Resume or start a game and let the engine play one move
    Ai,
    /// Let the engine play both sides until the game ends
    Selfplay(SelfPlayArgs),
}

#[derive(clap::Args, Debug)]
struct SelfPlayArgs {
    /// Red search algorithm (ab or mcts)
    #[clap(long)]
    red_algo: Option<Algorithm>,

    /// Red search depth (ab) or simulation count (mcts)
    #[clap(long)]
    red_value: Option<u32>,

    /// Black search algorithm (ab or mcts)
    #[clap(long)]
    black_algo: Option<Algorithm>,

    /// Black search depth (ab) or simulation count (mcts)
    #[clap(long)]
    black_value: Option<u32>,

    /// Delay between moves in milliseconds
    #[clap(long)]
    delay_ms: Option<u64>,
}

impl SelfPlayArgs {
    fn apply(&self, config: &mut SelfPlayConfig) {
        if let Some(algo) = self.red_algo {
            config.red.algo = algo;
        }
        if let Some(value) = self.red_value {
            config.red.value = value;
        }
        if let Some(algo) = self.black_algo {
            config.black.algo = algo;
        }
        if let Some(value) = self.black_value {
            config.black.value = value;
        }
        if let Some(delay) = self.delay_ms {
            config.step_delay_ms = delay;
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_client_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => config::load_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;

    if let Some(server) = &args.server {
        config.server_url = server.clone();
    }
    if let Some(path) = &args.session_file {
        config.session_file = Some(path.clone());
    }
    if let Command::Selfplay(selfplay_args) = &args.command {
        selfplay_args.apply(&mut config.selfplay);
    }
    Ok(config)
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config = load_client_config(&args)?;
    tracing::debug!(?config, "Configuration loaded");

    let api = HttpGameApi::new(config.server_url.clone(), config.request_timeout())
        .context("Failed to create HTTP client")?;
    let store = FileStore::open(config.session_path());
    let mut client = GameClient::new(api, store).with_ai_settings(config.ai_move);

    let printer = tokio::spawn(print_events(client.subscribe()));

    // Self-play always starts from a fresh game
    if !matches!(args.command, Command::Selfplay(_)) {
        client
            .load()
            .await
            .with_context(|| format!("Failed to reach the game service at {}", config.server_url))?;
    }

    let result = match args.command {
        Command::Play => run_play(&mut client).await,
        Command::Ai => run_ai(&mut client).await,
        Command::Selfplay(_) => run_selfplay(&mut client, config.selfplay).await,
    };

    printer.abort();
    result
}

/// Print warnings, errors and self-play log lines as they happen
async fn print_events(mut events: broadcast::Receiver<ClientEvent>) {
    loop {
        match events.recv().await {
            Ok(ClientEvent::Warning(message)) => println!("! {}", message),
            Ok(ClientEvent::Error(message)) => eprintln!("Error: {}", message),
            Ok(ClientEvent::AiStats(stats)) => println!("AI: {}", stats),
            Ok(ClientEvent::GameOver { winner }) => println!("Game over! {} wins", winner),
            Ok(ClientEvent::SelfPlay(event)) => println!("[self-play] {}", event),
            Ok(ClientEvent::GameStarted { game_id }) => println!("New game {}", game_id),
            Ok(ClientEvent::GameResumed { game_id, move_count }) => {
                println!("Resumed game {} at move {}", game_id, move_count)
            }
            Ok(ClientEvent::MovePlayed { .. }) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event printer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Forward lines from `reader` over a channel from a plain thread.
///
/// A blocking read there never holds up runtime shutdown. The channel closes
/// on EOF or a read error.
fn spawn_line_reader<R>(reader: R) -> mpsc::UnboundedReceiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in reader.lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    spawn_line_reader(std::io::BufReader::new(std::io::stdin()))
}

/// Interactive play from stdin
async fn run_play(client: &mut Client) -> Result<()> {
    print_game_state(client);
    println!("{}", input::HELP);

    let mut lines = stdin_lines();

    loop {
        tokio::select! {
            // Handle Ctrl+C gracefully
            _ = signal::ctrl_c() => {
                println!("\nReceived Ctrl+C, shutting down gracefully...");
                break;
            }

            line = lines.recv() => {
                let Some(line) = line else {
                    break; // EOF
                };

                let command = match input::parse_command(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                };

                match command {
                    InputCommand::Click(square) => match client.click(square).await {
                        Ok(ClickOutcome::Ignored) => {
                            println!("Board is locked; type 'new' to start another game");
                        }
                        Ok(_) => print_game_state(client),
                        // Rejections are reported by the event printer
                        Err(e) => tracing::debug!(error = %e, "Click failed"),
                    },
                    InputCommand::Ai => {
                        if play_ai_move(client).await {
                            print_game_state(client);
                        }
                    }
                    InputCommand::New => match client.new_game().await {
                        Ok(()) => print_game_state(client),
                        Err(e) => eprintln!("Failed to start a new game: {}", e),
                    },
                    InputCommand::Show => print_game_state(client),
                    InputCommand::Help => println!("{}", input::HELP),
                    InputCommand::Quit => break,
                }
            }
        }
    }

    Ok(())
}

/// Returns whether the board changed
async fn play_ai_move(client: &mut Client) -> bool {
    match client.request_ai_move().await {
        Ok(AiMoveResult::Played(mv)) => {
            println!("AI plays {}", mv);
            true
        }
        Ok(AiMoveResult::GameRestarted) => true,
        Ok(AiMoveResult::NoMove(_)) => false,
        Err(ApiError::GameOver) => {
            println!("Game is over; type 'new' to start another game");
            false
        }
        Err(e) => {
            tracing::debug!(error = %e, "AI move failed");
            false
        }
    }
}

async fn run_ai(client: &mut Client) -> Result<()> {
    play_ai_move(client).await;
    print_game_state(client);
    Ok(())
}

async fn run_selfplay(client: &mut Client, config: SelfPlayConfig) -> Result<()> {
    let mut selfplay = SelfPlay::new(config, client);
    selfplay
        .start(client)
        .await
        .context("Failed to start self-play")?;
    print_game_state(client);
    println!("Self-play running. Press Enter to pause/resume, Ctrl+C to stop.");

    let handle = selfplay.handle();
    let mut lines = stdin_lines();
    let control = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    handle.stop();
                    break;
                }
                line = lines.recv() => match line {
                    Some(_) => {
                        handle.toggle_pause();
                    }
                    // stdin closed; only Ctrl+C can stop the run now
                    None => {
                        if signal::ctrl_c().await.is_ok() {
                            handle.stop();
                        }
                        break;
                    }
                },
            }
        }
    });

    let reason = selfplay.run(client).await;
    control.abort();

    print_game_state(client);
    match reason {
        FinishReason::GameOver(Some(winner)) => println!("Self-play finished: {} wins", winner),
        FinishReason::GameOver(None) => println!("Self-play finished"),
        FinishReason::NoMoves => println!("Self-play finished: no legal moves"),
        FinishReason::Stopped => println!("Self-play stopped"),
        FinishReason::Aborted(reason) => println!("Self-play aborted: {}", reason),
    }
    Ok(())
}

/// Print the current game state
fn print_game_state(client: &Client) {
    println!("\n{}", render::render_board(client.state()));
    println!("{}", render::status_line(client.state(), client.session()));
}
