mod action;
mod app;
mod config;
mod error;
mod event;
mod forge;
mod gitlab;
mod pages;
mod refresh;
mod section;
mod tui;
mod types;
mod ui;

use std::fs::OpenOptions;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::config::Config;
use crate::event::Event;
use crate::forge::Forge;
use crate::gitlab::GitLab;
use crate::section::Section;
use crate::tui::EventHandler;
use crate::types::ListMergeRequestsOptions;

/// Browse your open GitLab merge requests from the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Config file (JSON, or TOML with a .toml extension). Defaults to
    /// ~/.config/lazylab/config.toml, then ~/.lazylab
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| fatal(e));
    let gitlab = GitLab::new(&config).unwrap_or_else(|e| fatal(e));
    info!(user = %config.user, server = %gitlab.base_url(), "starting");

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(Arc::new(gitlab), &config).await;

    tui::restore()?;

    result
}

fn fatal(err: impl std::fmt::Display) -> ! {
    eprintln!("lazylab: {}", err);
    std::process::exit(1);
}

/// Log to <cache>/lazylab/lazylab.log so output never lands on the TUI.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_file = dirs::cache_dir()
        .map(|dir| dir.join("lazylab"))
        .and_then(|dir| {
            std::fs::create_dir_all(&dir).ok()?;
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("lazylab.log"))
                .ok()
        });

    match log_file {
        Some(file) => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        None => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

async fn run(forge: Arc<dyn Forge>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new();
    let sections = [
        ("Author", ListMergeRequestsOptions::authored_by(config.user_id)),
        ("Approver", ListMergeRequestsOptions::approvable_by(config.user_id)),
    ];
    for (title, opts) in sections {
        let mut section = Section::new();
        section.set_refresh(refresh::refresh_fn(
            Arc::clone(&forge),
            opts,
            action_tx.clone(),
        ));
        app.add_section(title, section);
    }

    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(render_rate);

    app.start();

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
