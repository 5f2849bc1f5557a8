mod config;
mod controller;
mod engine;
mod error;
mod logging;
mod model;
mod view;
mod voice;
#[cfg(test)]
mod testing;

use std::io;
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use config::{AppConfig, Args};
use controller::{AppController, ControllerSettings};
use engine::{LocalEngine, PlaybackEngine};
use model::{AppModel, Library, LibraryData};
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(&args).context("failed to load configuration")?;

    if let Err(e) = logging::init_logging(&config.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Voice Player Starting ===");

    let engine: Arc<dyn PlaybackEngine> = Arc::new(LocalEngine::new(config.load_delay));

    let data = match &config.library {
        Some(path) => LibraryData::load(path)
            .with_context(|| format!("failed to load library {}", path.display()))?,
        None => {
            tracing::info!("No library configured, using the demo library");
            LibraryData::demo()
        }
    };
    let library = Arc::new(Library::new(data, engine.clone()));
    library
        .activate_initial()
        .await
        .context("failed to queue the first playlist")?;

    let model = Arc::new(Mutex::new(AppModel::new()));
    let controller = AppController::new(
        model.clone(),
        engine,
        library,
        config.library.clone(),
        ControllerSettings {
            progress_step: config.progress_step,
            tween: config.tween,
        },
    );
    controller.activate().await;
    if config.start_expanded {
        controller.set_panel_progress(100.0);
    }

    let voice_subscription = controller.subscribe_voice(controller.voice_bridge());

    let feed_token = CancellationToken::new();
    if let Some(path) = config.voice_feed.clone() {
        let bridge = controller.voice_bridge().clone();
        let token = feed_token.clone();
        tokio::spawn(async move {
            let result = voice::run_voice_feed(path, bridge, token).await;
            log_result!("voice_feed", result);
        });
    }

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller.clone()).await;

    feed_token.cancel();
    voice_subscription.release();
    controller.deactivate();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Voice Player shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        let (playback, ui_state, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors().await;

            (
                model_guard.get_playback_info().await,
                model_guard.get_ui_state().await,
                model_guard.should_quit().await,
            )
        };

        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
