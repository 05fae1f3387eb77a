use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use era_player::audio::{RodioTransport, SilentTransport, Transport};
use era_player::bridge::{ControlBridge, MediaControlsSurface, NullSurface};
use era_player::clipboard::Osc52Clipboard;
use era_player::config::{Cli, Config};
use era_player::controller::{AppController, ControllerOptions, Services};
use era_player::events::{AppEvent, NetworkLoader};
use era_player::logging;
use era_player::model::{CatalogClient, JsonFileStore, SessionStore, DEFAULT_VOLUME};
use era_player::view::{render_catalog_error, AppView};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    if let Err(e) = logging::init_logging(&config.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!(server = %config.server_url, "=== Era Player Starting ===");

    let client = CatalogClient::new(&config.server_url, config.request_timeout())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = match client.load_catalog().await {
        Ok(catalog) => {
            tracing::info!(tracks = catalog.len(), "Catalog loaded");
            let (tx, rx) = mpsc::unbounded_channel();

            let transport: Box<dyn Transport> = match RodioTransport::new(DEFAULT_VOLUME) {
                Ok(transport) => Box::new(transport),
                Err(e) => {
                    tracing::warn!(error = %e, "No audio output, continuing without sound");
                    Box::new(SilentTransport::default())
                }
            };

            let bridge = if config.media_controls {
                let remote_tx = tx.clone();
                match MediaControlsSurface::attach(move |command| {
                    let _ = remote_tx.send(AppEvent::Remote(command));
                }) {
                    Ok(surface) => ControlBridge::new(surface),
                    Err(e) => {
                        tracing::warn!(error = %e, "Media controls unavailable");
                        ControlBridge::new(NullSurface)
                    }
                }
            } else {
                ControlBridge::new(NullSurface)
            };

            let services = Services {
                transport,
                bridge,
                loader: Box::new(NetworkLoader::new(client.clone(), tx)),
                clipboard: Box::new(Osc52Clipboard),
            };
            let options = ControllerOptions {
                default_artist: config.default_artist.clone(),
                search_debounce: config.search_debounce(),
                share_base: client.base_url().clone(),
            };
            let session = SessionStore::new(JsonFileStore::open(&config.state_file));
            let mut controller = AppController::new(catalog, session, services, options);

            if let Some(link) = cli.deep_link() {
                controller.open_deep_link(link);
            }

            let res = run_app(&mut terminal, &mut controller, rx).await;
            controller.shutdown();
            res
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load catalog");
            show_catalog_error(&mut terminal, &e.to_string())
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Era Player shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Tui,
    controller: &mut AppController,
    mut events: UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    loop {
        controller.tick(Instant::now());

        while let Ok(event) = events.try_recv() {
            controller.handle_event(event);
        }

        let playback = controller.playback_info();
        let ui_state = controller.ui_state();
        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, controller.listing());
        })?;

        // Handle input with shorter poll time for smoother UI updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                controller.handle_key_event(key);
            }
        }

        if controller.should_quit() {
            break;
        }

        // Let spawned loads make progress between frames
        tokio::task::yield_now().await;
    }

    Ok(())
}

/// Keeps the error screen up until the user quits.
fn show_catalog_error(terminal: &mut Tui, message: &str) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_catalog_error(f, message))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter)
                {
                    return Ok(());
                }
            }
        }
    }
}
