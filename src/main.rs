use std::io::stdout;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use tracing::info;

use sysdash::app::App;
use sysdash::config::{self, Config, load_config, load_config_from_path};
use sysdash::event::{Event, EventHandler};
use sysdash::logging::{LogTarget, init_tracing};
use sysdash::stream::{
    ConnectionState, StreamClient, StreamConfig, StreamError, StreamEvent, StreamState,
};
use sysdash::ui;
use sysdash::view::project;

#[derive(Parser)]
#[command(
    name = "sysdash",
    about = "Live terminal dashboard for a host telemetry event stream"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the telemetry server
    #[arg(long)]
    url: Option<String>,

    /// Event stream path on the server
    #[arg(long)]
    endpoint: Option<String>,

    /// Delay between reconnect attempts in milliseconds
    #[arg(long)]
    retry_ms: Option<u64>,

    /// Reconnect attempts before the stream is marked unavailable (0 = forever)
    #[arg(long)]
    max_retries: Option<u32>,

    /// Theme: dark, light
    #[arg(long)]
    theme: Option<String>,

    /// Color support: auto, 256, truecolor, mono
    #[arg(long)]
    color: Option<String>,

    /// Log file for the interactive dashboard
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter directive (e.g. `info`, `sysdash=debug`)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the first snapshot as text and exit, without the interactive UI.
    #[arg(long, default_value_t = false)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    if cli.once {
        init_tracing(LogTarget::Stderr, &config.logging.level)?;
        return run_once(config.stream.stream_config()).await;
    }

    let log_target = if config.logging.file.is_empty() {
        LogTarget::Disabled
    } else {
        LogTarget::File(Path::new(&config.logging.file))
    };
    init_tracing(log_target, &config.logging.level)?;

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, config).await;

    execute!(stdout(), DisableMouseCapture)?;
    ratatui::restore();

    result
}

async fn run(terminal: &mut ratatui::DefaultTerminal, config: Config) -> Result<()> {
    let tick_rate = Duration::from_millis(config.general.tick_rate_ms);
    let stream_config = config.stream.stream_config();
    let mut app = App::new(&config);
    let mut events = EventHandler::new(tick_rate);
    let mut client = Some(StreamClient::connect(stream_config.clone()));

    terminal.draw(|frame| ui::draw(frame, &mut app))?;

    while app.running {
        let should_draw = tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Event::Key(key)) => {
                    let action = app.map_key(key);
                    app.dispatch(action);
                    true
                }
                Some(Event::Mouse(mouse)) => {
                    let action = app.map_mouse(mouse);
                    app.dispatch(action);
                    true
                }
                Some(Event::Tick) => app.on_tick(),
                Some(Event::Redraw) => true,
                None => {
                    app.running = false;
                    false
                }
            },
            maybe_update = next_stream_event(&mut client) => match maybe_update {
                Some(update) => app.on_stream_event(update),
                None => {
                    // Connection task gave up; its final state was already applied.
                    client = None;
                    false
                }
            },
        };

        if app.take_reconnect_request() {
            if let Some(mut old) = client.take() {
                old.close();
            }
            info!(url = %stream_config.url, "manual reconnect");
            client = Some(StreamClient::connect(stream_config.clone()));
        }

        if should_draw {
            terminal.draw(|frame| ui::draw(frame, &mut app))?;
        }
    }

    if let Some(mut client) = client.take() {
        client.close();
    }
    app.stream.close();
    Ok(())
}

async fn next_stream_event(client: &mut Option<StreamClient>) -> Option<StreamEvent> {
    match client {
        Some(client) => client.next_event().await,
        None => std::future::pending().await,
    }
}

/// Headless mode: wait for the first snapshot, print it, tear down.
async fn run_once(stream_config: StreamConfig) -> Result<()> {
    let attempts = stream_config.max_retries.saturating_add(1);
    let mut client = StreamClient::connect(stream_config);
    let mut state = StreamState::new();

    let outcome = loop {
        let Some(event) = client.next_event().await else {
            break Err(StreamError::Exhausted { attempts });
        };
        state.apply(event);
        if state.snapshot().is_some() {
            break Ok(());
        }
        if state.connection() == ConnectionState::Unavailable {
            break Err(StreamError::Exhausted { attempts });
        }
    };

    client.close();
    let snapshot = state.shared_snapshot();
    state.close();

    outcome.map_err(|e| eyre!(e))?;
    let snapshot = snapshot.ok_or_else(|| eyre!("stream ended before any snapshot arrived"))?;
    println!("{}", project(&snapshot));
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(ref url) = cli.url {
        config.stream.url = url.clone();
    }
    if let Some(ref endpoint) = cli.endpoint {
        config.stream.endpoint = endpoint.clone();
    }
    if let Some(retry_ms) = cli.retry_ms {
        config.stream.retry_ms = retry_ms;
    }
    if let Some(max_retries) = cli.max_retries {
        config.stream.max_retries = max_retries;
    }
    if let Some(ref theme) = cli.theme {
        config.colors.theme = theme.clone();
    }
    if let Some(ref support) = cli.color {
        config.general.color_support = support.clone();
    }
    if let Some(ref path) = cli.log_file {
        config.logging.file = path.display().to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    config
}
