use catodoro::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    controller::{ControllerSettings, SessionController},
    engine::CountdownEngine,
    logging,
    notify::DesktopNotifier,
    runtime::{AppEvent, CrosstermEventSource, Runner, UI_TICK},
    sound::CommandPlayer,
    surface::TerminalSurface,
    util::{describe_duration, parse_duration},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Instant,
};

/// cat-themed focus timer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A cat-themed focus timer. Counts down a session, mirrors it in the window title, and meows when you're done."
)]
pub struct Cli {
    /// length of the first session, e.g. 25m, 90s, 1m30s (a bare number is minutes)
    #[clap(short = 'd', long, value_parser = parse_duration)]
    duration: Option<u64>,

    /// default session length in minutes, used on start-up and by reset
    #[clap(short = 'm', long, value_parser = clap::value_parser!(u32).range(1..))]
    minutes: Option<u32>,

    /// directory holding meow_1.wav .. meow_N.wav
    #[clap(long)]
    sounds_dir: Option<PathBuf>,

    /// how often the countdown engine checks the deadline, in milliseconds (1-1000)
    #[clap(long, value_parser = clap::value_parser!(u64).range(1..=1000))]
    tick_ms: Option<u64>,

    /// do not play a sound when a session completes
    #[clap(long)]
    no_sound: bool,

    /// do not send desktop notifications
    #[clap(long)]
    no_notify: bool,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer command-line overrides on top of the stored config
    fn apply(&self, config: &mut Config) {
        if let Some(minutes) = self.minutes {
            config.default_minutes = minutes;
        }
        if let Some(dir) = &self.sounds_dir {
            config.sounds_dir = dir.clone();
        }
        if let Some(ms) = self.tick_ms {
            config.tick_interval_ms = ms;
        }
        if self.no_sound {
            config.sound_enabled = false;
        }
        if self.no_notify {
            config.notifications = false;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply(&mut config);
    if cli.save_config {
        store.save(&config)?;
    }

    if let Some(path) = AppDirs::log_path() {
        if let Err(e) = logging::init(&path) {
            eprintln!("warning: logging disabled: {e}");
        }
    }

    let mut settings = ControllerSettings::from(&config);
    if let Some(secs) = cli.duration {
        settings.initial_secs = secs;
    }
    tracing::info!(
        session = %describe_duration(settings.initial_secs),
        config = %store.path().display(),
        "catodoro starting"
    );

    let controller = SessionController::new(
        CountdownEngine::spawn(config.tick_interval()),
        TerminalSurface::new(),
        DesktopNotifier::request_permission(config.notifications),
        CommandPlayer::detect(),
        settings,
    );
    let mut app = App::new(controller);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), UI_TICK);
    let mut last_tick = Instant::now();

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    while !app.should_quit {
        match runner.step() {
            AppEvent::Key(key) => app.on_key(key),
            AppEvent::Resize | AppEvent::Tick => {}
        }

        // pump on every event so a steady stream of keys cannot starve the clock
        let size = terminal.size()?;
        let now = Instant::now();
        app.on_tick(
            size.width,
            size.height,
            now.duration_since(last_tick).as_secs_f64(),
        );
        last_tick = now;

        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    tracing::info!("catodoro exiting");
    Ok(())
}
