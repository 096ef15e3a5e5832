use std::error::Error;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use snake_advisor::advisor::steerable_move;
use snake_advisor::config::GameSettings;
use snake_advisor::engine::{Engine, SimulationState};
use snake_advisor::events::GameEvent;
use snake_advisor::input::{Command, poll_command};
use snake_advisor::logging::{self, LogTarget};
use snake_advisor::remote::{AdviceReply, AdviceRequest, AdviceWorker, Advisor, OfflineService};
use snake_advisor::renderer::{self, HudInfo};
use snake_advisor::scheduler::TickScheduler;
use snake_advisor::stats::Statistics;
use snake_advisor::store::{self, JsonFileStore, Store};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const RECENT_SCORES_KEPT: usize = 10;

type AppTerminal = Terminal<CrosstermBackend<io::Stdout>>;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Board width in cells.
    #[arg(long)]
    width: Option<u16>,
    /// Board height in cells.
    #[arg(long)]
    height: Option<u16>,
    /// Starting tick interval in milliseconds.
    #[arg(long = "interval-ms")]
    interval_ms: Option<u64>,
    /// Seed for reproducible food placement.
    #[arg(long)]
    seed: Option<u64>,
    /// Let the advisor steer.
    #[arg(long)]
    autopilot: bool,
    /// Run the autopilot without a terminal UI.
    #[arg(long)]
    headless: bool,
    /// Tick limit for headless runs.
    #[arg(long = "max-ticks", default_value_t = 100_000)]
    max_ticks: u64,
    /// Settings file to use instead of the default location.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Do not write settings or statistics.
    #[arg(long = "no-save")]
    no_save: bool,
}

/// Settings, statistics and where they are persisted.
struct Session {
    settings: GameSettings,
    stats: Statistics,
    settings_store: JsonFileStore<GameSettings>,
    stats_store: JsonFileStore<Statistics>,
    save: bool,
    recent_scores: Vec<u32>,
    round_started: Instant,
}

impl Session {
    fn load(cli: &Cli) -> Self {
        let settings_store =
            JsonFileStore::new(cli.settings.clone().unwrap_or_else(store::settings_path));
        let stats_store = JsonFileStore::new(store::stats_path());

        let mut settings = settings_store.load().unwrap_or_else(|error| {
            eprintln!(
                "Ignoring unreadable settings at {}: {error}",
                settings_store.path().display()
            );
            GameSettings::default()
        });
        let stats = stats_store.load().unwrap_or_else(|error| {
            eprintln!(
                "Ignoring unreadable statistics at {}: {error}",
                stats_store.path().display()
            );
            Statistics::default()
        });

        if let Some(width) = cli.width {
            settings.grid_width = width;
        }
        if let Some(height) = cli.height {
            settings.grid_height = height;
        }
        if let Some(interval_ms) = cli.interval_ms {
            settings.tick_interval_ms = interval_ms;
        }

        Self {
            settings,
            stats,
            settings_store,
            stats_store,
            save: !cli.no_save,
            recent_scores: Vec::new(),
            round_started: Instant::now(),
        }
    }

    fn start_round(&mut self) {
        self.round_started = Instant::now();
    }

    fn finish_round(&mut self, score: u32, snake_length: usize) -> AdviceRequest {
        let play_time_secs = self.round_started.elapsed().as_secs();
        let request = AdviceRequest::Performance {
            score,
            play_time_secs,
            recent_scores: self.recent_scores.clone(),
        };

        self.stats.record_game(score, play_time_secs, snake_length);
        self.recent_scores.push(score);
        if self.recent_scores.len() > RECENT_SCORES_KEPT {
            self.recent_scores.remove(0);
        }
        let new_high = self.settings.update_high_score(score);
        tracing::info!(score, play_time_secs, new_high, "round recorded");

        self.persist(new_high);
        request
    }

    fn record_hint(&mut self) {
        self.stats.record_advice_used();
        self.persist(false);
    }

    fn persist(&self, settings_changed: bool) {
        if !self.save {
            return;
        }
        if let Err(error) = self.stats_store.save(&self.stats) {
            tracing::warn!(%error, "failed to save statistics");
        }
        if settings_changed {
            if let Err(error) = self.settings_store.save(&self.settings) {
                tracing::warn!(%error, "failed to save settings");
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let mut session = Session::load(&cli);

    if cli.headless {
        logging::init(LogTarget::Stderr)?;
    } else {
        logging::init(LogTarget::File(&store::log_path()))?;
    }

    let config = session.settings.engine_config();
    let engine = match cli.seed {
        Some(seed) => Engine::with_seed(config, seed)?,
        None => Engine::new(config)?,
    };

    if cli.headless {
        run_headless(engine, &mut session, cli.max_ticks);
        return Ok(());
    }

    install_panic_hook();
    let mut terminal = enter_terminal()?;
    let result = run(&mut terminal, engine, &mut session, cli.autopilot);
    leave_terminal()?;
    result?;
    Ok(())
}

fn run(
    terminal: &mut AppTerminal,
    mut engine: Engine,
    session: &mut Session,
    mut autopilot: bool,
) -> io::Result<()> {
    let events = engine.subscribe();
    let worker = AdviceWorker::spawn(Advisor::new(OfflineService));
    let mut scheduler = TickScheduler::new(engine.tick_interval(), Instant::now());
    let mut advice = String::from("Press [?] for a hint, [G] for a tip, [T] to toggle autopilot.");

    loop {
        let snapshot = engine.snapshot();
        terminal.draw(|frame| {
            renderer::render(
                frame,
                &snapshot,
                &HudInfo {
                    state: engine.state(),
                    high_score: session.settings.high_score,
                    tick_interval: engine.tick_interval(),
                    autopilot,
                    advice: &advice,
                },
            );
        })?;

        let wait = if scheduler.is_suspended() {
            FRAME_INTERVAL
        } else {
            scheduler
                .time_until_next(Instant::now())
                .min(FRAME_INTERVAL)
        };
        if let Some(command) = poll_command(wait)? {
            match command {
                Command::Quit => break,
                Command::Direction(direction) if !autopilot => engine.set_direction(direction),
                Command::Direction(_) => {}
                Command::Start => {
                    if engine.state() == SimulationState::Ready {
                        session.start_round();
                    }
                    engine.start();
                }
                Command::TogglePause => engine.toggle_pause(),
                Command::Restart => {
                    engine.restart();
                    session.start_round();
                }
                Command::Hint => {
                    if worker.request(AdviceRequest::Advice(engine.snapshot())) {
                        session.record_hint();
                    }
                }
                Command::Tip => {
                    if worker.request(AdviceRequest::Tip) {
                        session.record_hint();
                    }
                }
                Command::ToggleAutopilot => autopilot = !autopilot,
            }
        }

        let now = Instant::now();
        if engine.state() == SimulationState::Playing {
            scheduler.resume(now);
        } else {
            scheduler.suspend();
        }

        if scheduler.poll(now) {
            if autopilot {
                if let Some(direction) = steerable_move(&engine.snapshot()) {
                    engine.set_direction(direction);
                }
            }
            engine.tick();
            scheduler.set_interval(engine.tick_interval());
        }

        for request in drain_game_over(&events, &engine, session) {
            worker.request(request);
        }

        while let Some(reply) = worker.try_reply() {
            if let AdviceReply::Text(text) = reply {
                advice = text;
            }
        }
    }

    Ok(())
}

fn drain_game_over(
    events: &Receiver<GameEvent>,
    engine: &Engine,
    session: &mut Session,
) -> Vec<AdviceRequest> {
    events
        .try_iter()
        .filter_map(|event| match event {
            GameEvent::GameOver { final_score } => {
                Some(session.finish_round(final_score, engine.snake_len()))
            }
            GameEvent::Updated { .. } | GameEvent::ScoreChanged { .. } => None,
        })
        .collect()
}

fn run_headless(mut engine: Engine, session: &mut Session, max_ticks: u64) {
    let events = engine.subscribe();
    engine.start();
    session.start_round();

    while engine.state() == SimulationState::Playing && engine.tick_count() < max_ticks {
        if let Some(direction) = steerable_move(&engine.snapshot()) {
            engine.set_direction(direction);
        }
        engine.tick();
    }

    let recent = session.recent_scores.clone();
    let finished = !drain_game_over(&events, &engine, session).is_empty();
    let review = Advisor::new(OfflineService).performance(
        engine.score(),
        session.round_started.elapsed().as_secs(),
        &recent,
    );

    println!(
        "score={} length={} ticks={} finished={} interval_ms={}",
        engine.score(),
        engine.snake_len(),
        engine.tick_count(),
        finished,
        engine.tick_interval().as_millis(),
    );
    println!("{review}");
}

fn enter_terminal() -> io::Result<AppTerminal> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    if let Err(error) = execute!(stdout, EnterAlternateScreen, Hide) {
        let _ = disable_raw_mode();
        return Err(error);
    }

    Terminal::new(CrosstermBackend::new(stdout))
}

fn leave_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), Show, LeaveAlternateScreen)
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        default_hook(panic_info);
    }));
}
