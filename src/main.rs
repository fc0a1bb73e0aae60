pub mod category;
pub mod log;
pub mod runtime;
pub mod tracker;
pub mod ui;

use crate::{
    category::Category,
    log::{TimeLog, DEFAULT_LOG_FILE},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    tracker::Tracker,
};
use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// minimal time-tracking tui with task toggling and a durable session log
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A minimal time-tracking TUI: press a task's number to start working on it, press the same number to stop, or another number to switch. Completed sessions are appended to a JSON log."
)]
pub struct Cli {
    /// file the session log is read from and written to
    #[clap(short = 'd', long = "data", default_value = DEFAULT_LOG_FILE)]
    data: PathBuf,
}

/// Which surface the next keystroke belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Select,
    Comment,
}

#[derive(Debug, PartialEq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub tracker: Tracker,
    pub time_log: TimeLog,
    pub mode: InputMode,
    pub comment_draft: String,
    pub tick: u64,
}

impl App {
    pub fn new(time_log: TimeLog) -> Self {
        Self {
            tracker: Tracker::new(),
            time_log,
            mode: InputMode::Select,
            comment_draft: String::new(),
            tick: 0,
        }
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn on_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match self.mode {
            InputMode::Select => self.on_select_key(key),
            InputMode::Comment => {
                self.on_comment_key(key);
                KeyOutcome::Continue
            }
        }
    }

    fn on_select_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.flush_active();
            return KeyOutcome::Quit;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.flush_active();
                KeyOutcome::Quit
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                // Comment editing is only reachable while a session is open
                if self.tracker.is_tracking() {
                    self.comment_draft = self
                        .tracker
                        .active()
                        .and_then(|session| session.comment.clone())
                        .unwrap_or_default();
                    self.mode = InputMode::Comment;
                }
                KeyOutcome::Continue
            }
            KeyCode::Char(c) => {
                if let Some(index) = c.to_digit(10) {
                    if let Some(category) = Category::from_index(index as usize) {
                        self.select(category);
                    }
                }
                KeyOutcome::Continue
            }
            _ => KeyOutcome::Continue,
        }
    }

    fn on_comment_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let draft = std::mem::take(&mut self.comment_draft);
                // Cannot fail: comment mode is only entered with an open
                // session and nothing closes it while the editor is focused
                let _ = self.tracker.set_comment(Some(draft));
                self.mode = InputMode::Select;
            }
            KeyCode::Esc => {
                self.comment_draft.clear();
                self.mode = InputMode::Select;
            }
            KeyCode::Backspace => {
                self.comment_draft.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.comment_draft.push(c);
            }
            _ => {}
        }
    }

    fn select(&mut self, category: Category) {
        if let Some(entry) = self.tracker.select(category, Local::now()) {
            // A failed write is not retried; the in-memory log stays authoritative
            let _ = self.time_log.append(entry);
        }
    }

    /// Closes and persists the open session, if any. Runs before every exit
    /// path so quitting never drops tracked time.
    fn flush_active(&mut self) {
        if let Some(entry) = self.tracker.close_for_shutdown(Local::now()) {
            let _ = self.time_log.append(entry);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // Load (or create) the durable log before touching the terminal so a
    // malformed file aborts with a readable error
    let time_log = TimeLog::load(&cli.data)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(time_log);
    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                app.on_tick();
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                if app.on_key(key) == KeyOutcome::Quit {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
