mod display;

use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use galaga::clock::{Clock, SystemClock};
use galaga::coordinator;
use galaga::entities::Arena;
use galaga::highscores::FileHighScores;
use galaga::input::{Command, InputSource};
use galaga::{Config, GameError};

#[derive(Parser)]
#[command(name = "galaga")]
#[command(about = "Terminal Galaga where every game system runs on its own thread")]
struct Args {
    /// TOML file overriding the default tuning
    #[arg(long)]
    config: Option<PathBuf>,
    /// High-score file (defaults to ~/.galaga_scores)
    #[arg(long)]
    scores: Option<PathBuf>,
    /// Write logs to this file; filter with RUST_LOG
    #[arg(long)]
    log: Option<PathBuf>,
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Map a key to a game command.
fn decode(code: KeyCode, modifiers: KeyModifiers) -> Option<Command> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Command::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Command::Right),
        KeyCode::Char(' ') | KeyCode::Char('k') | KeyCode::Char('K') => Some(Command::Fire),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

/// Key events from the reader thread, decoded into commands.  Press and
/// repeat both count; releases are ignored because held keys already expire
/// on their own.
struct KeyInput {
    rx: mpsc::Receiver<Event>,
}

impl KeyInput {
    /// Block for the next key press.
    fn next_press(&self) -> Option<KeyCode> {
        loop {
            match self.rx.recv() {
                Ok(Event::Key(KeyEvent {
                    code,
                    kind: KeyEventKind::Press,
                    ..
                })) => return Some(code),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Throw away whatever queued up while nobody was listening.
    fn drain(&self) {
        while self.rx.try_recv().is_ok() {}
    }
}

impl InputSource for KeyInput {
    fn next_command(&mut self, timeout: Duration) -> Option<Command> {
        match self.rx.recv_timeout(timeout) {
            Ok(Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                modifiers,
                ..
            })) => decode(code, modifiers),
            _ => None,
        }
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Play,
    Instructions,
    HighScores,
    Quit,
}

const MENU: [(MenuChoice, &str); 4] = [
    (MenuChoice::Play, "Play"),
    (MenuChoice::Instructions, "Instructions"),
    (MenuChoice::HighScores, "High scores"),
    (MenuChoice::Quit, "Quit"),
];

fn draw_menu<W: Write>(out: &mut W, selected: usize, best: u32) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  G A L A G A  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(7),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if best > 0 {
        let hs_str = format!("Best Score: {}", best);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs_str.chars().count() as u16 / 2),
            cy.saturating_sub(5),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    for (i, (_, label)) in MENU.iter().enumerate() {
        let row = cy.saturating_sub(2) + 2 * i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(8), row))?;
        if i == selected {
            out.queue(style::SetForegroundColor(Color::Yellow))?;
            out.queue(Print(format!("> {label} <")))?;
        } else {
            out.queue(style::SetForegroundColor(Color::White))?;
            out.queue(Print(format!("  {label}")))?;
        }
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(26), cy + 8))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("↑ ↓ / W S : Choose   ENTER : Select   Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

fn show_menu<W: Write>(
    out: &mut W,
    input: &KeyInput,
    selected: &mut usize,
    best: u32,
) -> std::io::Result<MenuChoice> {
    loop {
        draw_menu(out, *selected, best)?;
        match input.next_press() {
            Some(KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W')) => {
                *selected = (*selected + MENU.len() - 1) % MENU.len();
            }
            Some(KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S')) => {
                *selected = (*selected + 1) % MENU.len();
            }
            Some(KeyCode::Enter) => return Ok(MENU[*selected].0),
            Some(KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) | None => {
                return Ok(MenuChoice::Quit);
            }
            Some(_) => {}
        }
    }
}

/// After a session: `true` to play again, `false` for the menu.
fn wait_restart(input: &KeyInput) -> bool {
    loop {
        match input.next_press() {
            Some(KeyCode::Char('r') | KeyCode::Char('R')) => return true,
            Some(KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) | None => return false,
            Some(_) => {}
        }
    }
}

// ── Game ──────────────────────────────────────────────────────────────────────

fn run<W: Write>(
    out: &mut W,
    mut input: KeyInput,
    config: &Config,
    mut scores: FileHighScores,
) -> Result<(), GameError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let mut selected = 0;

    loop {
        let board = scores.load()?;
        match show_menu(out, &input, &mut selected, board.best())? {
            MenuChoice::Quit => return Ok(()),
            MenuChoice::Instructions => {
                display::draw_instructions(out)?;
                let _ = input.next_press();
            }
            MenuChoice::HighScores => {
                display::draw_high_scores(out, &board)?;
                let _ = input.next_press();
            }
            MenuChoice::Play => {
                let mut best = board.best();
                loop {
                    let (width, height) = terminal::size()?;
                    input.drain();
                    let mut screen = display::Screen::new(out, best);
                    let (outcome, source) = coordinator::play(
                        config.clone(),
                        Arena::new(width, height),
                        Arc::clone(&clock),
                        input,
                        &mut screen,
                        &mut scores,
                    )?;
                    let Some(source) = source else {
                        return Ok(());
                    };
                    input = source;
                    best = outcome.top_scores[0];

                    // Let the final frame register before the summary replaces it
                    thread::sleep(Duration::from_millis(400));
                    input.drain();
                    display::draw_ending(out, &outcome)?;
                    if !wait_restart(&input) {
                        break;
                    }
                }
            }
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Logs go to a file because the terminal belongs to the renderer.
fn init_logging(path: Option<&Path>) -> Result<(), GameError> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .init();
    Ok(())
}

fn main() -> Result<(), GameError> {
    let args = Args::parse();
    init_logging(args.log.as_deref())?;

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let scores = FileHighScores::new(args.scores.unwrap_or_else(FileHighScores::default_path));
    info!(scores = %scores.path().display(), "starting");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-repeat events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so neither the menus nor the input pump block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, KeyInput { rx }, &config, scores);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(err) = &result {
        error!(%err, "exiting on error");
    }
    result
}
