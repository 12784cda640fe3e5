//! Terminal drawing for the binary.
//!
//! Frames come in as [`Snapshot`]s taken by the session; pages come in as a
//! finished [`Outcome`] or [`Leaderboard`].  Nothing here reads shared state.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use galaga::entities::{Snapshot, ENEMY_H, ENEMY_W, SHIP_W};
use galaga::highscores::Leaderboard;
use galaga::{Ending, GameError, Outcome, Renderer};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_DIVIDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_BEST: Color = Color::DarkYellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_LEVEL: Color = Color::Cyan;
const C_SHIP: Color = Color::Green;
const C_SHIP_HIT: Color = Color::Red;
const C_ENEMY: Color = Color::Red;
const C_BULLET_PLAYER: Color = Color::Yellow;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

// ── Sprites ───────────────────────────────────────────────────────────────────

const SHIP_ART: &str = "<( ^ )>";

const ENEMY_ART: [[&str; ENEMY_H as usize]; 3] = [
    ["\\-O-/", "  v  "],
    [" /-\\ ", " \\v/ "],
    [" /-\\ ", " \\_/ "],
];

fn enemy_art(level: u32) -> &'static [&'static str; ENEMY_H as usize] {
    let index = (level.max(1) as usize - 1).min(ENEMY_ART.len() - 1);
    &ENEMY_ART[index]
}

/// Draw `text` at `(x, y)` unless the cell is off-screen.
fn put<W: Write>(out: &mut W, x: i32, y: i32, text: &str) -> std::io::Result<()> {
    if x < 0 || y < 0 || x > i32::from(u16::MAX) || y > i32::from(u16::MAX) {
        return Ok(());
    }
    out.queue(cursor::MoveTo(x as u16, y as u16))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── Renderer ──────────────────────────────────────────────────────────────────

/// Frame renderer handed to the session.
pub struct Screen<'a, W: Write> {
    out: &'a mut W,
    best: u32,
}

impl<'a, W: Write> Screen<'a, W> {
    pub fn new(out: &'a mut W, best: u32) -> Self {
        Self { out, best }
    }
}

impl<W: Write> Renderer for Screen<'_, W> {
    fn render(&mut self, frame: &Snapshot) -> Result<(), GameError> {
        render(self.out, frame, self.best)?;
        Ok(())
    }
}

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, frame: &Snapshot, best: u32) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_hud(out, frame, best)?;
    draw_controls_hint(out, frame)?;

    let art = enemy_art(frame.level);
    out.queue(style::SetForegroundColor(C_ENEMY))?;
    for &(x, y) in &frame.enemies {
        let ex = x.clamp(0, (frame.width - ENEMY_W).max(0));
        for (r, line) in art.iter().enumerate() {
            put(out, ex, y + r as i32, line)?;
        }
    }

    out.queue(style::SetForegroundColor(C_BULLET_PLAYER))?;
    for &(x, y) in &frame.player_bullets {
        put(out, x, y, "|")?;
    }
    out.queue(style::SetForegroundColor(C_BULLET_ENEMY))?;
    for &(x, y) in &frame.enemy_bullets {
        if y < frame.height {
            put(out, x, y, "!")?;
        }
    }

    draw_ship(out, frame)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, 0))?;
    out.flush()?;
    Ok(())
}

// ── HUD (rows 0–1) ────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, frame: &Snapshot, best: u32) -> std::io::Result<()> {
    let w = frame.width;

    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    put(out, 2, 0, &format!("Score:{:>6}", frame.score))?;

    out.queue(style::SetForegroundColor(C_HUD_BEST))?;
    put(out, (w / 2 - 12).max(16), 0, &format!("Best:{:>6}", best.max(frame.score)))?;

    let hearts: String = "♥".repeat(frame.lives as usize);
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    put(out, (w / 2 + 6).max(30), 0, &format!("Lives:{hearts}"))?;

    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    put(out, (w - 10).max(42), 0, &format!("Level:{}", frame.level))?;

    out.queue(style::SetForegroundColor(C_DIVIDER))?;
    put(out, 0, 1, &"─".repeat(w.max(0) as usize))?;
    Ok(())
}

// ── Ship ──────────────────────────────────────────────────────────────────────

fn draw_ship<W: Write>(out: &mut W, frame: &Snapshot) -> std::io::Result<()> {
    let left = (frame.ship_x - SHIP_W / 2).clamp(0, (frame.width - SHIP_W).max(0));
    let color = if frame.hit_flash { C_SHIP_HIT } else { C_SHIP };
    out.queue(style::SetForegroundColor(color))?;
    put(out, left, frame.ship_y, SHIP_ART)
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, frame: &Snapshot) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_HINT))?;
    put(
        out,
        1,
        frame.height - 1,
        "← → / A D : Move   SPACE / K : Shoot   Q : Quit",
    )
}

// ── Full-screen pages ─────────────────────────────────────────────────────────

/// Print `lines` centred on the screen, each in its own colour.
fn draw_centred<W: Write>(out: &mut W, lines: &[(String, Color)]) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let cx = i32::from(width / 2);
    let top = i32::from(height / 2) - lines.len() as i32 / 2;
    for (i, (text, color)) in lines.iter().enumerate() {
        let col = cx - text.chars().count() as i32 / 2;
        out.queue(style::SetForegroundColor(*color))?;
        put(out, col.max(0), (top + i as i32).max(0), text)?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

fn podium_lines(scores: &[u32]) -> Vec<(String, Color)> {
    scores
        .iter()
        .enumerate()
        .map(|(i, s)| (format!("{}. {:>6}", i + 1, s), Color::White))
        .collect()
}

pub fn draw_instructions<W: Write>(out: &mut W) -> std::io::Result<()> {
    let lines = [
        ("INSTRUCTIONS", Color::Cyan),
        ("", Color::White),
        ("Destroy every enemy without losing all your lives.", Color::White),
        ("Enemies shoot back: dodge their bullets or take damage.", Color::White),
        ("Clear three waves to win. Every 300 points earns a life.", Color::White),
        ("", Color::White),
        ("A / ←  move left      D / →  move right", Color::DarkGrey),
        ("SPACE / K  shoot      Q  end the game", Color::DarkGrey),
        ("", Color::White),
        ("Press any key to return", Color::DarkGrey),
    ];
    let lines: Vec<(String, Color)> = lines.iter().map(|(t, c)| (t.to_string(), *c)).collect();
    draw_centred(out, &lines)
}

pub fn draw_high_scores<W: Write>(out: &mut W, board: &Leaderboard) -> std::io::Result<()> {
    let mut lines = vec![
        ("HIGH SCORES".to_string(), Color::Yellow),
        (String::new(), Color::White),
    ];
    lines.extend(podium_lines(&board.scores()));
    lines.push((String::new(), Color::White));
    lines.push(("Press any key to return".to_string(), Color::DarkGrey));
    draw_centred(out, &lines)
}

// ── Game-over / victory ──────────────────────────────────────────────────────

pub fn draw_ending<W: Write>(out: &mut W, outcome: &Outcome) -> std::io::Result<()> {
    let (banner, color) = match outcome.ending {
        Ending::Victory => ("║   VICTORY!  ALL WAVES CLEARED   ║", Color::Green),
        Ending::GameOver => ("║            GAME  OVER           ║", Color::Red),
    };
    let mut lines = vec![
        ("╔═════════════════════════════════╗".to_string(), color),
        (banner.to_string(), color),
        ("╚═════════════════════════════════╝".to_string(), color),
        (format!("Final Score: {:>6}", outcome.score), Color::Yellow),
        (format!("Level reached: {}", outcome.level), Color::Cyan),
        (String::new(), Color::White),
        ("Top scores".to_string(), Color::White),
    ];
    lines.extend(podium_lines(&outcome.top_scores));
    lines.push((String::new(), Color::White));
    lines.push(("R - Play Again  Q - Menu".to_string(), Color::White));
    draw_centred(out, &lines)
}
