/// Rendering layer. All terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// state into terminal commands.

use std::f32::consts::TAU;
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::Vec2;

use crate::enemy::{DRAIN_RANGE, GLITCH_RANGE};
use crate::entities::{Arena, Enemy, EnemyKind, GameState, GameStatus, Level};
use crate::world::ArenaView;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_PLAYER_GLITCHED: Color = Color::Green;
const C_FLASH: Color = Color::White;
const C_DATAWISP: Color = Color::Red;
const C_BITBUG: Color = Color::DarkYellow;
const C_MEMORYLEECH: Color = Color::Magenta;
const C_SYNTAXBREAKER: Color = Color::Green;
const C_GENERIC: Color = Color::DarkRed;
const C_DRAIN_RING: Color = Color::DarkMagenta;
const C_GLITCH_RING: Color = Color::DarkGreen;
const C_SAFE_ZONE: Color = Color::Cyan;
const C_SAFE_ZONE_COOLDOWN: Color = Color::DarkGrey;
const C_BAR_FULL: Color = Color::Green;
const C_BAR_LOW: Color = Color::Red;
const C_BAR_EMPTY: Color = Color::DarkGrey;
const C_HINT: Color = Color::DarkGrey;

/// Cells sampled when outlining a range ring.
const RING_SAMPLES: usize = 24;

// ── World → terminal mapping ──────────────────────────────────────────────────

/// Maps arena coordinates onto the terminal cells inside the border.
///
/// Row 0 is the HUD, row 1 and `rows - 2` are the border, the last row is
/// the controls hint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    arena_width: f32,
    arena_height: f32,
}

impl Viewport {
    pub fn fit(arena: &Arena, cols: u16, rows: u16) -> Viewport {
        Viewport {
            cols,
            rows,
            arena_width: arena.width,
            arena_height: arena.height,
        }
    }

    fn inner_cols(&self) -> f32 {
        f32::from(self.cols.saturating_sub(2).max(1))
    }

    fn inner_rows(&self) -> f32 {
        f32::from(self.rows.saturating_sub(4).max(1))
    }

    /// Terminal cell for a world point, `None` when it falls outside the play area.
    pub fn to_cell(&self, point: Vec2) -> Option<(u16, u16)> {
        let fx = point.x / self.arena_width;
        let fy = point.y / self.arena_height;
        if !(0.0..1.0).contains(&fx) || !(0.0..1.0).contains(&fy) {
            return None;
        }
        let col = 1 + (fx * self.inner_cols()) as u16;
        let row = 2 + (fy * self.inner_rows()) as u16;
        Some((col, row))
    }

    /// World units covered by one terminal column.
    pub fn units_per_col(&self) -> f32 {
        self.arena_width / self.inner_cols()
    }
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_safe_zone(out, &state.arena, view)?;
    draw_hud(out, state, view)?;

    for enemy in &state.enemies {
        render_enemy(out, enemy, view)?;
    }

    draw_player(out, state, view)?;
    draw_controls_hint(out, view)?;

    if state.status == GameStatus::GameOver {
        draw_game_over(out, state, view)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

/// Draw one enemy with its health bar and kind-specific decorations.
/// Inactive enemies draw nothing.
pub fn render_enemy<W: Write>(out: &mut W, enemy: &Enemy, view: &Viewport) -> std::io::Result<()> {
    if !enemy.active {
        return Ok(());
    }
    let Some((col, row)) = view.to_cell(enemy.pos) else {
        return Ok(());
    };

    // Overlays first so the body stays on top.
    draw_enemy_features(out, enemy, view)?;

    let color = if enemy.is_flashing { C_FLASH } else { enemy_color(enemy.kind) };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(enemy_glyph(enemy.kind)))?;

    if enemy.health < enemy.max_health {
        draw_health_bar(out, enemy, col, row)?;
    }
    Ok(())
}

fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Datawisp => C_DATAWISP,
        EnemyKind::Bitbug => C_BITBUG,
        EnemyKind::MemoryLeech => C_MEMORYLEECH,
        EnemyKind::SyntaxBreaker => C_SYNTAXBREAKER,
        EnemyKind::Generic => C_GENERIC,
    }
}

fn enemy_glyph(kind: EnemyKind) -> &'static str {
    match kind {
        EnemyKind::Datawisp => "◉",
        EnemyKind::Bitbug => "✸",
        EnemyKind::MemoryLeech => "◍",
        EnemyKind::SyntaxBreaker => "▣",
        EnemyKind::Generic => "●",
    }
}

// ── Border & safe zone ───────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1: top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2: bottom bar
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

fn draw_safe_zone<W: Write>(out: &mut W, arena: &Arena, view: &Viewport) -> std::io::Result<()> {
    let status = arena.safe_zone_status();
    let (color, glyph) = match (status.available, status.in_safe_zone) {
        (false, _) => (C_SAFE_ZONE_COOLDOWN, "·"),
        (true, true) => (C_SAFE_ZONE, "◆"),
        (true, false) => (C_SAFE_ZONE, "◇"),
    };
    draw_ring(out, view, arena.center(), arena.safe_zone_radius, 0.0, color, glyph)
}

/// Outline a circle by stamping `glyph` at evenly spaced angles.
fn draw_ring<W: Write>(
    out: &mut W,
    view: &Viewport,
    center: Vec2,
    radius: f32,
    phase: f32,
    color: Color,
    glyph: &str,
) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(color))?;
    for i in 0..RING_SAMPLES {
        let angle = phase + i as f32 / RING_SAMPLES as f32 * TAU;
        let point = center + Vec2::from_angle(angle) * radius;
        if let Some((col, row)) = view.to_cell(point) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print(glyph))?;
        }
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    // Score, high score and wave, left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Score:{:>6}  Hi:{:>6}  Wave:{:>2}",
        state.score, state.high_score, state.wave
    )))?;

    // Level, centre
    let (level_str, level_color) = match state.level {
        Level::Easy => ("[ EASY ]", Color::Green),
        Level::Medium => ("[ MEDIUM ]", Color::Yellow),
        Level::Hard => ("[ HARD ]", Color::Red),
    };
    let lx = (view.cols / 2).saturating_sub(level_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(level_color))?;
    out.queue(Print(level_str))?;

    // Zone, overclock and health, right
    let status = state.arena.safe_zone_status();
    let zone = if !status.available {
        format!("ZONE {:>2}s", state.arena.cooldown_remaining.ceil() as u32)
    } else if status.in_safe_zone {
        "SHIELDED".to_string()
    } else {
        "ZONE OK".to_string()
    };
    let glitch = if state.player.glitch_timer > 0.0 { "GLITCH " } else { "" };
    let right_str = format!(
        "{glitch}{zone}  OC:{:>3}%  HP:{:>3}",
        state.player.overclock_charge as u32, state.player.health.max(0.0) as u32
    );
    let rx = view
        .cols
        .saturating_sub(right_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(&right_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    let Some((col, row)) = view.to_cell(state.player.pos) else {
        return Ok(());
    };
    let color = if state.player.glitch_timer > 0.0 { C_PLAYER_GLITCHED } else { C_PLAYER };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print("▲"))?;
    Ok(())
}

/// Three-cell bar above the enemy: green while above a quarter, red below.
fn draw_health_bar<W: Write>(out: &mut W, enemy: &Enemy, col: u16, row: u16) -> std::io::Result<()> {
    if row <= 2 {
        return Ok(());
    }
    let fraction = enemy.health_fraction();
    let filled = (fraction * 3.0).ceil() as usize;
    let fill_color = if fraction > 0.25 { C_BAR_FULL } else { C_BAR_LOW };

    out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row - 1))?;
    out.queue(style::SetForegroundColor(fill_color))?;
    out.queue(Print("▬".repeat(filled)))?;
    out.queue(style::SetForegroundColor(C_BAR_EMPTY))?;
    out.queue(Print("▭".repeat(3 - filled.min(3))))?;
    Ok(())
}

fn draw_enemy_features<W: Write>(out: &mut W, enemy: &Enemy, view: &Viewport) -> std::io::Result<()> {
    let tint = |c: Color| if enemy.is_flashing { C_FLASH } else { c };
    match enemy.kind {
        EnemyKind::Datawisp => {
            // Wisp trail one cell behind the direction of travel.
            let behind = enemy.pos - enemy.velocity.normalize_or_zero() * view.units_per_col();
            if let Some((col, row)) = view.to_cell(behind) {
                out.queue(cursor::MoveTo(col, row))?;
                out.queue(style::SetForegroundColor(tint(C_DATAWISP)))?;
                out.queue(Print("∙"))?;
            }
        }
        EnemyKind::Bitbug => {
            // Spikes stick out further while dashing.
            let reach = (if enemy.is_dashing() { 2.0 } else { 1.0 }) * view.units_per_col();
            let spike = if enemy.is_dashing() { "✦" } else { "·" };
            out.queue(style::SetForegroundColor(tint(C_BITBUG)))?;
            for dir in [Vec2::X, Vec2::NEG_X, Vec2::Y, Vec2::NEG_Y] {
                if let Some((col, row)) = view.to_cell(enemy.pos + dir * reach) {
                    out.queue(cursor::MoveTo(col, row))?;
                    out.queue(Print(spike))?;
                }
            }
        }
        EnemyKind::MemoryLeech => {
            // Drain ring blinks with the pulse clock.
            if enemy.is_draining() && (enemy.pulse_timer() * 8.0).sin() > -0.5 {
                draw_ring(out, view, enemy.pos, DRAIN_RANGE, enemy.pulse_timer(), C_DRAIN_RING, "∘")?;
            }
        }
        EnemyKind::SyntaxBreaker => {
            if enemy.is_glitching() {
                let t = enemy.pulse_timer();
                draw_ring(out, view, enemy.pos, GLITCH_RANGE, t * 2.0, C_GLITCH_RING, ":")?;

                // Scrambled glyphs jittering around the body.
                out.queue(style::SetForegroundColor(tint(C_SYNTAXBREAKER)))?;
                for i in 0..4 {
                    let seed = t * 37.0 + i as f32 * 1.7;
                    let jitter = Vec2::new(seed.sin(), (seed * 1.3).cos()) * 2.0 * view.units_per_col();
                    if let Some((col, row)) = view.to_cell(enemy.pos + jitter) {
                        out.queue(cursor::MoveTo(col, row))?;
                        out.queue(Print(["0", "1", "{", "}"][i]))?;
                    }
                }
            }
        }
        EnemyKind::Generic => {}
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "←↑↓→ / WASD : Move   SPACE : Pulse   E : Dash   O : Overclock   Q : Quit",
    ))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    let new_best = state.score >= state.high_score && state.score > 0;
    let lines: [(String, Color); 6] = [
        ("╔════════════════════╗".to_string(), Color::Red),
        ("║    GAME  OVER      ║".to_string(), Color::Red),
        ("╚════════════════════╝".to_string(), Color::Red),
        (
            format!("Final Score: {:>6}  Wave {}", state.score, state.wave),
            Color::Yellow,
        ),
        (
            if new_best {
                format!("★ NEW BEST: {:>6} ★", state.high_score)
            } else {
                format!("Best Score:  {:>6}", state.high_score)
            },
            if new_best { Color::Yellow } else { Color::DarkGrey },
        ),
        ("R - Play Again  Q - Quit".to_string(), Color::White),
    ];

    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }

    Ok(())
}
