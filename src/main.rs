use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use glam::Vec2;
use log::{error, info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;

use byte_wars::compute::{
    init_state, move_player, player_dash, player_overclock, player_pulse, tick,
};
use byte_wars::display::{self, Viewport};
use byte_wars::entities::{GameState, GameStatus, Level};
use byte_wars::logging;
use byte_wars::world::ArenaView;
use byte_wars::{SimConfig, WaveSpec};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Longest simulated step; a stalled terminal must not teleport enemies.
const MAX_DT: f32 = 0.1;

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// Min frames between pulses while Space is held.
const PULSE_COOLDOWN: u32 = 8;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LevelArg {
    Easy,
    Medium,
    Hard,
}

impl From<LevelArg> for Level {
    fn from(arg: LevelArg) -> Level {
        match arg {
            LevelArg::Easy => Level::Easy,
            LevelArg::Medium => Level::Medium,
            LevelArg::Hard => Level::Hard,
        }
    }
}

/// Byte Wars: survive waves of hostile code in a terminal arena
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file (the terminal UI otherwise logs nothing)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Arena width in world units
    #[arg(long, default_value_t = byte_wars::config::DEFAULT_ARENA_WIDTH)]
    width: f32,

    /// Arena height in world units
    #[arg(long, default_value_t = byte_wars::config::DEFAULT_ARENA_HEIGHT)]
    height: f32,

    /// Fixed RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Fixed wave composition, e.g. `datawisp=3,bitbug=2`
    #[arg(long)]
    wave: Option<WaveSpec>,

    /// Difficulty (skips the menu in headless mode)
    #[arg(long, value_enum, default_value_t = LevelArg::Medium)]
    level: LevelArg,

    /// Run the simulation without a terminal UI and print a summary
    #[arg(long)]
    headless: bool,

    /// Simulated seconds for headless mode
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,
}

impl Args {
    fn sim_config(&self) -> SimConfig {
        SimConfig {
            arena_width: self.width,
            arena_height: self.height,
            seed: self.seed,
            wave: self.wave.clone(),
            level: self.level.into(),
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn new_game(config: &SimConfig, level: Level, high_score: u32) -> GameState {
    let mut state = init_state(level, config.arena_width, config.arena_height, high_score);
    state.wave_override = config.wave.as_ref().map(|w| w.entries.clone());
    state
}

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── High-score persistence ────────────────────────────────────────────────────

fn high_score_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".byte_wars_score")
}

fn load_high_score() -> u32 {
    std::fs::read_to_string(high_score_path())
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn save_high_score(score: u32) {
    if let Err(e) = std::fs::write(high_score_path(), score.to_string()) {
        error!("could not save high score: {e}");
    }
}

// ── Headless run ──────────────────────────────────────────────────────────────

/// Autopilot: circle the arena centre, pulsing every half second.
fn run_headless(config: &SimConfig, seconds: f32) {
    const DT: f32 = 1.0 / 30.0;
    let mut rng = make_rng(config.seed);
    let mut state = new_game(config, config.level, 0);

    let steps = (seconds / DT).ceil() as u64;
    for step in 0..steps {
        if state.status != GameStatus::Playing {
            break;
        }
        let offset = state.player.pos - state.arena.center();
        let orbit = Vec2::new(-offset.y, offset.x);
        state = move_player(&state, orbit, DT);
        if step % 15 == 0 {
            state = player_pulse(&state);
        }
        state = player_overclock(&state);
        state = tick(&state, DT, &mut rng);
    }

    info!("headless run finished after {:.1}s", state.elapsed);
    println!(
        "survived {:.1}s  wave {}  score {}  kills {}  health {:.0}  enemies alive {}",
        state.elapsed,
        state.wave,
        state.score,
        state.kills,
        state.player.health,
        state.enemies.len()
    );
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Level),
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    high_score: u32,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "◆  BYTE  WARS  ◆";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(7),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if high_score > 0 {
        let hs_str = format!("Best Score: {}", high_score);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs_str.chars().count() as u16 / 2),
            cy.saturating_sub(6),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy.saturating_sub(4)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select difficulty:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Easy  ", Color::Green,  "Small waves, few specialists"),
        ("2", "Medium", Color::Yellow, "Balanced challenge"),
        ("3", "Hard  ", Color::Red,    "Swarms from wave one"),
    ];

    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(2) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(12), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" — {}", desc)))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy + 2))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Hostiles:"))?;

    let legend: &[(&str, Color, &str)] = &[
        ("◉", Color::Red,        " Data Wisp     — slow chaser"),
        ("✸", Color::DarkYellow, " Bit Bug       — dashes when close"),
        ("◍", Color::Magenta,    " Memory Leech  — drains dash & overclock"),
        ("▣", Color::Green,      " Syntax Breaker — scrambles your controls"),
    ];
    for (i, (sym, color, desc)) in legend.iter().enumerate() {
        let row = cy + 3 + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(12), row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(sym))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*desc))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy + 8))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("The centre ring shields you for a few seconds."))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        if let Ok(Event::Key(KeyEvent { code, .. })) = rx.recv() {
            match code {
                KeyCode::Char('1') => return Ok(MenuResult::Start(Level::Easy)),
                KeyCode::Char('2') => return Ok(MenuResult::Start(Level::Medium)),
                KeyCode::Char('3') => return Ok(MenuResult::Start(Level::Hard)),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key.  Each frame we check which keys are
/// still "fresh" (within `HOLD_WINDOW` frames) and apply all their effects
/// simultaneously, so diagonal movement and pulsing work together.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
) -> std::io::Result<bool> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut pulse_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        let dt = frame_start.duration_since(last).as_secs_f32().min(MAX_DT);
        last = frame_start;
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(true);
                        }
                        KeyCode::Char('c')
                            if modifiers.contains(KeyModifiers::CONTROL) =>
                        {
                            return Ok(true);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if state.status == GameStatus::GameOver =>
                        {
                            return Ok(false);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Apply held-key actions every frame ────────────────────────────────
        if state.status == GameStatus::Playing {
            let held = |keys: &[KeyCode]| keys.iter().any(|k| is_held(&key_frame, k, frame));
            let mut dir = Vec2::ZERO;
            if held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]) {
                dir.x -= 1.0;
            }
            if held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]) {
                dir.x += 1.0;
            }
            if held(&[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')]) {
                dir.y -= 1.0;
            }
            if held(&[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')]) {
                dir.y += 1.0;
            }

            *state = move_player(state, dir, dt);
            if held(&[KeyCode::Char('e'), KeyCode::Char('E')]) {
                *state = player_dash(state, dir);
            }
            if held(&[KeyCode::Char('o'), KeyCode::Char('O')]) {
                *state = player_overclock(state);
            }
            if pulse_cooldown == 0 && held(&[KeyCode::Char(' ')]) {
                *state = player_pulse(state);
                pulse_cooldown = PULSE_COOLDOWN;
            }

            *state = tick(state, dt, rng);
        }
        pulse_cooldown = pulse_cooldown.saturating_sub(1);

        let (cols, rows) = terminal::size()?;
        display::render(out, state, &Viewport::fit(&state.arena, cols, rows))?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    let config = args.sim_config();

    if args.headless {
        logging::init(args.verbose, None);
    } else {
        match &args.log_file {
            Some(path) => logging::init(args.verbose, Some(File::create(path)?)),
            None => logging::init_with_default(LevelFilter::Off, None),
        }
    }

    if let Err(e) = config.validate() {
        error!("invalid configuration: {e}");
        eprintln!("byte_wars: {e}");
        std::process::exit(2);
    }

    if args.headless {
        run_headless(&config, args.seconds);
        return Ok(());
    }

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &config);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &SimConfig,
) -> std::io::Result<()> {
    let mut high_score = load_high_score();
    let mut rng = make_rng(config.seed);

    loop {
        match show_menu(out, rx, high_score)? {
            MenuResult::Quit => break,
            MenuResult::Start(level) => {
                info!("starting {level:?} game");
                let mut state = new_game(config, level, high_score);
                let quit = game_loop(out, &mut state, rx, &mut rng)?;

                // Persist new high score if beaten
                if state.score > high_score {
                    high_score = state.score;
                    save_high_score(high_score);
                }

                if quit {
                    break;
                }
            }
        }
    }
    Ok(())
}
