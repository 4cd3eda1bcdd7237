use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};

use space_shooter::config::Config;
use space_shooter::context::Viewport;
use space_shooter::design::Catalog;
use space_shooter::display::FrameBuffer;
use space_shooter::entities::InputEvent;
use space_shooter::session::{Control, Session};

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// Min frames between movement steps while a direction key is held.
const MOVE_COOLDOWN: u32 = 3;

/// A key counts as held if its last press/repeat arrived within this many
/// frames.  Covers terminals that never send release events.
const HOLD_WINDOW: u64 = 4;

fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── Command line ──────────────────────────────────────────────────────────────

struct Args {
    config: Option<PathBuf>,
    designs: Option<PathBuf>,
    seed: Option<u64>,
    log: Option<PathBuf>,
}

fn usage() -> String {
    "usage: space_shooter [--config FILE] [--designs FILE] [--seed N] [--log FILE]".to_string()
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config: None,
        designs: None,
        seed: None,
        log: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let mut value = || it.next().ok_or_else(|| format!("{} needs a value\n{}", flag, usage()));
        match flag.as_str() {
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "--designs" => args.designs = Some(PathBuf::from(value()?)),
            "--seed" => {
                let raw = value()?;
                args.seed = Some(raw.parse().map_err(|_| format!("invalid seed '{}'", raw))?);
            }
            "--log" => args.log = Some(PathBuf::from(value()?)),
            "-h" | "--help" => return Err(usage()),
            other => return Err(format!("unknown argument '{}'\n{}", other, usage())),
        }
    }
    Ok(args)
}

/// Log records go to a file, never to the terminal the game is drawn on.
fn init_logging(path: Option<&PathBuf>) -> std::io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Input translation ─────────────────────────────────────────────────────────

/// Tracks held keys across frames and turns them into `InputEvent`s.
///
/// Held-key model: every press/repeat stamps the key with the current frame;
/// each frame, keys stamped within `HOLD_WINDOW` are live.  Release events
/// (keyboard-enhancement terminals) drop the key immediately.  One-shot keys
/// fire on press only.
#[derive(Default)]
struct InputState {
    key_frame: HashMap<KeyCode, u64>,
    move_cooldown: u32,
}

impl InputState {
    fn on_key(&mut self, key: KeyEvent, frame: u64, events: &mut Vec<InputEvent>) {
        let KeyEvent {
            code,
            kind,
            modifiers,
            ..
        } = key;
        match kind {
            KeyEventKind::Press => {
                self.key_frame.insert(code, frame);
                match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        events.push(InputEvent::Quit)
                    }
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        events.push(InputEvent::Quit)
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => events.push(InputEvent::Restart),
                    KeyCode::Char('p') | KeyCode::Char('P') => events.push(InputEvent::Pause),
                    KeyCode::Char('e') | KeyCode::Char('E') => events.push(InputEvent::Reload),
                    _ => {}
                }
            }
            KeyEventKind::Repeat => {
                self.key_frame.insert(code, frame);
            }
            KeyEventKind::Release => {
                self.key_frame.remove(&code);
            }
        }
    }

    /// Continuous actions for this frame.  Fire is sent every frame while
    /// held; the gun's own cooldown does the throttling.
    fn held_actions(&mut self, frame: u64, events: &mut Vec<InputEvent>) {
        let kf = &self.key_frame;
        let left = any_held(kf, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame);
        let right = any_held(kf, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame);
        let up = any_held(kf, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')], frame);
        let down = any_held(kf, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')], frame);
        let fire = is_held(kf, &KeyCode::Char(' '), frame);

        if self.move_cooldown == 0 {
            let before = events.len();
            if left {
                events.push(InputEvent::Left);
            } else if right {
                events.push(InputEvent::Right);
            }
            if up {
                events.push(InputEvent::Up);
            } else if down {
                events.push(InputEvent::Down);
            }
            if events.len() > before {
                self.move_cooldown = MOVE_COOLDOWN;
            }
        }
        self.move_cooldown = self.move_cooldown.saturating_sub(1);

        if fire {
            events.push(InputEvent::Fire);
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

fn game_loop<W: Write>(
    out: &mut W,
    session: &mut Session,
    rx: &mpsc::Receiver<Event>,
) -> Result<(), Box<dyn std::error::Error>> {
    let interval = session.config().tick_interval();
    let mut frame_buf = FrameBuffer::new(session.ctx().viewport);
    let mut input = InputState::default();
    let mut events = Vec::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain pending terminal events (non-blocking) ──────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(key) => input.on_key(key, frame, &mut events),
                Event::Resize(w, h) => {
                    let vp = Viewport::new(w, h);
                    log::debug!("resize to {}x{}", w, h);
                    session.resize(vp);
                    frame_buf.resize(vp);
                }
                _ => {}
            }
        }
        input.held_actions(frame, &mut events);

        for event in events.drain(..) {
            if session.handle_input(event)? == Control::Quit {
                return Ok(());
            }
        }

        session.tick(interval, &mut frame_buf);
        frame_buf.present(out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    if let Err(e) = run() {
        eprintln!("space_shooter: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args()?;
    init_logging(args.log.as_ref())?;

    // Everything that can fail on bad input happens before raw mode
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let catalog = match &args.designs {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };
    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });

    let (width, height) = terminal::size()?;
    let mut session = Session::new(catalog, config, Viewport::new(width, height), seed)?;

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ask for release/repeat events; unsupported terminals just say no
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread so the loop never waits on I/O
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let result = game_loop(&mut out, &mut session, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    log::info!(
        "exit: score {}, level {}, {} ticks",
        session.ctx().progression.score(),
        session.ctx().progression.level(),
        session.ticks()
    );
    result
}
