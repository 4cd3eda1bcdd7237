mod common;

use space_shooter::config::Config;
use space_shooter::design::DesignKind;
use space_shooter::context::{SessionStatus, SimContext, Viewport};
use space_shooter::display::FrameBuffer;
use space_shooter::entities::{EntityKind, InputEvent};
use space_shooter::overlay::UiOverlay;
use space_shooter::player::PlayerShip;
use space_shooter::producers::{AlienProducer, ParticleSystem};
use space_shooter::session::{Control, Session};

use common::{catalog, quiet_config, viewport, SEED, TICK};

fn session(config: Config) -> Session {
    Session::new(catalog(), config, viewport(), SEED).unwrap()
}

fn kinds(s: &Session) -> Vec<EntityKind> {
    s.registry().list().map(|e| e.kind()).collect()
}

fn wreck_ship(s: &mut Session) {
    let reg = s.registry_mut();
    let at = reg.find::<PlayerShip>(EntityKind::PlayerShip).unwrap().body().pos;
    // Borrow the context separately from the registry
    let mut ctx = SimContext::headless(viewport(), SEED);
    reg.find_mut::<PlayerShip>(EntityKind::PlayerShip)
        .unwrap()
        .take_hit(10_000, at, &mut ctx);
}

#[test]
fn registration_order_is_fixed() {
    let s = session(quiet_config());
    assert_eq!(
        kinds(&s),
        vec![
            EntityKind::Starfield,
            EntityKind::PlayerShip,
            EntityKind::Aliens,
            EntityKind::Boss,
            EntityKind::Asteroids,
            EntityKind::HealthPacks,
            EntityKind::Modifiers,
            EntityKind::Particles,
            EntityKind::Overlay,
        ]
    );
}

#[test]
fn disabled_producers_are_not_registered() {
    let s = session(Config {
        enable_boss: false,
        enable_asteroids: false,
        enable_health_packs: false,
        enable_modifiers: false,
        enable_stars: false,
        ..quiet_config()
    });
    assert_eq!(
        kinds(&s),
        vec![
            EntityKind::PlayerShip,
            EntityKind::Aliens,
            EntityKind::Particles,
            EntityKind::Overlay,
        ]
    );
}

#[test]
fn tick_advances_clock_and_draws() {
    let mut s = session(quiet_config());
    let mut frame = FrameBuffer::new(viewport());
    s.tick(TICK, &mut frame);
    s.tick(TICK, &mut frame);
    assert_eq!(s.ticks(), 2);
    assert_eq!(s.ctx().elapsed, TICK * 2);
    assert!(frame.row_text(0).contains("LEVEL 1"));
    // Effects never leak into the next tick
    assert!(s.ctx().pending_effects().is_empty());
}

#[test]
fn hud_reads_ship_state() {
    let mut s = session(quiet_config());
    let mut frame = FrameBuffer::new(viewport());
    s.tick(TICK, &mut frame);
    let hud = s.registry().find::<UiOverlay>(EntityKind::Overlay).unwrap();
    let readout = hud.readout();
    assert_eq!(readout.hull, 100);
    assert_eq!(readout.ammo.unwrap().capacity, 10);
}

#[test]
fn pause_freezes_the_simulation() {
    let mut s = session(quiet_config());
    let mut frame = FrameBuffer::new(viewport());
    s.tick(TICK, &mut frame);

    assert_eq!(s.handle_input(InputEvent::Pause).unwrap(), Control::Continue);
    assert_eq!(s.status(), SessionStatus::Paused);
    let elapsed = s.ctx().elapsed;
    s.tick(TICK, &mut frame);
    assert_eq!(s.ctx().elapsed, elapsed);
    assert_eq!(s.ticks(), 1);
    assert!((0..viewport().height as i32).any(|y| frame.row_text(y).contains("PAUSED")));

    // Ship input is ignored while paused
    let x = s.registry().find::<PlayerShip>(EntityKind::PlayerShip).unwrap().body().pos.x;
    s.handle_input(InputEvent::Left).unwrap();
    let after = s.registry().find::<PlayerShip>(EntityKind::PlayerShip).unwrap().body().pos.x;
    assert_eq!(x, after);

    s.handle_input(InputEvent::Pause).unwrap();
    assert_eq!(s.status(), SessionStatus::Playing);
}

#[test]
fn movement_input_reaches_the_ship() {
    let mut s = session(quiet_config());
    let x = s.registry().find::<PlayerShip>(EntityKind::PlayerShip).unwrap().body().pos.x;
    s.handle_input(InputEvent::Right).unwrap();
    let after = s.registry().find::<PlayerShip>(EntityKind::PlayerShip).unwrap().body().pos.x;
    assert!(after > x);
}

#[test]
fn quit_is_reported() {
    let mut s = session(quiet_config());
    assert_eq!(s.handle_input(InputEvent::Quit).unwrap(), Control::Quit);
}

#[test]
fn restart_while_playing_resets() {
    let mut s = session(quiet_config());
    s.ctx_mut().progression.add_points(150);
    s.handle_input(InputEvent::Restart).unwrap();
    assert_eq!(s.ctx().progression.score(), 0);
    assert_eq!(s.status(), SessionStatus::Playing);
}

#[test]
fn restart_while_paused_resumes_play() {
    let mut s = session(quiet_config());
    s.handle_input(InputEvent::Pause).unwrap();
    s.handle_input(InputEvent::Restart).unwrap();
    assert_eq!(s.status(), SessionStatus::Playing);
    assert_eq!(kinds(&s).len(), 9);
}

#[test]
fn restart_after_game_over() {
    let mut s = session(quiet_config());
    let mut frame = FrameBuffer::new(viewport());
    s.ctx_mut().progression.add_points(150);

    wreck_ship(&mut s);
    s.tick(TICK, &mut frame);
    assert_eq!(s.status(), SessionStatus::GameOver);
    assert!((0..viewport().height as i32).any(|y| frame.row_text(y).contains("GAME  OVER")));

    // Game over freezes the clock
    let elapsed = s.ctx().elapsed;
    s.tick(TICK, &mut frame);
    assert_eq!(s.ctx().elapsed, elapsed);

    s.handle_input(InputEvent::Restart).unwrap();
    assert_eq!(s.status(), SessionStatus::Playing);
    assert_eq!(s.ctx().progression.score(), 0);
    assert_eq!(s.ctx().progression.level(), 1);
    assert_eq!(kinds(&s).len(), 9);
    let ship = s.registry().find::<PlayerShip>(EntityKind::PlayerShip).unwrap();
    assert_eq!(ship.health().current(), ship.health().max());
}

#[test]
fn restart_cancels_pending_reloads() {
    let mut s = session(quiet_config());
    for _ in 0..3 {
        s.handle_input(InputEvent::Fire).unwrap();
        s.ctx_mut().advance_clock(std::time::Duration::from_millis(200));
    }
    s.handle_input(InputEvent::Reload).unwrap();
    assert!(s
        .registry()
        .find::<PlayerShip>(EntityKind::PlayerShip)
        .unwrap()
        .gun()
        .is_reloading());

    s.restart().unwrap();
    let gun = s.registry().find::<PlayerShip>(EntityKind::PlayerShip).unwrap().gun();
    assert!(!gun.is_reloading());
    assert_eq!(gun.loaded(), gun.ammo().capacity);
}

#[test]
fn pause_holds_pending_reloads() {
    let mut s = session(quiet_config());
    s.handle_input(InputEvent::Fire).unwrap();
    s.handle_input(InputEvent::Reload).unwrap();
    s.handle_input(InputEvent::Pause).unwrap();

    let gun = s.registry().find::<PlayerShip>(EntityKind::PlayerShip).unwrap().gun();
    assert!(gun.is_reload_suspended());
    // Default reload is 1500 ms; sleeping past it must not refill
    std::thread::sleep(std::time::Duration::from_millis(1700));
    assert!(gun.is_reloading());
    assert_eq!(gun.loaded(), gun.ammo().capacity - 1);

    s.handle_input(InputEvent::Pause).unwrap();
    let gun = s.registry().find::<PlayerShip>(EntityKind::PlayerShip).unwrap().gun();
    assert!(!gun.is_reload_suspended());
    assert!(gun.is_reloading());
}

#[test]
fn fire_cue_follows_session_volume() {
    let (mut ctx, audio) = common::recording_ctx();
    ctx.volume = 0.3;
    let mut reg = space_shooter::registry::Registry::new();
    let ship = PlayerShip::new(catalog().design(DesignKind::Player).unwrap(), &mut ctx).unwrap();
    reg.add(Box::new(ship));
    reg.dispatch_input(InputEvent::Fire, &mut ctx);
    assert_eq!(audio.volumes(space_shooter::audio::cue::FIRE), vec![0.3]);
}

#[test]
fn hint_line_keeps_clear_of_a_long_ammo_bar() {
    let mut s = session(quiet_config());
    let limits = s.config().gun_limits();
    s.registry()
        .find::<PlayerShip>(EntityKind::PlayerShip)
        .unwrap()
        .gun()
        .upgrade_capacity(100, &limits);
    let mut frame = FrameBuffer::new(viewport());
    s.tick(TICK, &mut frame);

    let ammo = format!("Ammo {}{}", "|".repeat(10), ".".repeat(20));
    let footer = frame.row_text(viewport().height as i32 - 1);
    assert!(footer.contains(&ammo), "{footer}");
}

#[test]
fn level_ups_reach_producers_registered_after_restart() {
    let mut s = session(quiet_config());
    s.restart().unwrap();
    s.ctx_mut().progression.add_points(300);
    let mut frame = FrameBuffer::new(viewport());
    s.tick(TICK, &mut frame);
    let aliens = s
        .registry()
        .find::<AlienProducer>(EntityKind::Aliens)
        .unwrap();
    assert_eq!(aliens.level(), 3);
}

#[test]
fn draw_before_update_still_ticks() {
    let mut s = session(Config {
        draw_before_update: true,
        ..quiet_config()
    });
    let mut frame = FrameBuffer::new(viewport());
    s.tick(TICK, &mut frame);
    assert_eq!(s.ticks(), 1);
    assert!(frame.row_text(0).contains("Score"));
    assert!(s.registry().find::<ParticleSystem>(EntityKind::Particles).is_some());
}

#[test]
fn resize_updates_viewport() {
    let mut s = session(quiet_config());
    let vp = Viewport::new(120, 40);
    s.resize(vp);
    assert_eq!(s.ctx().viewport, vp);
}
