mod common;

use std::any::Any;
use std::sync::{Arc, Mutex};

use space_shooter::context::{Canvas, SimContext, Style};
use space_shooter::display::FrameBuffer;
use space_shooter::entities::{EntityKind, InputEvent};
use space_shooter::registry::{Entity, Peers, Registry};

type Log = Arc<Mutex<Vec<String>>>;

/// Records its name on every call and paints one glyph at the origin.
struct Tracer {
    name: &'static str,
    kind: EntityKind,
    glyph: char,
    log: Log,
    counter: u32,
    seen_peer: Option<u32>,
}

impl Tracer {
    fn new(name: &'static str, kind: EntityKind, glyph: char, log: &Log) -> Self {
        Self {
            name,
            kind,
            glyph,
            log: Arc::clone(log),
            counter: 0,
            seen_peer: None,
        }
    }

    fn boxed(name: &'static str, kind: EntityKind, glyph: char, log: &Log) -> Box<dyn Entity> {
        Box::new(Self::new(name, kind, glyph, log))
    }
}

impl Entity for Tracer {
    fn update(&mut self, _ctx: &mut SimContext, peers: &mut Peers<'_>) {
        self.counter += 1;
        // Overlay tracers read the ship tracer's counter
        if self.kind == EntityKind::Overlay {
            self.seen_peer = peers.find::<Tracer>(EntityKind::PlayerShip).map(|p| p.counter);
        }
        self.log.lock().unwrap().push(format!("update {}", self.name));
    }

    fn draw(&self, _ctx: &SimContext, canvas: &mut dyn Canvas) {
        canvas.set_cell(0, 0, self.glyph, Style::default());
        self.log.lock().unwrap().push(format!("draw {}", self.name));
    }

    fn handle_input(&mut self, event: InputEvent, _ctx: &mut SimContext) {
        self.log.lock().unwrap().push(format!("input {} {:?}", self.name, event));
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn updates_and_draws_in_registration_order() {
    let log = Log::default();
    let mut reg = Registry::new();
    reg.add(Tracer::boxed("a", EntityKind::Starfield, 'a', &log));
    reg.add(Tracer::boxed("b", EntityKind::PlayerShip, 'b', &log));
    reg.add(Tracer::boxed("c", EntityKind::Overlay, 'c', &log));

    let mut ctx = common::ctx();
    reg.update_all(&mut ctx);
    let mut frame = FrameBuffer::new(ctx.viewport);
    reg.draw_all(&ctx, &mut frame);

    assert_eq!(
        entries(&log),
        vec!["update a", "update b", "update c", "draw a", "draw b", "draw c"]
    );
    // Last registered paints on top
    assert_eq!(frame.glyph_at(0, 0), Some('c'));
}

#[test]
fn later_entities_see_earlier_updates() {
    let log = Log::default();
    let mut reg = Registry::new();
    reg.add(Tracer::boxed("ship", EntityKind::PlayerShip, 's', &log));
    reg.add(Tracer::boxed("hud", EntityKind::Overlay, 'h', &log));

    let mut ctx = common::ctx();
    reg.update_all(&mut ctx);
    reg.update_all(&mut ctx);

    let hud = reg.find::<Tracer>(EntityKind::Overlay).unwrap();
    assert_eq!(hud.seen_peer, Some(2));
}

#[test]
fn earlier_entities_see_previous_tick() {
    let log = Log::default();
    let mut reg = Registry::new();
    reg.add(Tracer::boxed("hud", EntityKind::Overlay, 'h', &log));
    reg.add(Tracer::boxed("ship", EntityKind::PlayerShip, 's', &log));

    let mut ctx = common::ctx();
    reg.update_all(&mut ctx);
    assert_eq!(reg.find::<Tracer>(EntityKind::Overlay).unwrap().seen_peer, Some(0));
}

#[test]
fn missing_peer_is_none() {
    let log = Log::default();
    let mut reg = Registry::new();
    reg.add(Tracer::boxed("hud", EntityKind::Overlay, 'h', &log));
    let mut ctx = common::ctx();
    reg.update_all(&mut ctx);
    assert_eq!(reg.find::<Tracer>(EntityKind::Overlay).unwrap().seen_peer, None);
    assert!(reg.find_by_kind(EntityKind::Aliens).is_none());
}

#[test]
fn find_by_kind_returns_first_match() {
    let log = Log::default();
    let mut reg = Registry::new();
    reg.add(Tracer::boxed("first", EntityKind::Aliens, '1', &log));
    reg.add(Tracer::boxed("second", EntityKind::Aliens, '2', &log));
    let found = reg.find::<Tracer>(EntityKind::Aliens).unwrap();
    assert_eq!(found.name, "first");
}

#[test]
fn remove_is_by_identity_and_idempotent() {
    let log = Log::default();
    let mut reg = Registry::new();
    let a = reg.add(Tracer::boxed("a", EntityKind::Aliens, 'a', &log));
    let b = reg.add(Tracer::boxed("b", EntityKind::Aliens, 'b', &log));

    assert!(reg.remove(a).is_some());
    assert!(reg.remove(a).is_none());
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.ids().collect::<Vec<_>>(), vec![b]);
    assert_eq!(reg.find::<Tracer>(EntityKind::Aliens).unwrap().name, "b");
}

#[test]
fn add_all_preserves_order_and_remove_all_empties() {
    let log = Log::default();
    let mut reg = Registry::new();
    let ids = reg.add_all(vec![
        Tracer::boxed("a", EntityKind::Starfield, 'a', &log),
        Tracer::boxed("b", EntityKind::Particles, 'b', &log),
    ]);
    assert_eq!(ids.len(), 2);
    let kinds: Vec<EntityKind> = reg.list().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![EntityKind::Starfield, EntityKind::Particles]);

    reg.remove_all();
    assert!(reg.is_empty());
    // Ids are never reused
    let c = reg.add(Tracer::boxed("c", EntityKind::Overlay, 'c', &log));
    assert!(!ids.contains(&c));
}

#[test]
fn input_reaches_every_entity() {
    let log = Log::default();
    let mut reg = Registry::new();
    reg.add(Tracer::boxed("a", EntityKind::PlayerShip, 'a', &log));
    reg.add(Tracer::boxed("b", EntityKind::Overlay, 'b', &log));
    let mut ctx = common::ctx();
    reg.dispatch_input(InputEvent::Fire, &mut ctx);
    assert_eq!(entries(&log), vec!["input a Fire", "input b Fire"]);
}

#[test]
fn peers_exclude_the_updating_entity() {
    struct Counter(usize);
    impl Entity for Counter {
        fn update(&mut self, _ctx: &mut SimContext, peers: &mut Peers<'_>) {
            self.0 = peers.len();
        }
        fn draw(&self, _ctx: &SimContext, _canvas: &mut dyn Canvas) {}
        fn kind(&self) -> EntityKind {
            EntityKind::Particles
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    let mut reg = Registry::new();
    for _ in 0..3 {
        reg.add(Box::new(Counter(usize::MAX)));
    }
    let mut ctx = common::ctx();
    reg.update_all(&mut ctx);
    for e in reg.list() {
        assert_eq!(e.as_any().downcast_ref::<Counter>().unwrap().0, 2);
    }
}
