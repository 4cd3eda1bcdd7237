use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use space_shooter::progression::*;

#[test]
fn starts_at_level_one() {
    let p = Progression::new(100);
    assert_eq!((p.score(), p.kills(), p.level()), (0, 0, 1));
}

#[test]
fn thresholds_are_triangular() {
    let p = Progression::new(100);
    assert_eq!(p.threshold(1), 0);
    assert_eq!(p.threshold(2), 100);
    assert_eq!(p.threshold(3), 300);
    assert_eq!(p.threshold(4), 600);
    assert_eq!(p.level_for(99), 1);
    assert_eq!(p.level_for(100), 2);
    assert_eq!(p.level_for(599), 3);
}

#[test]
fn add_points_reports_level_change_only_when_crossed() {
    let mut p = Progression::new(100);
    assert_eq!(p.add_points(50), None);
    assert_eq!(p.add_points(50), Some(2));
    assert_eq!(p.add_points(10), None);
}

#[test]
fn record_kill_counts() {
    let mut p = Progression::new(100);
    p.record_kill(10);
    p.record_kill(15);
    assert_eq!(p.kills(), 2);
    assert_eq!(p.score(), 25);
}

#[test]
fn callbacks_fire_once_per_level_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut p = Progression::new(100);
    let sink = Arc::clone(&seen);
    p.subscribe(Box::new(move |level| sink.lock().unwrap().push(level)));

    // One big jump crosses levels 2, 3 and 4
    assert_eq!(p.add_points(650), Some(4));
    p.add_points(10);
    assert_eq!(*seen.lock().unwrap(), vec![2, 3, 4]);
}

#[test]
fn every_subscriber_is_notified() {
    let mut p = Progression::new(100);
    let a = LevelWatch::subscribe(&mut p);
    let b = LevelWatch::subscribe(&mut p);
    p.add_points(300);
    assert_eq!(a.get(), 3);
    assert_eq!(b.get(), 3);
}

#[test]
fn force_level_up_tops_score_to_threshold() {
    let mut p = Progression::new(100);
    p.add_points(40);
    assert_eq!(p.force_level_up(), 2);
    assert_eq!(p.score(), 100);
    assert_eq!(p.force_level_up(), 3);
    assert_eq!(p.score(), 300);
    assert_eq!(p.kills(), 0);
}

#[test]
fn watch_seeded_with_current_level() {
    let mut p = Progression::new(100);
    p.add_points(100);
    let watch = LevelWatch::subscribe(&mut p);
    assert_eq!(watch.get(), 2);
}

#[test]
fn watch_never_goes_backwards() {
    let watch = LevelWatch::default();
    watch.set(5);
    watch.set(3);
    assert_eq!(watch.get(), 5);
}

#[test]
fn zero_points_per_level_is_clamped() {
    let mut p = Progression::new(0);
    p.add_points(1);
    assert_eq!(p.level(), 2);
}

proptest! {
    #[test]
    fn level_is_monotonic_in_score(awards in prop::collection::vec(0u32..500, 1..40)) {
        let mut p = Progression::new(DEFAULT_POINTS_PER_LEVEL);
        let mut last = p.level();
        for points in awards {
            p.add_points(points);
            prop_assert!(p.level() >= last);
            prop_assert_eq!(p.level(), p.level_for(p.score()));
            last = p.level();
        }
    }

    #[test]
    fn callbacks_match_levels_gained(awards in prop::collection::vec(0u32..800, 1..20)) {
        let count = Arc::new(Mutex::new(0u32));
        let mut p = Progression::new(DEFAULT_POINTS_PER_LEVEL);
        let sink = Arc::clone(&count);
        p.subscribe(Box::new(move |_| *sink.lock().unwrap() += 1));
        for points in awards {
            p.add_points(points);
        }
        prop_assert_eq!(*count.lock().unwrap(), p.level() - 1);
    }
}
