mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::Harness;
use idlewatch::{ActiveDetector, ActivityState};

const UNIT: u64 = 1000;

fn started(h: &Harness, period_count: u32, immediate: bool) -> ActiveDetector {
    let active = ActiveDetector::new(&h.host);
    active
        .add_default_interaction_surface()
        .configure_timeout(period_count, UNIT)
        .immediately(immediate)
        .on_fire(h.counter())
        .start()
        .unwrap();
    active
}

#[test]
fn deferred_fires_at_period_boundary() {
    let h = Harness::new();
    let _active = started(&h, 1, false);

    h.at(500);
    h.click();
    assert_eq!(h.fired(), 0);
    h.at(999);
    assert_eq!(h.fired(), 0);
    h.at(1100);
    assert_eq!(h.fired(), 1);
}

#[test]
fn deferred_with_longer_timeout() {
    let h = Harness::new();
    let _active = started(&h, 2, false);

    h.at(500);
    h.click();
    h.at(1100);
    assert_eq!(h.fired(), 0);
    h.at(2100);
    assert_eq!(h.fired(), 1);
}

#[test]
fn quiet_surface_never_fires() {
    let h = Harness::new();
    let _active = started(&h, 1, false);

    h.at(5000);
    assert_eq!(h.fired(), 0);
}

#[test]
fn many_interactions_in_one_period_fire_once() {
    let h = Harness::new();
    let _active = started(&h, 1, false);

    for t in [100, 200, 300, 900] {
        h.at(t);
        h.click();
    }
    h.at(1900);
    assert_eq!(h.fired(), 1);
}

#[test]
fn keeps_firing_after_quiet_spell() {
    let h = Harness::new();
    let _active = started(&h, 1, false);

    h.at(500);
    h.click();
    h.at(2500);
    h.click();
    h.at(3200);
    assert_eq!(h.fired(), 2);
}

#[test]
fn immediate_fires_in_the_same_turn() {
    let h = Harness::new();
    let active = started(&h, 2, true);
    assert!(active.is_immediate());

    h.at(500);
    h.click();
    assert_eq!(h.fired(), 1);
}

#[test]
fn immediate_fires_once_per_edge() {
    let h = Harness::new();
    let _active = started(&h, 1, true);

    h.at(500);
    h.click();
    h.click();
    h.at(1100);
    assert_eq!(h.fired(), 1);

    // The boundary at 1000 cleared the flag, so a new edge fires again.
    h.click();
    assert_eq!(h.fired(), 2);
}

#[test]
fn immediate_stays_silent_without_interaction() {
    let h = Harness::new();
    let _active = started(&h, 1, true);

    h.at(3000);
    assert_eq!(h.fired(), 0);
}

#[test]
fn broadcasts_active() {
    let h = Harness::new();
    let active = started(&h, 1, true);
    let mut rx = active.subscribe();

    h.click();

    assert_eq!(rx.try_recv().unwrap(), ActivityState::Active);
}

#[test]
fn callback_may_stop_its_detector() {
    let h = Harness::new();
    let active = ActiveDetector::new(&h.host);
    let calls = Rc::new(Cell::new(0));
    let handle = active.clone();
    let c = calls.clone();
    active
        .add_default_interaction_surface()
        .configure_timeout(1, UNIT)
        .immediately(true)
        .on_fire(move || {
            c.set(c.get() + 1);
            handle.stop();
        })
        .start()
        .unwrap();

    h.click();
    h.at(1500);
    h.click();

    assert_eq!(calls.get(), 1);
    assert_eq!(h.document.listener_count("click"), 0);
}

#[test]
fn deferred_interaction_right_after_boundary_counts_toward_next_period() {
    let h = Harness::new();
    let _active = started(&h, 1, false);

    h.at(1000);
    h.click();
    assert_eq!(h.fired(), 0);
    h.at(1999);
    assert_eq!(h.fired(), 0);
    h.at(2000);
    assert_eq!(h.fired(), 1);
    h.at(3000);
    assert_eq!(h.fired(), 1);
}

#[test]
fn deferred_interaction_just_before_boundary_fires_at_that_boundary() {
    let h = Harness::new();
    h.schedule_click(1000);
    let _active = started(&h, 1, false);

    h.at(1000);
    assert_eq!(h.fired(), 1);
    h.at(3000);
    assert_eq!(h.fired(), 1);
}

#[test]
fn immediate_interaction_right_after_boundary_fires_once() {
    let h = Harness::new();
    let _active = started(&h, 1, true);

    h.at(1000);
    h.click();
    assert_eq!(h.fired(), 1);
    h.at(3000);
    assert_eq!(h.fired(), 1);
}

#[test]
fn immediate_interaction_just_before_boundary_fires_once() {
    let h = Harness::new();
    h.schedule_click(1000);
    let _active = started(&h, 1, true);

    h.at(1000);
    assert_eq!(h.fired(), 1);
    h.at(3000);
    assert_eq!(h.fired(), 1);
}
