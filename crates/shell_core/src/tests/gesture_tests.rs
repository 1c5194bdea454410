use super::*;

fn feed(classifier: &mut GestureClassifier, events: &[MotionEvent]) -> Vec<TouchOutcome> {
    events
        .iter()
        .map(|ev| classifier.on_touch_event(ev))
        .collect()
}

fn all_events(outcomes: &[TouchOutcome]) -> Vec<GestureEvent> {
    outcomes
        .iter()
        .flat_map(|outcome| outcome.events.iter().copied())
        .collect()
}

fn double_tap_at(base_ms: u64) -> [MotionEvent; 4] {
    [
        MotionEvent::down(10.0, 10.0, base_ms),
        MotionEvent::up(10.0, 10.0, base_ms + 50),
        MotionEvent::down(12.0, 12.0, base_ms + 150),
        MotionEvent::up(12.0, 12.0, base_ms + 200),
    ]
}

#[test]
fn down_is_reported_first_and_consumed() {
    let starts = [
        MotionEvent::down(0.0, 0.0, 0),
        MotionEvent::down(500.0, 900.0, 12_345),
    ];
    for start in starts {
        let mut classifier = GestureClassifier::default();
        let outcome = classifier.on_touch_event(&start);
        assert_eq!(outcome.events.first(), Some(&GestureEvent::PointerDown));
        assert!(outcome.consumed);
    }
}

#[test]
fn down_near_end_of_clock_saturates_deadlines() {
    let mut classifier = GestureClassifier::default();
    let outcome = classifier.on_touch_event(&MotionEvent::down(0.0, 0.0, u64::MAX - 10));
    assert_eq!(outcome.events, vec![GestureEvent::PointerDown]);
    assert!(outcome.consumed);

    assert!(classifier.poll(u64::MAX - 1).is_empty());
    assert_eq!(classifier.poll(u64::MAX), vec![GestureEvent::LongPress]);
}

#[test]
fn quick_tap_is_confirmed_once_double_tap_window_expires() {
    let mut classifier = GestureClassifier::default();
    let outcomes = feed(
        &mut classifier,
        &[MotionEvent::down(5.0, 5.0, 0), MotionEvent::up(6.0, 5.0, 60)],
    );
    assert_eq!(all_events(&outcomes), vec![GestureEvent::PointerDown]);

    assert!(classifier.poll(299).is_empty());
    assert_eq!(classifier.poll(300), vec![GestureEvent::SingleTapConfirmed]);
    assert!(classifier.poll(1_000).is_empty());
}

#[test]
fn tap_held_past_window_confirms_on_release() {
    let mut classifier = GestureClassifier::default();
    classifier.on_touch_event(&MotionEvent::down(0.0, 0.0, 0));
    assert!(classifier.poll(320).is_empty());

    let up = classifier.on_touch_event(&MotionEvent::up(0.0, 0.0, 350));
    assert_eq!(up.events, vec![GestureEvent::SingleTapConfirmed]);
    assert!(up.consumed);
}

#[test]
fn two_close_taps_yield_exactly_one_double_tap() {
    let mut classifier = GestureClassifier::default();
    let outcomes = feed(&mut classifier, &double_tap_at(0));

    assert_eq!(
        outcomes[2].events,
        vec![GestureEvent::PointerDown, GestureEvent::DoubleTap]
    );
    assert!(outcomes[2].consumed);

    let mut events = all_events(&outcomes);
    events.extend(classifier.poll(5_000));
    let double_taps = events
        .iter()
        .filter(|event| **event == GestureEvent::DoubleTap)
        .count();
    assert_eq!(double_taps, 1);
    assert!(!events.contains(&GestureEvent::SingleTapConfirmed));
}

#[test]
fn second_tap_after_window_is_two_single_taps() {
    let mut classifier = GestureClassifier::default();
    let outcomes = feed(
        &mut classifier,
        &[
            MotionEvent::down(10.0, 10.0, 0),
            MotionEvent::up(10.0, 10.0, 50),
            MotionEvent::down(10.0, 10.0, 350),
            MotionEvent::up(10.0, 10.0, 400),
        ],
    );
    // The first tap is confirmed by the second down arriving after its deadline.
    assert_eq!(
        outcomes[2].events,
        vec![GestureEvent::SingleTapConfirmed, GestureEvent::PointerDown]
    );
    assert_eq!(classifier.poll(650), vec![GestureEvent::SingleTapConfirmed]);
    assert!(!all_events(&outcomes).contains(&GestureEvent::DoubleTap));
}

#[test]
fn taps_too_close_in_time_or_too_far_apart_are_not_double_taps() {
    let too_fast = [
        MotionEvent::down(10.0, 10.0, 0),
        MotionEvent::up(10.0, 10.0, 10),
        MotionEvent::down(10.0, 10.0, 30),
        MotionEvent::up(10.0, 10.0, 60),
    ];
    let too_far = [
        MotionEvent::down(10.0, 10.0, 0),
        MotionEvent::up(10.0, 10.0, 50),
        MotionEvent::down(300.0, 300.0, 150),
        MotionEvent::up(300.0, 300.0, 200),
    ];
    for sequence in [too_fast, too_far] {
        let mut classifier = GestureClassifier::default();
        let outcomes = feed(&mut classifier, &sequence);
        assert!(!all_events(&outcomes).contains(&GestureEvent::DoubleTap));
    }
}

#[test]
fn held_contact_becomes_long_press_and_nothing_else() {
    let mut classifier = GestureClassifier::default();
    classifier.on_touch_event(&MotionEvent::down(0.0, 0.0, 0));
    assert!(classifier.poll(499).is_empty());
    assert_eq!(classifier.poll(500), vec![GestureEvent::LongPress]);

    let drag = classifier.on_touch_event(&MotionEvent::moved(80.0, 0.0, 600));
    let up = classifier.on_touch_event(&MotionEvent::up(160.0, 0.0, 620));
    assert!(drag.events.is_empty());
    assert!(up.events.is_empty());
    assert!(classifier.poll(2_000).is_empty());
}

#[test]
fn long_press_deadline_fires_on_late_move_and_is_not_consumed() {
    let mut classifier = GestureClassifier::default();
    classifier.on_touch_event(&MotionEvent::down(0.0, 0.0, 0));

    let outcome = classifier.on_touch_event(&MotionEvent::moved(1.0, 1.0, 600));
    assert_eq!(outcome.events, vec![GestureEvent::LongPress]);
    assert!(!outcome.consumed);
}

#[test]
fn drag_reports_per_step_scroll_distance() {
    let mut classifier = GestureClassifier::default();
    let outcomes = feed(
        &mut classifier,
        &[
            MotionEvent::down(0.0, 0.0, 0),
            MotionEvent::moved(4.0, 0.0, 20),
            MotionEvent::moved(20.0, 5.0, 50),
            MotionEvent::moved(40.0, 5.0, 100),
            MotionEvent::moved(40.5, 5.0, 120),
            MotionEvent::up(40.5, 5.0, 400),
        ],
    );

    // Inside the touch slop: nothing yet.
    assert!(outcomes[1].events.is_empty());
    assert_eq!(
        outcomes[2].events,
        vec![GestureEvent::Scroll { dx: -20.0, dy: -5.0 }]
    );
    assert_eq!(
        outcomes[3].events,
        vec![GestureEvent::Scroll { dx: -20.0, dy: 0.0 }]
    );
    // Sub-pixel steps are accumulated, not reported.
    assert!(outcomes[4].events.is_empty());
    // Slow release: no fling.
    assert!(outcomes[5].events.is_empty());
    assert!(classifier.poll(5_000).is_empty());
}

#[test]
fn fast_release_after_drag_flings() {
    let mut classifier = GestureClassifier::default();
    let outcomes = feed(
        &mut classifier,
        &[
            MotionEvent::down(0.0, 0.0, 0),
            MotionEvent::moved(50.0, 0.0, 10),
            MotionEvent::moved(100.0, 0.0, 20),
            MotionEvent::up(150.0, 0.0, 30),
        ],
    );

    let up = &outcomes[3];
    assert!(up.consumed);
    match up.events.as_slice() {
        [GestureEvent::Fling { vx, vy }] => {
            assert!((*vx - 5_000.0).abs() < 1.0, "vx = {vx}");
            assert_eq!(*vy, 0.0);
        }
        other => panic!("expected a single fling, got {other:?}"),
    }
}

#[test]
fn fling_velocity_is_clamped() {
    let mut classifier = GestureClassifier::default();
    feed(
        &mut classifier,
        &[
            MotionEvent::down(0.0, 0.0, 0),
            MotionEvent::moved(0.0, 500.0, 5),
        ],
    );
    let up = classifier.on_touch_event(&MotionEvent::up(0.0, 1_000.0, 10));
    assert_eq!(up.events, vec![GestureEvent::Fling { vx: 0.0, vy: 8_000.0 }]);
}

#[test]
fn density_scales_touch_slop() {
    let mut classifier = GestureClassifier::new(GestureConfig {
        density: 3.0,
        ..GestureConfig::default()
    });
    classifier.on_touch_event(&MotionEvent::down(0.0, 0.0, 0));
    let within = classifier.on_touch_event(&MotionEvent::moved(20.0, 0.0, 10));
    let beyond = classifier.on_touch_event(&MotionEvent::moved(30.0, 0.0, 20));
    assert!(within.events.is_empty());
    assert_eq!(beyond.events, vec![GestureEvent::Scroll { dx: -30.0, dy: 0.0 }]);
}

#[test]
fn input_without_down_is_dropped_silently() {
    let mut classifier = GestureClassifier::default();
    for ev in [
        MotionEvent::moved(3.0, 3.0, 10),
        MotionEvent::up(3.0, 3.0, 20),
        MotionEvent::new(MotionAction::Cancel, 0.0, 0.0, 30),
    ] {
        let outcome = classifier.on_touch_event(&ev);
        assert!(outcome.events.is_empty());
        assert!(!outcome.consumed);
    }
    assert!(!classifier.is_pointer_down());
}

#[test]
fn secondary_pointers_are_ignored() {
    let mut classifier = GestureClassifier::default();
    classifier.on_touch_event(&MotionEvent::down(0.0, 0.0, 0));
    let outcome =
        classifier.on_touch_event(&MotionEvent::new(MotionAction::PointerDown, 50.0, 50.0, 10));
    assert_eq!(outcome, TouchOutcome::default());
    assert!(classifier.is_pointer_down());
}

#[test]
fn cancel_discards_pending_recognition() {
    let mut classifier = GestureClassifier::default();
    feed(
        &mut classifier,
        &[
            MotionEvent::down(0.0, 0.0, 0),
            MotionEvent::new(MotionAction::Cancel, 0.0, 0.0, 40),
        ],
    );
    assert!(classifier.poll(1_000).is_empty());

    let next = classifier.on_touch_event(&MotionEvent::down(0.0, 0.0, 100));
    assert_eq!(next.events, vec![GestureEvent::PointerDown]);
}

#[test]
fn consumption_classes() {
    assert_eq!(GestureEvent::DoubleTap.consumption(), Consumption::Exclusive);
    assert_eq!(GestureEvent::LongPress.consumption(), Consumption::Observed);
    assert_eq!(GestureEvent::PointerDown.consumption(), Consumption::Handled);
    assert!(GestureEvent::Fling { vx: 1.0, vy: 0.0 }
        .consumption()
        .is_consumed());
    assert!(!Consumption::Observed.is_consumed());
}
