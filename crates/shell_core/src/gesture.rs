//! Single-pointer gesture recognition.
//!
//! The classifier consumes raw [`MotionEvent`]s and turns them into discrete
//! [`GestureEvent`]s. Recognition timers (tap confirmation, long press) are
//! deadlines compared against event timestamps, so the classifier never
//! sleeps; the host delivers [`GestureClassifier::poll`] ticks when it wants
//! a deadline honored without further input.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use shared::{
    error::ShellError,
    protocol::{MotionAction, MotionEvent},
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    PointerDown,
    SingleTapConfirmed,
    LongPress,
    DoubleTap,
    /// Per-step scroll distance, `previous - current`.
    Scroll { dx: f32, dy: f32 },
    /// Release velocity in pixels per second.
    Fling { vx: f32, vy: f32 },
}

impl GestureEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GestureEvent::PointerDown => "pointer_down",
            GestureEvent::SingleTapConfirmed => "single_tap_confirmed",
            GestureEvent::LongPress => "long_press",
            GestureEvent::DoubleTap => "double_tap",
            GestureEvent::Scroll { .. } => "scroll",
            GestureEvent::Fling { .. } => "fling",
        }
    }

    pub fn consumption(&self) -> Consumption {
        match self {
            GestureEvent::DoubleTap => Consumption::Exclusive,
            GestureEvent::LongPress => Consumption::Observed,
            GestureEvent::PointerDown
            | GestureEvent::SingleTapConfirmed
            | GestureEvent::Scroll { .. }
            | GestureEvent::Fling { .. } => Consumption::Handled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumption {
    /// Handled by this component alone.
    Exclusive,
    /// Handled; default processing may still run.
    Handled,
    /// Seen but not handled.
    Observed,
}

impl Consumption {
    pub fn is_consumed(self) -> bool {
        self != Consumption::Observed
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchOutcome {
    pub events: Vec<GestureEvent>,
    pub consumed: bool,
}

impl TouchOutcome {
    fn dropped(reason: &'static str) -> Self {
        debug!(error = %ShellError::MalformedGesture(reason), "dropping touch input");
        Self::default()
    }
}

/// Recognition thresholds. Distances are in dp and scaled by `density`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub density: f32,
    pub tap_timeout_ms: u64,
    pub long_press_timeout_ms: u64,
    pub double_tap_timeout_ms: u64,
    pub double_tap_min_time_ms: u64,
    pub touch_slop_dp: f32,
    pub double_tap_slop_dp: f32,
    pub min_fling_velocity_dp: f32,
    pub max_fling_velocity_dp: f32,
    pub velocity_window_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            tap_timeout_ms: 100,
            long_press_timeout_ms: 400,
            double_tap_timeout_ms: 300,
            double_tap_min_time_ms: 40,
            touch_slop_dp: 8.0,
            double_tap_slop_dp: 100.0,
            min_fling_velocity_dp: 50.0,
            max_fling_velocity_dp: 8000.0,
            velocity_window_ms: 100,
        }
    }
}

impl GestureConfig {
    fn touch_slop_square(&self) -> f32 {
        let slop = self.touch_slop_dp * self.density;
        slop * slop
    }

    fn double_tap_slop_square(&self) -> f32 {
        let slop = self.double_tap_slop_dp * self.density;
        slop * slop
    }

    fn min_fling_velocity(&self) -> f32 {
        self.min_fling_velocity_dp * self.density
    }

    fn max_fling_velocity(&self) -> f32 {
        self.max_fling_velocity_dp * self.density
    }

    fn long_press_delay_ms(&self) -> u64 {
        self.tap_timeout_ms.saturating_add(self.long_press_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    x: f32,
    y: f32,
    time_ms: u64,
}

impl From<&MotionEvent> for Sample {
    fn from(ev: &MotionEvent) -> Self {
        Self {
            x: ev.x,
            y: ev.y,
            time_ms: ev.event_time_ms,
        }
    }
}

pub struct GestureClassifier {
    config: GestureConfig,
    still_down: bool,
    current_down: Option<Sample>,
    previous_up: Option<Sample>,
    last_focus: Option<Sample>,
    always_in_tap_region: bool,
    always_in_bigger_tap_region: bool,
    in_long_press: bool,
    is_double_tapping: bool,
    defer_confirm_single_tap: bool,
    tap_deadline: Option<u64>,
    long_press_deadline: Option<u64>,
    velocity_samples: VecDeque<Sample>,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            still_down: false,
            current_down: None,
            previous_up: None,
            last_focus: None,
            always_in_tap_region: false,
            always_in_bigger_tap_region: false,
            in_long_press: false,
            is_double_tapping: false,
            defer_confirm_single_tap: false,
            tap_deadline: None,
            long_press_deadline: None,
            velocity_samples: VecDeque::new(),
        }
    }

    pub fn is_pointer_down(&self) -> bool {
        self.still_down
    }

    pub fn on_touch_event(&mut self, ev: &MotionEvent) -> TouchOutcome {
        match ev.action {
            MotionAction::PointerDown | MotionAction::PointerUp => {
                return TouchOutcome::dropped("multi-pointer input is not supported");
            }
            MotionAction::Move if !self.still_down => {
                return TouchOutcome::dropped("move without preceding down");
            }
            MotionAction::Up if !self.still_down => {
                return TouchOutcome::dropped("up without preceding down");
            }
            MotionAction::Cancel if !self.still_down => {
                return TouchOutcome::dropped("cancel without preceding down");
            }
            _ => {}
        }

        let mut events = Vec::new();
        self.fire_due(ev.event_time_ms, &mut events);

        match ev.action {
            MotionAction::Down => self.handle_down(ev, &mut events),
            MotionAction::Move => self.handle_move(ev, &mut events),
            MotionAction::Up => self.handle_up(ev, &mut events),
            MotionAction::Cancel => self.cancel(),
            MotionAction::PointerDown | MotionAction::PointerUp => {}
        }

        // The platform stops delivering an interaction whose down was not
        // consumed.
        let consumed = ev.action == MotionAction::Down
            || events.iter().any(|event| event.consumption().is_consumed());
        TouchOutcome { events, consumed }
    }

    /// Fires recognition deadlines that have elapsed at `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        self.fire_due(now_ms, &mut events);
        events
    }

    fn fire_due(&mut self, now_ms: u64, events: &mut Vec<GestureEvent>) {
        loop {
            let tap_due = self.tap_deadline.filter(|deadline| *deadline <= now_ms);
            let long_press_due = self
                .long_press_deadline
                .filter(|deadline| *deadline <= now_ms);
            match (tap_due, long_press_due) {
                (Some(tap), Some(long_press)) if long_press < tap => {
                    self.dispatch_long_press(events)
                }
                (Some(_), _) => self.dispatch_tap_timeout(events),
                (None, Some(_)) => self.dispatch_long_press(events),
                (None, None) => break,
            }
        }
    }

    fn dispatch_tap_timeout(&mut self, events: &mut Vec<GestureEvent>) {
        self.tap_deadline = None;
        if self.still_down {
            self.defer_confirm_single_tap = true;
        } else {
            events.push(GestureEvent::SingleTapConfirmed);
        }
    }

    fn dispatch_long_press(&mut self, events: &mut Vec<GestureEvent>) {
        self.long_press_deadline = None;
        self.tap_deadline = None;
        self.defer_confirm_single_tap = false;
        self.in_long_press = true;
        events.push(GestureEvent::LongPress);
    }

    fn handle_down(&mut self, ev: &MotionEvent, events: &mut Vec<GestureEvent>) {
        let sample = Sample::from(ev);
        events.push(GestureEvent::PointerDown);

        let had_tap_pending = self.tap_deadline.take().is_some();
        let double_tap = had_tap_pending
            && match (self.current_down, self.previous_up) {
                (Some(first_down), Some(first_up)) => {
                    self.is_considered_double_tap(first_down, first_up, sample)
                }
                _ => false,
            };
        if double_tap {
            self.is_double_tapping = true;
            events.push(GestureEvent::DoubleTap);
        } else {
            self.tap_deadline = Some(
                sample
                    .time_ms
                    .saturating_add(self.config.double_tap_timeout_ms),
            );
        }

        self.current_down = Some(sample);
        self.last_focus = Some(sample);
        self.still_down = true;
        self.always_in_tap_region = true;
        self.always_in_bigger_tap_region = true;
        self.in_long_press = false;
        self.defer_confirm_single_tap = false;
        self.long_press_deadline = Some(
            sample
                .time_ms
                .saturating_add(self.config.long_press_delay_ms()),
        );
        self.velocity_samples.clear();
        self.velocity_samples.push_back(sample);
    }

    fn handle_move(&mut self, ev: &MotionEvent, events: &mut Vec<GestureEvent>) {
        let sample = Sample::from(ev);
        self.track_velocity(sample);
        if self.in_long_press || self.is_double_tapping {
            return;
        }
        let (Some(down), Some(last)) = (self.current_down, self.last_focus) else {
            return;
        };

        let scroll_x = last.x - sample.x;
        let scroll_y = last.y - sample.y;
        if self.always_in_tap_region {
            let dx = sample.x - down.x;
            let dy = sample.y - down.y;
            let distance_square = dx * dx + dy * dy;
            if distance_square > self.config.touch_slop_square() {
                events.push(GestureEvent::Scroll {
                    dx: scroll_x,
                    dy: scroll_y,
                });
                self.last_focus = Some(sample);
                self.always_in_tap_region = false;
                self.tap_deadline = None;
                self.long_press_deadline = None;
                self.always_in_bigger_tap_region = false;
            }
        } else if scroll_x.abs() >= 1.0 || scroll_y.abs() >= 1.0 {
            events.push(GestureEvent::Scroll {
                dx: scroll_x,
                dy: scroll_y,
            });
            self.last_focus = Some(sample);
        }
    }

    fn handle_up(&mut self, ev: &MotionEvent, events: &mut Vec<GestureEvent>) {
        let sample = Sample::from(ev);
        self.track_velocity(sample);
        self.still_down = false;

        if self.is_double_tapping {
            // The second tap already produced its event.
        } else if self.in_long_press {
            self.tap_deadline = None;
            self.in_long_press = false;
        } else if self.always_in_tap_region {
            if self.defer_confirm_single_tap {
                events.push(GestureEvent::SingleTapConfirmed);
            }
        } else {
            let (vx, vy) = self.release_velocity();
            let min = self.config.min_fling_velocity();
            if vx.abs() > min || vy.abs() > min {
                events.push(GestureEvent::Fling { vx, vy });
            }
        }

        self.previous_up = Some(sample);
        self.is_double_tapping = false;
        self.defer_confirm_single_tap = false;
        self.long_press_deadline = None;
        self.velocity_samples.clear();
    }

    fn cancel(&mut self) {
        self.tap_deadline = None;
        self.long_press_deadline = None;
        self.still_down = false;
        self.is_double_tapping = false;
        self.always_in_tap_region = false;
        self.always_in_bigger_tap_region = false;
        self.defer_confirm_single_tap = false;
        self.in_long_press = false;
        self.velocity_samples.clear();
    }

    fn is_considered_double_tap(
        &self,
        first_down: Sample,
        first_up: Sample,
        second_down: Sample,
    ) -> bool {
        if !self.always_in_bigger_tap_region {
            return false;
        }
        let Some(delta_ms) = second_down.time_ms.checked_sub(first_up.time_ms) else {
            return false;
        };
        if delta_ms > self.config.double_tap_timeout_ms
            || delta_ms < self.config.double_tap_min_time_ms
        {
            return false;
        }
        let dx = first_down.x - second_down.x;
        let dy = first_down.y - second_down.y;
        dx * dx + dy * dy < self.config.double_tap_slop_square()
    }

    fn track_velocity(&mut self, sample: Sample) {
        self.velocity_samples.push_back(sample);
        let horizon = sample.time_ms.saturating_sub(self.config.velocity_window_ms);
        while self
            .velocity_samples
            .front()
            .is_some_and(|oldest| oldest.time_ms < horizon)
        {
            self.velocity_samples.pop_front();
        }
    }

    fn release_velocity(&self) -> (f32, f32) {
        let (Some(oldest), Some(newest)) =
            (self.velocity_samples.front(), self.velocity_samples.back())
        else {
            return (0.0, 0.0);
        };
        let elapsed_ms = newest.time_ms.saturating_sub(oldest.time_ms);
        if elapsed_ms == 0 {
            return (0.0, 0.0);
        }
        let seconds = elapsed_ms as f32 / 1000.0;
        let max = self.config.max_fling_velocity();
        let vx = ((newest.x - oldest.x) / seconds).clamp(-max, max);
        let vy = ((newest.y - oldest.y) / seconds).clamp(-max, max);
        (vx, vy)
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

#[cfg(test)]
#[path = "tests/gesture_tests.rs"]
mod tests;
