//! Session controller: owns the permission gate, gesture classifier and
//! option cycler, and relays lifecycle transitions to the render surface.

use render_integration::RenderSurface;
use shared::{
    domain::{Capability, SessionState},
    error::ShellError,
    protocol::{MotionEvent, PermissionRequestResult, SessionEvent},
};
use tracing::{debug, error, info};

use crate::{
    config::ShellSettings,
    gesture::{GestureClassifier, GestureEvent},
    option::OptionCycler,
    permission::{Decision, PermissionGate, PermissionPlatform, PermissionSet},
};

pub const DEFAULT_NOTICE_TEXT: &str = "This app needs camera permission.";

/// The window hosting the view.
pub trait ActivityHost {
    /// Short-lived, non-blocking notice.
    fn show_notice(&mut self, text: &str);
    fn finish(&mut self);
    /// Fallback for permission results that belong to another request.
    fn forward_permission_result(&mut self, result: &PermissionRequestResult);
    fn show_rationale(&mut self, _capabilities: &[Capability]) {}
}

pub struct LifecycleController {
    state: SessionState,
    gate: PermissionGate,
    classifier: GestureClassifier,
    cycler: OptionCycler,
    surface: Box<dyn RenderSurface>,
    platform: Box<dyn PermissionPlatform>,
    host: Box<dyn ActivityHost>,
    notice_text: String,
}

impl LifecycleController {
    pub fn new(
        gate: PermissionGate,
        classifier: GestureClassifier,
        cycler: OptionCycler,
        surface: Box<dyn RenderSurface>,
        platform: Box<dyn PermissionPlatform>,
        host: Box<dyn ActivityHost>,
    ) -> Self {
        Self {
            state: SessionState::Active,
            gate,
            classifier,
            cycler,
            surface,
            platform,
            host,
            notice_text: DEFAULT_NOTICE_TEXT.to_string(),
        }
    }

    pub fn from_settings(
        settings: &ShellSettings,
        surface: Box<dyn RenderSurface>,
        platform: Box<dyn PermissionPlatform>,
        host: Box<dyn ActivityHost>,
    ) -> Result<Self, ShellError> {
        let required = PermissionSet::new(settings.required_capabilities())?;
        let gate = PermissionGate::new(required, settings.request_code());
        let cycler = OptionCycler::new(settings.render_option_count)?;
        let classifier = GestureClassifier::new(settings.gesture.clone());
        Ok(Self::new(gate, classifier, cycler, surface, platform, host)
            .with_notice_text(settings.notice_text.clone()))
    }

    pub fn with_notice_text(mut self, text: impl Into<String>) -> Self {
        self.notice_text = text.into();
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn render_option(&self) -> u32 {
        self.cycler.current()
    }

    /// Checks the required capabilities and requests whatever is missing.
    pub fn on_create(&mut self) {
        if self.state.is_terminated() {
            return;
        }
        if self.gate.all_granted(self.platform.as_ref()) {
            info!("all required permissions granted");
            return;
        }
        if self.gate.should_explain_rationale(self.platform.as_ref()) {
            info!("permission rationale advised before requesting");
            self.host.show_rationale(self.gate.required().as_slice());
        }
        let requested = self.gate.request_missing(self.platform.as_mut());
        if !requested.is_empty() {
            self.state = SessionState::AwaitingPermission;
        }
    }

    pub fn on_pause(&mut self) {
        if self.state.is_terminated() {
            return;
        }
        info!("session paused");
        self.surface.on_pause();
    }

    pub fn on_resume(&mut self) {
        if self.state.is_terminated() {
            return;
        }
        info!("session resumed");
        self.surface.on_resume();
    }

    /// Returns whether the touch was consumed.
    pub fn on_touch_event(&mut self, ev: &MotionEvent) -> bool {
        if self.state.is_terminated() {
            return false;
        }
        let outcome = self.classifier.on_touch_event(ev);
        self.apply_gestures(&outcome.events);
        outcome.consumed
    }

    pub fn on_tick(&mut self, now_ms: u64) {
        if self.state.is_terminated() {
            return;
        }
        let events = self.classifier.poll(now_ms);
        self.apply_gestures(&events);
    }

    /// Returns `None` once the session is terminated; late results are
    /// swallowed rather than forwarded.
    pub fn on_request_permissions_result(
        &mut self,
        result: &PermissionRequestResult,
    ) -> Option<Decision> {
        if self.state.is_terminated() {
            debug!(
                request_code = result.request_code.0,
                "permission result after termination discarded"
            );
            return None;
        }
        let decision = self.gate.handle_request_result(result);
        match decision.clone().into_result(result.request_code) {
            Ok(()) => {
                if self.state == SessionState::AwaitingPermission {
                    info!("required permissions granted");
                    self.state = SessionState::Active;
                }
            }
            Err(err) if err.is_fatal() => self.terminate(err),
            Err(err) => {
                debug!(error = %err, "delegating permission result");
                self.host.forward_permission_result(result);
            }
        }
        Some(decision)
    }

    /// Routes one queued message. Returns true only for a consumed touch.
    pub fn dispatch(&mut self, event: &SessionEvent) -> bool {
        match event {
            SessionEvent::Create => self.on_create(),
            SessionEvent::Pause => self.on_pause(),
            SessionEvent::Resume => self.on_resume(),
            SessionEvent::Touch(ev) => return self.on_touch_event(ev),
            SessionEvent::Tick { now_ms } => self.on_tick(*now_ms),
            SessionEvent::PermissionResult(result) => {
                self.on_request_permissions_result(result);
            }
            SessionEvent::Destroy => debug!("destroy delivered to controller"),
        }
        false
    }

    fn apply_gestures(&mut self, events: &[GestureEvent]) {
        for event in events {
            match event {
                GestureEvent::DoubleTap => {
                    let value = self.cycler.advance();
                    info!(render_option = value, "double tap: cycling render option");
                    self.surface.set_render_option(value);
                }
                GestureEvent::Scroll { dx, dy } => {
                    debug!(gesture = event.name(), dx, dy, "gesture");
                }
                GestureEvent::Fling { vx, vy } => {
                    debug!(gesture = event.name(), vx, vy, "gesture");
                }
                GestureEvent::PointerDown
                | GestureEvent::SingleTapConfirmed
                | GestureEvent::LongPress => debug!(gesture = event.name(), "gesture"),
            }
        }
    }

    fn terminate(&mut self, err: ShellError) {
        error!(error = %err, "terminating session");
        self.state = SessionState::Terminated;
        self.host.show_notice(&self.notice_text);
        self.host.finish();
    }
}

#[cfg(test)]
#[path = "tests/lifecycle_tests.rs"]
mod tests;
