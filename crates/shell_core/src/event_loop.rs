//! Serial dispatch of queued session messages into the controller.

use crossbeam_channel::Receiver;
use serde::Serialize;
use shared::{domain::SessionState, protocol::SessionEvent};
use tracing::info;

use crate::lifecycle::LifecycleController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Destroyed,
    Terminated,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoopExit {
    pub reason: StopReason,
    pub state: SessionState,
    pub processed: usize,
}

/// Runs until the session is destroyed or terminated, or every sender is gone.
pub fn run(controller: &mut LifecycleController, events: &Receiver<SessionEvent>) -> LoopExit {
    run_with_callbacks(controller, &crossbeam_channel::never(), events)
}

/// Like [`run`], but anything already waiting on `callbacks` (platform
/// results posted while a previous event was dispatched) is delivered before
/// the next input event.
pub fn run_with_callbacks(
    controller: &mut LifecycleController,
    callbacks: &Receiver<SessionEvent>,
    events: &Receiver<SessionEvent>,
) -> LoopExit {
    let mut processed = 0;
    let reason = loop {
        let event = match callbacks.try_recv() {
            Ok(event) => event,
            Err(_) => match events.recv() {
                Ok(event) => event,
                Err(_) => break StopReason::Disconnected,
            },
        };
        if event == SessionEvent::Destroy {
            break StopReason::Destroyed;
        }
        controller.dispatch(&event);
        processed += 1;
        if controller.state().is_terminated() {
            break StopReason::Terminated;
        }
    };
    info!(?reason, processed, "session event loop stopped");
    LoopExit {
        reason,
        state: controller.state(),
        processed,
    }
}
