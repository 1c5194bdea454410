//! Interface to the GPU view and native rendering library that host the session.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

/// Commands sent one-way to the render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RenderCommand {
    Pause,
    Resume,
    SetRenderOption(u32),
}

impl RenderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            RenderCommand::Pause => "pause",
            RenderCommand::Resume => "resume",
            RenderCommand::SetRenderOption(_) => "set_render_option",
        }
    }
}

/// The rendering collaborator as seen from the dispatch thread. Calls are
/// fire-and-forget and must never block.
pub trait RenderSurface {
    fn on_pause(&mut self);
    fn on_resume(&mut self);
    fn set_render_option(&mut self, value: u32);
}

/// Outcome of the most recent enqueue attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Queued,
    QueueFull,
    Disconnected,
}

/// Shared count of commands lost to a full or closed queue. Clones observe
/// the same counter, so a handle stays readable after the surface is boxed.
#[derive(Debug, Clone, Default)]
pub struct DropCounter(Arc<AtomicU64>);

impl DropCounter {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

/// Forwards surface calls to a render thread over a bounded channel.
pub struct ChannelRenderSurface {
    cmd_tx: Sender<RenderCommand>,
    last_status: DeliveryStatus,
    dropped: DropCounter,
}

impl ChannelRenderSurface {
    pub fn new(cmd_tx: Sender<RenderCommand>) -> Self {
        Self {
            cmd_tx,
            last_status: DeliveryStatus::Queued,
            dropped: DropCounter::default(),
        }
    }

    pub fn bounded(capacity: usize) -> (Self, Receiver<RenderCommand>) {
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(capacity);
        (Self::new(cmd_tx), cmd_rx)
    }

    pub fn last_status(&self) -> DeliveryStatus {
        self.last_status
    }

    /// Commands lost to a full or closed queue.
    pub fn dropped(&self) -> u64 {
        self.dropped.get()
    }

    pub fn drop_counter(&self) -> DropCounter {
        self.dropped.clone()
    }

    fn dispatch(&mut self, cmd: RenderCommand) {
        let cmd_name = cmd.name();
        self.last_status = match self.cmd_tx.try_send(cmd) {
            Ok(()) => {
                tracing::debug!(command = cmd_name, "queued render command");
                DeliveryStatus::Queued
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(command = cmd_name, "render command queue is full; dropping");
                DeliveryStatus::QueueFull
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!(
                    command = cmd_name,
                    "render thread disconnected; dropping command"
                );
                DeliveryStatus::Disconnected
            }
        };
        if self.last_status != DeliveryStatus::Queued {
            self.dropped.increment();
        }
    }
}

impl RenderSurface for ChannelRenderSurface {
    fn on_pause(&mut self) {
        self.dispatch(RenderCommand::Pause);
    }

    fn on_resume(&mut self) {
        self.dispatch(RenderCommand::Resume);
    }

    fn set_render_option(&mut self, value: u32) {
        self.dispatch(RenderCommand::SetRenderOption(value));
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
