//! Stand-in render thread: applies queued commands to a local view state.

use std::thread::{self, JoinHandle};

use anyhow::Context;
use crossbeam_channel::Receiver;
use render_integration::RenderCommand;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub paused: bool,
    pub render_option: u32,
    pub option_changes: Vec<u32>,
    pub commands: usize,
}

impl RenderStats {
    pub fn apply(&mut self, cmd: RenderCommand) {
        self.commands += 1;
        match cmd {
            RenderCommand::Pause => self.paused = true,
            RenderCommand::Resume => self.paused = false,
            RenderCommand::SetRenderOption(value) => {
                self.render_option = value;
                self.option_changes.push(value);
            }
        }
    }
}

pub fn spawn_render_thread(
    cmd_rx: Receiver<RenderCommand>,
) -> anyhow::Result<JoinHandle<RenderStats>> {
    thread::Builder::new()
        .name("render".into())
        .spawn(move || {
            info!("render worker started");
            let mut stats = RenderStats::default();
            while let Ok(cmd) = cmd_rx.recv() {
                debug!(command = cmd.name(), "render command");
                stats.apply(cmd);
            }
            info!(commands = stats.commands, "render worker stopped");
            stats
        })
        .context("failed to spawn render thread")
}
