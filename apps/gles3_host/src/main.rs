use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    process::ExitCode,
    rc::Rc,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use render_integration::ChannelRenderSurface;
use serde::Serialize;
use shared::protocol::SessionEvent;
use shell_core::{
    config::load_settings_from,
    event_loop::{self, LoopExit},
    load_settings, LifecycleController, ShellSettings,
};
use tracing_subscriber::fmt::MakeWriter;

mod platform;
mod render_worker;
mod script;

use platform::{ConsoleHost, HostReport, ScriptedPlatform};
use render_worker::{spawn_render_thread, RenderStats};
use script::SessionScript;

#[derive(Parser, Debug)]
#[command(about = "Replays a recorded touch/lifecycle session against the GLES3 view shell")]
struct Args {
    /// JSON session script.
    #[arg(long)]
    script: PathBuf,
    /// Settings file; defaults to ./shell.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    log_filter: Option<String>,
}

#[derive(Debug, Serialize)]
struct SessionSummary {
    exit: LoopExit,
    render: RenderStats,
    /// Commands the render queue refused; each leaves the view behind the session.
    dropped_render_commands: u64,
    host: HostReport,
}

/// Filter used while settings load, before `log_filter` from them is known.
const BOOT_LOG_FILTER: &str = "info";

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let env_filter = std::env::var("RUST_LOG").ok();
    let boot_filter = args
        .log_filter
        .clone()
        .or_else(|| env_filter.clone())
        .unwrap_or_else(|| BOOT_LOG_FILTER.to_string());
    let settings =
        load_with_boot_logging(args.config.as_deref(), &boot_filter, std::io::stdout)?;

    let filter = args
        .log_filter
        .or(env_filter)
        .unwrap_or_else(|| settings.log_filter.clone());
    tracing_subscriber::fmt().with_env_filter(filter.as_str()).init();

    settings.validate().context("invalid settings")?;
    let script = SessionScript::load(&args.script)?;
    let summary = replay(&settings, script)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if summary.exit.state.is_terminated() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Loads settings under a scoped subscriber so that warnings about a malformed
/// file or rejected `APP__*` overrides are not lost.
fn load_with_boot_logging<W>(
    config: Option<&Path>,
    filter: &str,
    writer: W,
) -> Result<ShellSettings>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let boot = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .finish();
    tracing::subscriber::with_default(boot, || match config {
        Some(path) => load_settings_from(path),
        None => Ok(load_settings()),
    })
}

fn replay(settings: &ShellSettings, script: SessionScript) -> Result<SessionSummary> {
    let (surface, render_rx) = ChannelRenderSurface::bounded(settings.render_queue_capacity);
    let dropped = surface.drop_counter();
    let render_thread = spawn_render_thread(render_rx)?;

    let (callback_tx, callback_rx) = crossbeam_channel::unbounded();
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let report = Rc::new(RefCell::new(HostReport::default()));

    let mut controller = LifecycleController::from_settings(
        settings,
        Box::new(surface),
        Box::new(ScriptedPlatform::new(&script, callback_tx)),
        Box::new(ConsoleHost::new(report.clone())),
    )
    .context("failed to build session controller")?;

    for event in script.events {
        event_tx.send(event).context("session queue closed")?;
    }
    // The platform keeps a callback sender alive, so the loop needs an explicit end.
    event_tx
        .send(SessionEvent::Destroy)
        .context("session queue closed")?;
    drop(event_tx);

    let exit = event_loop::run_with_callbacks(&mut controller, &callback_rx, &event_rx);

    // Dropping the controller closes the render queue and lets the worker finish.
    drop(controller);
    let render = render_thread
        .join()
        .map_err(|_| anyhow!("render thread panicked"))?;
    let host = report.borrow().clone();

    let dropped_render_commands = dropped.get();
    if dropped_render_commands > 0 {
        tracing::warn!(
            dropped = dropped_render_commands,
            "render queue dropped commands during replay"
        );
    }

    Ok(SessionSummary {
        exit,
        render,
        dropped_render_commands,
        host,
    })
}
