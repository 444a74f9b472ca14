use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use mirror_camera::{CameraDevice, StillImageDevice};
use mirror_config::Config;
use tokio::signal;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

pub mod controller;
pub mod events;
pub mod profile;
pub mod state;
pub mod ui;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::state::AppState;

/// How long running views get to release the camera on shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

#[derive(Parser, Debug)]
#[command(name = "moodmirror", version, about = "Pick a mood or let the webcam detect it")]
struct Args {
    /// Config file (defaults to ./config.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serve this image as the camera feed
    #[arg(long, conflicts_with = "device")]
    image: Option<PathBuf>,

    /// Physical camera index (overrides CAMERA_INDEX)
    #[arg(long)]
    device: Option<u32>,

    /// Detection service base address (overrides MOOD_SERVICE_URL)
    #[arg(long)]
    service_url: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout belongs to the UI
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();
}

fn camera_device(args: &Args, config: &Config) -> anyhow::Result<Arc<dyn CameraDevice>> {
    if let Some(path) = &args.image {
        let device = StillImageDevice::open(path)?;
        return Ok(Arc::new(device));
    }

    #[cfg(feature = "webcam")]
    {
        Ok(Arc::new(mirror_camera::WebcamDevice::new(
            config.camera.device_index,
        )))
    }

    #[cfg(not(feature = "webcam"))]
    {
        tracing::warn!("Built without webcam support, serving a test pattern as the camera");
        Ok(Arc::new(StillImageDevice::test_pattern(
            config.camera.width,
            config.camera.height,
        )))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args = Args::parse();
    let mut config = profile::load_config(args.config.as_deref())?;
    if let Some(index) = args.device {
        config.camera.device_index = index;
    }
    if let Some(url) = &args.service_url {
        config.service.base_url = url.clone();
    }
    tracing::info!("Detection service at {}", config.service.base());

    let camera = camera_device(&args, &config)?;
    let state = Arc::new(AppState::new(config, camera));
    let controller = AppController::new(state).await;
    let mut tasks = controller.spawn_tasks();

    let mut clean = true;
    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        result = tasks.join_next() => {
            clean &= report(result);
        }
    }

    controller.shutdown();
    clean &= drain(&mut tasks, SHUTDOWN_GRACE).await;

    // The stdin reader can stay parked on a blocking read and hold the runtime open
    std::process::exit(if clean { 0 } else { 1 })
}

/// Let the event loop tear down its view, then stop whatever is left.
/// Returns false if any task failed.
async fn drain(tasks: &mut JoinSet<anyhow::Result<()>>, grace: Duration) -> bool {
    let mut clean = true;
    let finished = tokio::time::timeout(grace, async {
        while let Some(result) = tasks.join_next().await {
            clean &= report(Some(result));
        }
    })
    .await;

    if finished.is_err() {
        tracing::warn!("Tasks still running after {:?}, aborting", grace);
        tasks.abort_all();
    }
    clean
}

/// Log how a task ended. Returns false for errors and panics.
fn report(result: Option<Result<anyhow::Result<()>, tokio::task::JoinError>>) -> bool {
    match result {
        Some(Ok(Ok(()))) => tracing::debug!("Task exited"),
        Some(Ok(Err(e))) => {
            tracing::error!("Task exited with error: {e:#}");
            return false;
        }
        Some(Err(e)) if e.is_cancelled() => tracing::debug!("Task cancelled"),
        Some(Err(e)) => {
            tracing::error!("Task panicked: {e}");
            return false;
        }
        None => tracing::warn!("No tasks running"),
    }
    true
}
