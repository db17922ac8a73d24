use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use trainreel::config::Config;
use trainreel::player::{
    DisplayMode, PlayerController, PlayerHandle, PointerActivity, SimulatedResource,
};
use trainreel::utils::format_seconds;

/// Drives a simulated portrait clip through a short session and prints each
/// snapshot as JSON.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trainreel=info".parse()?),
        )
        .init();

    info!("Starting trainreel demo");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config, using defaults: {:#}", e);
            Config::default()
        }
    };

    let (handle, controller) = PlayerController::new(&config);
    let controller_task = tokio::spawn(controller.run());

    let resource = Arc::new(SimulatedResource::new(1080, 1920, 95.0).with_auto_deliver(true));
    handle.attach(resource.clone()).await?;
    resource.load_metadata();
    print_snapshot(&handle, "attached").await?;

    handle.toggle_play_pause().await?;
    resource.advance(4.0);
    print_snapshot(&handle, "playing").await?;

    if let Some(target) = handle.seek_from_track(150.0, 300.0).await? {
        info!("Seeked to {}", format_seconds(target));
    }
    handle.set_volume(0.0).await?;
    handle.set_display_mode(DisplayMode::Landscape).await?;
    print_snapshot(&handle, "landscape forced").await?;

    let idle = config.controls.idle_timeout() + Duration::from_millis(100);
    tokio::time::sleep(idle).await;
    print_snapshot(&handle, "idle").await?;

    handle.pointer(PointerActivity::Moved { x: 12.0, y: 40.0 })?;
    handle.toggle_play_pause().await?;
    print_snapshot(&handle, "paused").await?;

    handle.detach().await?;
    handle.shutdown();
    controller_task.await?;

    info!("Demo finished");
    Ok(())
}

async fn print_snapshot(handle: &PlayerHandle, label: &str) -> Result<()> {
    let snapshot = handle.snapshot().await?;
    println!("{}: {}", label, serde_json::to_string(&snapshot)?);
    Ok(())
}
