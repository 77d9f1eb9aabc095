//! Headless stream viewer.
//!
//! Feeds a synthetic decoded stream into the canvas renderer at the configured
//! display refresh rate, swaps to a second track halfway through, then tears
//! everything down and reports what was painted.

mod config;
mod pattern;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::Receiver;
use tracing::{error, info, warn};

use viewer_frame::VideoTrack;
use viewer_ipc::{RendererEvent, TrackKind};
use viewer_render::{CanvasRenderer, DisplayRefresh, PixelSurface};

use crate::config::ViewerConfig;

/// Log renderer events until every sender is gone.
fn spawn_event_logger(event_rx: Receiver<RendererEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for event in event_rx.iter() {
            match event {
                RendererEvent::StateChanged {
                    previous,
                    current,
                    reason,
                } => info!(
                    previous = previous.name(),
                    current = current.name(),
                    reason = %reason.map(|r| r.message()).unwrap_or_default(),
                    "Renderer state changed"
                ),
                RendererEvent::GeometryChanged(geometry) => info!(
                    offset_x = geometry.offset_x,
                    offset_y = geometry.offset_y,
                    draw_width = geometry.draw_width,
                    draw_height = geometry.draw_height,
                    "Viewport geometry"
                ),
                RendererEvent::Metrics(metrics) => info!(
                    received = metrics.frames_received,
                    drawn = metrics.frames_drawn,
                    dropped = metrics.frames_dropped,
                    idle_ticks = metrics.idle_ticks,
                    drop_ratio = metrics.drop_ratio(),
                    "Render stats"
                ),
                RendererEvent::Error { message } => error!(%message, "Renderer error"),
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    info!(?config, "Starting stream viewer");

    let (event_tx, event_rx) = viewer_ipc::event_channel();
    let logger = spawn_event_logger(event_rx);

    let refresh = Arc::new(DisplayRefresh::new());
    let ticker = refresh.spawn_interval(config.renderer.refresh_rate_hz);

    let renderer = CanvasRenderer::with_events(
        PixelSurface::new(config.surface_width, config.surface_height),
        refresh.subscribe(),
        event_tx.clone(),
    );

    let open_track = |id: &str| {
        let (track, writer) =
            VideoTrack::new(id, TrackKind::Video, config.renderer.track_capacity);
        let producer = pattern::spawn_producer(
            writer,
            config.frame_width,
            config.frame_height,
            config.frame_rate,
        );
        (Arc::new(track), producer)
    };

    let (first, first_producer) = open_track("video-0");
    let outcome = renderer.bind(first);
    if !outcome.is_bound() {
        warn!(?outcome, "Initial bind failed");
    }

    let run_for = Duration::from_secs(config.duration_secs);
    let swap_at = tokio::time::Instant::now() + run_for / 2;
    let end_at = tokio::time::Instant::now() + run_for;
    let mut stats = tokio::time::interval(Duration::from_secs(config.stats_interval_secs.max(1)));
    let mut second_producer = None;

    loop {
        tokio::select! {
            _ = stats.tick() => {
                if let Err(e) = event_tx.try_send(RendererEvent::Metrics(renderer.metrics())) {
                    warn!("Failed to send event: {}", e);
                }
            }
            _ = tokio::time::sleep_until(swap_at), if second_producer.is_none() => {
                let (second, producer) = open_track("video-1");
                let outcome = renderer.bind(second);
                info!(?outcome, "Swapped track");
                second_producer = Some(producer);
            }
            _ = tokio::time::sleep_until(end_at) => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    renderer.destroy();
    ticker.abort();

    let mut produced = first_producer.await.unwrap_or(0);
    if let Some(producer) = second_producer {
        produced += producer.await.unwrap_or(0);
    }

    let metrics = renderer.metrics();
    info!(
        produced,
        received = metrics.frames_received,
        drawn = metrics.frames_drawn,
        dropped = metrics.frames_dropped,
        discarded = metrics.frames_discarded,
        sessions = metrics.sessions,
        refreshes = refresh.ticks(),
        "Stream viewer finished"
    );

    drop(renderer);
    drop(event_tx);
    if logger.join().is_err() {
        warn!("Event logger panicked");
    }

    Ok(())
}
