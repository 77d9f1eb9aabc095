//! The canvas renderer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, trace, warn};

use viewer_frame::{Frame, FrameSource, FrameStream};
use viewer_ipc::{RenderMetrics, RendererEvent, RendererState, StopReason};

use crate::error::RenderError;
use crate::geometry::ViewportGeometry;
use crate::metrics::MetricsCollector;
use crate::refresh::RefreshSignal;
use crate::slot::{Deposit, RenderSlot};
use crate::surface::DisplaySurface;
use crate::RenderResult;

/// What `bind` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    /// A new session was started on the source.
    Bound,

    /// The source was already bound; nothing changed.
    AlreadyBound,

    /// The source could not be read; the renderer is idle.
    Failed(RenderError),

    /// The renderer was destroyed and ignores binds.
    Destroyed,
}

impl BindOutcome {
    /// Returns true if the source is bound after the call.
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound | Self::AlreadyBound)
    }
}

/// One bound track and the tasks serving it.
struct Session {
    source: Arc<dyn FrameSource>,
    generation: u64,
    reader: Option<FrameStream>,
    read_task: Option<JoinHandle<()>>,
    paint_task: Option<JoinHandle<()>>,
}

/// State shared between the renderer handle and its two loops.
struct Shared {
    /// Generation of the running session, 0 when not running.
    active: AtomicU64,
    next_generation: AtomicU64,
    destroyed: AtomicBool,
    slot: RenderSlot,
    geometry: Mutex<ViewportGeometry>,
    surface: Mutex<Option<Box<dyn DisplaySurface>>>,
    session: Mutex<Option<Session>>,
    state: RwLock<RendererState>,
    refresh: RefreshSignal,
    metrics: MetricsCollector,
    event_tx: Option<Sender<RendererEvent>>,
}

/// Paints the newest frame of a bound source on every display refresh.
///
/// Frames are read on one task and painted on another; they meet in a
/// single-frame [`RenderSlot`]. A frame that is replaced before it is
/// painted is released without being drawn, and every frame is released
/// exactly once.
pub struct CanvasRenderer {
    shared: Arc<Shared>,
}

impl CanvasRenderer {
    /// Create an idle renderer painting onto `surface` on every `refresh`.
    pub fn new(surface: impl DisplaySurface + 'static, refresh: RefreshSignal) -> Self {
        Self::build(Box::new(surface), refresh, None)
    }

    /// Create an idle renderer that reports state changes on `event_tx`.
    pub fn with_events(
        surface: impl DisplaySurface + 'static,
        refresh: RefreshSignal,
        event_tx: Sender<RendererEvent>,
    ) -> Self {
        Self::build(Box::new(surface), refresh, Some(event_tx))
    }

    fn build(
        surface: Box<dyn DisplaySurface>,
        refresh: RefreshSignal,
        event_tx: Option<Sender<RendererEvent>>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                active: AtomicU64::new(0),
                next_generation: AtomicU64::new(0),
                destroyed: AtomicBool::new(false),
                slot: RenderSlot::new(),
                geometry: Mutex::new(ViewportGeometry::default()),
                surface: Mutex::new(Some(surface)),
                session: Mutex::new(None),
                state: RwLock::new(RendererState::Idle),
                refresh,
                metrics: MetricsCollector::new(),
                event_tx,
            }),
        }
    }

    /// Bind a source and start rendering it.
    ///
    /// Binding the same source object that is already bound is a no-op; a
    /// different source is bound even if it reuses the id. Otherwise the
    /// current session is torn down first. Failures leave the renderer idle
    /// and are reported in the outcome rather than raised.
    #[instrument(name = "renderer_bind", skip_all, fields(track = %source.id()))]
    pub fn bind(&self, source: Arc<dyn FrameSource>) -> BindOutcome {
        if self.shared.destroyed.load(Ordering::SeqCst) {
            debug!("Renderer destroyed, ignoring bind");
            return BindOutcome::Destroyed;
        }

        let already_bound = self
            .shared
            .session
            .lock()
            .as_ref()
            .is_some_and(|session| {
                std::ptr::addr_eq(Arc::as_ptr(&session.source), Arc::as_ptr(&source))
            });
        if already_bound {
            debug!("Track already bound, ignoring bind");
            return BindOutcome::AlreadyBound;
        }

        self.shared.teardown(None, StopReason::TrackSwapped);

        let reader = match source.open_stream() {
            Ok(reader) => reader,
            Err(e) => {
                let error = RenderError::from(e);
                error!(%error, "Failed to open frame stream");
                self.shared.report_error(&error);
                return BindOutcome::Failed(error);
            }
        };

        let generation = self.shared.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.shared.session.lock() = Some(Session {
            source,
            generation,
            reader: Some(reader),
            read_task: None,
            paint_task: None,
        });
        debug!(generation, "Track bound");

        match self.launch() {
            Ok(_) => BindOutcome::Bound,
            Err(error) => {
                error!(%error, "Failed to start rendering");
                self.shared.teardown(None, StopReason::Requested);
                self.shared.report_error(&error);
                BindOutcome::Failed(error)
            }
        }
    }

    /// Start the read and paint loops for the bound source.
    ///
    /// Returns true if the renderer transitioned to running. Does nothing
    /// when already running, when no reader exists, or outside a tokio
    /// runtime.
    #[instrument(name = "renderer_start", skip(self))]
    pub fn start(&self) -> bool {
        match self.launch() {
            Ok(started) => started,
            Err(error) => {
                error!(%error, "Failed to start rendering");
                false
            }
        }
    }

    fn launch(&self) -> RenderResult<bool> {
        if self.shared.destroyed.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let mut guard = self.shared.session.lock();
        let Some(session) = guard.as_mut() else {
            debug!("No track bound, nothing to start");
            return Ok(false);
        };
        if self.shared.is_running() {
            debug!("Already running, ignoring start");
            return Ok(false);
        }
        if session.reader.is_none() {
            debug!("No reader available, ignoring start");
            return Ok(false);
        }
        let runtime = Handle::try_current().map_err(|_| RenderError::NoRuntime)?;
        let Some(reader) = session.reader.take() else {
            return Ok(false);
        };

        let generation = session.generation;
        let track_id = session.source.id().to_string();

        if let Some(stale) = self.shared.slot.open(generation) {
            stale.release();
            self.shared.metrics.record_discarded();
        }
        self.shared.geometry.lock().invalidate();
        self.shared.active.store(generation, Ordering::SeqCst);
        self.shared.metrics.record_session();
        self.shared
            .transition_to(RendererState::Running { track_id }, None);

        session.read_task = Some(runtime.spawn(read_loop(
            Arc::clone(&self.shared),
            reader,
            generation,
        )));
        session.paint_task = Some(runtime.spawn(paint_loop(
            Arc::clone(&self.shared),
            self.shared.refresh.clone(),
            generation,
        )));

        info!(generation, "Rendering started");
        Ok(true)
    }

    /// Stop rendering and unbind the source.
    ///
    /// Cancels the reader, releases the buffered frame and clears the cached
    /// geometry. Safe to call in any state. Returns true if a session was
    /// torn down.
    #[instrument(name = "renderer_stop", skip(self))]
    pub fn stop(&self) -> bool {
        self.shared.teardown(None, StopReason::Requested)
    }

    /// Stop rendering and release the surface for good.
    #[instrument(name = "renderer_destroy", skip(self))]
    pub fn destroy(&self) {
        if self.shared.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }

        let had_session = self.shared.teardown(None, StopReason::Destroyed);
        self.shared.surface.lock().take();
        if !had_session {
            self.shared
                .transition_to(RendererState::Destroyed, Some(StopReason::Destroyed));
        }
        info!("Renderer destroyed");
    }

    /// Run one paint step, as a display refresh would.
    ///
    /// For hosts that drive painting from their own refresh callback.
    /// Returns true if a frame was drawn.
    pub fn paint(&self) -> bool {
        let generation = self.shared.active.load(Ordering::SeqCst);
        self.shared.paint(generation)
    }

    /// Mark the cached geometry stale so the next frame recomputes it, e.g.
    /// after the surface was resized.
    pub fn invalidate_geometry(&self) {
        self.shared.geometry.lock().invalidate();
    }

    /// The cached geometry, if one has been computed this session.
    pub fn geometry(&self) -> Option<ViewportGeometry> {
        let geometry = *self.shared.geometry.lock();
        (!geometry.is_uninitialized()).then_some(geometry)
    }

    /// Current state.
    pub fn state(&self) -> RendererState {
        self.shared.state.read().clone()
    }

    /// Returns true while both loops are running.
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Identifier of the bound source.
    pub fn bound_source(&self) -> Option<String> {
        self.shared
            .session
            .lock()
            .as_ref()
            .map(|session| session.source.id().to_string())
    }

    /// Returns true if a frame is waiting to be painted.
    pub fn has_pending_frame(&self) -> bool {
        !self.shared.slot.is_empty()
    }

    /// Get current metrics snapshot.
    pub fn metrics(&self) -> RenderMetrics {
        self.shared.metrics.snapshot()
    }
}

impl Drop for CanvasRenderer {
    fn drop(&mut self) {
        self.shared.teardown(None, StopReason::Requested);
    }
}

impl Shared {
    fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst) != 0
    }

    fn is_current(&self, generation: u64) -> bool {
        generation != 0 && self.active.load(Ordering::SeqCst) == generation
    }

    /// Tear down the session, optionally only if it is still `expected`.
    fn teardown(&self, expected: Option<u64>, reason: StopReason) -> bool {
        let mut guard = self.session.lock();
        if let Some(generation) = expected {
            if guard.as_ref().map(|session| session.generation) != Some(generation) {
                return false;
            }
        }

        let session = guard.take();
        let was_running = self.active.swap(0, Ordering::SeqCst) != 0;
        let pending = self.slot.close();
        self.geometry.lock().invalidate();

        let torn_down = session.is_some() || was_running;
        if torn_down {
            let next = if self.destroyed.load(Ordering::SeqCst) {
                RendererState::Destroyed
            } else {
                RendererState::Idle
            };
            self.transition_to(next, Some(reason.clone()));
        }
        drop(guard);

        if let Some(mut session) = session {
            if let Some(task) = session.read_task.take() {
                task.abort();
            }
            if let Some(task) = session.paint_task.take() {
                task.abort();
            }
            if let Some(mut reader) = session.reader.take() {
                reader.cancel();
            }
            info!(
                track = %session.source.id(),
                generation = session.generation,
                reason = %reason.message(),
                "Rendering stopped"
            );
        }

        if let Some(frame) = pending {
            trace!(ts = frame.timestamp_us(), "Releasing buffered frame");
            frame.release();
            self.metrics.record_discarded();
        }

        torn_down
    }

    /// Hand a frame from the read loop to the slot, keeping only the newest.
    fn accept_frame(&self, generation: u64, frame: Frame) {
        self.metrics.record_received();

        match self.slot.deposit(generation, frame) {
            Deposit::Stored => {}
            Deposit::Replaced(previous) => {
                trace!(ts = previous.timestamp_us(), "Dropping unpainted frame");
                previous.release();
                self.metrics.record_dropped();
            }
            Deposit::Rejected(frame) => {
                frame.release();
                self.metrics.record_discarded();
            }
        }
    }

    /// One paint step. Returns true if a frame was drawn.
    fn paint(&self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }

        let mut surface_guard = self.surface.lock();
        let Some(surface) = surface_guard.as_mut() else {
            return false;
        };
        if surface.context().is_none() {
            return false;
        }

        // Owning the frame before touching anything else keeps the read loop
        // from releasing it underneath us.
        let Some(frame) = self.slot.take(generation) else {
            self.metrics.record_idle_tick();
            return false;
        };

        let geometry = {
            let mut geometry = self.geometry.lock();
            // Teardown clears `active` before it invalidates geometry.
            if !self.is_current(generation) {
                drop(geometry);
                drop(surface_guard);
                frame.release();
                self.metrics.record_discarded();
                return false;
            }
            if geometry.is_uninitialized() {
                let (client_width, client_height) = surface.client_size();
                let (frame_width, frame_height) = (frame.display_width(), frame.display_height());
                *geometry =
                    ViewportGeometry::fit(client_width, client_height, frame_width, frame_height);
                surface.set_backing_size(frame_width, frame_height);

                debug!(
                    client_width,
                    client_height,
                    frame_width,
                    frame_height,
                    ?geometry,
                    "Computed viewport geometry"
                );
                self.send_event(RendererEvent::GeometryChanged(
                    geometry.snapshot(frame_width, frame_height),
                ));
            }
            *geometry
        };

        let (backing_width, backing_height) = surface.backing_size();
        if let Some(context) = surface.context() {
            context.clear_rect(0.0, 0.0, backing_width as f64, backing_height as f64);
            context.draw_frame(&frame, &geometry);
        }
        drop(surface_guard);

        frame.release();
        self.metrics.record_drawn();
        true
    }

    fn report_error(&self, error: &RenderError) {
        self.send_event(RendererEvent::Error {
            message: error.to_string(),
        });
    }

    fn transition_to(&self, new_state: RendererState, reason: Option<StopReason>) {
        let previous = std::mem::replace(&mut *self.state.write(), new_state.clone());
        if previous == new_state {
            return;
        }

        debug!(
            previous = %previous.name(),
            current = %new_state.name(),
            "State transition"
        );

        self.send_event(RendererEvent::StateChanged {
            previous,
            current: new_state,
            reason,
        });
    }

    fn send_event(&self, event: RendererEvent) {
        if let Some(ref event_tx) = self.event_tx {
            if let Err(e) = event_tx.try_send(event) {
                warn!("Failed to send event: {}", e);
            }
        }
    }
}

/// Drain the stream into the slot until the session ends.
async fn read_loop(shared: Arc<Shared>, mut stream: FrameStream, generation: u64) {
    debug!(generation, source = %stream.source_id(), "Read loop starting");

    while shared.is_current(generation) {
        match stream.next_frame().await {
            Ok(Some(frame)) => {
                if !shared.is_current(generation) {
                    frame.release();
                    break;
                }
                shared.accept_frame(generation, frame);
            }
            Ok(None) => {
                info!(generation, "Frame stream ended");
                shared.teardown(Some(generation), StopReason::StreamEnded);
                break;
            }
            Err(e) => {
                let error = RenderError::from(e);
                error!(generation, %error, "Frame read failed");
                shared.report_error(&error);
                shared.teardown(
                    Some(generation),
                    StopReason::ReadFailed {
                        message: error.to_string(),
                    },
                );
                break;
            }
        }
    }

    stream.cancel();
    debug!(generation, "Read loop stopped");
}

/// Paint once per display refresh until the session ends.
async fn paint_loop(shared: Arc<Shared>, mut refresh: RefreshSignal, generation: u64) {
    debug!(generation, "Paint loop starting");
    refresh.mark_seen();

    loop {
        if !refresh.next().await {
            if shared.is_current(generation) {
                warn!(generation, "Display refresh ended, stopping rendering");
                shared.teardown(Some(generation), StopReason::RefreshEnded);
            }
            break;
        }
        if !shared.is_current(generation) {
            break;
        }
        shared.paint(generation);
    }

    debug!(generation, "Paint loop stopped");
}
